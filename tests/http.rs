//! HTTP API integration tests.
//!
//! Starts the axum router on an ephemeral port and exercises it with reqwest.

#![cfg(feature = "server")]

use std::sync::Arc;

use book_catalog::catalog::Catalog;
use book_catalog::server::router;
use serde_json::{Value, json};

/// Bind to port 0 over a fresh data file and return the base URL.
async fn start_server() -> (tempfile::TempDir, String) {
    let dir = tempfile::TempDir::new().unwrap();
    let catalog = Arc::new(Catalog::open(dir.path().join("books.json")));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(catalog)).await.unwrap();
    });
    (dir, format!("http://{addr}"))
}

fn dune() -> Value {
    json!({
        "title": "Dune",
        "author": "Herbert",
        "isbn": 1234567890123u64,
        "published_date": "June 1, 1965",
        "type": "fiction",
        "genre": "Sci-Fi",
    })
}

fn plain(title: &str, isbn: u64) -> Value {
    json!({
        "title": title,
        "author": "Anon",
        "isbn": isbn,
        "published_date": "December 18, 2024",
    })
}

async fn add(client: &reqwest::Client, base: &str, body: &Value) -> reqwest::Response {
    client
        .post(format!("{base}/add_book"))
        .json(body)
        .send()
        .await
        .unwrap()
}

#[tokio::test]
async fn home_and_health() {
    let (_dir, base) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "Welcome to the Library Systems");

    let resp = client.get(format!("{base}/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["books"], 0);
}

#[tokio::test]
async fn empty_catalog_is_not_found() {
    let (_dir, base) = start_server().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/view_books")).send().await.unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No books found in the library");
}

#[tokio::test]
async fn add_then_view() {
    let (_dir, base) = start_server().await;
    let client = reqwest::Client::new();

    let resp = add(&client, &base, &dune()).await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Book added successfully!");
    assert_eq!(body["book"]["book_id"], 1);
    assert_eq!(body["book"]["type"], "fiction");
    assert_eq!(body["book"]["genre"], "Sci-Fi");

    let resp = client.get(format!("{base}/view_books")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    let books: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(books.len(), 1);
    assert_eq!(books[0]["title"], "Dune");
}

#[tokio::test]
async fn add_rejects_invalid_records() {
    let (_dir, base) = start_server().await;
    let client = reqwest::Client::new();

    let resp = add(&client, &base, &json!({ "title": "Dune" })).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing field: author");

    let mut bad_date = plain("Dune", 1234567890123);
    bad_date["published_date"] = json!("1965-06-01");
    let resp = add(&client, &base, &bad_date).await;
    assert_eq!(resp.status(), 400);

    let resp = add(&client, &base, &json!([1, 2, 3])).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Request body must be a JSON object.");

    add(&client, &base, &dune()).await;
    let resp = add(&client, &base, &dune()).await;
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "A Fiction book with this ISBN already exists!");
}

#[tokio::test]
async fn search_by_title() {
    let (_dir, base) = start_server().await;
    let client = reqwest::Client::new();
    add(&client, &base, &plain("The Great Gatsby", 1000000000001)).await;

    let resp = client
        .get(format!("{base}/search_book/great%20%20%20gatsby"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], "Books found successfully!");
    assert_eq!(body["books"][0]["title"], "The Great Gatsby");

    let resp = client
        .get(format!("{base}/search_book/%20%20"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Search term cannot be empty or just spaces.");

    let resp = client
        .get(format!("{base}/search_book/ulysses"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn update_book_errors_and_success() {
    let (_dir, base) = start_server().await;
    let client = reqwest::Client::new();
    add(&client, &base, &dune()).await;

    let resp = client
        .put(format!("{base}/update_book/abc"))
        .json(&json!({ "title": "X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"],
        "Invalid id. book id must be an int, not a string"
    );

    let resp = client
        .put(format!("{base}/update_book/42"))
        .json(&json!({ "title": "X" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Book not found!");

    let resp = client
        .put(format!("{base}/update_book/1"))
        .json(&json!({ "type": "poetry" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid type specified!");

    let resp = client
        .put(format!("{base}/update_book/1"))
        .json(&json!({ "type": "nonfiction", "subject": "Ecology" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Book update successfully!");
    assert_eq!(body["book"]["book_id"], 1);
    assert_eq!(body["book"]["type"], "nonfiction");
    assert_eq!(body["book"]["subject"], "Ecology");
    assert!(body["book"].get("genre").is_none());
}

#[tokio::test]
async fn delete_single_book() {
    let (_dir, base) = start_server().await;
    let client = reqwest::Client::new();
    add(&client, &base, &dune()).await;

    let resp = client
        .delete(format!("{base}/delete_book/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], "Book deleted successfully!");
    assert_eq!(body["book"]["title"], "Dune");

    let resp = client
        .delete(format!("{base}/delete_book/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn bulk_delete() {
    let (_dir, base) = start_server().await;
    let client = reqwest::Client::new();
    add(&client, &base, &plain("One", 1000000000001)).await;
    add(&client, &base, &plain("Two", 1000000000002)).await;
    add(&client, &base, &plain("Three", 1000000000003)).await;

    let resp = client
        .delete(format!("{base}/delete_books"))
        .json(&json!({ "book_ids": [1, 2, 999] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["deleted"], 2);
    assert_eq!(body["success"], "2 book/s were successfully deleted.");

    let resp = client
        .delete(format!("{base}/delete_books"))
        .json(&json!({ "book_ids": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let resp = client
        .delete(format!("{base}/delete_books"))
        .json(&json!({ "book_ids": [999] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(
        body["error"],
        "No books were deleted. Check if the book is existing or book IDs are valid."
    );
}
