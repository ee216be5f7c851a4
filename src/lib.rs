// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # book-catalog
//!
//! A small catalog of books with polymorphic subtype data (plain books,
//! fiction, non-fiction), persisted to a single JSON file.
//!
//! ## Architecture
//!
//! - **Model** (`model`): `Book` with a `BookKind` tagged union and the flat on-disk `BookRecord`
//! - **Store** (`store`): whole-file load/save of the collection
//! - **Validator** (`validate`): field, ISBN, date and per-subtype duplicate checks
//! - **Catalog** (`catalog`): list, search, create, update, delete, bulk delete
//! - **Server** (`server`, feature `server`): axum HTTP surface
//!
//! ## Library usage
//!
//! ```no_run
//! use book_catalog::catalog::Catalog;
//! use serde_json::json;
//!
//! let catalog = Catalog::open("books.json");
//! let record = json!({
//!     "title": "Dune",
//!     "author": "Herbert",
//!     "isbn": 1234567890123u64,
//!     "published_date": "June 1, 1965",
//!     "type": "fiction",
//!     "genre": "Sci-Fi",
//! });
//! let book = catalog.create(record.as_object().unwrap()).unwrap();
//! assert_eq!(book.id, 1);
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod model;
#[cfg(feature = "server")]
pub mod server;
pub mod store;
pub mod validate;

pub use catalog::Catalog;
pub use config::{CatalogConfig, DuplicatePolicy, IdStrategy};
pub use error::{CatalogError, CatalogResult};
pub use model::{Book, BookKind, BookRecord, BookType};
