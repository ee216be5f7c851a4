//! Catalog operations composed from the store and the validator.
//!
//! Every operation reads the full collection from disk, works on it in
//! memory, and (for mutations) writes the whole collection back. Mutations
//! hold an in-process write lock for the full load-mutate-save sequence so
//! concurrent requests in one server cannot lose each other's updates.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

use crate::config::{CatalogConfig, DuplicatePolicy, IdStrategy};
use crate::error::{CatalogError, CatalogResult};
use crate::model::{Book, BookKind, BookType};
use crate::store::BookStore;
use crate::validate::{self, Record};

const INVALID_ID: &str = "Invalid id. book id must be an int, not a string";
const BOOK_NOT_FOUND: &str = "Book not found!";

/// The book catalog.
#[derive(Debug)]
pub struct Catalog {
    store: BookStore,
    id_strategy: IdStrategy,
    duplicate_policy: DuplicatePolicy,
    strict_writes: bool,
    write_lock: Mutex<()>,
}

impl Catalog {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            store: BookStore::new(config.data_file.clone()),
            id_strategy: config.id_strategy,
            duplicate_policy: config.duplicate_policy,
            strict_writes: config.strict_writes,
            write_lock: Mutex::new(()),
        }
    }

    /// Catalog over `path` with default settings.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(&CatalogConfig::with_data_file(path))
    }

    pub fn store(&self) -> &BookStore {
        &self.store
    }

    /// All books in storage order. An empty catalog is reported as not found.
    pub fn list(&self) -> CatalogResult<Vec<Book>> {
        let books = self.store.load_all();
        if books.is_empty() {
            return Err(CatalogError::not_found("No books found in the library"));
        }
        Ok(books)
    }

    /// Books whose title contains `query`, ignoring case and runs of
    /// whitespace in the query.
    pub fn search(&self, query: &str) -> CatalogResult<Vec<Book>> {
        let needle = normalize_query(query);
        if needle.is_empty() {
            return Err(CatalogError::malformed(
                "Search term cannot be empty or just spaces.",
            ));
        }
        let needle = needle.to_lowercase();
        tracing::debug!(query = %needle, "searching titles");

        let matches: Vec<Book> = self
            .store
            .load_all()
            .into_iter()
            .filter(|b| b.title.to_lowercase().contains(&needle))
            .collect();
        if matches.is_empty() {
            return Err(CatalogError::not_found("Book not found"));
        }
        Ok(matches)
    }

    /// Look up a single book.
    pub fn find(&self, id: u64) -> Option<Book> {
        self.store.load_all().into_iter().find(|b| b.id == id)
    }

    /// Validate `record` and append it as a new book.
    pub fn create(&self, record: &Record) -> CatalogResult<Book> {
        let _guard = self.lock();
        let mut books = self.store.load_all();

        let fields = validate::validate(&self.store, record, None, self.duplicate_policy)?;
        let book_type = validate::scope_of(record)?.unwrap_or(BookType::Book);
        let extra = match book_type {
            BookType::Book => None,
            BookType::Fiction => validate::optional_str(record, "genre")?,
            BookType::NonFiction => validate::optional_str(record, "subject")?,
        };

        let book = Book {
            id: self.next_id(&books),
            title: fields.title,
            author: fields.author,
            isbn: fields.isbn,
            published_date: fields.published_date,
            kind: BookKind::for_type(book_type, extra),
        };
        books.push(book.clone());
        self.persist(&books)?;

        tracing::info!(id = book.id, kind = %book.book_type(), "book added");
        Ok(book)
    }

    /// Apply `patch` to the book with the given id.
    ///
    /// Fields absent from `patch` keep their values. A `type` that differs
    /// from the current one rebuilds the book as that subtype, with the new
    /// `genre`/`subject` taken from `patch` or defaulted.
    pub fn update(&self, raw_id: &str, patch: &Record) -> CatalogResult<Book> {
        let id = parse_book_id(raw_id)?;
        let _guard = self.lock();
        let mut books = self.store.load_all();

        let pos = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| CatalogError::not_found(BOOK_NOT_FOUND))?;

        let mut candidate = candidate_record(&books[pos]);
        for (key, value) in patch {
            if key == "book_id" || (key == "type" && value.as_str() == Some("")) {
                continue;
            }
            candidate.insert(key.clone(), value.clone());
        }
        let fields = validate::validate(&self.store, &candidate, Some(id), self.duplicate_policy)?;

        let target_type = match validate::optional_str(patch, "type")? {
            None => None,
            Some(tag) => Some(
                BookType::parse(&tag)
                    .ok_or_else(|| CatalogError::malformed("Invalid type specified!"))?,
            ),
        };
        let genre = validate::optional_str(patch, "genre")?;
        let subject = validate::optional_str(patch, "subject")?;

        let mut book = books[pos].clone();
        book.title = fields.title;
        book.author = fields.author;
        book.isbn = fields.isbn;
        book.published_date = fields.published_date;

        if let Some(target) = target_type {
            if target != book.book_type() {
                tracing::info!(id, from = %book.book_type(), to = %target, "converting book");
                book.kind = BookKind::for_type(target, None);
            }
        }
        match &mut book.kind {
            BookKind::Fiction { genre: current } => {
                if let Some(g) = genre {
                    *current = g;
                }
            }
            BookKind::NonFiction { subject: current } => {
                if let Some(s) = subject {
                    *current = s;
                }
            }
            BookKind::Plain => {}
        }

        books[pos] = book.clone();
        self.persist(&books)?;

        tracing::info!(id, "book updated");
        Ok(book)
    }

    /// Remove and return the book with the given id.
    pub fn delete(&self, raw_id: &str) -> CatalogResult<Book> {
        let id = parse_book_id(raw_id)?;
        let _guard = self.lock();
        let mut books = self.store.load_all();

        let pos = books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| CatalogError::not_found(BOOK_NOT_FOUND))?;
        let removed = books.remove(pos);
        self.persist(&books)?;

        tracing::info!(id, "book deleted");
        Ok(removed)
    }

    /// Remove every book whose id appears in `ids`; returns how many ids
    /// matched. Entries that are not ids of stored books are skipped.
    pub fn delete_many(&self, ids: &[Value]) -> CatalogResult<usize> {
        if ids.is_empty() {
            return Err(CatalogError::malformed("No book ids provided"));
        }

        let _guard = self.lock();
        let mut books = self.store.load_all();
        let mut deleted = 0;
        for id in ids.iter().filter_map(Value::as_u64) {
            let before = books.len();
            books.retain(|b| b.id != id);
            if books.len() < before {
                deleted += 1;
            }
        }
        self.persist(&books)?;

        if deleted == 0 {
            return Err(CatalogError::NothingDeleted);
        }
        tracing::info!(deleted, "books deleted");
        Ok(deleted)
    }

    fn next_id(&self, books: &[Book]) -> u64 {
        match self.id_strategy {
            IdStrategy::Count => books.len() as u64 + 1,
            IdStrategy::NextMax => books.iter().map(|b| b.id).max().unwrap_or(0) + 1,
        }
    }

    fn persist(&self, books: &[Book]) -> CatalogResult<()> {
        match self.store.save_all(books) {
            Ok(()) => Ok(()),
            Err(e) if self.strict_writes => Err(e.into()),
            Err(e) => {
                tracing::warn!(error = %e, "failed to save catalog");
                Ok(())
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Parse a path-supplied book id. Only plain decimal digits are accepted.
pub fn parse_book_id(raw: &str) -> CatalogResult<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CatalogError::malformed(INVALID_ID));
    }
    // All digits but past u64::MAX: numeric, so it simply names no book.
    raw.parse().map_err(|_| CatalogError::not_found(BOOK_NOT_FOUND))
}

/// Collapse whitespace runs to single spaces and trim.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Current state of `book` as an untyped record, for validating updates.
fn candidate_record(book: &Book) -> Record {
    let mut record = Record::new();
    record.insert("title".into(), Value::from(book.title.clone()));
    record.insert("author".into(), Value::from(book.author.clone()));
    record.insert("isbn".into(), Value::from(book.isbn));
    record.insert(
        "published_date".into(),
        Value::from(book.published_date.clone()),
    );
    match &book.kind {
        BookKind::Plain => {}
        BookKind::Fiction { genre } => {
            record.insert("genre".into(), Value::from(genre.clone()));
            record.insert("type".into(), Value::from(BookType::Fiction.as_str()));
        }
        BookKind::NonFiction { subject } => {
            record.insert("subject".into(), Value::from(subject.clone()));
            record.insert("type".into(), Value::from(BookType::NonFiction.as_str()));
        }
    }
    record
}
