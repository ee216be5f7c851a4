//! Validation of candidate book records.
//!
//! Candidates arrive as untyped JSON objects. [`validate`] checks them in a
//! fixed order and stops at the first failure:
//!
//! 1. required fields are present with the right JSON type
//! 2. `isbn` is a 13-digit integer
//! 3. `published_date` reads as "Month Day, Year"
//! 4. no other book of the same scope already uses the ISBN
//!
//! On success the typed base fields are returned so callers never re-parse.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

use crate::config::DuplicatePolicy;
use crate::error::ValidationError;
use crate::model::BookType;
use crate::store::BookStore;

/// Generic, untyped form of a book as received from a client.
pub type Record = Map<String, Value>;

/// Format accepted for `published_date`, e.g. "December 18, 2024".
pub const DATE_FORMAT: &str = "%B %d, %Y";

// chrono's `%B` also takes abbreviations and tolerates missing separators,
// so the shape is pinned down before parsing.
static DATE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z]+)\s+\d{1,2},\s+\d{4}$").expect("date pattern compiles")
});

const MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

const ISBN_LEN: usize = 13;

/// Optional string fields; type-checked when present.
const OPTIONAL_STRINGS: [&str; 3] = ["type", "genre", "subject"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Str,
    Int,
}

const REQUIRED: [(&str, FieldKind); 4] = [
    ("title", FieldKind::Str),
    ("author", FieldKind::Str),
    ("isbn", FieldKind::Int),
    ("published_date", FieldKind::Str),
];

/// Base fields of a record that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedFields {
    pub title: String,
    pub author: String,
    pub isbn: u64,
    pub published_date: String,
}

/// Validate `record` against the current contents of `store`.
///
/// `exclude_id` names the book being updated so it is not reported as a
/// duplicate of itself.
pub fn validate(
    store: &BookStore,
    record: &Record,
    exclude_id: Option<u64>,
    policy: DuplicatePolicy,
) -> Result<ValidatedFields, ValidationError> {
    for (field, kind) in REQUIRED {
        let value = record
            .get(field)
            .ok_or_else(|| ValidationError::MissingField {
                field: field.to_string(),
            })?;
        let ok = match kind {
            FieldKind::Str => value.is_string(),
            FieldKind::Int => value.is_i64() || value.is_u64(),
        };
        if !ok {
            return Err(ValidationError::InvalidType {
                field: field.to_string(),
            });
        }
    }
    for field in OPTIONAL_STRINGS {
        optional_str(record, field)?;
    }

    let title = required_str(record, "title");
    if title.trim().is_empty() {
        return Err(ValidationError::EmptyField {
            field: "title".into(),
        });
    }

    let isbn = parse_isbn(&record["isbn"])?;

    let published_date = required_str(record, "published_date");
    if !is_valid_date(&published_date) {
        return Err(ValidationError::InvalidDate);
    }

    check_duplicates(store, isbn, scope_of(record)?, exclude_id, policy)?;

    Ok(ValidatedFields {
        title,
        author: required_str(record, "author"),
        isbn,
        published_date,
    })
}

/// Check `isbn` against every stored book except `exclude_id`.
///
/// `scope` is the candidate's subtype (`None` for an unrecognized tag).
/// Under [`DuplicatePolicy::Asymmetric`] a stored plain book conflicts with
/// any candidate, while stored fiction/non-fiction books only conflict with
/// candidates of their own type. Under [`DuplicatePolicy::PerSubtype`] an
/// unrecognized tag counts as a plain book, since that is what gets stored.
pub fn check_duplicates(
    store: &BookStore,
    isbn: u64,
    scope: Option<BookType>,
    exclude_id: Option<u64>,
    policy: DuplicatePolicy,
) -> Result<(), ValidationError> {
    let books = store.load_all();

    for book in books.iter().filter(|b| Some(b.id) != exclude_id) {
        if book.isbn != isbn {
            continue;
        }
        let conflict = match (book.kind.book_type(), policy) {
            (BookType::Book, DuplicatePolicy::Asymmetric) => true,
            (BookType::Book, DuplicatePolicy::PerSubtype) => {
                scope.unwrap_or(BookType::Book) == BookType::Book
            }
            (stored, _) => scope == Some(stored),
        };
        if conflict {
            tracing::debug!(isbn, existing = book.id, "duplicate isbn");
            return Err(ValidationError::Duplicate {
                kind: book.book_type(),
            });
        }
    }
    Ok(())
}

/// Whether `date` reads as "Month Day, Year" with a full month name and a
/// four-digit year.
pub fn is_valid_date(date: &str) -> bool {
    let Some(caps) = DATE_SHAPE.captures(date) else {
        return false;
    };
    MONTHS.iter().any(|m| m.eq_ignore_ascii_case(&caps[1]))
        && NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok()
}

/// Subtype scope named by the record's `type` field. Absent or empty means
/// a plain book; an unrecognized tag yields `None`.
pub(crate) fn scope_of(record: &Record) -> Result<Option<BookType>, ValidationError> {
    Ok(match optional_str(record, "type")? {
        None => Some(BookType::Book),
        Some(tag) => BookType::parse(&tag),
    })
}

/// Read an optional string field. Empty strings count as absent.
pub(crate) fn optional_str(record: &Record, field: &str) -> Result<Option<String>, ValidationError> {
    match record.get(field) {
        None => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(ValidationError::InvalidType {
            field: field.to_string(),
        }),
    }
}

fn required_str(record: &Record, field: &str) -> String {
    record
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn parse_isbn(value: &Value) -> Result<u64, ValidationError> {
    let digits = value.to_string();
    if digits.len() != ISBN_LEN || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::InvalidIsbn);
    }
    value.as_u64().ok_or(ValidationError::InvalidIsbn)
}
