//! Core data types for the book catalog.
//!
//! A [`Book`] carries the shared bibliographic fields plus a [`BookKind`]
//! holding whatever its subtype adds. On disk every book is a flat
//! [`BookRecord`]; the `type` discriminator only exists in that record form.

use serde::{Deserialize, Serialize};

/// Value given to `genre`/`subject` when none is supplied.
pub const UNKNOWN: &str = "Unknown";

/// Subtype discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookType {
    Book,
    Fiction,
    NonFiction,
}

impl BookType {
    /// Parse a `type` tag. Matching is case-insensitive and accepts
    /// `non-fiction` as an alias. Returns `None` for unrecognized tags.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "book" => Some(Self::Book),
            "fiction" => Some(Self::Fiction),
            "nonfiction" | "non-fiction" => Some(Self::NonFiction),
            _ => None,
        }
    }

    /// Canonical tag as written to disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Fiction => "fiction",
            Self::NonFiction => "nonfiction",
        }
    }

    /// Label used in user-facing messages ("A Fiction book ...").
    pub fn article_label(&self) -> &'static str {
        match self {
            Self::Book => "A Book",
            Self::Fiction => "A Fiction book",
            Self::NonFiction => "A Non-Fiction book",
        }
    }
}

impl std::fmt::Display for BookType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Subtype-specific data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookKind {
    Plain,
    Fiction { genre: String },
    NonFiction { subject: String },
}

impl BookKind {
    /// Build the kind for `book_type`, using `extra` as the genre/subject
    /// when given and [`UNKNOWN`] otherwise. `extra` is ignored for plain books.
    pub fn for_type(book_type: BookType, extra: Option<String>) -> Self {
        let or_unknown = || extra.unwrap_or_else(|| UNKNOWN.to_string());
        match book_type {
            BookType::Book => Self::Plain,
            BookType::Fiction => Self::Fiction { genre: or_unknown() },
            BookType::NonFiction => Self::NonFiction {
                subject: or_unknown(),
            },
        }
    }

    pub fn book_type(&self) -> BookType {
        match self {
            Self::Plain => BookType::Book,
            Self::Fiction { .. } => BookType::Fiction,
            Self::NonFiction { .. } => BookType::NonFiction,
        }
    }
}

/// A typed catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "BookRecord", from = "BookRecord")]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub isbn: u64,
    pub published_date: String,
    pub kind: BookKind,
}

impl Book {
    pub fn book_type(&self) -> BookType {
        self.kind.book_type()
    }

    pub fn genre(&self) -> Option<&str> {
        match &self.kind {
            BookKind::Fiction { genre } => Some(genre),
            _ => None,
        }
    }

    pub fn subject(&self) -> Option<&str> {
        match &self.kind {
            BookKind::NonFiction { subject } => Some(subject),
            _ => None,
        }
    }

    /// Flatten into the on-disk record shape.
    pub fn to_record(&self) -> BookRecord {
        let (genre, subject, book_type) = match &self.kind {
            BookKind::Plain => (None, None, None),
            BookKind::Fiction { genre } => (Some(genre.clone()), None, Some(BookType::Fiction)),
            BookKind::NonFiction { subject } => {
                (None, Some(subject.clone()), Some(BookType::NonFiction))
            }
        };
        BookRecord {
            book_id: self.id,
            title: self.title.clone(),
            author: self.author.clone(),
            isbn: self.isbn,
            published_date: self.published_date.clone(),
            genre,
            subject,
            book_type: book_type.map(|t| t.as_str().to_string()),
        }
    }

    /// Build a typed book from a stored record. A missing or unrecognized
    /// `type` yields a plain book.
    pub fn from_record(record: BookRecord) -> Self {
        let book_type = record
            .book_type
            .as_deref()
            .and_then(BookType::parse)
            .unwrap_or(BookType::Book);
        let extra = match book_type {
            BookType::Book => None,
            BookType::Fiction => record.genre,
            BookType::NonFiction => record.subject,
        };
        Self {
            id: record.book_id,
            title: record.title,
            author: record.author,
            isbn: record.isbn,
            published_date: record.published_date,
            kind: BookKind::for_type(book_type, extra),
        }
    }
}

impl From<Book> for BookRecord {
    fn from(book: Book) -> Self {
        book.to_record()
    }
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Book::from_record(record)
    }
}

/// Persisted representation of a book.
///
/// Field order is the on-disk order: base fields, then the subtype field,
/// then `type` last. Plain books carry no `type` field at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub book_id: u64,
    pub title: String,
    pub author: String,
    pub isbn: u64,
    pub published_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub book_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dune() -> Book {
        Book {
            id: 1,
            title: "Dune".into(),
            author: "Herbert".into(),
            isbn: 1234567890123,
            published_date: "June 1, 1965".into(),
            kind: BookKind::Fiction {
                genre: "Sci-Fi".into(),
            },
        }
    }

    #[test]
    fn parse_tags() {
        assert_eq!(BookType::parse("fiction"), Some(BookType::Fiction));
        assert_eq!(BookType::parse("FICTION"), Some(BookType::Fiction));
        assert_eq!(BookType::parse("nonfiction"), Some(BookType::NonFiction));
        assert_eq!(BookType::parse("Non-Fiction"), Some(BookType::NonFiction));
        assert_eq!(BookType::parse("book"), Some(BookType::Book));
        assert_eq!(BookType::parse("poetry"), None);
    }

    #[test]
    fn fiction_record_field_order() {
        let json = serde_json::to_string(&dune()).unwrap();
        assert_eq!(
            json,
            r#"{"book_id":1,"title":"Dune","author":"Herbert","isbn":1234567890123,"published_date":"June 1, 1965","genre":"Sci-Fi","type":"fiction"}"#
        );
    }

    #[test]
    fn plain_record_has_no_type() {
        let mut book = dune();
        book.kind = BookKind::Plain;
        let value = serde_json::to_value(&book).unwrap();
        let obj = value.as_object().unwrap();
        assert!(!obj.contains_key("type"));
        assert!(!obj.contains_key("genre"));
        assert_eq!(obj["book_id"], 1);
    }

    #[test]
    fn nonfiction_record_carries_subject() {
        let mut book = dune();
        book.kind = BookKind::NonFiction {
            subject: "Ecology".into(),
        };
        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["type"], "nonfiction");
        assert_eq!(value["subject"], "Ecology");
        assert!(value.get("genre").is_none());
    }

    #[test]
    fn unknown_type_loads_as_plain() {
        let json = r#"{"book_id":3,"title":"T","author":"A","isbn":1234567890123,
                      "published_date":"June 1, 1965","type":"poetry"}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.kind, BookKind::Plain);
    }

    #[test]
    fn fiction_without_genre_defaults_to_unknown() {
        let json = r#"{"book_id":3,"title":"T","author":"A","isbn":1234567890123,
                      "published_date":"June 1, 1965","type":"Fiction"}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.genre(), Some(UNKNOWN));
        assert_eq!(book.subject(), None);
    }
}
