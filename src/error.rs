//! Rich diagnostic error types for the book catalog.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! so callers get an error code and help text alongside the message that is
//! sent back over HTTP.

use miette::Diagnostic;
use thiserror::Error;

/// Top-level error type for catalog operations.
#[derive(Debug, Error, Diagnostic)]
pub enum CatalogError {
    #[error("{message}")]
    #[diagnostic(
        code(catalog::malformed),
        help("The request was rejected before touching the catalog. Fix the input and retry.")
    )]
    Malformed { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    #[diagnostic(
        code(catalog::not_found),
        help("List the catalog with `book-catalog list` to see which ids exist.")
    )]
    NotFound { message: String },

    #[error("No books were deleted. Check if the book is existing or book IDs are valid.")]
    #[diagnostic(
        code(catalog::nothing_deleted),
        help("None of the supplied ids matched a stored book.")
    )]
    NothingDeleted,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Persistence(#[from] StoreError),
}

impl CatalogError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    pub(crate) fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Map this error to an HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Malformed { .. } | Self::Validation(_) | Self::NothingDeleted => 400,
            Self::NotFound { .. } => 404,
            Self::Persistence(_) => 500,
        }
    }
}

/// Convenience alias for catalog operation results.
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

// ---------------------------------------------------------------------------
// Validation errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    #[error("Missing field: {field}")]
    #[diagnostic(
        code(catalog::validate::missing_field),
        help("Every book needs title, author, isbn and published_date.")
    )]
    MissingField { field: String },

    #[error("Invalid type for field '{field}'.")]
    #[diagnostic(
        code(catalog::validate::invalid_type),
        help("isbn must be a JSON integer; all other fields are strings.")
    )]
    InvalidType { field: String },

    #[error("Field '{field}' cannot be empty.")]
    #[diagnostic(code(catalog::validate::empty_field))]
    EmptyField { field: String },

    #[error("Invalid ISBN. It must be 13-digits number.")]
    #[diagnostic(
        code(catalog::validate::isbn),
        help("Send the ISBN-13 as an integer without dashes, e.g. 9780441013593.")
    )]
    InvalidIsbn,

    #[error(
        "Invalid date format for 'published_date'. Use 'Month Day, Year' (e.g., 'December 18, 2024)."
    )]
    #[diagnostic(code(catalog::validate::date))]
    InvalidDate,

    #[error("{} with this ISBN already exists!", .kind.article_label())]
    #[diagnostic(
        code(catalog::validate::duplicate),
        help("ISBNs are unique within each book type. Update the existing book instead.")
    )]
    Duplicate { kind: crate::model::BookType },
}

impl ValidationError {
    /// Whether this failure is a uniqueness conflict rather than bad input.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Duplicate { .. })
    }
}

// ---------------------------------------------------------------------------
// Store errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    #[diagnostic(
        code(catalog::store::io),
        help(
            "A filesystem operation failed. Check that the data file's directory exists, \
             has correct permissions, and that the disk is not full."
        )
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed catalog file {path}: {source}")]
    #[diagnostic(
        code(catalog::store::parse),
        help("The data file must contain a JSON array of book records.")
    )]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize catalog: {source}")]
    #[diagnostic(code(catalog::store::serialize))]
    Serialize {
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config: {path}")]
    #[diagnostic(
        code(catalog::config::read),
        help("Ensure the config file exists and is readable.")
    )]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {path}: {message}")]
    #[diagnostic(
        code(catalog::config::parse),
        help("Check the TOML syntax in the config file.")
    )]
    Parse { path: String, message: String },

    #[error("invalid value for {var}: \"{value}\"")]
    #[diagnostic(code(catalog::config::env))]
    InvalidEnv { var: String, value: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
