//! Flat-file persistence for the book collection.
//!
//! The whole collection lives in a single JSON array (`books.json` by
//! default). Every read loads the full file and every write replaces it;
//! nothing is cached between calls. Writes go to a sibling `.tmp` file that
//! is renamed over the collection, so readers never see a partial file.

use std::path::{Path, PathBuf};

use crate::error::{StoreError, StoreResult};
use crate::model::{Book, BookRecord};

/// Handle to the persisted collection.
#[derive(Debug, Clone)]
pub struct BookStore {
    path: PathBuf,
}

impl BookStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every book, recovering from any failure.
    ///
    /// A missing file is an empty catalog. An unreadable or malformed file is
    /// logged and also treated as empty.
    pub fn load_all(&self) -> Vec<Book> {
        match self.try_load() {
            Ok(books) => books,
            Err(e) => {
                tracing::warn!(error = %e, "catalog unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Load every book, reporting read and parse failures.
    pub fn try_load(&self) -> StoreResult<Vec<Book>> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no catalog file yet");
            return Ok(Vec::new());
        }

        let data = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.display().to_string(),
            source,
        })?;
        let records: Vec<BookRecord> =
            serde_json::from_str(&data).map_err(|source| StoreError::Parse {
                path: self.path.display().to_string(),
                source,
            })?;

        tracing::debug!(count = records.len(), "catalog loaded");
        Ok(records.into_iter().map(Book::from_record).collect())
    }

    /// Overwrite the persisted collection with `books`.
    pub fn save_all(&self, books: &[Book]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        let records: Vec<BookRecord> = books.iter().map(Book::to_record).collect();
        let json = serde_json::to_string_pretty(&records)
            .map_err(|source| StoreError::Serialize { source })?;
        let tmp = self.tmp_path();
        std::fs::write(&tmp, json).map_err(|source| StoreError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        if let Err(source) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(StoreError::Io {
                path: self.path.display().to_string(),
                source,
            });
        }

        tracing::debug!(count = books.len(), path = %self.path.display(), "catalog saved");
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}
