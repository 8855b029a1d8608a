use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::validation::is_valid_book_id;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Reference text for book '{book_id}' not found at {}", .path.display())]
    MissingReference { book_id: String, path: PathBuf },

    #[error("Invalid book id '{0}'")]
    InvalidBookId(String),

    #[error("Failed to read reference text {}: {source}", .path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File extension of reference books
pub const BOOK_EXTENSION: &str = "txt";

/// A folder of reference books named `<book_id>.txt`
#[derive(Debug, Clone)]
pub struct BookStore {
    root: PathBuf,
}

impl BookStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the book text for `book_id`
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::InvalidBookId` for ids that could escape the folder.
    pub fn path_for(&self, book_id: &str) -> Result<PathBuf, CatalogError> {
        if !is_valid_book_id(book_id) {
            return Err(CatalogError::InvalidBookId(book_id.to_string()));
        }
        Ok(self.root.join(format!("{book_id}.{BOOK_EXTENSION}")))
    }

    /// Read the raw text of a book.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::MissingReference` if the file does not exist,
    /// `CatalogError::InvalidBookId` for unsafe ids, or
    /// `CatalogError::ReadError` if it cannot be read.
    pub fn load_text(&self, book_id: &str) -> Result<String, CatalogError> {
        let path = self.path_for(book_id)?;
        read_book(book_id, &path)
    }
}

/// Read a book file, mapping a missing file to `MissingReference`.
///
/// # Errors
///
/// Returns `CatalogError::MissingReference` if `path` does not exist or
/// `CatalogError::ReadError` for any other IO failure.
pub fn read_book(book_id: &str, path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            CatalogError::MissingReference {
                book_id: book_id.to_string(),
                path: path.to_path_buf(),
            }
        } else {
            CatalogError::ReadError {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_for() {
        let store = BookStore::new("/data/books");
        assert_eq!(
            store.path_for("10066").unwrap(),
            PathBuf::from("/data/books/10066.txt")
        );
        assert!(matches!(
            store.path_for("../secret"),
            Err(CatalogError::InvalidBookId(_))
        ));
    }

    #[test]
    fn test_load_text() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("42.txt"), "Era uma vez.").unwrap();
        let store = BookStore::new(dir.path());

        assert_eq!(store.load_text("42").unwrap(), "Era uma vez.");
        assert!(matches!(
            store.load_text("43"),
            Err(CatalogError::MissingReference { book_id, .. }) if book_id == "43"
        ));
    }
}
