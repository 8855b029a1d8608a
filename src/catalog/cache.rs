use std::sync::Arc;

use tracing::debug;

use crate::catalog::store::CatalogError;
use crate::core::token::TokenizedText;

/// Holds the most recently used reference book.
///
/// Fragments are processed in filename order, so consecutive fragments
/// mostly share a book; a single entry avoids re-reading and re-tokenizing
/// it while keeping memory bounded to one book.
#[derive(Debug, Default)]
pub struct BookCache {
    entry: Option<(String, Arc<TokenizedText>)>,
    loads: usize,
}

impl BookCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached book if it is `book_id`, otherwise load and cache it.
    ///
    /// A failed load leaves the previous entry in place.
    ///
    /// # Errors
    ///
    /// Propagates the error returned by `load`.
    pub fn get_or_load<F>(
        &mut self,
        book_id: &str,
        load: F,
    ) -> Result<Arc<TokenizedText>, CatalogError>
    where
        F: FnOnce() -> Result<TokenizedText, CatalogError>,
    {
        if let Some((cached_id, text)) = &self.entry {
            if cached_id == book_id {
                return Ok(Arc::clone(text));
            }
        }

        let text = Arc::new(load()?);
        self.loads += 1;
        debug!(book_id, tokens = text.len(), "Loaded reference book");
        self.entry = Some((book_id.to_string(), Arc::clone(&text)));
        Ok(text)
    }

    /// Id of the cached book, if any
    #[must_use]
    pub fn current(&self) -> Option<&str> {
        self.entry.as_ref().map(|(id, _)| id.as_str())
    }

    /// Number of loads performed (cache misses)
    #[must_use]
    pub fn loads(&self) -> usize {
        self.loads
    }
}
