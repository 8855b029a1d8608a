//! Reference book storage and caching.
//!
//! Reference books live in a folder as `<book_id>.txt`. A fragment names its
//! book through the middle part of its `speaker_book_segment` identifier.
//!
//! ## Example
//!
//! ```rust,no_run
//! use phrase_aligner::catalog::store::BookStore;
//!
//! let store = BookStore::new("lv_text/portuguese");
//! let text = store.load_text("10066").unwrap();
//! ```
//!
//! Loaded books are tokenized once and kept in a single-entry
//! [`cache::BookCache`] owned by the alignment engine.

pub mod cache;
pub mod store;
