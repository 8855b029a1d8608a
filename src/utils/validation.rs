//! Centralized validation for configuration values and book identifiers.

/// Maximum number of search workers accepted
pub const MAX_THREADS: usize = 256;

/// Maximum number of extra reference tokens in a char window
pub const MAX_CHAR_WINDOW_PADDING: usize = 10_000;

/// Maximum length of a book identifier
pub const MAX_BOOK_ID_LENGTH: usize = 255;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unsupported similarity metric '{0}' (expected 'hamming' or 'levenshtein')")]
    UnsupportedMetric(String),

    #[error("Invalid {name}: {value} (must be in {range})")]
    OutOfRange {
        name: &'static str,
        value: f64,
        range: &'static str,
    },

    #[error("Invalid thread count {0}: must be between 1 and {max}", max = MAX_THREADS)]
    InvalidThreadCount(usize),

    #[error(
        "Invalid char window padding {0}: must be at most {max}",
        max = MAX_CHAR_WINDOW_PADDING
    )]
    InvalidWindowPadding(usize),

    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Check that `value` lies in `[0.0, 1.0]`.
///
/// # Errors
///
/// Returns `ConfigError::OutOfRange` for values outside the interval or NaN.
pub fn check_unit_interval(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            range: "[0, 1]",
        })
    }
}

/// Check that `value` lies in `(0.0, 1.0]`.
///
/// # Errors
///
/// Returns `ConfigError::OutOfRange` for zero, negative, NaN or values above one.
pub fn check_positive_unit(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            range: "(0, 1]",
        })
    }
}

/// Check the number of search workers.
///
/// # Errors
///
/// Returns `ConfigError::InvalidThreadCount` for zero or more than [`MAX_THREADS`].
pub fn check_thread_count(threads: usize) -> Result<(), ConfigError> {
    if (1..=MAX_THREADS).contains(&threads) {
        Ok(())
    } else {
        Err(ConfigError::InvalidThreadCount(threads))
    }
}

/// Check the number of extra reference tokens added to each char window.
///
/// # Errors
///
/// Returns `ConfigError::InvalidWindowPadding` above [`MAX_CHAR_WINDOW_PADDING`].
pub fn check_window_padding(padding: usize) -> Result<(), ConfigError> {
    if padding <= MAX_CHAR_WINDOW_PADDING {
        Ok(())
    } else {
        Err(ConfigError::InvalidWindowPadding(padding))
    }
}

/// Whether `book_id` is safe to turn into a file name inside the books folder.
///
/// Rejects empty ids, overlong ids, path separators, `..` and control chars.
#[must_use]
pub fn is_valid_book_id(book_id: &str) -> bool {
    !book_id.trim().is_empty()
        && book_id.len() <= MAX_BOOK_ID_LENGTH
        && !book_id.contains("..")
        && !book_id.contains('/')
        && !book_id.contains('\\')
        && !book_id.chars().any(char::is_control)
}
