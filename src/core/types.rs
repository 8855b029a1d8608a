use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::validation::ConfigError;

/// Similarity metric used for token comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MetricKind {
    /// Position-by-position char comparison (fast, length sensitive)
    #[default]
    Hamming,
    /// Normalized edit distance (slower, tolerates insertions and deletions)
    Levenshtein,
}

impl MetricKind {
    /// Minimum per-token similarity accepted while walking a span word by word.
    ///
    /// Levenshtein forgives more noise per comparison, so it gets the stricter floor.
    #[must_use]
    pub fn word_threshold(self) -> f64 {
        match self {
            Self::Hamming => 0.3,
            Self::Levenshtein => 0.5,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hamming => "hamming",
            Self::Levenshtein => "levenshtein",
        }
    }
}

impl FromStr for MetricKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "hamming" => Ok(Self::Hamming),
            "levenshtein" => Ok(Self::Levenshtein),
            other => Err(ConfigError::UnsupportedMetric(other.to_string())),
        }
    }
}

impl TryFrom<String> for MetricKind {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MetricKind> for String {
    fn from(value: MetricKind) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for MetricKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which matcher is authoritative for a search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SearchType {
    /// Word matcher first, char matcher as fallback
    #[default]
    Word,
    /// Char matcher only
    Char,
}

impl std::fmt::Display for SearchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Word => write!(f, "word"),
            Self::Char => write!(f, "char"),
        }
    }
}

/// Matcher that produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Word,
    Char,
}

/// Identifier of a fragment in the form `speaker_book_segment`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FragmentId {
    pub speaker: String,
    pub book: String,
    pub segment: String,
}

impl FragmentId {
    /// Split a fragment filename into its three parts.
    ///
    /// Returns `None` unless there are exactly three non-empty parts.
    #[must_use]
    pub fn parse(filename: &str) -> Option<Self> {
        let mut parts = filename.trim().split('_');
        let speaker = parts.next()?;
        let book = parts.next()?;
        let segment = parts.next()?;
        if parts.next().is_some() || [speaker, book, segment].iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(Self {
            speaker: speaker.to_string(),
            book: book.to_string(),
            segment: segment.to_string(),
        })
    }
}

impl std::fmt::Display for FragmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}_{}_{}", self.speaker, self.book, self.segment)
    }
}
