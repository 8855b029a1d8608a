use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Characters treated as punctuation when comparing tokens.
///
/// ASCII punctuation is always included; `extra` adds the typographic marks
/// that show up in book texts but never in ASR output.
#[derive(Debug, Clone, Copy)]
pub struct PunctuationSet {
    extra: &'static [char],
}

impl PunctuationSet {
    pub const DEFAULT: Self = Self {
        extra: &[
            '—', '–', '…', '«', '»', '“', '”', '„', '‘', '’', '¿', '¡', '·',
        ],
    };

    #[must_use]
    pub fn contains(&self, c: char) -> bool {
        c.is_ascii_punctuation() || self.extra.contains(&c)
    }

    /// A token is punctuation when it is non-empty and made only of punctuation chars.
    #[must_use]
    pub fn is_punctuation(&self, text: &str) -> bool {
        !text.is_empty() && text.chars().all(|c| self.contains(c))
    }

    /// Punctuation that may close the preceding phrase.
    ///
    /// Opening brackets, quotes, inverted marks and dashes start the next phrase instead.
    #[must_use]
    pub fn is_closing(&self, text: &str) -> bool {
        const OPENING: &[char] = &['(', '[', '{', '«', '“', '‘', '„', '¿', '¡', '—', '–'];
        self.is_punctuation(text) && !text.chars().any(|c| OPENING.contains(&c))
    }

    /// Remove every punctuation char from `text`.
    #[must_use]
    pub fn strip(&self, text: &str) -> String {
        text.chars().filter(|&c| !self.contains(c)).collect()
    }
}

impl Default for PunctuationSet {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Builds the comparison forms of fragment and reference text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    pub punctuation: PunctuationSet,
    pub fold_diacritics: bool,
}

impl Normalizer {
    #[must_use]
    pub fn new(fold_diacritics: bool) -> Self {
        Self {
            punctuation: PunctuationSet::DEFAULT,
            fold_diacritics,
        }
    }

    /// Lower-cased text, optionally with diacritics removed ("Olá" -> "ola").
    #[must_use]
    pub fn key(&self, text: &str) -> String {
        let lower = text.to_lowercase();
        if self.fold_diacritics {
            lower.nfd().filter(|&c| !is_combining_mark(c)).nfc().collect()
        } else {
            lower
        }
    }

    /// Comparison key with punctuation removed and the ends trimmed.
    /// Inner whitespace is kept.
    #[must_use]
    pub fn clean(&self, text: &str) -> String {
        self.punctuation
            .strip(&self.key(text))
            .trim()
            .to_string()
    }

    /// Cleaned text as one string with no whitespace at all.
    #[must_use]
    pub fn flatten(&self, text: &str) -> String {
        self.clean(text)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }
}

/// Optional substitutions applied to a reference text before tokenizing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    /// Replace URLs with `<URL>`
    pub replace_urls: bool,
    /// Replace e-mail addresses with `<EMAIL>`
    pub replace_emails: bool,
    /// Replace numbers with `<NUMBER>`
    pub replace_numbers: bool,
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>]+").expect("URL pattern is valid")
    })
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b[\w.+-]+@[\w-]+(?:\.[\w-]+)+\b").expect("e-mail pattern is valid")
    })
}

fn number_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d+(?:[.,]\d+)*\b").expect("number pattern is valid"))
}

/// Prepare a reference book for alignment.
///
/// Applies NFC normalization, turns line breaks into spaces, collapses
/// whitespace runs and performs the substitutions enabled in `options`.
#[must_use]
pub fn clean_reference(text: &str, options: &CleaningOptions) -> String {
    let mut text: String = text.nfc().collect();

    // E-mails first: an address may contain "www."
    if options.replace_emails {
        text = email_regex().replace_all(&text, "<EMAIL>").into_owned();
    }
    if options.replace_urls {
        text = url_regex().replace_all(&text, "<URL>").into_owned();
    }
    if options.replace_numbers {
        text = number_regex().replace_all(&text, "<NUMBER>").into_owned();
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
