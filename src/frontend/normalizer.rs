use std::fmt;
use std::ops::Deref;

use unicode_normalization::{is_nfc_quick, IsNormalized, UnicodeNormalization};

/// Text in Unicode canonical composed form (NFC).
///
/// Only produced by normalization, so holders can rely on a base letter plus
/// combining mark and the equivalent precomposed code point never both
/// appearing downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedText(String);

impl NormalizedText {
    /// Compose `text` to NFC. Already-composed input is returned unchanged.
    pub fn new(text: &str) -> Self {
        Self(compose(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for NormalizedText {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NormalizedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonicalizes the Unicode representation of text for one language.
///
/// Must be deterministic and total: any `&str` is accepted, including text
/// mixing scripts, digits and punctuation. Foreign-script handling belongs to
/// the [`Validator`](super::Validator), not here.
pub trait Normalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

impl<F> Normalizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn normalize(&self, text: &str) -> String {
        self(text)
    }
}

/// Rewrites text into a more speakable form (abbreviations, numerals, etc.).
///
/// Unlike a [`Normalizer`], an expander is allowed to change visible glyphs,
/// so it only runs when a request opts in.
pub trait Expander: Send + Sync {
    fn expand(&self, text: &str) -> String;
}

impl<F> Expander for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn expand(&self, text: &str) -> String {
        self(text)
    }
}

/// Stock normalizer: NFC, optionally followed by whitespace collapsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NfcNormalizer {
    /// Replace every whitespace run with a single space and trim both ends.
    pub collapse_whitespace: bool,
}

impl Default for NfcNormalizer {
    fn default() -> Self {
        Self {
            collapse_whitespace: true,
        }
    }
}

impl NfcNormalizer {
    pub fn new(collapse_whitespace: bool) -> Self {
        Self {
            collapse_whitespace,
        }
    }
}

impl Normalizer for NfcNormalizer {
    fn normalize(&self, text: &str) -> String {
        let composed = compose(text);
        if self.collapse_whitespace {
            collapse_whitespace(&composed)
        } else {
            composed
        }
    }
}

pub(crate) fn compose(text: &str) -> String {
    match is_nfc_quick(text.chars()) {
        IsNormalized::Yes => text.to_string(),
        _ => text.nfc().collect(),
    }
}

pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
