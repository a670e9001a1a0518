//! Built-in language data.
//!
//! Each language contributes a row to the profile table and, where it has
//! them, an expander and a segmentation lexicon. Nothing here is consulted by
//! the pipeline directly; it only feeds profile construction.

pub mod vietnamese;

use std::sync::Arc;

use crate::frontend::config::{AlphabetSpec, ProfileEntry};
use crate::frontend::normalizer::Expander;
use crate::frontend::segmenter::LexiconSegmenter;

fn entry(code: &str, name: &str, alphabet: AlphabetSpec) -> ProfileEntry {
    ProfileEntry {
        code: code.to_string(),
        name: name.to_string(),
        alphabet,
        control_token: None,
        segmentation: false,
        expansion: false,
        collapse_whitespace: true,
    }
}

fn extra_letters(letters: &str) -> AlphabetSpec {
    AlphabetSpec {
        extra: letters.to_string(),
        ..Default::default()
    }
}

/// The built-in profile table. Control tokens come from the vocabulary.
pub fn builtin_profiles() -> Vec<ProfileEntry> {
    vec![
        entry("en", "English", AlphabetSpec::default()),
        ProfileEntry {
            segmentation: true,
            expansion: true,
            ..entry("vi", "Vietnamese", vietnamese::alphabet())
        },
        entry("fr", "French", extra_letters("àâæçéèêëîïôœùûüÿ")),
        entry("es", "Spanish", extra_letters("áéíóúüñ")),
        entry("de", "German", extra_letters("äöüß")),
    ]
}

/// Text expander for a language code, if one exists.
pub fn expander_for(code: &str) -> Option<Arc<dyn Expander>> {
    match code {
        "vi" => Some(Arc::new(vietnamese::VietnameseExpander::default())),
        _ => None,
    }
}

/// Built-in segmentation lexicon for a language code, if one exists.
pub fn builtin_lexicon(code: &str) -> Option<LexiconSegmenter> {
    match code {
        "vi" => Some(LexiconSegmenter::new(vietnamese::COMMON_WORDS)),
        _ => None,
    }
}
