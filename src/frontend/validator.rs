use std::collections::HashSet;

use super::config::AlphabetSpec;
use super::normalizer::compose;

/// Characters that failed validation, with their char offsets in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub offending: Vec<(usize, char)>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.offending.is_empty()
    }

    /// Distinct offending characters in order of first appearance.
    pub fn offending_chars(&self) -> Vec<char> {
        let mut seen = HashSet::new();
        self.offending
            .iter()
            .map(|&(_, ch)| ch)
            .filter(|ch| seen.insert(*ch))
            .collect()
    }
}

/// Checks that text is plausible for a declared language.
///
/// This is a charset filter meant to catch foreign-script contamination, not a
/// grammar checker.
pub trait Validator: Send + Sync {
    fn check(&self, text: &str) -> ValidationReport;

    fn validate(&self, text: &str) -> bool {
        self.check(text).is_valid()
    }
}

/// Accepts ASCII, non-letters, and the letters of one declared alphabet.
///
/// A character is rejected only if it is alphabetic, outside ASCII, and not a
/// member of the alphabet. Digits, punctuation and whitespace of any script
/// always pass.
#[derive(Debug, Clone, Default)]
pub struct AlphabetValidator {
    alphabet: HashSet<char>,
}

impl AlphabetValidator {
    pub fn new(alphabet: HashSet<char>) -> Self {
        Self { alphabet }
    }

    pub fn from_spec(spec: &AlphabetSpec) -> Self {
        Self::new(expand_alphabet(spec))
    }

    pub fn alphabet(&self) -> &HashSet<char> {
        &self.alphabet
    }

    pub fn accepts(&self, ch: char) -> bool {
        !ch.is_alphabetic() || ch.is_ascii() || self.alphabet.contains(&ch)
    }
}

impl Validator for AlphabetValidator {
    fn check(&self, text: &str) -> ValidationReport {
        ValidationReport {
            offending: text
                .chars()
                .enumerate()
                .filter(|&(_, ch)| !self.accepts(ch))
                .collect(),
        }
    }
}

/// Expand an alphabet declaration into its full character set.
///
/// Every base letter is combined with every mark; combinations that compose
/// to a single code point are kept. Extra letters are added as-is, and the
/// upper-case form of everything is added when it is a single code point.
pub fn expand_alphabet(spec: &AlphabetSpec) -> HashSet<char> {
    let mut lower = HashSet::new();
    for letter in spec.letters.chars().filter(|c| !c.is_whitespace()) {
        lower.insert(letter);
        for &mark in &spec.marks {
            let mut combined = String::with_capacity(8);
            combined.push(letter);
            combined.push(mark);
            if let Some(ch) = single_char(&compose(&combined)) {
                lower.insert(ch);
            }
        }
    }
    lower.extend(spec.extra.chars().filter(|c| !c.is_whitespace()));

    let mut alphabet = lower.clone();
    for ch in lower {
        for cased in [ch.to_uppercase().to_string(), ch.to_lowercase().to_string()] {
            if let Some(c) = single_char(&cased) {
                alphabet.insert(c);
            }
        }
    }
    alphabet
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => Some(ch),
        _ => None,
    }
}
