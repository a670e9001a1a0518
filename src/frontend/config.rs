use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::error::FrontendError;

/// Declared letter repertoire of a language.
///
/// The full alphabet is `letters` combined with every entry of `marks`
/// (when the combination has a precomposed form), plus `extra`, in both cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlphabetSpec {
    /// Base letters that accept the diacritic marks.
    pub letters: String,
    /// Combining marks applied to every base letter.
    pub marks: Vec<char>,
    /// Letters added as-is.
    pub extra: String,
}

/// One row of the language profile table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileEntry {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub alphabet: AlphabetSpec,
    /// Control-token id. `None` takes the id the vocabulary reserves for `code`.
    #[serde(default)]
    pub control_token: Option<i64>,
    /// Whether the language may use a word segmenter.
    #[serde(default)]
    pub segmentation: bool,
    /// Whether the language has a text expander.
    #[serde(default)]
    pub expansion: bool,
    #[serde(default = "default_true")]
    pub collapse_whitespace: bool,
}

fn default_true() -> bool {
    true
}

impl ProfileEntry {
    /// Read a profile table (a JSON list of entries) from disk.
    pub fn load_table(path: &Path) -> Result<Vec<Self>, FrontendError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse_table(&content)
    }

    pub fn parse_table(json: &str) -> Result<Vec<Self>, FrontendError> {
        let entries: Vec<Self> = serde_json::from_str(json)?;
        for entry in &entries {
            if entry.code.trim().is_empty() {
                return Err(FrontendError::Config(format!(
                    "profile '{}' has an empty language code",
                    entry.name
                )));
            }
        }
        Ok(entries)
    }
}

/// Where a language's word segmenter comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SegmenterConfig {
    /// Maximal matching against a word list. `None` uses the built-in lexicon.
    Lexicon {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// External word tokenizer reading stdin and writing stdout.
    Command {
        bin_path: PathBuf,
        #[serde(default)]
        args: Vec<String>,
    },
}

/// Startup configuration of the frontend.
///
/// Relative paths are resolved against the directory holding the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontendConfig {
    /// Vocabulary artifact (`.json`, or `.zip` with the `bundle` feature).
    pub vocabulary: PathBuf,
    /// Inline profile table. Empty falls back to `languages_file`, then to the
    /// built-in table.
    #[serde(default)]
    pub languages: Vec<ProfileEntry>,
    #[serde(default)]
    pub languages_file: Option<PathBuf>,
    /// Segmenter per language code.
    #[serde(default)]
    pub segmenters: HashMap<String, SegmenterConfig>,
}

impl FrontendConfig {
    pub fn new(vocabulary: impl Into<PathBuf>) -> Self {
        Self {
            vocabulary: vocabulary.into(),
            languages: Vec::new(),
            languages_file: None,
            segmenters: HashMap::new(),
        }
    }

    pub fn load(path: &Path) -> Result<Self, FrontendError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.resolve_relative_to(base))
    }

    fn resolve_relative_to(mut self, base: &Path) -> Self {
        let resolve = |path: &Path| -> PathBuf {
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                base.join(path)
            }
        };

        self.vocabulary = resolve(&self.vocabulary);
        self.languages_file = self.languages_file.as_deref().map(|path| resolve(path));
        for segmenter in self.segmenters.values_mut() {
            match segmenter {
                SegmenterConfig::Lexicon { path: Some(path) } => *path = resolve(path),
                SegmenterConfig::Lexicon { path: None } => {}
                // Bare program names are looked up on PATH.
                SegmenterConfig::Command { bin_path, .. } => {
                    if bin_path.components().count() > 1 {
                        *bin_path = resolve(bin_path);
                    }
                }
            }
        }
        self
    }

    /// The profile table this config selects.
    pub fn profile_entries(&self) -> Result<Vec<ProfileEntry>, FrontendError> {
        if !self.languages.is_empty() {
            return Ok(self.languages.clone());
        }
        match &self.languages_file {
            Some(path) => ProfileEntry::load_table(path),
            None => Ok(crate::languages::builtin_profiles()),
        }
    }
}
