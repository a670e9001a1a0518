use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::FrontendError;

/// Punctuation whose ids mark preferred split points in long sequences.
const BOUNDARY_UNITS: &[&str] = &[".", "!", "?", ";", ":", ","];

/// How a whitespace-free run of text is split into vocabulary units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitAlgorithm {
    /// Start from characters and apply the merge table by priority.
    #[default]
    Merge,
    /// Take the longest vocabulary unit at each position.
    LongestMatch,
}

/// On-disk form of a vocabulary.
///
/// ```json
/// {
///   "version": "1.0.0",
///   "unknown_id": 0,
///   "space_unit": "[SPACE]",
///   "algorithm": "merge",
///   "units": {"a": 1, "n": 2, "an": 3},
///   "merges": ["a n"],
///   "control_tokens": {"vi": 500}
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyArtifact {
    pub version: String,
    pub unknown_id: i64,
    #[serde(default)]
    pub space_unit: Option<String>,
    #[serde(default)]
    pub algorithm: SplitAlgorithm,
    pub units: HashMap<String, i64>,
    /// Merge rules, highest priority first, as `"left right"`.
    #[serde(default)]
    pub merges: Vec<String>,
    #[serde(default)]
    pub control_tokens: HashMap<String, i64>,
}

/// Immutable unit/id mapping with merge priorities and reserved ids.
///
/// Built once at startup and shared read-only; nothing mutates it afterwards.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    version: String,
    units: HashMap<String, i64>,
    reverse: HashMap<i64, String>,
    // left -> right -> rank, so lookups can borrow both halves
    merge_ranks: HashMap<String, HashMap<String, usize>>,
    unknown_id: i64,
    control_tokens: HashMap<String, i64>,
    control_ids: HashSet<i64>,
    space_unit: Option<String>,
    algorithm: SplitAlgorithm,
    max_unit_chars: usize,
}

impl Vocabulary {
    /// Load a vocabulary artifact.
    ///
    /// `.zip` files are read as bundles (requires the `bundle` feature);
    /// anything else is parsed as JSON.
    pub fn load(path: &Path) -> Result<Self, FrontendError> {
        if path.extension().and_then(|e| e.to_str()) == Some("zip") {
            #[cfg(feature = "bundle")]
            return bundle::load(path).map(|(vocab, _)| vocab);
            #[cfg(not(feature = "bundle"))]
            return Err(FrontendError::Vocabulary(format!(
                "{} is a zip bundle; enable the `bundle` feature to load it",
                path.display()
            )));
        }

        log::info!("Loading vocabulary from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, FrontendError> {
        let artifact: VocabularyArtifact = serde_json::from_str(json)?;
        Self::from_artifact(artifact)
    }

    pub fn from_artifact(artifact: VocabularyArtifact) -> Result<Self, FrontendError> {
        if artifact.version.trim().is_empty() {
            return Err(FrontendError::Vocabulary(
                "missing 'version' field".to_string(),
            ));
        }

        let mut owners: HashMap<i64, String> = HashMap::new();
        let mut claim = |id: i64, owner: String| -> Result<(), FrontendError> {
            if id < 0 {
                return Err(FrontendError::Vocabulary(format!(
                    "{owner} has negative id {id}"
                )));
            }
            if let Some(previous) = owners.insert(id, owner.clone()) {
                return Err(FrontendError::Vocabulary(format!(
                    "id {id} is assigned to both {previous} and {owner}"
                )));
            }
            Ok(())
        };

        claim(artifact.unknown_id, "the unknown unit".to_string())?;
        for (unit, &id) in &artifact.units {
            if unit.is_empty() {
                return Err(FrontendError::Vocabulary("empty unit in 'units'".to_string()));
            }
            claim(id, format!("unit {unit:?}"))?;
        }

        let mut control_tokens = HashMap::with_capacity(artifact.control_tokens.len());
        for (code, &id) in &artifact.control_tokens {
            let code = code.trim().to_ascii_lowercase();
            claim(id, format!("control token for '{code}'"))?;
            if control_tokens.insert(code.clone(), id).is_some() {
                return Err(FrontendError::Vocabulary(format!(
                    "language '{code}' has more than one control token"
                )));
            }
        }

        if let Some(space) = &artifact.space_unit {
            if !artifact.units.contains_key(space) {
                return Err(FrontendError::Vocabulary(format!(
                    "space unit {space:?} is not in 'units'"
                )));
            }
        }

        let mut merge_ranks: HashMap<String, HashMap<String, usize>> = HashMap::new();
        let mut rank = 0usize;
        let mut orphaned = 0usize;
        for (line_no, line) in artifact.merges.iter().enumerate() {
            if line.starts_with("#version") {
                continue;
            }
            let (left, right) = line
                .split_once(' ')
                .filter(|(l, r)| !l.is_empty() && !r.is_empty() && !r.contains(' '))
                .ok_or_else(|| {
                    FrontendError::Vocabulary(format!(
                        "merge {line_no} must be \"left right\", got {line:?}"
                    ))
                })?;
            if !artifact.units.contains_key(&format!("{left}{right}")) {
                orphaned += 1;
            }
            let slot = merge_ranks.entry(left.to_string()).or_default();
            if !slot.contains_key(right) {
                slot.insert(right.to_string(), rank);
                rank += 1;
            }
        }
        if orphaned > 0 {
            log::warn!(
                "{orphaned} merge rules produce units missing from the vocabulary; \
                 they will encode as the unknown id"
            );
        }

        let reverse = artifact
            .units
            .iter()
            .map(|(unit, &id)| (id, unit.clone()))
            .collect();
        let max_unit_chars = artifact
            .units
            .keys()
            .map(|unit| unit.chars().count())
            .max()
            .unwrap_or(1)
            .max(1);
        let control_ids = control_tokens.values().copied().collect();

        log::info!(
            "Vocabulary {}: {} units, {} merges, {} control tokens",
            artifact.version,
            artifact.units.len(),
            rank,
            control_tokens.len()
        );

        Ok(Self {
            version: artifact.version,
            units: artifact.units,
            reverse,
            merge_ranks,
            unknown_id: artifact.unknown_id,
            control_tokens,
            control_ids,
            space_unit: artifact.space_unit,
            algorithm: artifact.algorithm,
            max_unit_chars,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn algorithm(&self) -> SplitAlgorithm {
        self.algorithm
    }

    pub fn unknown_id(&self) -> i64 {
        self.unknown_id
    }

    pub fn space_unit(&self) -> Option<&str> {
        self.space_unit.as_deref()
    }

    /// Number of sub-word units, excluding the unknown and control ids.
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn id_of(&self, unit: &str) -> Option<i64> {
        self.units.get(unit).copied()
    }

    pub fn unit_of(&self, id: i64) -> Option<&str> {
        self.reverse.get(&id).map(String::as_str)
    }

    pub fn contains(&self, unit: &str) -> bool {
        self.units.contains_key(unit)
    }

    /// Priority of merging `left` and `right`; lower merges first.
    pub fn merge_rank(&self, left: &str, right: &str) -> Option<usize> {
        self.merge_ranks.get(left)?.get(right).copied()
    }

    pub(crate) fn max_unit_chars(&self) -> usize {
        self.max_unit_chars
    }

    /// Control-token id reserved for a language code.
    pub fn control_token(&self, code: &str) -> Option<i64> {
        self.control_tokens
            .get(&code.trim().to_ascii_lowercase())
            .copied()
    }

    pub fn is_control(&self, id: i64) -> bool {
        self.control_ids.contains(&id)
    }

    /// Ids of sentence and clause punctuation present in the vocabulary.
    pub fn boundary_ids(&self) -> Vec<i64> {
        BOUNDARY_UNITS
            .iter()
            .filter_map(|unit| self.id_of(unit))
            .collect()
    }

    /// Best-effort text for a sequence of ids.
    ///
    /// Control tokens and unknown ids are dropped; the space unit becomes a
    /// plain space.
    pub fn decode(&self, ids: &[i64]) -> String {
        let mut text = String::new();
        for &id in ids {
            if id == self.unknown_id || self.is_control(id) {
                continue;
            }
            match self.unit_of(id) {
                Some(unit) if Some(unit) == self.space_unit() => text.push(' '),
                Some(unit) => text.push_str(unit),
                None => {}
            }
        }
        text
    }
}

#[cfg(feature = "bundle")]
pub mod bundle {
    //! Zip-packaged artifacts: `vocab.json` plus an optional `languages.json`
    //! profile table.

    use std::fs::File;
    use std::io::Read;
    use std::path::Path;

    use super::Vocabulary;
    use crate::frontend::config::ProfileEntry;
    use crate::frontend::error::FrontendError;

    pub const VOCAB_ENTRY: &str = "vocab.json";
    pub const LANGUAGES_ENTRY: &str = "languages.json";

    pub fn load(path: &Path) -> Result<(Vocabulary, Option<Vec<ProfileEntry>>), FrontendError> {
        log::info!("Loading vocabulary bundle from {}", path.display());
        let file = File::open(path)?;
        let mut zip = zip::ZipArchive::new(file)?;

        let vocab_json = read_entry(&mut zip, VOCAB_ENTRY)?.ok_or_else(|| {
            FrontendError::Vocabulary(format!(
                "{} has no {VOCAB_ENTRY} entry",
                path.display()
            ))
        })?;
        let vocab = Vocabulary::from_json(&vocab_json)?;

        let profiles = read_entry(&mut zip, LANGUAGES_ENTRY)?
            .map(|json| ProfileEntry::parse_table(&json))
            .transpose()?;

        Ok((vocab, profiles))
    }

    fn read_entry(
        zip: &mut zip::ZipArchive<File>,
        name: &str,
    ) -> Result<Option<String>, FrontendError> {
        let mut entry = match zip.by_name(name) {
            Ok(entry) => entry,
            Err(zip::result::ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut content = String::new();
        entry.read_to_string(&mut content)?;
        Ok(Some(content))
    }
}
