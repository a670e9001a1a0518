use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, OnceLock};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use unicode_normalization::char::is_combining_mark;

use crate::{SpeechModel, SynthesisResult};

use super::config::{FrontendConfig, ProfileEntry, SegmenterConfig};
use super::encoder::{encode, TokenSequence};
use super::error::FrontendError;
use super::normalizer::NormalizedText;
use super::profile::LanguageProfile;
use super::registry::Registry;
use super::segmenter::{CommandSegmenter, LexiconSegmenter, Segmenter};
use super::validator::ValidationReport;
use super::vocab::Vocabulary;

static GLOBAL: OnceLock<Pipeline> = OnceLock::new();

/// What to do when text contains letters outside its language's alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationPolicy {
    /// Fail the call with [`FrontendError::InvalidText`].
    Strict,
    /// Log a warning and encode anyway; offending letters usually become
    /// unknown ids.
    #[default]
    Warn,
    /// Remove the offending characters, then encode.
    Strip,
}

/// Per-call encoding options.
#[derive(Debug, Clone, PartialEq, Eq, Default, Builder)]
#[builder(default)]
pub struct EncodeOptions {
    pub validation: ValidationPolicy,
    /// Run the language's word segmenter, if it has one.
    pub use_segmentation: bool,
    /// Run the language's text expander, if it has one.
    pub expand_text: bool,
}

impl EncodeOptions {
    pub fn strict() -> Self {
        Self {
            validation: ValidationPolicy::Strict,
            ..Default::default()
        }
    }

    pub fn lenient() -> Self {
        Self::default()
    }
}

/// Resolve → normalize → validate → encode.
///
/// Holds only immutable shared state, so one pipeline serves any number of
/// threads.
#[derive(Debug, Clone)]
pub struct Pipeline {
    registry: Arc<Registry>,
    vocab: Arc<Vocabulary>,
}

impl Pipeline {
    /// Create a pipeline, checking that every profile's control token is
    /// consistent with the vocabulary.
    pub fn new(registry: Registry, vocab: Vocabulary) -> Result<Self, FrontendError> {
        Self::from_shared(Arc::new(registry), Arc::new(vocab))
    }

    pub fn from_shared(
        registry: Arc<Registry>,
        vocab: Arc<Vocabulary>,
    ) -> Result<Self, FrontendError> {
        check_control_tokens(&registry, &vocab)?;
        log::info!(
            "Frontend ready: languages [{}], vocabulary {}",
            registry.codes().join(", "),
            vocab.version()
        );
        Ok(Self { registry, vocab })
    }

    /// Build the vocabulary and every profile from a startup configuration.
    pub fn from_config(config: &FrontendConfig) -> Result<Self, FrontendError> {
        let (vocab, bundled) = load_vocabulary(&config.vocabulary)?;
        let entries = match bundled {
            Some(table) if config.languages.is_empty() && config.languages_file.is_none() => {
                table
            }
            _ => config.profile_entries()?,
        };

        let mut registry = Registry::new();
        for entry in &entries {
            let control_token = entry
                .control_token
                .or_else(|| vocab.control_token(&entry.code))
                .ok_or_else(|| {
                    FrontendError::Config(format!(
                        "language '{}' has no control token in the table or vocabulary",
                        entry.code
                    ))
                })?;
            let segmenter = build_segmenter(entry, &config.segmenters)?;
            registry.register(LanguageProfile::from_entry(entry, control_token, segmenter)?)?;
        }

        Self::new(registry, vocab)
    }

    pub fn from_config_file(path: &Path) -> Result<Self, FrontendError> {
        Self::from_config(&FrontendConfig::load(path)?)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocab
    }

    /// Encode raw text for a language.
    ///
    /// Fails only for an unregistered language, or for text outside the
    /// language's alphabet under [`ValidationPolicy::Strict`].
    pub fn encode(
        &self,
        text: &str,
        code: &str,
        options: &EncodeOptions,
    ) -> Result<TokenSequence, FrontendError> {
        let profile = self.registry.resolve(code)?;
        let normalized = profile.prepare(text, options.expand_text, options.use_segmentation);

        let report = profile.validator().check(&normalized);
        let normalized = if report.is_valid() {
            normalized
        } else {
            match options.validation {
                ValidationPolicy::Strict => {
                    return Err(FrontendError::InvalidText {
                        language: profile.code().to_string(),
                        offending: report.offending_chars(),
                    });
                }
                ValidationPolicy::Warn => {
                    log::warn!(
                        "Text for '{}' has unexpected characters {:?}, encoding anyway",
                        profile.code(),
                        report.offending_chars()
                    );
                    normalized
                }
                ValidationPolicy::Strip => {
                    log::warn!(
                        "Removing unexpected characters {:?} from '{}' text",
                        report.offending_chars(),
                        profile.code()
                    );
                    strip(profile, normalized, report)
                }
            }
        };

        Ok(encode(
            &normalized,
            &self.vocab,
            profile.code(),
            profile.control_token(),
        ))
    }

    /// Encode, then split into sequences of at most `max_len` ids.
    pub fn encode_chunked(
        &self,
        text: &str,
        code: &str,
        options: &EncodeOptions,
        max_len: usize,
    ) -> Result<Vec<TokenSequence>, FrontendError> {
        let sequence = self.encode(text, code, options)?;
        Ok(sequence.chunks(max_len, &self.vocab.boundary_ids()))
    }

    /// Encode text and hand the sequence to a speech model.
    pub fn synthesize<M: SpeechModel>(
        &self,
        model: &mut M,
        text: &str,
        code: &str,
        options: &EncodeOptions,
        speaker: &[f32],
        params: Option<M::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
        let tokens = self.encode(text, code, options)?;
        model.synthesize_tokens(&tokens, speaker, params)
    }
}

/// Publish a process-wide pipeline. Only the first call succeeds.
pub fn install(pipeline: Pipeline) -> Result<&'static Pipeline, FrontendError> {
    GLOBAL
        .set(pipeline)
        .map_err(|_| FrontendError::AlreadyInitialized)?;
    GLOBAL.get().ok_or(FrontendError::AlreadyInitialized)
}

/// The pipeline published by [`install`], if any.
pub fn global() -> Option<&'static Pipeline> {
    GLOBAL.get()
}

/// Remove offending characters, and the combining marks attached to them, then
/// renormalize with the profile.
///
/// Renormalizing can compose a new letter, so the result is checked again
/// until it validates or stops shrinking.
fn strip(
    profile: &LanguageProfile,
    mut text: NormalizedText,
    mut report: ValidationReport,
) -> NormalizedText {
    while !report.is_valid() {
        let offsets: HashSet<usize> = report.offending.iter().map(|&(i, _)| i).collect();
        let mut kept = String::with_capacity(text.len());
        let mut dropping = false;
        for (i, ch) in text.chars().enumerate() {
            if offsets.contains(&i) {
                dropping = true;
            } else if !(dropping && is_combining_mark(ch)) {
                dropping = false;
                kept.push(ch);
            }
        }

        let stripped = profile.normalize(&kept);
        if stripped.chars().count() >= text.chars().count() {
            return stripped;
        }
        report = profile.validator().check(&stripped);
        text = stripped;
    }
    text
}

fn check_control_tokens(registry: &Registry, vocab: &Vocabulary) -> Result<(), FrontendError> {
    let mut owners: HashMap<i64, &str> = HashMap::new();
    for profile in registry.profiles() {
        let id = profile.control_token();
        match vocab.control_token(profile.code()) {
            Some(reserved) if reserved != id => {
                return Err(FrontendError::Config(format!(
                    "language '{}' uses control token {id} but the vocabulary reserves {reserved}",
                    profile.code()
                )));
            }
            Some(_) => {}
            None => {
                if id == vocab.unknown_id() || vocab.unit_of(id).is_some() || vocab.is_control(id)
                {
                    return Err(FrontendError::Config(format!(
                        "control token {id} of language '{}' is already used by the vocabulary",
                        profile.code()
                    )));
                }
            }
        }
        if let Some(other) = owners.insert(id, profile.code()) {
            return Err(FrontendError::Config(format!(
                "languages '{other}' and '{}' share control token {id}",
                profile.code()
            )));
        }
    }
    Ok(())
}

fn build_segmenter(
    entry: &ProfileEntry,
    configured: &HashMap<String, SegmenterConfig>,
) -> Result<Option<Arc<dyn Segmenter>>, FrontendError> {
    if !entry.segmentation {
        return Ok(None);
    }
    let code = entry.code.trim().to_ascii_lowercase();
    let segmenter: Option<Arc<dyn Segmenter>> = match configured.get(&code) {
        Some(SegmenterConfig::Lexicon { path: Some(path) }) => {
            Some(Arc::new(LexiconSegmenter::load(path)?))
        }
        Some(SegmenterConfig::Lexicon { path: None }) => {
            let lexicon = crate::languages::builtin_lexicon(&code).ok_or_else(|| {
                FrontendError::Config(format!("no built-in lexicon for language '{code}'"))
            })?;
            Some(Arc::new(lexicon))
        }
        Some(SegmenterConfig::Command { bin_path, args }) => Some(Arc::new(
            CommandSegmenter::new(bin_path.clone()).with_args(args.iter().cloned()),
        )),
        None => crate::languages::builtin_lexicon(&code)
            .map(|lexicon| Arc::new(lexicon) as Arc<dyn Segmenter>),
    };
    Ok(segmenter)
}

#[cfg(feature = "bundle")]
fn load_vocabulary(
    path: &Path,
) -> Result<(Vocabulary, Option<Vec<ProfileEntry>>), FrontendError> {
    if path.extension().and_then(|e| e.to_str()) == Some("zip") {
        super::vocab::bundle::load(path)
    } else {
        Ok((Vocabulary::load(path)?, None))
    }
}

#[cfg(not(feature = "bundle"))]
fn load_vocabulary(
    path: &Path,
) -> Result<(Vocabulary, Option<Vec<ProfileEntry>>), FrontendError> {
    Ok((Vocabulary::load(path)?, None))
}

#[cfg(test)]
mod tests {
    use super::{install, EncodeOptions, EncodeOptionsBuilder, Pipeline, ValidationPolicy};
    use crate::frontend::config::{AlphabetSpec, ProfileEntry};
    use crate::frontend::vocab::{Vocabulary, VocabularyArtifact};
    use crate::frontend::{FrontendError, LanguageProfile, Registry};
    use crate::{SpeechModel, SynthesisResult};
    use std::collections::HashMap;
    use std::sync::Arc;

    fn toy_entry() -> ProfileEntry {
        ProfileEntry {
            code: "xx".to_string(),
            name: "Toy".to_string(),
            alphabet: AlphabetSpec {
                letters: "a".to_string(),
                marks: vec!['\u{0301}', '\u{0300}'],
                extra: String::new(),
            },
            control_token: Some(500),
            segmentation: false,
            expansion: false,
            collapse_whitespace: true,
        }
    }

    fn toy_vocab() -> Vocabulary {
        Vocabulary::from_artifact(VocabularyArtifact {
            version: "toy".to_string(),
            unknown_id: 0,
            units: HashMap::from([
                ("a".to_string(), 1),
                ("á".to_string(), 2),
                ("x".to_string(), 3),
            ]),
            ..Default::default()
        })
        .unwrap()
    }

    fn toy_pipeline() -> Pipeline {
        let mut registry = Registry::new();
        registry
            .register(LanguageProfile::from_entry(&toy_entry(), 500, None).unwrap())
            .unwrap();
        Pipeline::new(registry, toy_vocab()).unwrap()
    }

    /// Character-level vocabulary covering `text`, with control tokens for
    /// every built-in language.
    fn char_vocab(text: &str) -> VocabularyArtifact {
        let mut units = HashMap::new();
        for ch in text.chars() {
            let next = units.len() as i64 + 1;
            units.entry(ch.to_string()).or_insert(next);
        }
        VocabularyArtifact {
            version: "chars".to_string(),
            unknown_id: 0,
            units,
            control_tokens: HashMap::from([
                ("en".to_string(), 1000),
                ("vi".to_string(), 1001),
                ("fr".to_string(), 1002),
                ("es".to_string(), 1003),
                ("de".to_string(), 1004),
            ]),
            ..Default::default()
        }
    }

    fn write_config(
        dir: &std::path::Path,
        vocab: &VocabularyArtifact,
        config: &str,
    ) -> std::path::PathBuf {
        std::fs::write(dir.join("vocab.json"), serde_json::to_string(vocab).unwrap()).unwrap();
        let path = dir.join("frontend.json");
        std::fs::write(&path, config).unwrap();
        path
    }

    #[test]
    fn encodes_toy_scenario() {
        let pipeline = toy_pipeline();
        let seq = pipeline.encode("axa", "xx", &EncodeOptions::lenient()).unwrap();
        assert_eq!(seq.ids(), &[500, 1, 3, 1]);
        assert_eq!(seq.language(), "xx");
    }

    #[test]
    fn empty_input_is_only_the_control_token() {
        let pipeline = toy_pipeline();
        for options in [EncodeOptions::strict(), EncodeOptions::lenient()] {
            assert_eq!(pipeline.encode("", "xx", &options).unwrap().ids(), &[500]);
        }
    }

    #[test]
    fn unregistered_language_is_unsupported() {
        let pipeline = toy_pipeline();
        for text in ["", "axa", "漢字"] {
            match pipeline.encode(text, "zz", &EncodeOptions::lenient()) {
                Err(FrontendError::UnsupportedLanguage(code)) => assert_eq!(code, "zz"),
                other => panic!("expected UnsupportedLanguage, got {other:?}"),
            }
        }
    }

    #[test]
    fn decomposed_input_encodes_like_precomposed() {
        let pipeline = toy_pipeline();
        let options = EncodeOptions::strict();
        assert_eq!(
            pipeline.encode("a\u{0301}", "xx", &options).unwrap(),
            pipeline.encode("\u{00e1}", "xx", &options).unwrap()
        );
        assert_eq!(pipeline.encode("a\u{0301}", "xx", &options).unwrap().ids(), &[500, 2]);
    }

    #[test]
    fn strict_policy_rejects_foreign_letters() {
        let pipeline = toy_pipeline();
        match pipeline.encode("a漢a", "xx", &EncodeOptions::strict()) {
            Err(FrontendError::InvalidText {
                language,
                offending,
            }) => {
                assert_eq!(language, "xx");
                assert_eq!(offending, vec!['漢']);
            }
            other => panic!("expected InvalidText, got {other:?}"),
        }
    }

    #[test]
    fn warn_policy_encodes_foreign_letters_as_unknown() {
        let pipeline = toy_pipeline();
        let seq = pipeline.encode("a漢", "xx", &EncodeOptions::lenient()).unwrap();
        assert_eq!(seq.ids(), &[500, 1, 0]);
        assert_eq!(seq.unknown_units(), 1);
    }

    #[test]
    fn strip_policy_removes_foreign_letters() {
        let pipeline = toy_pipeline();
        let options = EncodeOptionsBuilder::default()
            .validation(ValidationPolicy::Strip)
            .build()
            .unwrap();
        let seq = pipeline.encode("a漢á", "xx", &options).unwrap();
        assert_eq!(seq.ids(), &[500, 1, 2]);
        assert_eq!(seq.unknown_units(), 0);
    }

    fn strip_pipeline() -> Pipeline {
        let mut registry = Registry::new();
        registry
            .register(LanguageProfile::from_entry(&toy_entry(), 500, None).unwrap())
            .unwrap();
        let vocab = Vocabulary::from_artifact(VocabularyArtifact {
            version: "toy".to_string(),
            unknown_id: 0,
            units: HashMap::from([
                ("a".to_string(), 1),
                ("á".to_string(), 2),
                ("x".to_string(), 3),
                ("e".to_string(), 4),
                ("é".to_string(), 5),
                (" ".to_string(), 6),
            ]),
            ..Default::default()
        })
        .unwrap();
        Pipeline::new(registry, vocab).unwrap()
    }

    fn strip_options() -> EncodeOptions {
        EncodeOptionsBuilder::default()
            .validation(ValidationPolicy::Strip)
            .build()
            .unwrap()
    }

    #[test]
    fn strip_policy_drops_marks_of_removed_letters() {
        // The acute belongs to the removed letter and must not land on "e".
        let pipeline = strip_pipeline();
        let seq = pipeline.encode("e漢\u{0301}", "xx", &strip_options()).unwrap();
        assert_eq!(seq.ids(), &[500, 4]);
        assert_eq!(seq.unknown_units(), 0);

        let seq = pipeline.encode("xe漢\u{0301}\u{0300}a", "xx", &strip_options()).unwrap();
        assert_eq!(seq.ids(), &[500, 3, 4, 1]);
    }

    #[test]
    fn strip_policy_output_passes_validation() {
        let pipeline = strip_pipeline();
        let profile = pipeline.registry().resolve("xx").unwrap();
        for input in ["e漢\u{0301}", "é", "\u{0229}\u{0301} a", "a 漢 é 字 x"] {
            let seq = pipeline.encode(input, "xx", &strip_options()).unwrap();
            let decoded = pipeline.vocabulary().decode(seq.ids());
            assert!(profile.validator().validate(&decoded), "{input:?} -> {decoded:?}");
            assert_eq!(seq.unknown_units(), 0, "for {input:?}");
        }
    }

    #[test]
    fn strip_policy_collapses_whitespace_left_behind() {
        let pipeline = strip_pipeline();
        let seq = pipeline.encode("a 漢 a", "xx", &strip_options()).unwrap();
        assert_eq!(seq.ids(), &[500, 1, 6, 1]);
    }

    #[test]
    fn every_result_starts_with_the_control_token_and_never_fails() {
        let pipeline = toy_pipeline();
        let inputs = [
            "",
            " ",
            "axa",
            "\u{0}\u{1F}\u{7F}",
            "Ελληνικά και русский",
            "🙂🙃 \u{200D}",
            "\u{0301}",
            "a\u{FFFF}\u{10FFFF}",
        ];
        for input in inputs {
            let seq = pipeline.encode(input, "xx", &EncodeOptions::lenient()).unwrap();
            assert_eq!(seq.ids()[0], 500, "for {input:?}");
        }
    }

    #[test]
    fn concurrent_encodes_agree() {
        let pipeline = Arc::new(toy_pipeline());
        let expected = pipeline
            .encode("axa áx a", "xx", &EncodeOptions::lenient())
            .unwrap();
        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let pipeline = Arc::clone(&pipeline);
                    scope.spawn(move || {
                        pipeline
                            .encode("axa áx a", "xx", &EncodeOptions::lenient())
                            .unwrap()
                    })
                })
                .collect();
            for handle in handles {
                assert_eq!(handle.join().unwrap(), expected);
            }
        });
    }

    #[test]
    fn rejects_control_token_mismatch() {
        let mut artifact = VocabularyArtifact {
            version: "v".to_string(),
            unknown_id: 0,
            units: HashMap::from([("a".to_string(), 1)]),
            control_tokens: HashMap::from([("xx".to_string(), 600)]),
            ..Default::default()
        };
        let registry = || {
            let mut registry = Registry::new();
            registry
                .register(LanguageProfile::from_entry(&toy_entry(), 500, None).unwrap())
                .unwrap();
            registry
        };
        let vocab = Vocabulary::from_artifact(artifact.clone()).unwrap();
        assert!(matches!(
            Pipeline::new(registry(), vocab),
            Err(FrontendError::Config(_))
        ));

        // 500 collides with a unit id
        artifact.control_tokens.clear();
        artifact.units.insert("b".to_string(), 500);
        let vocab = Vocabulary::from_artifact(artifact).unwrap();
        assert!(matches!(
            Pipeline::new(registry(), vocab),
            Err(FrontendError::Config(_))
        ));
    }

    #[test]
    fn rejects_shared_control_tokens() {
        let mut registry = Registry::new();
        let mut other = toy_entry();
        other.code = "yy".to_string();
        registry
            .register(LanguageProfile::from_entry(&toy_entry(), 500, None).unwrap())
            .unwrap();
        registry
            .register(LanguageProfile::from_entry(&other, 500, None).unwrap())
            .unwrap();
        assert!(Pipeline::new(registry, toy_vocab()).is_err());
    }

    #[test]
    fn builds_from_config_with_builtin_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = char_vocab("Xin chào Hà Nội_");
        let path = write_config(
            dir.path(),
            &vocab,
            r#"{"vocabulary": "vocab.json", "segmenters": {"vi": {"kind": "lexicon"}}}"#,
        );
        let pipeline = Pipeline::from_config_file(&path).unwrap();
        assert_eq!(pipeline.registry().codes(), vec!["de", "en", "es", "fr", "vi"]);

        let plain = pipeline
            .encode("Xin chào Hà Nội", "vi", &EncodeOptions::strict())
            .unwrap();
        assert_eq!(plain.control_token(), 1001);
        assert_eq!(pipeline.vocabulary().decode(plain.ids()), "Xin chào Hà Nội");
        assert_eq!(plain.unknown_units(), 0);

        let options = EncodeOptionsBuilder::default()
            .validation(ValidationPolicy::Strict)
            .use_segmentation(true)
            .build()
            .unwrap();
        let segmented = pipeline.encode("Xin chào Hà Nội", "vi", &options).unwrap();
        assert_eq!(
            pipeline.vocabulary().decode(segmented.ids()),
            "Xin_chào Hà_Nội"
        );
    }

    #[test]
    fn config_without_control_token_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut vocab = char_vocab("abc");
        vocab.control_tokens.remove("de");
        let path = write_config(dir.path(), &vocab, r#"{"vocabulary": "vocab.json"}"#);
        assert!(matches!(
            Pipeline::from_config_file(&path),
            Err(FrontendError::Config(_))
        ));
    }

    #[test]
    fn config_with_inline_profile_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut vocab = char_vocab("axá");
        vocab.control_tokens = HashMap::from([("xx".to_string(), 500)]);
        let path = write_config(
            dir.path(),
            &vocab,
            r#"{
                "vocabulary": "vocab.json",
                "languages": [
                    {"code": "xx", "name": "Toy",
                     "alphabet": {"letters": "a", "marks": ["\u0301", "\u0300"]}}
                ]
            }"#,
        );
        let pipeline = Pipeline::from_config_file(&path).unwrap();
        let seq = pipeline.encode("axa", "xx", &EncodeOptions::strict()).unwrap();
        assert_eq!(seq.ids()[0], 500);
        assert_eq!(seq.len(), 4);
        assert!(pipeline.encode("axa", "vi", &EncodeOptions::strict()).is_err());
    }

    #[test]
    fn duplicate_codes_in_table_fail_at_startup() {
        let dir = tempfile::tempdir().unwrap();
        let mut vocab = char_vocab("a");
        vocab.control_tokens = HashMap::from([("xx".to_string(), 500)]);
        let path = write_config(
            dir.path(),
            &vocab,
            r#"{
                "vocabulary": "vocab.json",
                "languages": [
                    {"code": "xx", "name": "One"},
                    {"code": "XX", "name": "Two"}
                ]
            }"#,
        );
        assert!(matches!(
            Pipeline::from_config_file(&path),
            Err(FrontendError::DuplicateLanguage(_))
        ));
    }

    #[test]
    fn expands_vietnamese_when_requested() {
        let dir = tempfile::tempdir().unwrap();
        let text = "Có hai người .";
        let vocab = char_vocab(text);
        let path = write_config(dir.path(), &vocab, r#"{"vocabulary": "vocab.json"}"#);
        let pipeline = Pipeline::from_config_file(&path).unwrap();
        let options = EncodeOptionsBuilder::default()
            .expand_text(true)
            .build()
            .unwrap();
        let seq = pipeline.encode("có 2 người.", "vi", &options).unwrap();
        assert_eq!(pipeline.vocabulary().decode(seq.ids()), text);
    }

    #[test]
    fn chunks_long_input_at_punctuation() {
        let dir = tempfile::tempdir().unwrap();
        let vocab = char_vocab("ab. ");
        let path = write_config(dir.path(), &vocab, r#"{"vocabulary": "vocab.json"}"#);
        let pipeline = Pipeline::from_config_file(&path).unwrap();
        let chunks = pipeline
            .encode_chunked("ab. ab. ab", "en", &EncodeOptions::lenient(), 6)
            .unwrap();
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.control_token(), 1000);
            assert!(chunk.len() <= 6);
        }
        let body: Vec<i64> = chunks.iter().flat_map(|c| c.body().to_vec()).collect();
        let whole = pipeline
            .encode("ab. ab. ab", "en", &EncodeOptions::lenient())
            .unwrap();
        assert_eq!(body, whole.body());
    }

    struct ScaleModel;

    impl SpeechModel for ScaleModel {
        type SynthesisParams = f32;

        fn synthesize_tokens(
            &mut self,
            tokens: &crate::frontend::TokenSequence,
            speaker: &[f32],
            params: Option<f32>,
        ) -> Result<SynthesisResult, Box<dyn std::error::Error>> {
            let gain = params.unwrap_or(1.0) * speaker.first().copied().unwrap_or(1.0);
            Ok(SynthesisResult {
                samples: tokens.ids().iter().map(|&id| id as f32 * gain).collect(),
                sample_rate: 16_000,
            })
        }
    }

    #[test]
    fn hands_encoded_sequence_to_speech_model() {
        let pipeline = toy_pipeline();
        let result = pipeline
            .synthesize(
                &mut ScaleModel,
                "axa",
                "xx",
                &EncodeOptions::lenient(),
                &[0.5],
                Some(2.0),
            )
            .unwrap();
        assert_eq!(result.samples, vec![500.0, 1.0, 3.0, 1.0]);

        let unsupported = pipeline.synthesize(
            &mut ScaleModel,
            "axa",
            "zz",
            &EncodeOptions::lenient(),
            &[1.0],
            None,
        );
        assert!(unsupported.is_err());
    }

    #[test]
    fn global_pipeline_installs_once() {
        let first = install(toy_pipeline()).unwrap();
        assert_eq!(
            first.encode("a", "xx", &EncodeOptions::lenient()).unwrap().ids(),
            &[500, 1]
        );
        assert!(super::global().is_some());
        assert!(matches!(
            install(toy_pipeline()),
            Err(FrontendError::AlreadyInitialized)
        ));
    }
}
