use std::fmt;
use std::sync::Arc;

use super::config::ProfileEntry;
use super::error::FrontendError;
use super::normalizer::{Expander, NfcNormalizer, NormalizedText, Normalizer};
use super::segmenter::Segmenter;
use super::validator::{AlphabetValidator, Validator};

/// Everything the pipeline knows about one language.
///
/// A profile is data plus capabilities; adding a language never touches the
/// pipeline or the encoder.
#[derive(Clone)]
pub struct LanguageProfile {
    code: String,
    name: String,
    control_token: i64,
    normalizer: Arc<dyn Normalizer>,
    validator: Arc<dyn Validator>,
    segmenter: Option<Arc<dyn Segmenter>>,
    expander: Option<Arc<dyn Expander>>,
}

impl fmt::Debug for LanguageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageProfile")
            .field("code", &self.code)
            .field("name", &self.name)
            .field("control_token", &self.control_token)
            .field("segmenter", &self.segmenter.is_some())
            .field("expander", &self.expander.is_some())
            .finish()
    }
}

impl LanguageProfile {
    /// Create a profile. The code is trimmed and lower-cased.
    pub fn new(
        code: &str,
        name: &str,
        control_token: i64,
        normalizer: Arc<dyn Normalizer>,
        validator: Arc<dyn Validator>,
    ) -> Self {
        Self {
            code: code.trim().to_ascii_lowercase(),
            name: name.to_string(),
            control_token,
            normalizer,
            validator,
            segmenter: None,
            expander: None,
        }
    }

    /// Build a profile from a table row with the stock normalizer and an
    /// alphabet validator.
    ///
    /// `segmenter` is attached only when the entry allows segmentation, and
    /// the expander is looked up among the built-in languages.
    pub fn from_entry(
        entry: &ProfileEntry,
        control_token: i64,
        segmenter: Option<Arc<dyn Segmenter>>,
    ) -> Result<Self, FrontendError> {
        let mut profile = Self::new(
            &entry.code,
            &entry.name,
            control_token,
            Arc::new(NfcNormalizer::new(entry.collapse_whitespace)),
            Arc::new(AlphabetValidator::from_spec(&entry.alphabet)),
        );

        if entry.segmentation {
            match segmenter {
                Some(segmenter) => profile.segmenter = Some(segmenter),
                None => log::info!(
                    "No segmenter configured for '{}', text will stay unsegmented",
                    profile.code
                ),
            }
        }

        if entry.expansion {
            let expander = crate::languages::expander_for(&profile.code).ok_or_else(|| {
                FrontendError::Config(format!(
                    "language '{}' requests expansion but has no expander",
                    profile.code
                ))
            })?;
            profile.expander = Some(expander);
        }

        Ok(profile)
    }

    pub fn with_segmenter(mut self, segmenter: Arc<dyn Segmenter>) -> Self {
        self.segmenter = Some(segmenter);
        self
    }

    pub fn with_expander(mut self, expander: Arc<dyn Expander>) -> Self {
        self.expander = Some(expander);
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn control_token(&self) -> i64 {
        self.control_token
    }

    pub fn has_segmenter(&self) -> bool {
        self.segmenter.is_some()
    }

    pub fn has_expander(&self) -> bool {
        self.expander.is_some()
    }

    pub fn validator(&self) -> &dyn Validator {
        self.validator.as_ref()
    }

    /// Canonicalize text with this language's normalizer.
    ///
    /// The result is composed to NFC whatever the normalizer returned.
    pub fn normalize(&self, text: &str) -> NormalizedText {
        NormalizedText::new(&self.normalizer.normalize(text))
    }

    /// Normalize, then optionally expand and segment.
    ///
    /// Missing capabilities are skipped silently. A failing segmenter is
    /// logged and the unsegmented text is returned.
    pub fn prepare(&self, text: &str, expand: bool, segment: bool) -> NormalizedText {
        let mut normalized = self.normalize(text);

        if expand {
            if let Some(expander) = &self.expander {
                normalized = self.normalize(&expander.expand(&normalized));
            }
        }

        if segment {
            if let Some(segmenter) = &self.segmenter {
                match segmenter.segment(&normalized) {
                    Ok(segmented) => normalized = self.normalize(&segmented),
                    Err(e) => log::warn!(
                        "Segmentation for '{}' failed, using unsegmented text: {e}",
                        self.code
                    ),
                }
            }
        }

        normalized
    }
}
