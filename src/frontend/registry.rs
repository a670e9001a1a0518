use std::collections::HashMap;

use super::error::FrontendError;
use super::profile::LanguageProfile;

/// Language profiles keyed by code.
///
/// Filled during startup through `&mut self`, then shared behind an `Arc` and
/// only read, so resolution needs no locking.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    profiles: HashMap<String, LanguageProfile>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, profile: LanguageProfile) -> Result<(), FrontendError> {
        if self.profiles.contains_key(profile.code()) {
            return Err(FrontendError::DuplicateLanguage(profile.code().to_string()));
        }
        log::debug!(
            "Registered language '{}' ({}), control token {}",
            profile.code(),
            profile.name(),
            profile.control_token()
        );
        self.profiles.insert(profile.code().to_string(), profile);
        Ok(())
    }

    /// Look up a profile. Codes are matched case-insensitively.
    pub fn resolve(&self, code: &str) -> Result<&LanguageProfile, FrontendError> {
        let key = code.trim().to_ascii_lowercase();
        self.profiles
            .get(&key)
            .ok_or_else(|| FrontendError::UnsupportedLanguage(code.to_string()))
    }

    /// Registered codes in sorted order.
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.profiles.keys().map(|s| s.as_str()).collect();
        codes.sort_unstable();
        codes
    }

    pub fn profiles(&self) -> impl Iterator<Item = &LanguageProfile> {
        self.profiles.values()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
