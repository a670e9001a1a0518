#[derive(thiserror::Error, Debug)]
pub enum FrontendError {
    #[error("Language '{0}' is not registered. Call Registry::codes() to see supported languages.")]
    UnsupportedLanguage(String),
    #[error("Text is not valid {language}: unexpected characters {offending:?}")]
    InvalidText {
        language: String,
        offending: Vec<char>,
    },
    #[error("Language '{0}' is already registered")]
    DuplicateLanguage(String),
    #[error("Invalid vocabulary artifact: {0}")]
    Vocabulary(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Segmenter binary '{0}' not found")]
    SegmenterNotFound(String),
    #[error("Segmentation failed: {0}")]
    Segmentation(String),
    #[error("A global pipeline has already been installed")]
    AlreadyInitialized,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "bundle")]
    #[error("Bundle archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
