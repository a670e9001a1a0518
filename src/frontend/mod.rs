//! Language-pluggable text frontend.
//!
//! Raw text goes through four linear stages before it reaches a speech model:
//!
//! ```text
//! resolve(code) -> normalize -> validate -> encode
//! ```
//!
//! Each language is a [`LanguageProfile`]: a plain record holding its
//! normalizer, validator, and optional segmenter and expander. Profiles live in
//! a [`Registry`] that is built once at startup and only read afterwards. The
//! [`Vocabulary`] is loaded once from a versioned artifact and shared the same
//! way, so any number of threads can call [`Pipeline::encode`] at once.
//!
//! # Built-in Languages
//!
//! | Code | Language | Extended alphabet | Segmentation | Expansion |
//! |---|---|---|---|---|
//! | `en` | English | none (ASCII only) | no | no |
//! | `vi` | Vietnamese | vowels × tone marks, `đ` | lexicon or command | abbreviations, numbers |
//! | `fr` | French | `àâæçéèêëîïôœùûüÿ` | no | no |
//! | `es` | Spanish | `áéíóúüñ` | no | no |
//! | `de` | German | `äöüß` | no | no |
//!
//! # Model Directory Layout
//!
//! ```text
//! models/frontend/
//! ├── frontend.json     # FrontendConfig: vocabulary path, optional profile table
//! ├── vocab.json        # Vocabulary artifact
//! └── vi-words.txt      # Optional segmentation lexicon, one word per line
//! ```
//!
//! # Examples
//!
//! ## Strict validation
//!
//! ```rust,no_run
//! use tts_frontend::frontend::{EncodeOptions, FrontendError, Pipeline};
//! use std::path::PathBuf;
//!
//! let pipeline = Pipeline::from_config_file(&PathBuf::from("models/frontend/frontend.json"))?;
//! match pipeline.encode("Hello 世界", "en", &EncodeOptions::strict()) {
//!     Err(FrontendError::InvalidText { offending, .. }) => println!("rejected {offending:?}"),
//!     other => println!("{other:?}"),
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Segmented Vietnamese
//!
//! ```rust,no_run
//! use tts_frontend::frontend::{EncodeOptionsBuilder, Pipeline};
//! use std::path::PathBuf;
//!
//! let pipeline = Pipeline::from_config_file(&PathBuf::from("models/frontend/frontend.json"))?;
//! let options = EncodeOptionsBuilder::default()
//!     .use_segmentation(true)
//!     .expand_text(true)
//!     .build()?;
//! let tokens = pipeline.encode("TP. Hồ Chí Minh có 21 quận", "vi", &options)?;
//! println!("{:?}", tokens.ids());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod encoder;
pub mod error;
pub mod normalizer;
pub mod pipeline;
pub mod profile;
pub mod registry;
pub mod segmenter;
pub mod validator;
pub mod vocab;

pub use config::{AlphabetSpec, FrontendConfig, ProfileEntry, SegmenterConfig};
pub use encoder::{encode, TokenSequence};
pub use error::FrontendError;
pub use normalizer::{Expander, NfcNormalizer, NormalizedText, Normalizer};
pub use pipeline::{
    global, install, EncodeOptions, EncodeOptionsBuilder, Pipeline, ValidationPolicy,
};
pub use profile::LanguageProfile;
pub use registry::Registry;
pub use segmenter::{CommandSegmenter, LexiconSegmenter, Segmenter};
pub use validator::{AlphabetValidator, ValidationReport, Validator};
pub use vocab::{SplitAlgorithm, Vocabulary};
