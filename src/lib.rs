//! # tts-frontend
//!
//! The text side of a multilingual text-to-speech stack: turns raw user text
//! into the bounded-vocabulary token sequence a speech model consumes.
//!
//! ## Features
//!
//! - **Per-language profiles**: normalization, validation, optional word
//!   segmentation and text expansion, registered per language code
//! - **Sub-word encoding**: merge-priority (BPE) or longest-match splitting over
//!   a versioned vocabulary artifact, with an unknown-id fallback
//! - **Language control tokens**: every sequence starts with its language's id
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! tts-frontend = "2026.10"
//! ```
//!
//! ```ignore
//! use std::path::PathBuf;
//! use tts_frontend::frontend::{EncodeOptions, Pipeline};
//!
//! let pipeline = Pipeline::from_config_file(&PathBuf::from("models/frontend.json"))?;
//! let tokens = pipeline.encode("Xin chào Hà Nội", "vi", &EncodeOptions::default())?;
//! println!("{:?}", tokens.ids());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod frontend;
pub mod languages;

use std::path::Path;

use frontend::TokenSequence;

/// The result of a synthesis (text-to-speech) operation.
///
/// Contains raw f32 audio samples and the sample rate of the output audio.
#[derive(Debug)]
pub struct SynthesisResult {
    /// Raw audio samples as f32 values
    pub samples: Vec<f32>,
    /// Sample rate of the audio
    pub sample_rate: u32,
}

impl SynthesisResult {
    /// Write the audio to a 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;
        Ok(())
    }

    /// Duration of the audio in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Downstream speech model that turns a token sequence into audio.
///
/// Implementations live outside this crate (acoustic model plus vocoder). The
/// frontend only hands over the encoded sequence, whose first id is the
/// language control token, together with a speaker embedding.
pub trait SpeechModel {
    /// Parameters for configuring inference behavior (temperature, speed, etc.)
    type SynthesisParams;

    /// Synthesize speech from an encoded token sequence.
    fn synthesize_tokens(
        &mut self,
        tokens: &TokenSequence,
        speaker: &[f32],
        params: Option<Self::SynthesisParams>,
    ) -> Result<SynthesisResult, Box<dyn std::error::Error>>;

    /// Synthesize speech from a token sequence and write to a WAV file.
    ///
    /// Default implementation calls `synthesize_tokens()` then `SynthesisResult::write_wav()`.
    fn synthesize_tokens_to_file(
        &mut self,
        tokens: &TokenSequence,
        speaker: &[f32],
        wav_path: &Path,
        params: Option<Self::SynthesisParams>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.synthesize_tokens(tokens, speaker, params)?
            .write_wav(wav_path)
    }
}
