//! Voice processing module
//!
//! Speech-to-text and text-to-speech via Google Cloud. Both sit behind the
//! [`Transcriber`] and [`Synthesizer`] traits so the tutor can run against
//! any backend.

mod stt;
mod tts;

use async_trait::async_trait;

pub use stt::{RecognitionSettings, SpeechToText};
pub use tts::{TextToSpeech, VoiceSettings};

use crate::Result;

/// Converts recorded speech to text
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Best transcript for the audio, empty when nothing was recognized
    async fn transcribe(&self, audio: &[u8]) -> Result<String>;
}

/// Converts text to encoded speech audio
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Encoded audio bytes for the text
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}
