//! Text-to-speech (TTS) processing

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::Synthesizer;
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://texttospeech.googleapis.com/v1";

/// Fixed voice parameters
#[derive(Debug, Clone)]
pub struct VoiceSettings {
    pub language_code: String,
    /// Voice identifier (e.g. `en-US-Standard-C`)
    pub name: String,
    /// `NEUTRAL`, `FEMALE` or `MALE`
    pub ssml_gender: String,
    /// `MP3`, `OGG_OPUS` or `LINEAR16`
    pub audio_encoding: String,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            language_code: "en-US".to_string(),
            name: "en-US-Standard-C".to_string(),
            ssml_gender: "NEUTRAL".to_string(),
            audio_encoding: "MP3".to_string(),
        }
    }
}

#[derive(Serialize)]
struct SynthesisInput<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceSelection<'a> {
    language_code: &'a str,
    name: &'a str,
    ssml_gender: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeRequest<'a> {
    input: SynthesisInput<'a>,
    voice: VoiceSelection<'a>,
    audio_config: AudioConfig<'a>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    #[serde(default)]
    audio_content: String,
}

/// Synthesizes speech from text with Google Cloud Text-to-Speech
pub struct TextToSpeech {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    voice: VoiceSettings,
}

impl TextToSpeech {
    /// Create a new TTS instance
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: SecretString, voice: VoiceSettings) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "Google Cloud API key required for TTS".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            voice,
        })
    }

    /// Point the client at a different endpoint (proxies, emulators)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body<'a>(&'a self, text: &'a str) -> SynthesizeRequest<'a> {
        SynthesizeRequest {
            input: SynthesisInput { text },
            voice: VoiceSelection {
                language_code: &self.voice.language_code,
                name: &self.voice.name,
                ssml_gender: &self.voice.ssml_gender,
            },
            audio_config: AudioConfig {
                audio_encoding: &self.voice.audio_encoding,
            },
        }
    }

    fn decode(response: SynthesizeResponse) -> Result<Vec<u8>> {
        if response.audio_content.is_empty() {
            return Err(Error::Tts("response carried no audio".to_string()));
        }
        Ok(STANDARD.decode(response.audio_content)?)
    }
}

#[async_trait]
impl Synthesizer for TextToSpeech {
    /// Synthesize text to speech
    ///
    /// # Returns
    ///
    /// Audio bytes in the configured encoding (MP3 by default)
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        tracing::debug!(chars = text.len(), voice = %self.voice.name, "synthesizing speech");

        let response = self
            .client
            .post(format!("{}/text:synthesize", self.base_url))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.request_body(text))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Text-to-Speech API error");
            return Err(Error::Tts(format!("Text-to-Speech API error {status}: {body}")));
        }

        let audio = Self::decode(response.json().await?)?;
        tracing::debug!(audio_bytes = audio.len(), "synthesis complete");
        Ok(audio)
    }
}
