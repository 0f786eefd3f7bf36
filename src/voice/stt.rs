//! Speech-to-text (STT) processing

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::Transcriber;
use crate::{Error, Result};

const DEFAULT_BASE_URL: &str = "https://speech.googleapis.com/v1";

/// Delay between operation status checks
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Fixed recognition parameters
#[derive(Debug, Clone)]
pub struct RecognitionSettings {
    /// Container/codec name as the API expects it (e.g. `WEBM_OPUS`)
    pub encoding: String,
    pub sample_rate_hertz: u32,
    pub language_code: String,
}

impl Default for RecognitionSettings {
    fn default() -> Self {
        Self {
            encoding: "WEBM_OPUS".to_string(),
            sample_rate_hertz: 48_000,
            language_code: "en-US".to_string(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecognitionConfig<'a> {
    encoding: &'a str,
    sample_rate_hertz: u32,
    language_code: &'a str,
    model: &'a str,
}

#[derive(Serialize)]
struct RecognitionAudio {
    content: String,
}

#[derive(Serialize)]
struct RecognizeRequest<'a> {
    config: RecognitionConfig<'a>,
    audio: RecognitionAudio,
}

/// Long-running operation handle and status
#[derive(Debug, Deserialize)]
struct Operation {
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<RecognizeResponse>,
    #[serde(default)]
    error: Option<OperationError>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    #[serde(default)]
    code: i32,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

impl RecognizeResponse {
    /// Top alternative of the first result
    fn best_transcript(self) -> String {
        self.results
            .into_iter()
            .next()
            .and_then(|r| r.alternatives.into_iter().next())
            .map(|a| a.transcript)
            .unwrap_or_default()
    }
}

/// Transcribes speech to text with Google Cloud Speech long-running recognition
pub struct SpeechToText {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    settings: RecognitionSettings,
}

impl SpeechToText {
    /// Create a new STT instance
    ///
    /// # Errors
    ///
    /// Returns error if API key is missing
    pub fn new(api_key: SecretString, settings: RecognitionSettings) -> Result<Self> {
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config(
                "Google Cloud API key required for STT".to_string(),
            ));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            settings,
        })
    }

    /// Point the client at a different endpoint (proxies, emulators)
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn request_body<'a>(&'a self, audio: &[u8]) -> RecognizeRequest<'a> {
        RecognizeRequest {
            config: RecognitionConfig {
                encoding: &self.settings.encoding,
                sample_rate_hertz: self.settings.sample_rate_hertz,
                language_code: &self.settings.language_code,
                model: "default",
            },
            audio: RecognitionAudio {
                content: STANDARD.encode(audio),
            },
        }
    }

    /// Submit audio and wait for the operation to finish
    async fn recognize(&self, audio: &[u8]) -> Result<String> {
        tracing::debug!(audio_bytes = audio.len(), "starting long-running recognition");

        let response = self
            .client
            .post(format!("{}/speech:longrunningrecognize", self.base_url))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.request_body(audio))
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "recognition request failed");
                e
            })?;

        let mut operation: Operation = Self::read_json(response).await?;
        tracing::debug!(operation = %operation.name, "recognition submitted");

        while !operation.done {
            tokio::time::sleep(POLL_INTERVAL).await;

            let response = self
                .client
                .get(format!("{}/operations/{}", self.base_url, operation.name))
                .header("x-goog-api-key", self.api_key.expose_secret())
                .send()
                .await?;
            operation = Self::read_json(response).await?;
        }

        Self::finish(operation)
    }

    async fn read_json(response: reqwest::Response) -> Result<Operation> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Speech API error");
            return Err(Error::Stt(format!("Speech API error {status}: {body}")));
        }

        Ok(response.json().await?)
    }

    fn finish(operation: Operation) -> Result<String> {
        if let Some(err) = operation.error {
            return Err(Error::Stt(format!(
                "recognition failed ({}): {}",
                err.code, err.message
            )));
        }

        let transcript = operation.response.unwrap_or_default().best_transcript();
        tracing::info!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}

/// Runs until the operation completes; callers bound the wait
#[async_trait]
impl Transcriber for SpeechToText {
    async fn transcribe(&self, audio: &[u8]) -> Result<String> {
        self.recognize(audio).await
    }
}
