//! Configuration management for the Parley gateway
//!
//! Precedence is env > TOML file > default for every setting.

pub mod file;

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use crate::llm::DEFAULT_MODEL;
use crate::voice::{RecognitionSettings, VoiceSettings};
use crate::{Error, Result};

use self::file::ParleyConfigFile;

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5000;

/// Default transcription bound
const DEFAULT_STT_TIMEOUT_SECS: u64 = 90;

/// Default bound for generation and synthesis calls
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Parley gateway configuration
#[derive(Debug)]
pub struct Config {
    /// HTTP API server configuration
    pub server: ServerConfig,

    /// Voice configuration
    pub voice: VoiceConfig,

    /// API keys
    pub api_keys: ApiKeys,

    /// LLM model identifier for chat and translation
    pub llm_model: String,
}

/// HTTP API server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to listen on
    pub port: u16,

    /// Address to bind
    pub host: String,

    /// Path to static files directory (web page)
    pub static_dir: PathBuf,

    /// Bound for generation and synthesis calls
    pub request_timeout: Duration,
}

/// Voice processing configuration
#[derive(Debug, Clone, Default)]
pub struct VoiceConfig {
    /// Recognition parameters for uploaded recordings
    pub recognition: RecognitionSettings,

    /// Synthesis voice
    pub synthesis: VoiceSettings,

    /// Bound for a single transcription
    pub stt_timeout: Duration,
}

/// API keys for external services
#[derive(Debug, Default)]
pub struct ApiKeys {
    /// Gemini (Generative Language API) key
    pub gemini: Option<SecretString>,

    /// Google Cloud key for Speech-to-Text and Text-to-Speech
    pub google_cloud: Option<SecretString>,
}

impl ApiKeys {
    /// Gemini key or a configuration error
    ///
    /// # Errors
    ///
    /// Returns error if the key is not configured
    pub fn require_gemini(&self) -> Result<SecretString> {
        self.gemini
            .clone()
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is not set".to_string()))
    }

    /// Google Cloud key or a configuration error
    ///
    /// # Errors
    ///
    /// Returns error if the key is not configured
    pub fn require_google_cloud(&self) -> Result<SecretString> {
        self.google_cloud
            .clone()
            .ok_or_else(|| Error::Config("GOOGLE_API_KEY is not set".to_string()))
    }
}

impl Config {
    /// Load configuration from the environment and the config file
    #[must_use]
    pub fn load() -> Self {
        let fc = file::load_config_file();
        Self::from_sources(fc, |key| std::env::var(key).ok())
    }

    /// Resolve configuration from a parsed file and an environment lookup
    pub fn from_sources(fc: ParleyConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| env(key).filter(|v| !v.is_empty());
        let parse_port = |key: &str| non_empty(key).and_then(|s| s.parse::<u16>().ok());

        // API keys (env > toml > None)
        let api_keys = ApiKeys {
            gemini: non_empty("GEMINI_API_KEY")
                .or(fc.api_keys.gemini)
                .map(SecretString::from),
            google_cloud: non_empty("GOOGLE_API_KEY")
                .or(fc.api_keys.google_cloud)
                .map(SecretString::from),
        };

        // API server config (env > toml > default)
        let server = ServerConfig {
            port: parse_port("PARLEY_PORT")
                .or_else(|| parse_port("PORT"))
                .or(fc.server.port)
                .unwrap_or(DEFAULT_PORT),
            host: non_empty("PARLEY_HOST")
                .or(fc.server.host)
                .unwrap_or_else(|| "127.0.0.1".to_string()),
            static_dir: non_empty("PARLEY_STATIC_DIR")
                .or(fc.server.static_dir)
                .map_or_else(|| PathBuf::from("static"), PathBuf::from),
            request_timeout: Duration::from_secs(
                fc.server
                    .request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
        };

        // Voice config (env > toml > default)
        let language_code = fc
            .voice
            .language_code
            .unwrap_or_else(|| "en-US".to_string());
        let recognition = RecognitionSettings {
            sample_rate_hertz: fc.voice.sample_rate_hertz.unwrap_or(48_000),
            language_code: language_code.clone(),
            ..RecognitionSettings::default()
        };
        let synthesis = VoiceSettings {
            name: non_empty("PARLEY_TTS_VOICE")
                .or(fc.voice.tts_voice)
                .unwrap_or_else(|| "en-US-Standard-C".to_string()),
            language_code,
            ..VoiceSettings::default()
        };
        let stt_timeout = Duration::from_secs(
            non_empty("PARLEY_STT_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .or(fc.voice.stt_timeout_secs)
                .unwrap_or(DEFAULT_STT_TIMEOUT_SECS),
        );

        let llm_model = non_empty("PARLEY_LLM_MODEL")
            .or(fc.llm.model)
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Self {
            server,
            voice: VoiceConfig {
                recognition,
                synthesis,
                stt_timeout,
            },
            api_keys,
            llm_model,
        }
    }
}
