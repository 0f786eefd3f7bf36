//! Parley Gateway - spoken English conversation practice
//!
//! A user speaks, the recording is transcribed, a language model replies
//! and corrects the utterance, and the reply is synthesized back to audio.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  HTTP API (axum)                      │
//! │      /start   │   /chat   │   /translate   │  /       │
//! └────────────────────────┬─────────────────────────────┘
//!                          │
//! ┌────────────────────────▼─────────────────────────────┐
//! │                       Tutor                           │
//! │   Session  │  Prompt Builder  │  Reply Parser         │
//! └────────────────────────┬─────────────────────────────┘
//!                          │
//! ┌────────────────────────▼─────────────────────────────┐
//! │               Google Cloud services                   │
//! │   Speech-to-Text  │  Gemini  │  Text-to-Speech        │
//! └──────────────────────────────────────────────────────┘
//! ```

pub mod api;
pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod reply;
pub mod tutor;
pub mod voice;

pub use config::Config;
pub use conversation::{ConversationSession, Role, SharedSession, Turn, shared_session};
pub use error::{Error, Result};
pub use llm::{Gemini, Generator};
pub use prompt::build_prompt;
pub use reply::{CorrectionNote, ParsedReply, parse_reply};
pub use tutor::{ChatExchange, ChatStage, Opening, Timeouts, Tutor};
pub use voice::{SpeechToText, Synthesizer, TextToSpeech, Transcriber};
