//! Turn orchestration for practice sessions
//!
//! Coordinates one request cycle: transcription, prompt construction,
//! generation, reply parsing, session update and synthesis. Every external
//! call is bounded by a timeout and nothing is retried.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::conversation::{Role, SharedSession, Turn};
use crate::llm::Generator;
use crate::prompt::{build_prompt, build_translation_prompt, greeting, random_starter};
use crate::reply::{CorrectionNote, parse_reply};
use crate::voice::{Synthesizer, Transcriber};
use crate::{Error, Result};

/// Message returned when the recording yields no transcript
pub const UNINTELLIGIBLE_AUDIO: &str = "Could not understand audio";

/// Message returned when the translate helper gets no input
pub const EMPTY_TRANSLATION_INPUT: &str = "日本語が入力されていません";

/// Progress of one chat cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatStage {
    AwaitingAudio,
    Transcribing,
    AwaitingTranscript,
    GeneratingReply,
    AwaitingGeneration,
    ParsingReply,
    Synthesizing,
    Done,
    Failed,
}

/// Time budgets for external calls
#[derive(Debug, Clone, Copy)]
pub struct Timeouts {
    /// Speech recognition, which may run for tens of seconds
    pub transcription: Duration,
    /// Generation and synthesis
    pub request: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            transcription: Duration::from_secs(90),
            request: Duration::from_secs(60),
        }
    }
}

/// Opening of a new session
#[derive(Debug, Clone)]
pub struct Opening {
    pub text: String,
    pub audio: Vec<u8>,
}

/// Result of one chat cycle
#[derive(Debug, Clone)]
pub struct ChatExchange {
    pub user_text: String,
    pub ai_text: String,
    pub correction: CorrectionNote,
    /// Encoded speech for `ai_text`, empty when there was nothing to say
    pub audio: Vec<u8>,
}

/// Conversation tutor driving the external services
pub struct Tutor {
    session: SharedSession,
    transcriber: Arc<dyn Transcriber>,
    synthesizer: Arc<dyn Synthesizer>,
    generator: Arc<dyn Generator>,
    timeouts: Timeouts,
    /// Session length as of the last committed change
    committed_turns: AtomicUsize,
}

impl Tutor {
    #[must_use]
    pub fn new(
        session: SharedSession,
        transcriber: Arc<dyn Transcriber>,
        synthesizer: Arc<dyn Synthesizer>,
        generator: Arc<dyn Generator>,
    ) -> Self {
        Self {
            session,
            transcriber,
            synthesizer,
            generator,
            timeouts: Timeouts::default(),
            committed_turns: AtomicUsize::new(0),
        }
    }

    /// Override the external call budgets
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Session backing this tutor
    #[must_use]
    pub const fn session(&self) -> &SharedSession {
        &self.session
    }

    /// Number of turns in the session, without waiting on an in-flight cycle
    ///
    /// Reads the session directly when it is free, otherwise reports the
    /// count from the last committed change.
    #[must_use]
    pub fn turn_count(&self) -> usize {
        self.session.try_lock().map_or_else(
            |_| self.committed_turns.load(Ordering::Acquire),
            |session| session.len(),
        )
    }

    /// Begin a new practice session
    ///
    /// Clears the history, greets the user with a random conversation
    /// starter and records the greeting as the first model turn.
    ///
    /// # Errors
    ///
    /// Returns error if synthesis fails or times out
    pub async fn start(&self) -> Result<Opening> {
        let mut session = self.session.lock().await;
        session.reset();

        let text = greeting(random_starter());
        session.append(Role::Model, text.clone());
        self.committed_turns.store(session.len(), Ordering::Release);
        tracing::info!(greeting = %text, "practice session started");

        let audio = bounded(
            self.timeouts.request,
            "synthesis",
            self.synthesizer.synthesize(&text),
        )
        .await?;

        Ok(Opening { text, audio })
    }

    /// Run one chat cycle for a recorded utterance
    ///
    /// The user and model turns are committed together once a reply has
    /// been generated; a failure before that leaves the session untouched.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the recording is empty or yields no
    /// transcript, otherwise the failing external call's error
    pub async fn chat(&self, audio: &[u8]) -> Result<ChatExchange> {
        let mut stage = ChatStage::AwaitingAudio;
        let result = self.run_chat(audio, &mut stage).await;
        match &result {
            Ok(_) => advance(&mut stage, ChatStage::Done),
            Err(e) => {
                if e.is_client_error() {
                    tracing::warn!(stage = ?stage, error = %e, "chat rejected");
                } else {
                    tracing::error!(stage = ?stage, error = %e, "chat failed");
                }
                advance(&mut stage, ChatStage::Failed);
            }
        }
        result
    }

    async fn run_chat(&self, audio: &[u8], stage: &mut ChatStage) -> Result<ChatExchange> {
        if audio.is_empty() {
            return Err(Error::Validation("Empty audio data".to_string()));
        }

        // Held for the whole cycle so concurrent chats serialize
        let mut session = self.session.lock().await;

        advance(stage, ChatStage::Transcribing);
        let transcript = bounded(
            self.timeouts.transcription,
            "transcription",
            self.transcriber.transcribe(audio),
        )
        .await?;

        advance(stage, ChatStage::AwaitingTranscript);
        let user_text = transcript.trim().to_string();
        if user_text.is_empty() {
            return Err(Error::Validation(UNINTELLIGIBLE_AUDIO.to_string()));
        }
        tracing::info!(user_text = %user_text, "user turn transcribed");

        advance(stage, ChatStage::GeneratingReply);
        let mut history: Vec<Turn> = session.snapshot().to_vec();
        history.push(Turn::new(Role::User, user_text.clone()));
        let prompt = build_prompt(&history, &user_text);

        advance(stage, ChatStage::AwaitingGeneration);
        let raw = bounded(
            self.timeouts.request,
            "generation",
            self.generator.generate(&prompt),
        )
        .await?;

        advance(stage, ChatStage::ParsingReply);
        let parsed = parse_reply(&raw);
        let correction = parsed.correction_or_default();
        let ai_text = parsed.reply_text;

        session.append(Role::User, user_text.clone());
        session.append(Role::Model, ai_text.clone());
        self.committed_turns.store(session.len(), Ordering::Release);
        tracing::info!(turns = session.len(), ai_text = %ai_text, "turn recorded");
        drop(session);

        advance(stage, ChatStage::Synthesizing);
        let audio = if ai_text.is_empty() {
            tracing::warn!("model reply was empty, skipping synthesis");
            Vec::new()
        } else {
            bounded(
                self.timeouts.request,
                "synthesis",
                self.synthesizer.synthesize(&ai_text),
            )
            .await?
        };

        Ok(ChatExchange {
            user_text,
            ai_text,
            correction,
            audio,
        })
    }

    /// Suggest formal and casual English renderings of Japanese text
    ///
    /// Stateless; the session is not touched.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for empty input, or the generation error
    pub async fn translate(&self, source_text: &str) -> Result<String> {
        let source_text = source_text.trim();
        if source_text.is_empty() {
            return Err(Error::Validation(EMPTY_TRANSLATION_INPUT.to_string()));
        }

        let raw = bounded(
            self.timeouts.request,
            "translation",
            self.generator.generate(&build_translation_prompt(source_text)),
        )
        .await?;

        let translation = raw.trim();
        if translation.is_empty() {
            return Err(Error::Llm("model returned an empty translation".to_string()));
        }
        Ok(translation.to_string())
    }
}

fn advance(stage: &mut ChatStage, next: ChatStage) {
    tracing::debug!(from = ?stage, to = ?next, "chat stage");
    *stage = next;
}

/// Run an external call under a time budget
async fn bounded<T>(
    limit: Duration,
    what: &str,
    call: impl Future<Output = Result<T>> + Send,
) -> Result<T> {
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| Error::Timeout(format!("{what} exceeded {limit:?}")))?
}
