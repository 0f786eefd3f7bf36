//! Prompt construction for the tutor model
//!
//! The instruction block fixes the reply format that [`crate::reply`] parses,
//! so the marker constants below are shared by both sides.

use rand::seq::SliceRandom;

use crate::conversation::{Role, Turn};

/// Label preceding the conversational reply
pub const REPLY_LABEL: &str = "AI_RESPONSE:";

/// Marker separating the reply from the correction block
pub const CORRECTION_MARKER: &str = "[CORRECTION]";

/// Correction field prefixes
pub const ORIGINAL_LABEL: &str = "Original:";
pub const CORRECTED_LABEL: &str = "Corrected:";
pub const EXPLANATION_LABEL: &str = "Explanation:";

/// Persona and output format for every chat turn
pub const SYSTEM_INSTRUCTION: &str = "\
You are an English conversation tutor. Your name is \"Gemini\".
1. Respond naturally to the user's last message.
2. Analyze the user's last message as colloquial language for grammatical errors, unnatural phrasing, or better alternatives. Give me some good advice for talking better.
3. Format your entire response as follows, and nothing else:
AI_RESPONSE: [Your conversational reply to the user in English]
[CORRECTION]
Original: [The user's original sentence]
Corrected: [The corrected sentence for user to speak English better, if any changes are needed]
Explanation: [A simple explanation in Japanese about the correction]";

/// Conversation starters offered at session start
pub const CONVERSATION_STARTERS: &[&str] = &[
    "Let's talk about your favorite movie. What is it?",
    "What country would you like to visit and why?",
    "Tell me about a memorable experience you had.",
    "Do you prefer cats or dogs? Why?",
    "What is your favorite food?",
    "Describe your dream job.",
    "What do you like to do on weekends?",
    "If you could have any superpower, what would it be?",
    "What is a book you recommend?",
    "How do you usually spend your holidays?",
];

/// Build the chat prompt from the session history and the latest utterance
///
/// Layout: instruction block, one `User:`/`AI:` line per prior turn, then the
/// latest utterance as the final `User:` line. The caller guarantees
/// `latest_user_text` is non-empty.
#[must_use]
pub fn build_prompt(history: &[Turn], latest_user_text: &str) -> String {
    let mut lines = Vec::with_capacity(history.len() + 2);
    lines.push(SYSTEM_INSTRUCTION.to_string());
    lines.extend(
        history
            .iter()
            .map(|turn| format!("{} {}", speaker_prefix(turn.role), turn.text)),
    );
    lines.push(format!("User: {latest_user_text}"));
    lines.join("\n")
}

fn speaker_prefix(role: Role) -> String {
    format!("{}:", role.speaker())
}

/// Build the one-shot instruction for the translate helper
#[must_use]
pub fn build_translation_prompt(jp_text: &str) -> String {
    format!(
        "あなたは英会話の先生です。以下の日本語を、会話文における自然な英語に翻訳してください。\
         翻訳結果以外を出力する必要はありません。\
         フォーマルなものとカジュアルなものの2パターンのみを出力してください。\n\
         日本語: {jp_text}\n"
    )
}

/// Pick a conversation starter uniformly at random
#[must_use]
pub fn random_starter() -> &'static str {
    CONVERSATION_STARTERS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(CONVERSATION_STARTERS[0])
}

/// Opening line for a new session
#[must_use]
pub fn greeting(starter: &str) -> String {
    format!("Hi there! I'm your AI Friend, and your partner for English Speaking. {starter}")
}
