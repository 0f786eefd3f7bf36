//! Parsing of the tutor model's structured reply
//!
//! The model is asked to answer in the layout fixed by
//! [`crate::prompt::SYSTEM_INSTRUCTION`]. Parsing is tolerant: anything that
//! does not match degrades to empty fields instead of failing.

use serde::{Deserialize, Serialize};

use crate::prompt::{
    CORRECTED_LABEL, CORRECTION_MARKER, EXPLANATION_LABEL, ORIGINAL_LABEL, REPLY_LABEL,
};

/// Grammar feedback on the user's last utterance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionNote {
    pub original: String,
    pub corrected: String,
    pub explanation: String,
}

impl CorrectionNote {
    /// True when no field was found in the correction block
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.original.is_empty() && self.corrected.is_empty() && self.explanation.is_empty()
    }
}

/// Structured view of one model reply
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReply {
    /// Conversational continuation to speak back
    pub reply_text: String,

    /// Correction block, absent when the model omitted the marker
    pub correction: Option<CorrectionNote>,
}

impl ParsedReply {
    /// Correction fields, empty strings when absent
    #[must_use]
    pub fn correction_or_default(&self) -> CorrectionNote {
        self.correction.clone().unwrap_or_default()
    }
}

/// Split raw model output into reply text and correction fields
///
/// Never fails. Text before the first `[CORRECTION]` marker is the reply
/// (minus a leading `AI_RESPONSE:` label). Lines between the first and any
/// second marker are scanned for the `Original:`, `Corrected:` and
/// `Explanation:` prefixes; anything after a second marker is ignored. A
/// repeated prefix within the block keeps its last value.
#[must_use]
pub fn parse_reply(raw: &str) -> ParsedReply {
    let (reply_segment, correction_segment) = match raw.split_once(CORRECTION_MARKER) {
        Some((reply, rest)) => (reply, rest.split(CORRECTION_MARKER).next()),
        None => (raw, None),
    };

    let reply_text = strip_reply_label(reply_segment);

    let correction = correction_segment.map(|block| {
        let mut note = CorrectionNote::default();
        for line in block.lines().map(str::trim_start) {
            if let Some(rest) = line.strip_prefix(ORIGINAL_LABEL) {
                note.original = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix(CORRECTED_LABEL) {
                note.corrected = rest.trim().to_string();
            } else if let Some(rest) = line.strip_prefix(EXPLANATION_LABEL) {
                note.explanation = rest.trim().to_string();
            }
        }
        note
    });

    if correction.is_none() && !raw.trim().is_empty() {
        tracing::warn!("model reply has no correction block");
    }

    ParsedReply {
        reply_text,
        correction,
    }
}

fn strip_reply_label(segment: &str) -> String {
    let trimmed = segment.trim();
    trimmed
        .strip_prefix(REPLY_LABEL)
        .map_or(trimmed, str::trim)
        .to_string()
}
