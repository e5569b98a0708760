//! Mock interview: stage controller, follow-up questions, final feedback and
//! resume intake.

use crate::models::interview::ConversationTurn;

pub mod feedback;
pub mod followup;
pub mod handlers;
pub mod prompts;
pub mod resume;
pub mod stage;

/// Turns of transcript included in any interview prompt.
pub const TRANSCRIPT_WINDOW: usize = 20;

/// The last `TRANSCRIPT_WINDOW` turns, oldest first.
pub fn recent_turns(history: &[ConversationTurn]) -> &[ConversationTurn] {
    &history[history.len().saturating_sub(TRANSCRIPT_WINDOW)..]
}
