use crate::models::interview::ConversationTurn;

/// Phase of the mock interview. Derived from transcript length on every turn
/// and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Introduction,
    RoleFit,
    ExperienceDeepDive,
    Technical,
    Closing,
}

impl Stage {
    /// Label interpolated into the interviewer's system prompt.
    pub fn label(self) -> &'static str {
        match self {
            Stage::Introduction => "Introduction & Ice-breaking",
            Stage::RoleFit => "Job Role Fit & Motivation (Focus on JD)",
            Stage::ExperienceDeepDive => "Resume & Experience Deep Dive",
            Stage::Technical => "Technical & Problem Solving",
            Stage::Closing => "Closing & Wrap-up",
        }
    }
}

/// `turn_count` is the number of user/assistant exchanges so far.
pub fn stage_for(turn_count: usize) -> Stage {
    match turn_count {
        0..=1 => Stage::Introduction,
        2..=4 => Stage::RoleFit,
        5..=7 => Stage::ExperienceDeepDive,
        8..=11 => Stage::Technical,
        _ => Stage::Closing,
    }
}

/// One turn is a user message plus the interviewer's reply.
pub fn stage_for_history(history: &[ConversationTurn]) -> Stage {
    stage_for(history.len() / 2)
}
