//! Deterministic substitutes returned when a degrading task cannot generate.
//!
//! Every payload here is renderable by the frontend as-is: coding fallbacks use
//! the `System` / `Error` difficulties, feedback fallbacks keep the report shape.

use crate::generation::GenerationError;
use crate::models::coding::{CodingProblem, Difficulty, EvaluationResult};
use crate::models::interview::FeedbackReport;

/// Characters of raw model text kept when a feedback reply could not be parsed.
pub const RAW_SUMMARY_CHARS: usize = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct FallbackTable {
    pub coding_missing_key: CodingProblem,
    pub coding_rate_limited: CodingProblem,
    pub coding_exhausted: CodingProblem,
    pub evaluation_missing_key: EvaluationResult,
    pub evaluation_rate_limited: EvaluationResult,
    pub followup_offline: String,
    pub followup_rate_limited: String,
    pub feedback_missing_key: FeedbackReport,
    pub feedback_rate_limited: FeedbackReport,
    /// Score and labels of the reduced-confidence report built from unparsable text.
    pub feedback_unparsed: FeedbackReport,
}

impl Default for FallbackTable {
    fn default() -> Self {
        Self {
            coding_missing_key: placeholder_problem(
                "API Key Missing",
                "Please configure a valid OpenAI/SambaNova API key in .env to generate coding problems.",
                Difficulty::System,
            ),
            coding_rate_limited: placeholder_problem(
                "Rate Limit Exceeded",
                "Your API key has hit its rate limit. Please check your quota or try again later.",
                Difficulty::Error,
            ),
            coding_exhausted: placeholder_problem(
                "Generation Failed",
                "Could not generate a new problem. This is likely due to an API Key expiry or connection issue. Please check your API configuration.",
                Difficulty::Error,
            ),
            evaluation_missing_key: EvaluationResult::error("API Key missing. Cannot evaluate code."),
            evaluation_rate_limited: EvaluationResult::error(
                "API Rate Limit Exceeded. Please check your quota.",
            ),
            followup_offline: "Error: AI Interviewer is offline (API Key missing).".to_string(),
            followup_rate_limited:
                "Error: API Rate Limit Exceeded. Please check your system configuration.".to_string(),
            feedback_missing_key: report(
                0,
                "API Key Missing",
                "Cannot generate feedback",
                "Please configure a valid API key to receive feedback.",
            ),
            feedback_rate_limited: report(
                0,
                "Rate Limit Exceeded",
                "Please check API quota",
                "Could not generate feedback due to API rate limits.",
            ),
            feedback_unparsed: report(70, "Communication", "Technical Depth", ""),
        }
    }
}

impl FallbackTable {
    pub fn coding_problem(&self, error: &GenerationError) -> CodingProblem {
        match error {
            GenerationError::CredentialMissing => self.coding_missing_key.clone(),
            GenerationError::RateLimited { .. } => self.coding_rate_limited.clone(),
            _ => self.coding_exhausted.clone(),
        }
    }

    pub fn evaluation(&self, error: &GenerationError) -> EvaluationResult {
        match error {
            GenerationError::CredentialMissing => self.evaluation_missing_key.clone(),
            GenerationError::RateLimited { .. } => self.evaluation_rate_limited.clone(),
            other => EvaluationResult::error(format!("Evaluation Failed: {other}")),
        }
    }

    pub fn followup(&self, error: &GenerationError) -> String {
        match error {
            GenerationError::CredentialMissing => self.followup_offline.clone(),
            GenerationError::RateLimited { .. } => self.followup_rate_limited.clone(),
            other => format!("Error: {other}"),
        }
    }

    /// Unparsable replies still yield a report built from the raw text; every
    /// other failure yields a zero score with the cause in the summary.
    pub fn feedback(&self, error: &GenerationError) -> FeedbackReport {
        match error {
            GenerationError::CredentialMissing => self.feedback_missing_key.clone(),
            GenerationError::RateLimited { .. } => self.feedback_rate_limited.clone(),
            GenerationError::Exhausted {
                last_raw: Some(raw),
                ..
            } if error.is_content_failure() => FeedbackReport {
                summary: raw.chars().take(RAW_SUMMARY_CHARS).collect(),
                ..self.feedback_unparsed.clone()
            },
            other => report(
                0,
                "Analysis Failed",
                "API Error or Quota Exceeded",
                &format!("Could not generate feedback report. Error: {other}"),
            ),
        }
    }
}

fn placeholder_problem(title: &str, description: &str, difficulty: Difficulty) -> CodingProblem {
    CodingProblem {
        id: 1,
        title: title.to_string(),
        description: description.to_string(),
        difficulty,
        test_cases: Vec::new(),
    }
}

fn report(score: u8, strength: &str, weakness: &str, summary: &str) -> FeedbackReport {
    FeedbackReport {
        score,
        strengths: vec![strength.to_string()],
        weaknesses: vec![weakness.to_string()],
        summary: summary.to_string(),
    }
}
