use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Problem difficulty. `System` and `Error` only appear on fallback problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    System,
    Error,
}

impl Difficulty {
    /// Case-insensitive match on the generated labels ("easy", "MEDIUM", ...).
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub output: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodingProblem {
    pub id: u32,
    pub title: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub test_cases: Vec<TestCase>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Analysis {
    #[serde(default)]
    pub correctness: String,
    #[serde(default)]
    pub time_complexity: String,
    #[serde(default)]
    pub space_complexity: String,
    #[serde(default)]
    pub feedback: String,
}

/// The judge's verdict on a piece of code. Nothing is executed; this is the model's opinion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub status: EvaluationStatus,
    pub output: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,
}

impl EvaluationResult {
    pub fn error(output: impl Into<String>) -> Self {
        Self {
            status: EvaluationStatus::Error,
            output: output.into(),
            analysis: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubmissionStatus {
    Passed,
    Failed,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SubmissionStatus::Passed => "Passed",
            SubmissionStatus::Failed => "Failed",
        }
    }
}

impl From<EvaluationStatus> for SubmissionStatus {
    fn from(status: EvaluationStatus) -> Self {
        match status {
            EvaluationStatus::Success => SubmissionStatus::Passed,
            EvaluationStatus::Error => SubmissionStatus::Failed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub user_id: Uuid,
    pub problem_id: i64,
    pub code: String,
    pub language: String,
    pub status: SubmissionStatus,
}
