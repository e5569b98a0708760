use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    #[serde(alias = "MCQ")]
    Mcq,
    #[serde(alias = "Subjective")]
    Subjective,
}

impl QuestionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Mcq => "mcq",
            QuestionKind::Subjective => "subjective",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "mcq" => Some(QuestionKind::Mcq),
            "subjective" => Some(QuestionKind::Subjective),
            _ => None,
        }
    }
}

/// One generated assessment item. `options` is empty for subjective questions;
/// `correct_answer` holds the option text for MCQs and a model answer otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredQuestion {
    pub id: i64,
    #[serde(flatten)]
    pub question: GeneratedQuestion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAssessment {
    pub id: i64,
    pub title: String,
    pub day: NaiveDate,
    pub questions: Vec<StoredQuestion>,
}

#[derive(Debug, Clone)]
pub struct NewAssessmentAttempt {
    pub user_id: Uuid,
    pub assessment_id: Option<i64>,
    pub score: i32,
    pub responses: HashMap<String, String>,
}
