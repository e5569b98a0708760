use std::collections::HashMap;

use serde::Serialize;

use crate::generation::topics::TopicCatalog;
use crate::models::assessment::{QuestionKind, StoredAssessment, StoredQuestion};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuestionResult {
    pub question: String,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    pub is_correct: bool,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSheet {
    /// Percentage of MCQs answered correctly, rounded down.
    pub score: i32,
    pub results: Vec<QuestionResult>,
}

/// Scores MCQs only; subjective answers are stored but not graded. Responses
/// are keyed by question text and compared after trimming.
pub fn score_responses(
    questions: &[StoredQuestion],
    responses: &HashMap<String, String>,
) -> ScoreSheet {
    let results: Vec<QuestionResult> = questions
        .iter()
        .map(|stored| &stored.question)
        .filter(|q| q.kind == QuestionKind::Mcq)
        .map(|q| {
            let user_answer = responses.get(&q.text).cloned();
            let is_correct = user_answer
                .as_deref()
                .is_some_and(|answer| answer.trim() == q.correct_answer.trim());
            QuestionResult {
                question: q.text.clone(),
                user_answer,
                correct_answer: q.correct_answer.clone(),
                is_correct,
                category: q.category.clone(),
            }
        })
        .collect();

    let correct = results.iter().filter(|r| r.is_correct).count();
    let score = if results.is_empty() {
        0
    } else {
        (correct * 100 / results.len()) as i32
    };

    ScoreSheet { score, results }
}

/// True when any stored question carries a category outside the topic set
/// (for example "General"), meaning the day's set should be regenerated.
pub fn needs_regeneration(assessment: &StoredAssessment, catalog: &TopicCatalog) -> bool {
    assessment.questions.is_empty()
        || assessment
            .questions
            .iter()
            .any(|q| catalog.canonical(&q.question.category).is_none())
}
