use serde::Serialize;

/// Raw per-user activity counts read from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivitySummary {
    pub assessment_scores: Vec<i32>,
    pub coding_submissions: i64,
    pub coding_passed: i64,
    pub interviews: i64,
    /// Score of the most recently created interview session, if it has one.
    pub latest_interview_score: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}
