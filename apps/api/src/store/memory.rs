use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::assessment::{
    GeneratedQuestion, NewAssessmentAttempt, StoredAssessment, StoredQuestion,
};
use crate::models::coding::{NewSubmission, SubmissionStatus};
use crate::models::interview::{ConversationTurn, FeedbackReport, InterviewSession, SessionStatus};
use crate::models::profile::ActivitySummary;

/// Process-local store for development runs and tests. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Default)]
struct Tables {
    next_id: i64,
    assessments: Vec<StoredAssessment>,
    attempts: Vec<(i64, NewAssessmentAttempt)>,
    submissions: Vec<(i64, NewSubmission)>,
    sessions: Vec<InterviewSession>,
    transcripts: HashMap<i64, Vec<ConversationTurn>>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn assessment_for_day(&self, day: NaiveDate) -> Result<Option<StoredAssessment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.assessments.iter().rev().find(|a| a.day == day).cloned())
    }

    async fn save_assessment(
        &self,
        title: &str,
        day: NaiveDate,
        questions: &[GeneratedQuestion],
    ) -> Result<StoredAssessment, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let questions = questions
            .iter()
            .map(|question| StoredQuestion {
                id: tables.next_id(),
                question: question.clone(),
            })
            .collect();

        let assessment = StoredAssessment {
            id,
            title: title.to_string(),
            day,
            questions,
        };
        tables.assessments.push(assessment.clone());
        Ok(assessment)
    }

    async fn save_assessment_attempt(&self, attempt: NewAssessmentAttempt) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.attempts.push((id, attempt));
        Ok(id)
    }

    async fn save_submission(&self, submission: NewSubmission) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        tables.submissions.push((id, submission));
        Ok(id)
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        job_description: &str,
        resume_text: &str,
    ) -> Result<InterviewSession, StoreError> {
        let mut tables = self.tables.write().await;
        let session = InterviewSession {
            id: tables.next_id(),
            user_id,
            job_description: job_description.to_string(),
            resume_text: resume_text.to_string(),
            status: SessionStatus::Active,
            feedback: None,
            score: None,
            created_at: Utc::now(),
        };
        tables.transcripts.insert(session.id, Vec::new());
        tables.sessions.push(session.clone());
        Ok(session)
    }

    async fn session(&self, session_id: i64) -> Result<Option<InterviewSession>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.sessions.iter().find(|s| s.id == session_id).cloned())
    }

    async fn append_turn(&self, session_id: i64, turn: &ConversationTurn) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables
            .transcripts
            .get_mut(&session_id)
            .ok_or(StoreError::SessionNotFound(session_id))?
            .push(turn.clone());
        Ok(())
    }

    async fn transcript(&self, session_id: i64) -> Result<Vec<ConversationTurn>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.transcripts.get(&session_id).cloned().unwrap_or_default())
    }

    async fn complete_session(&self, session_id: i64, feedback: &FeedbackReport) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let session = tables
            .sessions
            .iter_mut()
            .find(|s| s.id == session_id)
            .ok_or(StoreError::SessionNotFound(session_id))?;
        session.status = SessionStatus::Completed;
        session.score = Some(i32::from(feedback.score));
        session.feedback = Some(feedback.clone());
        Ok(())
    }

    async fn activity(&self, user_id: Uuid) -> Result<ActivitySummary, StoreError> {
        let tables = self.tables.read().await;

        let submissions: Vec<&NewSubmission> = tables
            .submissions
            .iter()
            .map(|(_, s)| s)
            .filter(|s| s.user_id == user_id)
            .collect();
        let sessions: Vec<&InterviewSession> = tables
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .collect();

        Ok(ActivitySummary {
            assessment_scores: tables
                .attempts
                .iter()
                .filter(|(_, a)| a.user_id == user_id)
                .map(|(_, a)| a.score)
                .collect(),
            coding_submissions: submissions.len() as i64,
            coding_passed: submissions
                .iter()
                .filter(|s| s.status == SubmissionStatus::Passed)
                .count() as i64,
            interviews: sessions.len() as i64,
            latest_interview_score: sessions.last().and_then(|s| s.score),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::assessment::QuestionKind;

    fn question(text: &str) -> GeneratedQuestion {
        GeneratedQuestion {
            category: "Java".to_string(),
            kind: QuestionKind::Mcq,
            text: text.to_string(),
            options: vec!["A".to_string(), "B".to_string()],
            correct_answer: "A".to_string(),
        }
    }

    #[tokio::test]
    async fn test_latest_assessment_for_day_wins() {
        let store = MemoryStore::new();
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        store.save_assessment("first", day, &[question("q1")]).await.unwrap();
        let second = store
            .save_assessment("second", day, &[question("q2"), question("q3")])
            .await
            .unwrap();

        let found = store.assessment_for_day(day).await.unwrap().unwrap();
        assert_eq!(found.id, second.id);
        assert_eq!(found.questions.len(), 2);
        assert_ne!(found.questions[0].id, found.questions[1].id);

        let other_day = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        assert!(store.assessment_for_day(other_day).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_transcript_is_append_only_and_ordered() {
        let store = MemoryStore::new();
        let session = store
            .create_session(Uuid::new_v4(), "JD", "")
            .await
            .unwrap();

        store.append_turn(session.id, &ConversationTurn::user("hi")).await.unwrap();
        store
            .append_turn(session.id, &ConversationTurn::assistant("hello"))
            .await
            .unwrap();

        let transcript = store.transcript(session.id).await.unwrap();
        assert_eq!(
            transcript,
            vec![ConversationTurn::user("hi"), ConversationTurn::assistant("hello")]
        );
        assert!(matches!(
            store.append_turn(999, &ConversationTurn::user("x")).await,
            Err(StoreError::SessionNotFound(999))
        ));
    }

    #[tokio::test]
    async fn test_activity_counts_only_the_user() {
        let store = MemoryStore::new();
        let user = Uuid::new_v4();
        let someone_else = Uuid::new_v4();

        for (owner, status) in [
            (user, SubmissionStatus::Passed),
            (user, SubmissionStatus::Failed),
            (someone_else, SubmissionStatus::Passed),
        ] {
            store
                .save_submission(NewSubmission {
                    user_id: owner,
                    problem_id: 1,
                    code: "pass".to_string(),
                    language: "python".to_string(),
                    status,
                })
                .await
                .unwrap();
        }

        let session = store.create_session(user, "JD", "").await.unwrap();
        let report = FeedbackReport {
            score: 82,
            strengths: vec![],
            weaknesses: vec![],
            summary: String::new(),
        };
        store.complete_session(session.id, &report).await.unwrap();

        let activity = store.activity(user).await.unwrap();
        assert_eq!(activity.coding_submissions, 2);
        assert_eq!(activity.coding_passed, 1);
        assert_eq!(activity.interviews, 1);
        assert_eq!(activity.latest_interview_score, Some(82));
        assert!(activity.assessment_scores.is_empty());
    }
}
