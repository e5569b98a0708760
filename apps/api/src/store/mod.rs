//! Persistence collaborator. Handlers only talk to `dyn Store`; the backing
//! implementation is picked at startup from `DATABASE_URL`.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::assessment::{GeneratedQuestion, NewAssessmentAttempt, StoredAssessment};
use crate::models::coding::NewSubmission;
use crate::models::interview::{ConversationTurn, FeedbackReport, InterviewSession};
use crate::models::profile::ActivitySummary;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Interview session {0} not found")]
    SessionNotFound(i64),

    #[error("Stored record is unreadable: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Most recently created assessment for `day`, with its questions in order.
    async fn assessment_for_day(&self, day: NaiveDate) -> Result<Option<StoredAssessment>, StoreError>;

    async fn save_assessment(
        &self,
        title: &str,
        day: NaiveDate,
        questions: &[GeneratedQuestion],
    ) -> Result<StoredAssessment, StoreError>;

    async fn save_assessment_attempt(&self, attempt: NewAssessmentAttempt) -> Result<i64, StoreError>;

    async fn save_submission(&self, submission: NewSubmission) -> Result<i64, StoreError>;

    async fn create_session(
        &self,
        user_id: Uuid,
        job_description: &str,
        resume_text: &str,
    ) -> Result<InterviewSession, StoreError>;

    async fn session(&self, session_id: i64) -> Result<Option<InterviewSession>, StoreError>;

    /// Appends one turn. Transcripts are never rewritten.
    async fn append_turn(&self, session_id: i64, turn: &ConversationTurn) -> Result<(), StoreError>;

    /// Full transcript in insertion order.
    async fn transcript(&self, session_id: i64) -> Result<Vec<ConversationTurn>, StoreError>;

    /// Marks the session completed and records its report and score.
    async fn complete_session(&self, session_id: i64, feedback: &FeedbackReport) -> Result<(), StoreError>;

    async fn activity(&self, user_id: Uuid) -> Result<ActivitySummary, StoreError>;
}
