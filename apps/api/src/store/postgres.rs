use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{Store, StoreError};
use crate::models::assessment::{
    GeneratedQuestion, NewAssessmentAttempt, QuestionKind, StoredAssessment, StoredQuestion,
};
use crate::models::coding::NewSubmission;
use crate::models::interview::{
    ConversationTurn, FeedbackReport, InterviewSession, SessionStatus, TurnRole,
};
use crate::models::profile::ActivitySummary;

/// PostgreSQL-backed store. Tables are created by `db::ensure_schema`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AssessmentRow {
    id: i64,
    title: String,
    day: NaiveDate,
}

#[derive(FromRow)]
struct QuestionRow {
    id: i64,
    category: String,
    kind: String,
    text: String,
    options: Json<Vec<String>>,
    correct_answer: String,
}

impl TryFrom<QuestionRow> for StoredQuestion {
    type Error = StoreError;

    fn try_from(row: QuestionRow) -> Result<Self, Self::Error> {
        let kind = QuestionKind::from_label(&row.kind)
            .ok_or_else(|| StoreError::Corrupt(format!("question {} has kind '{}'", row.id, row.kind)))?;
        Ok(StoredQuestion {
            id: row.id,
            question: GeneratedQuestion {
                category: row.category,
                kind,
                text: row.text,
                options: row.options.0,
                correct_answer: row.correct_answer,
            },
        })
    }
}

#[derive(FromRow)]
struct SessionRow {
    id: i64,
    user_id: Uuid,
    job_description: String,
    resume_text: String,
    status: String,
    feedback: Option<Json<FeedbackReport>>,
    score: Option<i32>,
    created_at: DateTime<Utc>,
}

impl From<SessionRow> for InterviewSession {
    fn from(row: SessionRow) -> Self {
        InterviewSession {
            id: row.id,
            user_id: row.user_id,
            job_description: row.job_description,
            resume_text: row.resume_text,
            status: SessionStatus::from_label(&row.status),
            feedback: row.feedback.map(|Json(report)| report),
            score: row.score,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct TurnRow {
    role: String,
    content: String,
}

const SESSION_COLUMNS: &str =
    "id, user_id, job_description, resume_text, status, feedback, score, created_at";

#[async_trait]
impl Store for PgStore {
    async fn assessment_for_day(&self, day: NaiveDate) -> Result<Option<StoredAssessment>, StoreError> {
        let assessment: Option<AssessmentRow> = sqlx::query_as(
            "SELECT id, title, day FROM assessments WHERE day = $1 ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        let Some(assessment) = assessment else {
            return Ok(None);
        };

        let rows: Vec<QuestionRow> = sqlx::query_as(
            r#"
            SELECT id, category, kind, text, options, correct_answer
            FROM assessment_questions
            WHERE assessment_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(assessment.id)
        .fetch_all(&self.pool)
        .await?;

        let questions = rows
            .into_iter()
            .map(StoredQuestion::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(StoredAssessment {
            id: assessment.id,
            title: assessment.title,
            day: assessment.day,
            questions,
        }))
    }

    async fn save_assessment(
        &self,
        title: &str,
        day: NaiveDate,
        questions: &[GeneratedQuestion],
    ) -> Result<StoredAssessment, StoreError> {
        let mut tx = self.pool.begin().await?;

        let assessment_id: i64 =
            sqlx::query_scalar("INSERT INTO assessments (title, day) VALUES ($1, $2) RETURNING id")
                .bind(title)
                .bind(day)
                .fetch_one(&mut *tx)
                .await?;

        let mut stored = Vec::with_capacity(questions.len());
        for (position, question) in questions.iter().enumerate() {
            let id: i64 = sqlx::query_scalar(
                r#"
                INSERT INTO assessment_questions
                    (assessment_id, position, category, kind, text, options, correct_answer)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id
                "#,
            )
            .bind(assessment_id)
            .bind(position as i32)
            .bind(&question.category)
            .bind(question.kind.as_str())
            .bind(&question.text)
            .bind(Json(&question.options))
            .bind(&question.correct_answer)
            .fetch_one(&mut *tx)
            .await?;

            stored.push(StoredQuestion {
                id,
                question: question.clone(),
            });
        }

        tx.commit().await?;
        info!("Stored assessment {assessment_id} with {} questions", stored.len());

        Ok(StoredAssessment {
            id: assessment_id,
            title: title.to_string(),
            day,
            questions: stored,
        })
    }

    async fn save_assessment_attempt(&self, attempt: NewAssessmentAttempt) -> Result<i64, StoreError> {
        Ok(sqlx::query_scalar(
            r#"
            INSERT INTO assessment_attempts (user_id, assessment_id, score, responses)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(attempt.user_id)
        .bind(attempt.assessment_id)
        .bind(attempt.score)
        .bind(Json(&attempt.responses))
        .fetch_one(&self.pool)
        .await?)
    }

    async fn save_submission(&self, submission: NewSubmission) -> Result<i64, StoreError> {
        Ok(sqlx::query_scalar(
            r#"
            INSERT INTO coding_submissions (user_id, problem_id, code, language, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(submission.user_id)
        .bind(submission.problem_id)
        .bind(&submission.code)
        .bind(&submission.language)
        .bind(submission.status.as_str())
        .fetch_one(&self.pool)
        .await?)
    }

    async fn create_session(
        &self,
        user_id: Uuid,
        job_description: &str,
        resume_text: &str,
    ) -> Result<InterviewSession, StoreError> {
        let row: SessionRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO interview_sessions (user_id, job_description, resume_text, status)
            VALUES ($1, $2, $3, $4)
            RETURNING {SESSION_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(job_description)
        .bind(resume_text)
        .bind(SessionStatus::Active.as_str())
        .fetch_one(&self.pool)
        .await?;

        info!("Created interview session {} for user {user_id}", row.id);
        Ok(row.into())
    }

    async fn session(&self, session_id: i64) -> Result<Option<InterviewSession>, StoreError> {
        let row: Option<SessionRow> = sqlx::query_as(&format!(
            "SELECT {SESSION_COLUMNS} FROM interview_sessions WHERE id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(InterviewSession::from))
    }

    async fn append_turn(&self, session_id: i64, turn: &ConversationTurn) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO interview_messages (session_id, role, content) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(turn.role.as_str())
            .bind(&turn.content)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn transcript(&self, session_id: i64) -> Result<Vec<ConversationTurn>, StoreError> {
        let rows: Vec<TurnRow> = sqlx::query_as(
            "SELECT role, content FROM interview_messages WHERE session_id = $1 ORDER BY id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let role = TurnRole::from_label(&row.role)
                    .ok_or_else(|| StoreError::Corrupt(format!("message role '{}'", row.role)))?;
                Ok(ConversationTurn {
                    role,
                    content: row.content,
                })
            })
            .collect()
    }

    async fn complete_session(&self, session_id: i64, feedback: &FeedbackReport) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE interview_sessions
            SET status = $2, feedback = $3, score = $4
            WHERE id = $1
            "#,
        )
        .bind(session_id)
        .bind(SessionStatus::Completed.as_str())
        .bind(Json(feedback))
        .bind(i32::from(feedback.score))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::SessionNotFound(session_id));
        }
        Ok(())
    }

    async fn activity(&self, user_id: Uuid) -> Result<ActivitySummary, StoreError> {
        let assessment_scores: Vec<i32> = sqlx::query_scalar(
            "SELECT score FROM assessment_attempts WHERE user_id = $1 ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let (coding_submissions, coding_passed): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COUNT(*) FILTER (WHERE status = 'Passed')
            FROM coding_submissions
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let interviews: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM interview_sessions WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        let latest_interview_score: Option<Option<i32>> = sqlx::query_scalar(
            r#"
            SELECT score FROM interview_sessions
            WHERE user_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(ActivitySummary {
            assessment_scores,
            coding_submissions,
            coding_passed,
            interviews,
            latest_interview_score: latest_interview_score.flatten(),
        })
    }
}
