use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::assessment::scoring::{needs_regeneration, score_responses, QuestionResult};
use crate::errors::AppError;
use crate::generation::questions::generate_daily_questions;
use crate::models::assessment::{NewAssessmentAttempt, QuestionKind, StoredAssessment};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct DailyQuery {
    #[serde(default)]
    pub refresh: bool,
}

/// A question as shown to the candidate. Answers stay server-side.
#[derive(Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub category: String,
}

#[derive(Serialize)]
pub struct DailyResponse {
    pub assessment_id: i64,
    pub title: String,
    pub questions: Vec<PublicQuestion>,
}

impl From<StoredAssessment> for DailyResponse {
    fn from(assessment: StoredAssessment) -> Self {
        DailyResponse {
            assessment_id: assessment.id,
            title: assessment.title,
            questions: assessment
                .questions
                .into_iter()
                .map(|stored| PublicQuestion {
                    id: stored.id,
                    text: stored.question.text,
                    kind: stored.question.kind,
                    options: stored.question.options,
                    category: stored.question.category,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub user_id: Uuid,
    #[serde(default)]
    pub responses: HashMap<String, String>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    pub attempt_id: i64,
    pub score: i32,
    pub results: Vec<QuestionResult>,
}

/// GET /api/v1/assessment/daily?refresh=
/// Serves today's stored set unless a refresh is requested or the stored set
/// carries placeholder categories; otherwise generates and stores a new one.
pub async fn handle_daily(
    State(state): State<AppState>,
    Query(params): Query<DailyQuery>,
) -> Result<Json<DailyResponse>, AppError> {
    let today = Utc::now().date_naive();

    if !params.refresh {
        if let Some(existing) = state.store.assessment_for_day(today).await? {
            if !needs_regeneration(&existing, state.generator.topics()) {
                return Ok(Json(existing.into()));
            }
            info!("Assessment {} has placeholder categories, regenerating", existing.id);
        }
    }

    let questions = generate_daily_questions(&state.generator).await?;
    let stored = state
        .store
        .save_assessment(&format!("Daily Assessment {today}"), today, &questions)
        .await?;

    Ok(Json(stored.into()))
}

/// POST /api/v1/assessment/submit
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    let today = Utc::now().date_naive();
    let assessment = state
        .store
        .assessment_for_day(today)
        .await?
        .ok_or_else(|| AppError::NotFound("No assessment has been generated today".to_string()))?;

    let sheet = score_responses(&assessment.questions, &req.responses);
    let attempt_id = state
        .store
        .save_assessment_attempt(NewAssessmentAttempt {
            user_id: req.user_id,
            assessment_id: Some(assessment.id),
            score: sheet.score,
            responses: req.responses,
        })
        .await?;

    info!(
        "User {} scored {}% on assessment {}",
        req.user_id, sheet.score, assessment.id
    );

    Ok(Json(SubmitResponse {
        status: "submitted",
        attempt_id,
        score: sheet.score,
        results: sheet.results,
    }))
}
