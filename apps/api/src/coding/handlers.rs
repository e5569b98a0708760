use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::coding_problem::generate_coding_problem;
use crate::generation::evaluation::evaluate_code;
use crate::models::coding::{
    Analysis, CodingProblem, EvaluationStatus, NewSubmission, SubmissionStatus,
};
use crate::state::AppState;

/// Title used when the client does not say which problem the code solves.
pub const DEFAULT_PROBLEM_TITLE: &str = "Two Sum";

#[derive(Deserialize)]
pub struct RunRequest {
    pub code: String,
    pub language: String,
    pub problem_title: Option<String>,
}

#[derive(Serialize)]
pub struct RunResponse {
    pub status: EvaluationStatus,
    pub output: String,
    pub analysis: Option<Analysis>,
}

#[derive(Deserialize)]
pub struct SubmitRequest {
    pub user_id: Uuid,
    pub code: String,
    pub language: String,
    pub problem_id: i64,
    pub problem_title: Option<String>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub status: &'static str,
    pub submission_id: i64,
    pub verdict: SubmissionStatus,
    pub result: String,
    pub analysis: Option<Analysis>,
}

/// GET /api/v1/coding/daily
/// Always a renderable problem; generation failures come back as placeholder problems.
pub async fn handle_daily(State(state): State<AppState>) -> Result<Json<CodingProblem>, AppError> {
    Ok(Json(generate_coding_problem(&state.generator).await?))
}

/// POST /api/v1/coding/run
pub async fn handle_run(
    State(state): State<AppState>,
    Json(req): Json<RunRequest>,
) -> Result<Json<RunResponse>, AppError> {
    validate_code(&req.code, &req.language)?;
    let title = problem_title(req.problem_title.as_deref());

    let result = evaluate_code(&state.generator, &req.code, &req.language, title).await?;
    Ok(Json(RunResponse {
        status: result.status,
        output: result.output,
        analysis: result.analysis,
    }))
}

/// POST /api/v1/coding/submit
/// A `success` verdict is stored as Passed, anything else as Failed.
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, AppError> {
    validate_code(&req.code, &req.language)?;
    let title = problem_title(req.problem_title.as_deref());

    let result = evaluate_code(&state.generator, &req.code, &req.language, title).await?;
    let verdict = SubmissionStatus::from(result.status);

    let submission_id = state
        .store
        .save_submission(NewSubmission {
            user_id: req.user_id,
            problem_id: req.problem_id,
            code: req.code,
            language: req.language,
            status: verdict,
        })
        .await?;
    info!(
        "Submission {submission_id} for problem {} by {}: {}",
        req.problem_id,
        req.user_id,
        verdict.as_str()
    );

    Ok(Json(SubmitResponse {
        status: "submitted",
        submission_id,
        verdict,
        result: result.output,
        analysis: result.analysis,
    }))
}

fn validate_code(code: &str, language: &str) -> Result<(), AppError> {
    if code.trim().is_empty() {
        return Err(AppError::Validation("code must not be empty".to_string()));
    }
    if language.trim().is_empty() {
        return Err(AppError::Validation("language must not be empty".to_string()));
    }
    Ok(())
}

fn problem_title(requested: Option<&str>) -> &str {
    requested
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .unwrap_or(DEFAULT_PROBLEM_TITLE)
}
