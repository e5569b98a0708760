use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::feedback::generate_feedback;
use crate::interview::followup::generate_followup;
use crate::interview::prompts::OPENING_MESSAGE;
use crate::interview::resume::extract_resume_text;
use crate::models::interview::{ConversationTurn, FeedbackReport, InterviewSession, SessionStatus};
use crate::state::AppState;

#[derive(Serialize)]
pub struct StartResponse {
    pub session_id: i64,
    pub message: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub stage: &'static str,
}

#[derive(Serialize)]
pub struct EndResponse {
    pub message: String,
    pub feedback: FeedbackReport,
}

struct ResumeUpload {
    file_name: Option<String>,
    content_type: Option<String>,
    bytes: Bytes,
}

/// POST /api/v1/interview/start
/// Multipart fields: `user_id`, `job_description`, optional `resume` file.
pub async fn handle_start(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StartResponse>, AppError> {
    let mut user_id: Option<Uuid> = None;
    let mut job_description: Option<String> = None;
    let mut resume: Option<ResumeUpload> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_id" => {
                let raw = field.text().await?;
                let parsed = Uuid::parse_str(raw.trim())
                    .map_err(|_| AppError::Validation(format!("user_id '{raw}' is not a UUID")))?;
                user_id = Some(parsed);
            }
            "job_description" => job_description = Some(field.text().await?),
            "resume" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                resume = Some(ResumeUpload {
                    file_name,
                    content_type,
                    bytes,
                });
            }
            _ => {}
        }
    }

    let user_id = user_id.ok_or_else(|| AppError::Validation("user_id is required".to_string()))?;
    let job_description = job_description
        .map(|jd| jd.trim().to_string())
        .filter(|jd| !jd.is_empty())
        .ok_or_else(|| AppError::Validation("job_description is required".to_string()))?;

    let resume_text = match resume {
        Some(upload) => {
            extract_resume_text(
                upload.file_name.as_deref(),
                upload.content_type.as_deref(),
                upload.bytes,
            )
            .await?
        }
        None => String::new(),
    };

    let session = state
        .store
        .create_session(user_id, &job_description, &resume_text)
        .await?;

    Ok(Json(StartResponse {
        session_id: session.id,
        message: OPENING_MESSAGE.to_string(),
    }))
}

/// POST /api/v1/interview/:id/chat
/// The candidate's turn is always stored; the interviewer's reply only when it
/// came from the model.
pub async fn handle_chat(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = req.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let session = active_session(&state, session_id).await?;
    state
        .store
        .append_turn(session.id, &ConversationTurn::user(message))
        .await?;

    let history = state.store.transcript(session.id).await?;
    let reply = generate_followup(
        &state.generator,
        &history,
        &session.job_description,
        &session.resume_text,
    )
    .await?;

    if reply.generated {
        state
            .store
            .append_turn(session.id, &ConversationTurn::assistant(reply.text.clone()))
            .await?;
    }

    Ok(Json(ChatResponse {
        response: reply.text,
        stage: reply.stage.label(),
    }))
}

/// POST /api/v1/interview/:id/end
pub async fn handle_end(
    State(state): State<AppState>,
    Path(session_id): Path<i64>,
) -> Result<Json<EndResponse>, AppError> {
    let session = find_session(&state, session_id).await?;
    let history = state.store.transcript(session.id).await?;

    let feedback = generate_feedback(&state.generator, &history, &session.job_description).await?;
    state.store.complete_session(session.id, &feedback).await?;
    info!(
        "Interview session {} completed with score {}",
        session.id, feedback.score
    );

    Ok(Json(EndResponse {
        message: "Interview ended successfully.".to_string(),
        feedback,
    }))
}

async fn find_session(state: &AppState, session_id: i64) -> Result<InterviewSession, AppError> {
    state
        .store
        .session(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Session not found".to_string()))
}

async fn active_session(state: &AppState, session_id: i64) -> Result<InterviewSession, AppError> {
    let session = find_session(state, session_id).await?;
    if session.status == SessionStatus::Completed {
        return Err(AppError::Validation(format!(
            "Interview session {session_id} has already ended"
        )));
    }
    Ok(session)
}
