use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::profile::stats::{build_stats, ProfileStats};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

/// GET /api/v1/profile/stats?user_id=
pub async fn handle_stats(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<ProfileStats>, AppError> {
    let activity = state.store.activity(params.user_id).await?;
    Ok(Json(build_stats(&activity)))
}
