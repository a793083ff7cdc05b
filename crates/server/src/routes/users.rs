use axum::{extract::{rejection::JsonRejection, State}, Json};
use common::types::DataEnvelope;
use models::user_detail::{NewUserRecordInput, UserRecord};

use crate::errors::ApiError;
use crate::state::AppState;

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> Result<Json<DataEnvelope<Vec<UserRecord>>>, ApiError> {
    let rows = state.records.list_all().await?;
    Ok(Json(DataEnvelope::new(rows)))
}

/// POST /users; echoes the stored row unwrapped.
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUserRecordInput>, JsonRejection>,
) -> Result<Json<UserRecord>, ApiError> {
    let Json(input) = payload?;
    let created = state.records.create(input).await?;
    Ok(Json(created))
}

/// GET /active-users
pub async fn list_active_users(State(state): State<AppState>) -> Result<Json<DataEnvelope<Vec<UserRecord>>>, ApiError> {
    let rows = state.records.list_active().await?;
    Ok(Json(DataEnvelope::new(rows)))
}
