use axum::{extract::State, Json};
use common::types::DataEnvelope;

use crate::errors::ApiError;
use crate::state::AppState;

/// GET /supabase-data: hosted data API body wrapped as `{data: ...}`.
pub async fn supabase_data(State(state): State<AppState>) -> Result<Json<DataEnvelope<serde_json::Value>>, ApiError> {
    let body = state.records.list_remote().await?;
    Ok(Json(DataEnvelope::new(body)))
}
