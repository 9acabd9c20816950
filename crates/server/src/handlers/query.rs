//! # Query Handler
//!
//! The Text-to-SQL endpoint: one question in, one SQL statement and the schema
//! context it was grounded on out.

use super::{AppError, AppState};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use sqlrag::{GenerationResult, QueryRequest};
use tracing::info;

/// Handler for `POST /query`.
pub async fn query_handler(
    State(app_state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<GenerationResult>, AppError> {
    let Json(request) = payload?;
    info!("Received query: '{}'", request.question);

    let result = app_state.pipeline.handle(&request.question).await?;
    Ok(Json(result))
}
