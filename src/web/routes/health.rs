use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use sqlx::SqlitePool;

use crate::database;
use crate::error::AppError;

pub async fn health_handler(State(pool): State<SqlitePool>) -> Result<impl IntoResponse, AppError> {
    database::ping(&pool).await?;
    Ok((StatusCode::OK, Json(json!({ "status": "ok" }))))
}
