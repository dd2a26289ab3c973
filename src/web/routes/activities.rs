use std::collections::BTreeMap;

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::Activity;
use crate::services::activities_service;

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn list_activities_handler(
    State(pool): State<SqlitePool>,
) -> Result<Json<BTreeMap<String, Activity>>, AppError> {
    activities_service::list_activities(&pool).await.map(Json)
}

pub async fn signup_handler(
    Path(activity_name): Path<String>,
    query: Result<Query<EmailQuery>, QueryRejection>,
    State(pool): State<SqlitePool>,
) -> Result<Json<MessageResponse>, AppError> {
    let Query(query) = query?;
    let message = activities_service::signup(&pool, &activity_name, &query.email).await?;
    Ok(Json(MessageResponse { message }))
}

pub async fn unregister_handler(
    Path(activity_name): Path<String>,
    query: Result<Query<EmailQuery>, QueryRejection>,
    State(pool): State<SqlitePool>,
) -> Result<Json<MessageResponse>, AppError> {
    let Query(query) = query?;
    let message = activities_service::unregister(&pool, &activity_name, &query.email).await?;
    Ok(Json(MessageResponse { message }))
}
