use axum::{
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Activity '{0}' not found")]
    ActivityNotFound(String),

    #[error("Student {email} is already signed up for {activity}")]
    AlreadySignedUp { email: String, activity: String },

    #[error("{activity} is full ({max} participants maximum)")]
    ActivityFull { activity: String, max: u32 },

    #[error("Student {email} is not registered for {activity}")]
    NotRegistered { email: String, activity: String },

    #[error("{}", .0.body_text())]
    InvalidQuery(#[from] QueryRejection),

    #[error("Invalid activity record '{name}': {reason}")]
    InvalidRecord { name: String, reason: String },

    #[error("Invalid {key} value: {reason}")]
    Config { key: String, reason: String },

    #[error("Cannot read seed file {path}: {source}")]
    SeedFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Malformed seed data: {0}")]
    SeedFormat(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ActivityNotFound(_) | AppError::NotRegistered { .. } => {
                StatusCode::NOT_FOUND
            }
            AppError::AlreadySignedUp { .. } | AppError::ActivityFull { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::InvalidQuery(_) => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON body of every error answered by the API.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            "Internal Server Error".to_string()
        } else {
            tracing::warn!(status = %status, detail = %self, "request rejected");
            self.to_string()
        };

        (status, Json(ErrorBody { detail })).into_response()
    }
}
