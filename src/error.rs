// region:    --- Imports
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

// endregion: --- Imports

// region:    --- App Error
/// HTTP 요청 처리 오류
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Auction {0} not found")]
    NotFound(Uuid),

    #[error("{0}")]
    SaveFailed(&'static str),

    #[error("Invalid date filter: {0}")]
    InvalidDate(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::SaveFailed(_) | AppError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Serialization(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("{:<12} --> 요청 처리 실패: {}", "Handler", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

// endregion: --- App Error

// region:    --- Messaging Error
/// 메시지 브로커 오류
#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Kafka error: {0}")]
    Kafka(#[from] rdkafka::error::KafkaError),

    #[error("Topic {topic} creation failed: {reason}")]
    TopicCreation { topic: String, reason: String },
}

// endregion: --- Messaging Error

// region:    --- Search Error
/// 검색 컨슈머 오류
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Cannot sell cars with model name {0}")]
    Poison(String),

    #[error("Document store error: {0}")]
    Store(#[from] mongodb::error::Error),
}

// endregion: --- Search Error

// region:    --- Config Error
/// 설정 오류
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(String),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
}

// endregion: --- Config Error

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_errors_to_status_codes() {
        assert_eq!(AppError::NotFound(Uuid::nil()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::SaveFailed("Problem saving changes").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::InvalidDate("yesterday".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn save_failure_message_is_passed_through() {
        let err = AppError::SaveFailed("Could not update database");
        assert_eq!(err.to_string(), "Could not update database");
    }
}
