use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PollError {
    #[error("Feeling out of range: {0}")]
    InvalidFeeling(String),
    #[error("Invalid date {0:?}, expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Invalid request")]
    InvalidRequest,
    #[error("Storage unavailable during {operation} of {key}: {cause}")]
    StorageUnavailable {
        operation: &'static str,
        key: String,
        cause: String,
    },
    #[error("Corrupted record {key}: {detail}")]
    DataCorruption { key: String, detail: String },
}

/// Failures reported by a counter backend, before the engine attaches
/// operation context.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),
    #[error("backend rejected request: {0}")]
    Rejected(String),
    #[error("stored record could not be decoded: {0}")]
    Decode(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),
    #[error("Invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Database initialization failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Storage initialization failed: {0}")]
    Backend(#[from] BackendError),
    #[error("Unable to spawn tcp listener: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for PollError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            PollError::InvalidFeeling(_) => (StatusCode::BAD_REQUEST, "Invalid feeling"),
            PollError::InvalidDate(_) => (StatusCode::BAD_REQUEST, "Invalid date"),
            PollError::InvalidRequest => (StatusCode::BAD_REQUEST, "Invalid request"),
            PollError::StorageUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, "Storage unavailable")
            }
            PollError::DataCorruption { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Stored data is corrupted")
            }
        };

        let body = Json(json!({
            "error": error_message,
            "details": self.to_string()
        }));

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                BackendError::Decode(error.to_string())
            }
            sqlx::Error::Database(_) | sqlx::Error::ColumnNotFound(_) => {
                BackendError::Rejected(error.to_string())
            }
            _ => BackendError::Unreachable(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_bad_request() {
        for err in [
            PollError::InvalidFeeling("99".into()),
            PollError::InvalidDate("2024-13-01".into()),
            PollError::InvalidRequest,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn storage_errors_are_distinct_server_errors() {
        let unavailable = PollError::StorageUnavailable {
            operation: "get_poll_result",
            key: "2024-03-01".into(),
            cause: "timed out".into(),
        };
        let corrupt = PollError::DataCorruption {
            key: "2024-03-01".into(),
            detail: "good is \"abc\"".into(),
        };
        assert_eq!(
            unavailable.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            corrupt.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn pool_timeout_is_unreachable() {
        let err: BackendError = sqlx::Error::PoolTimedOut.into();
        assert!(matches!(err, BackendError::Unreachable(_)));
    }
}
