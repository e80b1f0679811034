use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jwt_auth::MissingRoleError;
use serde::Serialize;
use std::time::Duration;
use tickets::repository;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("validation error: {0}")]
    Validation(&'static str),

    #[error("auth error: {0}")]
    Auth(#[from] MissingRoleError),

    #[error("ticket belongs to another user")]
    NotOwner,

    #[error("ticket not exist")]
    TicketNotExist,

    #[error("ticket already cancelled")]
    AlreadyCancelled,

    #[error("ticket already confirmed")]
    AlreadyConfirmed,

    #[error("database error: {0}")]
    Database(#[from] repository::Error),

    #[error("request not finished within {0:?}")]
    Timeout(Duration),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl Error {
    fn code(&self) -> &'static str {
        match self {
            Error::InvalidRequest(_) => "invalid_request",
            Error::Validation(_) => "validation_error",
            Error::Auth(_) | Error::NotOwner => "forbidden",
            Error::TicketNotExist => "not_found",
            Error::AlreadyCancelled => "already_cancelled",
            Error::AlreadyConfirmed => "already_confirmed",
            Error::Database(_) => "database_error",
            Error::Timeout(_) => "timeout",
        }
    }

    fn status_code(&self) -> StatusCode {
        match self {
            Error::InvalidRequest(_)
            | Error::Validation(_)
            | Error::AlreadyCancelled
            | Error::AlreadyConfirmed => StatusCode::BAD_REQUEST,
            Error::Auth(_) | Error::NotOwner => StatusCode::FORBIDDEN,
            Error::TicketNotExist => StatusCode::NOT_FOUND,
            Error::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn message(&self) -> String {
        match self {
            // don't leak driver errors to clients
            Error::Database(_) => "database operation failed".to_string(),
            Error::Timeout(_) => "request timed out".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::warn!(err = %self);

        let body = ErrorBody {
            error: self.code(),
            message: self.message(),
        };

        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};
    use std::sync::Arc;

    async fn into_json(error: Error) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();

        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn validation_error_body() {
        let (status, body) = into_json(Error::Validation("quantity must be in range 1..=10")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({
                "error": "validation_error",
                "message": "validation error: quantity must be in range 1..=10",
            })
        );
    }

    #[tokio::test]
    async fn database_error_hides_details() {
        let error = Error::Database(repository::Error::Mongo(
            mongodb::error::ErrorKind::Custom(Arc::new("secret connection string")).into(),
        ));

        let (status, body) = into_json(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "database_error");
        assert!(!body["message"].as_str().unwrap().contains("secret"));
    }

    #[tokio::test]
    async fn status_codes() {
        let cases = [
            (Error::InvalidRequest("x".to_string()), StatusCode::BAD_REQUEST),
            (Error::NotOwner, StatusCode::FORBIDDEN),
            (
                Error::Auth(MissingRoleError {
                    missing_role: "role".to_string(),
                }),
                StatusCode::FORBIDDEN,
            ),
            (Error::TicketNotExist, StatusCode::NOT_FOUND),
            (Error::AlreadyCancelled, StatusCode::BAD_REQUEST),
            (Error::AlreadyConfirmed, StatusCode::BAD_REQUEST),
            (
                Error::Timeout(Duration::from_secs(1)),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (error, expected_status) in cases {
            let (status, _) = into_json(error).await;
            assert_eq!(status, expected_status);
        }
    }
}
