use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::Algorithm;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
#[error("missing role: {missing_role}")]
pub struct MissingRoleError {
    pub missing_role: String,
}

#[derive(Debug, thiserror::Error)]
pub enum KeyCacheError {
    #[error("signing key {kid} not found")]
    NotFound { kid: String },

    #[error("failed to fetch key set: {0}")]
    Fetch(anyhow::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing Authorization header")]
    MissingHeader,

    #[error("malformed Authorization header")]
    MalformedHeader,

    #[error("malformed token: {0}")]
    MalformedToken(jsonwebtoken::errors::Error),

    #[error("unsupported algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("token header has no kid")]
    MissingKeyId,

    #[error("unknown signing key {kid}")]
    UnknownKey { kid: String },

    #[error("signing keys unavailable: {0}")]
    KeySetUnavailable(anyhow::Error),

    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),

    #[error("token has no subject")]
    MissingSubject,
}

impl From<KeyCacheError> for AuthError {
    fn from(err: KeyCacheError) -> Self {
        match err {
            KeyCacheError::NotFound { kid } => AuthError::UnknownKey { kid },
            KeyCacheError::Fetch(err) => AuthError::KeySetUnavailable(err),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match self {
            // fetch errors may contain provider addresses
            AuthError::KeySetUnavailable(_) => "signing keys unavailable".to_string(),
            err => err.to_string(),
        };

        let body = json!({
            "error": "unauthorized",
            "message": message,
        });

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
