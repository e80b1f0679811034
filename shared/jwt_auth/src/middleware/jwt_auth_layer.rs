use super::jwt_auth_service::JwtAuthService;
use crate::TokenVerifier;
use std::sync::Arc;
use tower::Layer;

///
/// Layer authenticating requests with `Authorization: Bearer <token>` header.
///
/// Authenticated [crate::User] is added to request extensions.
/// Requests that fail authentication get 401 response without reaching inner service.
///
#[derive(Clone)]
pub struct JwtAuthLayer {
    verifier: Arc<TokenVerifier>,
}

impl JwtAuthLayer {
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }
}

impl<S> Layer<S> for JwtAuthLayer {
    type Service = JwtAuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        JwtAuthService::new(inner, Arc::clone(&self.verifier))
    }
}
