use super::jwt_auth_future::JwtAuthFuture;
use crate::{AuthError, TokenVerifier};
use axum::{
    extract::Request,
    http::{header::AUTHORIZATION, HeaderMap},
    response::Response,
};
use std::{
    sync::Arc,
    task::{Context, Poll},
};
use tower::Service;

#[derive(Clone)]
pub struct JwtAuthService<S> {
    inner: S,
    verifier: Arc<TokenVerifier>,
}

impl<S> JwtAuthService<S> {
    pub fn new(inner: S, verifier: Arc<TokenVerifier>) -> Self {
        Self { inner, verifier }
    }
}

impl<S> Service<Request> for JwtAuthService<S>
where
    S: Service<Request, Response = Response> + Clone,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = JwtAuthFuture<S>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let token = match bearer_token(req.headers()) {
            Ok(token) => token.to_string(),
            Err(err) => {
                tracing::warn!(%err, "auth error");
                return JwtAuthFuture::unauthorized(err);
            }
        };

        // Instance driven to readiness by poll_ready goes with the request
        let clone = self.inner.clone();
        let inner = std::mem::replace(&mut self.inner, clone);

        let verifier = Arc::clone(&self.verifier);
        let verification = Box::pin(async move { verifier.verify(&token).await });

        JwtAuthFuture::verifying(verification, inner, req)
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let authorization_header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingHeader)?;
    let authorization_value = authorization_header
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;
    let token = authorization_value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::MalformedHeader)?;

    if token.is_empty() {
        return Err(AuthError::MalformedHeader);
    }

    Ok(token)
}
