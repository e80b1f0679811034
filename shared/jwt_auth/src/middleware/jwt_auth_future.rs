use crate::{AuthError, User};
use axum::{
    extract::Request,
    response::{IntoResponse, Response},
};
use pin_project::pin_project;
use std::{
    future::Future,
    pin::Pin,
    task::{ready, Context, Poll},
};
use tower::Service;
use tracing::Span;

pub type VerificationFuture = Pin<Box<dyn Future<Output = Result<User, AuthError>> + Send>>;

#[pin_project(project = JwtAuthFutureProj)]
pub enum JwtAuthFuture<S>
where
    S: Service<Request>,
{
    Verifying {
        verification: VerificationFuture,

        /// inner service that is ready to accept the request
        pending: Option<(S, Request)>,
    },
    Authorized {
        #[pin]
        inner: S::Future,

        /// span that should be used to add
        /// user context to request processing
        span: Span,
    },
    Unauthorized {
        error: Option<AuthError>,
    },
}

impl<S> JwtAuthFuture<S>
where
    S: Service<Request>,
{
    pub fn verifying(verification: VerificationFuture, inner: S, request: Request) -> Self {
        Self::Verifying {
            verification,
            pending: Some((inner, request)),
        }
    }

    pub fn unauthorized(error: AuthError) -> Self {
        Self::Unauthorized { error: Some(error) }
    }
}

impl<S> Future for JwtAuthFuture<S>
where
    S: Service<Request, Response = Response>,
{
    type Output = Result<Response, S::Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        loop {
            let next = match self.as_mut().project() {
                JwtAuthFutureProj::Verifying {
                    verification,
                    pending,
                } => {
                    let result = ready!(verification.as_mut().poll(cx));
                    let Some((mut inner, mut request)) = pending.take() else {
                        unreachable!("request is taken only once verification completes");
                    };

                    match result {
                        Ok(user) => {
                            let span = tracing::info_span!("user", id = %user.id);
                            request.extensions_mut().insert(user);

                            let inner = {
                                let _entered = span.enter();
                                inner.call(request)
                            };

                            JwtAuthFuture::Authorized { inner, span }
                        }
                        Err(err) => {
                            tracing::warn!(%err, "auth error");
                            JwtAuthFuture::unauthorized(err)
                        }
                    }
                }
                JwtAuthFutureProj::Authorized { inner, span } => {
                    let _entered = span.enter();
                    return inner.poll(cx);
                }
                JwtAuthFutureProj::Unauthorized { error } => {
                    let response = match error.take() {
                        Some(err) => err.into_response(),
                        None => AuthError::MissingHeader.into_response(),
                    };
                    return Poll::Ready(Ok(response));
                }
            };

            self.set(next);
        }
    }
}
