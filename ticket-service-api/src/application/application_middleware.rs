use super::ApplicationEnv;
use axum::http::{header, HeaderValue, Method};
use jwt_auth::{
    HttpJwksFetcher, JwksKeyCache, JwksKeyCacheConfig, JwtAuthLayer, TokenVerifier,
    TokenVerifierConfig,
};
use std::sync::Arc;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

pub struct ApplicationMiddleware {
    pub auth: JwtAuthLayer,
    pub body_limit: RequestBodyLimitLayer,
    pub cors: CorsLayer,
    pub trace: TraceLayer<SharedClassifier<ServerErrorsAsFailures>>,
}

impl ApplicationMiddleware {
    pub fn new(
        token_verifier: Arc<TokenVerifier>,
        max_http_content_len: usize,
        cors_allowed_origins: &[String],
    ) -> anyhow::Result<Self> {
        let auth = JwtAuthLayer::new(token_verifier);
        let body_limit = RequestBodyLimitLayer::new(max_http_content_len);
        let cors = create_cors(cors_allowed_origins)?;
        let trace = TraceLayer::new_for_http();

        Ok(Self {
            auth,
            body_limit,
            cors,
            trace,
        })
    }
}

pub async fn create_middleware(env: &ApplicationEnv) -> anyhow::Result<ApplicationMiddleware> {
    tracing::info!("creating key cache");
    let fetcher = HttpJwksFetcher::new(env.jwks_url.clone(), env.jwks_fetch_timeout)?;
    let config = JwksKeyCacheConfig {
        min_reload_interval: env.jwks_min_reload_interval,
    };
    let key_cache = JwksKeyCache::new(config, Box::new(fetcher));
    key_cache.preload().await;

    let config = TokenVerifierConfig {
        algorithms: env.jwt_algorithms.clone(),
        issuer: env.jwt_issuer.clone(),
        audience: env.jwt_audience.clone(),
    };
    let token_verifier = TokenVerifier::new(config, Arc::new(key_cache))?;

    ApplicationMiddleware::new(
        Arc::new(token_verifier),
        env.max_http_content_len,
        &env.cors_allowed_origins,
    )
}

fn create_cors(allowed_origins: &[String]) -> anyhow::Result<CorsLayer> {
    let allow_origin = match allowed_origins.iter().any(|origin| origin == "*") {
        true => AllowOrigin::any(),
        false => {
            let origins = allowed_origins
                .iter()
                .map(|origin| HeaderValue::from_str(origin))
                .collect::<Result<Vec<_>, _>>()?;
            AllowOrigin::list(origins)
        }
    };

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Ok(cors)
}
