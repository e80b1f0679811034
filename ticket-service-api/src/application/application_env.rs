use anyhow::anyhow;
use jsonwebtoken::Algorithm;
use jwt_auth::parse_jwt_algorithms;
use std::{net::SocketAddr, time::Duration};

pub struct ApplicationEnv {
    pub log_directory: String,
    pub log_filename: String,

    pub bind_address: SocketAddr,
    pub max_http_content_len: usize,
    /// `*` allows any origin
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,
    pub health_check_timeout: Duration,

    pub db_connection_string: String,
    pub db_name: String,

    pub jwks_url: String,
    pub jwks_fetch_timeout: Duration,
    pub jwks_min_reload_interval: Duration,
    /// Algorithms must belong to the RSA family
    pub jwt_algorithms: Vec<Algorithm>,
    pub jwt_issuer: Option<String>,
    pub jwt_audience: Option<String>,

    pub rabbitmq_connection_string: String,
    pub rabbitmq_retry_interval: Duration,
    pub rabbitmq_exchange_name: String,
    pub rabbitmq_purchased_queue_name: String,
    pub publish_confirm_timeout: Duration,

    pub relay_interval: Duration,
    pub relay_grace_period: Duration,
    pub relay_batch_size: i64,
}

impl ApplicationEnv {
    pub fn parse() -> anyhow::Result<Self> {
        let log_directory = Self::env_var("TICKET_SERVICE_API_LOG_DIRECTORY")?;
        let log_filename = Self::env_var("TICKET_SERVICE_API_LOG_FILENAME")?;
        let bind_address = Self::env_var("TICKET_SERVICE_API_BIND_ADDRESS")?.parse()?;
        let max_http_content_len =
            Self::env_var("TICKET_SERVICE_API_MAX_HTTP_CONTENT_LEN")?.parse()?;
        let cors_allowed_origins =
            Self::parse_list(&Self::env_var("TICKET_SERVICE_API_CORS_ALLOWED_ORIGINS")?);
        let request_timeout = Self::env_millis("TICKET_SERVICE_API_REQUEST_TIMEOUT")?;
        let health_check_timeout = Self::env_millis("TICKET_SERVICE_API_HEALTH_CHECK_TIMEOUT")?;
        let db_connection_string = Self::env_var("TICKET_SERVICE_API_DB_CONNECTION_STRING")?;
        let db_name = Self::env_var("TICKET_SERVICE_API_DB_NAME")?;
        let jwks_url = Self::env_var("TICKET_SERVICE_API_JWKS_URL")?;
        let jwks_fetch_timeout = Self::env_millis("TICKET_SERVICE_API_JWKS_FETCH_TIMEOUT")?;
        let jwks_min_reload_interval =
            Self::env_millis("TICKET_SERVICE_API_JWKS_MIN_RELOAD_INTERVAL")?;
        let jwt_algorithms =
            parse_jwt_algorithms(Self::env_var("TICKET_SERVICE_API_JWT_ALGORITHMS")?)?;
        let jwt_issuer = Self::optional_env_var("TICKET_SERVICE_API_JWT_ISSUER");
        let jwt_audience = Self::optional_env_var("TICKET_SERVICE_API_JWT_AUDIENCE");
        let rabbitmq_connection_string =
            Self::env_var("TICKET_SERVICE_API_RABBITMQ_CONNECTION_STRING")?;
        let rabbitmq_retry_interval =
            Self::env_var("TICKET_SERVICE_API_RABBITMQ_RETRY_INTERVAL")?.parse()?;
        let rabbitmq_retry_interval = Duration::from_secs(rabbitmq_retry_interval);
        let rabbitmq_exchange_name = Self::env_var("TICKET_SERVICE_API_RABBITMQ_EXCHANGE_NAME")?;
        let rabbitmq_purchased_queue_name =
            Self::env_var("TICKET_SERVICE_API_RABBITMQ_PURCHASED_QUEUE_NAME")?;
        let publish_confirm_timeout =
            Self::env_millis("TICKET_SERVICE_API_PUBLISH_CONFIRM_TIMEOUT")?;
        let relay_interval = Self::env_millis("TICKET_SERVICE_API_RELAY_INTERVAL")?;
        let relay_grace_period = Self::env_millis("TICKET_SERVICE_API_RELAY_GRACE_PERIOD")?;
        let relay_batch_size = Self::env_var("TICKET_SERVICE_API_RELAY_BATCH_SIZE")?.parse()?;

        Ok(Self {
            log_directory,
            log_filename,
            bind_address,
            max_http_content_len,
            cors_allowed_origins,
            request_timeout,
            health_check_timeout,
            db_connection_string,
            db_name,
            jwks_url,
            jwks_fetch_timeout,
            jwks_min_reload_interval,
            jwt_algorithms,
            jwt_issuer,
            jwt_audience,
            rabbitmq_connection_string,
            rabbitmq_retry_interval,
            rabbitmq_exchange_name,
            rabbitmq_purchased_queue_name,
            publish_confirm_timeout,
            relay_interval,
            relay_grace_period,
            relay_batch_size,
        })
    }

    fn env_var(name: &'static str) -> anyhow::Result<String> {
        std::env::var(name).map_err(|_| anyhow!("environment variable {name} not set"))
    }

    fn optional_env_var(name: &'static str) -> Option<String> {
        std::env::var(name).ok().filter(|value| !value.trim().is_empty())
    }

    fn env_millis(name: &'static str) -> anyhow::Result<Duration> {
        let millis = Self::env_var(name)?
            .parse()
            .map_err(|err| anyhow!("environment variable {name} invalid: {err}"))?;

        Ok(Duration::from_millis(millis))
    }

    fn parse_list(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|item| !item.is_empty())
            .map(str::to_string)
            .collect()
    }
}
