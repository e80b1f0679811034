use anyhow::anyhow;
use std::time::Duration;

pub struct ApplicationEnv {
    pub log_directory: String,
    pub log_filename: String,

    pub db_connection_string: String,
    pub db_name: String,

    pub rabbitmq_connection_string: String,
    pub rabbitmq_retry_interval: Duration,
    pub rabbitmq_exchange_name: String,
    pub rabbitmq_purchased_queue_name: String,
    pub rabbitmq_confirmed_queue_name: String,
    pub publish_confirm_timeout: Duration,

    pub max_in_flight: u16,
    pub max_delivery_attempts: u32,
    pub attempts_lifespan: Duration,
    pub attempts_gc_interval: Duration,

    pub settlement_delay: Duration,
    pub settlement_timeout: Duration,
}

impl ApplicationEnv {
    pub fn parse() -> anyhow::Result<Self> {
        let log_directory = Self::env_var("TICKET_SERVICE_WORKER_LOG_DIRECTORY")?;
        let log_filename = Self::env_var("TICKET_SERVICE_WORKER_LOG_FILENAME")?;
        let db_connection_string = Self::env_var("TICKET_SERVICE_WORKER_DB_CONNECTION_STRING")?;
        let db_name = Self::env_var("TICKET_SERVICE_WORKER_DB_NAME")?;
        let rabbitmq_connection_string =
            Self::env_var("TICKET_SERVICE_WORKER_RABBITMQ_CONNECTION_STRING")?;
        let rabbitmq_retry_interval =
            Self::env_secs("TICKET_SERVICE_WORKER_RABBITMQ_RETRY_INTERVAL")?;
        let rabbitmq_exchange_name =
            Self::env_var("TICKET_SERVICE_WORKER_RABBITMQ_EXCHANGE_NAME")?;
        let rabbitmq_purchased_queue_name =
            Self::env_var("TICKET_SERVICE_WORKER_RABBITMQ_PURCHASED_QUEUE_NAME")?;
        let rabbitmq_confirmed_queue_name =
            Self::env_var("TICKET_SERVICE_WORKER_RABBITMQ_CONFIRMED_QUEUE_NAME")?;
        let publish_confirm_timeout =
            Self::env_millis("TICKET_SERVICE_WORKER_PUBLISH_CONFIRM_TIMEOUT")?;
        let max_in_flight = Self::env_var("TICKET_SERVICE_WORKER_MAX_IN_FLIGHT")?.parse()?;
        let max_delivery_attempts =
            Self::env_var("TICKET_SERVICE_WORKER_MAX_DELIVERY_ATTEMPTS")?.parse()?;
        if max_delivery_attempts == 0 {
            anyhow::bail!("TICKET_SERVICE_WORKER_MAX_DELIVERY_ATTEMPTS has to be greater than 0");
        }
        let attempts_lifespan = Self::env_secs("TICKET_SERVICE_WORKER_ATTEMPTS_LIFESPAN")?;
        let attempts_gc_interval = Self::env_secs("TICKET_SERVICE_WORKER_ATTEMPTS_GC_INTERVAL")?;
        let settlement_delay = Self::env_millis("TICKET_SERVICE_WORKER_SETTLEMENT_DELAY")?;
        let settlement_timeout = Self::env_millis("TICKET_SERVICE_WORKER_SETTLEMENT_TIMEOUT")?;

        Ok(Self {
            log_directory,
            log_filename,
            db_connection_string,
            db_name,
            rabbitmq_connection_string,
            rabbitmq_retry_interval,
            rabbitmq_exchange_name,
            rabbitmq_purchased_queue_name,
            rabbitmq_confirmed_queue_name,
            publish_confirm_timeout,
            max_in_flight,
            max_delivery_attempts,
            attempts_lifespan,
            attempts_gc_interval,
            settlement_delay,
            settlement_timeout,
        })
    }

    fn env_var(name: &'static str) -> anyhow::Result<String> {
        std::env::var(name).map_err(|_| anyhow!("environment variable {name} not set"))
    }

    fn env_u64(name: &'static str) -> anyhow::Result<u64> {
        Self::env_var(name)?
            .parse()
            .map_err(|err| anyhow!("environment variable {name} invalid: {err}"))
    }

    fn env_secs(name: &'static str) -> anyhow::Result<Duration> {
        Ok(Duration::from_secs(Self::env_u64(name)?))
    }

    fn env_millis(name: &'static str) -> anyhow::Result<Duration> {
        Ok(Duration::from_millis(Self::env_u64(name)?))
    }
}
