use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("producer closed")]
    Closed,

    #[error("message not confirmed within {0:?}")]
    ConfirmTimeout(Duration),
}
