use async_trait::async_trait;
use rabbitmq_client::producer::PublishError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeadLetterService: Send + Sync {
    ///
    /// Publishes message content unchanged to the dead letter queue
    /// and waits until broker confirms it.
    ///
    /// ### Errors
    /// - [PublishError::ConfirmTimeout]
    /// - [PublishError::Closed]
    ///
    async fn dead_letter(&self, content: Vec<u8>) -> Result<(), PublishError>;
}
