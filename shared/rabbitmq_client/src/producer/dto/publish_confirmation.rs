use crate::producer::PublishError;
use std::time::Duration;
use tokio::sync::oneshot;

///
/// Handle that resolves when broker confirms a message sent with
/// [crate::RabbitmqProducer::send].
///
/// Dropping it doesn't cancel the publish.
/// Message stays buffered in the producer and is resent until it gets confirmed.
///
pub struct PublishConfirmation {
    confirm_rx: oneshot::Receiver<()>,
}

impl PublishConfirmation {
    pub(crate) fn new(confirm_rx: oneshot::Receiver<()>) -> Self {
        Self { confirm_rx }
    }

    ///
    /// Waits for broker confirmation.
    ///
    /// ### Errors
    /// - [PublishError::ConfirmTimeout] when confirmation didn't arrive in time
    /// - [PublishError::Closed] when producer was closed before confirmation arrived
    ///
    pub async fn wait(self, timeout: Duration) -> Result<(), PublishError> {
        match tokio::time::timeout(timeout, self.confirm_rx).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(PublishError::Closed),
            Err(_) => Err(PublishError::ConfirmTimeout(timeout)),
        }
    }
}
