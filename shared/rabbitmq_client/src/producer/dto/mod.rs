mod message;
mod publish_confirmation;
mod publisher_confirm;

pub use message::Message;
pub use publish_confirmation::PublishConfirmation;
pub use publisher_confirm::{PublisherConfirm, PublisherConfirmVariant};
