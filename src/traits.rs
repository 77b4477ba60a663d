use async_trait::async_trait;

use crate::dispatcher::{DispatchError, DispatchOutcome};
use crate::template::TemplateMessage;

#[cfg(test)]
use mockall::automock;

/// Trait for delivering template messages to the messaging provider
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MessageDispatcher: Send + Sync {
    /// Send an already built message from the given sender phone number id.
    ///
    /// Issues exactly one request. Provider rejections come back as
    /// `DispatchOutcome::Rejected`, only transport failures are errors.
    async fn dispatch(
        &self,
        sender_phone_id: &str,
        message: &TemplateMessage,
    ) -> Result<DispatchOutcome, DispatchError>;
}
