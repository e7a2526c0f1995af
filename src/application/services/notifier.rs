use std::fmt::Display;
use std::sync::Arc;

use crate::application::errors::SendError;
use crate::domain::entities::Reply;
use crate::domain::traits::BusClient;

/// The one outbound path of the assistant.
///
/// Both the dispatcher and the alert scheduler hold a clone; every message is
/// addressed to the owner here and nowhere else.
#[derive(Clone)]
pub struct Notifier {
    owner: String,
    bus: Arc<dyn BusClient>,
}

impl Notifier {
    pub fn new(owner: impl Into<String>, bus: Arc<dyn BusClient>) -> Self {
        Self {
            owner: owner.into(),
            bus,
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Send a reply to the owner
    pub async fn send(&self, reply: Reply) -> Result<(), SendError> {
        let message = reply.addressed_to(&self.owner);
        self.bus.send(&message).await?;
        tracing::debug!(
            "Message sent via {} ({} attachment(s))",
            self.bus.name(),
            message.attachments.len()
        );
        Ok(())
    }

    pub async fn send_text(&self, text: impl Into<String>) -> Result<(), SendError> {
        self.send(Reply::text(text)).await
    }

    /// Log an error and mirror it to the owner as `"<context> <error>"`.
    ///
    /// A failure to deliver the report is logged and dropped.
    pub async fn report(&self, context: &str, err: &(dyn Display + Sync)) {
        let text = format!("{} {}", context, err);
        tracing::error!("{}", text);

        if let Err(e) = self.send_text(text).await {
            tracing::error!("Failed to send message, {}", e);
        }
    }
}
