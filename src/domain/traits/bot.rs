use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::application::errors::{BusError, SendError};
use crate::domain::entities::{InboundMessage, OutboundMessage};

/// Inbound side of a bus subscription.
///
/// The sequence ends only when the transport goes away.
pub type InboundStream = mpsc::Receiver<InboundMessage>;

/// Bus client - abstraction for the messaging transport
#[async_trait]
pub trait BusClient: Send + Sync {
    /// Start receiving messages. A client can be subscribed only once.
    fn subscribe(&self) -> Result<InboundStream, BusError>;

    /// Send a message. Safe to call concurrently.
    async fn send(&self, message: &OutboundMessage) -> Result<(), SendError>;

    /// Short transport name for logs
    fn name(&self) -> &str;
}
