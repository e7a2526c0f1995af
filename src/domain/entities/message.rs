use std::path::PathBuf;

use chrono::{DateTime, Utc};

/// A message received from the bus
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub sender: String,
    pub text: String,
    pub attachments: Vec<PathBuf>,
}

impl InboundMessage {
    pub fn new(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            sender: sender.into(),
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachments.push(path.into());
        self
    }

    pub fn with_attachments(mut self, paths: Vec<PathBuf>) -> Self {
        self.attachments = paths;
        self
    }
}

/// A message addressed to the owner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub recipient: String,
    pub text: String,
    pub attachments: Vec<PathBuf>,
}

impl OutboundMessage {
    pub fn new(recipient: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, paths: Vec<PathBuf>) -> Self {
        self.attachments = paths;
        self
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// Body of a reply before it is addressed.
///
/// Handlers produce a `Reply`; only the notifier knows who the owner is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub attachments: Vec<PathBuf>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(mut self, paths: Vec<PathBuf>) -> Self {
        self.attachments = paths;
        self
    }

    pub fn addressed_to(self, recipient: impl Into<String>) -> OutboundMessage {
        OutboundMessage::new(recipient, self.text).with_attachments(self.attachments)
    }
}
