//! Console adapter for development/testing

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use crate::application::errors::{BusError, SendError};
use crate::domain::entities::{InboundMessage, OutboundMessage};
use crate::domain::traits::{BusClient, InboundStream};

/// Console bus for local development.
///
/// Every stdin line arrives as a message from `sender`. A line written as
/// `!store notes txt | /tmp/notes.txt` carries the paths after `|` as
/// attachments (comma separated).
pub struct ConsoleAdapter {
    sender: String,
    subscribed: AtomicBool,
}

impl ConsoleAdapter {
    pub fn new(sender: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            subscribed: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl BusClient for ConsoleAdapter {
    fn subscribe(&self) -> Result<InboundStream, BusError> {
        if self.subscribed.swap(true, Ordering::SeqCst) {
            return Err(BusError::AlreadySubscribed);
        }

        let (tx, rx) = mpsc::channel(10);
        let sender = self.sender.clone();

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        if tx.send(parse_line(&sender, &line)).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::info!("Console input closed");
                        break;
                    }
                    Err(e) => {
                        tracing::error!("Failed to read console input: {}", e);
                        break;
                    }
                }
            }
        });

        tracing::info!("Console bus ready, messages are sent as {}", self.sender);
        Ok(rx)
    }

    async fn send(&self, message: &OutboundMessage) -> Result<(), SendError> {
        println!("[ASSISTANT -> {}] {}", message.recipient, message.text);
        for attachment in &message.attachments {
            println!("  [Attachment] {}", attachment.display());
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}

fn parse_line(sender: &str, line: &str) -> InboundMessage {
    let (text, attachments) = match line.split_once('|') {
        Some((text, paths)) => (
            text.trim(),
            paths
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(PathBuf::from)
                .collect(),
        ),
        None => (line.trim(), Vec::new()),
    };

    InboundMessage::new(sender, text).with_attachments(attachments)
}
