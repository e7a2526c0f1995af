//! Application layer errors

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while dispatching one inbound message
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("Message arrived from unknown number {0}")]
    UnauthorizedSender(String),

    #[error("Invalid command format. Must start with {prefix}. Message Text: {text}")]
    MalformedCommand { prefix: char, text: String },

    #[error("Invalid command {0}, type {1} to see a list of available commands.")]
    UnknownCommand(String, String),

    #[error("{command} expects at least {expected} argument(s), got {actual}")]
    Arity {
        command: String,
        expected: usize,
        actual: usize,
    },

    #[error("{0}")]
    Handler(#[from] HandlerError),

    #[error("{0}")]
    Send(#[from] SendError),
}

impl DispatchError {
    /// Errors raised before a command was routed
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            DispatchError::UnauthorizedSender(_) | DispatchError::MalformedCommand { .. }
        )
    }
}

/// Command handler errors
#[derive(Error, Debug)]
pub enum HandlerError {
    #[error("No attachments to store.")]
    NoAttachment,

    #[error("Only one attachment supported at the moment, got {0}.")]
    TooManyAttachments(usize),

    #[error("Invalid file name: {0:?}")]
    InvalidFileName(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
}

/// Outbound transport errors
#[derive(Error, Debug)]
pub enum SendError {
    #[error("Unable to send message, phone number format incorrect: {0}")]
    InvalidRecipient(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Price feed errors
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Feed returned HTTP {0}")]
    Status(u16),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Bus subscription errors
#[derive(Error, Debug)]
pub enum BusError {
    #[error("Bus is already subscribed")]
    AlreadySubscribed,

    #[error("Startup error: {0}")]
    Startup(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
