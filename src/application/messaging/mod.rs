//! Message handling - Inbound command processing

pub mod dispatcher;
pub mod parser;

pub use dispatcher::CommandDispatcher;
pub use parser::{MessageParser, DEFAULT_PREFIX};
