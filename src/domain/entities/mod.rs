//! Domain entities - Core business objects

pub mod alert;
pub mod command;
pub mod message;
pub mod phone;

pub use alert::{ChangeLimits, Quote, TickerWatch};
pub use command::{CommandContext, CommandHandler, CommandRegistry, CommandSpec, ParsedCommand};
pub use message::{InboundMessage, OutboundMessage, Reply};
pub use phone::PhoneNumber;
