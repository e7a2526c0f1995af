//! Application services - Command handlers and the outbound reply channel

pub mod command_service;
pub mod notifier;

pub use command_service::default_registry;
pub use notifier::Notifier;
