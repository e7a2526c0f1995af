//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Messaging: Command parsing and dispatching
//! - Services: Command handlers and the notifier
//! - Alerts: Alert rules and the alert scheduler
//! - Errors: Domain-specific errors

pub mod alerts;
pub mod errors;
pub mod messaging;
pub mod services;
