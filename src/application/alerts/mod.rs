//! Proactive notifications - alert rules and their scheduler

pub mod crypto;
pub mod engine;
pub mod scheduler;

pub use crypto::CryptoAlert;
pub use engine::{AlertEngine, AlertRule};
pub use scheduler::{AlertScheduler, DEFAULT_ALERT_INTERVAL, DEFAULT_ALERT_SPACING};
