//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Shared folder on disk
//! - Financial: Crypto price feed
//! - Adapters: Bus integrations (signal-cli, console)

pub mod adapters;
pub mod config;
pub mod financial;
pub mod storage;
