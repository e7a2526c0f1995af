//! Domain layer - Core business objects and collaborator abstractions
//! 
//! This layer contains:
//! - Entities: Messages, commands, quotes
//! - Traits: Abstractions for the bus, the price feed and file storage

pub mod entities;
pub mod traits;
