//! Domain traits - Abstractions for infrastructure implementations

pub mod bot;
pub mod feed;
pub mod store;

pub use bot::{BusClient, InboundStream};
pub use feed::PriceFeed;
pub use store::{FileStore, StoredFile};
