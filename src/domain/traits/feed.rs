use async_trait::async_trait;

use crate::application::errors::FeedError;
use crate::domain::entities::Quote;

/// Price feed - source of market data for alert rules
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Latest quote for a symbol id. `Ok(None)` means the feed answered
    /// without a usable quote.
    async fn get_quote(&self, symbol_id: &str) -> Result<Option<Quote>, FeedError>;
}
