//! Price alert for crypto tickers
//!
//! A symbol produces a notice when its price is at or above one of its
//! thresholds (only the lowest one crossed is reported), when the 6 hour
//! change reaches the 6 hour limit in either direction, or when the 24 hour
//! change reaches the 24 hour limit in either direction.

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::errors::FeedError;
use crate::domain::entities::{ChangeLimits, Quote, TickerWatch};
use crate::domain::traits::PriceFeed;
use super::engine::AlertRule;

pub struct CryptoAlert {
    name: String,
    feed: Arc<dyn PriceFeed>,
    tickers: Vec<TickerWatch>,
    limits: ChangeLimits,
}

impl CryptoAlert {
    pub fn new(feed: Arc<dyn PriceFeed>, tickers: Vec<TickerWatch>, limits: ChangeLimits) -> Self {
        Self {
            name: "Crypto".to_string(),
            feed,
            tickers,
            limits,
        }
    }
}

#[async_trait]
impl AlertRule for CryptoAlert {
    fn name(&self) -> &str {
        &self.name
    }

    async fn evaluate(&self) -> Result<Option<String>, FeedError> {
        let mut lines = Vec::new();
        let mut last_error = None;
        let mut answered = 0usize;

        for ticker in &self.tickers {
            match self.feed.get_quote(&ticker.id).await {
                Ok(Some(quote)) => {
                    answered += 1;
                    lines.extend(evaluate_quote(&quote, &ticker.thresholds, self.limits));
                }
                Ok(None) => {
                    answered += 1;
                    tracing::debug!("No USD quote for {}, skipping", ticker.id);
                }
                Err(e) => {
                    tracing::warn!("Price feed failed for {}: {}", ticker.id, e);
                    last_error = Some(e);
                }
            }
        }

        if answered == 0 {
            if let Some(e) = last_error {
                return Err(e);
            }
        }

        if lines.is_empty() {
            Ok(None)
        } else {
            Ok(Some(lines.join("\n")))
        }
    }
}

/// Notice lines for one quote. `thresholds` must be sorted ascending.
pub fn evaluate_quote(quote: &Quote, thresholds: &[f64], limits: ChangeLimits) -> Vec<String> {
    let mut lines = Vec::new();
    let symbol = &quote.symbol;
    let price = quote.price;

    if let Some(threshold) = thresholds.iter().find(|&&t| price >= t) {
        lines.push(format!(
            "{} has crossed {}, it is now {:.2} USD",
            symbol, threshold, price
        ));
    }

    if let Some(line) = movement(symbol, quote.change_6h, limits.change_6h, "6 hours", price) {
        lines.push(line);
    }
    if let Some(line) = movement(symbol, quote.change_24h, limits.change_24h, "24 hours", price) {
        lines.push(line);
    }

    lines
}

fn movement(symbol: &str, change: f64, limit: f64, window: &str, price: f64) -> Option<String> {
    let direction = if change >= limit {
        "up"
    } else if change <= -limit {
        "down"
    } else {
        return None;
    };

    Some(format!(
        "{} has gone {} by {:.2}% in the last {}, it is now {:.2} USD",
        symbol,
        direction,
        change.abs(),
        window,
        price
    ))
}
