//! Financial Data Module
//!
//! Fetches crypto ticker quotes from the CoinPaprika REST API

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use crate::application::errors::FeedError;
use crate::domain::entities::Quote;
use crate::domain::traits::PriceFeed;

const USER_AGENT: &str = concat!("signal-assistant/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct Ticker {
    symbol: String,
    #[serde(default)]
    quotes: HashMap<String, TickerQuote>,
}

#[derive(Debug, Deserialize)]
struct TickerQuote {
    price: Option<f64>,
    percent_change_6h: Option<f64>,
    percent_change_24h: Option<f64>,
}

/// CoinPaprika ticker feed
pub struct CoinPaprikaFeed {
    client: Client,
    base_url: String,
}

impl CoinPaprikaFeed {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FeedError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn ticker_url(&self, symbol_id: &str) -> String {
        format!("{}/tickers/{}", self.base_url, symbol_id)
    }
}

#[async_trait]
impl PriceFeed for CoinPaprikaFeed {
    async fn get_quote(&self, symbol_id: &str) -> Result<Option<Quote>, FeedError> {
        let response = self
            .client
            .get(self.ticker_url(symbol_id))
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FeedError::Status(response.status().as_u16()));
        }

        let ticker: Ticker = response
            .json()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))?;

        Ok(usd_quote(ticker))
    }
}

/// The USD quote of a ticker, if it is complete
fn usd_quote(ticker: Ticker) -> Option<Quote> {
    let usd = ticker.quotes.get("USD")?;

    match (usd.price, usd.percent_change_6h, usd.percent_change_24h) {
        (Some(price), Some(change_6h), Some(change_24h)) => {
            Some(Quote::new(ticker.symbol, price, change_6h, change_24h))
        }
        _ => None,
    }
}
