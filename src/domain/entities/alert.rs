/// Latest market data for one symbol
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    /// Display symbol, e.g. `BTC`
    pub symbol: String,
    pub price: f64,
    /// Percent change over the last 6 hours
    pub change_6h: f64,
    /// Percent change over the last 24 hours
    pub change_24h: f64,
}

impl Quote {
    pub fn new(symbol: impl Into<String>, price: f64, change_6h: f64, change_24h: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price,
            change_6h,
            change_24h,
        }
    }
}

/// A symbol watched by a price alert, with its ascending price thresholds
#[derive(Debug, Clone, PartialEq)]
pub struct TickerWatch {
    /// Feed identifier, e.g. `btc-bitcoin`
    pub id: String,
    pub thresholds: Vec<f64>,
}

impl TickerWatch {
    pub fn new(id: impl Into<String>, mut thresholds: Vec<f64>) -> Self {
        thresholds.sort_by(|a, b| a.total_cmp(b));
        Self {
            id: id.into(),
            thresholds,
        }
    }
}

/// Percent-change limits that trigger a movement notice
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeLimits {
    pub change_6h: f64,
    pub change_24h: f64,
}

impl Default for ChangeLimits {
    fn default() -> Self {
        Self {
            change_6h: 2.0,
            change_24h: 5.0,
        }
    }
}
