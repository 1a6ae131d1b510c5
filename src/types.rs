use serde::{Deserialize, Serialize};

/// Open/close state of one market session.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MarketStatus {
    pub market: String,
    pub is_open: bool,
    #[serde(default)]
    pub next_open: Option<String>,
    #[serde(default)]
    pub next_close: Option<String>,
}

/// Latest quote for a symbol.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Quote {
    pub symbol: String,
    #[serde(default)]
    pub bid: Option<f64>,
    #[serde(default)]
    pub ask: Option<f64>,
    #[serde(default)]
    pub last: Option<f64>,
    #[serde(default)]
    pub volume: Option<u64>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One OHLC bar.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Candle {
    pub start: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: Option<u64>,
}

/// Candle response for one symbol.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CandleSeries {
    pub symbol: String,
    #[serde(default)]
    pub candles: Vec<Candle>,
}

/// Server-side watchlist.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Watchlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// Payload for creating a watchlist.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct WatchlistDraft {
    pub name: String,
    pub symbols: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::Quote;

    #[test]
    fn quote_tolerates_missing_optional_fields() {
        let quote: Quote =
            serde_json::from_str(r#"{"symbol":"AAPL","last":189.5}"#).expect("must decode");
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.last, Some(189.5));
        assert_eq!(quote.bid, None);
        assert_eq!(quote.volume, None);
    }
}
