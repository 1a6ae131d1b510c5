//! `marketfeed-http` is an async typed client for the Marketfeed
//! financial-data REST API.
//!
//! Every call flows through one resilient execution path:
//! - request bodies are captured once and replayed byte-identically on retry,
//! - 429 responses are retried with exponential backoff and jitter,
//! - transport errors have secret-bearing query values redacted,
//! - calls can be cancelled through a [`tokio_util::sync::CancellationToken`],
//!   including while waiting between retries.
//!
//! ```no_run
//! use marketfeed_http::MarketClient;
//!
//! # async fn example() -> marketfeed_http::Result<()> {
//! let client = MarketClient::new("https://api.marketfeed.example/v1/", "my-token")?;
//! let quote = client.quote("AAPL").await?;
//! println!("{} last traded at {:?}", quote.symbol, quote.last);
//! # Ok(())
//! # }
//! ```

mod backoff;
mod classify;
mod client;
mod error;
mod executor;
mod options;
mod params;
mod request;
mod types;

pub use backoff::BackoffPolicy;
pub use classify::ApiError;
pub use client::MarketClient;
pub use error::MarketError;
pub use options::{ClientOptions, RetryConfig};
pub use params::{CandleQuery, Interval};
pub use request::{build_form_request, build_request, ApiRequest};
pub use types::{Candle, CandleSeries, MarketStatus, Quote, Watchlist, WatchlistDraft};

pub type Result<T> = std::result::Result<T, MarketError>;
