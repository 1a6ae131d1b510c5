use std::fmt;

use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    executor,
    request::{build_form_request, build_request, ApiRequest},
    types::{CandleSeries, MarketStatus, Quote, Watchlist, WatchlistDraft},
    CandleQuery, ClientOptions, MarketError, Result,
};

/// HTTP client for the Marketfeed REST API.
///
/// Holds the injected transport, the base URL, the bearer token, and the
/// immutable retry/timeout options. All per-call state lives inside the
/// call, so one client value can be shared across tasks freely.
#[derive(Clone)]
pub struct MarketClient {
    http: reqwest::Client,
    base_url: Url,
    token: String,
    options: ClientOptions,
    cancel: CancellationToken,
}

impl fmt::Debug for MarketClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarketClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

impl MarketClient {
    /// Creates a client against `base_url` with a bearer token.
    ///
    /// The base URL must parse and its path must end in `/`, for example
    /// `https://api.marketfeed.example/v1/`. The trailing slash is checked
    /// again on every call before any network activity.
    pub fn new(base_url: impl AsRef<str>, token: impl Into<String>) -> Result<Self> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|err| MarketError::Request(format!("invalid base URL: {err}")))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.into(),
            options: ClientOptions::default(),
            cancel: CancellationToken::new(),
        })
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `MARKETFEED_BASE_URL` — API base URL with a trailing slash
    /// - `MARKETFEED_TOKEN` — access token (Bearer prefix optional)
    ///
    /// Returns an error if either variable is missing or empty.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("MARKETFEED_BASE_URL").map_err(|_| {
            MarketError::Request("missing MARKETFEED_BASE_URL environment variable".to_owned())
        })?;
        let token = std::env::var("MARKETFEED_TOKEN").map_err(|_| {
            MarketError::Request("missing MARKETFEED_TOKEN environment variable".to_owned())
        })?;
        if base_url.trim().is_empty() {
            return Err(MarketError::Request(
                "MARKETFEED_BASE_URL is set but empty".to_owned(),
            ));
        }
        if token.trim().is_empty() {
            return Err(MarketError::Request(
                "MARKETFEED_TOKEN is set but empty".to_owned(),
            ));
        }
        Self::new(base_url, token)
    }

    /// Applies client options such as timeout and retry behavior.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.options = options;
        self
    }

    /// Attaches a cancellation token observed by every call made through
    /// this client, including during inter-retry waits.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Lists market sessions and their open/close state.
    pub async fn markets(&self) -> Result<Vec<MarketStatus>> {
        self.get_json("markets").await
    }

    /// Fetches the latest quote for one symbol.
    pub async fn quote(&self, symbol: &str) -> Result<Quote> {
        self.get_json(&format!("quotes/{symbol}")).await
    }

    /// Fetches OHLC candles for a symbol, filtered by `query`.
    pub async fn candles(&self, symbol: &str, query: &CandleQuery) -> Result<CandleSeries> {
        let mut request = self.authorized::<()>(Method::GET, &format!("candles/{symbol}"), None)?;
        query.apply(request.url_mut());
        executor::execute_json(&self.http, &self.options, &self.cancel, &request).await
    }

    /// Creates a watchlist.
    pub async fn create_watchlist(&self, draft: &WatchlistDraft) -> Result<Watchlist> {
        let request = self.authorized(Method::POST, "watchlists", Some(draft))?;
        executor::execute_json(&self.http, &self.options, &self.cancel, &request).await
    }

    /// Deletes a watchlist. The endpoint answers with an empty body.
    pub async fn delete_watchlist(&self, id: &str) -> Result<()> {
        let request = self.authorized::<()>(Method::DELETE, &format!("watchlists/{id}"), None)?;
        executor::execute_discard(&self.http, &self.options, &self.cancel, &request).await
    }

    /// Fetches a resource and returns the raw body bytes verbatim.
    ///
    /// Useful for endpoints that serve CSV or other non-JSON payloads.
    pub async fn get_raw(&self, path: &str) -> Result<Bytes> {
        let request = self.authorized::<()>(Method::GET, path, None)?;
        executor::execute_raw(&self.http, &self.options, &self.cancel, &request).await
    }

    /// Fetches any path and decodes the JSON response into `T`.
    ///
    /// Escape hatch for endpoints without a typed method yet.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let request = self.authorized::<()>(Method::GET, path, None)?;
        executor::execute_json(&self.http, &self.options, &self.cancel, &request).await
    }

    /// Sends a form-encoded POST and decodes the JSON response into `T`.
    pub async fn post_form<T: DeserializeOwned>(
        &self,
        path: &str,
        fields: &[(&str, &str)],
    ) -> Result<T> {
        let mut request = build_form_request(&self.base_url, path, fields)?;
        request.bearer_auth(&self.token)?;
        executor::execute_json(&self.http, &self.options, &self.cancel, &request).await
    }

    fn authorized<B: Serialize>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<ApiRequest> {
        let mut request = build_request(&self.base_url, method, path, body)?;
        request.bearer_auth(&self.token)?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use crate::MarketError;

    use super::MarketClient;

    #[test]
    fn debug_redacts_token() {
        let client =
            MarketClient::new("https://api.example.com/v1/", "secret-token").expect("must build");
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-token"));
    }

    #[test]
    fn unparsable_base_url_is_rejected_at_construction() {
        let err = MarketClient::new("not a url", "token").expect_err("must reject");
        assert!(matches!(err, MarketError::Request(_)));
    }
}
