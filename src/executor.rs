//! The retry loop every API call flows through.
//!
//! One invocation runs up to `max_retries + 1` attempts. Each attempt
//! materializes a fresh request from the captured body bytes, sends it,
//! classifies the response, and either hands the body to the decode
//! destination, returns a terminal error, or waits out a backoff interval
//! before the next attempt. The backoff wait races the cancellation token,
//! so a cancelled caller never sits out a timer.

use bytes::Bytes;
use serde::de::DeserializeOwned;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::{
    backoff::BackoffPolicy, classify::classify, request::ApiRequest, ClientOptions, MarketError,
    Result,
};

/// Query parameters whose values never appear in transport errors.
const REDACTED_QUERY_PARAMS: [&str; 3] = ["client_secret", "refresh_token", "access_token"];

/// Runs a request to completion and discards the response body.
pub(crate) async fn execute_discard(
    http: &reqwest::Client,
    options: &ClientOptions,
    cancel: &CancellationToken,
    request: &ApiRequest,
) -> Result<()> {
    run(http, options, cancel, request).await.map(|_| ())
}

/// Runs a request and returns the raw response body bytes verbatim.
pub(crate) async fn execute_raw(
    http: &reqwest::Client,
    options: &ClientOptions,
    cancel: &CancellationToken,
    request: &ApiRequest,
) -> Result<Bytes> {
    run(http, options, cancel, request).await
}

/// Runs a request and decodes the response body as JSON.
///
/// An empty success body decodes as JSON `null`, so `()` and `Option<T>`
/// destinations accept the empty 200/204 responses some endpoints return.
pub(crate) async fn execute_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    options: &ClientOptions,
    cancel: &CancellationToken,
    request: &ApiRequest,
) -> Result<T> {
    let body = run(http, options, cancel, request).await?;
    decode_json(&body)
}

pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let body = if body.is_empty() {
        b"null".as_slice()
    } else {
        body
    };
    serde_json::from_slice(body).map_err(|err| {
        MarketError::Decode(format!(
            "invalid response JSON: {err}; body: {}",
            String::from_utf8_lossy(body)
        ))
    })
}

async fn run(
    http: &reqwest::Client,
    options: &ClientOptions,
    cancel: &CancellationToken,
    request: &ApiRequest,
) -> Result<Bytes> {
    let backoff = BackoffPolicy::new(options.retry.base_delay);
    let mut attempt = 0u32;

    loop {
        // Each iteration builds its own request over the captured body
        // bytes; a failed attempt cannot consume the next one's stream.
        let send = request.to_reqwest(http, options.timeout).send();
        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MarketError::Cancelled),
            outcome = send => outcome,
        };

        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                // Cancellation wins over whatever shape the aborted send
                // surfaced as.
                if cancel.is_cancelled() {
                    return Err(MarketError::Cancelled);
                }
                return Err(MarketError::Transport(redact_error_url(err)));
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                if cancel.is_cancelled() {
                    return Err(MarketError::Cancelled);
                }
                return Err(MarketError::Transport(redact_error_url(err)));
            }
        };

        let Some(api_error) = classify(status, &body) else {
            return Ok(body);
        };

        let retryable = api_error.status == 429
            && options.retry.enabled
            && attempt < options.retry.max_retries;
        if !retryable {
            return Err(MarketError::Api(api_error));
        }

        let delay = backoff.delay(attempt);
        #[cfg(feature = "tracing")]
        tracing::debug!(
            attempt,
            delay_ms = delay.as_millis() as u64,
            "rate limited, retrying"
        );
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(MarketError::Cancelled),
            _ = sleep(delay) => {}
        }
        attempt += 1;
    }
}

fn redact_error_url(mut err: reqwest::Error) -> reqwest::Error {
    if let Some(url) = err.url_mut() {
        redact_sensitive_query(url);
    }
    err
}

/// Replaces secret-bearing query values with `REDACTED` in place. URLs
/// without sensitive parameters are left untouched.
fn redact_sensitive_query(url: &mut Url) {
    let has_secret = url
        .query_pairs()
        .any(|(name, _)| REDACTED_QUERY_PARAMS.contains(&name.as_ref()));
    if !has_secret {
        return;
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    let mut query = url.query_pairs_mut();
    query.clear();
    for (name, value) in pairs {
        if REDACTED_QUERY_PARAMS.contains(&name.as_str()) {
            query.append_pair(&name, "REDACTED");
        } else {
            query.append_pair(&name, &value);
        }
    }
}
