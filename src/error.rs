use crate::ApiError;

/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum MarketError {
    /// The request could not be constructed: bad base URL, invalid path,
    /// or an unserializable body. No network activity has happened.
    #[error("request error: {0}")]
    Request(String),
    /// Network or request execution error from `reqwest`.
    ///
    /// Secret-bearing query values in any URL carried by the error have
    /// already been redacted.
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// The call was cancelled through its `CancellationToken`.
    #[error("request cancelled")]
    Cancelled,
    /// Structured API error for a 4xx response.
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Response decoding or shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
}
