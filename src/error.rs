//! Error types for feed handling and publishing.
//!
//! `FeedError` covers everything that can go wrong before a post exists
//! (bad frequency code, fetch failure, unparseable feed). `PublishError`
//! covers the posting services. Glue code boxes both.

use thiserror::Error;

/// Errors raised while selecting entries from a feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// An argument outside its allowed set, e.g. an unknown frequency code.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The fetched bytes could not be parsed into feed entries.
    #[error("Malformed feed: {0}")]
    MalformedFeed(String),

    #[error("Feed request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("Feed server returned status {0}")]
    Status(u16),
}

/// Errors raised by a posting service.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Required credentials or settings are missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{service} API error ({status})")]
    Api { service: &'static str, status: u16 },

    /// The access token was rejected and could not be refreshed.
    #[error("Authentication failed: {0}")]
    Auth(String),
}
