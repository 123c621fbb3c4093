//! Posting services.
//!
//! Every service implements [`Publisher`]. The runner hands each composed
//! post to all enabled publishers in turn; with none enabled it falls back to
//! [`StdoutPublisher`] so a run can be previewed without credentials.

use async_trait::async_trait;
use log::info;

use crate::error::PublishError;

mod mastodon;
mod twitter;

pub use mastodon::MastodonPublisher;
pub use twitter::TwitterPublisher;

pub(crate) use twitter::sanitize_for_logging;

/// A service that can publish a post.
///
/// Posts handed to a publisher are already within the service's length
/// limit, so a failure is never caused by text length.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Human-readable service name used in logs.
    fn name(&self) -> &str;

    /// Publishes `text` and returns the service's response body.
    async fn publish(&self, text: &str) -> Result<String, PublishError>;
}

/// Dry-run publisher that prints posts to stdout.
#[derive(Debug, Default)]
pub struct StdoutPublisher;

#[async_trait]
impl Publisher for StdoutPublisher {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn publish(&self, text: &str) -> Result<String, PublishError> {
        info!("Dry run, printing post instead of publishing");
        println!("{}\n", text);
        Ok(text.to_string())
    }
}
