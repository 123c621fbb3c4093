//! Mastodon publisher.

use async_trait::async_trait;
use log::{debug, error, info};
use reqwest::Client;

use crate::config::MastodonConfig;
use crate::error::PublishError;
use crate::oauth::build_bearer_auth_header;

use super::{sanitize_for_logging, Publisher};

/// Publishes posts as public statuses on one Mastodon account.
pub struct MastodonPublisher {
    client: Client,
    config: MastodonConfig,
}

impl MastodonPublisher {
    pub fn new(client: Client, config: MastodonConfig) -> Self {
        MastodonPublisher { client, config }
    }
}

#[async_trait]
impl Publisher for MastodonPublisher {
    fn name(&self) -> &str {
        "mastodon"
    }

    async fn publish(&self, text: &str) -> Result<String, PublishError> {
        let url = self.config.statuses_url()?;
        info!("Posting status to {}", url);
        debug!("Request headers: Authorization: Bearer [REDACTED]");

        let response = self
            .client
            .post(url)
            .header(
                "Authorization",
                build_bearer_auth_header(&self.config.access_token),
            )
            .form(&[("status", text)])
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;
        info!("Received response with status: {} from Mastodon", status);

        if status.is_success() {
            debug!("Mastodon response: {} bytes received", response_text.len());
            return Ok(response_text);
        }

        error!("Mastodon status post failed - Status: {}", status);
        debug!(
            "Error response from Mastodon: {}",
            sanitize_for_logging(&response_text, 200)
        );
        Err(PublishError::Api {
            service: "Mastodon",
            status: status.as_u16(),
        })
    }
}
