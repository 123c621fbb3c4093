//! Twitter/X publisher.
//!
//! Posts through the API v2 `tweets` endpoint with OAuth 2.0 User Context
//! authentication, refreshing the access token once on a 401 when refresh
//! credentials are configured.

use async_trait::async_trait;
use log::{debug, error, info, warn};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde_json::json;
use tokio::sync::Mutex;

use crate::config::TwitterConfig;
use crate::error::PublishError;
use crate::oauth::build_bearer_auth_header;

use super::Publisher;

const TWEETS_URL: &str = "https://api.x.com/2/tweets";

/// Sanitizes text for safe logging by truncating and escaping control characters.
///
/// Newlines and tabs become spaces and other control characters become `?`,
/// so a response body cannot inject fake log lines.
pub(crate) fn sanitize_for_logging(text: &str, max_len: usize) -> String {
    let sanitized: String = text
        .chars()
        .map(|c| match c {
            '\n' | '\r' | '\t' => ' ',
            c if c.is_control() => '?',
            c => c,
        })
        .collect();

    if sanitized.chars().count() > max_len {
        let truncated: String = sanitized.chars().take(max_len).collect();
        format!(
            "{}... [truncated, {} total bytes]",
            truncated,
            text.len()
        )
    } else {
        sanitized
    }
}

/// Publishes posts as tweets.
pub struct TwitterPublisher {
    client: Client,
    config: Mutex<TwitterConfig>,
}

impl TwitterPublisher {
    pub fn new(client: Client, config: TwitterConfig) -> Self {
        TwitterPublisher {
            client,
            config: Mutex::new(config),
        }
    }

    fn build_request(&self, access_token: &str, text: &str) -> RequestBuilder {
        self.client
            .post(TWEETS_URL)
            .header("Authorization", build_bearer_auth_header(access_token))
            .json(&json!({ "text": text }))
    }
}

async fn read_response(
    response: reqwest::Response,
    operation_name: &str,
) -> Result<String, PublishError> {
    let status = response.status();
    let response_text = response.text().await?;

    if status.is_success() {
        info!("Operation '{}' completed successfully", operation_name);
        debug!(
            "Response summary for '{}': {} bytes received",
            operation_name,
            response_text.len()
        );
        return Ok(response_text);
    }

    error!("Operation '{}' failed - Status: {}", operation_name, status);
    debug!(
        "Error response for '{}': {}",
        operation_name,
        sanitize_for_logging(&response_text, 200)
    );
    Err(PublishError::Api {
        service: "Twitter",
        status: status.as_u16(),
    })
}

#[async_trait]
impl Publisher for TwitterPublisher {
    fn name(&self) -> &str {
        "twitter"
    }

    /// Posts a tweet, retrying once with a refreshed token after a 401.
    async fn publish(&self, text: &str) -> Result<String, PublishError> {
        let operation_name = "post_tweet";
        info!(
            "Starting tweet post operation for text: '{}'",
            sanitize_for_logging(text, 80)
        );
        debug!("Request URL: {}", TWEETS_URL);
        debug!("Request headers: Authorization: Bearer [REDACTED], Content-Type: application/json");

        let mut config = self.config.lock().await;

        let response = self
            .build_request(&config.access_token, text)
            .send()
            .await?;
        info!(
            "Received response with status: {} for operation: {}",
            response.status(),
            operation_name
        );

        if response.status() != StatusCode::UNAUTHORIZED {
            return read_response(response, operation_name).await;
        }

        warn!(
            "Received 401 Unauthorized for operation '{}' - access token may be expired",
            operation_name
        );

        if !config.can_refresh_token() {
            error!(
                "Cannot refresh token for operation '{}' - missing refresh credentials",
                operation_name
            );
            return Err(PublishError::Auth(format!(
                "Twitter rejected the access token for '{}' and token refresh is not available",
                operation_name
            )));
        }

        config.refresh_access_token(&self.client).await?;
        info!(
            "Token refreshed successfully, retrying operation '{}'",
            operation_name
        );

        let retry_response = self
            .build_request(&config.access_token, text)
            .send()
            .await?;
        if retry_response.status() == StatusCode::UNAUTHORIZED {
            return Err(PublishError::Auth(format!(
                "Twitter rejected the refreshed access token for '{}'",
                operation_name
            )));
        }
        read_response(retry_response, operation_name).await
    }
}
