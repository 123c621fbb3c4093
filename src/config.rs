//! Configuration module for the feed poster.
//!
//! This module contains the credential structures for the posting services and
//! the environment variable handling that fills them. Credentials are loaded
//! once and handed to the publishers at construction time.

use log::{debug, error, info, warn};
use std::env;
use url::Url;

use crate::error::PublishError;

/// Masks a secret for logging, keeping at most the first and last 8 characters.
pub(crate) fn mask_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    let token_length = chars.len();

    let token_prefix: String = chars.iter().take(8).collect();
    if token_length > 16 {
        let token_suffix: String = chars[token_length - 8..].iter().collect();
        format!("{}...{}", token_prefix, token_suffix)
    } else {
        format!("{}...", token_prefix)
    }
}

/// Reads an optional, non-empty environment variable.
fn optional_var(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            info!("Found {} environment variable", name);
            debug!("{} (masked): {}", name, mask_token(&value));
            Some(value)
        }
        Ok(_) => {
            warn!("{} is set but empty, ignoring it", name);
            None
        }
        Err(_) => {
            info!("No {} found in environment variables", name);
            None
        }
    }
}

/// Reads a required, non-empty environment variable.
fn required_var(name: &str) -> Result<String, PublishError> {
    match env::var(name) {
        Ok(value) => {
            if value.trim().is_empty() {
                error!("{} is empty", name);
                return Err(PublishError::Config(format!("{} cannot be empty", name)));
            }
            info!(
                "Found {} environment variable with length: {}",
                name,
                value.len()
            );
            debug!("{} (masked): {}", name, mask_token(&value));
            if value.len() < 10 {
                warn!(
                    "{} seems unusually short ({} characters)",
                    name,
                    value.len()
                );
            }
            Ok(value)
        }
        Err(e) => {
            error!("Failed to load {} from environment: {}", name, e);
            Err(PublishError::Config(format!(
                "Missing {} environment variable: {}",
                name, e
            )))
        }
    }
}

/// Configuration struct for Twitter/X API credentials.
///
/// This struct holds the credentials required to post through the Twitter/X
/// API v2 with OAuth 2.0 User Context. The refresh token and client
/// credentials are optional; when all three are present an expired access
/// token is renewed automatically.
#[derive(Debug, Clone)]
pub struct TwitterConfig {
    /// The Access Token for OAuth 2.0 User Context authentication
    pub access_token: String,
    /// The Refresh Token for automatically refreshing expired access tokens
    pub refresh_token: Option<String>,
    /// The Client ID for OAuth 2.0 operations
    pub client_id: Option<String>,
    /// The Client Secret for OAuth 2.0 operations
    pub client_secret: Option<String>,
}

impl TwitterConfig {
    /// Creates a new `TwitterConfig` by loading credentials from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `xapi_access_token`: Twitter API Access Token (OAuth 2.0 User Context)
    ///
    /// # Optional Environment Variables (for automatic token refresh)
    ///
    /// - `xapi_refresh_token`: Refresh Token for renewing expired access tokens
    /// - `xapi_client_id`: Client ID for OAuth 2.0 operations
    /// - `xapi_client_secret`: Client Secret for OAuth 2.0 operations
    ///
    /// # Returns
    ///
    /// - `Ok(TwitterConfig)`: If the access token is present
    /// - `Err(PublishError::Config)`: If the access token is missing or empty
    pub fn from_env() -> Result<Self, PublishError> {
        info!("Loading Twitter configuration from environment variables");

        let access_token = required_var("xapi_access_token")?;
        let refresh_token = optional_var("xapi_refresh_token");
        let client_id = optional_var("xapi_client_id");
        let client_secret = optional_var("xapi_client_secret");

        if refresh_token.is_some() && (client_id.is_none() || client_secret.is_none()) {
            warn!("Refresh token is provided but client credentials are missing - automatic token refresh will be disabled");
        }

        let config = TwitterConfig {
            access_token,
            refresh_token,
            client_id,
            client_secret,
        };

        info!("Twitter configuration loaded successfully");
        if config.can_refresh_token() {
            info!("Automatic token refresh is enabled");
        } else {
            info!("Automatic token refresh is disabled - manual token refresh required");
        }

        Ok(config)
    }

    /// Attempts to refresh the access token using the stored refresh token and
    /// client credentials, updating this config in place.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: If the token was successfully refreshed
    /// - `Err(PublishError::Auth)`: If refresh failed or credentials are missing
    pub async fn refresh_access_token(
        &mut self,
        client: &reqwest::Client,
    ) -> Result<(), PublishError> {
        info!("Attempting to refresh access token");

        let (client_id, client_secret, refresh_token) = match (
            self.client_id.as_ref(),
            self.client_secret.as_ref(),
            self.refresh_token.as_ref(),
        ) {
            (Some(id), Some(secret), Some(token)) => (id, secret, token),
            _ => {
                error!("Cannot refresh token: missing required credentials");
                if self.client_id.is_none() {
                    error!("Missing xapi_client_id");
                }
                if self.client_secret.is_none() {
                    error!("Missing xapi_client_secret");
                }
                if self.refresh_token.is_none() {
                    error!("Missing xapi_refresh_token");
                }
                return Err(PublishError::Auth(
                    "Missing required credentials for token refresh".to_string(),
                ));
            }
        };

        let (new_access_token, new_refresh_token) =
            crate::oauth::refresh_access_token(client, client_id, client_secret, refresh_token)
                .await
                .map_err(|e| {
                    error!("Failed to refresh access token: {}", e);
                    e
                })?;

        self.apply_refreshed_tokens(new_access_token, new_refresh_token);
        Ok(())
    }

    /// Stores freshly issued tokens.
    ///
    /// Rotated refresh tokens are not persisted, so when Twitter issues a new
    /// one the masked token is returned (and logged) for the operator to copy
    /// into `xapi_refresh_token`; the old one no longer works.
    pub(crate) fn apply_refreshed_tokens(
        &mut self,
        new_access_token: String,
        new_refresh_token: Option<String>,
    ) -> Option<String> {
        let old_token_length = self.access_token.len();
        self.access_token = new_access_token;
        info!(
            "Access token updated: old length {}, new length {}",
            old_token_length,
            self.access_token.len()
        );
        debug!(
            "Updated access token (masked): {}",
            mask_token(&self.access_token)
        );

        let new_refresh = new_refresh_token?;
        info!("Updating refresh token with new token from Twitter");
        let masked = mask_token(&new_refresh);
        self.refresh_token = Some(new_refresh);
        warn!(
            "Refresh token rotated to {} - update xapi_refresh_token before the next run, the previous token is now invalid",
            masked
        );
        Some(masked)
    }

    /// Returns true if client_id, client_secret and refresh_token are all available.
    pub fn can_refresh_token(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some() && self.refresh_token.is_some()
    }
}

/// Configuration struct for a Mastodon account.
#[derive(Debug, Clone)]
pub struct MastodonConfig {
    /// Base URL of the instance, e.g. `https://mastodon.social`
    pub instance_url: Url,
    /// Access token with the `write:statuses` scope
    pub access_token: String,
}

impl MastodonConfig {
    /// Creates a new `MastodonConfig` from environment variables.
    ///
    /// # Required Environment Variables
    ///
    /// - `MASTODON_INSTANCE_URL`: Base URL of the Mastodon instance
    /// - `MASTODON_ACCESS_TOKEN`: Access token of the posting account
    pub fn from_env() -> Result<Self, PublishError> {
        info!("Loading Mastodon configuration from environment variables");

        let raw_url = required_var("MASTODON_INSTANCE_URL")?;
        let instance_url = Url::parse(raw_url.trim()).map_err(|e| {
            error!("MASTODON_INSTANCE_URL is not a valid URL: {}", e);
            PublishError::Config(format!("Invalid MASTODON_INSTANCE_URL '{}': {}", raw_url, e))
        })?;
        let access_token = required_var("MASTODON_ACCESS_TOKEN")?;

        info!("Mastodon configuration loaded for {}", instance_url);
        Ok(MastodonConfig {
            instance_url,
            access_token,
        })
    }

    /// Endpoint that creates a new status.
    ///
    /// The instance URL is treated as a directory, so an instance hosted under
    /// a path (`https://host/masto`) keeps that path.
    pub fn statuses_url(&self) -> Result<Url, PublishError> {
        let mut base = self.instance_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("api/v1/statuses")
            .map_err(|e| PublishError::Config(format!("Cannot build statuses URL: {}", e)))
    }
}
