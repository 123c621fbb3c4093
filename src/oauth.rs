//! OAuth helpers for the posting services.
//!
//! Both Twitter/X (OAuth 2.0 User Context) and Mastodon accept a bearer
//! access token. Twitter tokens expire and can be renewed with a refresh
//! token and the app's client credentials.

use log::{debug, info};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

use crate::config::mask_token;
use crate::error::PublishError;

const TWITTER_TOKEN_URL: &str = "https://api.twitter.com/2/oauth2/token";

/// Body of a successful token refresh.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
}

/// Builds the Authorization header for bearer token authentication.
///
/// # Example
///
/// ```rust
/// use feedposter::build_bearer_auth_header;
///
/// let header = build_bearer_auth_header("your_access_token");
/// assert_eq!(header, "Bearer your_access_token");
/// ```
pub fn build_bearer_auth_header(access_token: &str) -> String {
    format!("Bearer {}", access_token)
}

/// Exchanges a refresh token for a new access token.
///
/// # Returns
///
/// - `Ok((access_token, Some(refresh_token)))`: Twitter rotated the refresh token too
/// - `Ok((access_token, None))`: Only the access token was renewed
/// - `Err(PublishError)`: Network failure or a rejected refresh
pub(crate) async fn refresh_access_token(
    client: &Client,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<(String, Option<String>), PublishError> {
    info!("Requesting new access token from {}", TWITTER_TOKEN_URL);

    let mut params = HashMap::new();
    params.insert("grant_type", "refresh_token");
    params.insert("refresh_token", refresh_token);

    let response = client
        .post(TWITTER_TOKEN_URL)
        .basic_auth(client_id, Some(client_secret))
        .form(&params)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await?;
        debug!("Token refresh error body: {}", error_text);
        return Err(PublishError::Auth(format!(
            "Token refresh failed ({})",
            status
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| PublishError::Auth(format!("Unexpected token response: {}", e)))?;

    debug!(
        "New access token (masked): {}",
        mask_token(&token.access_token)
    );
    if token.refresh_token.is_some() {
        info!("New refresh token also received");
    }

    Ok((token.access_token, token.refresh_token))
}
