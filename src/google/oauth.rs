//! Google OAuth token exchange

use std::time::Duration;

use anyhow::{Result, bail};
use reqwest::Client;
use serde::Deserialize;

pub const DEFAULT_OAUTH_BASE_URL: &str = "https://oauth2.googleapis.com";
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.events https://www.googleapis.com/auth/calendar.freebusy";

pub const TOKEN_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    pub expires_in: Option<i64>,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub token_type: Option<String>,
}

/// HTTP client for the token endpoint.
pub fn client() -> Result<Client> {
    Ok(Client::builder().timeout(TOKEN_TIMEOUT).build()?)
}

async fn request_token(
    client: &Client,
    oauth_base_url: &str,
    params: &[(&str, &str)],
) -> Result<OAuthToken> {
    let url = format!("{}/token", oauth_base_url.trim_end_matches('/'));
    let resp = client.post(url).form(params).send().await?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        bail!("Token request failed with {}: {}", status, body);
    }

    Ok(resp.json::<OAuthToken>().await?)
}

/// Trade a long lived refresh token for a short lived access token.
pub async fn refresh_access_token(
    client: &Client,
    oauth_base_url: &str,
    client_id: &str,
    client_secret: &str,
    refresh_token: &str,
) -> Result<OAuthToken> {
    request_token(
        client,
        oauth_base_url,
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ],
    )
    .await
}

pub async fn exchange_code_for_token(
    client: &Client,
    oauth_base_url: &str,
    client_id: &str,
    client_secret: &str,
    code: &str,
    redirect_uri: &str,
) -> Result<OAuthToken> {
    request_token(
        client,
        oauth_base_url,
        &[
            ("client_id", client_id),
            ("client_secret", client_secret),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ],
    )
    .await
}

/// Consent screen URL that yields an authorization code with offline
/// access so a refresh token is issued.
pub fn authorization_url(client_id: &str, redirect_uri: &str) -> String {
    format!(
        "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent",
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(CALENDAR_SCOPE)
    )
}
