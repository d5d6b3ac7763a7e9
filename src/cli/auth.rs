use anyhow::{Result, anyhow};
use std::io::{self, Write};

use crate::core::AppConfig;
use crate::google::oauth::{self, authorization_url, exchange_code_for_token};

/// Walk through the Google consent flow and print the refresh token.
/// Nothing is stored, export the token as
/// `SCHEDULER_GOOGLE_REFRESH_TOKEN`.
pub async fn run(redirect_uri: &str, config: &AppConfig) -> Result<()> {
    let credentials = &config.google_credentials;
    let client_id = credentials
        .client_id
        .as_deref()
        .ok_or(anyhow!("Set SCHEDULER_GOOGLE_CLIENT_ID in your environment"))?;
    let client_secret = credentials
        .client_secret
        .as_deref()
        .ok_or(anyhow!("Set SCHEDULER_GOOGLE_CLIENT_SECRET in your environment"))?;

    println!(
        "\nPlease open the following URL in your browser and authorize access:\n\n{}\n",
        authorization_url(client_id, redirect_uri)
    );
    print!("Paste the authorization code shown by Google here: ");
    io::stdout().flush()?;
    let mut code = String::new();
    io::stdin().read_line(&mut code)?;
    let code = code.trim();

    let token = exchange_code_for_token(
        &oauth::client()?,
        &config.google_oauth_base_url,
        client_id,
        client_secret,
        code,
        redirect_uri,
    )
    .await?;
    let refresh_token = token
        .refresh_token
        .ok_or(anyhow!("No refresh token in response"))?;

    println!("\nSCHEDULER_GOOGLE_REFRESH_TOKEN={}", refresh_token);

    Ok(())
}
