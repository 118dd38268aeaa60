//! Exchanges a request token for an access and refresh token.
//!
//! ```sh
//! MONEYBIRD_CLIENT_ID=... MONEYBIRD_CLIENT_SECRET=... \
//!     cargo run --example generate_access_token -- <request token>
//! ```

#[macro_use]
extern crate tracing;

use anyhow::{Context, Result};
use moneybird_rs::{KeyPair, config::ENV_REDIRECT_URI, oauth};
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let code = std::env::args()
        .nth(1)
        .context("usage: generate_access_token <request token>")?;
    let redirect = std::env::var(ENV_REDIRECT_URI)
        .ok()
        .map(|uri| Url::parse(&uri))
        .transpose()?;

    let tokens = oauth::exchange_request_token(KeyPair::from_env()?, redirect, code).await?;
    info!("received tokens");

    println!("Access token: {}", tokens.access_token.secret());
    match &tokens.refresh_token {
        Some(refresh_token) => println!("Refresh token: {}", refresh_token.secret()),
        None => warn!("no refresh token issued"),
    }

    Ok(())
}
