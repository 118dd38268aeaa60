//! Prints the permission URL an administrator opens to grant this application access.
//!
//! ```sh
//! MONEYBIRD_CLIENT_ID=... cargo run --example request_token_url -- sales_invoices settings
//! ```
//!
//! Without a `MONEYBIRD_REDIRECT_URI` MoneyBird shows the request token in the browser; pass it
//! to the `generate_access_token` example.

#[macro_use]
extern crate tracing;

use anyhow::Result;
use moneybird_rs::{KeyPair, Scope, ScopeType, config::ENV_REDIRECT_URI, oauth};
use url::Url;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let scopes: Scope = std::env::args()
        .skip(1)
        .map(|arg| arg.parse::<ScopeType>())
        .collect::<Result<_, _>>()?;
    let scopes = if scopes.is_empty() {
        Scope::invoicing()
    } else {
        scopes
    };
    let redirect = std::env::var(ENV_REDIRECT_URI)
        .ok()
        .map(|uri| Url::parse(&uri))
        .transpose()?;

    let (url, csrf_token) = oauth::authorize_url(KeyPair::from_env()?, redirect, scopes)?;
    info!("requesting scopes with state {}", csrf_token.secret());
    println!("{url}");

    Ok(())
}
