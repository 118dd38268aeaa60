//! Runs the whole code flow against a local redirect.
//!
//! Register `http://localhost:4000/redirect` as redirect URI of the MoneyBird application, then
//! run with `MONEYBIRD_CLIENT_ID`, `MONEYBIRD_CLIENT_SECRET` and `MONEYBIRD_ADMINISTRATION_ID`
//! set. The example prints the permission URL, waits for the redirect and lists contacts with
//! the freshly issued token.

#[macro_use]
extern crate tracing;

use std::{str::FromStr, sync::Arc, time::Duration};

use anyhow::Result;
use moneybird_rs::{
    Client, KeyPair, Registry, Scope, ScopeType, config::ENV_ADMINISTRATION_ID, oauth,
};
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;
use warp::Filter;

lazy_static::lazy_static! {
    static ref REDIRECT_ARGS: Arc<Mutex<Option<RedirectArgs>>> = Arc::new(Mutex::new(None));
}

#[derive(Clone, Deserialize)]
struct RedirectArgs {
    code: String,
    state: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    // Spawn a local web server to catch the redirect
    std::thread::spawn(|| {
        tokio::runtime::Runtime::new().unwrap().block_on(async {
            let redirect = warp::get()
                .and(warp::path("redirect"))
                .and(warp::query::<RedirectArgs>())
                .map(|args: RedirectArgs| {
                    tokio::spawn(async move {
                        *REDIRECT_ARGS.lock().await = Some(args);
                    });
                    warp::reply::html("success, you can close this window")
                });
            warp::serve(redirect).run(([127, 0, 0, 1], 4000)).await
        });
    });

    let key_pair = KeyPair::from_env()?;
    let administration_id = std::env::var(ENV_ADMINISTRATION_ID)?;
    let redirect_url = Url::from_str("http://localhost:4000/redirect")?;

    let (authorize_url, csrf_token) = oauth::authorize_url(
        key_pair.clone(),
        Some(redirect_url.clone()),
        Scope::from_type(ScopeType::SalesInvoices),
    )?;
    info!("Sign in to MoneyBird: {}", authorize_url);

    info!("Waiting for redirect URL to be hit...");
    let RedirectArgs { code, state } = loop {
        tokio::time::sleep(Duration::from_millis(10)).await;
        if let Some(args) = REDIRECT_ARGS.try_lock().ok().and_then(|c| c.clone()) {
            break args;
        }
    };
    assert_eq!(&state.expect("missing state"), csrf_token.secret());

    let tokens = oauth::exchange_request_token(key_pair, Some(redirect_url), code).await?;
    let client = Client::new(
        &administration_id,
        tokens.access_token.secret().clone(),
        tokens.refresh_token.map(|token| token.secret().clone()),
    )?;

    let registry = Registry::new(client);
    let contacts = registry.get("contacts")?;
    let found = contacts
        .contacts()
        .expect("contacts repository")
        .search("")
        .await?;
    info!("Found {} contacts", found.len());

    Ok(())
}
