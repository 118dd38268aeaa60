use std::env;

use url::Url;

use crate::error::{Error, Result};
use crate::oauth::KeyPair;

pub const ENV_CLIENT_ID: &str = "MONEYBIRD_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "MONEYBIRD_CLIENT_SECRET";
pub const ENV_ADMINISTRATION_ID: &str = "MONEYBIRD_ADMINISTRATION_ID";
pub const ENV_ACCESS_TOKEN: &str = "MONEYBIRD_ACCESS_TOKEN";
pub const ENV_REFRESH_TOKEN: &str = "MONEYBIRD_REFRESH_TOKEN";
pub const ENV_REDIRECT_URI: &str = "MONEYBIRD_REDIRECT_URI";

/// Everything needed to talk to one MoneyBird administration.
#[derive(Debug, Clone)]
pub struct Config {
    pub key_pair: KeyPair,
    pub administration_id: String,
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// `None` means the out-of-band redirect.
    pub redirect_uri: Option<Url>,
}

impl Config {
    /// Reads the configuration from the `MONEYBIRD_*` environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any name → value lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&'static str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(Error::MissingConfiguration(name))
        };

        let administration_id = required(ENV_ADMINISTRATION_ID)?;
        if !administration_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::InvalidConfiguration {
                var: ENV_ADMINISTRATION_ID,
                reason: format!("expected a numeric id, got {administration_id:?}"),
            });
        }

        let redirect_uri = match lookup(ENV_REDIRECT_URI) {
            Some(uri) => Some(Url::parse(&uri).map_err(|e| Error::InvalidConfiguration {
                var: ENV_REDIRECT_URI,
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self {
            key_pair: KeyPair::new(required(ENV_CLIENT_ID)?, lookup(ENV_CLIENT_SECRET)),
            administration_id,
            access_token: required(ENV_ACCESS_TOKEN)?,
            refresh_token: lookup(ENV_REFRESH_TOKEN),
            redirect_uri,
        })
    }
}
