//! OAuth bootstrapping for MoneyBird.
//!
//! MoneyBird access tokens do not expire, so an application normally goes through the code flow
//! once per administration:
//!
//! 1. Build a permission URL with [`authorize_url`] and hand it to someone with access to the
//!    administration.
//! 2. After granting access they are shown (or redirected with) a request token.
//! 3. Exchange that token with [`exchange_request_token`] and store the resulting access and
//!    refresh tokens in your configuration.

use oauth2::{
    AuthUrl, AuthorizationCode, CsrfToken, EndpointNotSet, EndpointSet, RedirectUrl,
    TokenResponse, TokenUrl, basic::BasicClient,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::scope::Scope;

pub const AUTH_URL: &str = "https://moneybird.com/oauth/authorize";
pub const TOKEN_URL: &str = "https://moneybird.com/oauth/token";

/// Redirect URI that makes MoneyBird display the request token in the browser.
pub const OUT_OF_BAND_REDIRECT: &str = "urn:ietf:wg:oauth:2.0:oob";

pub type OAuthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Stores the OAuth 2 client ID and client secret.
#[derive(Debug, Clone)]
pub struct KeyPair(
    pub(crate) oauth2::ClientId,
    pub(crate) Option<oauth2::ClientSecret>,
);

impl KeyPair {
    /// Creates a new `KeyPair` from the provided `client_id` and `client_secret` strings.
    #[must_use]
    pub fn new(client_id: String, client_secret: Option<String>) -> Self {
        Self(
            oauth2::ClientId::new(client_id),
            client_secret.map(oauth2::ClientSecret::new),
        )
    }

    /// Creates a new `KeyPair` from `MONEYBIRD_CLIENT_ID` and `MONEYBIRD_CLIENT_SECRET`.
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var(crate::config::ENV_CLIENT_ID)
            .map_err(|_| Error::MissingConfiguration(crate::config::ENV_CLIENT_ID))?;
        Ok(Self::new(
            client_id,
            std::env::var(crate::config::ENV_CLIENT_SECRET).ok(),
        ))
    }

    #[must_use]
    pub fn client_id(&self) -> &str {
        self.0.as_str()
    }
}

/// Access and refresh token issued by MoneyBird.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSet {
    pub access_token: oauth2::AccessToken,
    pub refresh_token: Option<oauth2::RefreshToken>,
}

pub(crate) fn build_oauth_client(key_pair: KeyPair) -> Result<OAuthClient> {
    let client = BasicClient::new(key_pair.0)
        .set_auth_uri(AuthUrl::new(AUTH_URL.to_string()).map_err(|_| Error::InvalidEndpoint)?)
        .set_token_uri(TokenUrl::new(TOKEN_URL.to_string()).map_err(|_| Error::InvalidEndpoint)?);

    Ok(match key_pair.1 {
        Some(secret) => client.set_client_secret(secret),
        None => client,
    })
}

pub(crate) fn http_client() -> Result<reqwest::Client> {
    // Token endpoints must not follow redirects, see the oauth2 crate docs on SSRF.
    Ok(reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()?)
}

fn redirect_url(redirect: Option<Url>) -> Result<RedirectUrl> {
    match redirect {
        Some(url) => Ok(RedirectUrl::from_url(url)),
        None => RedirectUrl::new(OUT_OF_BAND_REDIRECT.to_string())
            .map_err(|_| Error::InvalidEndpoint),
    }
}

/// Generates the permission URL for the code flow.
///
/// Passing `None` as redirect uses the out-of-band redirect, which shows the request token in the
/// browser instead of redirecting.
#[instrument(skip(scopes))]
pub fn authorize_url(
    key_pair: KeyPair,
    redirect: Option<Url>,
    scopes: impl Into<Scope>,
) -> Result<(Url, CsrfToken)> {
    let scopes = scopes.into();
    let client = build_oauth_client(key_pair)?.set_redirect_uri(redirect_url(redirect)?);
    Ok(client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(scopes.into_oauth2_scopes())
        .url())
}

/// Exchanges a request token from the permission screen for an access and refresh token.
#[instrument(skip(code))]
pub async fn exchange_request_token(
    key_pair: KeyPair,
    redirect: Option<Url>,
    code: String,
) -> Result<TokenSet> {
    let client = build_oauth_client(key_pair)?.set_redirect_uri(redirect_url(redirect)?);
    let http_client = http_client()?;

    let token = client
        .exchange_code(AuthorizationCode::new(code))
        .request_async(&http_client)
        .await?;
    debug!("exchanged request token for access token");

    Ok(TokenSet {
        access_token: token.access_token().clone(),
        refresh_token: token.refresh_token().cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeType;

    #[test]
    fn authorize_url_defaults_to_out_of_band_redirect() {
        let key_pair = KeyPair::new("my-client".to_string(), None);
        let (url, csrf) = authorize_url(key_pair, None, ScopeType::SalesInvoices).unwrap();

        assert_eq!(url.host_str(), Some("moneybird.com"));
        assert_eq!(url.path(), "/oauth/authorize");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("client_id".to_string(), "my-client".to_string())));
        assert!(pairs.contains(&("response_type".to_string(), "code".to_string())));
        assert!(pairs.contains(&("redirect_uri".to_string(), OUT_OF_BAND_REDIRECT.to_string())));
        assert!(pairs.contains(&("scope".to_string(), "sales_invoices".to_string())));
        assert!(pairs.contains(&("state".to_string(), csrf.secret().clone())));
    }

    #[test]
    fn authorize_url_joins_multiple_scopes() {
        let key_pair = KeyPair::new("my-client".to_string(), Some("secret".to_string()));
        let redirect = Url::parse("http://localhost:4000/redirect").unwrap();
        let (url, _) = authorize_url(key_pair, Some(redirect), Scope::invoicing()).unwrap();

        let scope = url
            .query_pairs()
            .find(|(k, _)| k == "scope")
            .map(|(_, v)| v.into_owned());
        assert_eq!(scope.as_deref(), Some("sales_invoices settings"));
    }
}
