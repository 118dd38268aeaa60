use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use oauth2::{AccessToken, RefreshToken, TokenResponse};
use reqwest::{Method, StatusCode, header};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

use crate::config::Config;
use crate::endpoints;
use crate::error::{Error, Result};
use crate::oauth::{self, KeyPair};

// Rate limiting headers sent by the MoneyBird API
/// Header containing the number of requests allowed in the current window
const HEADER_RATE_LIMIT_LIMIT: &str = "ratelimit-limit";
/// Header containing the number of requests left in the current window
const HEADER_RATE_LIMIT_REMAINING: &str = "ratelimit-remaining";
/// Header containing the unix timestamp at which the window resets
const HEADER_RATE_LIMIT_RESET: &str = "ratelimit-reset";

/// Below this many remaining requests a warning is logged.
const NEAR_LIMIT_THRESHOLD: u32 = 10;

/// The outcome of one API call: the HTTP status and the decoded JSON body, if there was one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteResult {
    pub status: u16,
    pub body: Option<Value>,
}

impl RemoteResult {
    #[must_use]
    pub fn new(status: u16, body: Option<Value>) -> Self {
        Self { status, body }
    }

    #[must_use]
    pub fn is(&self, status: u16) -> bool {
        self.status == status
    }

    /// Takes the body as a JSON object, the only shape entities hydrate from.
    pub fn into_object(self, entity: &'static str) -> Result<Map<String, Value>> {
        match self.body {
            Some(Value::Object(fields)) => Ok(fields),
            _ => Err(Error::InvalidResponse {
                entity,
                status: self.status,
            }),
        }
    }

    /// Takes the body as a list of JSON objects, skipping anything else.
    #[must_use]
    pub fn into_objects(self) -> Vec<Map<String, Value>> {
        match self.body {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(fields) => Some(fields),
                    other => {
                        warn!(?other, "skipping non-object list element");
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// The transport contract the model layer is written against.
///
/// Paths are relative to the administration (see [`crate::endpoints::Endpoint`]) and bodies are
/// JSON text. Implementations decide which statuses become errors; the model layer only expects
/// rate limiting (429) to surface as [`Error::RateLimitExceeded`].
#[allow(async_fn_in_trait)]
pub trait ApiClient {
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RemoteResult>;

    async fn post(&self, path: &str, body: &str) -> Result<RemoteResult>;

    async fn patch(&self, path: &str, body: &str) -> Result<RemoteResult>;

    async fn delete(&self, path: &str) -> Result<RemoteResult>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Information about the remaining API rate limit
///
/// MoneyBird allows a fixed number of requests per window per administration and reports the
/// state of the window on every response.
pub struct RateLimitInfo {
    /// Requests allowed in the current window
    pub limit: Option<u32>,
    /// Requests left in the current window
    pub remaining: Option<u32>,
    /// Unix timestamp at which the window resets
    pub reset: Option<u64>,
}

impl RateLimitInfo {
    /// Extract rate limit information from response headers
    fn from_response_headers(headers: &header::HeaderMap) -> Self {
        fn parse<T: std::str::FromStr>(headers: &header::HeaderMap, name: &str) -> Option<T> {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<T>().ok())
        }

        Self {
            limit: parse(headers, HEADER_RATE_LIMIT_LIMIT),
            remaining: parse(headers, HEADER_RATE_LIMIT_REMAINING),
            reset: parse(headers, HEADER_RATE_LIMIT_RESET),
        }
    }

    /// Returns true if the current window is close to being exhausted
    #[must_use]
    pub fn is_near_limit(&self) -> bool {
        self.remaining.is_some_and(|v| v < NEAR_LIMIT_THRESHOLD)
    }
}

/// What a status handler gets to see of a response.
#[derive(Debug, Clone)]
pub struct ResponseContext {
    pub status: u16,
    pub url: String,
    pub retry_after: Option<Duration>,
    pub body: String,
}

/// Turns a response with a specific status into an error before it reaches the caller.
pub type StatusHandler = fn(&ResponseContext) -> Result<()>;

/// Default handler for 429 Too Many Requests.
pub fn too_many_requests_handler(context: &ResponseContext) -> Result<()> {
    warn!(
        url = %context.url,
        retry_after = ?context.retry_after,
        "rate limit exceeded"
    );
    Err(Error::RateLimitExceeded {
        retry_after: context.retry_after,
        url: context.url.clone(),
        response_body: Some(context.body.clone()).filter(|body| !body.is_empty()),
    })
}

#[derive(Clone, Debug)]
/// The HTTP client for one MoneyBird administration.
///
/// It authenticates every request with the bearer access token and hands back a
/// [`RemoteResult`] for any status without a registered [`StatusHandler`].
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    access_token: AccessToken,
    refresh_token: Option<RefreshToken>,
    status_handlers: HashMap<u16, StatusHandler>,
    /// Rate limit information from the latest response.
    rate_limit_info: Arc<Mutex<RateLimitInfo>>,
}

impl Client {
    /// Creates a client for the given administration with an existing access token.
    pub fn new(
        administration_id: &str,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Result<Self> {
        Self::with_base_url(
            endpoints::administration_url(administration_id)?,
            access_token,
            refresh_token,
        )
    }

    /// Creates a client against an arbitrary base URL, which must end with `/`.
    pub fn with_base_url(
        base_url: Url,
        access_token: String,
        refresh_token: Option<String>,
    ) -> Result<Self> {
        let mut client = Self {
            http: reqwest::Client::builder().build()?,
            base_url,
            access_token: AccessToken::new(access_token),
            refresh_token: refresh_token.map(RefreshToken::new),
            status_handlers: HashMap::new(),
            rate_limit_info: Arc::new(Mutex::new(RateLimitInfo::default())),
        };
        client.register_status_handler(
            StatusCode::TOO_MANY_REQUESTS.as_u16(),
            too_many_requests_handler,
        );
        Ok(client)
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.administration_id,
            config.access_token.clone(),
            config.refresh_token.clone(),
        )
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Registers a handler for a status code, replacing any earlier one.
    pub fn register_status_handler(&mut self, status: u16, handler: StatusHandler) {
        trace!(status, "registering status handler");
        self.status_handlers.insert(status, handler);
    }

    pub fn remove_status_handler(&mut self, status: u16) {
        self.status_handlers.remove(&status);
    }

    /// Get the rate limit information of the latest response
    #[must_use]
    pub fn rate_limit_info(&self) -> RateLimitInfo {
        self.rate_limit_info
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Refreshes the access token using the refresh token.
    pub async fn refresh_access_token(&mut self, key_pair: KeyPair) -> Result<()> {
        let Some(refresh_token) = &self.refresh_token else {
            warn!("no refresh token available, keeping current access token");
            return Ok(());
        };

        let oauth_client = oauth::build_oauth_client(key_pair)?;
        let http_client = oauth::http_client()?;
        let token_result = oauth_client
            .exchange_refresh_token(refresh_token)
            .request_async(&http_client)
            .await
            .map_err(Error::OAuth2)?;

        self.access_token = token_result.access_token().clone();
        if let Some(new_refresh_token) = token_result.refresh_token() {
            self.refresh_token = Some(new_refresh_token.clone());
        }
        debug!("access token refreshed");
        Ok(())
    }

    fn apply_status_handler(&self, context: &ResponseContext) -> Result<()> {
        match self.status_handlers.get(&context.status) {
            Some(handler) => handler(context),
            None => Ok(()),
        }
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&str>,
    ) -> Result<RemoteResult> {
        let url = endpoints::resolve(&self.base_url, path)?;
        trace!(%method, %url, ?query, ?body, "making request");

        let mut request = self
            .http
            .request(method, url)
            .header(header::ACCEPT, "application/json")
            .bearer_auth(self.access_token.secret());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.to_owned());
        }

        let response = request.send().await?;
        self.handle_response(response).await
    }

    #[instrument(skip(self, response))]
    async fn handle_response(&self, response: reqwest::Response) -> Result<RemoteResult> {
        let status = response.status();
        let url = response.url().to_string();
        debug!("Response from {}: status={}", url, status);

        let rate_limit_info = RateLimitInfo::from_response_headers(response.headers());
        if rate_limit_info.is_near_limit() {
            warn!(
                "Approaching MoneyBird API rate limit: remaining={:?}, limit={:?}, reset={:?}",
                rate_limit_info.remaining, rate_limit_info.limit, rate_limit_info.reset
            );
        }
        *self
            .rate_limit_info
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = rate_limit_info;

        let retry_after = response
            .headers()
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<u64>().ok())
            .map(Duration::from_secs);

        let text = response.text().await?;
        debug!("Response body size: {} bytes", text.len());
        trace!("Response text:\n{}", text);

        let context = ResponseContext {
            status: status.as_u16(),
            url,
            retry_after,
            body: text,
        };
        self.apply_status_handler(&context)?;

        let body = decode_body(status, context.body)?;
        Ok(RemoteResult::new(status.as_u16(), body))
    }
}

/// Decodes a response body. Error responses that are not JSON are kept as a string so callers
/// still see them in the [`RemoteResult`].
fn decode_body(status: StatusCode, text: String) -> Result<Option<Value>> {
    if text.trim().is_empty() {
        return Ok(None);
    }
    match serde_json::from_str(&text) {
        Ok(value) => Ok(Some(value)),
        Err(_) if !status.is_success() => Ok(Some(Value::String(text))),
        Err(e) => {
            error!(
                "Deserialization error: {}, near position: {} - response text around that position: {}",
                e,
                e.column(),
                &text
                    .chars()
                    .skip(e.column().saturating_sub(30))
                    .take(100)
                    .collect::<String>()
            );
            Err(Error::DeserializationError(e, Some(text)))
        }
    }
}

impl ApiClient for Client {
    #[instrument(skip(self))]
    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<RemoteResult> {
        self.send(Method::GET, path, query, None).await
    }

    #[instrument(skip(self, body))]
    async fn post(&self, path: &str, body: &str) -> Result<RemoteResult> {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    #[instrument(skip(self, body))]
    async fn patch(&self, path: &str, body: &str) -> Result<RemoteResult> {
        self.send(Method::PATCH, path, &[], Some(body)).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> Result<RemoteResult> {
        self.send(Method::DELETE, path, &[], None).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn context(status: u16) -> ResponseContext {
        ResponseContext {
            status,
            url: "https://moneybird.com/api/v2/1/contacts".to_string(),
            retry_after: Some(Duration::from_secs(30)),
            body: String::new(),
        }
    }

    #[test]
    fn too_many_requests_becomes_rate_limit_error() {
        let client = Client::new("1", "token".to_string(), None).unwrap();

        let err = client.apply_status_handler(&context(429)).unwrap_err();
        match err {
            Error::RateLimitExceeded {
                retry_after,
                url,
                response_body,
            } => {
                assert_eq!(retry_after, Some(Duration::from_secs(30)));
                assert_eq!(url, "https://moneybird.com/api/v2/1/contacts");
                assert!(response_body.is_none());
            }
            other => panic!("expected rate limit error, got {other:?}"),
        }
        assert!(client.apply_status_handler(&context(404)).is_ok());
    }

    #[test]
    fn custom_status_handlers_can_be_registered_and_removed() {
        fn unauthorized(context: &ResponseContext) -> Result<()> {
            Err(Error::InvalidResponse {
                entity: "session",
                status: context.status,
            })
        }

        let mut client = Client::new("1", "token".to_string(), None).unwrap();
        client.register_status_handler(401, unauthorized);
        assert!(matches!(
            client.apply_status_handler(&context(401)),
            Err(Error::InvalidResponse { status: 401, .. })
        ));

        client.remove_status_handler(429);
        assert!(client.apply_status_handler(&context(429)).is_ok());
    }

    #[test]
    fn reads_rate_limit_headers() {
        let mut headers = header::HeaderMap::new();
        headers.insert(HEADER_RATE_LIMIT_LIMIT, "150".parse().unwrap());
        headers.insert(HEADER_RATE_LIMIT_REMAINING, "3".parse().unwrap());
        headers.insert(HEADER_RATE_LIMIT_RESET, "1700000000".parse().unwrap());

        let info = RateLimitInfo::from_response_headers(&headers);
        assert_eq!(info.limit, Some(150));
        assert_eq!(info.remaining, Some(3));
        assert_eq!(info.reset, Some(1_700_000_000));
        assert!(info.is_near_limit());
        assert!(!RateLimitInfo::default().is_near_limit());
    }

    #[test]
    fn decodes_bodies() {
        assert_eq!(decode_body(StatusCode::NO_CONTENT, String::new()).unwrap(), None);
        assert_eq!(
            decode_body(StatusCode::OK, r#"{"id":"1"}"#.to_string()).unwrap(),
            Some(json!({"id": "1"}))
        );
        assert_eq!(
            decode_body(StatusCode::BAD_GATEWAY, "<html>".to_string()).unwrap(),
            Some(Value::String("<html>".to_string()))
        );
        assert!(matches!(
            decode_body(StatusCode::OK, "<html>".to_string()),
            Err(Error::DeserializationError(_, Some(_)))
        ));
    }

    #[test]
    fn remote_result_bodies() {
        let result = RemoteResult::new(200, Some(json!({"id": "5"})));
        assert_eq!(result.into_object("contact").unwrap()["id"], json!("5"));

        let err = RemoteResult::new(201, None).into_object("contact").unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidResponse {
                entity: "contact",
                status: 201
            }
        ));

        let list = RemoteResult::new(200, Some(json!([{"id": "1"}, 3, {"id": "2"}])));
        assert_eq!(list.into_objects().len(), 2);
    }
}
