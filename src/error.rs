use std::time::Duration;

use miette::Diagnostic;
use oauth2::{HttpClientError, basic::BasicErrorResponse};
use thiserror::Error;

use crate::client::RemoteResult;

pub type TokenError =
    oauth2::RequestTokenError<HttpClientError<reqwest::Error>, BasicErrorResponse>;

/// Errors that can occur when interacting with the MoneyBird API.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("error making request: {0:?}")]
    #[diagnostic(
        code(moneybird_rs::request_error),
        help("Check your network connection and MoneyBird API availability")
    )]
    Request(#[source] reqwest::Error),

    #[error("error decoding response: {0:?}")]
    #[diagnostic(
        code(moneybird_rs::deserialization_error),
        help("The API returned data in an unexpected format")
    )]
    DeserializationError(#[source] serde_json::Error, Option<String>),

    #[error("endpoint could not be parsed as a URL")]
    #[diagnostic(
        code(moneybird_rs::invalid_endpoint),
        help("Check that the administration id and the resource path form a valid URL")
    )]
    InvalidEndpoint,

    /// An error returned during `OAuth2` operations
    #[error("oauth2 error: {0:?}")]
    #[diagnostic(
        code(moneybird_rs::oauth2_error),
        help("Verify your OAuth2 configuration and credentials")
    )]
    OAuth2(TokenError),

    /// Rate limit exceeded (HTTP 429 Too Many Requests). Raised by the transport and never
    /// retried by the model layer.
    #[error("rate limit exceeded: retry after {retry_after:?}")]
    #[diagnostic(
        code(moneybird_rs::rate_limit_exceeded),
        help("The MoneyBird API rate limit has been exceeded. Wait and retry, or throttle requests.")
    )]
    RateLimitExceeded {
        retry_after: Option<Duration>,
        url: String,
        response_body: Option<String>,
    },

    /// An operation that addresses a persisted resource was attempted on an entity without an
    /// `id`.
    #[error("{entity} has no identifier")]
    #[diagnostic(
        code(moneybird_rs::missing_identifier),
        help("Save the {entity} first, or fill in its `id` field")
    )]
    MissingIdentifier { entity: &'static str },

    #[error("could not create {entity}: unexpected status {}", .response.status)]
    #[diagnostic(
        code(moneybird_rs::creation_failed),
        help("Inspect the response body for the validation errors returned by MoneyBird")
    )]
    CreationFailed {
        entity: &'static str,
        response: RemoteResult,
    },

    #[error("could not update {entity}: unexpected status {}", .response.status)]
    #[diagnostic(
        code(moneybird_rs::update_failed),
        help("Inspect the response body for the validation errors returned by MoneyBird")
    )]
    UpdateFailed {
        entity: &'static str,
        response: RemoteResult,
    },

    #[error("could not delete {entity}: unexpected status {}", .response.status)]
    #[diagnostic(
        code(moneybird_rs::delete_failed),
        help("Verify that the {entity} still exists and may be deleted")
    )]
    DeleteFailed {
        entity: &'static str,
        response: RemoteResult,
    },

    #[error("unknown repository: {0}")]
    #[diagnostic(
        code(moneybird_rs::unknown_repository),
        help("Available repositories are: invoices, contacts, payments")
    )]
    UnknownRepository(String),

    /// A success status arrived without a JSON object to hydrate from.
    #[error("{entity} response with status {status} carried no object")]
    #[diagnostic(
        code(moneybird_rs::invalid_response),
        help("The API returned data in an unexpected format")
    )]
    InvalidResponse { entity: &'static str, status: u16 },

    #[error("missing configuration: {0}")]
    #[diagnostic(
        code(moneybird_rs::missing_configuration),
        help("Set the missing MONEYBIRD_* environment variable")
    )]
    MissingConfiguration(&'static str),

    #[error("invalid configuration for {var}: {reason}")]
    #[diagnostic(code(moneybird_rs::invalid_configuration))]
    InvalidConfiguration { var: &'static str, reason: String },
}

impl Error {
    /// The HTTP status attached to this error, if any.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Request(e) => e.status().map(|s| s.as_u16()),
            Self::RateLimitExceeded { .. } => Some(429),
            Self::CreationFailed { response, .. }
            | Self::UpdateFailed { response, .. }
            | Self::DeleteFailed { response, .. } => Some(response.status),
            Self::InvalidResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The remote result a failed write carried back.
    #[must_use]
    pub fn response(&self) -> Option<&RemoteResult> {
        match self {
            Self::CreationFailed { response, .. }
            | Self::UpdateFailed { response, .. }
            | Self::DeleteFailed { response, .. } => Some(response),
            _ => None,
        }
    }

    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Request(e) => e.url().map(url::Url::as_str),
            Self::RateLimitExceeded { url, .. } => Some(url),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Request(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::DeserializationError(e, None)
    }
}

impl From<TokenError> for Error {
    fn from(e: TokenError) -> Self {
        Self::OAuth2(e)
    }
}

/// Type alias for results from this crate.
///
/// This is already a Miette diagnostic result due to the implementation of
/// the Diagnostic trait for the Error type.
pub type Result<O> = std::result::Result<O, Error>;

/// Logs an error for the given entity before handing the result back unchanged.
#[macro_export]
macro_rules! handle_api_response {
    ($response:expr, $entity_type:expr) => {
        match $response {
            Ok(response) => Ok(response),
            Err(e) => {
                tracing::error!("API error for {}: {:?}", $entity_type, e);
                Err(e)
            }
        }
    };
}
