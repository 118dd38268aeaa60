//! Sentry integration for moneybird-rs errors.
//!
//! This module is only available when the `sentry` feature is enabled:
//!
//! ```toml
//! [dependencies]
//! moneybird-rs = { version = "0.1", features = ["sentry"] }
//! ```

use std::collections::BTreeMap;

use sentry_core::{Breadcrumb, protocol::Value};

use crate::client::RemoteResult;
use crate::error::Error;

/// Longest response body preview attached to Sentry context.
const BODY_PREVIEW_LIMIT: usize = 500;

fn body_preview(response: &RemoteResult) -> Option<String> {
    let body = match response.body.as_ref()? {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    Some(if body.chars().count() > BODY_PREVIEW_LIMIT {
        format!(
            "{}...",
            body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>()
        )
    } else {
        body
    })
}

fn write_failure(
    action: &str,
    entity: &str,
    response: &RemoteResult,
) -> (&'static str, String, BTreeMap<String, Value>) {
    let mut data = BTreeMap::new();
    data.insert("entity".to_string(), Value::from(entity));
    data.insert("status_code".to_string(), Value::from(response.status));
    (
        "moneybird.write",
        format!("Could not {action} {entity}"),
        data,
    )
}

/// Convert a moneybird-rs Error into a Sentry breadcrumb.
impl<'a> From<&'a Error> for Breadcrumb {
    fn from(error: &'a Error) -> Self {
        let (category, message, data) = match error {
            Error::Request(source) => (
                "http.request",
                format!("HTTP request error: {source}"),
                BTreeMap::new(),
            ),

            Error::DeserializationError(source, _) => (
                "http.response",
                format!("Failed to decode response: {source}"),
                BTreeMap::new(),
            ),

            Error::InvalidResponse { entity, status } => {
                let mut data = BTreeMap::new();
                data.insert("entity".to_string(), Value::from(*entity));
                data.insert("status_code".to_string(), Value::from(*status));
                (
                    "http.response",
                    format!("{entity} response carried no object"),
                    data,
                )
            }

            Error::RateLimitExceeded {
                retry_after, url, ..
            } => {
                let mut data = BTreeMap::new();
                data.insert("url".to_string(), Value::from(url.clone()));
                if let Some(retry) = retry_after {
                    data.insert("retry_after_secs".to_string(), Value::from(retry.as_secs()));
                }
                (
                    "moneybird.rate_limit",
                    "Rate limit exceeded".to_string(),
                    data,
                )
            }

            Error::CreationFailed { entity, response } => write_failure("create", entity, response),
            Error::UpdateFailed { entity, response } => write_failure("update", entity, response),
            Error::DeleteFailed { entity, response } => write_failure("delete", entity, response),

            Error::MissingIdentifier { entity } => (
                "moneybird.validation",
                format!("{entity} has no identifier"),
                BTreeMap::new(),
            ),

            Error::UnknownRepository(name) => (
                "moneybird.config",
                format!("Unknown repository {name}"),
                BTreeMap::new(),
            ),

            Error::OAuth2(_) => ("auth", "OAuth2 error".to_string(), BTreeMap::new()),

            Error::InvalidEndpoint => (
                "moneybird.config",
                "Invalid endpoint URL".to_string(),
                BTreeMap::new(),
            ),

            Error::MissingConfiguration(var) => (
                "moneybird.config",
                format!("Missing configuration {var}"),
                BTreeMap::new(),
            ),

            Error::InvalidConfiguration { var, .. } => (
                "moneybird.config",
                format!("Invalid configuration {var}"),
                BTreeMap::new(),
            ),
        };

        Breadcrumb {
            ty: "error".to_string(),
            category: Some(category.to_string()),
            message: Some(message),
            data,
            level: sentry_core::Level::Error,
            ..Default::default()
        }
    }
}

/// Convert a moneybird-rs Error into Sentry context data.
///
/// # Example
///
/// ```ignore
/// use sentry::configure_scope;
/// use moneybird_rs::sentry_integration::error_to_sentry_context;
///
/// if let Err(e) = invoice.save(&client).await {
///     configure_scope(|scope| {
///         for (key, value) in error_to_sentry_context(&e) {
///             scope.set_extra(&key, value);
///         }
///     });
/// }
/// ```
pub fn error_to_sentry_context(error: &Error) -> BTreeMap<String, Value> {
    let mut context = BTreeMap::new();

    if let Some(url) = error.url() {
        context.insert("moneybird.url".to_string(), Value::from(url.to_string()));
    }

    if let Some(status) = error.status_code() {
        context.insert("moneybird.status_code".to_string(), Value::from(status));
    }

    if let Some(body) = error.response().and_then(body_preview) {
        context.insert("moneybird.response_body".to_string(), Value::from(body));
    }

    if let Error::RateLimitExceeded {
        response_body: Some(body),
        ..
    } = error
    {
        context.insert(
            "moneybird.response_body".to_string(),
            Value::from(body.chars().take(BODY_PREVIEW_LIMIT).collect::<String>()),
        );
    }

    context
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn write_failures_become_breadcrumbs() {
        let error = Error::UpdateFailed {
            entity: "contact",
            response: RemoteResult::new(422, Some(json!({"error": "invalid"}))),
        };

        let breadcrumb = Breadcrumb::from(&error);
        assert_eq!(breadcrumb.category.as_deref(), Some("moneybird.write"));
        assert_eq!(breadcrumb.message.as_deref(), Some("Could not update contact"));
        assert_eq!(breadcrumb.data["status_code"], Value::from(422));

        let context = error_to_sentry_context(&error);
        assert_eq!(context["moneybird.status_code"], Value::from(422));
        assert_eq!(
            context["moneybird.response_body"],
            Value::from(r#"{"error":"invalid"}"#)
        );
    }
}
