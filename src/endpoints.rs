use std::fmt;

use url::Url;

use crate::error::{Error, Result};

pub const BASE_URL: &str = "https://moneybird.com/api/v2/";

/// A typed representation of a MoneyBird resource path.
///
/// Paths are relative to the administration's base URL
/// (`https://moneybird.com/api/v2/{administration_id}/`) and carry no `.json` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// `{endpoint}`, used to create and search.
    Collection(&'static str),
    /// `{endpoint}/{id}`, used to read, update and delete.
    Item(&'static str, String),
    /// `{parent}/{parent_id}/{child}[/{child_id}]`
    Nested {
        parent: &'static str,
        parent_id: String,
        child: &'static str,
        child_id: Option<String>,
    },
}

impl Endpoint {
    #[must_use]
    pub fn item(endpoint: &'static str, id: impl fmt::Display) -> Self {
        Self::Item(endpoint, id.to_string())
    }

    #[must_use]
    pub fn nested(parent: &'static str, parent_id: impl fmt::Display, child: &'static str) -> Self {
        Self::Nested {
            parent,
            parent_id: parent_id.to_string(),
            child,
            child_id: None,
        }
    }

    #[must_use]
    pub fn nested_item(
        parent: &'static str,
        parent_id: impl fmt::Display,
        child: &'static str,
        child_id: impl fmt::Display,
    ) -> Self {
        Self::Nested {
            parent,
            parent_id: parent_id.to_string(),
            child,
            child_id: Some(child_id.to_string()),
        }
    }

    /// The path as handed to the API client.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Collection(endpoint) => (*endpoint).to_string(),
            Self::Item(endpoint, id) => format!("{endpoint}/{id}"),
            Self::Nested {
                parent,
                parent_id,
                child,
                child_id: None,
            } => format!("{parent}/{parent_id}/{child}"),
            Self::Nested {
                parent,
                parent_id,
                child,
                child_id: Some(child_id),
            } => format!("{parent}/{parent_id}/{child}/{child_id}"),
        }
    }

    /// Resolves the path against an administration base URL.
    pub fn to_url(&self, base: &Url) -> Result<Url> {
        resolve(base, &self.path())
    }
}

/// Joins a relative resource path onto the administration base URL.
///
/// A leading `/` is ignored so the administration segment is never dropped.
pub(crate) fn resolve(base: &Url, path: &str) -> Result<Url> {
    base.join(path.trim_start_matches('/'))
        .map_err(|_| Error::InvalidEndpoint)
}

/// The base URL for one administration.
pub fn administration_url(administration_id: &str) -> Result<Url> {
    let base = Url::parse(BASE_URL).map_err(|_| Error::InvalidEndpoint)?;
    base.join(&format!("{administration_id}/"))
        .map_err(|_| Error::InvalidEndpoint)
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_paths() {
        assert_eq!(Endpoint::Collection("contacts").path(), "contacts");
        assert_eq!(Endpoint::item("sales_invoices", 42).path(), "sales_invoices/42");
        assert_eq!(
            Endpoint::nested("sales_invoices", 42, "payments").path(),
            "sales_invoices/42/payments"
        );
        assert_eq!(
            Endpoint::nested_item("sales_invoices", 42, "payments", "7").path(),
            "sales_invoices/42/payments/7"
        );
    }

    #[test]
    fn resolves_against_administration() {
        let base = administration_url("123").unwrap();
        assert_eq!(base.as_str(), "https://moneybird.com/api/v2/123/");

        let url = Endpoint::item("contacts", 9).to_url(&base).unwrap();
        assert_eq!(url.as_str(), "https://moneybird.com/api/v2/123/contacts/9");

        let url = resolve(&base, "/contacts").unwrap();
        assert_eq!(url.as_str(), "https://moneybird.com/api/v2/123/contacts");
    }
}
