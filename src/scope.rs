use oauth2::Scope as OAuth2Scope;
use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

/// Permissions a MoneyBird application can request during authorization.
///
/// Without any scope the application only gets read access to the administration's settings.
/// See <https://developer.moneybird.com/authentication/#scopes>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScopeType {
    SalesInvoices,
    Documents,
    Estimates,
    Bank,
    TimeEntries,
    Settings,
}

impl ScopeType {
    /// The scope name as MoneyBird expects it in the authorization URL.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SalesInvoices => "sales_invoices",
            Self::Documents => "documents",
            Self::Estimates => "estimates",
            Self::Bank => "bank",
            Self::TimeEntries => "time_entries",
            Self::Settings => "settings",
        }
    }
}

impl fmt::Display for ScopeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing a scope from a string
#[derive(Debug, Clone)]
pub struct ParseScopeError(String);

impl fmt::Display for ParseScopeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Invalid scope string: {}", self.0)
    }
}

impl std::error::Error for ParseScopeError {}

impl FromStr for ScopeType {
    type Err = ParseScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sales_invoices" => Ok(Self::SalesInvoices),
            "documents" => Ok(Self::Documents),
            "estimates" => Ok(Self::Estimates),
            "bank" => Ok(Self::Bank),
            "time_entries" => Ok(Self::TimeEntries),
            "settings" => Ok(Self::Settings),
            _ => Err(ParseScopeError(s.to_string())),
        }
    }
}

/// A set of MoneyBird scopes to request.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    scopes: Vec<OAuth2Scope>,
}

impl Scope {
    #[must_use]
    pub fn new(scope_types: Vec<ScopeType>) -> Self {
        scope_types.into_iter().collect()
    }

    #[must_use]
    pub fn from_type(scope_type: ScopeType) -> Self {
        Self {
            scopes: vec![OAuth2Scope::new(scope_type.to_string())],
        }
    }

    /// Add a scope to the collection
    #[must_use]
    pub fn add(mut self, scope_type: ScopeType) -> Self {
        self.scopes.push(OAuth2Scope::new(scope_type.to_string()));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Converts the scopes into OAuth2 scopes.
    #[must_use]
    pub fn into_oauth2_scopes(self) -> Vec<OAuth2Scope> {
        self.scopes
    }

    /// Everything needed to manage invoices, contacts and payments.
    #[must_use]
    pub fn invoicing() -> Self {
        Self::new(vec![ScopeType::SalesInvoices, ScopeType::Settings])
    }

    /// Every scope MoneyBird offers.
    #[must_use]
    pub fn all() -> Self {
        Self::new(vec![
            ScopeType::SalesInvoices,
            ScopeType::Documents,
            ScopeType::Estimates,
            ScopeType::Bank,
            ScopeType::TimeEntries,
            ScopeType::Settings,
        ])
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let scope_strs: Vec<&str> = self.scopes.iter().map(|s| s.as_str()).collect();
        write!(f, "{}", scope_strs.join(" "))
    }
}

impl From<ScopeType> for Scope {
    fn from(scope_type: ScopeType) -> Self {
        Self::from_type(scope_type)
    }
}

impl From<Vec<ScopeType>> for Scope {
    fn from(scope_types: Vec<ScopeType>) -> Self {
        Self::new(scope_types)
    }
}

impl FromIterator<ScopeType> for Scope {
    fn from_iter<I: IntoIterator<Item = ScopeType>>(iter: I) -> Self {
        let scopes = iter
            .into_iter()
            .map(|st| OAuth2Scope::new(st.to_string()))
            .collect();
        Self { scopes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_names_round_trip() {
        for scope in [ScopeType::SalesInvoices, ScopeType::TimeEntries, ScopeType::Bank] {
            assert_eq!(scope.as_str().parse::<ScopeType>().unwrap(), scope);
        }
        assert!("accounting.contacts".parse::<ScopeType>().is_err());
    }

    #[test]
    fn display_joins_with_spaces() {
        let scope = Scope::invoicing().add(ScopeType::Documents);
        assert_eq!(scope.to_string(), "sales_invoices settings documents");
    }
}
