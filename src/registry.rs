use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::client::ApiClient;
use crate::entities::{Contact, Invoice, Payment};
use crate::error::{Error, Result};
use crate::repository::Repository;

/// Names accepted by [`Registry::get`].
pub const AVAILABLE_REPOSITORIES: &[&str] = &["invoices", "contacts", "payments"];

/// One of the repositories a [`Registry`] hands out.
#[derive(Debug)]
pub enum AnyRepository<C> {
    Invoices(Repository<C, Invoice>),
    Contacts(Repository<C, Contact>),
    Payments(Repository<C, Payment>),
}

impl<C: ApiClient> AnyRepository<C> {
    fn for_name(name: &str, api: Arc<C>) -> Option<Self> {
        match name {
            "invoices" => Some(Self::Invoices(Repository::new(api))),
            "contacts" => Some(Self::Contacts(Repository::new(api))),
            "payments" => Some(Self::Payments(Repository::new(api))),
            _ => None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Invoices(_) => "invoices",
            Self::Contacts(_) => "contacts",
            Self::Payments(_) => "payments",
        }
    }

    #[must_use]
    pub fn invoices(&self) -> Option<&Repository<C, Invoice>> {
        match self {
            Self::Invoices(repository) => Some(repository),
            _ => None,
        }
    }

    #[must_use]
    pub fn contacts(&self) -> Option<&Repository<C, Contact>> {
        match self {
            Self::Contacts(repository) => Some(repository),
            _ => None,
        }
    }

    #[must_use]
    pub fn payments(&self) -> Option<&Repository<C, Payment>> {
        match self {
            Self::Payments(repository) => Some(repository),
            _ => None,
        }
    }
}

/// Hands out one repository per name, built on first use and shared afterwards.
pub struct Registry<C> {
    api: Arc<C>,
    repositories: Mutex<HashMap<&'static str, Arc<AnyRepository<C>>>>,
}

impl<C: ApiClient> Registry<C> {
    #[must_use]
    pub fn new(api: C) -> Self {
        Self::from_shared(Arc::new(api))
    }

    #[must_use]
    pub fn from_shared(api: Arc<C>) -> Self {
        Self {
            api,
            repositories: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn api(&self) -> &Arc<C> {
        &self.api
    }

    /// Returns the repository registered under `name`.
    ///
    /// Every call with the same name returns the same instance. Names outside
    /// [`AVAILABLE_REPOSITORIES`] fail with [`Error::UnknownRepository`].
    pub fn get(&self, name: &str) -> Result<Arc<AnyRepository<C>>> {
        let mut repositories = self
            .repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(repository) = repositories.get(name) {
            return Ok(Arc::clone(repository));
        }

        let Some(repository) = AnyRepository::for_name(name, Arc::clone(&self.api)) else {
            warn!(name, "unknown repository requested");
            return Err(Error::UnknownRepository(name.to_string()));
        };
        debug!(name, "creating repository");
        let repository = Arc::new(repository);
        repositories.insert(repository.name(), Arc::clone(&repository));
        Ok(repository)
    }
}

impl<C> fmt::Debug for Registry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repositories = self
            .repositories
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<_> = repositories.keys().collect();
        names.sort_unstable();
        f.debug_struct("Registry")
            .field("repositories", &names)
            .finish_non_exhaustive()
    }
}
