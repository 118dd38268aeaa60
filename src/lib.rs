//! # moneybird-rs
//!
//! A Rust client library for the MoneyBird API.
//!
//! Resources are active-record models: a [`Contact`] or [`Invoice`] holds its own fields, knows
//! which of them changed since it was last loaded and saves itself through any [`ApiClient`].
//!
//! ```ignore
//! use moneybird_rs::{Client, Config, Model, Registry, Resource};
//!
//! let client = Client::from_config(&Config::from_env()?)?;
//! let registry = Registry::new(client);
//!
//! let contacts = registry.get("contacts")?;
//! let repository = contacts.contacts().expect("contacts repository");
//! if let Some(mut contact) = repository.find("260703856209380607").await? {
//!     contact.set("city", "Enschede");
//!     contact.save(registry.api().as_ref()).await?;
//! }
//! ```
//!
//! ## Sentry Integration
//!
//! Enable the `sentry` feature to turn errors into Sentry breadcrumbs and extra context through
//! the `sentry_integration` module.

#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

#[macro_use]
extern crate tracing;

pub mod client;
pub mod config;
pub mod endpoints;
pub mod entities;
pub mod error;
pub mod oauth;
pub mod registry;
pub mod repository;
pub mod scope;

#[cfg(feature = "sentry")]
pub mod sentry_integration;

pub use client::{ApiClient, Client, RateLimitInfo, RemoteResult};
pub use config::Config;
pub use endpoints::Endpoint;
pub use entities::*;
pub use error::{Error, Result};
pub use oauth::{KeyPair, TokenSet};
pub use registry::{AnyRepository, Registry};
pub use repository::Repository;
pub use scope::{Scope, ScopeType};
