//! Service contains the business logic of the application.
//!
//! List of available Cargo features:
#![doc = document_features::document_features!()]
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod checkout;
pub mod command;
pub mod domain;
pub mod guard;
pub mod infra;
pub mod query;
pub mod read;
pub mod session;
pub mod task;

use std::error::Error;

use common::{operations::Start, Currency};
use derive_more::Debug;
use smart_default::SmartDefault;

pub use self::{
    command::Command, query::Query, session::SessionStore, task::Task,
};

/// [`Service`] configuration.
#[derive(Clone, Copy, Debug, SmartDefault)]
pub struct Config {
    /// [`Currency`] payments are charged in.
    #[default(Currency::Php)]
    pub currency: Currency,

    /// Number of items per page in listings.
    #[default(12)]
    pub per_page: usize,
}

/// Domain service.
#[derive(Clone, Debug)]
pub struct Service<B> {
    /// Configuration of this [`Service`].
    config: Config,

    /// Backend collaborators of this [`Service`].
    backend: B,

    /// [`SessionStore`] of this [`Service`].
    sessions: SessionStore,
}

impl<B> Service<B> {
    /// Creates a new [`Service`] with the provided parameters, along with a
    /// [`task::Background`] environment running its [`task::RelayAuthChanges`]
    /// [`Task`].
    pub fn new(config: Config, backend: B) -> (Self, task::Background)
    where
        Self: Task<Start<task::RelayAuthChanges>, Ok = (), Err: Error + 'static>
            + Clone
            + 'static,
    {
        let this = Self {
            config,
            backend,
            sessions: SessionStore::new(),
        };

        let mut bg = task::Background::default();
        let svc = this.clone();
        bg.spawn("RelayAuthChanges", async move {
            svc.execute(Start(task::RelayAuthChanges)).await
        });

        (this, bg)
    }

    /// Returns [`Config`] of this [`Service`].
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns backend collaborators of this [`Service`].
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the [`SessionStore`] of this [`Service`].
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}
