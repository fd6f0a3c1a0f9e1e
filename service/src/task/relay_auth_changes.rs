//! [`RelayAuthChanges`] [`Task`].

use std::convert::Infallible;

use common::operations::Start;
use futures::StreamExt as _;
use tracing as log;

use crate::{
    command::EnsureUserProfile,
    domain::{Profile, Session},
    infra::{auth::AuthChange, AuthProvider},
    Command, Service,
};

use super::Task;

/// [`Task`] relaying identity provider changes into the [`SessionStore`].
///
/// Every [`AuthChange::SignedIn`] is resolved through
/// [`EnsureUserProfile`] first, so the published [`Session`] always
/// carries a [`Role`].
///
/// [`Role`]: crate::domain::user::Role
/// [`SessionStore`]: crate::session::SessionStore
#[derive(Clone, Copy, Debug, Default)]
pub struct RelayAuthChanges;

impl<B> Task<Start<RelayAuthChanges>> for Service<B>
where
    B: AuthProvider,
    Self: Command<EnsureUserProfile, Ok = Profile, Err = Infallible>,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        _: Start<RelayAuthChanges>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut changes = self.backend().changes();
        while let Some(change) = changes.next().await {
            match change {
                AuthChange::SignedIn(auth) => {
                    let profile = self
                        .execute(EnsureUserProfile(auth.user_id))
                        .await
                        .unwrap_or_else(|e| match e {});
                    self.sessions().set(Session::authenticated(
                        auth.user_id,
                        profile.role,
                    ));
                }
                AuthChange::SignedOut => self.sessions().reset(),
            }
        }
        log::info!("auth change stream ended");
        Ok(())
    }
}
