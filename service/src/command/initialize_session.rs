//! [`Command`] for initializing the [`Session`] of this client.

use std::convert::Infallible;

use tracing as log;

use crate::{
    domain::Session,
    infra::AuthProvider,
    Service,
};

use super::{Command, EnsureUserProfile};

/// [`Command`] for performing the initial [`Session`] lookup of this
/// client.
///
/// Always resolves to a checked [`Session`] and publishes it to the
/// [`SessionStore`]: provider failures are logged and degrade to an
/// anonymous session, never blocking startup.
///
/// [`SessionStore`]: crate::session::SessionStore
#[derive(Clone, Copy, Debug, Default)]
pub struct InitializeSession;

impl<B> Command<InitializeSession> for Service<B>
where
    B: AuthProvider,
    Self: Command<EnsureUserProfile, Ok = crate::domain::Profile,
        Err = Infallible>,
{
    type Ok = Session;
    type Err = Infallible;

    async fn execute(
        &self,
        _: InitializeSession,
    ) -> Result<Self::Ok, Self::Err> {
        let session = match self.backend().current_session().await {
            Ok(Some(auth)) => {
                let profile = self
                    .execute(EnsureUserProfile(auth.user_id))
                    .await
                    .unwrap_or_else(|e| match e {});
                Session::authenticated(auth.user_id, profile.role)
            }
            Ok(None) => Session::anonymous(),
            Err(e) => {
                log::warn!(
                    error = %e.as_ref(),
                    "initial session lookup failed, assuming anonymous",
                );
                Session::anonymous()
            }
        };
        self.sessions().set(session);
        Ok(session)
    }
}
