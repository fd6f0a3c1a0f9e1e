//! [`Command`] for signing the current user out.

use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    infra::{auth, AuthProvider},
    Service,
};

use super::Command;

/// [`Command`] for signing the current user out.
///
/// The [`SessionStore`] is reset to an anonymous [`Session`] before the
/// provider call is awaited, so subscribers observe the sign-out even if
/// the revocation fails.
///
/// [`Session`]: crate::domain::Session
/// [`SessionStore`]: crate::session::SessionStore
#[derive(Clone, Copy, Debug, Default)]
pub struct DestroyUserSession;

impl<B> Command<DestroyUserSession> for Service<B>
where
    B: AuthProvider,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        _: DestroyUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        self.sessions().reset();
        self.backend()
            .sign_out()
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`DestroyUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`AuthProvider`] error.
    #[display("Identity provider failed: {_0}")]
    Auth(auth::Error),
}
