//! [`Command`] for requesting a password reset.

use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::user,
    infra::{auth, AuthProvider},
    Service,
};

use super::Command;

/// [`Command`] for requesting a password reset email for the provided
/// address.
#[derive(Clone, Debug)]
pub struct ResetUserPassword {
    /// Email address to send the reset link to.
    pub email: user::Email,
}

impl<B> Command<ResetUserPassword> for Service<B>
where
    B: AuthProvider,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: ResetUserPassword,
    ) -> Result<Self::Ok, Self::Err> {
        self.backend()
            .reset_password(&cmd.email)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))
    }
}

/// Error of [`ResetUserPassword`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`AuthProvider`] error.
    #[display("Identity provider failed: {_0}")]
    Auth(auth::Error),
}
