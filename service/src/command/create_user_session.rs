//! [`Command`] for signing a user in.

use std::convert::Infallible;

use derive_more::{Display, Error};
use secrecy::SecretBox;
use tracerr::Traced;

use crate::{
    domain::{user, Session},
    infra::{auth, AuthProvider},
    Service,
};

use super::{Command, EnsureUserProfile};

/// [`Command`] for signing a user in with their credentials.
///
/// On success the identity provider emits a change picked up by the
/// [`RelayAuthChanges`] task, which publishes the new [`Session`] to the
/// [`SessionStore`]; this [`Command`] itself never touches the store.
///
/// [`RelayAuthChanges`]: crate::task::RelayAuthChanges
/// [`SessionStore`]: crate::session::SessionStore
#[derive(Debug)]
pub struct CreateUserSession {
    /// Email address of the user.
    pub email: user::Email,

    /// [`Password`] of the user.
    ///
    /// [`Password`]: user::Password
    pub password: SecretBox<user::Password>,
}

impl<B> Command<CreateUserSession> for Service<B>
where
    B: AuthProvider,
    Self: Command<EnsureUserProfile, Ok = crate::domain::Profile,
        Err = Infallible>,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        let auth = self
            .backend()
            .sign_in(&cmd.email, &cmd.password)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        let profile = self
            .execute(EnsureUserProfile(auth.user_id))
            .await
            .unwrap_or_else(|e| match e {});
        Ok(Session::authenticated(auth.user_id, profile.role))
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error)]
pub enum ExecutionError {
    /// Provided credentials are wrong.
    #[display("Wrong credentials")]
    WrongCredentials,

    /// [`AuthProvider`] error.
    #[display("Identity provider failed: {_0}")]
    Auth(auth::Error),
}

impl From<auth::Error> for ExecutionError {
    fn from(e: auth::Error) -> Self {
        match e {
            auth::Error::WrongCredentials => Self::WrongCredentials,
            auth::Error::Rejected(..) => Self::Auth(e),
            #[cfg(feature = "rest")]
            auth::Error::Rest(..) => Self::Auth(e),
        }
    }
}
