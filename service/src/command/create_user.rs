//! [`Command`] for registering a new user.

use std::convert::Infallible;

use derive_more::{Display, Error, From};
use secrecy::SecretBox;
use tracerr::Traced;

use crate::{
    domain::{user, Session},
    infra::{auth, AuthProvider},
    Service,
};

use super::{Command, EnsureUserProfile};

/// [`Command`] for registering a new user with the identity provider.
///
/// A default-[`Role`] [`Profile`] is created alongside; the resulting
/// [`Session`] reaches the [`SessionStore`] through the
/// [`RelayAuthChanges`] task.
///
/// [`Profile`]: crate::domain::Profile
/// [`RelayAuthChanges`]: crate::task::RelayAuthChanges
/// [`Role`]: user::Role
/// [`SessionStore`]: crate::session::SessionStore
#[derive(Debug)]
pub struct CreateUser {
    /// Email address of the new user.
    pub email: user::Email,

    /// [`Password`] of the new user.
    ///
    /// [`Password`]: user::Password
    pub password: SecretBox<user::Password>,
}

impl<B> Command<CreateUser> for Service<B>
where
    B: AuthProvider,
    Self: Command<EnsureUserProfile, Ok = crate::domain::Profile,
        Err = Infallible>,
{
    type Ok = Session;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateUser) -> Result<Self::Ok, Self::Err> {
        let auth = self
            .backend()
            .sign_up(&cmd.email, &cmd.password)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> ExecutionError))?;
        let profile = self
            .execute(EnsureUserProfile(auth.user_id))
            .await
            .unwrap_or_else(|e| match e {});
        Ok(Session::authenticated(auth.user_id, profile.role))
    }
}

/// Error of [`CreateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`AuthProvider`] error.
    #[display("Identity provider failed: {_0}")]
    Auth(auth::Error),
}
