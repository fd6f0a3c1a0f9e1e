//! [`AuthProvider`]-related definitions.

use std::future::Future;

use derive_more::{Display, Error as StdError, From};
use futures::stream::LocalBoxStream;
use secrecy::SecretBox;
use tracerr::Traced;

#[cfg(feature = "rest")]
use crate::infra::rest;
use crate::domain::user;

/// External identity provider the application authenticates against.
pub trait AuthProvider {
    /// Looks up the currently persisted authentication session, if any.
    fn current_session(
        &self,
    ) -> impl Future<Output = Result<Option<AuthSession>, Traced<Error>>>;

    /// Signs a user in with the provided credentials.
    fn sign_in(
        &self,
        email: &user::Email,
        password: &SecretBox<user::Password>,
    ) -> impl Future<Output = Result<AuthSession, Traced<Error>>>;

    /// Registers a new user with the provided credentials.
    fn sign_up(
        &self,
        email: &user::Email,
        password: &SecretBox<user::Password>,
    ) -> impl Future<Output = Result<AuthSession, Traced<Error>>>;

    /// Revokes the current authentication session.
    fn sign_out(&self) -> impl Future<Output = Result<(), Traced<Error>>>;

    /// Sends a password reset email to the provided address.
    fn reset_password(
        &self,
        email: &user::Email,
    ) -> impl Future<Output = Result<(), Traced<Error>>>;

    /// Streams [`AuthChange`]s as the provider-side session appears,
    /// rotates or disappears.
    ///
    /// The stream is endless; dropping it stops observation.
    fn changes(&self) -> LocalBoxStream<'static, AuthChange>;
}

/// Provider-side authentication session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuthSession {
    /// ID of the authenticated user.
    pub user_id: user::Id,

    /// Email address the user authenticated with.
    pub email: user::Email,
}

/// Change of the provider-side authentication session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuthChange {
    /// A user signed in, or the session was refreshed for another user.
    SignedIn(AuthSession),

    /// The session was revoked or expired.
    SignedOut,
}

/// [`AuthProvider`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Provider rejected the credentials.
    #[display("Wrong credentials")]
    #[from(ignore)]
    WrongCredentials,

    /// Provider rejected the operation with the contained message.
    #[display("Identity provider rejected the operation: {_0}")]
    #[from(ignore)]
    Rejected(#[error(not(source))] String),

    #[cfg(feature = "rest")]
    /// REST transport error.
    #[display("REST transport error: {_0}")]
    Rest(rest::Error),
}
