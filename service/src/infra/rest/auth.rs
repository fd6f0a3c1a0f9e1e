//! [`AuthProvider`] implementation of the [`Rest`] client.

use futures::{stream, stream::LocalBoxStream, StreamExt as _};
use secrecy::{ExposeSecret as _, SecretBox};
use serde::Deserialize;
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::user,
    infra::auth::{AuthChange, AuthProvider, AuthSession, Error},
};

use super::{Rest, StoredAuth};

impl AuthProvider for Rest {
    async fn current_session(
        &self,
    ) -> Result<Option<AuthSession>, Traced<Error>> {
        Ok(self.stored_auth().map(|a| a.to_session()))
    }

    async fn sign_in(
        &self,
        email: &user::Email,
        password: &SecretBox<user::Password>,
    ) -> Result<AuthSession, Traced<Error>> {
        let url = format!("{}/token?grant_type=password", self.config.auth_url);
        let stored = self
            .token_request(&url, email, password)
            .await
            .map_err(tracerr::wrap!())?;
        let session = stored.to_session();
        _ = self.auth.send_replace(Some(stored));
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &user::Email,
        password: &SecretBox<user::Password>,
    ) -> Result<AuthSession, Traced<Error>> {
        let url = format!("{}/signup", self.config.auth_url);
        let stored = self
            .token_request(&url, email, password)
            .await
            .map_err(tracerr::wrap!())?;
        let session = stored.to_session();
        _ = self.auth.send_replace(Some(stored));
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), Traced<Error>> {
        // Local state is cleared first, so observers see the sign-out even
        // if the revocation call fails.
        let stored = self.auth.send_replace(None);

        let Some(stored) = stored else {
            return Ok(());
        };
        let url = format!("{}/logout", self.config.auth_url);
        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.api_key)
            .bearer_auth(&stored.access_token)
            .send()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        if !response.status().is_success() {
            return Err(tracerr::new!(Error::Rest(
                Self::status_error(response).await
            )));
        }
        Ok(())
    }

    async fn reset_password(
        &self,
        email: &user::Email,
    ) -> Result<(), Traced<Error>> {
        let url = format!("{}/recover", self.config.auth_url);
        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.api_key)
            .json(&json!({ "email": AsRef::<str>::as_ref(email) }))
            .send()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        if !response.status().is_success() {
            return Err(tracerr::new!(Error::Rejected(
                auth_error_message(&Self::status_error(response).await)
            )));
        }
        Ok(())
    }

    fn changes(&self) -> LocalBoxStream<'static, AuthChange> {
        stream::unfold(self.auth.subscribe(), |mut rx| async move {
            rx.changed().await.ok()?;
            let change = rx.borrow_and_update().as_ref().map_or(
                AuthChange::SignedOut,
                |stored| AuthChange::SignedIn(stored.to_session()),
            );
            Some((change, rx))
        })
        .boxed_local()
    }
}

impl Rest {
    /// Performs a credentialed token-issuing request against the identity
    /// provider.
    async fn token_request(
        &self,
        url: &str,
        email: &user::Email,
        password: &SecretBox<user::Password>,
    ) -> Result<StoredAuth, Traced<Error>> {
        let response = self
            .http
            .post(url)
            .header("apikey", &self.config.api_key)
            .json(&json!({
                "email": AsRef::<str>::as_ref(email),
                "password": password.expose_secret().expose(),
            }))
            .send()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> Error))?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST
            || status == reqwest::StatusCode::UNAUTHORIZED
        {
            return Err(tracerr::new!(Error::WrongCredentials));
        }
        if !status.is_success() {
            return Err(tracerr::new!(Error::Rejected(auth_error_message(
                &Self::status_error(response).await
            ))));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        token.try_into().map_err(tracerr::wrap!())
    }
}

/// Extracts a human-readable message out of an identity provider error.
fn auth_error_message(e: &super::Error) -> String {
    match e {
        super::Error::Status { message, .. } => message.clone(),
        super::Error::Http(..) | super::Error::Malformed(..) => e.to_string(),
    }
}

/// Successful response of a token-issuing call.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    /// Issued bearer token.
    access_token: String,

    /// Authenticated user.
    user: UserPayload,
}

/// User part of a [`TokenResponse`].
#[derive(Debug, Deserialize)]
struct UserPayload {
    /// ID of the user.
    id: String,

    /// Email address of the user.
    email: String,
}

impl TryFrom<TokenResponse> for StoredAuth {
    type Error = Traced<Error>;

    fn try_from(token: TokenResponse) -> Result<Self, Self::Error> {
        let user_id = token.user.id.parse::<user::Id>().map_err(|e| {
            tracerr::new!(Error::Rest(super::Error::Malformed(format!(
                "user ID: {e}"
            ))))
        })?;
        let email = token.user.email.parse::<user::Email>().map_err(|e| {
            tracerr::new!(Error::Rest(super::Error::Malformed(format!(
                "user email: {e}"
            ))))
        })?;
        Ok(Self {
            access_token: token.access_token,
            user_id,
            email,
        })
    }
}
