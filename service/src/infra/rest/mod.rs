//! REST implementations of the infrastructure seams.
//!
//! [`Rest`] talks to three remote parties: a GoTrue-compatible identity
//! provider, a PostgREST-compatible data store, and a card processor with
//! its server-side intent endpoint in front.

mod auth;
mod card;
mod intent;
mod store;

use std::fmt;

use derive_more::{Display, Error as StdError, From};
use tokio::sync::watch;
use tracerr::Traced;

use crate::{domain::user, infra};

/// REST client implementing every infrastructure seam of the
/// [`Service`].
///
/// Cheap to [`Clone`]: the underlying connection pool and authentication
/// state are shared.
///
/// [`Service`]: crate::Service
#[derive(Clone, Debug)]
pub struct Rest {
    /// Underlying HTTP client.
    http: reqwest::Client,

    /// Endpoints and keys of the remote parties.
    config: Config,

    /// Provider-side authentication state, broadcast to
    /// [`AuthProvider::changes`] subscribers.
    ///
    /// [`AuthProvider::changes`]: infra::AuthProvider::changes
    auth: watch::Sender<Option<StoredAuth>>,
}

impl Rest {
    /// Creates a new [`Rest`] client with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the underlying HTTP client cannot be initialized.
    pub fn new(config: Config) -> Result<Self, Traced<infra::database::Error>> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        Ok(Self {
            http,
            config,
            auth: watch::Sender::new(None),
        })
    }

    /// Returns the currently stored [`StoredAuth`], if any.
    fn stored_auth(&self) -> Option<StoredAuth> {
        self.auth.borrow().clone()
    }

    /// Consumes a non-success `response`, extracting an [`Error::Status`]
    /// out of its body.
    async fn status_error(response: reqwest::Response) -> Error {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Error::Status {
            status,
            message: infra::intent::extract_error_message(status, &body),
        }
    }
}

/// Configuration of a [`Rest`] client.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the GoTrue-compatible identity provider.
    pub auth_url: String,

    /// Base URL of the PostgREST-compatible data store.
    pub store_url: String,

    /// API key sent to both the identity provider and the data store.
    pub api_key: String,

    /// Base URL of the card processor.
    pub processor_url: String,

    /// Publishable API key of the card processor.
    pub processor_key: String,

    /// URL of the server-side intent endpoint.
    pub intent_url: String,
}

/// Authentication state persisted by a [`Rest`] client after a successful
/// sign-in.
#[derive(Clone, Eq, PartialEq)]
struct StoredAuth {
    /// Bearer token authorizing data store calls.
    access_token: String,

    /// ID of the authenticated user.
    user_id: user::Id,

    /// Email address the user authenticated with.
    email: user::Email,
}

impl StoredAuth {
    /// Converts this [`StoredAuth`] into the provider-agnostic
    /// [`AuthSession`].
    ///
    /// [`AuthSession`]: infra::auth::AuthSession
    fn to_session(&self) -> infra::auth::AuthSession {
        infra::auth::AuthSession {
            user_id: self.user_id,
            email: self.email.clone(),
        }
    }
}

impl fmt::Debug for StoredAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredAuth")
            .field("access_token", &"***")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .finish()
    }
}

/// REST transport [`Error`].
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP transport failure.
    #[display("HTTP request failed: {_0}")]
    Http(reqwest::Error),

    /// Unexpected response status, with the message extracted out of its
    /// body.
    #[display("Unexpected response status {status}: {message}")]
    #[from(ignore)]
    Status {
        /// HTTP status code of the response.
        status: u16,

        /// Extracted or synthesized error message.
        message: String,
    },

    /// Malformed response payload.
    #[display("Malformed response payload: {_0}")]
    #[from(ignore)]
    Malformed(#[error(not(source))] String),
}
