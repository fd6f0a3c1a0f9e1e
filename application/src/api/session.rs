//! Session endpoints.

use axum::{Extension, Json};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{
        self, CreateUser, CreateUserSession, DestroyUserSession,
        ResetUserPassword,
    },
    domain::{user, Session},
    infra::auth,
    Command as _,
};

use crate::{api, define_error, AsError, Error};

/// State of the current [`Session`], as reported by the API.
#[derive(Clone, Debug, Serialize)]
pub struct SessionDto {
    /// Indicator whether the initial session lookup has completed.
    pub checked: bool,

    /// Indicator whether an identity is attached.
    pub authenticated: bool,

    /// ID of the signed-in user, if any.
    pub user_id: Option<String>,

    /// Role of the session.
    pub role: String,
}

impl From<Session> for SessionDto {
    fn from(session: Session) -> Self {
        Self {
            checked: session.checked,
            authenticated: session.is_authenticated(),
            user_id: session.identity.map(|id| id.to_string()),
            role: session.role.to_string(),
        }
    }
}

/// Credentials of a sign-in or sign-up request.
#[derive(Debug, Deserialize)]
pub struct Credentials {
    /// Email address of the user.
    pub email: String,

    /// Password of the user.
    pub password: String,
}

impl Credentials {
    /// Validates these [`Credentials`] into domain types.
    fn parse(
        self,
    ) -> Result<(user::Email, SecretBox<user::Password>), Error> {
        let email = user::Email::new(self.email.trim())
            .ok_or_else(|| api::bad_request("invalid email address"))?;
        let password = user::Password::new(self.password)
            .ok_or_else(|| api::bad_request("invalid password"))?;
        Ok((email, SecretBox::new(Box::new(password))))
    }
}

/// `GET /session` handler, reporting the current [`Session`] snapshot.
pub async fn show(
    Extension(service): Extension<crate::Service>,
) -> Json<SessionDto> {
    Json(service.sessions().snapshot().into())
}

/// `POST /login` handler.
pub async fn login(
    Extension(service): Extension<crate::Service>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<SessionDto>, Error> {
    let (email, password) = credentials.parse()?;
    let session = service
        .execute(CreateUserSession { email, password })
        .await
        .map_err(|e| e.into_error())?;
    Ok(Json(session.into()))
}

/// `POST /signup` handler.
pub async fn signup(
    Extension(service): Extension<crate::Service>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<SessionDto>, Error> {
    let (email, password) = credentials.parse()?;
    let session = service
        .execute(CreateUser { email, password })
        .await
        .map_err(|e| e.into_error())?;
    Ok(Json(session.into()))
}

/// `POST /logout` handler.
pub async fn logout(
    Extension(service): Extension<crate::Service>,
) -> Result<Json<SessionDto>, Error> {
    service
        .execute(DestroyUserSession)
        .await
        .map_err(|e| e.into_error())?;
    Ok(Json(service.sessions().snapshot().into()))
}

/// Body of a `POST /password-resets` request.
#[derive(Debug, Deserialize)]
pub struct PasswordReset {
    /// Email address to send the reset link to.
    pub email: String,
}

/// `POST /password-resets` handler.
pub async fn reset_password(
    Extension(service): Extension<crate::Service>,
    Json(body): Json<PasswordReset>,
) -> Result<http::StatusCode, Error> {
    let email = user::Email::new(body.email.trim())
        .ok_or_else(|| api::bad_request("invalid email address"))?;
    service
        .execute(ResetUserPassword { email })
        .await
        .map_err(|e| e.into_error())?;
    Ok(http::StatusCode::ACCEPTED)
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        define_error! {
            enum Error {
                #[code = "WRONG_CREDENTIALS"]
                #[status = FORBIDDEN]
                #[message = "Provided credentials does not match any user"]
                WrongCredentials,
            }
        }

        match self {
            Self::WrongCredentials => Some(Error::WrongCredentials.into()),
            Self::Auth(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Auth(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::destroy_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Auth(e) => e.try_as_error(),
        }
    }
}

impl AsError for command::reset_user_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Auth(e) => e.try_as_error(),
        }
    }
}

impl AsError for auth::Error {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::WrongCredentials => Some(Error {
                code: "WRONG_CREDENTIALS",
                status_code: http::StatusCode::FORBIDDEN,
                message: self.to_string(),
                backtrace: None,
            }),
            Self::Rejected(message) => Some(Error {
                code: "REJECTED",
                status_code: http::StatusCode::UNPROCESSABLE_ENTITY,
                message: message.clone(),
                backtrace: None,
            }),
            Self::Rest(_) => None,
        }
    }
}
