//! [`Command`] definition.

pub mod create_user;
pub mod create_user_session;
pub mod destroy_user_session;
pub mod ensure_user_profile;
pub mod initialize_session;
pub mod reset_user_password;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_user::CreateUser, create_user_session::CreateUserSession,
    destroy_user_session::DestroyUserSession,
    ensure_user_profile::EnsureUserProfile,
    initialize_session::InitializeSession,
    reset_user_password::ResetUserPassword,
};
