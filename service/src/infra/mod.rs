//! Infrastructure layer.

pub mod auth;
pub mod card;
pub mod database;
pub mod intent;
#[cfg(feature = "rest")]
pub mod rest;

pub use self::{
    auth::AuthProvider, card::CardProcessor, database::Database,
    intent::IntentEndpoint,
};
#[cfg(feature = "rest")]
pub use self::rest::Rest;
