//! Background [`Task`]s definitions.

mod background;
pub mod relay_auth_changes;

pub use common::Handler as Task;

pub use self::{
    background::Background, relay_auth_changes::RelayAuthChanges,
};
