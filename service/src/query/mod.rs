//! [`Query`] definition.

pub mod payments;
pub mod room;
pub mod rooms;

/// [`Query`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Query;

pub use self::{
    payments::ListPayments, room::GetRoom, rooms::ListRooms,
};
