//! Read entities definitions.

pub mod room;

pub use self::room::RoomListing;
