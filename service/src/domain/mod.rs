//! Domain definitions.

pub mod payment;
pub mod room;
pub mod user;

pub use self::{
    payment::BookingPaymentIntent,
    room::Room,
    user::{Profile, Session},
};
