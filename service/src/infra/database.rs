//! [`Database`]-related definitions.

use derive_more::{Display, Error as StdError, From};

#[cfg(feature = "rest")]
use crate::infra::rest;

/// Database operation.
pub use common::Handler as Database;

/// [`Database`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    #[cfg(feature = "rest")]
    /// REST transport error.
    #[display("REST transport error: {_0}")]
    Rest(rest::Error),
}
