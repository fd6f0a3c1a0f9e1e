//! [`CardProcessor`]-related definitions.

use std::{fmt, future::Future};

use derive_more::{AsRef, Display, Error as StdError, From, Into};
use secrecy::SecretString;
use tracerr::Traced;

#[cfg(feature = "rest")]
use crate::infra::rest;
use crate::domain::payment;

/// External card processor tokenizing payment methods and running
/// strong-authentication challenges.
pub trait CardProcessor {
    /// Tokenizes the provided [`CardDetails`] into a [`MethodId`].
    ///
    /// Raw card data never leaves this call.
    fn create_method(
        &self,
        card: CardDetails,
        billing: &payment::CustomerInfo,
    ) -> impl Future<Output = Result<MethodId, Traced<Error>>>;

    /// Completes the strong-authentication challenge of the payment intent
    /// behind the provided [`ClientSecret`].
    fn complete_challenge(
        &self,
        secret: &ClientSecret,
    ) -> impl Future<Output = Result<(), Traced<Error>>>;

    /// Verifies with the processor that the payment intent behind the
    /// provided [`Reference`] has been captured.
    ///
    /// [`Reference`]: payment::Reference
    fn verify_capture(
        &self,
        reference: &payment::Reference,
    ) -> impl Future<Output = Result<(), Traced<Error>>>;
}

/// Processor-issued identifier of a tokenized payment method.
#[derive(
    AsRef,
    Clone,
    Debug,
    Display,
    Eq,
    From,
    Into,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct MethodId(String);

/// Processor-issued secret authorizing client-side actions on a payment
/// intent, such as a strong-authentication challenge.
#[derive(
    AsRef, Clone, Eq, From, Into, PartialEq, serde::Deserialize,
    serde::Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct ClientSecret(String);

impl fmt::Debug for ClientSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ClientSecret(***)")
    }
}

/// Raw card details entered by the customer.
#[derive(Clone, Debug)]
pub struct CardDetails {
    /// Primary account number.
    pub number: SecretString,

    /// Expiration month, 1-based.
    pub exp_month: u8,

    /// Expiration year, four digits.
    pub exp_year: u16,

    /// Card verification code.
    pub cvc: SecretString,
}

/// [`CardProcessor`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Processor rejected the operation with the contained message.
    #[display("Card processor rejected the operation: {_0}")]
    #[from(ignore)]
    Rejected(#[error(not(source))] String),

    #[cfg(feature = "rest")]
    /// REST transport error.
    #[display("REST transport error: {_0}")]
    Rest(rest::Error),
}
