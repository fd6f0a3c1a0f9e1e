//! [`IntentEndpoint`]-related definitions.

use std::future::Future;

use derive_more::{Display, Error as StdError, From};
use serde::{Deserialize, Serialize};
use tracerr::Traced;

#[cfg(feature = "rest")]
use crate::infra::rest;
use crate::{
    domain::payment,
    infra::card,
};

/// Server-side endpoint creating and confirming payment intents, so the
/// processor's secret key never reaches clients.
pub trait IntentEndpoint {
    /// Creates a payment intent for the provided [`Request`].
    fn create_intent(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, Traced<Error>>>;
}

/// Payload of an intent-creation call.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    /// Tokenized payment method to charge.
    pub payment_method_id: card::MethodId,

    /// Amount to capture, in minor units.
    pub amount: i64,

    /// Lowercase ISO 4217 code of the currency.
    pub currency: String,

    /// Billing details of the customer.
    pub customer_info: CustomerPayload,

    /// Booking the payment is attributed to.
    pub booking_info: BookingPayload,
}

impl Request {
    /// Assembles a [`Request`] out of the provided
    /// [`BookingPaymentIntent`] and [`MethodId`].
    ///
    /// [`BookingPaymentIntent`]: payment::BookingPaymentIntent
    /// [`MethodId`]: card::MethodId
    #[must_use]
    pub fn new(
        intent: &payment::BookingPaymentIntent,
        method: card::MethodId,
    ) -> Self {
        let customer = intent.customer();
        let booking = intent.booking();
        Self {
            payment_method_id: method,
            amount: intent.amount().minor_units(),
            currency: intent.currency().code().to_owned(),
            customer_info: CustomerPayload {
                name: customer.full_name.to_string(),
                email: customer.email.to_string(),
                phone: customer.phone.to_string(),
            },
            booking_info: BookingPayload {
                room_id: booking.room_id.map(|id| id.to_string()),
                tenant_id: booking.tenant_id.map(|id| id.to_string()),
                room_number: booking.room_title.to_string(),
                rental_term: booking.rental_term.to_string(),
            },
        }
    }
}

/// Customer part of a [`Request`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    /// Full name of the customer.
    pub name: String,

    /// Email address of the customer.
    pub email: String,

    /// Phone number of the customer.
    pub phone: String,
}

/// Booking part of a [`Request`].
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingPayload {
    /// ID of the booked room, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_id: Option<String>,

    /// ID of the paying tenant, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,

    /// Display number of the booked room.
    pub room_number: String,

    /// Rental term being paid for.
    pub rental_term: String,
}

/// Successful [`Response`] of an intent-creation call.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    /// Processor-side reference of the created intent.
    pub payment_intent_id: payment::Reference,

    /// Indicator whether a strong-authentication challenge is required.
    #[serde(default)]
    pub requires_action: bool,

    /// Secret authorizing the client-side challenge, present when
    /// [`requires_action`] is set.
    ///
    /// [`requires_action`]: Response::requires_action
    #[serde(default)]
    pub client_secret: Option<card::ClientSecret>,
}

/// [`IntentEndpoint`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// Endpoint rejected the intent with the contained human-readable
    /// message.
    #[display("Payment intent rejected: {_0}")]
    #[from(ignore)]
    Rejected(#[error(not(source))] String),

    #[cfg(feature = "rest")]
    /// REST transport error.
    #[display("REST transport error: {_0}")]
    Rest(rest::Error),
}

/// Extracts a human-readable error message out of a non-success response
/// `body`, falling back to a generic message mentioning the `status`.
///
/// Any HTTP status may carry a meaningful JSON `error` field, including
/// `5xx` ones.
#[must_use]
pub fn extract_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error")?.as_str().map(str::to_owned))
        .unwrap_or_else(|| format!("server error (status {status})"))
}

#[cfg(test)]
mod spec {
    use super::extract_error_message;

    #[test]
    fn prefers_error_field_of_json_body() {
        assert_eq!(
            extract_error_message(400, r#"{"error":"amount too small"}"#),
            "amount too small",
        );
    }

    #[test]
    fn reads_error_field_of_5xx_bodies_too() {
        assert_eq!(
            extract_error_message(500, r#"{"error":"card_declined"}"#),
            "card_declined",
        );
    }

    #[test]
    fn falls_back_on_non_json_body() {
        assert_eq!(
            extract_error_message(502, "<html>Bad Gateway</html>"),
            "server error (status 502)",
        );
    }

    #[test]
    fn falls_back_when_error_field_is_missing_or_not_a_string() {
        assert_eq!(
            extract_error_message(500, r#"{"message":"oops"}"#),
            "server error (status 500)",
        );
        assert_eq!(
            extract_error_message(500, r#"{"error":{"code":1}}"#),
            "server error (status 500)",
        );
    }
}
