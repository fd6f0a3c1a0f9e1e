//! [`CardProcessor`] implementation of the [`Rest`] client.

use std::time::Duration;

use secrecy::ExposeSecret as _;
use serde::Deserialize;
use serde_json::json;
use tracerr::Traced;

use crate::{
    domain::payment,
    infra::card::{CardDetails, CardProcessor, ClientSecret, Error, MethodId},
};

use super::Rest;

/// Interval between the polls of a pending payment intent.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Maximum number of polls before a strong-authentication challenge is
/// considered abandoned.
const CHALLENGE_POLL_LIMIT: u32 = 150;

/// Maximum number of polls for a confirmed intent to settle.
const CAPTURE_POLL_LIMIT: u32 = 15;

impl CardProcessor for Rest {
    async fn create_method(
        &self,
        card: CardDetails,
        billing: &payment::CustomerInfo,
    ) -> Result<MethodId, Traced<Error>> {
        let url = format!("{}/payment_methods", self.config.processor_url);
        let body = json!({
            "data": {
                "attributes": {
                    "type": "card",
                    "details": {
                        "card_number": card.number.expose_secret(),
                        "exp_month": card.exp_month,
                        "exp_year": card.exp_year,
                        "cvc": card.cvc.expose_secret(),
                    },
                    "billing": {
                        "name": AsRef::<str>::as_ref(&billing.full_name),
                        "email": AsRef::<str>::as_ref(&billing.email),
                        "phone": AsRef::<str>::as_ref(&billing.phone),
                    },
                },
            },
        });
        let response = self
            .http
            .post(url)
            .basic_auth(&self.config.processor_key, None::<&str>)
            .json(&body)
            .send()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        if !response.status().is_success() {
            return Err(tracerr::new!(Error::Rejected(
                processor_error_message(&Self::status_error(response).await),
            )));
        }

        let method: MethodResource = response
            .json()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(method.data.id)
    }

    async fn complete_challenge(
        &self,
        secret: &ClientSecret,
    ) -> Result<(), Traced<Error>> {
        // Client secrets are shaped as `{intent_id}_client_{nonce}`.
        let id = AsRef::<str>::as_ref(secret)
            .split_once("_client")
            .map(|(id, _)| id)
            .ok_or_else(|| {
                tracerr::new!(Error::Rest(super::Error::Malformed(
                    "client secret".into()
                )))
            })?;
        let query =
            format!("?client_secret={}", AsRef::<str>::as_ref(secret));

        // The challenge itself is completed by the customer out of band;
        // this call waits for its outcome.
        for _ in 0..CHALLENGE_POLL_LIMIT {
            let intent = self
                .fetch_intent(id, &query)
                .await
                .map_err(tracerr::wrap!())?;
            match intent.status.as_str() {
                "awaiting_next_action" => {
                    tokio::time::sleep(POLL_INTERVAL).await;
                }
                "awaiting_payment_method" => {
                    return Err(tracerr::new!(Error::Rejected(
                        intent.failure_message(),
                    )));
                }
                _ => return Ok(()),
            }
        }
        Err(tracerr::new!(Error::Rejected(
            "authentication was not completed".into(),
        )))
    }

    async fn verify_capture(
        &self,
        reference: &payment::Reference,
    ) -> Result<(), Traced<Error>> {
        for _ in 0..CAPTURE_POLL_LIMIT {
            let intent = self
                .fetch_intent(reference.as_ref(), "")
                .await
                .map_err(tracerr::wrap!())?;
            match intent.status.as_str() {
                "succeeded" => return Ok(()),
                "processing" => tokio::time::sleep(POLL_INTERVAL).await,
                _ => {
                    return Err(tracerr::new!(Error::Rejected(
                        intent.failure_message(),
                    )));
                }
            }
        }
        Err(tracerr::new!(Error::Rejected(
            "payment did not settle in time".into(),
        )))
    }
}

impl Rest {
    /// Fetches the current attributes of the payment intent with the
    /// provided `id`.
    async fn fetch_intent(
        &self,
        id: &str,
        query: &str,
    ) -> Result<IntentAttributes, Traced<Error>> {
        let url = format!(
            "{}/payment_intents/{id}{query}",
            self.config.processor_url,
        );
        let response = self
            .http
            .get(url)
            .basic_auth(&self.config.processor_key, None::<&str>)
            .send()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        if !response.status().is_success() {
            return Err(tracerr::new!(Error::Rest(
                Self::status_error(response).await,
            )));
        }
        let intent: IntentResource = response
            .json()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> Error))?;
        Ok(intent.data.attributes)
    }
}

/// Extracts a human-readable message out of a card processor error.
fn processor_error_message(e: &super::Error) -> String {
    match e {
        super::Error::Status { message, .. } => message.clone(),
        super::Error::Http(..) | super::Error::Malformed(..) => e.to_string(),
    }
}

/// Payment method resource of the processor.
#[derive(Debug, Deserialize)]
struct MethodResource {
    /// Single resource payload.
    data: MethodData,
}

/// Data part of a [`MethodResource`].
#[derive(Debug, Deserialize)]
struct MethodData {
    /// Issued [`MethodId`].
    id: MethodId,
}

/// Payment intent resource of the processor.
#[derive(Debug, Deserialize)]
struct IntentResource {
    /// Single resource payload.
    data: IntentData,
}

/// Data part of an [`IntentResource`].
#[derive(Debug, Deserialize)]
struct IntentData {
    /// Attributes of the intent.
    attributes: IntentAttributes,
}

/// Attributes of a payment intent.
#[derive(Debug, Deserialize)]
struct IntentAttributes {
    /// Processor-side status of the intent.
    status: String,

    /// Failure reason of the last payment attempt, if any.
    #[serde(default)]
    last_payment_error: Option<String>,
}

impl IntentAttributes {
    /// Returns the failure message of this intent.
    fn failure_message(&self) -> String {
        self.last_payment_error
            .clone()
            .unwrap_or_else(|| format!("payment {}", self.status))
    }
}
