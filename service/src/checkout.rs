//! Checkout driver of a [`BookingPaymentIntent`].

use common::operations::Insert;
use derive_more::{Display, Error as StdError, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{
        payment::{
            self, BookingPaymentIntent, Stage, TransitionError,
        },
        user,
    },
    infra::{card, database, intent, CardProcessor, Database, IntentEndpoint},
    Service,
};

/// Driver of a single [`BookingPaymentIntent`] through its [`Stage`]s.
///
/// [`submit`] performs every pre-capture step and stops at
/// [`Stage::Persisting`] (captured) or [`Stage::Failed`]; [`persist`]
/// writes the [`PaymentRecord`] and may be retried on its own, so a store
/// outage never re-charges the customer.
///
/// [`PaymentRecord`]: payment::PaymentRecord
/// [`persist`]: Controller::persist
/// [`submit`]: Controller::submit
#[derive(Debug)]
pub struct Controller<B> {
    /// Backend performing the external calls.
    backend: B,

    /// Driven [`BookingPaymentIntent`].
    flow: BookingPaymentIntent,

    /// [`ClientSecret`] of the created intent, present while a
    /// strong-authentication challenge is pending.
    ///
    /// [`ClientSecret`]: card::ClientSecret
    client_secret: Option<card::ClientSecret>,
}

impl<B> Service<B> {
    /// Starts a checkout of the provided booking.
    ///
    /// # Errors
    ///
    /// With a [`ValidationError`] if the entered amount cannot be charged.
    pub fn checkout(
        &self,
        booking: payment::BookingInfo,
        customer: payment::CustomerInfo,
        amount_minor: i64,
    ) -> Result<Controller<B>, ValidationError>
    where
        B: Clone,
    {
        let amount = payment::Amount::new(amount_minor)
            .ok_or(ValidationError::NonPositiveAmount)?;
        Ok(Controller {
            backend: self.backend().clone(),
            flow: BookingPaymentIntent::new(
                booking,
                customer,
                amount,
                self.config().currency,
            ),
            client_secret: None,
        })
    }
}

impl<B> Controller<B> {
    /// Returns the driven [`BookingPaymentIntent`].
    #[must_use]
    pub fn flow(&self) -> &BookingPaymentIntent {
        &self.flow
    }

    /// Returns the current [`Stage`] of the driven flow.
    #[must_use]
    pub fn stage(&self) -> &Stage {
        self.flow.stage()
    }
}

impl<B> Controller<B>
where
    B: CardProcessor + IntentEndpoint,
{
    /// Submits the entered [`CardDetails`], driving the flow up to the
    /// capture boundary.
    ///
    /// External failures resolve the flow into [`Stage::Failed`] with the
    /// extracted reason; they are a returned [`Stage`], not an [`Err`].
    ///
    /// # Errors
    ///
    /// Only with a [`TransitionError`] when the flow is not in
    /// [`Stage::Entering`] (double submission, or a resolved flow). The
    /// flow is left untouched then.
    ///
    /// [`CardDetails`]: card::CardDetails
    pub async fn submit(
        &mut self,
        card: card::CardDetails,
    ) -> Result<&Stage, TransitionError> {
        self.flow.begin_method_creation()?;
        if let Err(reason) = self.drive(card).await {
            log::warn!(%reason, "checkout failed before capture");
            self.flow.failed(reason)?;
        }
        Ok(self.flow.stage())
    }

    /// Performs the external pre-capture steps, returning the failure
    /// reason to resolve the flow with.
    async fn drive(
        &mut self,
        card: card::CardDetails,
    ) -> Result<(), String> {
        let method = self
            .backend
            .create_method(card, self.flow.customer())
            .await
            .map_err(|e| card_failure(&e))?;
        // Raw card details are dropped at this point; only the tokenized
        // method travels further.
        if self.flow.method_created().is_err() {
            return Err("flow desynchronized".into());
        }

        let request = intent::Request::new(&self.flow, method);
        let response = self
            .backend
            .create_intent(request)
            .await
            .map_err(|e| intent_failure(&e))?;
        let reference = response.payment_intent_id.clone();
        self.client_secret = response.client_secret;
        if self
            .flow
            .intent_created(response.payment_intent_id, response.requires_action)
            .is_err()
        {
            return Err("flow desynchronized".into());
        }

        if self.flow.requires_challenge() {
            let secret = self
                .client_secret
                .as_ref()
                .ok_or_else(|| "missing client secret".to_owned())?;
            self.backend
                .complete_challenge(secret)
                .await
                .map_err(|e| card_failure(&e))?;
            if self.flow.challenge_completed().is_err() {
                return Err("flow desynchronized".into());
            }
        }

        self.backend
            .verify_capture(&reference)
            .await
            .map_err(|e| card_failure(&e))?;
        if self.flow.captured().is_err() {
            return Err("flow desynchronized".into());
        }
        self.client_secret = None;
        Ok(())
    }
}

impl<B> Controller<B>
where
    B: Database<
        Insert<payment::PaymentRecord>,
        Ok = (),
        Err = Traced<database::Error>,
    >,
{
    /// Writes the [`PaymentRecord`] of the captured flow, attributed to
    /// `recorded_by`.
    ///
    /// Retryable: a failure leaves the flow in [`Stage::Persisting`] and
    /// re-attempts only this write, never the charge.
    ///
    /// # Errors
    ///
    /// - [`PersistError::Transition`] when the flow is not captured yet.
    /// - [`PersistError::Warning`] when the store write fails after the
    ///   charge has been captured.
    ///
    /// [`PaymentRecord`]: payment::PaymentRecord
    pub async fn persist(
        &mut self,
        recorded_by: user::Id,
    ) -> Result<(), PersistError> {
        if *self.flow.stage() != Stage::Persisting {
            return Err(TransitionError::UnexpectedStage {
                action: "persist",
                stage: self.flow.stage().clone(),
            }
            .into());
        }
        let Some(reference) = self.flow.external_reference().cloned() else {
            // Unreachable past `intent_created`, but the reference is what
            // reconciliation hinges on, so never guess one.
            return Err(TransitionError::UnexpectedStage {
                action: "persist",
                stage: self.flow.stage().clone(),
            }
            .into());
        };

        let booking = self.flow.booking();
        let record = payment::PaymentRecord {
            tenant_id: booking.tenant_id,
            room_id: booking.room_id,
            recorded_by,
            payment_date: payment::CaptureDateTime::now(),
            amount: self.flow.amount().to_money(self.flow.currency()),
            status: payment::Status::Paid,
            reference_no: reference.clone(),
            method: payment::Method::Card,
            notes: format!(
                "{} - {}",
                booking.room_title,
                booking.rental_term,
            ),
        };

        if let Err(e) = self.backend.execute(Insert(record)).await {
            let message = e.as_ref().to_string();
            log::warn!(
                reference = %reference,
                %message,
                "payment captured but not recorded",
            );
            self.flow.persistence_failed(message.clone());
            return Err(PersistenceWarning { reference, message }.into());
        }

        // Transition cannot fail: the stage was checked above and `self`
        // is borrowed exclusively.
        drop(self.flow.persisted());
        Ok(())
    }
}

/// Extracts the failure reason of a [`CardProcessor`] error.
fn card_failure(e: &Traced<card::Error>) -> String {
    match e.as_ref() {
        card::Error::Rejected(reason) => reason.clone(),
        #[cfg(feature = "rest")]
        card::Error::Rest(rest) => rest.to_string(),
    }
}

/// Extracts the failure reason of an [`IntentEndpoint`] error.
fn intent_failure(e: &Traced<intent::Error>) -> String {
    match e.as_ref() {
        intent::Error::Rejected(reason) => reason.clone(),
        #[cfg(feature = "rest")]
        intent::Error::Rest(rest) => rest.to_string(),
    }
}

/// Error of entering a checkout with unchargeable input.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq, StdError)]
pub enum ValidationError {
    /// Amount is zero or negative.
    #[display("payment amount must be positive")]
    NonPositiveAmount,
}

/// Error of a [`Controller::persist`] call.
#[derive(Debug, Display, From, StdError)]
pub enum PersistError {
    /// Flow is not at the capture boundary.
    #[display("{_0}")]
    Transition(TransitionError),

    /// Charge is captured, but its record was not written.
    #[display("{_0}")]
    Warning(PersistenceWarning),
}

/// Captured-but-unrecorded payment, carrying the [`Reference`] needed for
/// manual reconciliation.
///
/// [`Reference`]: payment::Reference
#[derive(Clone, Debug, Display, StdError)]
#[display("payment `{reference}` captured but not recorded: {message}")]
pub struct PersistenceWarning {
    /// Processor-side [`Reference`] of the captured payment.
    ///
    /// [`Reference`]: payment::Reference
    pub reference: payment::Reference,

    /// Message of the store failure.
    pub message: String,
}
