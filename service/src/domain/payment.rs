//! Payment definitions: the booking checkout stage machine and the
//! persisted [`PaymentRecord`].

use common::{define_kind, unit, Currency, DateTimeOf, Money};
use derive_more::{AsRef, Display, Error, From, Into};
use serde::{Deserialize, Serialize};

use crate::domain::{room, user};

/// Positive amount of a payment, in minor units of its [`Currency`]
/// (e.g. centavos).
#[derive(Clone, Copy, Debug, Display, Eq, Into, PartialEq)]
pub struct Amount(i64);

impl Amount {
    /// Creates a new [`Amount`] if the given `minor` units are positive.
    #[must_use]
    pub fn new(minor: i64) -> Option<Self> {
        (minor > 0).then_some(Self(minor))
    }

    /// Returns this [`Amount`] in minor units.
    #[must_use]
    pub const fn minor_units(self) -> i64 {
        self.0
    }

    /// Converts this [`Amount`] into major-unit [`Money`] of the provided
    /// [`Currency`].
    #[must_use]
    pub fn to_money(self, currency: Currency) -> Money {
        Money::from_minor_units(self.0, currency)
    }
}

/// Billing details of the paying customer.
#[derive(Clone, Debug)]
pub struct CustomerInfo {
    /// Full name of the customer.
    pub full_name: user::FullName,

    /// Email address of the customer.
    pub email: user::Email,

    /// Phone number of the customer.
    pub phone: user::Phone,
}

/// Booking metadata a payment is attributed to.
#[derive(Clone, Debug)]
pub struct BookingInfo {
    /// ID of the booked [`Room`], if known.
    ///
    /// [`Room`]: room::Room
    pub room_id: Option<room::Id>,

    /// ID of the paying tenant, if known at checkout time.
    pub tenant_id: Option<user::Id>,

    /// Display title of the booked room.
    pub room_title: room::Title,

    /// [`room::RentalTerm`] being paid for.
    pub rental_term: room::RentalTerm,
}

/// Idempotent identifier tying a local payment attempt to the card
/// processor's record.
#[derive(
    AsRef,
    Clone,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct Reference(String);

/// Stage of a [`BookingPaymentIntent`].
///
/// Replaces the nested success/confirmation booleans of earlier revisions
/// with one tagged state, so overlapping combinations are unrepresentable.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Stage {
    /// Customer is entering payment details. No external call made yet.
    #[display("ENTERING")]
    Entering,

    /// Tokenizing the payment method with the card processor.
    #[display("CREATING_METHOD")]
    CreatingMethod,

    /// Waiting for the remote endpoint to create a payment intent.
    #[display("AWAITING_SERVER_INTENT")]
    AwaitingServerIntent,

    /// Strong-authentication challenge must be completed.
    #[display("CHALLENGE_REQUIRED")]
    ChallengeRequired,

    /// Confirming the payment with the processor. Still pre-capture: a
    /// failure here leaves no money moved.
    #[display("CONFIRMING")]
    Confirming,

    /// Writing the [`PaymentRecord`] to the external store. Arrival here
    /// is the irreversible boundary: the charge is externally captured.
    #[display("PERSISTING")]
    Persisting,

    /// Payment captured and persisted. Terminal.
    #[display("SUCCEEDED")]
    Succeeded,

    /// Payment failed before capture, with the processor's or server's
    /// reason. Terminal for this intent; retryable by re-submission with a
    /// fresh one.
    #[display("FAILED: {_0}")]
    Failed(String),
}

impl Stage {
    /// Indicates whether this [`Stage`] is terminal.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed(_))
    }

    /// Indicates whether the payment is externally captured at this
    /// [`Stage`].
    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Persisting | Self::Succeeded)
    }
}

/// Error of an invalid [`BookingPaymentIntent`] transition.
#[derive(Debug, Display, Error)]
pub enum TransitionError {
    /// Transition attempted from a [`Stage`] it is not defined for.
    #[display("cannot `{action}` while in stage `{stage}`")]
    UnexpectedStage {
        /// Action that was attempted.
        action: &'static str,

        /// [`Stage`] the intent was in.
        stage: Stage,
    },

    /// [`Reference`] is assigned exactly once per intent.
    #[display("external reference is already assigned")]
    ReferenceAlreadySet,

    /// Post-capture stages cannot fail into a retryable state: the money
    /// has moved.
    #[display("payment is already captured; persistence must be retried")]
    AlreadyCaptured,
}

/// Client-local intent to capture one booking payment, driven through its
/// [`Stage`]s by [`checkout::Controller`].
///
/// [`checkout::Controller`]: crate::checkout::Controller
#[derive(Clone, Debug)]
pub struct BookingPaymentIntent {
    /// [`Amount`] to capture.
    amount: Amount,

    /// [`Currency`] of the amount.
    currency: Currency,

    /// Booking this payment is attributed to.
    booking: BookingInfo,

    /// Paying customer.
    customer: CustomerInfo,

    /// Current [`Stage`].
    stage: Stage,

    /// Processor-side [`Reference`], set exactly once on intent-creation
    /// success.
    external_reference: Option<Reference>,

    /// Indicator whether a strong-authentication challenge was required.
    requires_challenge: bool,

    /// Message of the last error observed, if any.
    last_error: Option<String>,
}

impl BookingPaymentIntent {
    /// Creates a new [`BookingPaymentIntent`] in the [`Stage::Entering`]
    /// stage.
    #[must_use]
    pub fn new(
        booking: BookingInfo,
        customer: CustomerInfo,
        amount: Amount,
        currency: Currency,
    ) -> Self {
        Self {
            amount,
            currency,
            booking,
            customer,
            stage: Stage::Entering,
            external_reference: None,
            requires_challenge: false,
            last_error: None,
        }
    }

    /// Returns the [`Amount`] of this intent.
    #[must_use]
    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// Returns the [`Currency`] of this intent.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Returns the [`BookingInfo`] of this intent.
    #[must_use]
    pub fn booking(&self) -> &BookingInfo {
        &self.booking
    }

    /// Returns the [`CustomerInfo`] of this intent.
    #[must_use]
    pub fn customer(&self) -> &CustomerInfo {
        &self.customer
    }

    /// Returns the current [`Stage`] of this intent.
    #[must_use]
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Returns the processor-side [`Reference`], if assigned already.
    #[must_use]
    pub fn external_reference(&self) -> Option<&Reference> {
        self.external_reference.as_ref()
    }

    /// Indicates whether a strong-authentication challenge was required.
    #[must_use]
    pub fn requires_challenge(&self) -> bool {
        self.requires_challenge
    }

    /// Returns the message of the last error observed, if any.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// [`Stage::Entering`] → [`Stage::CreatingMethod`]: form submitted.
    ///
    /// # Errors
    ///
    /// Errors if the intent is not in [`Stage::Entering`] (a submission is
    /// already in flight, or the intent has resolved).
    pub fn begin_method_creation(&mut self) -> Result<(), TransitionError> {
        self.advance("begin_method_creation", Stage::Entering, |s| {
            s.stage = Stage::CreatingMethod;
        })
    }

    /// [`Stage::CreatingMethod`] → [`Stage::AwaitingServerIntent`]: a
    /// tokenized method reference was obtained.
    ///
    /// # Errors
    ///
    /// Errors on a stage mismatch.
    pub fn method_created(&mut self) -> Result<(), TransitionError> {
        self.advance("method_created", Stage::CreatingMethod, |s| {
            s.stage = Stage::AwaitingServerIntent;
        })
    }

    /// [`Stage::AwaitingServerIntent`] → [`Stage::ChallengeRequired`] or
    /// [`Stage::Confirming`]: the remote endpoint created the intent.
    ///
    /// Assigns the external [`Reference`] exactly once.
    ///
    /// # Errors
    ///
    /// Errors on a stage mismatch, or if a [`Reference`] is assigned
    /// already.
    pub fn intent_created(
        &mut self,
        reference: Reference,
        requires_challenge: bool,
    ) -> Result<(), TransitionError> {
        if self.external_reference.is_some() {
            return Err(TransitionError::ReferenceAlreadySet);
        }
        self.advance("intent_created", Stage::AwaitingServerIntent, |s| {
            s.external_reference = Some(reference);
            s.requires_challenge = requires_challenge;
            s.stage = if requires_challenge {
                Stage::ChallengeRequired
            } else {
                Stage::Confirming
            };
        })
    }

    /// [`Stage::ChallengeRequired`] → [`Stage::Confirming`]: the customer
    /// completed the strong-authentication challenge.
    ///
    /// # Errors
    ///
    /// Errors on a stage mismatch.
    pub fn challenge_completed(&mut self) -> Result<(), TransitionError> {
        self.advance("challenge_completed", Stage::ChallengeRequired, |s| {
            s.stage = Stage::Confirming;
        })
    }

    /// [`Stage::Confirming`] → [`Stage::Persisting`]: the processor
    /// reported the charge as captured.
    ///
    /// # Errors
    ///
    /// Errors on a stage mismatch.
    pub fn captured(&mut self) -> Result<(), TransitionError> {
        self.advance("captured", Stage::Confirming, |s| {
            s.stage = Stage::Persisting;
        })
    }

    /// [`Stage::Persisting`] → [`Stage::Succeeded`]: the [`PaymentRecord`]
    /// was written.
    ///
    /// # Errors
    ///
    /// Errors on a stage mismatch.
    pub fn persisted(&mut self) -> Result<(), TransitionError> {
        self.advance("persisted", Stage::Persisting, |s| {
            s.last_error = None;
            s.stage = Stage::Succeeded;
        })
    }

    /// Fails this intent with the provided pre-capture `reason`.
    ///
    /// # Errors
    ///
    /// Errors with [`TransitionError::AlreadyCaptured`] once
    /// [`Stage::Persisting`] has been reached: a failure there is a
    /// persistence warning, not a payment failure.
    pub fn failed(
        &mut self,
        reason: impl Into<String>,
    ) -> Result<(), TransitionError> {
        if self.stage.is_captured() {
            return Err(TransitionError::AlreadyCaptured);
        }
        let reason = reason.into();
        self.last_error = Some(reason.clone());
        self.stage = Stage::Failed(reason);
        Ok(())
    }

    /// Records a persistence failure without leaving [`Stage::Persisting`],
    /// so only the store write is retried.
    pub fn persistence_failed(&mut self, message: impl Into<String>) {
        debug_assert!(matches!(self.stage, Stage::Persisting));
        self.last_error = Some(message.into());
    }

    /// Applies `apply` if the intent is in the `expected` [`Stage`].
    fn advance(
        &mut self,
        action: &'static str,
        expected: Stage,
        apply: impl FnOnce(&mut Self),
    ) -> Result<(), TransitionError> {
        if self.stage != expected {
            return Err(TransitionError::UnexpectedStage {
                action,
                stage: self.stage.clone(),
            });
        }
        apply(self);
        Ok(())
    }
}

define_kind! {
    #[doc = "Status of a [`PaymentRecord`]."]
    enum Status {
        #[doc = "Captured and settled."]
        Paid = 1,

        #[doc = "Awaiting settlement."]
        Pending = 2,

        #[doc = "Capture failed."]
        Failed = 3,
    }
}

define_kind! {
    #[doc = "Method a payment was made with."]
    enum Method {
        #[doc = "Card payment through the processor."]
        Card = 1,
    }
}

/// Payment record written to the external store after capture.
#[derive(Clone, Debug)]
pub struct PaymentRecord {
    /// ID of the paying tenant, if known.
    pub tenant_id: Option<user::Id>,

    /// ID of the booked [`Room`], if known.
    ///
    /// [`Room`]: room::Room
    pub room_id: Option<room::Id>,

    /// ID of the user this record is attributed to.
    pub recorded_by: user::Id,

    /// [`DateTimeOf`] of the capture.
    pub payment_date: CaptureDateTime,

    /// Captured amount, in major units.
    pub amount: Money,

    /// [`Status`] of the payment.
    pub status: Status,

    /// Processor-side [`Reference`] for later reconciliation.
    pub reference_no: Reference,

    /// [`Method`] of the payment.
    pub method: Method,

    /// Free-form notes.
    pub notes: String,
}

/// [`DateTimeOf`] when a [`PaymentRecord`]'s charge was captured.
pub type CaptureDateTime = DateTimeOf<(PaymentRecord, unit::Capture)>;

#[cfg(test)]
mod spec {
    use common::Currency;

    use crate::domain::room;

    use super::{
        Amount, BookingInfo, BookingPaymentIntent, CustomerInfo, Reference,
        Stage, TransitionError,
    };

    fn intent() -> BookingPaymentIntent {
        BookingPaymentIntent::new(
            BookingInfo {
                room_id: None,
                tenant_id: None,
                room_title: "Room 101".parse().unwrap(),
                rental_term: room::RentalTerm::OneMonth,
            },
            CustomerInfo {
                full_name: "Juan dela Cruz".parse().unwrap(),
                email: "juan@example.com".parse().unwrap(),
                phone: "09123456789".parse().unwrap(),
            },
            Amount::new(500_000).unwrap(),
            Currency::Php,
        )
    }

    #[test]
    fn amount_must_be_positive() {
        assert!(Amount::new(0).is_none());
        assert!(Amount::new(-500).is_none());
        assert_eq!(Amount::new(500_000).unwrap().minor_units(), 500_000);
    }

    #[test]
    fn happy_path_without_challenge_skips_challenge_stage() {
        let mut i = intent();
        i.begin_method_creation().unwrap();
        i.method_created().unwrap();
        i.intent_created(Reference::from("pi_1"), false).unwrap();
        assert_eq!(*i.stage(), Stage::Confirming);
        i.captured().unwrap();
        i.persisted().unwrap();
        assert_eq!(*i.stage(), Stage::Succeeded);
        let reference = i.external_reference().unwrap();
        assert_eq!(AsRef::<str>::as_ref(reference), "pi_1");
        assert!(!i.requires_challenge());
    }

    #[test]
    fn challenge_path_visits_challenge_stage() {
        let mut i = intent();
        i.begin_method_creation().unwrap();
        i.method_created().unwrap();
        i.intent_created(Reference::from("pi_2"), true).unwrap();
        assert_eq!(*i.stage(), Stage::ChallengeRequired);
        i.challenge_completed().unwrap();
        i.captured().unwrap();
        i.persisted().unwrap();
        assert_eq!(*i.stage(), Stage::Succeeded);
    }

    #[test]
    fn server_failure_leaves_reference_unset() {
        let mut i = intent();
        i.begin_method_creation().unwrap();
        i.method_created().unwrap();
        i.failed("card_declined").unwrap();
        assert_eq!(*i.stage(), Stage::Failed("card_declined".into()));
        assert!(i.external_reference().is_none());
        assert_eq!(i.last_error(), Some("card_declined"));
    }

    #[test]
    fn reference_is_assigned_exactly_once() {
        let mut i = intent();
        i.begin_method_creation().unwrap();
        i.method_created().unwrap();
        i.intent_created(Reference::from("pi_3"), false).unwrap();
        assert!(matches!(
            i.intent_created(Reference::from("pi_4"), false),
            Err(TransitionError::ReferenceAlreadySet),
        ));
        let reference = i.external_reference().unwrap();
        assert_eq!(AsRef::<str>::as_ref(reference), "pi_3");
    }

    #[test]
    fn persistence_failure_stays_persisting_and_is_retryable() {
        let mut i = intent();
        i.begin_method_creation().unwrap();
        i.method_created().unwrap();
        i.intent_created(Reference::from("pi_5"), false).unwrap();
        i.captured().unwrap();

        i.persistence_failed("store unreachable");
        assert_eq!(*i.stage(), Stage::Persisting);
        assert_eq!(i.last_error(), Some("store unreachable"));
        let reference = i.external_reference().unwrap();
        assert_eq!(AsRef::<str>::as_ref(reference), "pi_5");

        i.persisted().unwrap();
        assert_eq!(*i.stage(), Stage::Succeeded);
        assert_eq!(i.last_error(), None);
    }

    #[test]
    fn confirmation_failure_is_still_a_payment_failure() {
        let mut i = intent();
        i.begin_method_creation().unwrap();
        i.method_created().unwrap();
        i.intent_created(Reference::from("pi_6"), false).unwrap();
        i.failed("confirmation failed").unwrap();
        assert_eq!(*i.stage(), Stage::Failed("confirmation failed".into()));
    }

    #[test]
    fn captured_intent_cannot_fail() {
        let mut i = intent();
        i.begin_method_creation().unwrap();
        i.method_created().unwrap();
        i.intent_created(Reference::from("pi_7"), false).unwrap();
        i.captured().unwrap();
        assert!(matches!(
            i.failed("too late"),
            Err(TransitionError::AlreadyCaptured),
        ));
    }

    #[test]
    fn double_submission_is_rejected() {
        let mut i = intent();
        i.begin_method_creation().unwrap();
        assert!(matches!(
            i.begin_method_creation(),
            Err(TransitionError::UnexpectedStage { .. }),
        ));
    }

    #[test]
    fn converts_to_major_units() {
        let money = Amount::new(500_000)
            .unwrap()
            .to_money(Currency::Php);
        assert_eq!(money.to_string(), "5000PHP");
    }
}
