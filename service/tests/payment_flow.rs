//! Checkout flow tests against a scripted backend.

use std::{cell::RefCell, rc::Rc};

use common::operations::{By, Insert, Select};
use futures::stream::{self, LocalBoxStream, StreamExt as _};
use secrecy::SecretBox;
use service::{
    checkout::{PersistError, ValidationError},
    domain::{
        payment::{self, PaymentRecord, Stage},
        user, Profile,
    },
    infra::{
        auth::{AuthChange, AuthProvider, AuthSession},
        card::{CardDetails, CardProcessor, ClientSecret, MethodId},
        database,
        intent::{self, IntentEndpoint},
        Database,
    },
    Service,
};
use tracerr::Traced;

/// Scripted backend shared by a test and the [`Service`] under it.
#[derive(Clone, Debug, Default)]
struct Stub(Rc<RefCell<State>>);

#[derive(Debug, Default)]
struct State {
    /// Whether the created intent demands a challenge.
    requires_action: bool,

    /// Scripted non-success intent endpoint response.
    intent_failure: Option<(u16, String)>,

    /// Number of upcoming record inserts to fail.
    failing_inserts: u32,

    method_calls: u32,
    intent_calls: u32,
    challenge_calls: u32,
    verify_calls: u32,

    /// Successfully inserted payment records.
    records: Vec<PaymentRecord>,
}

impl Stub {
    fn state(&self) -> std::cell::Ref<'_, State> {
        self.0.borrow()
    }
}

impl CardProcessor for Stub {
    async fn create_method(
        &self,
        _: CardDetails,
        _: &payment::CustomerInfo,
    ) -> Result<MethodId, Traced<service::infra::card::Error>> {
        self.0.borrow_mut().method_calls += 1;
        Ok(MethodId::from("pm_stub"))
    }

    async fn complete_challenge(
        &self,
        _: &ClientSecret,
    ) -> Result<(), Traced<service::infra::card::Error>> {
        self.0.borrow_mut().challenge_calls += 1;
        Ok(())
    }

    async fn verify_capture(
        &self,
        _: &payment::Reference,
    ) -> Result<(), Traced<service::infra::card::Error>> {
        self.0.borrow_mut().verify_calls += 1;
        Ok(())
    }
}

impl IntentEndpoint for Stub {
    async fn create_intent(
        &self,
        _: intent::Request,
    ) -> Result<intent::Response, Traced<intent::Error>> {
        let mut state = self.0.borrow_mut();
        state.intent_calls += 1;
        if let Some((status, body)) = state.intent_failure.clone() {
            return Err(tracerr::new!(intent::Error::Rejected(
                intent::extract_error_message(status, &body),
            )));
        }
        Ok(intent::Response {
            payment_intent_id: payment::Reference::from("pi_stub"),
            requires_action: state.requires_action,
            client_secret: state
                .requires_action
                .then(|| ClientSecret::from("pi_stub_client_xyz")),
        })
    }
}

impl Database<Insert<PaymentRecord>> for Stub {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<PaymentRecord>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.borrow_mut();
        if state.failing_inserts > 0 {
            state.failing_inserts -= 1;
            return Err(tracerr::new!(database::Error::Rest(
                service::infra::rest::Error::Malformed(
                    "store unavailable".into(),
                ),
            )));
        }
        state.records.push(record);
        Ok(())
    }
}

// The `Service` constructor wires the auth relay, so the stub carries a
// no-op provider even though these tests never authenticate.
impl AuthProvider for Stub {
    async fn current_session(
        &self,
    ) -> Result<Option<AuthSession>, Traced<service::infra::auth::Error>>
    {
        Ok(None)
    }

    async fn sign_in(
        &self,
        _: &user::Email,
        _: &SecretBox<user::Password>,
    ) -> Result<AuthSession, Traced<service::infra::auth::Error>> {
        unimplemented!("not exercised")
    }

    async fn sign_up(
        &self,
        _: &user::Email,
        _: &SecretBox<user::Password>,
    ) -> Result<AuthSession, Traced<service::infra::auth::Error>> {
        unimplemented!("not exercised")
    }

    async fn sign_out(
        &self,
    ) -> Result<(), Traced<service::infra::auth::Error>> {
        Ok(())
    }

    async fn reset_password(
        &self,
        _: &user::Email,
    ) -> Result<(), Traced<service::infra::auth::Error>> {
        Ok(())
    }

    fn changes(&self) -> LocalBoxStream<'static, AuthChange> {
        stream::pending().boxed_local()
    }
}

impl Database<Select<By<Option<Profile>, user::Id>>> for Stub {
    type Ok = Option<Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Option<Profile>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(None)
    }
}

impl Database<Insert<Profile>> for Stub {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Insert<Profile>,
    ) -> Result<Self::Ok, Self::Err> {
        Ok(())
    }
}

fn service(stub: &Stub) -> Service<Stub> {
    let (service, _bg) = Service::new(service::Config::default(), stub.clone());
    service
}

fn booking() -> payment::BookingInfo {
    payment::BookingInfo {
        room_id: None,
        tenant_id: Some(recorder()),
        room_title: "Room 101".parse().unwrap(),
        rental_term: service::domain::room::RentalTerm::OneMonth,
    }
}

fn customer() -> payment::CustomerInfo {
    payment::CustomerInfo {
        full_name: "Juan dela Cruz".parse().unwrap(),
        email: "juan@example.com".parse().unwrap(),
        phone: "09123456789".parse().unwrap(),
    }
}

fn card() -> CardDetails {
    CardDetails {
        number: "4343434343434345".into(),
        exp_month: 12,
        exp_year: 2030,
        cvc: "123".into(),
    }
}

fn recorder() -> user::Id {
    "7d7a22c9-4f4e-49a7-8f8e-6a4f9d0e1b23".parse().unwrap()
}

#[tokio::test]
async fn charges_and_records_without_challenge() {
    let stub = Stub::default();
    let mut controller = service(&stub)
        .checkout(booking(), customer(), 500_000)
        .unwrap();

    let stage = controller.submit(card()).await.unwrap();
    assert_eq!(*stage, Stage::Persisting);
    controller.persist(recorder()).await.unwrap();
    assert_eq!(*controller.stage(), Stage::Succeeded);

    let state = stub.state();
    assert_eq!(
        (
            state.method_calls,
            state.intent_calls,
            state.challenge_calls,
            state.verify_calls,
        ),
        (1, 1, 0, 1),
    );
    let record = &state.records[0];
    assert_eq!(record.amount.to_string(), "5000PHP");
    assert_eq!(record.status, payment::Status::Paid);
    assert_eq!(AsRef::<str>::as_ref(&record.reference_no), "pi_stub");
    assert_eq!(record.recorded_by, recorder());
}

#[tokio::test]
async fn runs_challenge_when_the_intent_demands_one() {
    let stub = Stub::default();
    stub.0.borrow_mut().requires_action = true;
    let mut controller = service(&stub)
        .checkout(booking(), customer(), 500_000)
        .unwrap();

    let stage = controller.submit(card()).await.unwrap();
    assert_eq!(*stage, Stage::Persisting);
    assert!(controller.flow().requires_challenge());
    controller.persist(recorder()).await.unwrap();

    assert_eq!(stub.state().challenge_calls, 1);
    assert_eq!(*controller.stage(), Stage::Succeeded);
}

#[tokio::test]
async fn surfaces_declines_extracted_from_5xx_bodies() {
    let stub = Stub::default();
    stub.0.borrow_mut().intent_failure =
        Some((500, r#"{"error":"card_declined"}"#.into()));
    let mut controller = service(&stub)
        .checkout(booking(), customer(), 500_000)
        .unwrap();

    let stage = controller.submit(card()).await.unwrap();
    assert_eq!(*stage, Stage::Failed("card_declined".into()));
    assert!(controller.flow().external_reference().is_none());
    assert!(stub.state().records.is_empty());
}

#[tokio::test]
async fn retries_only_the_record_write_after_a_store_outage() {
    let stub = Stub::default();
    stub.0.borrow_mut().failing_inserts = 1;
    let mut controller = service(&stub)
        .checkout(booking(), customer(), 500_000)
        .unwrap();

    let stage = controller.submit(card()).await.unwrap();
    assert_eq!(*stage, Stage::Persisting);

    let warning = controller.persist(recorder()).await.unwrap_err();
    let PersistError::Warning(warning) = warning else {
        panic!("expected a persistence warning");
    };
    assert_eq!(AsRef::<str>::as_ref(&warning.reference), "pi_stub");
    assert_eq!(*controller.stage(), Stage::Persisting);

    controller.persist(recorder()).await.unwrap();
    assert_eq!(*controller.stage(), Stage::Succeeded);

    let state = stub.state();
    // The charge itself was never re-attempted.
    assert_eq!((state.method_calls, state.intent_calls), (1, 1));
    assert_eq!(state.records.len(), 1);
}

#[tokio::test]
async fn rejects_double_submission_without_side_effects() {
    let stub = Stub::default();
    let mut controller = service(&stub)
        .checkout(booking(), customer(), 500_000)
        .unwrap();

    _ = controller.submit(card()).await.unwrap();
    let calls_before = stub.state().intent_calls;

    assert!(controller.submit(card()).await.is_err());
    assert_eq!(stub.state().intent_calls, calls_before);
}

#[tokio::test]
async fn rejects_non_positive_amounts_locally() {
    let stub = Stub::default();
    assert_eq!(
        service(&stub)
            .checkout(booking(), customer(), 0)
            .err(),
        Some(ValidationError::NonPositiveAmount),
    );
    assert_eq!(stub.state().intent_calls, 0);
}
