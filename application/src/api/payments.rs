//! Payment endpoints: the recorded-payments table and checkout.

use std::fmt;

use axum::{
    extract::{Path, Query as QueryParams},
    response::{IntoResponse as _, Response},
    Extension, Json,
};
use common::PageNumber;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use service::{
    checkout,
    domain::{
        payment::{self, PaymentRecord, Stage},
        room, user,
    },
    infra::card,
    query::{self, GetRoom, ListPayments},
    Query as _,
};

use crate::{api, define_error, AsError, Error};

/// Query parameters of a `GET /payments` request.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Number of the page to return.
    pub page: Option<usize>,
}

/// Presentation of a [`PaymentRecord`] in a `GET /payments` response.
#[derive(Clone, Debug, Serialize)]
pub struct PaymentDto {
    /// ID of the paying tenant, if known.
    pub tenant_id: Option<user::Id>,

    /// ID of the booked room, if known.
    pub room_id: Option<room::Id>,

    /// ID of the user the record is attributed to.
    pub recorded_by: user::Id,

    /// RFC 3339 timestamp of the capture.
    pub payment_date: String,

    /// Captured amount, in major units.
    pub amount: String,

    /// Currency of the captured amount.
    pub currency: &'static str,

    /// Status of the payment.
    pub status: String,

    /// Processor-side reference of the payment.
    pub reference_no: String,

    /// Method of the payment.
    pub method: String,

    /// Free-form notes.
    pub notes: String,
}

impl From<PaymentRecord> for PaymentDto {
    fn from(record: PaymentRecord) -> Self {
        Self {
            tenant_id: record.tenant_id,
            room_id: record.room_id,
            recorded_by: record.recorded_by,
            payment_date: record.payment_date.to_rfc3339(),
            amount: record.amount.amount.to_string(),
            currency: record.amount.currency.code(),
            status: record.status.to_string(),
            reference_no: record.reference_no.into(),
            method: record.method.to_string(),
            notes: record.notes,
        }
    }
}

/// `GET /payments` handler, listing recorded payments newest first.
pub async fn list(
    Extension(service): Extension<crate::Service>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<api::PageDto<PaymentDto>>, Error> {
    let page = service
        .execute(ListPayments {
            page: PageNumber::new(params.page.unwrap_or(1)),
        })
        .await
        .map_err(|e| e.into_error())?;
    Ok(Json(page.map(PaymentDto::from).into()))
}

/// Body of a `POST /rooms/{id}/payments` request.
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// Raw card details entered by the customer.
    pub card: CardDto,

    /// Billing details of the paying customer.
    pub customer: CustomerDto,

    /// Rental term being paid for.
    pub rental_term: String,
}

/// Raw card details of a [`CheckoutRequest`].
#[derive(Deserialize)]
pub struct CardDto {
    /// Primary account number.
    pub number: String,

    /// Expiration month, 1-based.
    pub exp_month: u8,

    /// Expiration year, four digits.
    pub exp_year: u16,

    /// Card verification code.
    pub cvc: String,
}

impl fmt::Debug for CardDto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CardDto(***)")
    }
}

impl From<CardDto> for card::CardDetails {
    fn from(card: CardDto) -> Self {
        Self {
            number: SecretString::from(card.number),
            exp_month: card.exp_month,
            exp_year: card.exp_year,
            cvc: SecretString::from(card.cvc),
        }
    }
}

/// Billing details of a [`CheckoutRequest`].
#[derive(Clone, Debug, Deserialize)]
pub struct CustomerDto {
    /// Full name of the customer.
    pub full_name: String,

    /// Email address of the customer.
    pub email: String,

    /// Phone number of the customer.
    pub phone: String,
}

impl CustomerDto {
    /// Validates this [`CustomerDto`] into domain types.
    fn parse(self) -> Result<payment::CustomerInfo, Error> {
        Ok(payment::CustomerInfo {
            full_name: user::FullName::new(self.full_name)
                .ok_or_else(|| api::bad_request("invalid customer name"))?,
            email: user::Email::new(self.email.trim())
                .ok_or_else(|| api::bad_request("invalid email address"))?,
            phone: user::Phone::new(self.phone)
                .ok_or_else(|| api::bad_request("invalid phone number"))?,
        })
    }
}

/// Outcome of a `POST /rooms/{id}/payments` request.
#[derive(Clone, Debug, Serialize)]
pub struct CheckoutResponse {
    /// Stage the payment flow resolved at.
    pub stage: String,

    /// Processor-side reference of the payment, once an intent exists.
    pub reference: Option<String>,

    /// Warning of a captured but not yet recorded payment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// `POST /rooms/{id}/payments` handler, charging one month of the room's
/// rate and recording the captured payment.
///
/// A pre-capture decline answers `402` with the extracted reason; a
/// captured charge whose record could not be written answers `202` with
/// the reference to reconcile by.
pub async fn create(
    Extension(service): Extension<crate::Service>,
    Path(id): Path<room::Id>,
    Json(body): Json<CheckoutRequest>,
) -> Result<Response, Error> {
    define_error! {
        enum CheckoutError {
            #[code = "ROOM_NOT_FOUND"]
            #[status = NOT_FOUND]
            #[message = "Room with the provided ID is not exists"]
            RoomNotFound,

            #[code = "NOT_AUTHENTICATED"]
            #[status = UNAUTHORIZED]
            #[message = "Checkout requires a signed-in user"]
            NotAuthenticated,
        }
    }

    let session = service.sessions().snapshot();
    let tenant_id =
        session.identity.ok_or(CheckoutError::NotAuthenticated)?;

    let room = service
        .execute(GetRoom(id))
        .await
        .map_err(|e| e.into_error())?
        .ok_or(CheckoutError::RoomNotFound)?;
    let amount_minor = room
        .monthly_rate
        .to_minor_units()
        .ok_or_else(|| Error::internal(&"unrepresentable room rate"))?;
    let rental_term = body
        .rental_term
        .parse::<room::RentalTerm>()
        .map_err(|_| api::bad_request("invalid `rental_term` value"))?;
    let customer = body.customer.parse()?;
    let booking = payment::BookingInfo {
        room_id: Some(room.id),
        tenant_id: Some(tenant_id),
        room_title: room.title,
        rental_term,
    };

    let mut controller = service
        .checkout(booking, customer, amount_minor)
        .map_err(api::bad_request)?;
    let stage = controller
        .submit(body.card.into())
        .await
        .map_err(|e| Error::internal(&e))?;

    match stage {
        Stage::Failed(reason) => {
            return Err(Error {
                code: "PAYMENT_FAILED",
                status_code: http::StatusCode::PAYMENT_REQUIRED,
                message: reason.clone(),
                backtrace: None,
            });
        }
        Stage::Persisting => {}
        Stage::Entering
        | Stage::CreatingMethod
        | Stage::AwaitingServerIntent
        | Stage::ChallengeRequired
        | Stage::Confirming
        | Stage::Succeeded => {
            return Err(Error::internal(&"checkout resolved unexpectedly"));
        }
    }

    let reference = controller
        .flow()
        .external_reference()
        .map(ToString::to_string);
    match controller.persist(tenant_id).await {
        Ok(()) => Ok((
            http::StatusCode::CREATED,
            Json(CheckoutResponse {
                stage: controller.stage().to_string(),
                reference,
                warning: None,
            }),
        )
            .into_response()),
        Err(checkout::PersistError::Warning(w)) => Ok((
            http::StatusCode::ACCEPTED,
            Json(CheckoutResponse {
                stage: controller.stage().to_string(),
                reference,
                warning: Some(w.to_string()),
            }),
        )
            .into_response()),
        Err(checkout::PersistError::Transition(e)) => {
            Err(Error::internal(&e))
        }
    }
}

impl AsError for query::payments::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}
