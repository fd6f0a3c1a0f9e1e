//! [`Database`] implementations of the [`Rest`] client, talking to a
//! PostgREST-compatible data store.

use common::{
    operations::{By, Insert, Select},
    DateTimeOf, Money,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracerr::Traced;

use crate::{
    domain::{payment, room, user, Profile, Room},
    infra::{database, Database},
};

use super::Rest;

impl Database<Select<By<Option<Profile>, user::Id>>> for Rest {
    type Ok = Option<Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Profile>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let rows: Vec<ProfileRow> = self
            .select(&format!("profiles?user_id=eq.{id}&limit=1"))
            .await
            .map_err(tracerr::wrap!())?;
        rows.into_iter()
            .next()
            .map(Profile::try_from)
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Insert<Profile>> for Rest {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(profile): Insert<Profile>,
    ) -> Result<Self::Ok, Self::Err> {
        self.insert("profiles", &ProfileRow::from(&profile))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Insert<payment::PaymentRecord>> for Rest {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(record): Insert<payment::PaymentRecord>,
    ) -> Result<Self::Ok, Self::Err> {
        self.insert("payments", &PaymentRow::from(&record))
            .await
            .map_err(tracerr::wrap!())
    }
}

impl Database<Select<By<Vec<payment::PaymentRecord>, ()>>> for Rest {
    type Ok = Vec<payment::PaymentRecord>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<payment::PaymentRecord>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let rows: Vec<PaymentRow> = self
            .select("payments?select=*&order=payment_date.desc")
            .await
            .map_err(tracerr::wrap!())?;
        rows.into_iter()
            .map(payment::PaymentRecord::try_from)
            .collect::<Result<_, _>>()
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Select<By<Vec<Room>, ()>>> for Rest {
    type Ok = Vec<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        _: Select<By<Vec<Room>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let rows: Vec<RoomRow> = self
            .select("rooms?select=*&order=created_at.desc")
            .await
            .map_err(tracerr::wrap!())?;
        rows.into_iter()
            .map(Room::try_from)
            .collect::<Result<_, _>>()
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Database<Select<By<Option<Room>, room::Id>>> for Rest {
    type Ok = Option<Room>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Room>, room::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        let rows: Vec<RoomRow> = self
            .select(&format!("rooms?id=eq.{id}&limit=1"))
            .await
            .map_err(tracerr::wrap!())?;
        rows.into_iter()
            .next()
            .map(Room::try_from)
            .transpose()
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }
}

impl Rest {
    /// Performs a `GET` against the data store, decoding the rows.
    async fn select<Row: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<Vec<Row>, Traced<database::Error>> {
        let response = self
            .store_request(reqwest::Method::GET, path)
            .send()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        if !response.status().is_success() {
            return Err(tracerr::new!(database::Error::Rest(
                Self::status_error(response).await,
            )));
        }
        response
            .json()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> database::Error))
    }

    /// Performs a `POST` of the provided `row` against the data store.
    async fn insert<Row: Serialize>(
        &self,
        table: &str,
        row: &Row,
    ) -> Result<(), Traced<database::Error>> {
        let response = self
            .store_request(reqwest::Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await
            .map_err(super::Error::from)
            .map_err(tracerr::from_and_wrap!(=> database::Error))?;
        if !response.status().is_success() {
            return Err(tracerr::new!(database::Error::Rest(
                Self::status_error(response).await,
            )));
        }
        Ok(())
    }

    /// Prepares a data store request with the API key and, when signed in,
    /// the bearer token attached.
    fn store_request(
        &self,
        method: reqwest::Method,
        path: &str,
    ) -> reqwest::RequestBuilder {
        let mut request = self
            .http
            .request(method, format!("{}/{path}", self.config.store_url))
            .header("apikey", &self.config.api_key);
        if let Some(auth) = self.stored_auth() {
            request = request.bearer_auth(&auth.access_token);
        }
        request
    }
}

/// Row of the `profiles` table.
#[derive(Debug, Deserialize, Serialize)]
struct ProfileRow {
    /// ID of the user the profile belongs to.
    user_id: String,

    /// Role of the user.
    role: String,

    /// RFC 3339 timestamp of the profile creation.
    created_at: String,

    /// RFC 3339 timestamp of the last profile update.
    updated_at: String,
}

impl From<&Profile> for ProfileRow {
    fn from(profile: &Profile) -> Self {
        Self {
            user_id: profile.user_id.to_string(),
            role: profile.role.to_string(),
            created_at: profile.created_at.to_rfc3339(),
            updated_at: profile.updated_at.to_rfc3339(),
        }
    }
}

impl TryFrom<ProfileRow> for Profile {
    type Error = super::Error;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: parse(&row.user_id, "profiles.user_id")?,
            role: parse(&row.role, "profiles.role")?,
            created_at: timestamp(&row.created_at, "profiles.created_at")?,
            updated_at: timestamp(&row.updated_at, "profiles.updated_at")?,
        })
    }
}

/// Row of the `payments` table.
#[derive(Debug, Deserialize, Serialize)]
struct PaymentRow {
    /// ID of the paying tenant, if known.
    tenant_id: Option<String>,

    /// ID of the booked room, if known.
    room_id: Option<String>,

    /// ID of the user the payment is attributed to.
    recorded_by: String,

    /// RFC 3339 timestamp of the capture.
    payment_date: String,

    /// Captured amount, in major units.
    amount: Decimal,

    /// Currency of the amount.
    currency: String,

    /// Status of the payment.
    status: String,

    /// Processor-side reference.
    reference_no: String,

    /// Method of the payment.
    method: String,

    /// Free-form notes.
    notes: String,
}

impl From<&payment::PaymentRecord> for PaymentRow {
    fn from(record: &payment::PaymentRecord) -> Self {
        Self {
            tenant_id: record.tenant_id.map(|id| id.to_string()),
            room_id: record.room_id.map(|id| id.to_string()),
            recorded_by: record.recorded_by.to_string(),
            payment_date: record.payment_date.to_rfc3339(),
            amount: record.amount.amount,
            currency: record.amount.currency.to_string(),
            status: status_label(record.status).to_owned(),
            reference_no: record.reference_no.to_string(),
            method: record.method.to_string(),
            notes: record.notes.clone(),
        }
    }
}

impl TryFrom<PaymentRow> for payment::PaymentRecord {
    type Error = super::Error;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        let tenant_id = row
            .tenant_id
            .as_deref()
            .map(|id| parse(id, "payments.tenant_id"))
            .transpose()?;
        let room_id = row
            .room_id
            .as_deref()
            .map(|id| parse(id, "payments.room_id"))
            .transpose()?;
        Ok(Self {
            tenant_id,
            room_id,
            recorded_by: parse(&row.recorded_by, "payments.recorded_by")?,
            payment_date: timestamp(
                &row.payment_date,
                "payments.payment_date",
            )?,
            amount: Money {
                amount: row.amount,
                currency: parse(&row.currency, "payments.currency")?,
            },
            status: parse_status(&row.status)
                .ok_or_else(|| malformed("payments.status"))?,
            reference_no: row.reference_no.into(),
            method: parse(&row.method, "payments.method")?,
            notes: row.notes,
        })
    }
}

/// Row of the `rooms` table.
#[derive(Debug, Deserialize, Serialize)]
struct RoomRow {
    /// ID of the room.
    id: String,

    /// Title of the room.
    title: String,

    /// Image URLs of the room, primary first.
    #[serde(default)]
    image_urls: Vec<String>,

    /// Monthly rental rate, in major units.
    monthly_rate: Decimal,

    /// Currency of the rate.
    currency: String,

    /// Number of persons the room accommodates.
    capacity: u8,

    /// Status of the room.
    status: String,

    /// Shortest rental term the room is offered for.
    min_term: String,

    /// RFC 3339 timestamp of the room creation.
    created_at: String,
}

impl TryFrom<RoomRow> for Room {
    type Error = super::Error;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        let images = room::Images::new(
            row.image_urls.into_iter().map(room::ImageRef::from).collect(),
        )
        .ok_or_else(|| malformed("rooms.image_urls"))?;
        Ok(Self {
            id: parse(&row.id, "rooms.id")?,
            title: room::Title::new(row.title)
                .ok_or_else(|| malformed("rooms.title"))?,
            images,
            monthly_rate: Money {
                amount: row.monthly_rate,
                currency: parse(&row.currency, "rooms.currency")?,
            },
            capacity: row.capacity.into(),
            status: parse(&row.status, "rooms.status")?,
            min_term: parse(&row.min_term, "rooms.min_term")?,
            created_at: timestamp(&row.created_at, "rooms.created_at")?,
        })
    }
}

/// Parses a [`FromStr`] column, mapping failures to a [`Malformed`] error
/// naming the `column`.
///
/// [`FromStr`]: std::str::FromStr
/// [`Malformed`]: super::Error::Malformed
fn parse<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> Result<T, super::Error> {
    value.parse().map_err(|_| malformed(column))
}

/// Parses an RFC 3339 timestamp column.
fn timestamp<Of: ?Sized>(
    value: &str,
    column: &str,
) -> Result<DateTimeOf<Of>, super::Error> {
    DateTimeOf::from_rfc3339(value).map_err(|_| malformed(column))
}

/// Creates a [`Malformed`] error naming the `column`.
///
/// [`Malformed`]: super::Error::Malformed
fn malformed(column: &str) -> super::Error {
    super::Error::Malformed(column.to_owned())
}

/// Returns the store label of the provided [`payment::Status`].
///
/// The store keeps human-cased labels rather than the
/// SCREAMING_SNAKE_CASE wire names.
fn status_label(status: payment::Status) -> &'static str {
    match status {
        payment::Status::Paid => "Paid",
        payment::Status::Pending => "Pending",
        payment::Status::Failed => "Failed",
    }
}

/// Parses a store label into a [`payment::Status`], case-insensitively.
fn parse_status(label: &str) -> Option<payment::Status> {
    [
        payment::Status::Paid,
        payment::Status::Pending,
        payment::Status::Failed,
    ]
    .into_iter()
    .find(|s| status_label(*s).eq_ignore_ascii_case(label))
}
