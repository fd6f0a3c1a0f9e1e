//! Room catalog endpoints.

use std::str::FromStr;

use axum::{
    extract::{Path, Query as QueryParams},
    Extension, Json,
};
use common::PageNumber;
use serde::{Deserialize, Serialize};
use service::{
    domain::{room, Room},
    query::{self, GetRoom, ListRooms},
    read, Query as _,
};

use crate::{api, define_error, AsError, Error};

/// Query parameters of a `GET /rooms` request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListParams {
    /// Number of the page to return.
    pub page: Option<usize>,

    /// Requested rental term.
    pub rental_term: Option<String>,

    /// Requested occupancy.
    pub occupancy: Option<String>,

    /// Requested monthly rate range.
    pub rate_range: Option<String>,
}

impl ListParams {
    /// Parses these [`ListParams`] into a [`ListRooms`] query.
    fn parse(self) -> Result<ListRooms, Error> {
        Ok(ListRooms {
            criteria: read::room::Filter {
                rental_term: parse_criterion(
                    "rental_term",
                    self.rental_term.as_deref(),
                )?,
                occupancy: parse_criterion(
                    "occupancy",
                    self.occupancy.as_deref(),
                )?,
                rate_range: parse_criterion(
                    "rate_range",
                    self.rate_range.as_deref(),
                )?,
            },
            page: PageNumber::new(self.page.unwrap_or(1)),
        })
    }
}

/// Parses an optional filter criterion, passing absent ones through.
fn parse_criterion<T: FromStr>(
    name: &str,
    raw: Option<&str>,
) -> Result<Option<T>, Error> {
    raw.map(|s| {
        s.parse()
            .map_err(|_| api::bad_request(format!("invalid `{name}` value")))
    })
    .transpose()
}

/// Presentation of a [`RoomListing`] in a `GET /rooms` response.
///
/// [`RoomListing`]: read::RoomListing
#[derive(Clone, Debug, Serialize)]
pub struct ListingDto {
    /// ID of the room.
    pub id: room::Id,

    /// Title of the room.
    pub title: String,

    /// Primary image of the room, if it has any.
    pub image: Option<String>,

    /// Human-readable monthly rate.
    pub price_display: String,

    /// Status of the room.
    pub status: String,

    /// Shortest rental term the room is offered for.
    pub min_term: String,

    /// Number of persons the room accommodates.
    pub capacity: u8,
}

impl From<read::RoomListing> for ListingDto {
    fn from(listing: read::RoomListing) -> Self {
        Self {
            id: listing.id,
            title: listing.title.to_string(),
            image: listing.image.map(Into::into),
            price_display: listing.price_display,
            status: listing.status.to_string(),
            min_term: listing.min_term.to_string(),
            capacity: listing.capacity.into(),
        }
    }
}

/// `GET /rooms` handler, listing the catalog filtered and paginated.
pub async fn list(
    Extension(service): Extension<crate::Service>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<api::PageDto<ListingDto>>, Error> {
    let query = params.parse()?;
    let page = service
        .execute(query)
        .await
        .map_err(|e| e.into_error())?;
    Ok(Json(page.map(ListingDto::from).into()))
}

/// Presentation of a [`Room`] in a `GET /rooms/{id}` response.
#[derive(Clone, Debug, Serialize)]
pub struct RoomDto {
    /// ID of the room.
    pub id: room::Id,

    /// Title of the room.
    pub title: String,

    /// Images of the room.
    pub images: Vec<String>,

    /// Monthly rental rate, in major units.
    pub monthly_rate: String,

    /// Currency of the monthly rate.
    pub currency: &'static str,

    /// Number of persons the room accommodates.
    pub capacity: u8,

    /// Status of the room.
    pub status: String,

    /// Shortest rental term the room is offered for.
    pub min_term: String,

    /// RFC 3339 timestamp of when the room was created.
    pub created_at: String,
}

impl From<Room> for RoomDto {
    fn from(room: Room) -> Self {
        Self {
            id: room.id,
            title: room.title.to_string(),
            images: AsRef::<[room::ImageRef]>::as_ref(&room.images)
                .iter()
                .map(ToString::to_string)
                .collect(),
            monthly_rate: room.monthly_rate.amount.to_string(),
            currency: room.monthly_rate.currency.code(),
            capacity: room.capacity.into(),
            status: room.status.to_string(),
            min_term: room.min_term.to_string(),
            created_at: room.created_at.to_rfc3339(),
        }
    }
}

/// `GET /rooms/{id}` handler.
pub async fn show(
    Extension(service): Extension<crate::Service>,
    Path(id): Path<room::Id>,
) -> Result<Json<RoomDto>, Error> {
    define_error! {
        enum NotFound {
            #[code = "ROOM_NOT_FOUND"]
            #[status = NOT_FOUND]
            #[message = "Room with the provided ID is not exists"]
            Room,
        }
    }

    let room = service
        .execute(GetRoom(id))
        .await
        .map_err(|e| e.into_error())?
        .ok_or(NotFound::Room)?;
    Ok(Json(room.into()))
}

impl AsError for query::rooms::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}

impl AsError for query::room::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}
