//! [`Room`]-related read definitions.

use common::{Currency, Money};

use crate::domain::{room, Room};

/// Presentation node of a [`Room`] in a catalog listing.
#[derive(Clone, Debug)]
pub struct RoomListing {
    /// ID of the [`Room`].
    pub id: room::Id,

    /// [`Title`] of the [`Room`].
    ///
    /// [`Title`]: room::Title
    pub title: room::Title,

    /// Primary image of the [`Room`], if it has any.
    pub image: Option<room::ImageRef>,

    /// Human-readable monthly rate, e.g. `₱5000/month`.
    pub price_display: String,

    /// [`Status`] of the [`Room`].
    ///
    /// [`Status`]: room::Status
    pub status: room::Status,

    /// Shortest [`RentalTerm`] the [`Room`] is offered for.
    ///
    /// [`RentalTerm`]: room::RentalTerm
    pub min_term: room::RentalTerm,

    /// Number of persons the [`Room`] accommodates.
    pub capacity: room::Capacity,
}

impl From<&Room> for RoomListing {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id,
            title: room.title.clone(),
            image: room.images.primary().cloned(),
            price_display: price_display(&room.monthly_rate),
            status: room.status,
            min_term: room.min_term,
            capacity: room.capacity,
        }
    }
}

/// Formats the provided monthly rate for a catalog listing.
fn price_display(rate: &Money) -> String {
    let amount = rate.amount.normalize();
    let symbol = match rate.currency {
        Currency::Php => "₱",
        Currency::Usd => "$",
        Currency::Eur => "€",
    };
    format!("{symbol}{amount}/month")
}

/// Filter of a [`Room`] catalog listing.
///
/// [`None`] criteria pass everything; set ones combine with logical AND.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Filter {
    /// Requested [`RentalTerm`].
    ///
    /// Matches [`Room`]s whose shortest offered term is not longer than
    /// the requested one.
    ///
    /// [`RentalTerm`]: room::RentalTerm
    pub rental_term: Option<room::RentalTerm>,

    /// Requested [`Occupancy`].
    ///
    /// [`Occupancy`]: room::Occupancy
    pub occupancy: Option<room::Occupancy>,

    /// Requested [`RateRange`].
    ///
    /// [`RateRange`]: room::RateRange
    pub rate_range: Option<room::RateRange>,
}

impl Filter {
    /// Indicates whether the provided [`Room`] passes this [`Filter`].
    #[must_use]
    pub fn matches(&self, room: &Room) -> bool {
        self.rental_term.map_or(true, |term| {
            room.min_term.months() <= term.months()
        }) && self.occupancy.map_or(true, |occupancy| {
            let capacity = u8::from(room.capacity);
            if occupancy == room::Occupancy::FourOrMore {
                capacity >= occupancy.persons()
            } else {
                capacity == occupancy.persons()
            }
        }) && self
            .rate_range
            .map_or(true, |range| range.contains(&room.monthly_rate))
    }
}

#[cfg(test)]
mod spec {
    use common::{Currency, Money};
    use rust_decimal::Decimal;

    use crate::domain::{room, Room};

    use super::{price_display, Filter, RoomListing};

    fn room(rate: i64, capacity: u8, min_term: room::RentalTerm) -> Room {
        Room {
            id: room::Id::new(),
            title: room::Title::new("Room 204").unwrap(),
            images: room::Images::new(vec![
                room::ImageRef::from("https://cdn.test/204-front.jpg"),
                room::ImageRef::from("https://cdn.test/204-side.jpg"),
            ])
            .unwrap(),
            monthly_rate: Money {
                amount: Decimal::from(rate),
                currency: Currency::Php,
            },
            capacity: capacity.into(),
            status: room::Status::Available,
            min_term,
            created_at: room::CreationDateTime::now(),
        }
    }

    #[test]
    fn empty_filter_passes_everything() {
        let filter = Filter::default();
        assert!(filter.matches(&room(5000, 1, room::RentalTerm::OneMonth)));
        assert!(filter.matches(&room(20_000, 6, room::RentalTerm::OneYear)));
    }

    #[test]
    fn term_matches_rooms_offered_for_shorter_or_equal_terms() {
        let filter = Filter {
            rental_term: Some(room::RentalTerm::SixMonths),
            ..Filter::default()
        };
        assert!(filter.matches(&room(5000, 1, room::RentalTerm::OneMonth)));
        assert!(filter.matches(&room(5000, 1, room::RentalTerm::SixMonths)));
        assert!(!filter.matches(&room(5000, 1, room::RentalTerm::OneYear)));
    }

    #[test]
    fn occupancy_matches_exactly_below_the_open_ended_bracket() {
        let filter = Filter {
            occupancy: Some(room::Occupancy::TwoPersons),
            ..Filter::default()
        };
        assert!(filter.matches(&room(5000, 2, room::RentalTerm::OneMonth)));
        assert!(!filter.matches(&room(5000, 3, room::RentalTerm::OneMonth)));

        let open_ended = Filter {
            occupancy: Some(room::Occupancy::FourOrMore),
            ..Filter::default()
        };
        assert!(open_ended.matches(&room(5000, 6, room::RentalTerm::OneMonth)));
        assert!(!open_ended.matches(&room(5000, 3, room::RentalTerm::OneMonth)));
    }

    #[test]
    fn criteria_combine_with_logical_and() {
        let filter = Filter {
            rental_term: Some(room::RentalTerm::OneYear),
            occupancy: Some(room::Occupancy::OnePerson),
            rate_range: Some(room::RateRange::Below10000),
        };
        assert!(filter.matches(&room(9500, 1, room::RentalTerm::OneMonth)));
        assert!(!filter.matches(&room(12_000, 1, room::RentalTerm::OneMonth)));
        assert!(!filter.matches(&room(9500, 2, room::RentalTerm::OneMonth)));
    }

    #[test]
    fn listing_shows_primary_image_and_formatted_rate() {
        let listing =
            RoomListing::from(&room(5000, 1, room::RentalTerm::OneMonth));
        assert_eq!(
            listing.image.as_ref().map(AsRef::as_ref),
            Some("https://cdn.test/204-front.jpg"),
        );
        assert_eq!(listing.price_display, "₱5000/month");
    }

    #[test]
    fn price_display_keeps_fractional_rates() {
        let rate = Money {
            amount: Decimal::new(750_050, 2),
            currency: Currency::Php,
        };
        assert_eq!(price_display(&rate), "₱7500.5/month");
    }
}
