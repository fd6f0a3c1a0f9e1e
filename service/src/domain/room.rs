//! [`Room`] definitions.

use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Room offered for rent.
#[derive(Clone, Debug)]
pub struct Room {
    /// ID of this [`Room`].
    pub id: Id,

    /// [`Title`] of this [`Room`].
    pub title: Title,

    /// [`Images`] of this [`Room`].
    pub images: Images,

    /// Monthly rental rate of this [`Room`].
    pub monthly_rate: Money,

    /// Number of persons this [`Room`] accommodates.
    pub capacity: Capacity,

    /// [`Status`] of this [`Room`].
    pub status: Status,

    /// Shortest [`RentalTerm`] this [`Room`] is offered for.
    pub min_term: RentalTerm,

    /// [`DateTimeOf`] when this [`Room`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Room`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Title of a [`Room`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Title(String);

impl Title {
    /// Creates a new [`Title`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `title` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    /// Creates a new [`Title`] if the given `title` is valid.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Option<Self> {
        let title = title.into();
        Self::check(&title).then_some(Self(title))
    }

    /// Checks whether the given `title` is a valid [`Title`].
    fn check(title: impl AsRef<str>) -> bool {
        let title = title.as_ref();
        title.trim() == title && !title.is_empty() && title.len() <= 512
    }
}

impl FromStr for Title {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Title`")
    }
}

/// Reference to an uploaded image of a [`Room`] in the object storage.
#[derive(AsRef, Clone, Debug, Display, Eq, From, Into, PartialEq)]
#[as_ref(str, String)]
#[from(&str, String)]
pub struct ImageRef(String);

/// Up to [`Images::MAX`] [`ImageRef`]s of a [`Room`].
#[derive(AsRef, Clone, Debug, Default, Eq, PartialEq)]
#[as_ref([ImageRef])]
pub struct Images(Vec<ImageRef>);

impl Images {
    /// Maximum number of [`ImageRef`]s a [`Room`] may carry.
    pub const MAX: usize = 5;

    /// Creates new [`Images`] if the given `refs` fit the limit.
    #[must_use]
    pub fn new(refs: Vec<ImageRef>) -> Option<Self> {
        (refs.len() <= Self::MAX).then_some(Self(refs))
    }

    /// Returns the primary (first) [`ImageRef`], if any.
    #[must_use]
    pub fn primary(&self) -> Option<&ImageRef> {
        self.0.first()
    }
}

/// Number of persons a [`Room`] accommodates.
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    From,
    Into,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Capacity(u8);

define_kind! {
    #[doc = "Status of a [`Room`]."]
    enum Status {
        #[doc = "Free to book."]
        Available = 1,

        #[doc = "Currently rented out."]
        Occupied = 2,

        #[doc = "Booked but not yet moved into."]
        Reserved = 3,

        #[doc = "Temporarily out of service."]
        Maintenance = 4,
    }
}

define_kind! {
    #[doc = "Rental term a [`Room`] is booked for."]
    enum RentalTerm {
        #[doc = "One month."]
        OneMonth = 1,

        #[doc = "Three months."]
        ThreeMonths = 2,

        #[doc = "Six months."]
        SixMonths = 3,

        #[doc = "One year."]
        OneYear = 4,
    }
}

impl RentalTerm {
    /// Returns the number of months this [`RentalTerm`] covers.
    #[must_use]
    pub const fn months(&self) -> u8 {
        match self {
            Self::OneMonth => 1,
            Self::ThreeMonths => 3,
            Self::SixMonths => 6,
            Self::OneYear => 12,
        }
    }
}

define_kind! {
    #[doc = "Occupancy choice of a room filter."]
    enum Occupancy {
        #[doc = "One person."]
        OnePerson = 1,

        #[doc = "Two persons."]
        TwoPersons = 2,

        #[doc = "Three persons."]
        ThreePersons = 3,

        #[doc = "Four or more persons."]
        FourOrMore = 4,
    }
}

impl Occupancy {
    /// Returns the minimum [`Capacity`] satisfying this [`Occupancy`].
    #[must_use]
    pub const fn persons(&self) -> u8 {
        match self {
            Self::OnePerson => 1,
            Self::TwoPersons => 2,
            Self::ThreePersons => 3,
            Self::FourOrMore => 4,
        }
    }
}

define_kind! {
    #[doc = "Monthly rate bracket of a room filter."]
    enum RateRange {
        #[doc = "Below 10,000 a month."]
        Below10000 = 1,

        #[doc = "Between 10,000 and 15,000 a month."]
        From10000To15000 = 2,

        #[doc = "Above 15,000 a month."]
        Above15000 = 3,
    }
}

impl RateRange {
    /// Checks whether the given monthly `rate` falls into this [`RateRange`].
    #[must_use]
    pub fn contains(&self, rate: &Money) -> bool {
        let amount = rate.amount;
        match self {
            Self::Below10000 => amount < Decimal::from(10_000),
            Self::From10000To15000 => {
                amount >= Decimal::from(10_000)
                    && amount <= Decimal::from(15_000)
            }
            Self::Above15000 => amount > Decimal::from(15_000),
        }
    }
}

/// [`DateTimeOf`] when a [`Room`] was created.
pub type CreationDateTime = DateTimeOf<(Room, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::{Currency, Money};

    use super::{ImageRef, Images, RateRange};

    #[test]
    fn images_enforce_limit() {
        let refs = |n: usize| {
            (0..n)
                .map(|i| ImageRef::from(format!("rooms/101/{i}.png")))
                .collect::<Vec<_>>()
        };

        assert!(Images::new(refs(0)).is_some());
        assert!(Images::new(refs(5)).is_some());
        assert!(Images::new(refs(6)).is_none());
    }

    #[test]
    fn rate_range_brackets() {
        let rate =
            |minor: i64| Money::from_minor_units(minor, Currency::Php);

        assert!(RateRange::Below10000.contains(&rate(999_900)));
        assert!(!RateRange::Below10000.contains(&rate(1_000_000)));
        assert!(RateRange::From10000To15000.contains(&rate(1_000_000)));
        assert!(RateRange::From10000To15000.contains(&rate(1_500_000)));
        assert!(RateRange::Above15000.contains(&rate(1_500_100)));
        assert!(!RateRange::Above15000.contains(&rate(1_500_000)));
    }
}
