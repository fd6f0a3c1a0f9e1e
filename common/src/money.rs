//! [`Money`]-related definitions.

use std::{fmt, str::FromStr};

use rust_decimal::{prelude::ToPrimitive as _, Decimal};

use crate::define_kind;

/// Amount of money in some [`Currency`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Money {
    /// Amount of this [`Money`] in major units.
    pub amount: Decimal,

    /// [`Currency`] of this amount.
    pub currency: Currency,
}

impl Money {
    /// Creates a new [`Money`] from an amount expressed in minor units of the
    /// provided [`Currency`] (e.g. centavos for [`Currency::Php`]).
    #[must_use]
    pub fn from_minor_units(minor: i64, currency: Currency) -> Self {
        Self {
            amount: Decimal::new(minor, 2),
            currency,
        }
    }

    /// Returns the amount of this [`Money`] in minor units.
    ///
    /// [`None`] is returned if the amount does not fit into [`i64`] minor
    /// units.
    #[must_use]
    pub fn to_minor_units(&self) -> Option<i64> {
        (self.amount * Decimal::ONE_HUNDRED).to_i64()
    }

    /// Indicates whether the amount of this [`Money`] is positive.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { amount, currency } = self;
        if amount.is_integer() {
            write!(f, "{}{currency}", amount.to_i128().expect("integer"))
        } else {
            write!(f, "{amount}{currency}")
        }
    }
}

impl FromStr for Money {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 4 {
            return Err("too short");
        }

        let (amount, currency) = s.split_at(s.len() - 3);
        let amount = Decimal::from_str(amount).map_err(|_| "invalid amount")?;
        let currency =
            Currency::from_str(currency).map_err(|_| "invalid currency")?;

        Ok(Self { amount, currency })
    }
}

define_kind! {
    #[doc = "Currency of a [`Money`] amount."]
    enum Currency {
        #[doc = "Philippine Peso."]
        Php = 1,

        #[doc = "US Dollar."]
        Usd = 2,

        #[doc = "Euro."]
        Eur = 3,
    }
}

impl Currency {
    /// Returns the lowercase [ISO 4217] code of this [`Currency`], as
    /// expected by card processors.
    ///
    /// [ISO 4217]: https://wikipedia.org/wiki/ISO_4217
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Php => "php",
            Self::Usd => "usd",
            Self::Eur => "eur",
        }
    }
}

#[cfg(test)]
mod spec {
    use std::str::FromStr as _;

    use rust_decimal::Decimal;

    use super::{Currency, Money};

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn from_str() {
        assert_eq!(
            Money::from_str("123.45PHP").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Php,
            },
        );

        assert_eq!(
            Money::from_str("123.45USD").unwrap(),
            Money {
                amount: decimal("123.45"),
                currency: Currency::Usd,
            },
        );

        assert!(Money::from_str("123.45").is_err());
        assert!(Money::from_str("123.45Ph").is_err());
        assert!(Money::from_str("123.45Pesos").is_err());

        assert!(Money::from_str("123.00PHP").is_ok());
        assert!(Money::from_str("123PHP").is_ok());
    }

    #[test]
    fn to_string() {
        assert_eq!(
            Money {
                amount: decimal("123.45"),
                currency: Currency::Php,
            }
            .to_string(),
            "123.45PHP",
        );

        assert_eq!(
            Money {
                amount: decimal("123.00"),
                currency: Currency::Eur,
            }
            .to_string(),
            "123EUR",
        );
    }

    #[test]
    fn converts_minor_units() {
        let m = Money::from_minor_units(500_000, Currency::Php);
        assert_eq!(m.amount, decimal("5000.00"));
        assert_eq!(m.to_string(), "5000PHP");
        assert_eq!(m.to_minor_units(), Some(500_000));

        let m = Money::from_minor_units(12_345, Currency::Usd);
        assert_eq!(m.amount, decimal("123.45"));
        assert_eq!(m.to_minor_units(), Some(12_345));
    }

    #[test]
    fn positivity() {
        assert!(Money::from_minor_units(1, Currency::Php).is_positive());
        assert!(!Money::from_minor_units(0, Currency::Php).is_positive());
        assert!(!Money::from_minor_units(-500, Currency::Php).is_positive());
    }
}
