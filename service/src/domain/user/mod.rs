//! User-related definitions.

pub mod session;

use std::{fmt, sync::LazyLock};

use common::{define_kind, unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// ID of a user, issued by the external auth provider.
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

define_kind! {
    #[doc = "Role of a user, gating route access."]
    enum Role {
        #[doc = "A tenant browsing and booking rooms. Least-privilege \
                 default."]
        Tenant = 1,

        #[doc = "An administrator of the back office."]
        Admin = 2,
    }
}

impl Default for Role {
    fn default() -> Self {
        Self::Tenant
    }
}

/// Role profile of a user, stored in the external relational store.
///
/// Created lazily with a default [`Role`] on the first lookup miss
/// (get-or-create policy).
#[derive(Clone, Copy, Debug)]
pub struct Profile {
    /// ID of the user this [`Profile`] belongs to.
    pub user_id: Id,

    /// [`Role`] of the user.
    pub role: Role,

    /// [`DateTimeOf`] when this [`Profile`] was created.
    pub created_at: CreationDateTime,

    /// [`DateTimeOf`] when this [`Profile`] was last updated.
    pub updated_at: ModificationDateTime,
}

impl Profile {
    /// Creates a new default-[`Role`] [`Profile`] for the provided user.
    #[must_use]
    pub fn new(user_id: Id) -> Self {
        let now = DateTimeOf::<()>::now();
        Self {
            user_id,
            role: Role::default(),
            created_at: now.coerce(),
            updated_at: now.coerce(),
        }
    }
}

/// Full name of a user.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct FullName(String);

impl FullName {
    /// Creates a new [`FullName`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `name` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a new [`FullName`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`FullName`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 512
    }
}

impl FromStr for FullName {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `FullName`")
    }
}

/// Email address of a user.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `address` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Creates a new [`Email`] if the given `address` is valid.
    ///
    /// Surrounding whitespace is trimmed before validation, matching what
    /// the auth provider is fed on sign-in/sign-up.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into().trim().to_owned();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 320 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Phone number of a user.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq)]
#[as_ref(str, String)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `number` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(number: impl Into<String>) -> Self {
        Self(number.into())
    }

    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^([+]?\d{1,2}[-\s]?|)\d{3}[-\s]?\d{3}[-\s]?\d{4}$")
                .expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Password of a user.
#[derive(Clone, Eq, From, PartialEq)]
#[from(&str, String)]
pub struct Password(String);

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

impl Password {
    /// Creates a new [`Password`].
    ///
    /// # Safety
    ///
    /// The caller must ensure that the given `password` matches the format.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub unsafe fn new_unchecked(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        password.len() > 5 && password.len() <= 128
    }

    /// Exposes this [`Password`] as a [`str`].
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// [`DateTimeOf`] when a [`Profile`] was created.
pub type CreationDateTime = DateTimeOf<(Profile, unit::Creation)>;

/// [`DateTimeOf`] when a [`Profile`] was last updated.
pub type ModificationDateTime = DateTimeOf<(Profile, unit::Modification)>;

#[cfg(test)]
mod spec {
    use super::{Email, Phone, Profile, Role};

    #[test]
    fn role_round_trips_through_wire_names() {
        assert_eq!("TENANT".parse::<Role>().unwrap(), Role::Tenant);
        assert_eq!(Role::Admin.to_string(), "ADMIN");
        assert!("OWNER".parse::<Role>().is_err());
    }

    #[test]
    fn new_profile_defaults_to_tenant() {
        let profile = Profile::new(super::Id::new());

        assert_eq!(profile.role, Role::Tenant);
        assert_eq!(
            profile.created_at.to_rfc3339(),
            profile.updated_at.to_rfc3339(),
        );
    }

    #[test]
    fn email_trims_and_validates() {
        assert_eq!(
            Email::new("  tenant@example.com ").unwrap().to_string(),
            "tenant@example.com",
        );
        assert!(Email::new("not-an-email").is_none());
        assert!(Email::new("a@b").is_none());
    }

    #[test]
    fn phone_accepts_local_formats() {
        assert!(Phone::new("09123456789").is_some());
        assert!(Phone::new("+63 912 345 6789").is_some());
        assert!(Phone::new("12345").is_none());
    }
}
