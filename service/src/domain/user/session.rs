//! [`Session`] definitions.

use crate::domain::user::{self, Role};

/// Client session snapshot: the current authenticated identity and role.
///
/// Starts unchecked; no routing decision may be finalized until the initial
/// session lookup completes and flips [`checked`].
///
/// [`checked`]: Session::checked
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Session {
    /// ID of the authenticated user, if any.
    pub identity: Option<user::Id>,

    /// [`Role`] of the user. [`Role::Tenant`] while unauthenticated.
    pub role: Role,

    /// Indicator whether the initial session lookup has completed.
    pub checked: bool,
}

impl Session {
    /// Creates a [`Session`] of an authenticated user.
    #[must_use]
    pub fn authenticated(identity: user::Id, role: Role) -> Self {
        Self {
            identity: Some(identity),
            role,
            checked: true,
        }
    }

    /// Creates a checked [`Session`] of an anonymous user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            identity: None,
            role: Role::default(),
            checked: true,
        }
    }

    /// Indicates whether this [`Session`] belongs to an authenticated user.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self {
            identity: None,
            role: Role::default(),
            checked: false,
        }
    }
}
