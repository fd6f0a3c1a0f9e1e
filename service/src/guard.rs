//! Route access decisions.
//!
//! [`decide`] is a pure function of a [`Requirement`] and a [`Session`]
//! snapshot, so every rule here is testable without any transport.

use derive_more::Display;

use crate::domain::{user::Role, Session};

/// Known navigation target.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Route {
    /// Landing page.
    #[display("/")]
    Root,

    /// Sign-in form.
    #[display("/login")]
    Login,

    /// Registration form.
    #[display("/signup")]
    Signup,

    /// Tenant dashboard.
    #[display("/home")]
    Home,

    /// Room catalog.
    #[display("/rooms")]
    Rooms,

    /// Profile page of the signed-in user.
    #[display("/profile")]
    Profile,

    /// Notifications page.
    #[display("/notifications")]
    Notifications,

    /// Administration dashboard.
    #[display("/admin")]
    Admin,
}

impl Route {
    /// Returns the path this [`Route`] is served at.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Root => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Home => "/home",
            Self::Rooms => "/rooms",
            Self::Profile => "/profile",
            Self::Notifications => "/notifications",
            Self::Admin => "/admin",
        }
    }
}

/// Access requirement of a [`Route`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Requirement {
    /// Indicator whether an authenticated [`Session`] is required.
    pub requires_auth: bool,

    /// Exact [`Role`] required, if any. Implies [`requires_auth`].
    ///
    /// [`requires_auth`]: Requirement::requires_auth
    pub requires_role: Option<Role>,

    /// Indicator whether only anonymous visitors may enter (sign-in and
    /// registration forms).
    pub public_only: bool,
}

impl Requirement {
    /// [`Requirement`] of a route anyone may visit at any time.
    #[must_use]
    pub const fn public() -> Self {
        Self {
            requires_auth: false,
            requires_role: None,
            public_only: false,
        }
    }

    /// [`Requirement`] of a route for authenticated users of any [`Role`].
    #[must_use]
    pub const fn authenticated() -> Self {
        Self {
            requires_auth: true,
            requires_role: None,
            public_only: false,
        }
    }

    /// [`Requirement`] of a route for authenticated users of the exact
    /// `role`.
    #[must_use]
    pub const fn role(role: Role) -> Self {
        Self {
            requires_auth: true,
            requires_role: Some(role),
            public_only: false,
        }
    }

    /// [`Requirement`] of a route for anonymous visitors only.
    #[must_use]
    pub const fn public_only() -> Self {
        Self {
            requires_auth: false,
            requires_role: None,
            public_only: true,
        }
    }

    /// Indicates whether this [`Requirement`] constrains access at all.
    #[must_use]
    pub const fn is_unconstrained(&self) -> bool {
        !self.requires_auth
            && self.requires_role.is_none()
            && !self.public_only
    }
}

/// Outcome of a [`decide`] call.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Decision {
    /// Session state is not known yet; hold navigation and re-evaluate once
    /// the initial lookup completes.
    Defer,

    /// Navigation may proceed.
    Allow,

    /// Navigation must be redirected to the contained [`Route`].
    Redirect(Route),
}

/// Decides whether a [`Session`] may enter a [`Route`] guarded by the given
/// [`Requirement`].
///
/// Rules, in order:
/// 1. Unconstrained routes always [`Decision::Allow`], even before the
///    initial session lookup completes.
/// 2. Any constrained route [`Decision::Defer`]s until the session is
///    checked. An unchecked session never produces a redirect.
/// 3. Public-only routes redirect authenticated users to their
///    [`role_home`], and allow everyone else.
/// 4. Routes requiring authentication redirect anonymous visitors to
///    [`Route::Login`].
/// 5. Routes requiring an exact [`Role`] redirect users of any other role
///    to their own [`role_home`].
#[must_use]
pub fn decide(requirement: Requirement, session: Session) -> Decision {
    if requirement.is_unconstrained() {
        return Decision::Allow;
    }
    if !session.checked {
        return Decision::Defer;
    }
    if requirement.public_only {
        return if session.is_authenticated() {
            Decision::Redirect(role_home(session.role))
        } else {
            Decision::Allow
        };
    }
    if (requirement.requires_auth || requirement.requires_role.is_some())
        && !session.is_authenticated()
    {
        return Decision::Redirect(Route::Login);
    }
    if let Some(role) = requirement.requires_role {
        if session.role != role {
            return Decision::Redirect(role_home(session.role));
        }
    }
    Decision::Allow
}

/// Returns the home [`Route`] of the given [`Role`].
#[must_use]
pub fn role_home(role: Role) -> Route {
    match role {
        Role::Admin => Route::Admin,
        Role::Tenant => Route::Home,
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{user::Role, Session};

    use super::{decide, role_home, Decision, Requirement, Route};

    fn admin() -> Session {
        Session::authenticated(
            "b49f84a8-2f68-4b1c-8e0a-52a88e0f0a11".parse().unwrap(),
            Role::Admin,
        )
    }

    fn tenant() -> Session {
        Session::authenticated(
            "0f18cbd4-7b8e-4f4e-b1ba-7a4043a2c9f2".parse().unwrap(),
            Role::Tenant,
        )
    }

    #[test]
    fn unconstrained_route_allows_before_session_is_checked() {
        assert_eq!(
            decide(Requirement::public(), Session::default()),
            Decision::Allow,
        );
    }

    #[test]
    fn constrained_route_defers_until_session_is_checked() {
        for requirement in [
            Requirement::authenticated(),
            Requirement::role(Role::Admin),
            Requirement::public_only(),
        ] {
            assert_eq!(
                decide(requirement, Session::default()),
                Decision::Defer,
                "{requirement:?} must defer while unchecked",
            );
        }
    }

    #[test]
    fn public_only_route_expels_authenticated_users_to_their_home() {
        assert_eq!(
            decide(Requirement::public_only(), admin()),
            Decision::Redirect(Route::Admin),
        );
        assert_eq!(
            decide(Requirement::public_only(), tenant()),
            Decision::Redirect(Route::Home),
        );
        assert_eq!(
            decide(Requirement::public_only(), Session::anonymous()),
            Decision::Allow,
        );
    }

    #[test]
    fn protected_route_redirects_anonymous_to_login() {
        assert_eq!(
            decide(Requirement::authenticated(), Session::anonymous()),
            Decision::Redirect(Route::Login),
        );
        assert_eq!(
            decide(Requirement::role(Role::Admin), Session::anonymous()),
            Decision::Redirect(Route::Login),
        );
    }

    #[test]
    fn role_mismatch_redirects_to_own_home() {
        assert_eq!(
            decide(Requirement::role(Role::Admin), tenant()),
            Decision::Redirect(Route::Home),
        );
        assert_eq!(
            decide(Requirement::role(Role::Tenant), admin()),
            Decision::Redirect(Route::Admin),
        );
    }

    #[test]
    fn matching_role_and_plain_auth_are_allowed() {
        assert_eq!(
            decide(Requirement::role(Role::Admin), admin()),
            Decision::Allow,
        );
        assert_eq!(
            decide(Requirement::authenticated(), tenant()),
            Decision::Allow,
        );
    }

    #[test]
    fn homes_match_roles() {
        assert_eq!(role_home(Role::Admin), Route::Admin);
        assert_eq!(role_home(Role::Tenant), Route::Home);
    }
}
