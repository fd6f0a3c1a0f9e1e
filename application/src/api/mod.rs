//! JSON API definitions.

pub mod payments;
pub mod rooms;
pub mod session;

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::{IntoResponse as _, Response},
    routing::{get, post},
    Extension, Router,
};
use common::Page;
use serde::Serialize;
use service::{domain::user::Role, guard};

use crate::Error;

/// Builds the API [`Router`] with a route [`guard::Requirement`] attached
/// to every constrained route group.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/session", get(session::show))
        .route("/logout", post(session::logout))
        .merge(guarded(
            Router::new()
                .route("/login", post(session::login))
                .route("/signup", post(session::signup))
                .route("/password-resets", post(session::reset_password)),
            guard::Requirement::public_only(),
        ))
        .merge(guarded(
            Router::new()
                .route("/rooms", get(rooms::list))
                .route("/rooms/:id", get(rooms::show))
                .route("/rooms/:id/payments", post(payments::create)),
            guard::Requirement::authenticated(),
        ))
        .merge(guarded(
            Router::new().route("/payments", get(payments::list)),
            guard::Requirement::role(Role::Admin),
        ))
}

/// Attaches the route-guard middleware enforcing the given
/// [`guard::Requirement`] to every route of the `router`.
fn guarded(router: Router, requirement: guard::Requirement) -> Router {
    router.route_layer(middleware::from_fn(
        move |service: Extension<crate::Service>,
              req: Request,
              next: Next| enforce(requirement, service, req, next),
    ))
}

/// Resolves a [`guard::decide`] call into an HTTP response:
/// [`Defer`] as 503 with `Retry-After`, [`Redirect`] as 303 with
/// `Location`, [`Allow`] as a pass-through.
///
/// [`Allow`]: guard::Decision::Allow
/// [`Defer`]: guard::Decision::Defer
/// [`Redirect`]: guard::Decision::Redirect
async fn enforce(
    requirement: guard::Requirement,
    Extension(service): Extension<crate::Service>,
    req: Request,
    next: Next,
) -> Response {
    match guard::decide(requirement, service.sessions().snapshot()) {
        guard::Decision::Allow => next.run(req).await,
        guard::Decision::Defer => (
            http::StatusCode::SERVICE_UNAVAILABLE,
            [(http::header::RETRY_AFTER, "1")],
        )
            .into_response(),
        guard::Decision::Redirect(route) => (
            http::StatusCode::SEE_OTHER,
            [(http::header::LOCATION, route.path())],
        )
            .into_response(),
    }
}

/// Presentation of a [`Page`] in a listing response.
#[derive(Clone, Debug, Serialize)]
pub struct PageDto<T> {
    /// Items of this page.
    pub items: Vec<T>,

    /// Number of this page.
    pub page: usize,

    /// Maximum number of items a page holds.
    pub per_page: usize,

    /// Total number of pages in the listing.
    pub total_pages: usize,

    /// Total number of items in the listing.
    pub total_items: usize,
}

impl<I> From<Page<I>> for PageDto<I> {
    fn from(page: Page<I>) -> Self {
        Self {
            items: page.items,
            page: page.number.get(),
            per_page: page.per_page,
            total_pages: page.total_pages,
            total_items: page.total_items,
        }
    }
}

/// Creates a `400 Bad Request` [`Error`] with the provided `message`.
pub(crate) fn bad_request(message: impl ToString) -> Error {
    Error {
        code: "INVALID_INPUT",
        status_code: http::StatusCode::BAD_REQUEST,
        message: message.to_string(),
        backtrace: None,
    }
}
