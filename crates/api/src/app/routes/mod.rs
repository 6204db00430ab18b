use axum::Router;

pub mod auth;
pub mod notes;
pub mod system;

/// Routes reachable without a session.
pub fn public_router() -> Router {
    Router::new().merge(system::router()).merge(auth::router())
}

/// Routes that require an authenticated user. Mount only behind the auth gate.
pub(crate) fn protected_router() -> Router {
    notes::router()
}
