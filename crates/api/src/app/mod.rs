use std::{sync::Arc, time::Duration};

use axum::{Extension, Router, middleware::from_fn_with_state};

use notekeeper_auth::SessionVerifier;

use crate::middleware::{AuthState, auth_middleware, pipeline};

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AppServices, build_services};

/// The full application router.
///
/// Protected routes exist only behind the auth gate; public routes never see it.
/// Everything runs inside the logging/recovery/timeout pipeline.
pub fn build_app(services: Arc<AppServices>, request_timeout: Duration) -> Router {
    let gate = AuthState {
        sessions: services.auth.clone() as Arc<dyn SessionVerifier>,
    };

    let protected = routes::protected_router()
        .route_layer(from_fn_with_state(gate, auth_middleware));

    let router = routes::public_router()
        .merge(protected)
        .fallback(routes::system::not_found)
        .method_not_allowed_fallback(routes::system::method_not_allowed)
        .layer(Extension(services));

    pipeline(router, request_timeout)
}
