use std::{any::Any, net::SocketAddr, sync::Arc, time::{Duration, Instant}};

use axum::{
    Router,
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri, header},
    middleware::{self as axum_middleware, Next},
    response::{IntoResponse, Response},
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, timeout::TimeoutLayer};
use tracing::{Instrument, Span};

use notekeeper_auth::SessionVerifier;

use crate::app::errors::{ApiError, json_error};
use crate::context::{AuthenticatedUser, RequestId};

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

#[derive(Clone)]
pub struct AuthState {
    pub sessions: Arc<dyn SessionVerifier>,
}

/// Auth gate for protected routes. Rejections never reach the handler.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(req.headers())?;
    let user_id = state.sessions.verify_session(token)?;

    tracing::debug!(user_id = %user_id, "authenticated request");
    req.extensions_mut().insert(AuthenticatedUser::new(user_id));

    Ok(next.run(req).await)
}

/// Accepts exactly `Bearer <token>`: two space-separated parts, non-empty token.
fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(ApiError::unauthenticated)?;

    let header = header.to_str().map_err(|_| ApiError::unauthenticated())?;

    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(ApiError::unauthenticated()),
    }
}

/// Wraps the router in the request pipeline: logging (outermost), then
/// panic recovery, then the per-request timeout.
pub fn pipeline(router: Router, request_timeout: Duration) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(axum_middleware::from_fn(request_logging))
            .layer(CatchPanicLayer::custom(recover_panic))
            .layer(axum_middleware::map_response(timeout_body))
            .layer(TimeoutLayer::new(request_timeout)),
    )
}

// Handlers never answer 408 themselves, so every 408 here is the timeout layer's bare one.
async fn timeout_body(response: Response) -> Response {
    if response.status() == StatusCode::REQUEST_TIMEOUT {
        return json_error(StatusCode::REQUEST_TIMEOUT, "request timed out");
    }
    response
}

/// Tags the request with a fresh [`RequestId`] and logs exactly one line when it ends.
pub async fn request_logging(req: Request, next: Next) -> Response {
    let request_id = RequestId::new();
    let span = tracing::info_span!("request", request_id = %request_id);

    let log = RequestLog {
        span: span.clone(),
        method: req.method().clone(),
        uri: req.uri().clone(),
        user_agent: req
            .headers()
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned(),
        client: req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.to_string()),
        started: Instant::now(),
        finished: false,
    };

    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    log.finish(response.status().as_u16());
    response
}

struct RequestLog {
    span: Span,
    method: Method,
    uri: Uri,
    user_agent: String,
    client: Option<String>,
    started: Instant,
    finished: bool,
}

impl RequestLog {
    fn finish(mut self, status: u16) {
        self.finished = true;
        self.emit(Some(status));
    }

    fn emit(&self, status: Option<u16>) {
        let duration_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let client = self.client.as_deref().unwrap_or("-");

        self.span.in_scope(|| match status {
            Some(status) => tracing::info!(
                method = %self.method,
                uri = %self.uri,
                user_agent = %self.user_agent,
                client,
                status,
                duration_ms,
                "handle request"
            ),
            None => tracing::warn!(
                method = %self.method,
                uri = %self.uri,
                user_agent = %self.user_agent,
                client,
                duration_ms,
                "request aborted before completion"
            ),
        });
    }
}

impl Drop for RequestLog {
    // The future was dropped mid-flight (client went away).
    fn drop(&mut self) {
        if !self.finished {
            self.emit(None);
        }
    }
}

fn recover_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else {
        "non-string panic payload"
    };

    let backtrace = notekeeper_observability::panic::take_backtrace().unwrap_or_default();
    tracing::error!(panic = %message, backtrace = %backtrace, "recovered from panic in handler");

    ApiError::internal(None).into_response()
}
