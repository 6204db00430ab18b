use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use notekeeper_auth::AuthError;
use notekeeper_notes::NoteError;

pub const INTERNAL_MESSAGE: &str = "internal server error";

/// Client-facing classification of a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    DuplicateUser,
    InvalidCredentials,
    Unauthenticated,
    DomainFailure,
    Internal,
}

impl ErrorKind {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorKind::Validation | ErrorKind::DuplicateUser => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidCredentials | ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::DomainFailure => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A failed request: a kind, a client-safe message, and (for internal
/// failures) a detail that is logged but never sent.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    kind: ErrorKind,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            detail: None,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn unauthenticated() -> Self {
        Self::new(ErrorKind::Unauthenticated, "unauthenticated")
    }

    pub fn internal(detail: Option<String>) -> Self {
        Self {
            kind: ErrorKind::Internal,
            message: INTERNAL_MESSAGE.to_owned(),
            detail,
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::DuplicateUser => Self::new(ErrorKind::DuplicateUser, err.to_string()),
            AuthError::InvalidCredentials => {
                Self::new(ErrorKind::InvalidCredentials, err.to_string())
            }
            AuthError::Unauthenticated => Self::unauthenticated(),
            AuthError::Internal(detail) => Self::internal(Some(detail)),
        }
    }
}

impl From<NoteError> for ApiError {
    fn from(err: NoteError) -> Self {
        match err {
            NoteError::Validation(msg) => Self::validation(msg),
            NoteError::Misspelled(_) => Self::new(ErrorKind::DomainFailure, err.to_string()),
            NoteError::Internal(detail) => Self::internal(Some(detail)),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal(Some(format!("{err:#}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match (&self.kind, &self.detail) {
            (ErrorKind::Internal, detail) => tracing::error!(
                detail = detail.as_deref().unwrap_or("-"),
                "request failed with internal error"
            ),
            (kind, _) => tracing::warn!(kind = ?kind, message = %self.message, "request rejected"),
        }

        json_error(self.kind.status(), self.message)
    }
}

/// Error body shape shared by every failure: `{"error": "<message>"}`.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::body::to_bytes;
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn logged_at_warn_or_above(err: ApiError) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::WARN)
            .finish();
        tracing::subscriber::with_default(subscriber, || {
            let _ = err.into_response();
        });
        let bytes = captured.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    async fn body_of(err: ApiError) -> (StatusCode, serde_json::Value) {
        let res = err.into_response();
        let status = res.status();
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(ErrorKind::Validation.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::DuplicateUser.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorKind::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::Unauthenticated.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorKind::DomainFailure.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ErrorKind::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn client_errors_are_logged_at_warn() {
        let logged = logged_at_warn_or_above(AuthError::DuplicateUser.into());
        assert!(logged.contains("WARN"), "{logged}");
        assert!(logged.contains("request rejected"), "{logged}");

        let logged = logged_at_warn_or_above(ApiError::unauthenticated());
        assert!(logged.contains("request rejected"), "{logged}");
    }

    #[tokio::test]
    async fn internal_detail_is_not_sent() {
        let err = ApiError::from(AuthError::Internal("connection refused to 10.0.0.3".into()));
        let (status, body) = body_of(err).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": INTERNAL_MESSAGE }));
    }

    #[tokio::test]
    async fn client_errors_carry_their_message() {
        let (status, body) = body_of(AuthError::Validation("username must not be blank".into()).into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "username must not be blank" }));

        let (status, body) = body_of(AuthError::DuplicateUser.into()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], AuthError::DuplicateUser.to_string());
    }

    #[tokio::test]
    async fn misspelled_note_is_domain_failure() {
        let err = NoteError::Misspelled(vec![notekeeper_notes::Misspelling {
            pos: 0,
            word: "teh".into(),
        }]);
        let (status, body) = body_of(err.into()).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().contains("teh"));
    }
}
