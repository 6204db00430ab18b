use std::sync::Arc;

use axum::{
    Extension, Json, Router, extract::rejection::JsonRejection, http::StatusCode, routing::post,
};

use crate::app::{
    AppServices,
    dto::{CredentialsRequest, SignInResponse, SignUpResponse},
    errors::ApiError,
};

pub fn router() -> Router {
    Router::new()
        .route("/sign-up", post(sign_up))
        .route("/sign-in", post(sign_in))
}

async fn sign_up(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SignUpResponse>), ApiError> {
    let Json(body) = payload?;
    let id = services.auth.register(&body.username, &body.password).await?;

    tracing::info!(user_id = %id, "user signed up");
    Ok((StatusCode::CREATED, Json(SignUpResponse { id })))
}

async fn sign_in(
    Extension(services): Extension<Arc<AppServices>>,
    payload: Result<Json<CredentialsRequest>, JsonRejection>,
) -> Result<Json<SignInResponse>, ApiError> {
    let Json(body) = payload?;
    let token = services
        .auth
        .authenticate(&body.username, &body.password)
        .await?;

    Ok(Json(SignInResponse { token }))
}
