use std::sync::Arc;

use axum::{
    Extension, Json, Router, extract::rejection::JsonRejection, http::StatusCode, routing::get,
};

use crate::app::{
    AppServices,
    dto::{CreateNoteRequest, CreateNoteResponse, NoteResponse},
    errors::ApiError,
};
use crate::context::AuthenticatedUser;

pub(crate) fn router() -> Router {
    Router::new().route("/notes", get(list_notes).post(create_note))
}

async fn list_notes(
    Extension(services): Extension<Arc<AppServices>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let notes = services.notes.list_notes(user.user_id()).await?;
    Ok(Json(notes.into_iter().map(NoteResponse::from).collect()))
}

async fn create_note(
    Extension(services): Extension<Arc<AppServices>>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateNoteRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateNoteResponse>), ApiError> {
    let Json(body) = payload?;
    let id = services.notes.create_note(user.user_id(), &body.title).await?;

    Ok((StatusCode::CREATED, Json(CreateNoteResponse { id })))
}
