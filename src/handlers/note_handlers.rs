use axum::{
    extract::{Path, State},
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use tracing::{debug, info, instrument};

use crate::dto::{CreateNoteDto, NoteQueryDto, UpdateNoteDto};
use crate::errors::ApiError;
use crate::models::Note;
use crate::AppState;

fn required_title(title: &str) -> Result<String, ApiError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(ApiError::BadRequest("Note title must not be empty".to_string()));
    }
    Ok(title.to_string())
}

/// Handler for listing notes
///
/// This function handles GET requests to `/admin/api/notes`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `query` - An optional `listing_id` filter
///
/// ### Returns
///
/// The notes, oldest first, as JSON
#[instrument(skip(state))]
pub async fn list_notes_handler(
    State(state): State<AppState>,
    Query(query): Query<NoteQueryDto>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state.store.list_notes(query.listing_id.as_deref())?;

    info!("Retrieved {} notes", notes.len());

    Ok(Json(notes))
}

/// Handler for listing the notes of one listing
///
/// This function handles GET requests to `/admin/api/listings/{id}/notes`.
#[instrument(skip(state), fields(listing_id = %listing_id))]
pub async fn list_listing_notes_handler(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<Json<Vec<Note>>, ApiError> {
    // Verify that the listing exists
    state
        .store
        .get_listing(&listing_id)?
        .ok_or(ApiError::NotFound("Listing"))?;

    let notes = state.store.list_notes(Some(&listing_id))?;

    info!("Retrieved {} notes for listing {}", notes.len(), listing_id);

    Ok(Json(notes))
}

#[instrument(skip(state), fields(note_id = %note_id))]
pub async fn get_note_handler(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let note = state.store.get_note(&note_id)?.ok_or(ApiError::NotFound("Note"))?;

    Ok(Json(note))
}

/// Handler for creating a note
///
/// This function handles POST requests to `/admin/api/notes`. The
/// listing the note is attached to must exist.
#[instrument(skip(state, payload), fields(listing_id = %payload.listing_id))]
pub async fn create_note_handler(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateNoteDto>, ApiError>,
) -> Result<Json<Note>, ApiError> {
    info!("Creating new note");

    let title = required_title(&payload.title)?;
    state
        .store
        .get_listing(&payload.listing_id)?
        .ok_or(ApiError::NotFound("Listing"))?;

    let note = state.store.create_note(Note::new(
        payload.listing_id,
        title,
        payload.body,
        payload.category,
        payload.priority,
        payload.visible,
    ))?;

    info!("Successfully created note with id: {}", note.get_id());

    Ok(Json(note))
}

/// Handler for editing a note
///
/// This function handles PUT requests to `/admin/api/notes/{id}`.
/// Fields absent from the payload keep their value.
#[instrument(skip(state, payload), fields(note_id = %note_id))]
pub async fn update_note_handler(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
    WithRejection(Json(mut payload), _): WithRejection<Json<UpdateNoteDto>, ApiError>,
) -> Result<Json<Note>, ApiError> {
    if let Some(title) = payload.title.as_deref() {
        payload.title = Some(required_title(title)?);
    }

    let note = state
        .store
        .update_note(&note_id, payload)?
        .ok_or(ApiError::NotFound("Note"))?;

    debug!("Note updated at {}", note.get_updated_at());

    Ok(Json(note))
}

#[instrument(skip(state), fields(note_id = %note_id))]
pub async fn delete_note_handler(
    State(state): State<AppState>,
    Path(note_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    info!("Deleting note with id: {}", note_id);

    if !state.store.delete_note(&note_id)? {
        return Err(ApiError::NotFound("Note"));
    }

    Ok(Json(()))
}
