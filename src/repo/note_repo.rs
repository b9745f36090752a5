use crate::db::DbPool;
use crate::dto::UpdateNoteDto;
use crate::models::Note;
use crate::schema::notes;
use diesel::prelude::*;
use anyhow::Result;
use tracing::instrument;

/// Inserts a new note
#[instrument(skip(pool, note), fields(note_id = %note.get_id(), listing_id = %note.get_listing_id()))]
pub fn create_note(pool: &DbPool, note: Note) -> Result<Note> {
    let conn = &mut pool.get()?;

    diesel::insert_into(notes::table)
        .values(&note)
        .execute(conn)?;

    Ok(note)
}

pub fn get_note(pool: &DbPool, note_id: &str) -> Result<Option<Note>> {
    let conn = &mut pool.get()?;

    let result = notes::table
        .find(note_id)
        .select(Note::as_select())
        .first::<Note>(conn)
        .optional()?;

    Ok(result)
}

/// Lists notes oldest first, optionally only those of one listing
pub fn list_notes(pool: &DbPool, listing_id: Option<&str>) -> Result<Vec<Note>> {
    let conn = &mut pool.get()?;

    let mut query = notes::table
        .select(Note::as_select())
        .order(notes::id.asc())
        .into_boxed();
    if let Some(listing_id) = listing_id {
        query = query.filter(notes::listing_id.eq(listing_id.to_string()));
    }

    Ok(query.load::<Note>(conn)?)
}

/// Applies a partial update, `None` when the note does not exist
#[instrument(skip(pool, changes))]
pub fn update_note(pool: &DbPool, note_id: &str, changes: UpdateNoteDto) -> Result<Option<Note>> {
    let conn = &mut pool.get()?;

    conn.transaction(|conn| {
        let Some(mut note) = notes::table
            .find(note_id)
            .select(Note::as_select())
            .first::<Note>(conn)
            .optional()?
        else {
            return Ok(None);
        };

        note.apply_update(changes.title, changes.body, changes.category, changes.priority, changes.visible);

        diesel::update(notes::table.find(note_id))
            .set(&note)
            .execute(conn)?;

        Ok(Some(note))
    })
}

/// Deletes a note, returning whether it existed
#[instrument(skip(pool))]
pub fn delete_note(pool: &DbPool, note_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(notes::table.find(note_id)).execute(conn)?;

    Ok(deleted > 0)
}

#[cfg(test)]
mod tests;
