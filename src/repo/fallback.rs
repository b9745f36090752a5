use anyhow::Result;
use tracing::warn;

use super::Store;
use crate::dto::UpdateNoteDto;
use crate::models::{Lead, Listing, ListingDraft, Note};

/// Runs every operation on the primary store and repeats it on the
/// secondary one when the primary fails
///
/// The two stores are not synchronized: records written during an
/// outage live only in the secondary store.
pub struct FallbackStore {
    primary: Box<dyn Store>,
    secondary: Box<dyn Store>,
}

impl FallbackStore {
    pub fn new(primary: Box<dyn Store>, secondary: Box<dyn Store>) -> Self {
        Self { primary, secondary }
    }

    fn attempt<T>(&self, operation: &str, f: impl Fn(&dyn Store) -> Result<T>) -> Result<T> {
        match f(self.primary.as_ref()) {
            Ok(value) => Ok(value),
            Err(e) => {
                warn!(
                    "{} failed on the {} store, retrying on the {} store: {:#}",
                    operation,
                    self.primary.backend_name(),
                    self.secondary.backend_name(),
                    e
                );
                f(self.secondary.as_ref())
            }
        }
    }
}

impl Store for FallbackStore {
    fn backend_name(&self) -> &'static str {
        "database+file"
    }

    fn list_listings(&self) -> Result<Vec<Listing>> {
        self.attempt("list_listings", |s| s.list_listings())
    }

    fn get_listing(&self, id: &str) -> Result<Option<Listing>> {
        self.attempt("get_listing", |s| s.get_listing(id))
    }

    fn create_listing(&self, listing: Listing) -> Result<Listing> {
        self.attempt("create_listing", |s| s.create_listing(listing.clone()))
    }

    fn update_listing(&self, id: &str, draft: ListingDraft) -> Result<Listing> {
        self.attempt("update_listing", |s| s.update_listing(id, draft.clone()))
    }

    fn delete_listing(&self, id: &str) -> Result<bool> {
        self.attempt("delete_listing", |s| s.delete_listing(id))
    }

    fn list_notes(&self, listing_id: Option<&str>) -> Result<Vec<Note>> {
        self.attempt("list_notes", |s| s.list_notes(listing_id))
    }

    fn get_note(&self, id: &str) -> Result<Option<Note>> {
        self.attempt("get_note", |s| s.get_note(id))
    }

    fn create_note(&self, note: Note) -> Result<Note> {
        self.attempt("create_note", |s| s.create_note(note.clone()))
    }

    fn update_note(&self, id: &str, changes: UpdateNoteDto) -> Result<Option<Note>> {
        self.attempt("update_note", |s| s.update_note(id, changes.clone()))
    }

    fn delete_note(&self, id: &str) -> Result<bool> {
        self.attempt("delete_note", |s| s.delete_note(id))
    }

    fn create_lead(&self, lead: Lead) -> Result<Lead> {
        self.attempt("create_lead", |s| s.create_lead(lead.clone()))
    }

    fn list_leads(&self) -> Result<Vec<Lead>> {
        self.attempt("list_leads", |s| s.list_leads())
    }

    fn delete_lead(&self, id: &str) -> Result<bool> {
        self.attempt("delete_lead", |s| s.delete_lead(id))
    }
}
