/// Repository module
///
/// The data access layer. The pool functions in `listing_repo`,
/// `note_repo` and `lead_repo` talk to SQLite through diesel; the
/// [`Store`] trait puts those behind one interface together with the
/// flat JSON file backend and the fallback between the two.

mod listing_repo;
mod note_repo;
mod lead_repo;
mod sql_store;
mod file_store;
mod fallback;

pub use listing_repo::*;
pub use note_repo::*;
pub use lead_repo::*;
pub use sql_store::SqlStore;
pub use file_store::JsonFileStore;
pub use fallback::FallbackStore;

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::{Config, StoreKind};
use crate::dto::UpdateNoteDto;
use crate::models::{Lead, Listing, ListingDraft, Note};

/// Persistence for listings, notes and leads
///
/// Listing reads come back in catalogue order. `update_listing` expects
/// the listing to exist and fails otherwise; the other mutations report
/// a missing record through their return value.
pub trait Store: Send + Sync {
    /// Short name of the backend, reported by the health endpoint
    fn backend_name(&self) -> &'static str;

    fn list_listings(&self) -> Result<Vec<Listing>>;
    fn get_listing(&self, id: &str) -> Result<Option<Listing>>;
    fn create_listing(&self, listing: Listing) -> Result<Listing>;
    fn update_listing(&self, id: &str, draft: ListingDraft) -> Result<Listing>;
    fn delete_listing(&self, id: &str) -> Result<bool>;

    fn list_notes(&self, listing_id: Option<&str>) -> Result<Vec<Note>>;
    fn get_note(&self, id: &str) -> Result<Option<Note>>;
    fn create_note(&self, note: Note) -> Result<Note>;
    fn update_note(&self, id: &str, changes: UpdateNoteDto) -> Result<Option<Note>>;
    fn delete_note(&self, id: &str) -> Result<bool>;

    fn create_lead(&self, lead: Lead) -> Result<Lead>;
    fn list_leads(&self) -> Result<Vec<Lead>>;
    fn delete_lead(&self, id: &str) -> Result<bool>;
}

/// Opens the store selected by the configuration
///
/// With the database backend and `file_fallback` on, a database that
/// cannot be opened degrades to the JSON file, and a working one is
/// wrapped in a [`FallbackStore`].
pub fn open_store(config: &Config) -> Result<Arc<dyn Store>> {
    match config.store {
        StoreKind::File => {
            info!("Using JSON file store at {}", config.data_file.display());
            Ok(Arc::new(JsonFileStore::open(&config.data_file)?))
        }
        StoreKind::Database => match SqlStore::open(&config.database_url) {
            Ok(sql) if config.file_fallback => {
                info!("Using database store with file fallback at {}", config.data_file.display());
                let file = JsonFileStore::open(&config.data_file)?;
                Ok(Arc::new(FallbackStore::new(Box::new(sql), Box::new(file))))
            }
            Ok(sql) => {
                info!("Using database store");
                Ok(Arc::new(sql))
            }
            Err(e) if config.file_fallback => {
                warn!("Database unavailable, using JSON file store instead: {:#}", e);
                Ok(Arc::new(JsonFileStore::open(&config.data_file)?))
            }
            Err(e) => Err(e),
        },
    }
}
