use anyhow::{Context, Result};
use diesel::{Connection, SqliteConnection};

use super::{lead_repo, listing_repo, note_repo, Store};
use crate::db::{self, DbPool};
use crate::dto::UpdateNoteDto;
use crate::models::{Lead, Listing, ListingDraft, Note};

/// SQLite-backed store
#[derive(Clone)]
pub struct SqlStore {
    pool: DbPool,
}

impl SqlStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Connects to the database and applies pending migrations
    pub fn open(database_url: &str) -> Result<Self> {
        // fail fast before the pool starts retrying
        SqliteConnection::establish(database_url)
            .with_context(|| format!("Failed to open database {}", database_url))?;

        let pool = db::init_pool(database_url)?;
        let mut conn = pool.get()?;
        crate::run_migrations(&mut conn)?;
        drop(conn);

        Ok(Self::new(pool))
    }
}

impl Store for SqlStore {
    fn backend_name(&self) -> &'static str {
        "database"
    }

    fn list_listings(&self) -> Result<Vec<Listing>> {
        listing_repo::list_listings(&self.pool)
    }

    fn get_listing(&self, id: &str) -> Result<Option<Listing>> {
        listing_repo::get_listing(&self.pool, id)
    }

    fn create_listing(&self, listing: Listing) -> Result<Listing> {
        listing_repo::create_listing(&self.pool, listing)
    }

    fn update_listing(&self, id: &str, draft: ListingDraft) -> Result<Listing> {
        listing_repo::update_listing(&self.pool, id, draft)
    }

    fn delete_listing(&self, id: &str) -> Result<bool> {
        listing_repo::delete_listing(&self.pool, id)
    }

    fn list_notes(&self, listing_id: Option<&str>) -> Result<Vec<Note>> {
        note_repo::list_notes(&self.pool, listing_id)
    }

    fn get_note(&self, id: &str) -> Result<Option<Note>> {
        note_repo::get_note(&self.pool, id)
    }

    fn create_note(&self, note: Note) -> Result<Note> {
        note_repo::create_note(&self.pool, note)
    }

    fn update_note(&self, id: &str, changes: UpdateNoteDto) -> Result<Option<Note>> {
        note_repo::update_note(&self.pool, id, changes)
    }

    fn delete_note(&self, id: &str) -> Result<bool> {
        note_repo::delete_note(&self.pool, id)
    }

    fn create_lead(&self, lead: Lead) -> Result<Lead> {
        lead_repo::create_lead(&self.pool, lead)
    }

    fn list_leads(&self) -> Result<Vec<Lead>> {
        lead_repo::list_leads(&self.pool)
    }

    fn delete_lead(&self, id: &str) -> Result<bool> {
        lead_repo::delete_lead(&self.pool, id)
    }
}
