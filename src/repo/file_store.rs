use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, instrument};
use uuid::Uuid;

use super::Store;
use crate::dto::UpdateNoteDto;
use crate::models::{sort_for_catalogue, Lead, Listing, ListingDraft, Note};

/// The whole content of the JSON store
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct Document {
    listings: Vec<Listing>,
    notes: Vec<Note>,
    leads: Vec<Lead>,
}

/// Flat-file store keeping everything in one JSON document
///
/// Every operation reads the document under a mutex; mutations write it
/// back to a temporary file that is renamed over the original.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Opens the store, creating an empty document when none exists
    ///
    /// An existing document that does not parse is an error.
    pub fn open(path: &Path) -> Result<Self> {
        let store = Self::new(path);
        let _guard = store.lock.lock().unwrap_or_else(PoisonError::into_inner);
        if path.exists() {
            store.read()?;
        } else {
            store.write(&Document::default())?;
        }
        drop(_guard);
        Ok(store)
    }

    fn read(&self) -> Result<Document> {
        if !self.path.exists() {
            return Ok(Document::default());
        }
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(Document::default());
        }
        serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", self.path.display()))
    }

    fn write(&self, document: &Document) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;

        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| anyhow!("Store path {} has no file name", self.path.display()))?
            .to_string_lossy();
        let temp_path = dir.join(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

        let json = serde_json::to_vec_pretty(document)?;
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create {}", temp_path.display()))?;
        file.write_all(&json)?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(e).with_context(|| format!("Failed to replace {}", self.path.display()));
        }
        debug!("Wrote {} bytes to {}", json.len(), self.path.display());
        Ok(())
    }

    fn view<T>(&self, f: impl FnOnce(Document) -> T) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(f(self.read()?))
    }

    /// Runs a mutation; the document is written back only when `f`
    /// reports a change
    fn modify<T>(&self, f: impl FnOnce(&mut Document) -> Result<(T, bool)>) -> Result<T> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut document = self.read()?;
        let (result, changed) = f(&mut document)?;
        if changed {
            self.write(&document)?;
        }
        Ok(result)
    }
}

impl Store for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    fn list_listings(&self) -> Result<Vec<Listing>> {
        self.view(|doc| {
            let mut listings = doc.listings;
            sort_for_catalogue(&mut listings);
            listings
        })
    }

    fn get_listing(&self, id: &str) -> Result<Option<Listing>> {
        self.view(|doc| doc.listings.into_iter().find(|l| l.get_id() == id))
    }

    #[instrument(skip(self, listing), fields(listing_id = %listing.get_id()))]
    fn create_listing(&self, listing: Listing) -> Result<Listing> {
        self.modify(|doc| {
            if doc.listings.iter().any(|l| l.get_id() == listing.get_id()) {
                return Err(anyhow!("Listing {} already exists", listing.get_id()));
            }
            doc.listings.push(listing.clone());
            Ok((listing, true))
        })
    }

    #[instrument(skip(self, draft))]
    fn update_listing(&self, id: &str, draft: ListingDraft) -> Result<Listing> {
        self.modify(|doc| {
            let listing = doc
                .listings
                .iter_mut()
                .find(|l| l.get_id() == id)
                .ok_or_else(|| anyhow!("Failed to update listing {}: not found", id))?;
            listing.replace_with(draft);
            Ok((listing.clone(), true))
        })
    }

    #[instrument(skip(self))]
    fn delete_listing(&self, id: &str) -> Result<bool> {
        self.modify(|doc| {
            let before = doc.listings.len();
            doc.listings.retain(|l| l.get_id() != id);
            let deleted = doc.listings.len() != before;
            Ok((deleted, deleted))
        })
    }

    fn list_notes(&self, listing_id: Option<&str>) -> Result<Vec<Note>> {
        self.view(|doc| {
            let mut notes: Vec<Note> = doc
                .notes
                .into_iter()
                .filter(|n| listing_id.is_none_or(|id| n.get_listing_id() == id))
                .collect();
            notes.sort_by_key(|n| n.get_id());
            notes
        })
    }

    fn get_note(&self, id: &str) -> Result<Option<Note>> {
        self.view(|doc| doc.notes.into_iter().find(|n| n.get_id() == id))
    }

    fn create_note(&self, note: Note) -> Result<Note> {
        self.modify(|doc| {
            doc.notes.push(note.clone());
            Ok((note, true))
        })
    }

    fn update_note(&self, id: &str, changes: UpdateNoteDto) -> Result<Option<Note>> {
        self.modify(|doc| match doc.notes.iter_mut().find(|n| n.get_id() == id) {
            Some(note) => {
                note.apply_update(changes.title, changes.body, changes.category, changes.priority, changes.visible);
                Ok((Some(note.clone()), true))
            }
            None => Ok((None, false)),
        })
    }

    fn delete_note(&self, id: &str) -> Result<bool> {
        self.modify(|doc| {
            let before = doc.notes.len();
            doc.notes.retain(|n| n.get_id() != id);
            let deleted = doc.notes.len() != before;
            Ok((deleted, deleted))
        })
    }

    fn create_lead(&self, lead: Lead) -> Result<Lead> {
        self.modify(|doc| {
            doc.leads.push(lead.clone());
            Ok((lead, true))
        })
    }

    fn list_leads(&self) -> Result<Vec<Lead>> {
        self.view(|doc| {
            let mut leads = doc.leads;
            leads.sort_by_key(|l| std::cmp::Reverse(l.get_id()));
            leads
        })
    }

    fn delete_lead(&self, id: &str) -> Result<bool> {
        self.modify(|doc| {
            let before = doc.leads.len();
            doc.leads.retain(|l| l.get_id() != id);
            let deleted = doc.leads.len() != before;
            Ok((deleted, deleted))
        })
    }
}
