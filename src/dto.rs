use serde::{Deserialize, Serialize};

use crate::models::{ListingStatus, ListingType, NoteCategory, NotePriority};

/// Data transfer object for creating or replacing a listing
///
/// Used by `POST /admin/api/listings` and `PUT /admin/api/listings/{id}`.
/// A PUT replaces every editable field, so the client sends the full record.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ListingPayloadDto {
    pub title: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Price in whole currency units
    pub price: i64,

    #[serde(default)]
    pub currency: Option<String>,

    /// The category tag
    #[serde(rename = "type")]
    pub listing_type: ListingType,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub district: Option<String>,

    #[serde(default)]
    pub neighborhood: Option<String>,

    #[serde(default)]
    pub gross_area: Option<f64>,

    #[serde(default)]
    pub net_area: Option<f64>,

    /// Category-specific attributes; keys of other categories are dropped
    #[serde(default)]
    pub details: serde_json::Value,

    /// Existing references (paths, URLs) and new inline `data:` URIs
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub status: Option<ListingStatus>,

    #[serde(default)]
    pub display_order: Option<i32>,
}

/// Query parameters for the public catalogue
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct ListingQueryDto {
    /// Only listings of this category
    #[serde(rename = "type")]
    pub listing_type: Option<ListingType>,

    /// Case-insensitive city match
    pub city: Option<String>,

    pub min_price: Option<i64>,

    pub max_price: Option<i64>,
}

/// Data transfer object for creating a note
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateNoteDto {
    /// The listing the note belongs to
    pub listing_id: String,

    pub title: String,

    #[serde(default)]
    pub body: String,

    #[serde(default)]
    pub category: NoteCategory,

    #[serde(default)]
    pub priority: NotePriority,

    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

/// Data transfer object for updating a note; absent fields are kept
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct UpdateNoteDto {
    pub title: Option<String>,
    pub body: Option<String>,
    pub category: Option<NoteCategory>,
    pub priority: Option<NotePriority>,
    pub visible: Option<bool>,
}

/// Query parameters for listing notes
#[derive(Serialize, Deserialize, Debug, Default, Clone)]
#[serde(default)]
pub struct NoteQueryDto {
    pub listing_id: Option<String>,
}

/// Contact-form submission, accepted urlencoded or as JSON
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ContactDto {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub listing_id: Option<String>,
}

/// Admin login request
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginDto {
    pub username: String,
    pub password: String,
}

/// Successful login response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LoginResponseDto {
    pub username: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    /// The session token, also set as a cookie; API clients send it as a bearer token
    pub token: String,
}

/// Stored image references produced by an upload
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct UploadResponseDto {
    pub images: Vec<String>,
}

#[cfg(test)]
mod tests;
