/// Data models module
///
/// This module defines the core data structures used throughout the application.
/// It includes database models that map to database tables, as well as methods
/// for creating and manipulating these models.

#[macro_use]
mod text_enum;

// Re-export all model types
mod json_value;
pub use json_value::{ImageList, JsonValue};

mod category;
pub use category::{
    ApartmentDetails, CommercialDetails, CommercialUsage, DeedStatus, FieldDetails, Heating,
    LandDetails, ListingDetails, ListingType, ZoningStatus,
};

mod listing;
pub use listing::{catalogue_order, sort_for_catalogue, Listing, ListingDraft, ListingStatus};

mod note;
pub use note::{Note, NoteCategory, NotePriority};

mod lead;
pub use lead::Lead;
