use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::deserialize::FromSqlRow;
use diesel::expression::AsExpression;
use diesel::prelude::*;
use diesel::sql_types::Text;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use uuid::Uuid;

use super::{ImageList, JsonValue, ListingDetails, ListingType};

/// Whether a listing is shown in the public catalogue
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, AsExpression, FromSqlRow)]
#[diesel(sql_type = Text)]
pub enum ListingStatus {
    #[default]
    Active,
    Inactive,
}

text_enum!(ListingStatus, "listing status" {
    Active => "active",
    Inactive => "inactive",
});
text_enum_sql!(ListingStatus);

/// A validated, normalized listing submission
///
/// Produced by the form layer from either a multipart form or a JSON
/// payload. The category tag lives in `details`, so the attribute set
/// always matches the type.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub currency: String,
    pub details: ListingDetails,
    pub city: Option<String>,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
    pub gross_area: Option<f64>,
    pub net_area: Option<f64>,
    pub images: Vec<String>,
    pub status: ListingStatus,
    pub display_order: Option<i32>,
}

/// Represents a property listing
///
/// This struct maps directly to the `listings` table in the database and
/// is also the record format of the JSON file store.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::listings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[diesel(treat_none_as_null = true)]
pub struct Listing {
    /// Unique identifier (UUID v7, so ids sort by creation time)
    id: String,

    title: String,

    description: String,

    /// Asking price in whole currency units
    price: i64,

    currency: String,

    /// The category tag
    #[serde(rename = "type")]
    listing_type: ListingType,

    city: Option<String>,

    district: Option<String>,

    neighborhood: Option<String>,

    /// Gross area in square metres
    gross_area: Option<f64>,

    /// Net area in square metres
    net_area: Option<f64>,

    /// Category-specific attributes, only those of `listing_type`
    details: JsonValue,

    /// Image references: data URIs, local paths or remote URLs
    images: ImageList,

    status: ListingStatus,

    /// Explicit position in the catalogue, unordered listings come last
    display_order: Option<i32>,

    created_at: NaiveDateTime,

    updated_at: NaiveDateTime,
}

impl Listing {
    /// Creates a new listing from a normalized draft
    ///
    /// Generates a fresh UUID v7 and sets both timestamps to now.
    pub fn new(draft: ListingDraft) -> Self {
        let now = Utc::now().naive_utc();
        let mut listing = Self {
            id: Uuid::now_v7().to_string(),
            title: String::new(),
            description: String::new(),
            price: 0,
            currency: String::new(),
            listing_type: draft.details.listing_type(),
            city: None,
            district: None,
            neighborhood: None,
            gross_area: None,
            net_area: None,
            details: JsonValue(serde_json::Value::Null),
            images: ImageList::default(),
            status: ListingStatus::Active,
            display_order: None,
            created_at: now,
            updated_at: now,
        };
        listing.fill_from(draft);
        listing
    }

    /// Replaces every editable field with the draft's values
    ///
    /// The id and creation time are kept, `updated_at` moves to now.
    pub fn replace_with(&mut self, draft: ListingDraft) {
        self.fill_from(draft);
        self.updated_at = Utc::now().naive_utc();
    }

    fn fill_from(&mut self, draft: ListingDraft) {
        self.title = draft.title;
        self.description = draft.description;
        self.price = draft.price;
        self.currency = draft.currency;
        self.listing_type = draft.details.listing_type();
        self.details = JsonValue(draft.details.to_value());
        self.city = draft.city;
        self.district = draft.district;
        self.neighborhood = draft.neighborhood;
        self.gross_area = draft.gross_area;
        self.net_area = draft.net_area;
        self.images = ImageList(draft.images);
        self.status = draft.status;
        self.display_order = draft.display_order;
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_description(&self) -> String {
        self.description.clone()
    }

    pub fn get_price(&self) -> i64 {
        self.price
    }

    pub fn get_currency(&self) -> String {
        self.currency.clone()
    }

    pub fn get_listing_type(&self) -> ListingType {
        self.listing_type
    }

    pub fn get_city(&self) -> Option<String> {
        self.city.clone()
    }

    pub fn get_district(&self) -> Option<String> {
        self.district.clone()
    }

    pub fn get_neighborhood(&self) -> Option<String> {
        self.neighborhood.clone()
    }

    pub fn get_gross_area(&self) -> Option<f64> {
        self.gross_area
    }

    pub fn get_net_area(&self) -> Option<f64> {
        self.net_area
    }

    /// Gets the category attributes as stored
    pub fn get_details(&self) -> serde_json::Value {
        self.details.0.clone()
    }

    /// Gets the image references in display order
    pub fn get_images(&self) -> Vec<String> {
        self.images.0.clone()
    }

    pub fn get_status(&self) -> ListingStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ListingStatus::Active
    }

    pub fn get_display_order(&self) -> Option<i32> {
        self.display_order
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}

/// Catalogue order: explicit `display_order` ascending, listings without
/// one after those with one, ties broken by id
pub fn catalogue_order(a: &Listing, b: &Listing) -> Ordering {
    match (a.display_order, b.display_order) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.id.cmp(&b.id))
}

/// Sorts listings into catalogue order in place
pub fn sort_for_catalogue(listings: &mut [Listing]) {
    listings.sort_by(catalogue_order);
}
