use axum::{extract::Path, Json};
use tracing::{debug, instrument};

use crate::errors::ApiError;
use crate::form::{form_schema, FormSchema};
use crate::models::ListingType;

/// Handler for the listing form of every category
///
/// This function handles GET requests to `/api/listing-form`.
#[instrument]
pub async fn list_form_schemas_handler() -> Json<Vec<FormSchema>> {
    Json(ListingType::ALL.iter().copied().map(form_schema).collect())
}

/// Handler for the listing form of one category
///
/// This function handles GET requests to `/api/listing-form/{type}`.
/// An unknown category answers 404.
#[instrument]
pub async fn get_form_schema_handler(Path(listing_type): Path<String>) -> Result<Json<FormSchema>, ApiError> {
    let listing_type: ListingType = listing_type.parse().map_err(|e: String| {
        debug!("{}", e);
        ApiError::NotFound("Listing type")
    })?;

    Ok(Json(form_schema(listing_type)))
}
