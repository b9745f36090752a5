use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use axum_extra::extract::{Query, WithRejection};
use tracing::{debug, info, instrument, warn};

use crate::dto::{ListingPayloadDto, ListingQueryDto};
use crate::errors::ApiError;
use crate::form::{self, draft_from_payload, normalize_submission};
use crate::models::{Listing, ListingDraft};
use crate::AppState;

use super::upload_handlers::read_multipart;

/// Whether a listing passes the public catalogue filters
fn matches_query(listing: &Listing, query: &ListingQueryDto) -> bool {
    if query.listing_type.is_some_and(|t| t != listing.get_listing_type()) {
        return false;
    }
    if let Some(city) = query.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        let matches_city = listing
            .get_city()
            .is_some_and(|c| c.trim().to_lowercase() == city.to_lowercase());
        if !matches_city {
            return false;
        }
    }
    if query.min_price.is_some_and(|min| listing.get_price() < min) {
        return false;
    }
    if query.max_price.is_some_and(|max| listing.get_price() > max) {
        return false;
    }
    true
}

/// Handler for the public catalogue
///
/// This function handles GET requests to `/api/listings`. Only active
/// listings are returned, in catalogue order.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `query` - Optional `type`, `city`, `min_price` and `max_price` filters
///
/// ### Returns
///
/// The matching listings as JSON
#[instrument(skip(state))]
pub async fn list_listings_handler(
    State(state): State<AppState>,
    Query(query): Query<ListingQueryDto>,
) -> Result<Json<Vec<Listing>>, ApiError> {
    debug!("Listing public catalogue");

    let listings: Vec<Listing> = state
        .store
        .list_listings()?
        .into_iter()
        .filter(|l| l.is_active() && matches_query(l, &query))
        .collect();

    info!("Retrieved {} active listings", listings.len());

    Ok(Json(listings))
}

/// Handler for a public listing page
///
/// This function handles GET requests to `/api/listings/{id}`. Inactive
/// listings answer 404 like missing ones.
#[instrument(skip(state), fields(listing_id = %listing_id))]
pub async fn get_listing_handler(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<Json<Listing>, ApiError> {
    let listing = state
        .store
        .get_listing(&listing_id)?
        .filter(Listing::is_active)
        .ok_or(ApiError::NotFound("Listing"))?;

    Ok(Json(listing))
}

/// Handler for listing every listing, active or not
///
/// This function handles GET requests to `/admin/api/listings`.
#[instrument(skip(state))]
pub async fn admin_list_listings_handler(State(state): State<AppState>) -> Result<Json<Vec<Listing>>, ApiError> {
    let listings = state.store.list_listings()?;

    info!("Retrieved {} listings", listings.len());

    Ok(Json(listings))
}

#[instrument(skip(state), fields(listing_id = %listing_id))]
pub async fn admin_get_listing_handler(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<Json<Listing>, ApiError> {
    let listing = state
        .store
        .get_listing(&listing_id)?
        .ok_or(ApiError::NotFound("Listing"))?;

    Ok(Json(listing))
}

/// Normalizes a JSON payload and resolves its images
///
/// Returns the draft with the references stored for it.
async fn draft_with_images(state: &AppState, payload: ListingPayloadDto) -> Result<(ListingDraft, Vec<String>), ApiError> {
    let mut draft = draft_from_payload(payload)?;
    let images = std::mem::take(&mut draft.images);
    let resolved = state.uploads.resolve(images, Vec::new()).await?;
    draft.images = resolved.images;
    Ok((draft, resolved.stored))
}

/// Passes a store result through, discarding the images stored for the
/// listing when it could not be saved
async fn saved_or_discard(state: &AppState, stored: &[String], saved: anyhow::Result<Listing>) -> Result<Listing, ApiError> {
    match saved {
        Ok(listing) => Ok(listing),
        Err(e) => {
            warn!("Listing not saved, discarding {} stored image(s)", stored.len());
            state.uploads.discard(stored).await;
            Err(e.into())
        }
    }
}

/// Handler for creating a listing from JSON
///
/// This function handles POST requests to `/admin/api/listings`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `payload` - The listing; `images` may mix stored references and
///   inline `data:` URIs, which are validated and stored first
///
/// ### Returns
///
/// The newly created listing as JSON
#[instrument(skip(state, payload), fields(title = %payload.title, listing_type = %payload.listing_type))]
pub async fn create_listing_handler(
    State(state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<ListingPayloadDto>, ApiError>,
) -> Result<Json<Listing>, ApiError> {
    info!("Creating new listing");

    let (draft, stored) = draft_with_images(&state, payload).await?;
    let listing = saved_or_discard(&state, &stored, state.store.create_listing(Listing::new(draft))).await?;

    info!("Successfully created listing with id: {}", listing.get_id());

    Ok(Json(listing))
}

/// Handler for the multipart listing form
///
/// This function handles POST requests to `/admin/api/listings/form`.
/// Text fields are normalized against the selected category; the files
/// of the submission are validated and stored before anything is
/// persisted. Images kept from an earlier version of the listing come
/// back as `existing_images` fields and stay in front of the new ones;
/// inline ones among them are checked in the same batch as the files.
#[instrument(skip(state, multipart))]
pub async fn submit_listing_form_handler(
    State(state): State<AppState>,
    WithRejection(multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<Json<Listing>, ApiError> {
    let (fields, files) = read_multipart(multipart, state.uploads.policy()).await?;
    debug!("Form submission with {} field(s) and {} file(s)", fields.len(), files.len());

    let mut draft = normalize_submission(&fields)?;

    let resolved = state
        .uploads
        .resolve(form::values(&fields, "existing_images"), files)
        .await?;
    draft.images = resolved.images;

    let listing = saved_or_discard(&state, &resolved.stored, state.store.create_listing(Listing::new(draft))).await?;

    info!("Successfully created listing with id: {}", listing.get_id());

    Ok(Json(listing))
}

/// Handler for replacing a listing
///
/// This function handles PUT requests to `/admin/api/listings/{id}`.
/// Every editable field is replaced by the payload.
#[instrument(skip(state, payload), fields(listing_id = %listing_id))]
pub async fn update_listing_handler(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
    WithRejection(Json(payload), _): WithRejection<Json<ListingPayloadDto>, ApiError>,
) -> Result<Json<Listing>, ApiError> {
    info!("Updating listing");

    // First check if the listing exists
    state
        .store
        .get_listing(&listing_id)?
        .ok_or(ApiError::NotFound("Listing"))?;

    let (draft, stored) = draft_with_images(&state, payload).await?;
    let listing = saved_or_discard(&state, &stored, state.store.update_listing(&listing_id, draft)).await?;

    info!("Successfully updated listing with id: {}", listing_id);

    Ok(Json(listing))
}

/// Handler for deleting a listing
///
/// This function handles DELETE requests to `/admin/api/listings/{id}`.
/// Notes attached to the listing are kept.
#[instrument(skip(state), fields(listing_id = %listing_id))]
pub async fn delete_listing_handler(
    State(state): State<AppState>,
    Path(listing_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    info!("Deleting listing with id: {}", listing_id);

    if !state.store.delete_listing(&listing_id)? {
        return Err(ApiError::NotFound("Listing"));
    }

    info!("Successfully deleted listing with id: {}", listing_id);

    Ok(Json(()))
}
