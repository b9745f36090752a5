use crate::db::DbPool;
use crate::models::{sort_for_catalogue, Listing, ListingDraft};
use crate::schema::listings;
use diesel::prelude::*;
use anyhow::{anyhow, Result};
use tracing::instrument;

/// Inserts a new listing
///
/// ### Errors
///
/// Returns an error if:
/// - Unable to get a connection from the pool
/// - The database insert operation fails
#[instrument(skip(pool, listing), fields(listing_id = %listing.get_id()))]
pub fn create_listing(pool: &DbPool, listing: Listing) -> Result<Listing> {
    let conn = &mut pool.get()?;

    diesel::insert_into(listings::table)
        .values(&listing)
        .execute(conn)?;

    Ok(listing)
}

/// Retrieves a listing by its ID, `None` when it does not exist
pub fn get_listing(pool: &DbPool, listing_id: &str) -> Result<Option<Listing>> {
    let conn = &mut pool.get()?;

    let result = listings::table
        .find(listing_id)
        .select(Listing::as_select())
        .first::<Listing>(conn)
        .optional()?;

    Ok(result)
}

/// Lists every listing in catalogue order
///
/// Listings with a `display_order` come first, ascending; the rest
/// follow in id order, which is creation order.
pub fn list_listings(pool: &DbPool) -> Result<Vec<Listing>> {
    let conn = &mut pool.get()?;

    let mut result = listings::table
        .select(Listing::as_select())
        .load::<Listing>(conn)?;
    sort_for_catalogue(&mut result);

    Ok(result)
}

/// Replaces every editable field of an existing listing
///
/// ### Errors
///
/// Returns an error if the listing does not exist or the update fails
#[instrument(skip(pool, draft))]
pub fn update_listing(pool: &DbPool, listing_id: &str, draft: ListingDraft) -> Result<Listing> {
    let conn = &mut pool.get()?;

    let mut listing = listings::table
        .find(listing_id)
        .select(Listing::as_select())
        .first::<Listing>(conn)
        .map_err(|e| anyhow!("Failed to update listing {}: {}", listing_id, e))?;

    listing.replace_with(draft);

    diesel::update(listings::table.find(listing_id))
        .set(&listing)
        .execute(conn)?;

    Ok(listing)
}

/// Deletes a listing, returning whether it existed
///
/// Notes attached to the listing are kept.
#[instrument(skip(pool))]
pub fn delete_listing(pool: &DbPool, listing_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(listings::table.find(listing_id)).execute(conn)?;

    Ok(deleted > 0)
}
