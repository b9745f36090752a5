use crate::db::DbPool;
use crate::models::Lead;
use crate::schema::leads;
use diesel::prelude::*;
use anyhow::Result;

pub fn create_lead(pool: &DbPool, lead: Lead) -> Result<Lead> {
    let conn = &mut pool.get()?;

    diesel::insert_into(leads::table)
        .values(&lead)
        .execute(conn)?;

    Ok(lead)
}

/// Lists leads, newest first
pub fn list_leads(pool: &DbPool) -> Result<Vec<Lead>> {
    let conn = &mut pool.get()?;

    let result = leads::table
        .select(Lead::as_select())
        .order(leads::id.desc())
        .load::<Lead>(conn)?;

    Ok(result)
}

pub fn delete_lead(pool: &DbPool, lead_id: &str) -> Result<bool> {
    let conn = &mut pool.get()?;

    let deleted = diesel::delete(leads::table.find(lead_id)).execute(conn)?;

    Ok(deleted > 0)
}
