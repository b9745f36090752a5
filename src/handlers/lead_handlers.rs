use axum::{
    extract::{FromRequest, Path, Request, State},
    http::header::CONTENT_TYPE,
    Form, Json,
};
use tracing::{info, instrument};

use crate::dto::ContactDto;
use crate::errors::ApiError;
use crate::models::Lead;
use crate::AppState;

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Checks a contact submission and builds the lead
fn lead_from_contact(contact: ContactDto) -> Result<Lead, ApiError> {
    let name = contact.name.trim().to_string();
    let email = contact.email.trim().to_string();
    let message = contact.message.trim().to_string();

    if name.is_empty() {
        return Err(ApiError::BadRequest("Name is required".to_string()));
    }
    if message.is_empty() {
        return Err(ApiError::BadRequest("Message is required".to_string()));
    }
    let well_formed = email
        .split_once('@')
        .is_some_and(|(user, domain)| !user.is_empty() && domain.contains('.') && !domain.ends_with('.'));
    if !well_formed {
        return Err(ApiError::BadRequest(format!("'{}' is not a valid email address", email)));
    }

    Ok(Lead::new(
        name,
        email,
        trimmed(contact.phone),
        message,
        trimmed(contact.listing_id),
    ))
}

/// Handler for the public contact form
///
/// This function handles POST requests to `/api/contact`. The body is
/// read as JSON when the request says so, and as an urlencoded form
/// otherwise.
#[instrument(skip(state, request))]
pub async fn create_lead_handler(State(state): State<AppState>, request: Request) -> Result<Json<Lead>, ApiError> {
    let is_json = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));

    let contact = if is_json {
        Json::<ContactDto>::from_request(request, &()).await?.0
    } else {
        Form::<ContactDto>::from_request(request, &()).await?.0
    };

    let lead = state.store.create_lead(lead_from_contact(contact)?)?;

    info!("Stored lead {}", lead.get_id());

    Ok(Json(lead))
}

/// Handler for listing leads, newest first
///
/// This function handles GET requests to `/admin/api/leads`.
#[instrument(skip(state))]
pub async fn list_leads_handler(State(state): State<AppState>) -> Result<Json<Vec<Lead>>, ApiError> {
    let leads = state.store.list_leads()?;

    info!("Retrieved {} leads", leads.len());

    Ok(Json(leads))
}

#[instrument(skip(state), fields(lead_id = %lead_id))]
pub async fn delete_lead_handler(
    State(state): State<AppState>,
    Path(lead_id): Path<String>,
) -> Result<Json<()>, ApiError> {
    if !state.store.delete_lead(&lead_id)? {
        return Err(ApiError::NotFound("Lead"));
    }

    info!("Deleted lead {}", lead_id);

    Ok(Json(()))
}
