/// Listing form schema and form-to-record mapping
///
/// The admin UI asks for the field list of the selected category and
/// reveals only those inputs. Submissions come back either as flat
/// multipart text fields or as a JSON payload; both are normalized here
/// into a [`ListingDraft`] whose attribute set matches its type.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::dto::ListingPayloadDto;
use crate::models::{
    CommercialUsage, DeedStatus, Heating, ListingDetails, ListingDraft, ListingStatus, ListingType,
    ZoningStatus,
};

/// Currencies a price can be quoted in
pub const CURRENCIES: &[&str] = &["TRY", "USD", "EUR", "GBP"];

pub const DEFAULT_CURRENCY: &str = "TRY";

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Missing required field '{0}'")]
    MissingField(&'static str),
    #[error("Invalid value for '{field}': {message}")]
    InvalidField { field: String, message: String },
    #[error("Invalid listing details: {0}")]
    InvalidDetails(String),
}

impl FormError {
    fn invalid(field: &str, message: impl Into<String>) -> Self {
        FormError::InvalidField {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// How an input is rendered and parsed
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Textarea,
    /// Non-negative whole number
    Integer,
    /// Non-negative decimal, `,` accepted as decimal separator
    Number,
    Boolean,
    Select { options: &'static [&'static str] },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
}

const fn field(name: &'static str, label: &'static str, kind: FieldKind) -> FormField {
    FormField { name, label, kind, required: false }
}

const fn required(name: &'static str, label: &'static str, kind: FieldKind) -> FormField {
    FormField { name, label, kind, required: true }
}

/// Inputs shown for every category
pub static COMMON_FIELDS: &[FormField] = &[
    required("type", "Property type", FieldKind::Select { options: ListingType::NAMES }),
    required("title", "Title", FieldKind::Text),
    field("description", "Description", FieldKind::Textarea),
    required("price", "Price", FieldKind::Integer),
    field("currency", "Currency", FieldKind::Select { options: CURRENCIES }),
    field("city", "City", FieldKind::Text),
    field("district", "District", FieldKind::Text),
    field("neighborhood", "Neighborhood", FieldKind::Text),
    field("gross_area", "Gross area (m²)", FieldKind::Number),
    field("net_area", "Net area (m²)", FieldKind::Number),
    field("status", "Status", FieldKind::Select { options: ListingStatus::NAMES }),
    field("display_order", "Display order", FieldKind::Integer),
];

pub static APARTMENT_FIELDS: &[FormField] = &[
    field("room_count", "Rooms (e.g. 3+1)", FieldKind::Text),
    field("bathroom_count", "Bathrooms", FieldKind::Integer),
    field("floor", "Floor", FieldKind::Text),
    field("total_floors", "Floors in building", FieldKind::Integer),
    field("building_age", "Building age", FieldKind::Integer),
    field("heating", "Heating", FieldKind::Select { options: Heating::NAMES }),
    field("furnished", "Furnished", FieldKind::Boolean),
    field("balcony", "Balcony", FieldKind::Boolean),
    field("elevator", "Elevator", FieldKind::Boolean),
    field("parking", "Parking", FieldKind::Boolean),
    field("in_complex", "Inside a gated complex", FieldKind::Boolean),
    field("monthly_dues", "Monthly dues", FieldKind::Integer),
];

pub static LAND_FIELDS: &[FormField] = &[
    field("zoning_status", "Zoning status", FieldKind::Select { options: ZoningStatus::NAMES }),
    field("block_number", "Block number", FieldKind::Text),
    field("parcel_number", "Parcel number", FieldKind::Text),
    field("sheet_number", "Sheet number", FieldKind::Text),
    field("floor_area_ratio", "Floor area ratio", FieldKind::Number),
    field("height_limit", "Height limit (m)", FieldKind::Number),
    field("deed_status", "Deed status", FieldKind::Select { options: DeedStatus::NAMES }),
];

pub static FIELD_FIELDS: &[FormField] = &[
    field("block_number", "Block number", FieldKind::Text),
    field("parcel_number", "Parcel number", FieldKind::Text),
    field("deed_status", "Deed status", FieldKind::Select { options: DeedStatus::NAMES }),
    field("water_access", "Water access", FieldKind::Boolean),
    field("electricity", "Electricity", FieldKind::Boolean),
    field("road_access", "Road access", FieldKind::Boolean),
    field("soil_type", "Soil type", FieldKind::Text),
];

pub static COMMERCIAL_FIELDS: &[FormField] = &[
    field("usage", "Usage", FieldKind::Select { options: CommercialUsage::NAMES }),
    field("section_count", "Sections", FieldKind::Integer),
    field("floor", "Floor", FieldKind::Text),
    field("building_age", "Building age", FieldKind::Integer),
    field("heating", "Heating", FieldKind::Select { options: Heating::NAMES }),
    field("ceiling_height", "Ceiling height (m)", FieldKind::Number),
    field("currently_rented", "Currently rented", FieldKind::Boolean),
];

/// The inputs revealed for one category
pub fn category_fields(listing_type: ListingType) -> &'static [FormField] {
    match listing_type {
        ListingType::Apartment => APARTMENT_FIELDS,
        ListingType::Land => LAND_FIELDS,
        ListingType::Field => FIELD_FIELDS,
        ListingType::Commercial => COMMERCIAL_FIELDS,
    }
}

/// Full form for a category, as served to the admin UI
#[derive(Debug, Clone, Serialize)]
pub struct FormSchema {
    #[serde(rename = "type")]
    pub listing_type: ListingType,
    pub fields: Vec<FormField>,
}

/// Common inputs followed by the category's own inputs
pub fn form_schema(listing_type: ListingType) -> FormSchema {
    let fields = COMMON_FIELDS
        .iter()
        .chain(category_fields(listing_type))
        .copied()
        .collect();
    FormSchema { listing_type, fields }
}

/// Flat text fields of a submitted form, in arrival order
///
/// A name can repeat (e.g. `existing_images`).
pub type FormFields = Vec<(String, String)>;

/// Last non-empty, trimmed value submitted for a name
fn value<'a>(fields: &'a [(String, String)], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .rev()
        .filter(|(key, _)| key == name)
        .map(|(_, v)| v.trim())
        .find(|v| !v.is_empty())
}

/// Every non-empty value submitted for a name, in order
pub fn values(fields: &[(String, String)], name: &str) -> Vec<String> {
    fields
        .iter()
        .filter(|(key, _)| key == name)
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses a price in whole currency units
///
/// Thousands may be grouped with `.`, `,`, `_`, `'` or spaces; every group
/// after the first must have three digits, so `1.250.000` is accepted and
/// `12,50` is rejected as a fraction.
pub fn parse_price(raw: &str) -> Result<i64, String> {
    let raw = raw.trim();
    let groups: Vec<&str> = raw
        .split(|c: char| matches!(c, '.' | ',' | '_' | '\'' | ' '))
        .collect();
    if groups.iter().any(|g| g.is_empty() || !g.chars().all(|c| c.is_ascii_digit())) {
        return Err(format!("'{}' is not a whole, non-negative amount", raw));
    }
    if groups.len() > 1 && (groups[0].len() > 3 || groups[1..].iter().any(|g| g.len() != 3)) {
        return Err(format!("'{}' is not a whole amount", raw));
    }
    groups
        .concat()
        .parse::<i64>()
        .map_err(|_| format!("'{}' is out of range", raw))
}

fn parse_decimal(raw: &str) -> Result<f64, String> {
    let parsed = raw
        .trim()
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| format!("'{}' is not a number", raw))?;
    if !parsed.is_finite() || parsed < 0.0 {
        return Err(format!("'{}' must be a non-negative number", raw));
    }
    Ok(parsed)
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" | "checked" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        other => Err(format!("'{}' is not a yes/no value", other)),
    }
}

/// Converts one raw input to the JSON value its kind describes
fn parse_input(kind: FieldKind, raw: &str) -> Result<Value, String> {
    match kind {
        FieldKind::Text | FieldKind::Textarea => Ok(Value::String(raw.to_string())),
        FieldKind::Integer => raw
            .parse::<u64>()
            .map(Value::from)
            .map_err(|_| format!("'{}' is not a whole, non-negative number", raw)),
        FieldKind::Number => parse_decimal(raw).map(Value::from),
        FieldKind::Boolean => parse_bool(raw).map(Value::Bool),
        FieldKind::Select { options } => {
            let lowered = raw.to_ascii_lowercase();
            options
                .iter()
                .find(|o| o.eq_ignore_ascii_case(&lowered))
                .map(|o| Value::String(o.to_string()))
                .ok_or_else(|| format!("'{}' is not one of: {}", raw, options.join(", ")))
        }
    }
}

fn optional_text(fields: &[(String, String)], name: &str) -> Option<String> {
    value(fields, name).map(str::to_string)
}

fn optional_area(fields: &[(String, String)], name: &str) -> Result<Option<f64>, FormError> {
    value(fields, name)
        .map(|raw| parse_decimal(raw).map_err(|m| FormError::invalid(name, m)))
        .transpose()
}

fn normalize_currency(raw: Option<&str>) -> Result<String, FormError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_CURRENCY.to_string());
    };
    CURRENCIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(raw.trim()))
        .map(|c| c.to_string())
        .ok_or_else(|| FormError::invalid("currency", format!("'{}' is not one of: {}", raw, CURRENCIES.join(", "))))
}

/// Maps a submitted form onto a normalized listing draft
///
/// Checks that `title`, `type` and `price` are present, parses every
/// input according to its declared kind, and keeps only the attribute
/// inputs of the selected type. The returned draft has no images; the
/// caller adds them after the upload pipeline has run.
pub fn normalize_submission(fields: &[(String, String)]) -> Result<ListingDraft, FormError> {
    let listing_type: ListingType = value(fields, "type")
        .ok_or(FormError::MissingField("type"))?
        .parse()
        .map_err(|e: String| FormError::invalid("type", e))?;
    let title = optional_text(fields, "title").ok_or(FormError::MissingField("title"))?;
    let price = parse_price(value(fields, "price").ok_or(FormError::MissingField("price"))?)
        .map_err(|m| FormError::invalid("price", m))?;

    let status = value(fields, "status")
        .map(|raw| raw.parse::<ListingStatus>().map_err(|e| FormError::invalid("status", e)))
        .transpose()?
        .unwrap_or_default();
    let display_order = value(fields, "display_order")
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| FormError::invalid("display_order", format!("'{}' is not a whole number", raw)))
        })
        .transpose()?;

    let mut attributes = Map::new();
    for input in category_fields(listing_type) {
        if let Some(raw) = value(fields, input.name) {
            let parsed = parse_input(input.kind, raw).map_err(|m| FormError::invalid(input.name, m))?;
            attributes.insert(input.name.to_string(), parsed);
        }
    }
    let details = ListingDetails::from_value(listing_type, Value::Object(attributes))
        .map_err(|e| FormError::InvalidDetails(e.to_string()))?;

    Ok(ListingDraft {
        title,
        description: optional_text(fields, "description").unwrap_or_default(),
        price,
        currency: normalize_currency(value(fields, "currency"))?,
        details,
        city: optional_text(fields, "city"),
        district: optional_text(fields, "district"),
        neighborhood: optional_text(fields, "neighborhood"),
        gross_area: optional_area(fields, "gross_area")?,
        net_area: optional_area(fields, "net_area")?,
        images: Vec::new(),
        status,
        display_order,
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn check_area(name: &str, area: Option<f64>) -> Result<Option<f64>, FormError> {
    match area {
        Some(a) if !a.is_finite() || a < 0.0 => Err(FormError::invalid(name, "must be a non-negative number")),
        other => Ok(other),
    }
}

/// Normalizes a JSON listing payload the same way as a form submission
///
/// Image references are carried over untouched; resolving inline data
/// URIs is the upload pipeline's job.
pub fn draft_from_payload(payload: ListingPayloadDto) -> Result<ListingDraft, FormError> {
    let title = non_empty(Some(payload.title)).ok_or(FormError::MissingField("title"))?;
    if payload.price < 0 {
        return Err(FormError::invalid("price", "must not be negative"));
    }
    let details = ListingDetails::from_value(payload.listing_type, payload.details)
        .map_err(|e| FormError::InvalidDetails(e.to_string()))?;

    Ok(ListingDraft {
        title,
        description: payload.description.unwrap_or_default(),
        price: payload.price,
        currency: normalize_currency(payload.currency.as_deref())?,
        details,
        city: non_empty(payload.city),
        district: non_empty(payload.district),
        neighborhood: non_empty(payload.neighborhood),
        gross_area: check_area("gross_area", payload.gross_area)?,
        net_area: check_area("net_area", payload.net_area)?,
        images: payload.images,
        status: payload.status.unwrap_or_default(),
        display_order: payload.display_order,
    })
}
