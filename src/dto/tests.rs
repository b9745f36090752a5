use super::*;
use serde_json::json;

#[test]
fn test_listing_payload_minimal() {
    let dto: ListingPayloadDto = serde_json::from_value(json!({
        "title": "Plot near the coast",
        "price": 900000,
        "type": "land"
    }))
    .unwrap();

    assert_eq!(dto.listing_type, ListingType::Land);
    assert!(dto.details.is_null());
    assert!(dto.images.is_empty());
    assert!(dto.status.is_none());
    assert!(dto.display_order.is_none());
}

#[test]
fn test_listing_payload_rejects_unknown_type() {
    let result = serde_json::from_value::<ListingPayloadDto>(json!({
        "title": "Castle",
        "price": 1,
        "type": "castle"
    }));
    assert!(result.is_err());
}

#[test]
fn test_listing_payload_requires_price() {
    let result = serde_json::from_value::<ListingPayloadDto>(json!({
        "title": "Flat",
        "type": "apartment"
    }));
    assert!(result.is_err());
}

#[test]
fn test_listing_query_dto_default() {
    let dto = ListingQueryDto::default();
    assert!(dto.listing_type.is_none());
    assert!(dto.city.is_none());
    assert!(dto.min_price.is_none());
    assert!(dto.max_price.is_none());
}

#[test]
fn test_listing_query_from_query_string() {
    let dto: ListingQueryDto = serde_html_form::from_str("type=commercial&city=Bursa&min_price=100").unwrap();
    assert_eq!(dto.listing_type, Some(ListingType::Commercial));
    assert_eq!(dto.city.as_deref(), Some("Bursa"));
    assert_eq!(dto.min_price, Some(100));
    assert_eq!(dto.max_price, None);
}

#[test]
fn test_create_note_defaults() {
    let dto: CreateNoteDto = serde_json::from_value(json!({
        "listing_id": "abc",
        "title": "Keys"
    }))
    .unwrap();

    assert_eq!(dto.body, "");
    assert_eq!(dto.category, NoteCategory::General);
    assert_eq!(dto.priority, NotePriority::Normal);
    assert!(dto.visible);
}

#[test]
fn test_update_note_dto_partial() {
    let dto: UpdateNoteDto = serde_json::from_value(json!({"priority": "urgent"})).unwrap();
    assert_eq!(dto.priority, Some(NotePriority::Urgent));
    assert!(dto.title.is_none());
    assert!(dto.visible.is_none());
}

#[test]
fn test_contact_dto_from_urlencoded() {
    let dto: ContactDto = serde_html_form::from_str(
        "name=Ay%C5%9Fe&email=ayse%40example.com&message=Is+it+still+available%3F",
    )
    .unwrap();
    assert_eq!(dto.name, "Ayşe");
    assert_eq!(dto.email, "ayse@example.com");
    assert_eq!(dto.message, "Is it still available?");
    assert!(dto.phone.is_none());
    assert!(dto.listing_id.is_none());
}
