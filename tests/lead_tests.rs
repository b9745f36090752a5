mod common;

use atrium::dto::ContactDto;
use atrium::models::Lead;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::*;
use serde_json::json;

fn contact_form(contact: &ContactDto) -> Request<Body> {
    Request::builder()
        .uri("/api/contact")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(serde_html_form::to_string(contact).unwrap()))
        .unwrap()
}

fn contact(name: &str, email: &str, message: &str) -> ContactDto {
    ContactDto {
        name: name.to_string(),
        email: email.to_string(),
        phone: None,
        message: message.to_string(),
        listing_id: None,
    }
}

/// Tests submitting the contact form as an urlencoded body
///
/// This test verifies:
/// 1. The submission is stored with trimmed fields
/// 2. An empty phone number is stored as absent
/// 3. The admin sees it among the leads
#[tokio::test]
async fn test_contact_form_creates_lead() {
    let test_app = create_test_app();

    let mut submission = contact("  Ayse Yilmaz ", "ayse@example.com", "Is the flat still available?");
    submission.phone = Some(" ".to_string());
    submission.listing_id = Some("listing-1".to_string());

    let (status, body) = send_json(&test_app.app, contact_form(&submission)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let lead: Lead = serde_json::from_value(body).unwrap();
    assert_eq!(lead.get_name(), "Ayse Yilmaz");
    assert_eq!(lead.get_phone(), None);
    assert_eq!(lead.get_listing_id(), Some("listing-1".to_string()));

    let token = login(&test_app.app).await;
    let (status, body) = send_json(&test_app.app, json_request("GET", "/admin/api/leads", None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], lead.get_id());
}

/// Tests submitting the contact form as JSON
#[tokio::test]
async fn test_contact_json_creates_lead() {
    let test_app = create_test_app();

    let request = json_request(
        "POST",
        "/api/contact",
        Some(json!({"name": "Can", "email": "can@example.org", "phone": "+90 555 000 0000", "message": "Call me"})),
        None,
    );
    let (status, body) = send_json(&test_app.app, request).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["phone"], "+90 555 000 0000");
}

/// Tests the validation of contact submissions
#[tokio::test]
async fn test_contact_validation() {
    let test_app = create_test_app();

    for submission in [
        contact("", "a@example.com", "Hello"),
        contact("Ali", "not-an-email", "Hello"),
        contact("Ali", "ali@localhost", "Hello"),
        contact("Ali", "ali@example.com", "   "),
    ] {
        let (status, body) = send_json(&test_app.app, contact_form(&submission)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{:?}", submission);
        assert!(body["error"].is_string());
    }

    let request = Request::builder()
        .uri("/api/contact")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("name=Ali"))
        .unwrap();
    let (status, _) = send_json(&test_app.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Tests that leads are listed newest first and can be deleted
#[tokio::test]
async fn test_leads_order_and_delete() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;

    for name in ["First", "Second", "Third"] {
        let (status, _) = send_json(&test_app.app, contact_form(&contact(name, "x@example.com", "Hi"))).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send_json(&test_app.app, json_request("GET", "/admin/api/leads", None, Some(&token))).await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|lead| lead["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Third", "Second", "First"]);

    let uri = format!("/admin/api/leads/{}", body[0]["id"].as_str().unwrap());
    let (status, _) = send_json(&test_app.app, json_request("DELETE", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send_json(&test_app.app, json_request("DELETE", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send_json(&test_app.app, json_request("GET", "/admin/api/leads", None, Some(&token))).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}
