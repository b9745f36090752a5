mod common;

use atrium::models::Listing;
use atrium::upload::UploadPolicy;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::*;
use serde_json::json;

/// Tests creating a listing and reading it back through both APIs
///
/// This test verifies:
/// 1. The admin API creates the listing with the submitted fields
/// 2. The public API returns the same listing
/// 3. Category details of another type are dropped
#[tokio::test]
async fn test_create_and_get_listing() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;

    let mut payload = listing_payload("Sea view flat", "apartment");
    payload["details"] = json!({"room_count": "3+1", "furnished": true, "zoning_status": "residential"});
    let created = create_listing(&test_app.app, &token, payload).await;

    assert_eq!(created.get_title(), "Sea view flat");
    assert_eq!(created.get_price(), 1_500_000);
    assert_eq!(created.get_currency(), "TRY");
    assert_eq!(created.get_details(), json!({"room_count": "3+1", "furnished": true}));

    let uri = format!("/api/listings/{}", created.get_id());
    let (status, body) = send_json(&test_app.app, json_request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let fetched: Listing = serde_json::from_value(body).unwrap();
    assert_eq!(fetched, created);
}

/// Tests that the public catalogue hides inactive listings while the
/// admin API still shows them
#[tokio::test]
async fn test_inactive_listings_are_hidden_from_the_public() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;

    let active = create_listing(&test_app.app, &token, listing_payload("Active", "land")).await;
    let mut payload = listing_payload("Hidden", "land");
    payload["status"] = json!("inactive");
    let hidden = create_listing(&test_app.app, &token, payload).await;

    let (status, body) = send_json(&test_app.app, json_request("GET", "/api/listings", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    let public: Vec<Listing> = serde_json::from_value(body).unwrap();
    assert_eq!(public.len(), 1);
    assert_eq!(public[0].get_id(), active.get_id());

    let uri = format!("/api/listings/{}", hidden.get_id());
    let (status, _) = send_json(&test_app.app, json_request("GET", &uri, None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send_json(&test_app.app, json_request("GET", "/admin/api/listings", None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let uri = format!("/admin/api/listings/{}", hidden.get_id());
    let (status, body) = send_json(&test_app.app, json_request("GET", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "inactive");
}

/// Tests the catalogue filters and ordering
#[tokio::test]
async fn test_catalogue_filters_and_order() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;

    let mut first = listing_payload("Cheap land", "land");
    first["price"] = json!(200_000);
    first["display_order"] = json!(2);
    let first = create_listing(&test_app.app, &token, first).await;

    let mut second = listing_payload("Shop", "commercial");
    second["city"] = json!("Ankara");
    second["display_order"] = json!(1);
    let second = create_listing(&test_app.app, &token, second).await;

    let third = create_listing(&test_app.app, &token, listing_payload("Flat", "apartment")).await;

    let (_, body) = send_json(&test_app.app, json_request("GET", "/api/listings", None, None)).await;
    let ids: Vec<String> = serde_json::from_value::<Vec<Listing>>(body)
        .unwrap()
        .iter()
        .map(Listing::get_id)
        .collect();
    assert_eq!(ids, vec![second.get_id(), first.get_id(), third.get_id()]);

    let (_, body) = send_json(&test_app.app, json_request("GET", "/api/listings?city=izmir", None, None)).await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send_json(&test_app.app, json_request("GET", "/api/listings?type=commercial", None, None)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], second.get_id());

    let (_, body) = send_json(&test_app.app, json_request("GET", "/api/listings?max_price=500000", None, None)).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["id"], first.get_id());

    let (status, _) = send_json(&test_app.app, json_request("GET", "/api/listings?type=castle", None, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Tests that PUT replaces every editable field, including the type
#[tokio::test]
async fn test_update_listing_replaces_fields() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;

    let mut payload = listing_payload("Flat", "apartment");
    payload["details"] = json!({"room_count": "2+1"});
    payload["district"] = json!("Karsiyaka");
    let created = create_listing(&test_app.app, &token, payload).await;

    let mut replacement = listing_payload("Plot", "land");
    replacement["details"] = json!({"room_count": "2+1", "parcel_number": "12"});
    replacement["currency"] = json!("usd");
    let uri = format!("/admin/api/listings/{}", created.get_id());
    let (status, body) = send_json(&test_app.app, json_request("PUT", &uri, Some(replacement), Some(&token))).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let updated: Listing = serde_json::from_value(body).unwrap();
    assert_eq!(updated.get_id(), created.get_id());
    assert_eq!(updated.get_title(), "Plot");
    assert_eq!(updated.get_currency(), "USD");
    assert_eq!(updated.get_district(), None);
    assert_eq!(updated.get_details(), json!({"parcel_number": "12"}));
    assert_eq!(updated.get_created_at(), created.get_created_at());
}

/// Tests the not-found and validation answers of the admin listing API
#[tokio::test]
async fn test_listing_errors() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;

    let missing = "/admin/api/listings/00000000-0000-0000-0000-000000000000";
    let payload = listing_payload("Flat", "apartment");
    let (status, _) = send_json(&test_app.app, json_request("PUT", missing, Some(payload), Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send_json(&test_app.app, json_request("DELETE", missing, None, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let mut blank_title = listing_payload("   ", "apartment");
    blank_title["title"] = json!("  ");
    let (status, body) = send_json(
        &test_app.app,
        json_request("POST", "/admin/api/listings", Some(blank_title), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("title"));

    let mut negative = listing_payload("Flat", "apartment");
    negative["price"] = json!(-5);
    let (status, _) = send_json(
        &test_app.app,
        json_request("POST", "/admin/api/listings", Some(negative), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut bad_currency = listing_payload("Flat", "apartment");
    bad_currency["currency"] = json!("DOGE");
    let (status, _) = send_json(
        &test_app.app,
        json_request("POST", "/admin/api/listings", Some(bad_currency), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

/// Tests deleting a listing
#[tokio::test]
async fn test_delete_listing() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;
    let created = create_listing(&test_app.app, &token, listing_payload("Flat", "apartment")).await;

    let uri = format!("/admin/api/listings/{}", created.get_id());
    let (status, _) = send_json(&test_app.app, json_request("DELETE", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send_json(&test_app.app, json_request("GET", &uri, None, Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Tests the multipart listing form
///
/// This test verifies:
/// 1. Text fields are parsed by the selected category's rules
/// 2. Kept images stay in front of newly uploaded ones
/// 3. Uploaded files land in the upload directory
#[tokio::test]
async fn test_submit_listing_form() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;

    let body = multipart_body(
        &[
            ("type", "apartment"),
            ("title", "Garden flat"),
            ("price", "2.750.000"),
            ("currency", "eur"),
            ("gross_area", "120,5"),
            ("room_count", "3+1"),
            ("furnished", "on"),
            ("parcel_number", "99"),
            ("existing_images", "/uploads/kept.jpg"),
        ],
        &[FilePart {
            name: "images",
            filename: "front.png",
            content_type: "image/png",
            bytes: PNG_BYTES,
        }],
    );
    let (status, body) = send_json(
        &test_app.app,
        multipart_request("/admin/api/listings/form", body, &token),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let listing: Listing = serde_json::from_value(body).unwrap();
    assert_eq!(listing.get_price(), 2_750_000);
    assert_eq!(listing.get_currency(), "EUR");
    assert_eq!(listing.get_gross_area(), Some(120.5));
    assert_eq!(listing.get_details(), json!({"room_count": "3+1", "furnished": true}));

    let images = listing.get_images();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0], "/uploads/kept.jpg");
    assert!(images[1].starts_with("/uploads/") && images[1].ends_with(".png"));
    assert_eq!(stored_file_count(&test_app), 1);
}

/// Tests that a form with an invalid field stores nothing
#[tokio::test]
async fn test_submit_listing_form_rejects_bad_fields() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;

    let body = multipart_body(
        &[("type", "land"), ("title", "Plot"), ("price", "12,50")],
        &[FilePart {
            name: "images",
            filename: "plot.jpg",
            content_type: "image/jpeg",
            bytes: JPEG_BYTES,
        }],
    );
    let (status, body) = send_json(
        &test_app.app,
        multipart_request("/admin/api/listings/form", body, &token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("price"));
    assert_eq!(stored_file_count(&test_app), 0);

    let (_, body) = send_json(&test_app.app, json_request("GET", "/admin/api/listings", None, Some(&token))).await;
    assert!(body.as_array().unwrap().is_empty());
}

/// Tests that inline data URIs in a JSON payload are stored as files
#[tokio::test]
async fn test_json_listing_with_inline_image() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;

    let mut payload = listing_payload("Flat", "apartment");
    payload["images"] = json!([
        atrium::upload::encode_data_uri("image/jpeg", JPEG_BYTES),
        "https://cdn.example.com/a.jpg",
    ]);
    let listing = create_listing(&test_app.app, &token, payload).await;

    let images = listing.get_images();
    assert_eq!(images.len(), 2);
    assert!(images[0].starts_with("/uploads/") && images[0].ends_with(".jpg"));
    assert_eq!(images[1], "https://cdn.example.com/a.jpg");
    assert_eq!(stored_file_count(&test_app), 1);
}

/// Tests that kept inline images and uploaded files form one batch
///
/// This test verifies:
/// 1. A bad file rejects the form even when a kept data URI is valid
/// 2. Nothing is left in the upload directory afterwards
/// 3. Kept data URIs count towards the file limit
#[tokio::test]
async fn test_submit_listing_form_checks_kept_and_new_images_together() {
    let test_app = create_test_app_with(UploadPolicy { max_file_bytes: 1024, max_files: 2 }, true);
    let token = login(&test_app.app).await;
    let kept = atrium::upload::encode_data_uri("image/png", PNG_BYTES);

    let body = multipart_body(
        &[("type", "land"), ("title", "Plot"), ("price", "900000"), ("existing_images", &kept)],
        &[FilePart {
            name: "images",
            filename: "notes.txt",
            content_type: "text/plain",
            bytes: b"not an image",
        }],
    );
    let (status, body) = send_json(
        &test_app.app,
        multipart_request("/admin/api/listings/form", body, &token),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].as_str().unwrap().contains("notes.txt"));
    assert_eq!(stored_file_count(&test_app), 0);

    let body = multipart_body(
        &[
            ("type", "land"),
            ("title", "Plot"),
            ("price", "900000"),
            ("existing_images", &kept),
            ("existing_images", &kept),
        ],
        &[FilePart {
            name: "images",
            filename: "plot.jpg",
            content_type: "image/jpeg",
            bytes: JPEG_BYTES,
        }],
    );
    let (status, body) = send_json(
        &test_app.app,
        multipart_request("/admin/api/listings/form", body, &token),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Too many files"));
    assert_eq!(stored_file_count(&test_app), 0);

    let (_, body) = send_json(&test_app.app, json_request("GET", "/admin/api/listings", None, Some(&token))).await;
    assert!(body.as_array().unwrap().is_empty());
}

/// Tests that unreadable JSON bodies get a JSON error
#[tokio::test]
async fn test_malformed_body_is_a_json_bad_request() {
    let test_app = create_test_app();
    let token = login(&test_app.app).await;

    let request = json_request(
        "POST",
        "/admin/api/listings",
        Some(json!({"title": "x", "price": "cheap", "type": "villa"})),
        Some(&token),
    );
    let (status, headers, body) = send(&test_app.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "application/json");
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(body["error"].as_str().unwrap().contains("price"), "{}", body);

    let request = Request::builder()
        .uri("/admin/api/listings")
        .method("POST")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("{\"title\": "))
        .unwrap();
    let (status, body) = send_json(&test_app.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let request = Request::builder()
        .uri("/admin/api/listings/form")
        .method("POST")
        .header(header::CONTENT_TYPE, "text/plain")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from("title=x"))
        .unwrap();
    let (status, body) = send_json(&test_app.app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid multipart body"));
}

/// Tests that a JSON body over the limit gets a JSON 413
#[tokio::test]
async fn test_oversized_json_body() {
    let policy = UploadPolicy { max_file_bytes: 1024, max_files: 2 };
    let test_app = create_test_app_with(policy, true);
    let token = login(&test_app.app).await;

    let mut payload = listing_payload("Flat", "apartment");
    payload["description"] = json!("x".repeat(policy.max_json_bytes() + 1));
    let (status, body) = send_json(
        &test_app.app,
        json_request("POST", "/admin/api/listings", Some(payload), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body["error"].is_string());
}
