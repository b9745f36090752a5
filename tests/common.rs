/// Common test utilities for Atrium integration tests
///
/// This file contains shared functions and utilities for all integration tests,
/// including test application setup, request builders, login and listing
/// helpers, and small valid image files.

use atrium::{
    auth::{hash_password, AuthState, LoginLimiter, SessionSigner},
    config::base_config,
    create_app,
    db::init_pool,
    models::Listing,
    repo::SqlStore,
    upload::{LocalStorage, StorageMode, UploadPipeline, UploadPolicy, UPLOAD_URL_PREFIX},
    AppState,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

/// The admin password of every test app
pub const ADMIN_PASSWORD: &str = "correct horse battery staple";

/// Failed logins allowed before the limiter kicks in
pub const LOGIN_ATTEMPTS: u32 = 3;

/// A PNG signature followed by filler bytes
pub const PNG_BYTES: &[u8] = &[
    0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R',
];

/// A JPEG start-of-image marker followed by filler bytes
pub const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00];

/// A test application together with its state and temporary directory
///
/// The directory holds uploaded files and static assets and is removed
/// when the value is dropped.
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub dir: TempDir,
}

/// Creates a test application with an in-memory SQLite database
///
/// Using a fresh shared-cache in-memory database per app ensures that:
/// - Tests run quickly
/// - Tests are isolated from each other
/// - No cleanup is needed after tests
pub fn create_test_app() -> TestApp {
    create_test_app_with(UploadPolicy::default(), true)
}

/// Creates a test application with the given upload limits
///
/// With `login_enabled` off no admin password hash is configured.
pub fn create_test_app_with(policy: UploadPolicy, login_enabled: bool) -> TestApp {
    let dir = tempfile::tempdir().unwrap();

    let database_url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = init_pool(&database_url).unwrap();
    atrium::run_migrations(&mut pool.get().unwrap()).unwrap();

    let mut config = base_config(Some(dir.path().to_path_buf()));
    config.upload_dir = dir.path().join("uploads");
    config.static_dir = dir.path().join("static");

    let uploads = UploadPipeline::new(
        policy,
        StorageMode::Local,
        LocalStorage::new(config.upload_dir.clone(), UPLOAD_URL_PREFIX),
        None,
    );
    let password_hash = login_enabled.then(|| hash_password(ADMIN_PASSWORD).unwrap());
    let auth = AuthState::new(
        "admin".to_string(),
        password_hash,
        SessionSigner::new(b"integration-test-secret"),
        chrono::Duration::hours(1),
        false,
        LoginLimiter::new(LOGIN_ATTEMPTS, std::time::Duration::from_secs(600)),
    );

    let state = AppState {
        store: Arc::new(SqlStore::new(pool)),
        uploads: Arc::new(uploads),
        auth,
        config: Arc::new(config),
    };

    TestApp {
        app: create_app(state.clone()),
        state,
        dir,
    }
}

/// Sends a request and returns the status, headers and raw body
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

/// Sends a request and parses the body as JSON (`null` for an empty body)
pub async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, _, body) = send(app, request).await;
    if body.is_empty() {
        return (status, Value::Null);
    }
    (status, serde_json::from_slice(&body).unwrap())
}

/// Builds a request with an optional JSON body and bearer token
pub fn json_request(method: &str, uri: &str, body: Option<Value>, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri).method(method);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Logs in as the admin and returns the session token
pub async fn login(app: &Router) -> String {
    let request = json_request(
        "POST",
        "/api/auth/login",
        Some(json!({"username": "admin", "password": ADMIN_PASSWORD})),
        None,
    );
    let (status, body) = send_json(app, request).await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);
    body["token"].as_str().unwrap().to_string()
}

/// A valid JSON listing payload
pub fn listing_payload(title: &str, listing_type: &str) -> Value {
    json!({
        "title": title,
        "description": "Close to the sea",
        "price": 1_500_000,
        "type": listing_type,
        "city": "Izmir",
        "details": {},
        "images": [],
    })
}

/// Creates a listing through the admin API
pub async fn create_listing(app: &Router, token: &str, payload: Value) -> Listing {
    let request = json_request("POST", "/admin/api/listings", Some(payload), Some(token));
    let (status, _, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK, "create failed: {}", String::from_utf8_lossy(&body));
    serde_json::from_slice(&body).unwrap()
}

/// A file part of a multipart body
pub struct FilePart<'a> {
    pub name: &'a str,
    pub filename: &'a str,
    pub content_type: &'a str,
    pub bytes: &'a [u8],
}

const BOUNDARY: &str = "atrium-test-boundary";

/// Encodes text fields and files as a multipart/form-data body
pub fn multipart_body(fields: &[(&str, &str)], files: &[FilePart]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes());
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    for file in files {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                file.name, file.filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", file.content_type).as_bytes());
        body.extend_from_slice(file.bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Builds an authenticated multipart request
pub fn multipart_request(uri: &str, body: Vec<u8>, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method("POST")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={}", BOUNDARY))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

/// Number of files in the upload directory
pub fn stored_file_count(test_app: &TestApp) -> usize {
    match std::fs::read_dir(test_app.state.uploads.upload_dir()) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}
