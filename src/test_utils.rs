use crate::*;
use crate::auth::{LoginLimiter, SessionSigner};
use crate::models::{ApartmentDetails, ListingDetails, ListingDraft, ListingStatus, ListingType};
use crate::upload::{LocalStorage, StorageMode, UploadPipeline, UploadPolicy, UPLOAD_URL_PREFIX};
use axum::body::Body;
use axum::http::{Request, StatusCode};
use diesel::RunQueryDsl;
use proptest::prelude::*;
use std::path::Path;
use std::sync::Arc;
use tower::ServiceExt;

/// Password accepted by [`test_app_state`]
pub const TEST_PASSWORD: &str = "open sesame";

/// Sets up a test database with migrations applied
///
/// Plain ":memory:" gives each connection its own separate database,
/// so a unique shared-cache URI keeps all connections of the pool on
/// one database while staying isolated from other tests.
pub fn setup_test_db() -> db::DbPool {
    let unique_id = uuid::Uuid::new_v4();
    let database_url = format!("file:test_{}?mode=memory&cache=shared", unique_id);
    let pool = db::init_pool(&database_url).expect("Failed to create pool");

    let mut conn = pool.get().expect("Failed to get connection");
    run_migrations(&mut conn).expect("Failed to run migrations");

    pool
}

/// Configuration pointing every path into `dir`
pub fn test_config_in(dir: &Path) -> config::Config {
    let mut config = config::base_config(Some(dir.to_path_buf()));
    config.upload_dir = dir.join("uploads");
    config.static_dir = dir.join("static");
    config
}

/// Configuration with relative paths, for tests that never touch disk
pub fn test_config() -> config::Config {
    config::base_config(None)
}

/// Application state on a fresh in-memory database
///
/// Images are stored under `dir`; the admin password is [`TEST_PASSWORD`].
pub fn test_app_state(dir: &Path) -> AppState {
    let config = test_config_in(dir);
    let uploads = UploadPipeline::new(
        UploadPolicy::default(),
        StorageMode::Local,
        LocalStorage::new(config.upload_dir.clone(), UPLOAD_URL_PREFIX),
        None,
    );
    let auth = auth::AuthState::new(
        "admin".to_string(),
        Some(auth::hash_password(TEST_PASSWORD).expect("Failed to hash password")),
        SessionSigner::new(b"test-secret"),
        chrono::Duration::hours(1),
        false,
        LoginLimiter::new(3, std::time::Duration::from_secs(900)),
    );

    AppState {
        store: Arc::new(repo::SqlStore::new(setup_test_db())),
        uploads: Arc::new(uploads),
        auth,
        config: Arc::new(config),
    }
}

/// A valid apartment draft
pub fn sample_draft(title: &str, display_order: Option<i32>) -> ListingDraft {
    ListingDraft {
        title: title.to_string(),
        description: "Sunny, close to the metro".to_string(),
        price: 2_500_000,
        currency: "TRY".to_string(),
        details: ListingDetails::Apartment(ApartmentDetails {
            room_count: Some("3+1".to_string()),
            bathroom_count: Some(2),
            ..Default::default()
        }),
        city: Some("Istanbul".to_string()),
        district: Some("Kadikoy".to_string()),
        neighborhood: None,
        gross_area: Some(120.0),
        net_area: Some(105.0),
        images: vec![],
        status: ListingStatus::Active,
        display_order,
    }
}

/// A draft of the given type with an empty attribute set
pub fn draft_of_type(title: &str, listing_type: ListingType, status: ListingStatus) -> ListingDraft {
    ListingDraft {
        details: ListingDetails::empty(listing_type),
        status,
        ..sample_draft(title, None)
    }
}

/// Generates strings mixing ASCII, whitespace and non-ASCII text
pub fn arb_messy_string() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-zA-Z0-9_./:-]{0,32}",
        "\\PC{0,24}",
        Just(String::new()),
        Just("  padded  ".to_string()),
    ]
}

/// Generates a listing type
pub fn arb_listing_type() -> impl Strategy<Value = ListingType> {
    (0..ListingType::ALL.len()).prop_map(|i| ListingType::ALL[i])
}

/// Generates an optional display order, half of them unset
pub fn arb_display_order() -> impl Strategy<Value = Option<i32>> {
    prop_oneof![Just(None), (-50i32..50).prop_map(Some)]
}

#[derive(diesel::QueryableByName, Debug)]
struct TableName {
    #[diesel(sql_type = diesel::sql_types::Text)]
    name: String,
}

/// The test database has every table and the app answers on it
#[tokio::test]
async fn test_setup_test_db() {
    let pool = setup_test_db();
    let mut conn = pool.get().unwrap();

    let table_names: Vec<TableName> = diesel::sql_query("SELECT name FROM sqlite_master WHERE type='table'")
        .load(&mut conn)
        .expect("Failed to load table names");

    for table in ["listings", "notes", "leads", "__diesel_schema_migrations"] {
        assert!(table_names.iter().any(|t| t.name == table), "Table '{}' not found in database", table);
    }
    drop(conn);

    let dir = tempfile::tempdir().unwrap();
    let app = create_app(test_app_state(dir.path()));
    let request = Request::builder()
        .uri("/api/listings")
        .method("GET")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
