/// Atrium: a real-estate agency backend
///
/// This library provides the listings catalogue, the category-dependent
/// listing form, the image upload pipeline, admin notes, contact leads
/// and the admin session guard, served as a web API.
///
/// ### Modules
///
/// - `auth`: Admin credentials, session tokens, the `/admin` guard and the login limiter
/// - `config`: Layered configuration (defaults, config file, command line)
/// - `db`: Database connection management
/// - `form`: The listing form of each category and submission normalization
/// - `models`: Data structures for listings, notes and leads
/// - `repo`: Storage backends (SQLite, JSON file, fallback between the two)
/// - `upload`: Image validation and storage
///
/// ### Web API
///
/// Public:
///
/// - `GET /api/health`: Liveness and the active store backend
/// - `GET /api/listings`: Active listings, filterable by `type`, `city`, `min_price`, `max_price`
/// - `GET /api/listings/{id}`: One active listing
/// - `GET /api/listing-form`, `GET /api/listing-form/{type}`: Form schemas
/// - `POST /api/contact`: Submit the contact form
/// - `POST /api/auth/login`, `POST /api/auth/logout`: Admin session
///
/// Admin, behind a session (`/admin/api/...`): listings (JSON and
/// multipart form), notes, uploads, leads and the session itself.
/// Everything else under `/admin` is served from the `admin` directory
/// of the static assets, behind the same guard.

/// Admin authentication
pub mod auth;

/// Configuration module
pub mod config;

/// Database connection module
pub mod db;

/// Data transfer objects
pub mod dto;

/// API error type
pub mod errors;

/// Listing form schemas and normalization
pub mod form;

/// Web API handlers
pub mod handlers;

/// Data models module
pub mod models;

/// Repository module for data access
pub mod repo;

/// Database schema module
pub mod schema;

/// Image upload pipeline
pub mod upload;

#[cfg(test)]
pub mod test_utils;

use anyhow::anyhow;
use axum::{
    extract::{DefaultBodyLimit, FromRef},
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::auth::{require_admin, AuthState};
use crate::config::Config;
use crate::handlers::*;
use crate::repo::Store;
use crate::upload::UploadPipeline;

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub uploads: Arc<UploadPipeline>,
    pub auth: AuthState,
    pub config: Arc<Config>,
}

impl AppState {
    /// Opens the configured store and sets up uploads and auth
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let store = repo::open_store(&config)?;
        let uploads = UploadPipeline::from_config(&config);
        let auth = AuthState::from_config(&config);

        Ok(Self {
            store,
            uploads: Arc::new(uploads),
            auth,
            config: Arc::new(config),
        })
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

/// Creates the application router with all routes
///
/// ### Arguments
///
/// * `state` - The store, upload pipeline, auth state and configuration
///   shared with all handlers
///
/// ### Returns
///
/// An Axum Router configured with all routes, the admin guard, static
/// file serving and request tracing
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes behind the admin session
    let admin = Router::new()
        .route("/api/session", get(session_handler))
        .route("/api/listings", get(admin_list_listings_handler).post(create_listing_handler))
        .route("/api/listings/form", post(submit_listing_form_handler))
        .route(
            "/api/listings/{id}",
            get(admin_get_listing_handler)
                .put(update_listing_handler)
                .delete(delete_listing_handler),
        )
        .route("/api/listings/{id}/notes", get(list_listing_notes_handler))
        .route("/api/notes", get(list_notes_handler).post(create_note_handler))
        .route(
            "/api/notes/{id}",
            get(get_note_handler).put(update_note_handler).delete(delete_note_handler),
        )
        .route("/api/uploads", post(upload_images_handler))
        .route("/api/leads", get(list_leads_handler))
        .route("/api/leads/{id}", delete(delete_lead_handler))
        // The admin panel itself
        .fallback_service(ServeDir::new(state.config.static_dir.join("admin")))
        // Inline images make JSON bodies larger than the upload limit
        .layer(DefaultBodyLimit::max(state.uploads.policy().max_json_bytes()))
        .layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/listings", get(list_listings_handler))
        .route("/api/listings/{id}", get(get_listing_handler))
        .route("/api/listing-form", get(list_form_schemas_handler))
        .route("/api/listing-form/{type}", get(get_form_schema_handler))
        .route("/api/contact", post(create_lead_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/logout", post(logout_handler))
        .nest("/admin", admin)
        .nest_service("/uploads", ServeDir::new(state.uploads.upload_dir()))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Runs the embedded migrations
///
/// ### Arguments
///
/// * `conn` - A mutable reference to a SQLite connection
pub fn run_migrations(conn: &mut diesel::SqliteConnection) -> anyhow::Result<()> {
    use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

    // Define the embedded migrations
    const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

    // Run all pending migrations
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow!("Failed to run migrations: {}", e))?;
    Ok(())
}
