use std::path::PathBuf;
use serde::{Deserialize, Serialize};
use directories::ProjectDirs;
use clap::{Parser, ValueEnum};
use std::fs;
use tracing::{info, warn};

use crate::upload::StorageMode;

/// Which backend persists listings, notes and leads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// SQLite through the connection pool
    #[default]
    Database,
    /// A single JSON document on disk
    File,
}

/// Configuration for the Atrium server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Address the HTTP server binds to
    pub bind_address: String,
    pub store: StoreKind,
    /// URL for the database connection
    pub database_url: String,
    /// Path of the JSON file store
    pub data_file: PathBuf,
    /// Use the JSON file when the database fails
    pub file_fallback: bool,
    /// Directory of static assets served for unmatched paths
    pub static_dir: PathBuf,
    pub upload_mode: StorageMode,
    /// Where locally stored images are written
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub max_files_per_request: usize,
    pub bucket_endpoint: Option<String>,
    pub bucket_name: Option<String>,
    pub bucket_token: Option<String>,
    /// Public base URL of the bucket, defaults to `<endpoint>/<bucket>`
    pub bucket_public_url: Option<String>,
    pub admin_username: String,
    /// Argon2 PHC string; login is disabled without it
    pub admin_password_hash: Option<String>,
    /// Key for session signatures; random per process when unset
    pub session_secret: Option<String>,
    pub session_ttl_hours: i64,
    /// Mark the session cookie `Secure`
    pub secure_cookies: bool,
    pub login_max_attempts: u32,
    pub login_window_minutes: u64,
    /// Directory for daily rolling log files
    pub log_dir: Option<PathBuf>,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

/// Update structure for Config with all fields optional
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ConfigUpdate {
    pub bind_address: Option<String>,
    pub store: Option<StoreKind>,
    pub database_url: Option<String>,
    pub data_file: Option<PathBuf>,
    pub file_fallback: Option<bool>,
    pub static_dir: Option<PathBuf>,
    pub upload_mode: Option<StorageMode>,
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: Option<usize>,
    pub max_files_per_request: Option<usize>,
    pub bucket_endpoint: Option<String>,
    pub bucket_name: Option<String>,
    pub bucket_token: Option<String>,
    pub bucket_public_url: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password_hash: Option<String>,
    pub session_secret: Option<String>,
    pub session_ttl_hours: Option<i64>,
    pub secure_cookies: Option<bool>,
    pub login_max_attempts: Option<u32>,
    pub login_window_minutes: Option<u64>,
    pub log_dir: Option<PathBuf>,
    pub log_json: Option<bool>,
    /// Server the CLI talks to; ignored by the server itself
    pub server_url: Option<String>,
}

/// Command line arguments for the server
#[derive(Parser, Debug, Default)]
#[clap(name = "atrium", about = "Real-estate listings backend")]
pub struct CliArgs {
    /// Address to listen on
    #[clap(long, env = "ATRIUM_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// Storage backend
    #[clap(long, value_enum, env = "ATRIUM_STORE")]
    pub store: Option<StoreKind>,

    /// Database URL
    #[clap(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// JSON file used by the file store
    #[clap(long, env = "ATRIUM_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Fall back to the JSON file when the database fails
    #[clap(long, env = "ATRIUM_FILE_FALLBACK")]
    pub file_fallback: Option<bool>,

    /// Directory of static assets
    #[clap(long, env = "ATRIUM_STATIC_DIR")]
    pub static_dir: Option<PathBuf>,

    /// Where accepted images are stored
    #[clap(long, value_enum, env = "ATRIUM_UPLOAD_MODE")]
    pub upload_mode: Option<StorageMode>,

    /// Directory for locally stored images
    #[clap(long, env = "ATRIUM_UPLOAD_DIR")]
    pub upload_dir: Option<PathBuf>,

    /// Largest accepted image in bytes
    #[clap(long, env = "ATRIUM_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: Option<usize>,

    /// Most images accepted in one request
    #[clap(long, env = "ATRIUM_MAX_FILES_PER_REQUEST")]
    pub max_files_per_request: Option<usize>,

    /// Object storage endpoint, e.g. https://s3.example.com
    #[clap(long, env = "ATRIUM_BUCKET_ENDPOINT")]
    pub bucket_endpoint: Option<String>,

    #[clap(long, env = "ATRIUM_BUCKET_NAME")]
    pub bucket_name: Option<String>,

    /// Bearer token sent with bucket uploads
    #[clap(long, env = "ATRIUM_BUCKET_TOKEN", hide_env_values = true)]
    pub bucket_token: Option<String>,

    #[clap(long, env = "ATRIUM_BUCKET_PUBLIC_URL")]
    pub bucket_public_url: Option<String>,

    #[clap(long, env = "ATRIUM_ADMIN_USERNAME")]
    pub admin_username: Option<String>,

    /// Argon2 hash of the admin password (see `atrium-cli hash-password`)
    #[clap(long, env = "ATRIUM_ADMIN_PASSWORD_HASH", hide_env_values = true)]
    pub admin_password_hash: Option<String>,

    /// Secret used to sign session tokens
    #[clap(long, env = "ATRIUM_SESSION_SECRET", hide_env_values = true)]
    pub session_secret: Option<String>,

    #[clap(long, env = "ATRIUM_SESSION_TTL_HOURS")]
    pub session_ttl_hours: Option<i64>,

    #[clap(long, env = "ATRIUM_SECURE_COOKIES")]
    pub secure_cookies: Option<bool>,

    #[clap(long, env = "ATRIUM_LOGIN_MAX_ATTEMPTS")]
    pub login_max_attempts: Option<u32>,

    #[clap(long, env = "ATRIUM_LOGIN_WINDOW_MINUTES")]
    pub login_window_minutes: Option<u64>,

    /// Directory for rolling log files
    #[clap(long, env = "ATRIUM_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Log as JSON lines
    #[clap(long, env = "ATRIUM_LOG_JSON")]
    pub log_json: Option<bool>,

    /// Config file to read instead of the one in the config directory
    #[clap(long, env = "ATRIUM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Debug mode
    #[clap(long, env = "ATRIUM_DEBUG", default_value_t = false)]
    pub debug: bool,
}

impl Config {
    /// Applies a config update to the current configuration
    pub fn apply_update(self, update: ConfigUpdate) -> Self {
        Self {
            bind_address: update.bind_address.unwrap_or(self.bind_address),
            store: update.store.unwrap_or(self.store),
            database_url: update.database_url.unwrap_or(self.database_url),
            data_file: update.data_file.unwrap_or(self.data_file),
            file_fallback: update.file_fallback.unwrap_or(self.file_fallback),
            static_dir: update.static_dir.unwrap_or(self.static_dir),
            upload_mode: update.upload_mode.unwrap_or(self.upload_mode),
            upload_dir: update.upload_dir.unwrap_or(self.upload_dir),
            max_upload_bytes: update.max_upload_bytes.unwrap_or(self.max_upload_bytes),
            max_files_per_request: update.max_files_per_request.unwrap_or(self.max_files_per_request),
            bucket_endpoint: update.bucket_endpoint.or(self.bucket_endpoint),
            bucket_name: update.bucket_name.or(self.bucket_name),
            bucket_token: update.bucket_token.or(self.bucket_token),
            bucket_public_url: update.bucket_public_url.or(self.bucket_public_url),
            admin_username: update.admin_username.unwrap_or(self.admin_username),
            admin_password_hash: update.admin_password_hash.or(self.admin_password_hash),
            session_secret: update.session_secret.or(self.session_secret),
            session_ttl_hours: update.session_ttl_hours.unwrap_or(self.session_ttl_hours),
            secure_cookies: update.secure_cookies.unwrap_or(self.secure_cookies),
            login_max_attempts: update.login_max_attempts.unwrap_or(self.login_max_attempts),
            login_window_minutes: update.login_window_minutes.unwrap_or(self.login_window_minutes),
            log_dir: update.log_dir.or(self.log_dir),
            log_json: update.log_json.unwrap_or(self.log_json),
        }
    }
}

/// Returns the base (default) configuration
///
/// With a config directory, the database and JSON file live inside it.
pub fn base_config(config_path: Option<PathBuf>) -> Config {
    let in_dir = |name: &str| config_path.as_ref().map_or(PathBuf::from(name), |path| path.join(name));

    Config {
        bind_address: "0.0.0.0:3000".to_string(),
        store: StoreKind::Database,
        database_url: in_dir("atrium.db").to_string_lossy().to_string(),
        data_file: in_dir("atrium.json"),
        file_fallback: true,
        static_dir: PathBuf::from("static"),
        upload_mode: StorageMode::Local,
        upload_dir: PathBuf::from("uploads"),
        max_upload_bytes: 10 * 1024 * 1024,
        max_files_per_request: 20,
        bucket_endpoint: None,
        bucket_name: None,
        bucket_token: None,
        bucket_public_url: None,
        admin_username: "admin".to_string(),
        admin_password_hash: None,
        session_secret: None,
        session_ttl_hours: 12,
        secure_cookies: false,
        login_max_attempts: 5,
        login_window_minutes: 15,
        log_dir: None,
        log_json: false,
    }
}

/// Loads configuration from a TOML file
pub fn config_from_file(config_path: Option<PathBuf>) -> Result<ConfigUpdate, String> {
    let Some(config_path) = config_path else {
        return Ok(ConfigUpdate::default());
    };

    if !config_path.exists() {
        info!("Config file not found at {:?}, using defaults", config_path);
        return Ok(ConfigUpdate::default());
    }

    match fs::read_to_string(&config_path) {
        Ok(content) => match toml::from_str::<ConfigUpdate>(&content) {
            Ok(config) => {
                info!("Loaded configuration from {:?}", config_path);
                Ok(config)
            },
            Err(e) => {
                warn!("Failed to parse config file: {}", e);
                Err(format!("Failed to parse config file: {}", e))
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}", e);
            Err(format!("Failed to read config file: {}", e))
        }
    }
}

/// Loads configuration from command line arguments
pub fn config_from_args(args: CliArgs) -> ConfigUpdate {
    ConfigUpdate {
        bind_address: args.bind_address,
        store: args.store,
        database_url: args.database_url,
        data_file: args.data_file,
        file_fallback: args.file_fallback,
        static_dir: args.static_dir,
        upload_mode: args.upload_mode,
        upload_dir: args.upload_dir,
        max_upload_bytes: args.max_upload_bytes,
        max_files_per_request: args.max_files_per_request,
        bucket_endpoint: args.bucket_endpoint,
        bucket_name: args.bucket_name,
        bucket_token: args.bucket_token,
        bucket_public_url: args.bucket_public_url,
        admin_username: args.admin_username,
        admin_password_hash: args.admin_password_hash,
        session_secret: args.session_secret,
        session_ttl_hours: args.session_ttl_hours,
        secure_cookies: args.secure_cookies,
        login_max_attempts: args.login_max_attempts,
        login_window_minutes: args.login_window_minutes,
        log_dir: args.log_dir,
        log_json: args.log_json,
        server_url: None,
    }
}

/// The platform config directory, when it exists
pub fn get_config_dir_path() -> Option<PathBuf> {
    let path = match ProjectDirs::from("com", "atrium", "atrium") {
        Some(proj_dirs) => proj_dirs.config_dir().to_path_buf(),
        None => {
            warn!("Could not determine XDG config directory, skipping config file");
            return None;
        }
    };

    if !path.exists() {
        info!("Config path not found at {:?}, using defaults", path);
        return None;
    }
    Some(path)
}

/// Gets the complete configuration by combining defaults with
/// values from config file, environment variables, and command line arguments
/// in order of increasing precedence
pub fn get_config(args: CliArgs) -> Config {
    let config_dir = get_config_dir_path();
    let config_file = args
        .config
        .clone()
        .or_else(|| config_dir.as_ref().map(|dir| dir.join("config.toml")));

    let base = base_config(config_dir);

    // Apply updates in order of increasing precedence
    let config = base
        .apply_update(config_from_file(config_file).unwrap_or_default())
        .apply_update(config_from_args(args));

    info!(
        "Final configuration: bind_address={}, store={:?}, database_url={}, upload_mode={}, file_fallback={}",
        config.bind_address, config.store, config.database_url, config.upload_mode, config.file_fallback
    );

    config
}


#[cfg(test)]
mod prop_tests;
