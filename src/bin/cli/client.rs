use atrium::dto::{
    CreateNoteDto, ListingPayloadDto, ListingQueryDto, LoginDto, LoginResponseDto, UploadResponseDto,
};
use atrium::models::{Lead, Listing, Note};
use atrium::upload::{extension_of, mimes_for_extension};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use std::path::{Path, PathBuf};

/// Error type for CLI client operations
#[derive(Debug)]
pub enum ClientError {
    /// Server returned an error status with a message body
    Server { status: reqwest::StatusCode, message: String },
    /// Network/connection/request error
    Request(reqwest::Error),
    /// A local file could not be read
    File { path: String, source: std::io::Error },
    /// An admin command was run without a session token
    MissingToken,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClientError::Server { status, message } => {
                write!(f, "Server error ({}): {}", status.as_u16(), message)
            }
            ClientError::Request(err) => write!(f, "{}", err),
            ClientError::File { path, source } => write!(f, "Failed to read {}: {}", path, source),
            ClientError::MissingToken => {
                write!(f, "No session token; run `atrium-cli login` and set ATRIUM_TOKEN")
            }
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::Request(err) => Some(err),
            ClientError::File { source, .. } => Some(source),
            ClientError::Server { .. } | ClientError::MissingToken => None,
        }
    }
}

/// Extension trait for checking HTTP responses and extracting server error messages
trait ResponseExt {
    /// Checks for error status and extracts the server's error message body
    async fn check(self) -> Result<reqwest::Response, ClientError>;
}

impl ResponseExt for reqwest::Response {
    async fn check(self) -> Result<reqwest::Response, ClientError> {
        if self.status().is_success() {
            return Ok(self);
        }
        let status = self.status();
        let message = match self.json::<serde_json::Value>().await {
            Ok(body) => body.get("error")
                .and_then(|e| e.as_str())
                .unwrap_or("Unknown error")
                .to_string(),
            Err(_) => format!("HTTP {}", status),
        };
        Err(ClientError::Server { status, message })
    }
}

/// HTTP client wrapper for communicating with the Atrium server
pub struct AtriumClient {
    /// The base URL of the server (e.g. "http://localhost:3000")
    base_url: String,
    /// Admin session token, sent as a bearer token
    token: Option<String>,
    /// The underlying HTTP client
    client: Client,
}

/// Builds query parameters for the public catalogue
fn build_query_params(query: &ListingQueryDto) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = Vec::new();

    if let Some(listing_type) = query.listing_type {
        params.push(("type", listing_type.to_string()));
    }
    if let Some(ref city) = query.city {
        params.push(("city", city.clone()));
    }
    if let Some(min) = query.min_price {
        params.push(("min_price", min.to_string()));
    }
    if let Some(max) = query.max_price {
        params.push(("max_price", max.to_string()));
    }

    params
}

/// A multipart part for an image file, typed from its extension
fn image_part(path: &Path) -> Result<Part, ClientError> {
    let bytes = std::fs::read(path).map_err(|source| ClientError::File {
        path: path.display().to_string(),
        source,
    })?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = extension_of(&filename)
        .and_then(|ext| mimes_for_extension(&ext).first().copied())
        .unwrap_or("application/octet-stream");

    Part::bytes(bytes)
        .file_name(filename)
        .mime_str(mime)
        .map_err(ClientError::Request)
}

impl AtriumClient {
    /// Creates a new AtriumClient
    ///
    /// ### Arguments
    ///
    /// * `base_url` - The base URL of the Atrium server
    /// * `token` - The admin session token, needed by admin commands
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url,
            token,
            client: Client::new(),
        }
    }

    /// Adds the session token to an admin request
    fn admin(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_deref().ok_or(ClientError::MissingToken)?;
        Ok(request.bearer_auth(token))
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Logs in and returns the session token
    pub async fn login(&self, username: String, password: String) -> Result<LoginResponseDto, ClientError> {
        let url = format!("{}/api/auth/login", self.base_url);
        let dto = LoginDto { username, password };
        let response = self.client.post(&url).json(&dto).send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    // ── Listing endpoints ────────────────────────────────────────────

    /// Lists the active listings of the public catalogue
    pub async fn list_listings(&self, query: &ListingQueryDto) -> Result<Vec<Listing>, ClientError> {
        let url = format!("{}/api/listings", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&build_query_params(query))
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Lists every listing, including inactive ones
    pub async fn list_all_listings(&self) -> Result<Vec<Listing>, ClientError> {
        let url = format!("{}/admin/api/listings", self.base_url);
        let response = self.admin(self.client.get(&url))?.send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Gets a listing; inactive listings need a session
    pub async fn get_listing(&self, id: &str) -> Result<Listing, ClientError> {
        let request = match self.token {
            Some(_) => self.admin(self.client.get(format!("{}/admin/api/listings/{}", self.base_url, id)))?,
            None => self.client.get(format!("{}/api/listings/{}", self.base_url, id)),
        };
        let response = request.send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Creates a listing from a JSON payload
    pub async fn create_listing(&self, payload: &ListingPayloadDto) -> Result<Listing, ClientError> {
        let url = format!("{}/admin/api/listings", self.base_url);
        let response = self
            .admin(self.client.post(&url).json(payload))?
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Replaces a listing with a JSON payload
    pub async fn update_listing(&self, id: &str, payload: &ListingPayloadDto) -> Result<Listing, ClientError> {
        let url = format!("{}/admin/api/listings/{}", self.base_url, id);
        let response = self
            .admin(self.client.put(&url).json(payload))?
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Deletes a listing
    pub async fn delete_listing(&self, id: &str) -> Result<(), ClientError> {
        let url = format!("{}/admin/api/listings/{}", self.base_url, id);
        self.admin(self.client.delete(&url))?.send().await.map_err(ClientError::Request)?.check().await?;
        Ok(())
    }

    // ── Note endpoints ───────────────────────────────────────────────

    /// Lists notes, optionally only those of one listing
    pub async fn list_notes(&self, listing_id: Option<&str>) -> Result<Vec<Note>, ClientError> {
        let url = format!("{}/admin/api/notes", self.base_url);
        let mut request = self.client.get(&url);
        if let Some(listing_id) = listing_id {
            request = request.query(&[("listing_id", listing_id)]);
        }
        let response = self.admin(request)?.send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Attaches a note to a listing
    pub async fn create_note(&self, dto: &CreateNoteDto) -> Result<Note, ClientError> {
        let url = format!("{}/admin/api/notes", self.base_url);
        let response = self.admin(self.client.post(&url).json(dto))?.send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Deletes a note
    pub async fn delete_note(&self, id: &str) -> Result<(), ClientError> {
        let url = format!("{}/admin/api/notes/{}", self.base_url, id);
        self.admin(self.client.delete(&url))?.send().await.map_err(ClientError::Request)?.check().await?;
        Ok(())
    }

    // ── Lead endpoints ───────────────────────────────────────────────

    /// Lists contact-form leads, newest first
    pub async fn list_leads(&self) -> Result<Vec<Lead>, ClientError> {
        let url = format!("{}/admin/api/leads", self.base_url);
        let response = self.admin(self.client.get(&url))?.send().await.map_err(ClientError::Request)?.check().await?;
        response.json().await.map_err(ClientError::Request)
    }

    /// Deletes a lead
    pub async fn delete_lead(&self, id: &str) -> Result<(), ClientError> {
        let url = format!("{}/admin/api/leads/{}", self.base_url, id);
        self.admin(self.client.delete(&url))?.send().await.map_err(ClientError::Request)?.check().await?;
        Ok(())
    }

    // ── Uploads ──────────────────────────────────────────────────────

    /// Uploads image files and returns their storage references
    pub async fn upload_images(&self, paths: &[PathBuf]) -> Result<Vec<String>, ClientError> {
        let url = format!("{}/admin/api/uploads", self.base_url);
        let mut form = Form::new();
        for path in paths {
            form = form.part("images", image_part(path)?);
        }
        let response = self
            .admin(self.client.post(&url).multipart(form))?
            .send()
            .await
            .map_err(ClientError::Request)?
            .check()
            .await?;
        let uploaded: UploadResponseDto = response.json().await.map_err(ClientError::Request)?;
        Ok(uploaded.images)
    }
}
