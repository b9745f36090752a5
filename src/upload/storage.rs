use anyhow::{anyhow, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use super::{UploadError, ValidatedImage};

/// Where accepted images end up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StorageMode {
    /// Embedded in the listing as a base64 data URI
    Inline,
    /// Written under the upload directory and served from `/uploads`
    #[default]
    Local,
    /// Put into a remote object-storage bucket
    Remote,
}

impl fmt::Display for StorageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StorageMode::Inline => "inline",
            StorageMode::Local => "local",
            StorageMode::Remote => "remote",
        };
        f.write_str(name)
    }
}

/// A stored image reference as found in a listing's image list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRef {
    Inline(String),
    Local(String),
    Remote(String),
}

impl ImageRef {
    /// Classifies a reference string
    ///
    /// Local references must be absolute paths without `..` segments,
    /// remote ones `http(s)` URLs with a host.
    pub fn parse(reference: &str) -> Result<Self, UploadError> {
        let invalid = || UploadError::InvalidReference(reference.to_string());
        if reference.is_empty() || reference.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        if reference.starts_with("data:") {
            return Ok(ImageRef::Inline(reference.to_string()));
        }

        for scheme in ["https://", "http://"] {
            if let Some(rest) = reference.strip_prefix(scheme) {
                let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
                if host.is_empty() {
                    return Err(invalid());
                }
                return Ok(ImageRef::Remote(reference.to_string()));
            }
        }

        if reference.starts_with('/')
            && !reference.starts_with("//")
            && !reference.split('/').any(|segment| segment == "..")
        {
            return Ok(ImageRef::Local(reference.to_string()));
        }

        Err(invalid())
    }

    pub fn as_str(&self) -> &str {
        match self {
            ImageRef::Inline(s) | ImageRef::Local(s) | ImageRef::Remote(s) => s,
        }
    }
}

pub fn encode_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Splits a base64 data URI into its declared MIME type and payload
pub fn decode_data_uri(uri: &str) -> Result<(String, Vec<u8>), UploadError> {
    let invalid = |reason: &str| UploadError::InvalidDataUri(reason.to_string());

    let rest = uri.strip_prefix("data:").ok_or_else(|| invalid("missing 'data:' prefix"))?;
    let (header, payload) = rest.split_once(',').ok_or_else(|| invalid("missing ',' separator"))?;

    let mut parts = header.split(';');
    let mime = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(invalid("only base64 payloads are accepted"));
    }

    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| invalid(&format!("bad base64 payload: {}", e)))?;
    Ok((mime, bytes))
}

/// Stores images in a directory served back under a URL prefix
#[derive(Debug, Clone)]
pub struct LocalStorage {
    dir: PathBuf,
    url_prefix: String,
}

impl LocalStorage {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            dir: dir.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes the image under a fresh name and returns its reference
    #[instrument(skip(self, image), fields(filename = %image.filename))]
    pub async fn store(&self, image: &ValidatedImage) -> Result<String> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create upload directory {}", self.dir.display()))?;

        let name = format!("{}.{}", Uuid::new_v4(), image.extension);
        let path = self.dir.join(&name);
        tokio::fs::write(&path, &image.bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        debug!("Stored {} bytes at {}", image.bytes.len(), path.display());
        Ok(format!("{}/{}", self.url_prefix, name))
    }

    /// Deletes the file behind a reference returned by [`LocalStorage::store`]
    pub async fn remove_reference(&self, reference: &str) {
        let name = reference
            .strip_prefix(&self.url_prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| !name.is_empty() && !name.contains('/') && *name != "..");
        let Some(name) = name else {
            warn!("{} is not a reference to this upload directory", reference);
            return;
        };

        let path = self.dir.join(name);
        if let Err(e) = tokio::fs::remove_file(&path).await {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}

/// An S3-style bucket reachable with plain `PUT` and `DELETE` requests
#[derive(Debug, Clone)]
pub struct RemoteBucket {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    token: Option<String>,
    public_url: String,
}

impl RemoteBucket {
    /// Creates a bucket client
    ///
    /// Without a `public_url`, references point at `<endpoint>/<bucket>`.
    pub fn new(endpoint: &str, bucket: &str, token: Option<String>, public_url: Option<String>) -> Result<Self> {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        if endpoint.is_empty() || bucket.is_empty() {
            return Err(anyhow!("Remote storage needs both an endpoint and a bucket name"));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        let public_url = public_url
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("{}/{}", endpoint, bucket));

        Ok(Self {
            client,
            endpoint,
            bucket: bucket.to_string(),
            token,
            public_url,
        })
    }

    #[instrument(skip(self, image), fields(filename = %image.filename, bucket = %self.bucket))]
    pub async fn store(&self, image: &ValidatedImage) -> Result<String> {
        let key = format!("listings/{}.{}", Uuid::new_v4(), image.extension);
        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);

        let mut request = self
            .client
            .put(&url)
            .header(reqwest::header::CONTENT_TYPE, image.mime)
            .body(image.bytes.clone());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        request
            .send()
            .await
            .with_context(|| format!("PUT {} failed", url))?
            .error_for_status()
            .with_context(|| format!("PUT {} was rejected", url))?;

        debug!("Uploaded {} bytes to {}", image.bytes.len(), url);
        Ok(format!("{}/{}", self.public_url, key))
    }

    /// Deletes an object put by [`RemoteBucket::store`], logging failures
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn remove(&self, public_url: &str) {
        let Some(key) = public_url
            .strip_prefix(&self.public_url)
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            warn!("{} does not belong to bucket {}", public_url, self.bucket);
            return;
        };
        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);

        let mut request = self.client.delete(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        match request.send().await.and_then(|r| r.error_for_status()) {
            Ok(_) => debug!("Deleted {}", url),
            Err(e) => warn!("DELETE {} failed: {}", url, e),
        }
    }
}
