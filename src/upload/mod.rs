/// Image upload validation and storage
///
/// Every file of a batch is validated (size, declared MIME type,
/// filename extension, leading bytes) before any of them is stored, so a
/// bad file rejects the whole submission. Accepted files become storage
/// references according to the configured [`StorageMode`].

mod signature;
mod storage;

use axum::http::StatusCode;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::config::Config;

pub use signature::{canonical_mime, extension_of, mimes_for_extension, sniff, ImageFormat};
pub use storage::{decode_data_uri, encode_data_uri, ImageRef, LocalStorage, RemoteBucket, StorageMode};

/// URL prefix under which locally stored images are served
pub const UPLOAD_URL_PREFIX: &str = "/uploads";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("No files were uploaded")]
    NoFiles,
    #[error("Too many files: {count} sent, at most {limit} allowed")]
    TooManyFiles { count: usize, limit: usize },
    #[error("File '{filename}' is empty")]
    Empty { filename: String },
    #[error("File '{filename}' exceeds the {limit} byte limit")]
    TooLarge { filename: String, limit: usize },
    #[error("File '{filename}' has type '{mime}', which is not an accepted image type")]
    DisallowedMime { filename: String, mime: String },
    #[error("File '{filename}' has an extension that does not match its type '{mime}'")]
    ExtensionMismatch { filename: String, mime: String },
    #[error("File '{filename}' is not a recognized image")]
    UnrecognizedContent { filename: String },
    #[error("Invalid data URI: {0}")]
    InvalidDataUri(String),
    #[error("Invalid image reference '{0}'")]
    InvalidReference(String),
    #[error("Failed to store file: {0:#}")]
    Storage(#[source] anyhow::Error),
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::DisallowedMime { .. }
            | UploadError::ExtensionMismatch { .. }
            | UploadError::UnrecognizedContent { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            UploadError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

/// A file as received from the client, before validation
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub filename: String,
    /// The declared `Content-Type`
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A file that passed every check
#[derive(Debug, Clone)]
pub struct ValidatedImage {
    pub filename: String,
    /// Canonical MIME type, e.g. `image/jpeg` for a declared `image/jpg`
    pub mime: &'static str,
    /// Extension used for the stored object
    pub extension: &'static str,
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// Limits applied to every upload batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_file_bytes: usize,
    pub max_files: usize,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
            max_files: 20,
        }
    }
}

impl UploadPolicy {
    /// Upper bound for a whole multipart body, with room for text fields
    pub fn max_body_bytes(&self) -> usize {
        self.max_file_bytes
            .saturating_mul(self.max_files)
            .saturating_add(1024 * 1024)
    }

    /// Upper bound for a JSON body whose images arrive as base64 data URIs
    pub fn max_json_bytes(&self) -> usize {
        (self.max_body_bytes() / 3).saturating_mul(4)
    }
}

/// Checks one file against the policy
///
/// Checks run in order: emptiness, size, declared type, extension,
/// then the leading bytes.
pub fn validate_file(file: IncomingFile, policy: &UploadPolicy) -> Result<ValidatedImage, UploadError> {
    let IncomingFile { filename, content_type, bytes } = file;

    if bytes.is_empty() {
        return Err(UploadError::Empty { filename });
    }
    if bytes.len() > policy.max_file_bytes {
        return Err(UploadError::TooLarge {
            filename,
            limit: policy.max_file_bytes,
        });
    }

    let Some(mime) = canonical_mime(&content_type) else {
        return Err(UploadError::DisallowedMime {
            filename,
            mime: content_type,
        });
    };

    let extension_matches = extension_of(&filename)
        .map(|ext| signature::mimes_for_extension(&ext).contains(&mime))
        .unwrap_or(false);
    if !extension_matches {
        return Err(UploadError::ExtensionMismatch {
            filename,
            mime: mime.to_string(),
        });
    }

    let Some(format) = sniff(&bytes) else {
        return Err(UploadError::UnrecognizedContent { filename });
    };

    Ok(ValidatedImage {
        filename,
        mime,
        extension: signature::extension_for_mime(mime),
        format,
        bytes,
    })
}

/// Validates a whole batch, failing on the first bad file
pub fn validate_batch(files: Vec<IncomingFile>, policy: &UploadPolicy) -> Result<Vec<ValidatedImage>, UploadError> {
    if files.is_empty() {
        return Err(UploadError::NoFiles);
    }
    if files.len() > policy.max_files {
        return Err(UploadError::TooManyFiles {
            count: files.len(),
            limit: policy.max_files,
        });
    }
    files.into_iter().map(|file| validate_file(file, policy)).collect()
}

/// The image list of a listing and the references stored while
/// building it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedImages {
    pub images: Vec<String>,
    /// Freshly stored references, a subset of `images`
    pub stored: Vec<String>,
}

/// Turns validated uploads into storage references
#[derive(Debug, Clone)]
pub struct UploadPipeline {
    policy: UploadPolicy,
    mode: StorageMode,
    local: LocalStorage,
    remote: Option<RemoteBucket>,
}

impl UploadPipeline {
    pub fn new(policy: UploadPolicy, mode: StorageMode, local: LocalStorage, remote: Option<RemoteBucket>) -> Self {
        Self { policy, mode, local, remote }
    }

    /// Builds the pipeline from the server configuration
    ///
    /// Remote mode without a usable bucket configuration degrades to
    /// local storage with a warning.
    pub fn from_config(config: &Config) -> Self {
        let policy = UploadPolicy {
            max_file_bytes: config.max_upload_bytes,
            max_files: config.max_files_per_request,
        };
        let local = LocalStorage::new(config.upload_dir.clone(), UPLOAD_URL_PREFIX);

        let remote = match (config.upload_mode, &config.bucket_endpoint, &config.bucket_name) {
            (StorageMode::Remote, Some(endpoint), Some(bucket)) => {
                match RemoteBucket::new(endpoint, bucket, config.bucket_token.clone(), config.bucket_public_url.clone()) {
                    Ok(remote) => Some(remote),
                    Err(e) => {
                        warn!("Remote storage unavailable, using local storage: {:#}", e);
                        None
                    }
                }
            }
            (StorageMode::Remote, _, _) => {
                warn!("upload_mode is remote but bucket_endpoint or bucket_name is missing, using local storage");
                None
            }
            _ => None,
        };

        Self::new(policy, config.upload_mode, local, remote)
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn upload_dir(&self) -> PathBuf {
        self.local.dir().to_path_buf()
    }

    /// Validates and stores a batch of files
    ///
    /// Nothing is stored unless every file is valid. When storing fails
    /// part-way, what the batch already stored is discarded.
    #[instrument(skip(self, files), fields(count = files.len(), mode = %self.mode))]
    pub async fn ingest(&self, files: Vec<IncomingFile>) -> Result<Vec<String>, UploadError> {
        let images = validate_batch(files, &self.policy)?;

        let mut references = Vec::with_capacity(images.len());
        for image in &images {
            match self.store_one(image).await {
                Ok(reference) => references.push(reference),
                Err(e) => {
                    self.discard(&references).await;
                    return Err(e);
                }
            }
        }

        info!("Stored {} image(s)", references.len());
        Ok(references)
    }

    /// Resolves the image list of a listing together with its uploads
    ///
    /// Data URIs among `references` are decoded and validated as one
    /// batch with `files`, so the file count limit covers both and
    /// nothing is stored unless all of them are valid. Paths and URLs
    /// are checked and kept. The list keeps the order of `references`,
    /// followed by the uploaded files.
    pub async fn resolve(
        &self,
        references: Vec<String>,
        files: Vec<IncomingFile>,
    ) -> Result<ResolvedImages, UploadError> {
        let mut resolved: Vec<Option<String>> = Vec::with_capacity(references.len() + files.len());
        let mut pending = Vec::new();

        for (index, reference) in references.into_iter().enumerate() {
            match ImageRef::parse(reference.trim())? {
                ImageRef::Inline(uri) => {
                    let (content_type, bytes) = decode_data_uri(&uri)?;
                    let filename = format!(
                        "image-{}.{}",
                        index + 1,
                        canonical_mime(&content_type)
                            .map(signature::extension_for_mime)
                            .unwrap_or("bin")
                    );
                    pending.push(IncomingFile { filename, content_type, bytes });
                    resolved.push(None);
                }
                other => resolved.push(Some(other.as_str().to_string())),
            }
        }
        resolved.extend(files.iter().map(|_| None));
        pending.extend(files);

        let stored = if pending.is_empty() {
            Vec::new()
        } else {
            self.ingest(pending).await?
        };

        let mut fresh = stored.iter().cloned();
        let images = resolved
            .into_iter()
            .filter_map(|slot| slot.or_else(|| fresh.next()))
            .collect();

        Ok(ResolvedImages { images, stored })
    }

    /// Removes images stored for a listing that was then not saved
    ///
    /// Inline references hold nothing to remove. Failures are logged.
    pub async fn discard(&self, references: &[String]) {
        for reference in references {
            match ImageRef::parse(reference) {
                Ok(ImageRef::Local(path)) => self.local.remove_reference(&path).await,
                Ok(ImageRef::Remote(url)) => match &self.remote {
                    Some(remote) => remote.remove(&url).await,
                    None => warn!("No remote storage configured to remove {}", url),
                },
                _ => {}
            }
        }
        if !references.is_empty() {
            info!("Discarded {} stored image(s)", references.len());
        }
    }

    async fn store_one(&self, image: &ValidatedImage) -> Result<String, UploadError> {
        match (self.mode, &self.remote) {
            (StorageMode::Inline, _) => Ok(encode_data_uri(image.mime, &image.bytes)),
            (StorageMode::Remote, Some(remote)) => match remote.store(image).await {
                Ok(url) => Ok(url),
                Err(e) => {
                    warn!("Remote upload of '{}' failed, storing locally: {:#}", image.filename, e);
                    self.store_local(image).await
                }
            },
            _ => self.store_local(image).await,
        }
    }

    async fn store_local(&self, image: &ValidatedImage) -> Result<String, UploadError> {
        self.local.store(image).await.map_err(UploadError::Storage)
    }
}
