use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use axum_extra::extract::WithRejection;
use tracing::{debug, info, instrument};

use crate::dto::UploadResponseDto;
use crate::errors::ApiError;
use crate::form::FormFields;
use crate::upload::{IncomingFile, UploadError, UploadPolicy};
use crate::AppState;

fn multipart_error(e: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("Invalid multipart body: {}", e.body_text()))
}

/// Reads a multipart body into its text fields and its files
///
/// File parts are streamed chunk by chunk and rejected as soon as one
/// grows past the per-file limit or the batch grows past the file
/// count limit, so an oversized upload is never buffered whole. File
/// inputs left empty by the browser (no filename, no content) are
/// skipped.
pub(crate) async fn read_multipart(
    mut multipart: Multipart,
    policy: &UploadPolicy,
) -> Result<(FormFields, Vec<IncomingFile>), ApiError> {
    let mut fields = FormFields::new();
    let mut files = Vec::new();

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        let Some(filename) = field.file_name().map(str::to_string) else {
            let text = field.text().await.map_err(multipart_error)?;
            fields.push((name, text));
            continue;
        };

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            if bytes.len() + chunk.len() > policy.max_file_bytes {
                return Err(UploadError::TooLarge {
                    filename,
                    limit: policy.max_file_bytes,
                }
                .into());
            }
            bytes.extend_from_slice(&chunk);
        }

        if filename.is_empty() && bytes.is_empty() {
            debug!("Skipping empty file input '{}'", name);
            continue;
        }
        if files.len() == policy.max_files {
            return Err(UploadError::TooManyFiles {
                count: files.len() + 1,
                limit: policy.max_files,
            }
            .into());
        }

        debug!("Received file '{}' ({} bytes, {})", filename, bytes.len(), content_type);
        files.push(IncomingFile {
            filename,
            content_type,
            bytes,
        });
    }

    Ok((fields, files))
}

/// Handler for uploading images
///
/// This function handles POST requests to `/admin/api/uploads`.
///
/// ### Arguments
///
/// * `state` - The application state
/// * `multipart` - The multipart body; every file part is an image
///
/// ### Returns
///
/// The storage references of the stored images, in upload order
#[instrument(skip(state, multipart))]
pub async fn upload_images_handler(
    State(state): State<AppState>,
    WithRejection(multipart, _): WithRejection<Multipart, ApiError>,
) -> Result<Json<UploadResponseDto>, ApiError> {
    let (_, files) = read_multipart(multipart, state.uploads.policy()).await?;
    info!("Uploading {} file(s)", files.len());

    let images = state.uploads.ingest(files).await?;

    Ok(Json(UploadResponseDto { images }))
}
