use std::path::PathBuf;

use crate::client::AtriumClient;
use crate::output::{self, OutputConfig};

/// Uploads image files and prints their storage references
pub async fn execute(
    client: &AtriumClient,
    files: Vec<PathBuf>,
    config: &OutputConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    if files.is_empty() {
        return Err("No files given".into());
    }
    let images = client.upload_images(&files).await?;
    output::print_images(&images, config);
    Ok(())
}
