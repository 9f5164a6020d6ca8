//! Getting the enhanced portrait out of the wizard.

use crate::encoding::{DataUri, save_data_uri};
use crate::error::{AppError, Result};
use std::borrow::Cow;
use std::path::Path;

/// Writes the enhanced image to `path`.
pub fn export_to_file(uri: &str, path: &Path) -> Result<()> {
    save_data_uri(uri, path)?;
    tracing::info!(path = %path.display(), "Exported enhanced portrait");
    Ok(())
}

/// Places the decoded image on the system clipboard.
pub fn copy_to_clipboard(uri: &str) -> Result<()> {
    let image = DataUri::parse(uri)?.decode_image()?.to_rgba8();
    let (width, height) = image.dimensions();

    let mut clipboard = arboard::Clipboard::new()
        .map_err(|e| AppError::ui(format!("Could not access clipboard: {}", e)))?;
    clipboard
        .set_image(arboard::ImageData {
            width: width as usize,
            height: height as usize,
            bytes: Cow::Owned(image.into_raw()),
        })
        .map_err(|e| AppError::ui(format!("Failed to copy image: {}", e)))?;
    Ok(())
}
