//! Data-URI encoding utilities.
//!
//! Images travel through the session as self-describing data URIs
//! (`data:<mime>;base64,<payload>`): the preview of the selected file, the
//! payload sent to the model and the enhanced image that comes back. This
//! module converts between raw bytes, data URIs and decoded images.

use crate::error::{AppError, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use image::{DynamicImage, ImageFormat};
use std::fmt;
use std::path::Path;

/// MIME type reported for files whose extension is not a known image format.
pub const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Suggested file name when exporting an enhanced portrait.
pub const DEFAULT_EXPORT_FILENAME: &str = "sony-alpha-portrait.png";

/// A parsed `data:` URI carrying a base64 payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataUri {
    pub mime_type: String,
    /// Base64 payload, still encoded.
    pub data: String,
}

impl DataUri {
    /// Builds a data URI from raw bytes.
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.to_string(),
            data: BASE64.encode(bytes),
        }
    }

    /// Parses a `data:<mime>;base64,<payload>` string.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Encoding`] if the scheme, the base64 marker or
    /// the comma separator is missing.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or_else(|| AppError::encoding("missing data: scheme"))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or_else(|| AppError::encoding("missing ',' separator"))?;
        let mime_type = header
            .strip_suffix(";base64")
            .ok_or_else(|| AppError::encoding("only base64 data URIs are supported"))?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Decodes the payload back into raw bytes.
    pub fn decode_bytes(&self) -> Result<Vec<u8>> {
        Ok(BASE64.decode(self.data.as_bytes())?)
    }

    /// Decodes the payload into an image, guessing the format from its bytes.
    pub fn decode_image(&self) -> Result<DynamicImage> {
        let bytes = self.decode_bytes()?;
        image::load_from_memory(&bytes)
            .map_err(|e| AppError::encoding(format!("Failed to decode image: {}", e)))
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Encodes raw bytes as a data URI string.
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    DataUri::from_bytes(mime_type, bytes).to_string()
}

/// Returns the payload of an encoded image.
///
/// Everything up to and including the first comma is dropped; input without
/// a comma is assumed to be raw base64 already.
pub fn strip_data_uri_prefix(encoded: &str) -> &str {
    match encoded.split_once(',') {
        Some((_, payload)) => payload,
        None => encoded,
    }
}

/// Declared MIME type of a file, derived from its extension.
pub fn mime_type_for_path(path: &Path) -> String {
    ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_MIME_TYPE.to_string())
}

/// Reads a whole file and encodes it as a data URI tagged with `mime_type`.
///
/// # Errors
///
/// Returns [`AppError::Encoding`] if the file cannot be read or is empty.
pub async fn read_as_data_uri(path: &Path, mime_type: &str) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| AppError::encoding(format!("Failed to read {}: {}", path.display(), e)))?;

    if bytes.is_empty() {
        return Err(AppError::encoding(format!("{} is empty", path.display())));
    }

    Ok(encode_data_uri(mime_type, &bytes))
}

/// Decodes a data URI and writes its raw bytes to `path`.
pub fn save_data_uri(uri: &str, path: &Path) -> Result<()> {
    let bytes = DataUri::parse(uri)?.decode_bytes()?;
    std::fs::write(path, bytes)?;
    Ok(())
}
