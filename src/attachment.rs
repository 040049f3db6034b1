//! Image attachments
//!
//! Images travel through the session as data URIs
//! (`data:<mime>;base64,<payload>`). This module converts files on disk into
//! that form and splits a data URI back into the inline payload the tutor
//! sends upstream.

use crate::llm::{ContentBlock, ImageSource};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Maximum image size (5MB)
pub const MAX_IMAGE_SIZE: u64 = 5 * 1024 * 1024;

/// Media types accepted as attachments
pub const SUPPORTED_MEDIA_TYPES: &[&str] = &["image/png", "image/jpeg", "image/gif", "image/webp"];

#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("Not a file: {}", .0.display())]
    NotAFile(PathBuf),
    #[error("Unsupported image format: {0} (supported: png, jpg, gif, webp)")]
    UnsupportedFormat(String),
    #[error("Image too large: {size} bytes (max {max} bytes)", max = MAX_IMAGE_SIZE)]
    TooLarge { size: u64 },
    #[error("Malformed data URI: {0}")]
    MalformedDataUri(&'static str),
    #[error("Cannot read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Decoded image payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    /// Base64 body, without the data URI header
    pub data: String,
    pub media_type: String,
}

impl ImageData {
    /// Split a `data:<mime>;base64,<payload>` URI
    pub fn from_data_uri(uri: &str) -> Result<Self, AttachmentError> {
        let rest = uri
            .strip_prefix("data:")
            .ok_or(AttachmentError::MalformedDataUri("missing data: scheme"))?;
        let (header, data) = rest
            .split_once(',')
            .ok_or(AttachmentError::MalformedDataUri("missing payload separator"))?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or(AttachmentError::MalformedDataUri("payload is not base64"))?;

        if !SUPPORTED_MEDIA_TYPES.contains(&media_type) {
            return Err(AttachmentError::UnsupportedFormat(media_type.to_string()));
        }
        if data.is_empty() {
            return Err(AttachmentError::MalformedDataUri("empty payload"));
        }
        // The payload is stored in the transcript and resent every turn
        if BASE64.decode(data).is_err() {
            return Err(AttachmentError::MalformedDataUri("payload is not valid base64"));
        }

        Ok(Self {
            data: data.to_string(),
            media_type: media_type.to_string(),
        })
    }

    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    pub fn to_image_source(&self) -> ImageSource {
        ImageSource::Base64 {
            media_type: self.media_type.clone(),
            data: self.data.clone(),
        }
    }

    pub fn to_content_block(&self) -> ContentBlock {
        ContentBlock::Image {
            source: self.to_image_source(),
        }
    }
}

fn media_type_for(path: &Path) -> Result<&'static str, AttachmentError> {
    let guess = mime_guess::from_path(path).first_raw();
    guess
        .and_then(|mime| SUPPORTED_MEDIA_TYPES.iter().copied().find(|t| *t == mime))
        .ok_or_else(|| {
            AttachmentError::UnsupportedFormat(
                path.extension()
                    .map_or_else(|| "no extension".to_string(), |e| e.to_string_lossy().into_owned()),
            )
        })
}

/// Read an image file into a displayable payload.
///
/// Checks run before the file is read so a wrong path or a huge file fails
/// fast.
pub async fn load_image(path: impl AsRef<Path>) -> Result<ImageData, AttachmentError> {
    let path = path.as_ref();

    let metadata = match fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AttachmentError::NotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    if !metadata.is_file() {
        return Err(AttachmentError::NotAFile(path.to_path_buf()));
    }

    let media_type = media_type_for(path)?;

    if metadata.len() > MAX_IMAGE_SIZE {
        return Err(AttachmentError::TooLarge {
            size: metadata.len(),
        });
    }

    let bytes = fs::read(path).await?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), media_type, "Loaded image attachment");

    Ok(ImageData {
        data: BASE64.encode(&bytes),
        media_type: media_type.to_string(),
    })
}
