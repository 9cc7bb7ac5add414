//! Image encoding: local reference to inline base64 payload.

use base64::Engine;
use std::io::ErrorKind;

use stylecheck_core::{Error, ImagePayload, Result};

/// MIME type selected from the reference's extension. Unknown extensions
/// fall back to JPEG, which every camera pipeline here produces.
fn mime_for(reference: &str) -> &'static str {
    let lower = reference.to_lowercase();
    if lower.contains(".png") {
        "image/png"
    } else if lower.contains(".gif") {
        "image/gif"
    } else if lower.contains(".webp") {
        "image/webp"
    } else if lower.contains(".heic") || lower.contains(".heif") {
        "image/heic"
    } else {
        "image/jpeg"
    }
}

/// Normalize path-prefix conventions to a plain filesystem path.
fn local_path(reference: &str) -> &str {
    reference
        .strip_prefix("file://")
        .unwrap_or(reference)
}

/// Read a locally-referenced photo and encode it as a self-describing
/// inline payload.
///
/// No retry here: the caller's resilience wrapper retries a whole analysis
/// attempt, not just the read.
pub async fn encode_image(reference: &str) -> Result<ImagePayload> {
    let path = local_path(reference);

    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            Error::image_read("Image file not found. Please try selecting the image again.")
        }
        ErrorKind::PermissionDenied => {
            Error::image_read("Permission denied. Please allow access to your photos.")
        }
        _ => Error::unexpected_io(format!("Failed to process image: {}", e)),
    })?;

    let mime_type = mime_for(reference);
    let inline_data = base64::engine::general_purpose::STANDARD.encode(&bytes);

    tracing::debug!(
        mime = mime_type,
        raw_len = bytes.len(),
        encoded_len = inline_data.len(),
        "Image encoded"
    );

    Ok(ImagePayload {
        mime_type: mime_type.to_string(),
        inline_data,
    })
}
