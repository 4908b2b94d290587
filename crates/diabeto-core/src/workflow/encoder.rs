//! Image encoding for the inference request.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::debug;

use crate::Result;

/// MIME type declared for every captured image.
pub const IMAGE_MIME: &str = "image/jpeg";

/// Where a captured image comes from.
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// A file picked from the photo library.
    Path(PathBuf),
    /// Bytes handed over directly, e.g. from a camera.
    Bytes(Vec<u8>),
}

/// Raw image bytes together with their base64 encoding.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    bytes: Vec<u8>,
    base64: String,
}

impl EncodedImage {
    /// The original bytes, unchanged.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Standard-alphabet, padded base64 of the bytes.
    pub fn base64(&self) -> &str {
        &self.base64
    }

    /// `data:image/jpeg;base64,...` URL for inline submission.
    pub fn data_url(&self) -> String {
        format!("data:{IMAGE_MIME};base64,{}", self.base64)
    }
}

impl std::fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedImage")
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Read the image and base64-encode it. No resizing or re-compression.
///
/// # Errors
///
/// Returns a transport I/O error if the path cannot be read.
pub fn encode(source: ImageSource) -> Result<EncodedImage> {
    let bytes = match source {
        ImageSource::Path(path) => {
            debug!(path = %path.display(), "reading image");
            std::fs::read(&path)?
        }
        ImageSource::Bytes(bytes) => bytes,
    };
    let base64 = STANDARD.encode(&bytes);
    Ok(EncodedImage { bytes, base64 })
}
