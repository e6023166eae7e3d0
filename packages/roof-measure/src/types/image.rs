//! Rendered page images handed to the vision model.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// One already-rendered document page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    /// 1-based page number in the source document
    pub page_number: u32,

    /// MIME type of `data` (e.g. `image/png`)
    pub mime_type: String,

    /// Encoded image bytes
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl PageImage {
    /// Create a PNG page image.
    pub fn png(page_number: u32, data: Vec<u8>) -> Self {
        Self {
            page_number,
            mime_type: "image/png".to_string(),
            data,
        }
    }

    /// Set a different MIME type, for rasterizers that emit JPEG or WebP.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Base64 `data:` URL, the form most vision endpoints accept inline.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    /// True when no image bytes are present. Such pages are dropped before
    /// strategy selection.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
