//! Vision model trait.
//!
//! Abstracts the external inference service: images plus instructions in,
//! free-form text out. Implementations wrap a specific provider and handle its
//! transport; the pipeline only sees this contract.

use async_trait::async_trait;

use crate::error::InferenceError;
use crate::types::image::PageImage;

/// A multimodal model that answers instructions about page images.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Submit one request and return the raw response text.
    ///
    /// The text may or may not contain valid JSON; parsing is the caller's
    /// job. Implementations should map transport failures onto the matching
    /// [`InferenceError`] variant so callers can classify them.
    async fn infer(&self, request: &InferenceRequest) -> Result<String, InferenceError>;
}

/// One inference call: model, instructions and every page image.
#[derive(Debug, Clone)]
pub struct InferenceRequest {
    /// Model identifier
    pub model: String,

    /// System instructions describing the expected output
    pub instructions: String,

    /// Page images, in page order
    pub images: Vec<PageImage>,
}

impl InferenceRequest {
    /// Create a request with no images.
    pub fn new(model: impl Into<String>, instructions: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instructions: instructions.into(),
            images: Vec::new(),
        }
    }

    /// Attach page images.
    pub fn with_images(mut self, images: impl IntoIterator<Item = PageImage>) -> Self {
        self.images.extend(images);
        self
    }

    /// Every page as an inline base64 `data:` URL, in page order.
    ///
    /// For [`VisionModel`] implementations whose endpoint takes images
    /// inline rather than as uploads.
    pub fn image_data_urls(&self) -> Vec<String> {
        self.images.iter().map(PageImage::to_data_url).collect()
    }
}
