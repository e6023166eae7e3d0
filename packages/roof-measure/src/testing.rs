//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the measurement
//! pipeline without making real inference or rendering calls.

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{InferenceError, RasterizeError};
use crate::traits::{
    rasterizer::PageRasterizer,
    vision::{InferenceRequest, VisionModel},
};
use crate::types::image::PageImage;

/// Response returned once the queue is exhausted.
pub const DEFAULT_VISION_RESPONSE: &str = r#"{"totalArea": 2000, "predominantPitch": "6:12"}"#;

/// A mock vision model for testing.
///
/// Answers from a queue of canned responses or errors, in order. Once the
/// queue is empty every call gets [`DEFAULT_VISION_RESPONSE`].
#[derive(Default)]
pub struct MockVisionModel {
    /// Queued answers, consumed front to back
    responses: Arc<RwLock<VecDeque<Result<String, InferenceError>>>>,

    /// Artificial latency applied before answering
    delay: Option<Duration>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<InferenceRequest>>>,
}

impl MockVisionModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response text.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .push_back(Ok(response.into()));
        self
    }

    /// Queue an inference failure.
    pub fn with_error(self, error: InferenceError) -> Self {
        self.responses.write().unwrap().push_back(Err(error));
        self
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Get all requests made to this mock.
    pub fn calls(&self) -> Vec<InferenceRequest> {
        self.calls.read().unwrap().clone()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl VisionModel for MockVisionModel {
    async fn infer(&self, request: &InferenceRequest) -> Result<String, InferenceError> {
        self.calls.write().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.responses.write().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(DEFAULT_VISION_RESPONSE.to_string()))
    }
}

/// A mock rasterizer for testing.
///
/// Pretends the document has a fixed number of pages. Each rendered page's
/// bytes are `page-N`, so tests can tell them apart.
#[derive(Default)]
pub struct MockRasterizer {
    page_count: u32,

    /// Pages that fail even though they exist
    failing_pages: HashSet<u32>,

    /// Page numbers requested, in call order
    calls: Arc<RwLock<Vec<u32>>>,
}

impl MockRasterizer {
    pub fn new(page_count: u32) -> Self {
        Self {
            page_count,
            ..Default::default()
        }
    }

    /// Make an existing page fail to render.
    pub fn with_failing_page(mut self, page_number: u32) -> Self {
        self.failing_pages.insert(page_number);
        self
    }

    /// Get all page numbers requested from this mock.
    pub fn calls(&self) -> Vec<u32> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageRasterizer for MockRasterizer {
    async fn render(
        &self,
        _document: &[u8],
        page_number: u32,
        _scale: f32,
    ) -> Result<PageImage, RasterizeError> {
        self.calls.write().unwrap().push(page_number);

        if page_number == 0 || page_number > self.page_count {
            return Err(RasterizeError::PageOutOfRange {
                page: page_number,
                page_count: self.page_count,
            });
        }

        if self.failing_pages.contains(&page_number) {
            return Err(RasterizeError::Render {
                page: page_number,
                message: "mock render failure".to_string(),
            });
        }

        Ok(PageImage::png(
            page_number,
            format!("page-{}", page_number).into_bytes(),
        ))
    }
}
