//! The entry point other subsystems call.
//!
//! Picks a strategy for the input it is given, runs it, and wraps the result
//! in a normalized [`MeasurementReport`]. The only error a caller can see is
//! [`PipelineError::InvalidInput`]; every other failure becomes a simulated
//! record with a diagnostic.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::derive::resolve;
use super::patterns::extract_fields;
use super::render::render_pages;
use super::scrape::scrape_text;
use super::simulated::simulated_record;
use super::vision::VisionExtractor;
use crate::error::{PipelineError, Result};
use crate::traits::rasterizer::PageRasterizer;
use crate::traits::vision::VisionModel;
use crate::types::config::PipelineConfig;
use crate::types::constants::DEFAULT_FILENAME;
use crate::types::image::PageImage;
use crate::types::report::{ExtractionMethod, FallbackReason, MeasurementReport, Outcome};

/// Input to one extraction.
#[derive(Debug, Clone, Default)]
pub struct ExtractionRequest {
    /// Original filename, used to pick a simulated record
    pub filename: Option<String>,

    /// Already-rendered pages, in page order
    pub images: Vec<PageImage>,

    /// Raw document bytes
    pub document: Option<Vec<u8>>,
}

impl ExtractionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_images(mut self, images: impl IntoIterator<Item = PageImage>) -> Self {
        self.images.extend(images);
        self
    }

    pub fn with_document(mut self, document: impl Into<Vec<u8>>) -> Self {
        self.document = Some(document.into());
        self
    }

    /// Filename for simulation, or the default when none was given.
    pub fn filename_or_default(&self) -> &str {
        self.filename.as_deref().unwrap_or(DEFAULT_FILENAME)
    }
}

/// Roof measurement extraction pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use roof_measure::{ExtractionRequest, MeasurementPipeline, PipelineConfig};
///
/// let pipeline = MeasurementPipeline::new(PipelineConfig::default())
///     .with_vision_model(model);
///
/// let report = pipeline
///     .extract(ExtractionRequest::new().with_document(bytes).with_filename("report.pdf"))
///     .await?;
/// ```
pub struct MeasurementPipeline {
    config: PipelineConfig,
    vision: Option<VisionExtractor>,
    rasterizer: Option<Arc<dyn PageRasterizer>>,
}

impl MeasurementPipeline {
    /// Create a pipeline with only the text path available.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            vision: None,
            rasterizer: None,
        }
    }

    /// Enable the vision path.
    pub fn with_vision_model(mut self, model: Arc<dyn VisionModel>) -> Self {
        self.vision = Some(VisionExtractor::new(model, self.config.clone()));
        self
    }

    /// Render document pages for the vision path when no images are supplied.
    ///
    /// Has no effect without a vision model.
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = Some(rasterizer);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extract a measurement report.
    ///
    /// Strategy, in order:
    /// 1. page images and a vision model: vision path
    /// 2. document bytes, a rasterizer and a vision model: render, then vision
    /// 3. document bytes: text path
    /// 4. page images alone: simulated (no vision model)
    ///
    /// Page images without bytes are dropped first.
    pub async fn extract(&self, mut request: ExtractionRequest) -> Result<MeasurementReport> {
        let supplied = request.images.len();
        request.images.retain(|image| !image.is_empty());
        if request.images.len() < supplied {
            warn!(
                dropped = supplied - request.images.len(),
                "Ignoring page images with no data"
            );
        }

        if request.images.is_empty() && request.document.is_none() {
            return Err(PipelineError::InvalidInput {
                reason: "no page images or document bytes supplied".to_string(),
            });
        }

        let filename = request.filename_or_default().to_string();

        if let Some(vision) = &self.vision {
            let images = if !request.images.is_empty() {
                request.images
            } else if let (Some(document), Some(rasterizer)) =
                (&request.document, &self.rasterizer)
            {
                render_pages(
                    rasterizer.as_ref(),
                    document,
                    self.config.max_pages,
                    self.config.render_scale,
                )
                .await
            } else {
                Vec::new()
            };

            if !images.is_empty() {
                info!(filename = %filename, pages = images.len(), "Extracting measurements with vision");
                let outcome = vision.extract(images, &filename).await;
                return Ok(MeasurementReport::from_outcome(outcome, ExtractionMethod::Vision));
            }
        }

        match &request.document {
            Some(document) => {
                info!(filename = %filename, bytes = document.len(), "Extracting measurements from document text");
                let outcome = self.extract_text(document, &filename);
                Ok(MeasurementReport::from_outcome(outcome, ExtractionMethod::TextPattern))
            }
            None => {
                warn!(filename = %filename, "Page images supplied without a vision model");
                let outcome = Outcome::Simulated {
                    record: simulated_record(&filename),
                    reason: FallbackReason::VisionUnavailable,
                };
                Ok(MeasurementReport::from_outcome(outcome, ExtractionMethod::Vision))
            }
        }
    }

    /// Text path: scrape, match, derive.
    ///
    /// Synchronous and deterministic: identical bytes give identical records.
    /// Any matched label makes the result authentic, however short the text;
    /// `min_text_chars` only picks the diagnostic when nothing matched.
    pub fn extract_text(&self, document: &[u8], filename: &str) -> Outcome {
        let text = scrape_text(document);
        let chars = text.chars().count();
        let partial = extract_fields(&text);

        if partial.is_empty() && chars < self.config.min_text_chars {
            warn!(chars, required = self.config.min_text_chars, "Too little text recovered, using simulated record");
            return Outcome::Simulated {
                record: simulated_record(filename),
                reason: FallbackReason::InsufficientText {
                    chars,
                    required: self.config.min_text_chars,
                },
            };
        }

        if partial.is_empty() {
            warn!(chars, "No measurement labels matched, using simulated record");
            return Outcome::Simulated {
                record: simulated_record(filename),
                reason: FallbackReason::NoFieldsMatched { chars },
            };
        }

        debug!(matched = partial.matched_fields(), "Resolving derived fields");
        Outcome::Authentic(resolve(partial))
    }

    /// Report a simulated record without looking at any input.
    pub fn simulate(&self, filename: Option<&str>) -> MeasurementReport {
        let filename = filename.unwrap_or(DEFAULT_FILENAME);
        let outcome = Outcome::Simulated {
            record: simulated_record(filename),
            reason: FallbackReason::Requested,
        };
        MeasurementReport::from_outcome(outcome, ExtractionMethod::Simulated)
    }
}
