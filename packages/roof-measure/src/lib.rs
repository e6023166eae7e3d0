//! Roof Measurement Extraction Library
//!
//! Turns an aerial roof-survey report into a structured measurement record:
//! areas, pitches, linear feature lengths and counts, and penetrations.
//!
//! # Design Philosophy
//!
//! **"Always answer, never lie"**
//!
//! - Two independent strategies: vision inference over page images, and
//!   pattern matching over text scraped from the raw bytes
//! - Missing fields are derived with fixed, testable arithmetic
//! - Any failure below the façade becomes a simulated record flagged as such
//! - Rendering and inference are traits; the host application plugs them in
//!
//! # Usage
//!
//! ```rust,ignore
//! use roof_measure::{ExtractionRequest, MeasurementPipeline, PipelineConfig};
//! use roof_measure::testing::MockVisionModel;
//!
//! let pipeline = MeasurementPipeline::new(PipelineConfig::from_env()?)
//!     .with_vision_model(Arc::new(MockVisionModel::new()));
//!
//! let request = ExtractionRequest::new()
//!     .with_filename("eagleview-report.pdf")
//!     .with_document(std::fs::read("eagleview-report.pdf")?);
//!
//! let report = pipeline.extract(request).await?;
//! if !report.authentic {
//!     println!("simulated: {:?}", report.diagnostic);
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator abstractions (VisionModel, PageRasterizer)
//! - [`types`] - Records, reports, configuration and constants
//! - [`pipeline`] - Extraction strategies and the façade
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{InferenceError, PipelineError, RasterizeError, ResponseParseError, Result};
pub use traits::{
    rasterizer::PageRasterizer,
    vision::{InferenceRequest, VisionModel},
};
pub use types::{
    config::PipelineConfig,
    image::PageImage,
    record::{normalize_pitch, FeatureKind, LinearFeature, MeasurementRecord, PartialMeasurements},
    report::{ExtractionMethod, FallbackReason, MeasurementReport, Outcome},
};

// Re-export pipeline components
pub use pipeline::{
    // Façade
    ExtractionRequest, MeasurementPipeline,
    // Text path
    extract_fields, resolve, scrape_text, sweep_pitch_areas,
    // Vision path
    parse_vision_response, render_pages, VisionExtractor,
    // Fallback
    simulated_record, RoofCategory,
};

// Re-export testing utilities
pub use testing::{MockRasterizer, MockVisionModel};
