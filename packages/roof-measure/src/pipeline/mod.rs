//! Measurement pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Text recovery from raw document bytes
//! - Labeled field matching and the pitch/area sweep
//! - Derivation of fields the document leaves out
//! - Vision inference over rendered pages
//! - Simulated fallback records

pub mod derive;
pub mod facade;
pub mod patterns;
pub mod render;
pub mod sanitize;
pub mod scrape;
pub mod simulated;
pub mod vision;

pub use derive::resolve;
pub use facade::{ExtractionRequest, MeasurementPipeline};
pub use patterns::{extract_fields, field_rules, parse_number, sweep_pitch_areas, Field, FieldRule};
pub use render::render_pages;
pub use sanitize::parse_vision_response;
pub use scrape::scrape_text;
pub use simulated::{simulated_record, RoofCategory};
pub use vision::{record_from_json, VisionExtractor, MEASUREMENT_INSTRUCTIONS};
