//! Data types for the measurement pipeline.

pub mod config;
pub mod constants;
pub mod image;
pub mod record;
pub mod report;
