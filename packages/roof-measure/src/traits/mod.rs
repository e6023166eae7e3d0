//! Trait abstractions for the external collaborators.
//!
//! The host application implements these to provide page rendering and
//! vision inference.

pub mod rasterizer;
pub mod vision;
