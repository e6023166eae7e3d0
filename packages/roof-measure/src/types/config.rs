//! Configuration for the measurement pipeline.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Tunables for strategy selection and the vision call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Vision model identifier passed with every inference request.
    ///
    /// Default: "gpt-4o".
    pub model: String,

    /// Upper bound on a single inference call, in milliseconds.
    ///
    /// A call that runs longer is treated as a service failure.
    /// Default: 60000.
    pub inference_timeout_ms: u64,

    /// Scraped text shorter than this is treated as "nothing recovered".
    ///
    /// Default: 50 characters.
    pub min_text_chars: usize,

    /// Maximum pages to render for the vision path. Default: 3.
    pub max_pages: u32,

    /// Render scale passed to the rasterizer. Default: 2.0.
    pub render_scale: f32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            inference_timeout_ms: 60_000,
            min_text_chars: 50,
            max_pages: 3,
            render_scale: 2.0,
        }
    }
}

impl PipelineConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from environment variables, falling back to defaults.
    ///
    /// Reads a `.env` file first when one is present. Recognized variables:
    /// `ROOF_VISION_MODEL`, `ROOF_INFERENCE_TIMEOUT_MS`,
    /// `ROOF_INFERENCE_TIMEOUT_SECS`, `ROOF_MIN_TEXT_CHARS`, `ROOF_MAX_PAGES`,
    /// `ROOF_RENDER_SCALE`. The millisecond timeout wins when both are set.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        let defaults = Self::default();
        let timeout_secs = parse_var(
            "ROOF_INFERENCE_TIMEOUT_SECS",
            defaults.inference_timeout_ms / 1000,
        )?;

        Ok(Self {
            model: env::var("ROOF_VISION_MODEL").unwrap_or(defaults.model),
            inference_timeout_ms: parse_var(
                "ROOF_INFERENCE_TIMEOUT_MS",
                timeout_secs.saturating_mul(1000),
            )?,
            min_text_chars: parse_var("ROOF_MIN_TEXT_CHARS", defaults.min_text_chars)?,
            max_pages: parse_var("ROOF_MAX_PAGES", defaults.max_pages)?,
            render_scale: parse_var("ROOF_RENDER_SCALE", defaults.render_scale)?,
        })
    }

    /// Set the vision model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the inference timeout.
    ///
    /// Kept to the millisecond; a non-zero timeout below 1ms rounds up to 1ms.
    pub fn with_inference_timeout(mut self, timeout: Duration) -> Self {
        let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.inference_timeout_ms = if millis == 0 && !timeout.is_zero() { 1 } else { millis };
        self
    }

    /// Set the minimum scraped text length.
    pub fn with_min_text_chars(mut self, chars: usize) -> Self {
        self.min_text_chars = chars;
        self
    }

    /// Set the maximum number of pages to render.
    pub fn with_max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }

    /// Set the render scale.
    pub fn with_render_scale(mut self, scale: f32) -> Self {
        self.render_scale = scale;
        self
    }

    pub fn inference_timeout(&self) -> Duration {
        Duration::from_millis(self.inference_timeout_ms)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PipelineError::Config(format!("{} must be a valid number, got {:?}", name, raw))),
        Err(_) => Ok(default),
    }
}
