//! Vision path: page images in, record or classified fallback out.

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::patterns::parse_number;
use super::sanitize::parse_vision_response;
use super::simulated::simulated_record;
use crate::error::InferenceError;
use crate::traits::vision::{InferenceRequest, VisionModel};
use crate::types::config::PipelineConfig;
use crate::types::constants::DEFAULT_PITCH;
use crate::types::image::PageImage;
use crate::types::record::{FeatureKind, LinearFeature, MeasurementRecord};
use crate::types::report::{FallbackReason, Outcome};

/// Instructions sent with every vision request.
pub const MEASUREMENT_INSTRUCTIONS: &str = r#"You are reading an aerial roof measurement report. The attached images are its pages, in order.

Find the roof measurements and return them as a single JSON object with exactly these keys:
{
    "totalArea": number (total roof area, sq ft),
    "predominantPitch": "N:12" (pitch covering the most area),
    "ridgeLength": number (ft), "ridgeCount": integer,
    "hipLength": number (ft), "hipCount": integer,
    "valleyLength": number (ft), "valleyCount": integer,
    "rakeLength": number (ft), "rakeCount": integer,
    "eaveLength": number (ft), "eaveCount": integer,
    "stepFlashingLength": number (ft), "stepFlashingCount": integer,
    "chimneyCount": integer,
    "skylightCount": integer,
    "turbineVentCount": integer,
    "pipeVentCount": integer,
    "penetrationsArea": number (sq ft),
    "penetrationsPerimeter": number (ft),
    "areasByPitch": { "N:12": number (sq ft), ... }
}

Rules:
- Use 0 for any value the report does not show. Do not guess.
- Numbers only, no units.
- Write pitches as rise over 12 with a colon, e.g. "6:12".
- Return only the JSON object."#;

/// Runs one inference call per extraction and turns the answer into a record.
pub struct VisionExtractor {
    model: Arc<dyn VisionModel>,
    config: PipelineConfig,
}

impl VisionExtractor {
    pub fn new(model: Arc<dyn VisionModel>, config: PipelineConfig) -> Self {
        Self { model, config }
    }

    /// Extract a record from page images.
    ///
    /// Every page goes out in one request. Failures of any kind become a
    /// simulated record for `filename`; the call is never retried.
    pub async fn extract(&self, images: Vec<PageImage>, filename: &str) -> Outcome {
        let page_count = images.len();
        let request = InferenceRequest::new(&self.config.model, MEASUREMENT_INSTRUCTIONS)
            .with_images(images);

        info!(model = %request.model, page_count, "Submitting pages for vision extraction");

        let timeout = self.config.inference_timeout();
        let response = match tokio::time::timeout(timeout, self.model.infer(&request)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return self.fallback(filename, e.into()),
            Err(_) => return self.fallback(filename, InferenceError::Timeout(timeout).into()),
        };

        match parse_vision_response(&response) {
            Ok(payload) => {
                info!(response_chars = response.len(), "Vision response parsed");
                Outcome::Authentic(record_from_json(&payload))
            }
            Err(e) => self.fallback(filename, e.into()),
        }
    }

    fn fallback(&self, filename: &str, reason: FallbackReason) -> Outcome {
        let retryable = match &reason {
            FallbackReason::Inference(e) => e.is_retryable(),
            _ => false,
        };
        warn!(error = %reason, retryable, filename, "Vision extraction failed, using simulated record");
        Outcome::Simulated {
            record: simulated_record(filename),
            reason,
        }
    }
}

/// Coerce a response object into a record, field by field.
///
/// Numbers may arrive as JSON numbers or numeric strings with thousands
/// separators. Missing or unusable values are 0; a missing pitch is the
/// default pitch. Nothing is derived.
pub fn record_from_json(fields: &Value) -> MeasurementRecord {
    let mut record = MeasurementRecord {
        total_area: float(fields.get("totalArea")),
        predominant_pitch: fields
            .get("predominantPitch")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|pitch| !pitch.is_empty())
            .unwrap_or(DEFAULT_PITCH)
            .to_string(),
        chimney_count: count(fields.get("chimneyCount")),
        skylight_count: count(fields.get("skylightCount")),
        turbine_vent_count: count(fields.get("turbineVentCount")),
        pipe_vent_count: count(fields.get("pipeVentCount")),
        penetrations_area: float(fields.get("penetrationsArea")),
        penetrations_perimeter: float(fields.get("penetrationsPerimeter")),
        ..Default::default()
    };

    for kind in FeatureKind::ALL {
        *record.feature_mut(kind) = feature(fields, kind);
    }

    if let Some(Value::Object(areas)) = fields.get("areasByPitch") {
        for (pitch, area) in areas {
            if let Some(area) = number(Some(area)) {
                record.areas_by_pitch.insert(pitch.clone(), area);
            }
        }
    }

    record
}

// Accepts flat `ridgeLength`/`ridgeCount` or nested `ridge: {length, count}`.
fn feature(fields: &Value, kind: FeatureKind) -> LinearFeature {
    let prefix = kind.json_prefix();
    let nested = fields.get(prefix).filter(|n| n.is_object());

    let length = fields
        .get(&format!("{}Length", prefix))
        .or_else(|| nested.and_then(|n| n.get("length")));
    let units = fields
        .get(&format!("{}Count", prefix))
        .or_else(|| nested.and_then(|n| n.get("count")));

    LinearFeature::new(float(length), count(units))
}

fn number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_number(s.trim()),
        _ => None,
    }
}

fn float(value: Option<&Value>) -> f64 {
    number(value).filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn count(value: Option<&Value>) -> u32 {
    match number(value) {
        Some(v) if v.is_finite() && v > 0.0 => v.round().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResponseParseError;
    use crate::testing::MockVisionModel;
    use serde_json::json;
    use std::time::Duration;

    fn pages() -> Vec<PageImage> {
        vec![PageImage::png(1, vec![1, 2, 3]), PageImage::png(2, vec![4, 5, 6])]
    }

    #[test]
    fn test_instructions_name_every_field() {
        let record = serde_json::to_value(MeasurementRecord::default()).unwrap();
        for key in record.as_object().unwrap().keys() {
            if FeatureKind::ALL.iter().any(|k| k.json_prefix() == key.as_str()) {
                continue;
            }
            assert!(MEASUREMENT_INSTRUCTIONS.contains(key.as_str()), "missing {}", key);
        }
        for kind in FeatureKind::ALL {
            assert!(MEASUREMENT_INSTRUCTIONS.contains(&format!("{}Length", kind.json_prefix())));
            assert!(MEASUREMENT_INSTRUCTIONS.contains(&format!("{}Count", kind.json_prefix())));
        }
    }

    #[test]
    fn test_coercion() {
        let record = record_from_json(&json!({
            "totalArea": "2,450",
            "predominantPitch": "7:12",
            "ridgeLength": 62.5,
            "ridgeCount": "4",
            "hip": { "length": 80, "count": 6 },
            "chimneyCount": 1,
            "skylightCount": "two",
            "pipeVentCount": -3,
            "penetrationsArea": null,
            "areasByPitch": { "7:12": "1,900", "4:12": 550, "bad": "n/a" }
        }));

        assert_eq!(record.total_area, 2450.0);
        assert_eq!(record.predominant_pitch, "7:12");
        assert_eq!(record.ridge, LinearFeature::new(62.5, 4));
        assert_eq!(record.hip, LinearFeature::new(80.0, 6));
        assert_eq!(record.chimney_count, 1);
        assert_eq!(record.skylight_count, 0);
        assert_eq!(record.pipe_vent_count, 0);
        assert_eq!(record.penetrations_area, 0.0);
        assert_eq!(record.areas_by_pitch.len(), 2);
        assert_eq!(record.areas_by_pitch["7:12"], 1900.0);
    }

    #[test]
    fn test_no_derivation_on_ai_data() {
        let record = record_from_json(&json!({
            "ridgeLength": 100,
            "chimneyCount": 2,
            "areasByPitch": { "6:12": 1000 }
        }));

        assert_eq!(record.ridge.count, 0);
        assert_eq!(record.penetrations_area, 0.0);
        assert_eq!(record.step_flashing, LinearFeature::default());
        assert_eq!(record.total_area, 0.0);
        assert_eq!(record.predominant_pitch, DEFAULT_PITCH);
    }

    #[tokio::test]
    async fn test_authentic_from_fenced_response() {
        let model = Arc::new(MockVisionModel::new().with_response(
            "```json\n{\"totalArea\": 3100, \"predominantPitch\": \"8:12\", \"eaveLength\": 140}\n```",
        ));
        let extractor = VisionExtractor::new(model.clone(), PipelineConfig::default());

        let outcome = extractor.extract(pages(), "report.pdf").await;
        assert!(outcome.is_authentic());
        assert_eq!(outcome.record().total_area, 3100.0);
        assert_eq!(outcome.record().eave.length, 140.0);

        let calls = model.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].images.len(), 2);
        assert_eq!(calls[0].model, "gpt-4o");
        assert_eq!(calls[0].instructions, MEASUREMENT_INSTRUCTIONS);
    }

    #[tokio::test]
    async fn test_service_failure_falls_back() {
        let model = Arc::new(MockVisionModel::new().with_error(InferenceError::RateLimited(
            "try later".into(),
        )));
        let extractor = VisionExtractor::new(model.clone(), PipelineConfig::default());

        let outcome = extractor.extract(pages(), "commercial-site.pdf").await;
        assert!(!outcome.is_authentic());
        assert_eq!(outcome.record(), &simulated_record("commercial-site.pdf"));
        assert!(matches!(
            outcome.reason(),
            Some(FallbackReason::Inference(InferenceError::RateLimited(_)))
        ));
        // Never retried
        assert_eq!(model.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_unparseable_response_falls_back() {
        let model = Arc::new(MockVisionModel::new().with_response("{\"totalArea\": 2000,}"));
        let extractor = VisionExtractor::new(model, PipelineConfig::default());

        let outcome = extractor.extract(pages(), "report.pdf").await;
        assert!(matches!(
            outcome.reason(),
            Some(FallbackReason::ResponseParse(ResponseParseError::InvalidJson { .. }))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_falls_back() {
        let model = Arc::new(
            MockVisionModel::new()
                .with_response("{\"totalArea\": 2000}")
                .with_delay(Duration::from_secs(5)),
        );
        let config = PipelineConfig::default().with_inference_timeout(Duration::from_millis(500));
        let extractor = VisionExtractor::new(model, config);

        let outcome = extractor.extract(pages(), "report.pdf").await;
        assert!(matches!(
            outcome.reason(),
            Some(FallbackReason::Inference(InferenceError::Timeout(timeout))) if *timeout == Duration::from_millis(500)
        ));
    }
}
