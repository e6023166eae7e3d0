//! Stage outcomes and the report handed to callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::record::MeasurementRecord;
use crate::error::{InferenceError, ResponseParseError};

/// Why a record had to be simulated. `Display` is the diagnostic text.
#[derive(Debug, Error)]
pub enum FallbackReason {
    /// The vision service failed or timed out
    #[error("vision inference failed: {0}")]
    Inference(#[from] InferenceError),

    /// The vision service answered but the payload was unusable
    #[error("vision response unparseable: {0}")]
    ResponseParse(#[from] ResponseParseError),

    /// Page images were supplied but no vision model is configured
    #[error("page images supplied but no vision model is configured")]
    VisionUnavailable,

    /// The document yielded too little text to extract from
    #[error("document text unreadable: recovered {chars} characters, need at least {required}")]
    InsufficientText { chars: usize, required: usize },

    /// Text was recovered but no measurement label matched
    #[error("no measurement fields found in {chars} characters of document text")]
    NoFieldsMatched { chars: usize },

    /// The caller asked for a simulated record
    #[error("simulation requested by caller")]
    Requested,
}

/// Result of one extraction stage: a record either way, tagged by origin.
#[derive(Debug)]
pub enum Outcome {
    /// Data recovered from the real input
    Authentic(MeasurementRecord),

    /// Deterministic placeholder data
    Simulated {
        record: MeasurementRecord,
        reason: FallbackReason,
    },
}

impl Outcome {
    pub fn is_authentic(&self) -> bool {
        matches!(self, Outcome::Authentic(_))
    }

    pub fn record(&self) -> &MeasurementRecord {
        match self {
            Outcome::Authentic(record) => record,
            Outcome::Simulated { record, .. } => record,
        }
    }

    /// The fallback reason, if simulated.
    pub fn reason(&self) -> Option<&FallbackReason> {
        match self {
            Outcome::Authentic(_) => None,
            Outcome::Simulated { reason, .. } => Some(reason),
        }
    }
}

/// Which strategy produced the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionMethod {
    Vision,
    TextPattern,
    Simulated,
}

/// The façade's answer: a normalized record plus provenance metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementReport {
    pub record: MeasurementRecord,

    /// True when the record came from the real input
    pub authentic: bool,

    pub method: ExtractionMethod,

    /// Short human-readable provenance note
    pub note: String,

    /// Failure detail when the record is simulated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostic: Option<String>,
}

impl MeasurementReport {
    /// Build a report from a stage outcome, normalizing the record.
    ///
    /// `method` is the strategy that was attempted; simulated outcomes are
    /// always reported as [`ExtractionMethod::Simulated`].
    pub fn from_outcome(outcome: Outcome, method: ExtractionMethod) -> Self {
        match outcome {
            Outcome::Authentic(record) => Self {
                record: record.normalized(),
                authentic: true,
                method,
                note: match method {
                    ExtractionMethod::Vision => "Measurements extracted from page images",
                    ExtractionMethod::TextPattern => "Measurements recovered from document text",
                    ExtractionMethod::Simulated => "Simulated measurements",
                }
                .to_string(),
                diagnostic: None,
            },
            Outcome::Simulated { record, reason } => Self {
                record: record.normalized(),
                authentic: false,
                method: ExtractionMethod::Simulated,
                note: "Simulated measurements; verify against the original report".to_string(),
                diagnostic: Some(reason.to_string()),
            },
        }
    }
}
