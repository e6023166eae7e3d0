//! Fixed figures used to derive and default measurement fields.
//!
//! Kept as plain data so they can be inspected and tested on their own.

use super::record::FeatureKind;

/// Feet of installed material per unit, by linear feature.
pub const FEATURE_SPANS: [(FeatureKind, f64); 6] = [
    (FeatureKind::Ridge, 20.0),
    (FeatureKind::Hip, 15.0),
    (FeatureKind::Valley, 15.0),
    (FeatureKind::Rake, 25.0),
    (FeatureKind::Eave, 25.0),
    (FeatureKind::StepFlashing, STEP_FLASHING_FT_PER_PENETRATION),
];

/// Average roof area (sq ft) taken up by one chimney.
pub const CHIMNEY_AREA_SQFT: f64 = 12.0;
/// Average roof area (sq ft) taken up by one skylight.
pub const SKYLIGHT_AREA_SQFT: f64 = 6.0;
/// Average roof area (sq ft) taken up by one pipe vent.
pub const PIPE_VENT_AREA_SQFT: f64 = 1.0;

/// Average flashed perimeter (ft) of one chimney.
pub const CHIMNEY_PERIMETER_FT: f64 = 14.0;
/// Average flashed perimeter (ft) of one skylight.
pub const SKYLIGHT_PERIMETER_FT: f64 = 10.0;
/// Average flashed perimeter (ft) of one pipe vent.
pub const PIPE_VENT_PERIMETER_FT: f64 = 4.0;

/// Step flashing installed around each penetration.
pub const STEP_FLASHING_FT_PER_PENETRATION: f64 = 8.0;

/// Pitch reported when nothing better is known.
pub const DEFAULT_PITCH: &str = "6:12";

/// Total area (sq ft) reported when nothing better is known.
pub const DEFAULT_TOTAL_AREA_SQFT: f64 = 2000.0;

/// Filename used for simulation when the caller supplies none.
pub const DEFAULT_FILENAME: &str = "document.pdf";

/// Filename hints for simulated records. Matching is case-insensitive; the
/// EagleView Daisy category needs every keyword, the others need any one.
pub const DAISY_KEYWORDS: [&str; 2] = ["eagleview", "daisy"];
pub const COMPLEX_KEYWORDS: [&str; 2] = ["complex", "custom"];
pub const COMMERCIAL_KEYWORDS: [&str; 2] = ["large", "commercial"];

/// Per-unit span for a feature kind.
pub fn span_for(kind: FeatureKind) -> f64 {
    FEATURE_SPANS
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, span)| *span)
        .unwrap_or(STEP_FLASHING_FT_PER_PENETRATION)
}

/// Units needed to cover `length` feet of a feature, rounded up.
pub fn units_for_length(kind: FeatureKind, length: f64) -> u32 {
    if !length.is_finite() || length <= 0.0 {
        return 0;
    }
    (length / span_for(kind)).ceil() as u32
}
