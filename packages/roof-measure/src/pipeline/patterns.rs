//! Labeled-value recovery over scraped report text.
//!
//! Every field owns an ordered list of regex alternatives. The first
//! alternative that matches anywhere in the text decides the field; later
//! alternatives are never consulted, even when the winning capture turns out
//! to be garbled (the field is then left unset).

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::types::record::{normalize_pitch, FeatureKind, PartialMeasurements};

/// Capture for a decimal number with optional thousands separators.
///
/// Starts and ends on a digit so trailing punctuation is not swallowed;
/// values such as `1.2.3` still match and are rejected when parsed.
const NUMBER: &str = r"(\d[\d,.]*\d|\d)";

/// Report labels for each linear feature.
const FEATURE_LABELS: [(FeatureKind, &str); 6] = [
    (FeatureKind::Ridge, r"\bridges?\b"),
    (FeatureKind::Hip, r"\bhips?\b"),
    (FeatureKind::Valley, r"\bvalleys?\b"),
    (FeatureKind::Rake, r"\brakes?\b"),
    (FeatureKind::Eave, r"\beaves?\b"),
    (FeatureKind::StepFlashing, r"\bstep\s*flashing\b"),
];

const LENGTH_TEMPLATES: [&str; 3] = [
    r"{label}(?:\s+length)?\s*[:=]?\s*{num}\s*(?:ft|feet|lf|')",
    r"total\s+{label}\s*[:=]?\s*{num}",
    r"{label}\s*[:=]\s*{num}",
];

const COUNT_TEMPLATES: [&str; 3] = [
    r"\((\d+)\s+{label}\)",
    r"{label}\s+count\s*[:=]?\s*(\d+)",
    r"number\s+of\s+{label}\s*[:=]?\s*(\d+)",
];

const TOTAL_AREA_PATTERNS: &[&str] = &[
    r"total\s+(?:roof\s+)?area\s*[:=]?\s*{num}",
    r"total\s+surface\s+area\s*[:=]?\s*{num}",
    r"roof\s+area\s*[:=]?\s*{num}",
    r"{num}\s*(?:sq\.?\s*ft|square\s+feet|sf)\s+total",
];

const PITCH_PATTERNS: &[&str] = &[
    r"predominant\s+pitch\s*[:=]?\s*(\d{1,2}\s*[/:]\s*12)",
    r"primary\s+pitch\s*[:=]?\s*(\d{1,2}\s*[/:]\s*12)",
    r"\bpitch\s*[:=]\s*(\d{1,2}\s*[/:]\s*12)",
];

const CHIMNEY_PATTERNS: &[&str] = &[
    r"chimneys?\s*(?:count)?\s*[:=]\s*(\d+)",
    r"(\d+)\s+chimneys?\b",
];

const SKYLIGHT_PATTERNS: &[&str] = &[
    r"skylights?\s*(?:count)?\s*[:=]\s*(\d+)",
    r"(\d+)\s+skylights?\b",
];

const TURBINE_PATTERNS: &[&str] = &[
    r"turbine\s*(?:vents?)?\s*(?:count)?\s*[:=]\s*(\d+)",
    r"(\d+)\s+turbine(?:\s+vents?|s)?\b",
];

const PIPE_VENT_PATTERNS: &[&str] = &[
    r"pipe\s*(?:vents?|boots?|jacks?)\s*(?:count)?\s*[:=]\s*(\d+)",
    r"plumbing\s+vents?\s*[:=]\s*(\d+)",
    r"(\d+)\s+pipe\s*(?:vents?|boots?|jacks?)\b",
];

const PENETRATIONS_AREA_PATTERNS: &[&str] = &[
    r"(?:total\s+)?penetrations?\s+area\s*[:=]?\s*{num}",
    r"area\s+of\s+penetrations?\s*[:=]?\s*{num}",
];

const PENETRATIONS_PERIMETER_PATTERNS: &[&str] = &[
    r"(?:total\s+)?penetrations?\s+perimeter\s*[:=]?\s*{num}",
    r"perimeter\s+of\s+penetrations?\s*[:=]?\s*{num}",
];

/// A semantic field of the measurement record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    TotalArea,
    PredominantPitch,
    Length(FeatureKind),
    Count(FeatureKind),
    ChimneyCount,
    SkylightCount,
    TurbineVentCount,
    PipeVentCount,
    PenetrationsArea,
    PenetrationsPerimeter,
}

/// Ordered alternatives for one field.
#[derive(Debug)]
pub struct FieldRule {
    pub field: Field,
    pub patterns: Vec<Regex>,
}

impl FieldRule {
    fn compile(field: Field, templates: &[&str], label: &str) -> Self {
        let patterns = templates
            .iter()
            .map(|template| {
                let source = template.replace("{label}", label).replace("{num}", NUMBER);
                Regex::new(&format!("(?i){}", source)).unwrap()
            })
            .collect();
        Self { field, patterns }
    }

    /// Capture of the first alternative that matches, if any.
    pub fn first_capture<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.patterns
            .iter()
            .find_map(|re| re.captures(text))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

fn build_rules() -> Vec<FieldRule> {
    let mut rules = vec![
        FieldRule::compile(Field::TotalArea, TOTAL_AREA_PATTERNS, ""),
        FieldRule::compile(Field::PredominantPitch, PITCH_PATTERNS, ""),
    ];

    for (kind, label) in FEATURE_LABELS {
        rules.push(FieldRule::compile(Field::Length(kind), &LENGTH_TEMPLATES, label));
        rules.push(FieldRule::compile(Field::Count(kind), &COUNT_TEMPLATES, label));
    }

    rules.extend([
        FieldRule::compile(Field::ChimneyCount, CHIMNEY_PATTERNS, ""),
        FieldRule::compile(Field::SkylightCount, SKYLIGHT_PATTERNS, ""),
        FieldRule::compile(Field::TurbineVentCount, TURBINE_PATTERNS, ""),
        FieldRule::compile(Field::PipeVentCount, PIPE_VENT_PATTERNS, ""),
        FieldRule::compile(Field::PenetrationsArea, PENETRATIONS_AREA_PATTERNS, ""),
        FieldRule::compile(Field::PenetrationsPerimeter, PENETRATIONS_PERIMETER_PATTERNS, ""),
    ]);

    rules
}

lazy_static! {
    static ref FIELD_RULES: Vec<FieldRule> = build_rules();

    // "6/12 pitch area: 1,200 sq ft", "Pitch 8:12 = 900 sf"
    static ref PITCH_AREA: Regex = Regex::new(&format!(
        r"(?i)(\d{{1,2}})\s*[/:]\s*12\b(?:\s*pitch)?(?:\s*area)?\s*[:=\-]?\s*{}\s*(?:sq\.?\s*ft|square\s+feet|sf)\b",
        NUMBER
    ))
    .unwrap();
}

/// The compiled rule table, in evaluation order.
pub fn field_rules() -> &'static [FieldRule] {
    &FIELD_RULES
}

/// Recover every labeled field found in `text`.
///
/// Fields with no matching alternative, or whose winning capture does not
/// parse, stay `None`.
pub fn extract_fields(text: &str) -> PartialMeasurements {
    let mut partial = PartialMeasurements::default();

    for rule in field_rules() {
        if let Some(raw) = rule.first_capture(text) {
            assign(&mut partial, rule.field, raw);
        }
    }

    partial.areas_by_pitch = sweep_pitch_areas(text);

    debug!(
        matched = partial.matched_fields(),
        pitches = partial.areas_by_pitch.len(),
        "Pattern extraction finished"
    );

    partial
}

/// Collect every pitch/area pair, summing repeats of the same pitch.
pub fn sweep_pitch_areas(text: &str) -> IndexMap<String, f64> {
    let mut areas = IndexMap::new();

    for caps in PITCH_AREA.captures_iter(text) {
        let Some(pitch) = normalize_pitch(&format!("{}/12", &caps[1])) else {
            continue;
        };
        let Some(area) = parse_number(&caps[2]) else {
            continue;
        };
        *areas.entry(pitch).or_insert(0.0) += area;
    }

    areas
}

fn assign(partial: &mut PartialMeasurements, field: Field, raw: &str) {
    match field {
        Field::TotalArea => partial.total_area = parse_number(raw),
        Field::PredominantPitch => partial.predominant_pitch = normalize_pitch(raw),
        Field::Length(kind) => *partial.length_mut(kind) = parse_number(raw),
        Field::Count(kind) => *partial.count_mut(kind) = parse_count(raw),
        Field::ChimneyCount => partial.chimney_count = parse_count(raw),
        Field::SkylightCount => partial.skylight_count = parse_count(raw),
        Field::TurbineVentCount => partial.turbine_vent_count = parse_count(raw),
        Field::PipeVentCount => partial.pipe_vent_count = parse_count(raw),
        Field::PenetrationsArea => partial.penetrations_area = parse_number(raw),
        Field::PenetrationsPerimeter => partial.penetrations_perimeter = parse_number(raw),
    }
}

/// Parse a decimal with thousands separators. `None` for garble.
pub fn parse_number(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn parse_count(raw: &str) -> Option<u32> {
    raw.replace(',', "").parse().ok()
}
