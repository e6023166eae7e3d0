//! The canonical measurement record and its partially-extracted form.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::constants::DEFAULT_PITCH;

/// Linear roof features that carry a length and an installed-unit count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureKind {
    Ridge,
    Hip,
    Valley,
    Rake,
    Eave,
    StepFlashing,
}

impl FeatureKind {
    /// All kinds, in report order.
    pub const ALL: [FeatureKind; 6] = [
        FeatureKind::Ridge,
        FeatureKind::Hip,
        FeatureKind::Valley,
        FeatureKind::Rake,
        FeatureKind::Eave,
        FeatureKind::StepFlashing,
    ];

    /// Field-name prefix used in JSON payloads (`ridgeLength`, `ridgeCount`).
    pub fn json_prefix(self) -> &'static str {
        match self {
            FeatureKind::Ridge => "ridge",
            FeatureKind::Hip => "hip",
            FeatureKind::Valley => "valley",
            FeatureKind::Rake => "rake",
            FeatureKind::Eave => "eave",
            FeatureKind::StepFlashing => "stepFlashing",
        }
    }
}

/// Length (ft) and unit count of one linear feature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LinearFeature {
    pub length: f64,
    pub count: u32,
}

impl LinearFeature {
    pub fn new(length: f64, count: u32) -> Self {
        Self { length, count }
    }
}

/// A fully populated roof measurement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRecord {
    /// Total roof area in square feet
    pub total_area: f64,

    /// Slope covering the most area, formatted `N:12`
    pub predominant_pitch: String,

    pub ridge: LinearFeature,
    pub hip: LinearFeature,
    pub valley: LinearFeature,
    pub rake: LinearFeature,
    pub eave: LinearFeature,
    pub step_flashing: LinearFeature,

    pub chimney_count: u32,
    pub skylight_count: u32,
    pub turbine_vent_count: u32,
    pub pipe_vent_count: u32,

    /// Roof area (sq ft) occupied by penetrations
    pub penetrations_area: f64,

    /// Flashed perimeter (ft) around penetrations
    pub penetrations_perimeter: f64,

    /// Area in square feet per pitch
    #[serde(default)]
    pub areas_by_pitch: IndexMap<String, f64>,
}

impl Default for MeasurementRecord {
    fn default() -> Self {
        Self {
            total_area: 0.0,
            predominant_pitch: DEFAULT_PITCH.to_string(),
            ridge: LinearFeature::default(),
            hip: LinearFeature::default(),
            valley: LinearFeature::default(),
            rake: LinearFeature::default(),
            eave: LinearFeature::default(),
            step_flashing: LinearFeature::default(),
            chimney_count: 0,
            skylight_count: 0,
            turbine_vent_count: 0,
            pipe_vent_count: 0,
            penetrations_area: 0.0,
            penetrations_perimeter: 0.0,
            areas_by_pitch: IndexMap::new(),
        }
    }
}

impl MeasurementRecord {
    /// Borrow the feature of the given kind.
    pub fn feature(&self, kind: FeatureKind) -> &LinearFeature {
        match kind {
            FeatureKind::Ridge => &self.ridge,
            FeatureKind::Hip => &self.hip,
            FeatureKind::Valley => &self.valley,
            FeatureKind::Rake => &self.rake,
            FeatureKind::Eave => &self.eave,
            FeatureKind::StepFlashing => &self.step_flashing,
        }
    }

    /// Mutably borrow the feature of the given kind.
    pub fn feature_mut(&mut self, kind: FeatureKind) -> &mut LinearFeature {
        match kind {
            FeatureKind::Ridge => &mut self.ridge,
            FeatureKind::Hip => &mut self.hip,
            FeatureKind::Valley => &mut self.valley,
            FeatureKind::Rake => &mut self.rake,
            FeatureKind::Eave => &mut self.eave,
            FeatureKind::StepFlashing => &mut self.step_flashing,
        }
    }

    /// Chimneys, skylights and pipe vents. Turbine vents are excluded: they
    /// carry no flashing weight.
    pub fn flashed_penetrations(&self) -> u32 {
        self.chimney_count
            .saturating_add(self.skylight_count)
            .saturating_add(self.pipe_vent_count)
    }

    /// Sum of the per-pitch areas.
    pub fn pitch_area_sum(&self) -> f64 {
        self.areas_by_pitch.values().sum()
    }

    /// Clamp the record into its canonical shape.
    ///
    /// Negative or non-finite numbers become 0, pitches are rewritten to
    /// `N:12`, and pitch entries with unusable areas are dropped.
    pub fn normalized(mut self) -> Self {
        self.total_area = non_negative(self.total_area);
        self.penetrations_area = non_negative(self.penetrations_area);
        self.penetrations_perimeter = non_negative(self.penetrations_perimeter);
        for kind in FeatureKind::ALL {
            let feature = self.feature_mut(kind);
            feature.length = non_negative(feature.length);
        }

        self.predominant_pitch =
            normalize_pitch(&self.predominant_pitch).unwrap_or_else(|| DEFAULT_PITCH.to_string());

        let mut areas = IndexMap::with_capacity(self.areas_by_pitch.len());
        for (pitch, area) in self.areas_by_pitch {
            if !area.is_finite() || area < 0.0 {
                continue;
            }
            let key = normalize_pitch(&pitch).unwrap_or(pitch);
            *areas.entry(key).or_insert(0.0) += area;
        }
        self.areas_by_pitch = areas;
        self
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Rewrite `"6/12"`, `"6:12"` or `" 6 / 12 "` as `"6:12"`.
///
/// Returns `None` when the text is not a rise-over-12 pitch.
pub fn normalize_pitch(raw: &str) -> Option<String> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let (rise, run) = compact.split_once(['/', ':'])?;
    if run != "12" || rise.is_empty() || !rise.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let rise: u32 = rise.parse().ok()?;
    Some(format!("{}:12", rise))
}

/// Values recovered by pattern extraction; `None` means "not found".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialMeasurements {
    pub total_area: Option<f64>,
    pub predominant_pitch: Option<String>,

    pub ridge_length: Option<f64>,
    pub ridge_count: Option<u32>,
    pub hip_length: Option<f64>,
    pub hip_count: Option<u32>,
    pub valley_length: Option<f64>,
    pub valley_count: Option<u32>,
    pub rake_length: Option<f64>,
    pub rake_count: Option<u32>,
    pub eave_length: Option<f64>,
    pub eave_count: Option<u32>,
    pub step_flashing_length: Option<f64>,
    pub step_flashing_count: Option<u32>,

    pub chimney_count: Option<u32>,
    pub skylight_count: Option<u32>,
    pub turbine_vent_count: Option<u32>,
    pub pipe_vent_count: Option<u32>,

    pub penetrations_area: Option<f64>,
    pub penetrations_perimeter: Option<f64>,

    pub areas_by_pitch: IndexMap<String, f64>,
}

impl PartialMeasurements {
    /// Length slot for a feature kind.
    pub fn length_mut(&mut self, kind: FeatureKind) -> &mut Option<f64> {
        match kind {
            FeatureKind::Ridge => &mut self.ridge_length,
            FeatureKind::Hip => &mut self.hip_length,
            FeatureKind::Valley => &mut self.valley_length,
            FeatureKind::Rake => &mut self.rake_length,
            FeatureKind::Eave => &mut self.eave_length,
            FeatureKind::StepFlashing => &mut self.step_flashing_length,
        }
    }

    /// Count slot for a feature kind.
    pub fn count_mut(&mut self, kind: FeatureKind) -> &mut Option<u32> {
        match kind {
            FeatureKind::Ridge => &mut self.ridge_count,
            FeatureKind::Hip => &mut self.hip_count,
            FeatureKind::Valley => &mut self.valley_count,
            FeatureKind::Rake => &mut self.rake_count,
            FeatureKind::Eave => &mut self.eave_count,
            FeatureKind::StepFlashing => &mut self.step_flashing_count,
        }
    }

    /// Number of scalar fields that were recovered, plus one if any pitch
    /// area was found.
    pub fn matched_fields(&self) -> usize {
        let floats = [
            self.total_area,
            self.ridge_length,
            self.hip_length,
            self.valley_length,
            self.rake_length,
            self.eave_length,
            self.step_flashing_length,
            self.penetrations_area,
            self.penetrations_perimeter,
        ];
        let counts = [
            self.ridge_count,
            self.hip_count,
            self.valley_count,
            self.rake_count,
            self.eave_count,
            self.step_flashing_count,
            self.chimney_count,
            self.skylight_count,
            self.turbine_vent_count,
            self.pipe_vent_count,
        ];

        floats.iter().filter(|v| v.is_some()).count()
            + counts.iter().filter(|v| v.is_some()).count()
            + usize::from(self.predominant_pitch.is_some())
            + usize::from(!self.areas_by_pitch.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.matched_fields() == 0
    }
}
