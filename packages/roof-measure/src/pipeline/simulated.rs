//! Deterministic placeholder records.
//!
//! Used whenever no strategy can recover real data. The record depends only
//! on the category inferred from the filename, so the same name always gives
//! the same record.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::types::constants::{COMMERCIAL_KEYWORDS, COMPLEX_KEYWORDS, DAISY_KEYWORDS};
use crate::types::record::{LinearFeature, MeasurementRecord};

/// Roof profile a filename hints at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoofCategory {
    EagleViewDaisy,
    Complex,
    Commercial,
    Standard,
}

impl RoofCategory {
    /// Classify a filename. First matching category wins.
    pub fn from_filename(filename: &str) -> Self {
        let name = filename.to_lowercase();
        if DAISY_KEYWORDS.iter().all(|k| name.contains(k)) {
            RoofCategory::EagleViewDaisy
        } else if COMPLEX_KEYWORDS.iter().any(|k| name.contains(k)) {
            RoofCategory::Complex
        } else if COMMERCIAL_KEYWORDS.iter().any(|k| name.contains(k)) {
            RoofCategory::Commercial
        } else {
            RoofCategory::Standard
        }
    }

    /// The fixed record for this category.
    pub fn record(self) -> MeasurementRecord {
        match self {
            RoofCategory::EagleViewDaisy => Profile {
                total_area: 3215.0,
                pitches: &[("7:12", 2450.0), ("4:12", 540.0), ("10:12", 225.0)],
                ridge: (78.0, 4),
                hip: (112.0, 8),
                valley: (46.0, 4),
                rake: (64.0, 3),
                eave: (186.0, 8),
                step_flashing: (56.0, 7),
                chimneys: 1,
                skylights: 2,
                turbine_vents: 1,
                pipe_vents: 4,
                penetrations_area: 28.0,
                penetrations_perimeter: 50.0,
            },
            RoofCategory::Complex => Profile {
                total_area: 4860.0,
                pitches: &[("8:12", 2900.0), ("12:12", 1240.0), ("6:12", 720.0)],
                ridge: (142.0, 8),
                hip: (236.0, 16),
                valley: (128.0, 9),
                rake: (96.0, 4),
                eave: (318.0, 13),
                step_flashing: (88.0, 11),
                chimneys: 2,
                skylights: 3,
                turbine_vents: 2,
                pipe_vents: 6,
                penetrations_area: 48.0,
                penetrations_perimeter: 82.0,
            },
            RoofCategory::Commercial => Profile {
                total_area: 12500.0,
                pitches: &[("2:12", 9800.0), ("4:12", 2700.0)],
                ridge: (260.0, 13),
                hip: (180.0, 12),
                valley: (60.0, 4),
                rake: (210.0, 9),
                eave: (480.0, 20),
                step_flashing: (160.0, 20),
                chimneys: 0,
                skylights: 6,
                turbine_vents: 8,
                pipe_vents: 14,
                penetrations_area: 50.0,
                penetrations_perimeter: 116.0,
            },
            RoofCategory::Standard => Profile {
                total_area: 2400.0,
                pitches: &[("6:12", 1800.0), ("8:12", 600.0)],
                ridge: (60.0, 3),
                hip: (90.0, 6),
                valley: (30.0, 2),
                rake: (100.0, 4),
                eave: (150.0, 6),
                step_flashing: (40.0, 5),
                chimneys: 1,
                skylights: 1,
                turbine_vents: 0,
                pipe_vents: 3,
                penetrations_area: 21.0,
                penetrations_perimeter: 36.0,
            },
        }
        .into_record()
    }
}

/// Simulated record for a filename.
pub fn simulated_record(filename: &str) -> MeasurementRecord {
    RoofCategory::from_filename(filename).record()
}

// Compact authoring form; the first pitch is the predominant one.
struct Profile {
    total_area: f64,
    pitches: &'static [(&'static str, f64)],
    ridge: (f64, u32),
    hip: (f64, u32),
    valley: (f64, u32),
    rake: (f64, u32),
    eave: (f64, u32),
    step_flashing: (f64, u32),
    chimneys: u32,
    skylights: u32,
    turbine_vents: u32,
    pipe_vents: u32,
    penetrations_area: f64,
    penetrations_perimeter: f64,
}

impl Profile {
    fn into_record(self) -> MeasurementRecord {
        let feature = |(length, count): (f64, u32)| LinearFeature::new(length, count);
        let areas_by_pitch: IndexMap<String, f64> = self
            .pitches
            .iter()
            .map(|(pitch, area)| (pitch.to_string(), *area))
            .collect();
        let predominant_pitch = self
            .pitches
            .first()
            .map(|(pitch, _)| pitch.to_string())
            .unwrap_or_default();

        MeasurementRecord {
            total_area: self.total_area,
            predominant_pitch,
            ridge: feature(self.ridge),
            hip: feature(self.hip),
            valley: feature(self.valley),
            rake: feature(self.rake),
            eave: feature(self.eave),
            step_flashing: feature(self.step_flashing),
            chimney_count: self.chimneys,
            skylight_count: self.skylights,
            turbine_vent_count: self.turbine_vents,
            pipe_vent_count: self.pipe_vents,
            penetrations_area: self.penetrations_area,
            penetrations_perimeter: self.penetrations_perimeter,
            areas_by_pitch,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::constants::{
        units_for_length, CHIMNEY_AREA_SQFT, CHIMNEY_PERIMETER_FT, PIPE_VENT_AREA_SQFT,
        PIPE_VENT_PERIMETER_FT, SKYLIGHT_AREA_SQFT, SKYLIGHT_PERIMETER_FT,
        STEP_FLASHING_FT_PER_PENETRATION,
    };
    use crate::types::record::FeatureKind;

    const ALL: [RoofCategory; 4] = [
        RoofCategory::EagleViewDaisy,
        RoofCategory::Complex,
        RoofCategory::Commercial,
        RoofCategory::Standard,
    ];

    #[test]
    fn test_classification() {
        assert_eq!(
            RoofCategory::from_filename("EagleView_Daisy_Report.pdf"),
            RoofCategory::EagleViewDaisy
        );
        assert_eq!(RoofCategory::from_filename("custom-home.pdf"), RoofCategory::Complex);
        assert_eq!(RoofCategory::from_filename("COMPLEX roof.PDF"), RoofCategory::Complex);
        assert_eq!(RoofCategory::from_filename("large_warehouse.pdf"), RoofCategory::Commercial);
        assert_eq!(RoofCategory::from_filename("Commercial.pdf"), RoofCategory::Commercial);
        assert_eq!(RoofCategory::from_filename("report.pdf"), RoofCategory::Standard);
        assert_eq!(RoofCategory::from_filename(""), RoofCategory::Standard);
    }

    #[test]
    fn test_daisy_needs_both_keywords() {
        assert_eq!(RoofCategory::from_filename("eagleview.pdf"), RoofCategory::Standard);
        assert_eq!(RoofCategory::from_filename("daisy.pdf"), RoofCategory::Standard);
    }

    #[test]
    fn test_first_category_wins() {
        // Matches both Complex and Commercial
        assert_eq!(
            RoofCategory::from_filename("large-custom-build.pdf"),
            RoofCategory::Complex
        );
        assert_eq!(
            RoofCategory::from_filename("eagleview daisy complex.pdf"),
            RoofCategory::EagleViewDaisy
        );
    }

    #[test]
    fn test_standard_record() {
        let record = simulated_record("anything.pdf");
        assert_eq!(record.total_area, 2400.0);
        assert_eq!(record.predominant_pitch, "6:12");
        assert_eq!(record.ridge, LinearFeature::new(60.0, 3));
        assert_eq!(record.pipe_vent_count, 3);
        assert_eq!(record.areas_by_pitch["8:12"], 600.0);
    }

    #[test]
    fn test_same_category_same_record() {
        assert_eq!(simulated_record("a-commercial.pdf"), simulated_record("LARGE.pdf"));
        assert_ne!(simulated_record("a-commercial.pdf"), simulated_record("plain.pdf"));
    }

    #[test]
    fn test_records_are_internally_consistent() {
        for category in ALL {
            let record = category.record();

            assert_eq!(record.total_area, record.pitch_area_sum(), "{:?}", category);

            let (top, _) = record
                .areas_by_pitch
                .iter()
                .fold(("", f64::MIN), |best, (pitch, &area)| {
                    if area > best.1 {
                        (pitch.as_str(), area)
                    } else {
                        best
                    }
                });
            assert_eq!(record.predominant_pitch, top, "{:?}", category);

            for kind in FeatureKind::ALL {
                let feature = record.feature(kind);
                assert_eq!(
                    feature.count,
                    units_for_length(kind, feature.length),
                    "{:?} {:?}",
                    category,
                    kind
                );
            }

            let chimneys = f64::from(record.chimney_count);
            let skylights = f64::from(record.skylight_count);
            let pipes = f64::from(record.pipe_vent_count);
            assert_eq!(
                record.penetrations_area,
                chimneys * CHIMNEY_AREA_SQFT + skylights * SKYLIGHT_AREA_SQFT + pipes * PIPE_VENT_AREA_SQFT
            );
            assert_eq!(
                record.penetrations_perimeter,
                chimneys * CHIMNEY_PERIMETER_FT
                    + skylights * SKYLIGHT_PERIMETER_FT
                    + pipes * PIPE_VENT_PERIMETER_FT
            );
            assert_eq!(record.step_flashing.count, record.flashed_penetrations());
            assert_eq!(
                record.step_flashing.length,
                f64::from(record.flashed_penetrations()) * STEP_FLASHING_FT_PER_PENETRATION
            );
        }
    }

    #[test]
    fn test_records_already_normalized() {
        for category in ALL {
            let record = category.record();
            assert_eq!(record.clone().normalized(), record);
        }
    }
}
