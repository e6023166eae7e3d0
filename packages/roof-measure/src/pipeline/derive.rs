//! Backfill of fields that can be inferred from what was recovered.
//!
//! One pure pass in a fixed order. A step only fills a value that is still
//! unset, and later steps see what earlier steps produced. There is no
//! fixed-point iteration.

use crate::types::constants::{
    units_for_length, CHIMNEY_AREA_SQFT, CHIMNEY_PERIMETER_FT, DEFAULT_PITCH,
    DEFAULT_TOTAL_AREA_SQFT, PIPE_VENT_AREA_SQFT, PIPE_VENT_PERIMETER_FT, SKYLIGHT_AREA_SQFT,
    SKYLIGHT_PERIMETER_FT, STEP_FLASHING_FT_PER_PENETRATION,
};
use crate::types::record::{FeatureKind, LinearFeature, MeasurementRecord, PartialMeasurements};

/// Resolve a partial extraction into a fully populated record.
///
/// Order:
/// 1. total area from the per-pitch sum
/// 2. feature counts from lengths
/// 3. penetrations area from penetration counts
/// 4. penetrations perimeter from penetration counts
/// 5. step flashing from penetration counts
/// 6. predominant pitch from the largest pitch area, else the default
/// 7. total area default
///
/// Anything still unset afterwards is 0.
pub fn resolve(mut partial: PartialMeasurements) -> MeasurementRecord {
    // 1
    if partial.total_area.is_none() && !partial.areas_by_pitch.is_empty() {
        partial.total_area = Some(partial.areas_by_pitch.values().sum());
    }

    // 2
    for kind in FeatureKind::ALL {
        let length = *partial.length_mut(kind);
        let count = partial.count_mut(kind);
        if count.is_none() {
            if let Some(length) = length {
                *count = Some(units_for_length(kind, length));
            }
        }
    }

    let chimneys = partial.chimney_count.unwrap_or(0);
    let skylights = partial.skylight_count.unwrap_or(0);
    let pipe_vents = partial.pipe_vent_count.unwrap_or(0);
    let penetrations = chimneys.saturating_add(skylights).saturating_add(pipe_vents);

    // 3, 4
    if penetrations > 0 {
        if partial.penetrations_area.is_none() {
            partial.penetrations_area = Some(
                f64::from(chimneys) * CHIMNEY_AREA_SQFT
                    + f64::from(skylights) * SKYLIGHT_AREA_SQFT
                    + f64::from(pipe_vents) * PIPE_VENT_AREA_SQFT,
            );
        }
        if partial.penetrations_perimeter.is_none() {
            partial.penetrations_perimeter = Some(
                f64::from(chimneys) * CHIMNEY_PERIMETER_FT
                    + f64::from(skylights) * SKYLIGHT_PERIMETER_FT
                    + f64::from(pipe_vents) * PIPE_VENT_PERIMETER_FT,
            );
        }
    }

    // 5
    if penetrations > 0
        && partial.step_flashing_length.is_none()
        && partial.step_flashing_count.is_none()
    {
        partial.step_flashing_length =
            Some(f64::from(penetrations) * STEP_FLASHING_FT_PER_PENETRATION);
        partial.step_flashing_count = Some(penetrations);
    }

    // 6
    if partial.predominant_pitch.is_none() {
        partial.predominant_pitch = Some(
            largest_pitch(&partial).unwrap_or_else(|| DEFAULT_PITCH.to_string()),
        );
    }

    // 7
    if partial.total_area.is_none() {
        partial.total_area = Some(DEFAULT_TOTAL_AREA_SQFT);
    }

    into_record(partial)
}

/// Key of the largest pitch area. Ties keep the first encountered.
fn largest_pitch(partial: &PartialMeasurements) -> Option<String> {
    let mut best: Option<(&String, f64)> = None;
    for (pitch, &area) in &partial.areas_by_pitch {
        match best {
            Some((_, best_area)) if area <= best_area => {}
            _ => best = Some((pitch, area)),
        }
    }
    best.map(|(pitch, _)| pitch.clone())
}

fn into_record(mut partial: PartialMeasurements) -> MeasurementRecord {
    let mut feature = |kind: FeatureKind| {
        LinearFeature::new(
            partial.length_mut(kind).unwrap_or(0.0),
            partial.count_mut(kind).unwrap_or(0),
        )
    };

    let ridge = feature(FeatureKind::Ridge);
    let hip = feature(FeatureKind::Hip);
    let valley = feature(FeatureKind::Valley);
    let rake = feature(FeatureKind::Rake);
    let eave = feature(FeatureKind::Eave);
    let step_flashing = feature(FeatureKind::StepFlashing);

    MeasurementRecord {
        total_area: partial.total_area.unwrap_or(0.0),
        predominant_pitch: partial
            .predominant_pitch
            .unwrap_or_else(|| DEFAULT_PITCH.to_string()),
        ridge,
        hip,
        valley,
        rake,
        eave,
        step_flashing,
        chimney_count: partial.chimney_count.unwrap_or(0),
        skylight_count: partial.skylight_count.unwrap_or(0),
        turbine_vent_count: partial.turbine_vent_count.unwrap_or(0),
        pipe_vent_count: partial.pipe_vent_count.unwrap_or(0),
        penetrations_area: partial.penetrations_area.unwrap_or(0.0),
        penetrations_perimeter: partial.penetrations_perimeter.unwrap_or(0.0),
        areas_by_pitch: partial.areas_by_pitch,
    }
}
