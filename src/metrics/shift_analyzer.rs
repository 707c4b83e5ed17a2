use itertools::Itertools;

use crate::session::LapRecord;

use super::{MetricExtractor, StyleMetric, mean};

pub(crate) const MAX_SHIFTS_PER_KM: f64 = 100.;
/// Laps covering less than this are too short to normalize shift counts over
const MIN_SHIFT_DISTANCE_M: f64 = 1.;

/// Gear changes per kilometer, averaged across laps
pub(crate) struct ShiftAnalyzer;

impl ShiftAnalyzer {
    /// Number of changes between consecutive gear readings. Samples without a gear reading are
    /// ignored and repeated readings of the same gear never count as a shift.
    pub(crate) fn count_shifts(lap: &LapRecord) -> Option<usize> {
        let gears = lap.telemetry.iter().filter_map(|s| s.gear).collect_vec();
        if gears.is_empty() {
            return None;
        }
        Some(gears.iter().dedup().count() - 1)
    }

    fn lap_shift_frequency(lap: &LapRecord) -> Option<f64> {
        let shifts = Self::count_shifts(lap)?;
        let distance_m = match (lap.telemetry.first(), lap.telemetry.last()) {
            (Some(first), Some(last)) => last.distance_m - first.distance_m,
            _ => return None,
        };
        if distance_m < MIN_SHIFT_DISTANCE_M {
            return None;
        }
        Some(shifts as f64 / (distance_m / 1000.))
    }
}

impl MetricExtractor for ShiftAnalyzer {
    fn metric(&self) -> StyleMetric {
        StyleMetric::ShiftFrequency
    }

    fn extract(&self, laps: &[&LapRecord]) -> Option<f64> {
        mean(laps.iter().filter_map(|lap| Self::lap_shift_frequency(lap)))
    }
}
