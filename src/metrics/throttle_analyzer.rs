use itertools::Itertools;

use crate::session::LapRecord;

use super::{MetricExtractor, StyleMetric, mean};

/// Scores how gradually the throttle is applied.
///
/// Each lap scores `1 / (1 + rms)` where `rms` is the root mean square of consecutive throttle
/// differences in percentage points. A flat trace scores 1 and choppier traces score lower.
pub(crate) struct ThrottleAnalyzer;

impl ThrottleAnalyzer {
    fn lap_smoothness(lap: &LapRecord) -> Option<f64> {
        let throttle = lap.telemetry.iter().filter_map(|s| s.throttle_pct);
        let mean_square = mean(throttle.tuple_windows().map(|(prev, cur)| (cur - prev).powi(2)))?;
        Some(1. / (1. + mean_square.sqrt()))
    }
}

impl MetricExtractor for ThrottleAnalyzer {
    fn metric(&self) -> StyleMetric {
        StyleMetric::ThrottleSmoothness
    }

    fn extract(&self, laps: &[&LapRecord]) -> Option<f64> {
        mean(laps.iter().filter_map(|lap| Self::lap_smoothness(lap)))
    }
}
