use itertools::Itertools;

use crate::session::{LapRecord, TelemetrySample};

use super::{CorneringMode, MetricExtractor, StyleMetric, mean, std_dev};

const DEFAULT_MARKER_SPACING_M: f64 = 50.;
/// Below this throttle a section of track counts as cornering
const CORNERING_THROTTLE_PCT: f64 = 50.;
/// Minimum speed change between samples for a single-lap cornering sample
const MIN_CORNER_SPEED_CHANGE_KPH: f64 = 1.;

/// Measures how repeatable a driver's cornering speeds are.
///
/// In `LapToLap` mode every lap's speed is sampled at distance markers and the lap-to-lap spread
/// at each cornering marker is averaged. In `WithinLap` mode each lap scores the spread of its
/// own cornering speeds and the scores are averaged.
pub(crate) struct CorneringAnalyzer {
    marker_spacing_m: f64,
    /// Forces a mode instead of picking one from the laps
    mode: Option<CorneringMode>,
}

impl Default for CorneringAnalyzer {
    fn default() -> Self {
        Self {
            marker_spacing_m: DEFAULT_MARKER_SPACING_M,
            mode: None,
        }
    }
}

impl CorneringAnalyzer {
    pub(crate) fn with_mode(mode: CorneringMode) -> Self {
        Self {
            mode: Some(mode),
            ..Default::default()
        }
    }

    /// `LapToLap` needs at least two laps with speed readings over a common stretch of track
    pub(crate) fn resolve_mode(&self, laps: &[&LapRecord]) -> CorneringMode {
        if let Some(mode) = self.mode {
            return mode;
        }
        let speed_laps = speed_laps(laps);
        if speed_laps.len() >= 2 && common_range(&speed_laps).is_some() {
            CorneringMode::LapToLap
        } else {
            CorneringMode::WithinLap
        }
    }

    fn across_laps(&self, laps: &[&LapRecord]) -> Option<f64> {
        let (start, end) = common_range(laps)?;
        let markers = (0..)
            .map(|i| start + i as f64 * self.marker_spacing_m)
            .take_while(|d| *d <= end);

        let mut all_spreads = Vec::new();
        let mut corner_spreads = Vec::new();
        for marker in markers {
            let speeds: Vec<f64> = laps
                .iter()
                .filter_map(|lap| interpolate(&lap.telemetry, marker, |s| s.speed_kph))
                .collect();
            let Some(spread) = std_dev(&speeds) else {
                continue;
            };
            let mean_throttle = mean(
                laps.iter()
                    .filter_map(|lap| interpolate(&lap.telemetry, marker, |s| s.throttle_pct)),
            );
            if mean_throttle.is_some_and(|t| t < CORNERING_THROTTLE_PCT) {
                corner_spreads.push(spread);
            }
            all_spreads.push(spread);
        }

        if corner_spreads.is_empty() {
            mean(all_spreads)
        } else {
            mean(corner_spreads)
        }
    }

    /// `None` when no consecutive samples carry both speed and throttle. A lap with those
    /// channels but no cornering samples has no spread and scores 0.
    fn within_lap(lap: &LapRecord) -> Option<f64> {
        let readings = lap
            .telemetry
            .iter()
            .tuple_windows()
            .filter_map(|(prev, cur)| Some((prev.speed_kph?, cur.speed_kph?, cur.throttle_pct?)))
            .collect_vec();
        if readings.is_empty() {
            return None;
        }
        let corner_speeds = readings
            .into_iter()
            .filter(|(prev_speed, speed, throttle)| {
                *throttle < CORNERING_THROTTLE_PCT
                    && (speed - prev_speed).abs() > MIN_CORNER_SPEED_CHANGE_KPH
            })
            .map(|(_, speed, _)| speed)
            .collect_vec();
        Some(std_dev(&corner_speeds).unwrap_or(0.))
    }
}

impl MetricExtractor for CorneringAnalyzer {
    fn metric(&self) -> StyleMetric {
        StyleMetric::CorneringConsistency
    }

    fn extract(&self, laps: &[&LapRecord]) -> Option<f64> {
        match self.resolve_mode(laps) {
            CorneringMode::LapToLap => self.across_laps(&speed_laps(laps)),
            CorneringMode::WithinLap => mean(laps.iter().filter_map(|lap| Self::within_lap(lap))),
        }
    }
}

fn speed_laps<'a>(laps: &[&'a LapRecord]) -> Vec<&'a LapRecord> {
    laps.iter()
        .filter(|lap| lap.telemetry.iter().filter(|s| s.speed_kph.is_some()).count() >= 2)
        .copied()
        .collect_vec()
}

/// Stretch of track every lap has speed readings for
fn common_range(laps: &[&LapRecord]) -> Option<(f64, f64)> {
    let (start, end) = laps.iter().fold((f64::MIN, f64::MAX), |(start, end), lap| {
        let (first, last) = speed_range(lap);
        (start.max(first), end.min(last))
    });
    (start <= end).then_some((start, end))
}

/// First and last distance with a speed reading
fn speed_range(lap: &LapRecord) -> (f64, f64) {
    let distances = lap
        .telemetry
        .iter()
        .filter(|s| s.speed_kph.is_some())
        .map(|s| s.distance_m);
    match distances.minmax().into_option() {
        Some((first, last)) => (first, last),
        None => (f64::MAX, f64::MIN),
    }
}

/// Linear interpolation of a channel at a distance. Samples must be in distance order.
fn interpolate(
    telemetry: &[TelemetrySample],
    distance_m: f64,
    channel: impl Fn(&TelemetrySample) -> Option<f64>,
) -> Option<f64> {
    telemetry
        .iter()
        .filter_map(|s| channel(s).map(|v| (s.distance_m, v)))
        .tuple_windows()
        .find(|((d0, _), (d1, _))| *d0 <= distance_m && distance_m <= *d1)
        .map(|((d0, v0), (d1, v1))| {
            if d1 > d0 {
                v0 + (v1 - v0) * (distance_m - d0) / (d1 - d0)
            } else {
                v0
            }
        })
}
