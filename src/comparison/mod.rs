pub mod report;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    SignatureError,
    metrics::{StyleFingerprint, StyleMetric},
    session::SessionSelector,
};

/// Differences smaller than this read as a tie in the style summary
const INSIGHT_TIE_TOLERANCE: f64 = 1e-6;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct MetricRow {
    pub metric: StyleMetric,
    pub value_a: f64,
    pub value_b: f64,
    /// `value_a - value_b`
    pub delta: f64,
}

/// One spoke of the radar chart, both values scaled to 0..=1
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RadarAxis {
    pub metric: StyleMetric,
    pub a: f64,
    pub b: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct BarSeries {
    pub driver: String,
    pub values: Vec<(StyleMetric, f64)>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LapTimeComparison {
    pub fastest_lap_a: u32,
    pub fastest_lap_b: u32,
    pub fastest_a_s: f64,
    pub fastest_b_s: f64,
    pub fastest_delta_s: f64,
    pub mean_a_s: f64,
    pub mean_b_s: f64,
    pub mean_delta_s: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StyleInsight {
    pub metric: StyleMetric,
    /// `None` when both drivers are level on this metric
    pub leader: Option<String>,
    pub summary: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ComparisonResult {
    pub session: SessionSelector,
    pub driver_a: String,
    pub driver_b: String,
    pub fingerprint_a: StyleFingerprint,
    pub fingerprint_b: StyleFingerprint,
    pub rows: Vec<MetricRow>,
    pub radar: Vec<RadarAxis>,
    pub bars: Vec<BarSeries>,
    pub lap_times: LapTimeComparison,
    pub insights: Vec<StyleInsight>,
}

/// Pairs two fingerprints from the same session into a display-ready comparison.
pub fn assemble(
    a: &StyleFingerprint,
    b: &StyleFingerprint,
) -> Result<ComparisonResult, SignatureError> {
    if a.session != b.session {
        return Err(SignatureError::SessionMismatch {
            left: a.session.to_string(),
            right: b.session.to_string(),
        });
    }
    if a.driver == b.driver {
        return Err(SignatureError::invalid_input(
            "drivers",
            "select two different drivers for comparison",
        ));
    }
    if a.cornering_mode != b.cornering_mode {
        return Err(SignatureError::IncomparableMetric {
            metric: StyleMetric::CorneringConsistency.to_string(),
            left: format!("{} ({})", a.driver, a.cornering_mode.description()),
            right: format!("{} ({})", b.driver, b.cornering_mode.description()),
        });
    }

    let rows = StyleMetric::ALL
        .iter()
        .map(|metric| {
            let (value_a, value_b) = (a.value(*metric), b.value(*metric));
            MetricRow {
                metric: *metric,
                value_a,
                value_b,
                delta: value_a - value_b,
            }
        })
        .collect::<Vec<_>>();

    let radar = StyleMetric::ALL
        .iter()
        .map(|metric| RadarAxis {
            metric: *metric,
            a: normalize(*metric, a.value(*metric)),
            b: normalize(*metric, b.value(*metric)),
        })
        .collect();

    let bars = [a, b]
        .iter()
        .map(|fingerprint| BarSeries {
            driver: fingerprint.driver.clone(),
            values: StyleMetric::ALL
                .iter()
                .map(|metric| (*metric, fingerprint.value(*metric)))
                .collect(),
        })
        .collect();

    let lap_times = LapTimeComparison {
        fastest_lap_a: a.lap_times.fastest_lap_number,
        fastest_lap_b: b.lap_times.fastest_lap_number,
        fastest_a_s: a.lap_times.fastest_s,
        fastest_b_s: b.lap_times.fastest_s,
        fastest_delta_s: a.lap_times.fastest_s - b.lap_times.fastest_s,
        mean_a_s: a.lap_times.mean_s,
        mean_b_s: b.lap_times.mean_s,
        mean_delta_s: a.lap_times.mean_s - b.lap_times.mean_s,
    };

    let insights = rows
        .iter()
        .map(|row| insight(row, &a.driver, &b.driver))
        .collect();

    debug!("Assembled comparison {} vs {} for {}", a.driver, b.driver, a.session);
    Ok(ComparisonResult {
        session: a.session.clone(),
        driver_a: a.driver.clone(),
        driver_b: b.driver.clone(),
        fingerprint_a: a.clone(),
        fingerprint_b: b.clone(),
        rows,
        radar,
        bars,
        lap_times,
        insights,
    })
}

/// Scales a metric value to 0..=1 using the metric's chart scale
pub fn normalize(metric: StyleMetric, value: f64) -> f64 {
    (value / metric.display_scale()).clamp(0., 1.)
}

fn insight(row: &MetricRow, driver_a: &str, driver_b: &str) -> StyleInsight {
    let leader = if row.delta.abs() < INSIGHT_TIE_TOLERANCE {
        None
    } else if (row.delta > 0.) != row.metric.lower_is_steadier() {
        Some(driver_a)
    } else {
        Some(driver_b)
    };

    let summary = match (row.metric, leader) {
        (metric, None) => format!("{}: evenly matched", metric),
        (StyleMetric::BrakingAggressiveness, Some(leader)) => format!(
            "Most aggressive braker: {} shows higher deceleration forces",
            leader
        ),
        (StyleMetric::ThrottleSmoothness, Some(leader)) => format!(
            "Smoothest throttle application: {} applies the throttle more progressively",
            leader
        ),
        (StyleMetric::CorneringConsistency, Some(leader)) => format!(
            "Most consistent cornering: {} repeats corner speeds more closely",
            leader
        ),
        (StyleMetric::ShiftFrequency, Some(leader)) => format!(
            "Busiest gearbox: {} changes gear more often per kilometer",
            leader
        ),
    };

    StyleInsight {
        metric: row.metric,
        leader: leader.map(str::to_string),
        summary,
    }
}
