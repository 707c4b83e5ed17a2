pub(crate) mod braking_analyzer;
pub(crate) mod cornering_analyzer;
pub mod lap_time;
pub(crate) mod shift_analyzer;
pub(crate) mod throttle_analyzer;

use std::fmt;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    SignatureError,
    session::{LapRecord, SessionData, SessionSelector},
};

use braking_analyzer::{BrakingAnalyzer, MAX_BRAKING_G};
use cornering_analyzer::CorneringAnalyzer;
pub use lap_time::{LapTimeSummary, fastest_lap, format_lap_time};
use shift_analyzer::{MAX_SHIFTS_PER_KM, ShiftAnalyzer};
use throttle_analyzer::ThrottleAnalyzer;

/// Upper bound of the cornering consistency metric. The dispersion of speeds inside the
/// 0-400 km/h band can never exceed half of that band.
const MAX_CORNERING_DISPERSION_KPH: f64 = 200.;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleMetric {
    BrakingAggressiveness,
    ThrottleSmoothness,
    CorneringConsistency,
    ShiftFrequency,
}

impl StyleMetric {
    pub const ALL: [StyleMetric; 4] = [
        StyleMetric::BrakingAggressiveness,
        StyleMetric::ThrottleSmoothness,
        StyleMetric::CorneringConsistency,
        StyleMetric::ShiftFrequency,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::BrakingAggressiveness => "Braking Aggressiveness",
            Self::ThrottleSmoothness => "Throttle Smoothness",
            Self::CorneringConsistency => "Cornering Consistency",
            Self::ShiftFrequency => "Shift Frequency",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::BrakingAggressiveness => "G",
            Self::ThrottleSmoothness => "",
            Self::CorneringConsistency => "km/h",
            Self::ShiftFrequency => "shifts/km",
        }
    }

    /// Range every extracted value of this metric falls in
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            Self::BrakingAggressiveness => (0., MAX_BRAKING_G),
            Self::ThrottleSmoothness => (0., 1.),
            Self::CorneringConsistency => (0., MAX_CORNERING_DISPERSION_KPH),
            Self::ShiftFrequency => (0., MAX_SHIFTS_PER_KM),
        }
    }

    /// Value mapped to 1.0 on charts. Real sessions sit well inside `bounds`, so charts use a
    /// tighter scale.
    pub fn display_scale(&self) -> f64 {
        match self {
            Self::BrakingAggressiveness => MAX_BRAKING_G,
            Self::ThrottleSmoothness => 1.,
            Self::CorneringConsistency => 50.,
            Self::ShiftFrequency => 20.,
        }
    }

    /// Whether a lower value reads as the steadier driver
    pub fn lower_is_steadier(&self) -> bool {
        matches!(self, Self::CorneringConsistency)
    }
}

impl fmt::Display for StyleMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Which of a driver's valid laps feed the style metrics
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum LapSelection {
    #[default]
    AllLaps,
    FastestLap,
}

/// How cornering consistency was measured. Values are only comparable within the same mode.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CorneringMode {
    /// Spread of speeds at the same point of the track across laps
    LapToLap,
    /// Spread of cornering speeds inside each lap, averaged over laps
    WithinLap,
}

impl CorneringMode {
    pub fn description(&self) -> &'static str {
        match self {
            Self::LapToLap => "lap to lap at fixed track positions",
            Self::WithinLap => "within each lap",
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StyleFingerprint {
    pub session: SessionSelector,
    pub driver: String,
    /// Mean braking deceleration in G
    pub braking_aggressiveness: f64,
    /// 1 for a perfectly flat throttle trace, towards 0 as the trace gets choppier
    pub throttle_smoothness: f64,
    /// Speed dispersion through corners in km/h, lower is more consistent
    pub cornering_consistency: f64,
    pub cornering_mode: CorneringMode,
    /// Gear changes per kilometer
    pub shift_frequency: f64,
    pub lap_times: LapTimeSummary,
    /// Laps that passed validation
    pub valid_laps: usize,
    /// Laps the style metrics were computed on
    pub analyzed_laps: usize,
}

impl StyleFingerprint {
    pub fn value(&self, metric: StyleMetric) -> f64 {
        match metric {
            StyleMetric::BrakingAggressiveness => self.braking_aggressiveness,
            StyleMetric::ThrottleSmoothness => self.throttle_smoothness,
            StyleMetric::CorneringConsistency => self.cornering_consistency,
            StyleMetric::ShiftFrequency => self.shift_frequency,
        }
    }

    /// Extracts the fingerprint of one driver from a fetched session
    pub fn from_session(
        session: &SessionData,
        driver: &str,
        selection: LapSelection,
    ) -> Result<Self, SignatureError> {
        extract_fingerprint(
            &session.selector,
            driver,
            session.driver_laps(driver)?,
            selection,
        )
    }

    /// Extracts the fingerprints of two drivers with cornering measured the same way for both.
    /// When only one of them has laps to compare lap to lap, both fall back to `WithinLap`.
    pub fn pair_from_session(
        session: &SessionData,
        driver_a: &str,
        driver_b: &str,
        selection: LapSelection,
    ) -> Result<(Self, Self), SignatureError> {
        let a = Self::from_session(session, driver_a, selection)?;
        let b = Self::from_session(session, driver_b, selection)?;
        if a.cornering_mode == b.cornering_mode {
            return Ok((a, b));
        }

        debug!(
            "Cornering measured {:?} for {} and {:?} for {}, using within-lap for both",
            a.cornering_mode, driver_a, b.cornering_mode, driver_b
        );
        let within_lap = |driver: &str| {
            extract_with_cornering(
                &session.selector,
                driver,
                session.driver_laps(driver)?,
                selection,
                CorneringAnalyzer::with_mode(CorneringMode::WithinLap),
            )
        };
        Ok((within_lap(driver_a)?, within_lap(driver_b)?))
    }
}

/// Computes one style metric over a set of laps
pub trait MetricExtractor {
    fn metric(&self) -> StyleMetric;

    /// Returns `None` when none of the laps carries the channels this metric needs
    fn extract(&self, laps: &[&LapRecord]) -> Option<f64>;
}

/// A lap is usable when it is timed, has at least two samples, and its samples are in
/// distance order.
pub fn is_lap_valid(lap: &LapRecord) -> bool {
    let timed = lap.lap_time_s.is_some_and(|t| t.is_finite() && t > 0.);
    timed
        && lap.telemetry.len() >= 2
        && lap.telemetry.iter().all(|s| s.distance_m.is_finite())
        && lap
            .telemetry
            .windows(2)
            .all(|w| w[0].distance_m <= w[1].distance_m)
}

pub fn extract_fingerprint(
    session: &SessionSelector,
    driver: &str,
    laps: &[LapRecord],
    selection: LapSelection,
) -> Result<StyleFingerprint, SignatureError> {
    extract_with_cornering(
        session,
        driver,
        laps,
        selection,
        CorneringAnalyzer::default(),
    )
}

fn extract_with_cornering(
    session: &SessionSelector,
    driver: &str,
    laps: &[LapRecord],
    selection: LapSelection,
    cornering: CorneringAnalyzer,
) -> Result<StyleFingerprint, SignatureError> {
    let valid_laps: Vec<&LapRecord> = laps.iter().filter(|lap| is_lap_valid(lap)).collect();
    debug!(
        "{}: {} of {} laps are valid in {}",
        driver,
        valid_laps.len(),
        laps.len(),
        session
    );

    let lap_times = LapTimeSummary::from_laps(&valid_laps).ok_or_else(|| {
        SignatureError::data_unavailable(format!(
            "no valid laps with telemetry for {} in {}",
            driver, session
        ))
    })?;

    let analyzed_laps = match selection {
        LapSelection::AllLaps => valid_laps.clone(),
        LapSelection::FastestLap => fastest_lap(&valid_laps).into_iter().collect(),
    };

    let cornering_mode = cornering.resolve_mode(&analyzed_laps);
    let extractors: [Box<dyn MetricExtractor>; 4] = [
        Box::new(BrakingAnalyzer),
        Box::new(ThrottleAnalyzer),
        Box::new(CorneringAnalyzer::with_mode(cornering_mode)),
        Box::new(ShiftAnalyzer),
    ];
    let mut values = [0.; 4];
    for (value, extractor) in values.iter_mut().zip(extractors.iter()) {
        let metric = extractor.metric();
        let extracted = extractor
            .extract(&analyzed_laps)
            .filter(|v| v.is_finite())
            .ok_or_else(|| SignatureError::MetricUndefined {
                metric: metric.display_name().to_string(),
                driver: driver.to_string(),
            })?;
        let (min, max) = metric.bounds();
        *value = extracted.clamp(min, max);
    }

    Ok(StyleFingerprint {
        session: session.clone(),
        driver: driver.to_string(),
        braking_aggressiveness: values[0],
        throttle_smoothness: values[1],
        cornering_consistency: values[2],
        cornering_mode,
        shift_frequency: values[3],
        lap_times,
        valid_laps: valid_laps.len(),
        analyzed_laps: analyzed_laps.len(),
    })
}

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0., 0usize), |(sum, count), v| (sum + v, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Population standard deviation
pub(crate) fn std_dev(values: &[f64]) -> Option<f64> {
    let avg = mean(values.iter().copied())?;
    let variance = mean(values.iter().map(|v| (v - avg).powi(2)))?;
    Some(variance.sqrt())
}
