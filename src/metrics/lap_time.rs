use serde::{Deserialize, Serialize};

use crate::session::LapRecord;

use super::{mean, std_dev};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LapTimeSummary {
    pub timed_laps: usize,
    pub fastest_lap_number: u32,
    pub fastest_s: f64,
    pub mean_s: f64,
    pub std_s: f64,
}

impl LapTimeSummary {
    /// `None` when none of the laps has a lap time
    pub fn from_laps(laps: &[&LapRecord]) -> Option<Self> {
        let fastest = fastest_lap(laps)?;
        let times: Vec<f64> = laps.iter().filter_map(|lap| lap.lap_time_s).collect();
        Some(Self {
            timed_laps: times.len(),
            fastest_lap_number: fastest.lap_number,
            fastest_s: fastest.lap_time_s?,
            mean_s: mean(times.iter().copied())?,
            std_s: std_dev(&times)?,
        })
    }
}

/// Fastest timed lap. Ties go to the lap listed first.
pub fn fastest_lap<'a>(laps: &[&'a LapRecord]) -> Option<&'a LapRecord> {
    laps.iter()
        .copied()
        .filter(|lap| lap.lap_time_s.is_some())
        .reduce(|best, lap| {
            if lap.lap_time_s < best.lap_time_s {
                lap
            } else {
                best
            }
        })
}

/// Formats seconds as `m:ss.mmm`
pub fn format_lap_time(seconds: f64) -> String {
    let millis = (seconds.abs() * 1000.).round() as u64;
    let sign = if seconds < 0. && millis > 0 { "-" } else { "" };
    format!(
        "{}{}:{:02}.{:03}",
        sign,
        millis / 60_000,
        (millis / 1000) % 60,
        millis % 1000
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timed_lap(lap_number: u32, lap_time_s: Option<f64>) -> LapRecord {
        LapRecord {
            lap_number,
            driver: "BOT".to_string(),
            lap_time_s,
            telemetry: vec![],
        }
    }

    #[test]
    fn test_summary() {
        let laps = [
            timed_lap(1, Some(92.)),
            timed_lap(2, Some(90.)),
            timed_lap(3, None),
            timed_lap(4, Some(91.)),
        ];
        let refs: Vec<&LapRecord> = laps.iter().collect();
        let summary = LapTimeSummary::from_laps(&refs).unwrap();
        assert_eq!(summary.timed_laps, 3);
        assert_eq!(summary.fastest_lap_number, 2);
        assert_eq!(summary.fastest_s, 90.);
        assert!((summary.mean_s - 91.).abs() < 1e-12);
        assert!((summary.std_s - (2f64 / 3.).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_no_timed_laps() {
        let laps = [timed_lap(1, None)];
        let refs: Vec<&LapRecord> = laps.iter().collect();
        assert_eq!(LapTimeSummary::from_laps(&refs), None);
        assert!(fastest_lap(&refs).is_none());
    }

    #[test]
    fn test_fastest_lap_tie_goes_to_first_listed() {
        let laps = [timed_lap(7, Some(90.)), timed_lap(3, Some(90.))];
        let refs: Vec<&LapRecord> = laps.iter().collect();
        assert_eq!(fastest_lap(&refs).unwrap().lap_number, 7);
    }

    #[test]
    fn test_format_lap_time() {
        assert_eq!(format_lap_time(92.456), "1:32.456");
        assert_eq!(format_lap_time(59.9999), "1:00.000");
        assert_eq!(format_lap_time(-0.25), "-0:00.250");
        assert_eq!(format_lap_time(0.), "0:00.000");
    }
}
