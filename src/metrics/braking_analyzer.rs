use itertools::Itertools;
use uom::si::{
    acceleration::standard_gravity,
    f64::{Acceleration, Time, Velocity},
    time::second,
    velocity::kilometer_per_hour,
};

use crate::session::LapRecord;

use super::{MetricExtractor, StyleMetric, mean};

/// Ceiling of the braking metric. F1 cars peak around 5-6 G under braking.
pub(crate) const MAX_BRAKING_G: f64 = 6.;

/// Mean deceleration while the driver is on the brakes and the car is slowing down.
pub(crate) struct BrakingAnalyzer;

impl BrakingAnalyzer {
    /// `None` when no consecutive samples carry brake, speed and a forward time step. A lap with
    /// those channels that never slows down on the brakes scores 0.
    fn lap_braking_g(lap: &LapRecord) -> Option<f64> {
        let steps = lap
            .telemetry
            .iter()
            .tuple_windows()
            .filter_map(|(prev, cur)| {
                let elapsed = Time::new::<second>(cur.time_s? - prev.time_s?);
                if elapsed.get::<second>() <= 0. {
                    return None;
                }
                Some((cur.brake?, prev.speed_kph?, cur.speed_kph?, elapsed))
            })
            .collect_vec();
        if steps.is_empty() {
            return None;
        }

        let decelerations = steps
            .into_iter()
            .filter(|(brake, prev_speed, cur_speed, _)| *brake > 0. && cur_speed < prev_speed)
            .map(|(_, prev_speed, cur_speed, elapsed)| {
                let speed_lost = Velocity::new::<kilometer_per_hour>(prev_speed - cur_speed);
                let deceleration: Acceleration = speed_lost / elapsed;
                deceleration.get::<standard_gravity>()
            });
        Some(mean(decelerations).unwrap_or(0.))
    }
}

impl MetricExtractor for BrakingAnalyzer {
    fn metric(&self) -> StyleMetric {
        StyleMetric::BrakingAggressiveness
    }

    fn extract(&self, laps: &[&LapRecord]) -> Option<f64> {
        mean(laps.iter().filter_map(|lap| Self::lap_braking_g(lap)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::TelemetrySample;

    fn sample(i: usize, speed: f64, brake: Option<f64>) -> TelemetrySample {
        TelemetrySample {
            distance_m: i as f64 * 10.,
            time_s: Some(i as f64 * 0.5),
            speed_kph: Some(speed),
            brake,
            ..Default::default()
        }
    }

    fn lap(telemetry: Vec<TelemetrySample>) -> LapRecord {
        LapRecord {
            lap_number: 1,
            driver: "HAM".to_string(),
            lap_time_s: Some(80.),
            telemetry,
        }
    }

    #[test]
    fn test_deceleration_in_g() {
        // 88.26 km/h lost in 0.5s is 49.03 m/s^2, 5 G
        let braking_lap = lap(vec![
            sample(0, 300., Some(0.)),
            sample(1, 300. - 88.259_85, Some(1.)),
        ]);
        let g = BrakingAnalyzer.extract(&[&braking_lap]).unwrap();
        assert!((g - 5.).abs() < 1e-3, "got {}", g);
    }

    #[test]
    fn test_only_braking_samples_count() {
        let mixed_lap = lap(vec![
            sample(0, 300., Some(0.)),
            // lifting without brakes does not count
            sample(1, 250., Some(0.)),
            sample(2, 250. - 44.129_93, Some(1.)),
            // brake applied while speed rises does not count either
            sample(3, 230., Some(1.)),
        ]);
        let g = BrakingAnalyzer.extract(&[&mixed_lap]).unwrap();
        assert!((g - 2.5).abs() < 1e-3, "got {}", g);
    }

    #[test]
    fn test_harder_braking_scores_higher() {
        let soft = lap(vec![sample(0, 300., Some(0.)), sample(1, 280., Some(1.))]);
        let hard = lap(vec![sample(0, 300., Some(0.)), sample(1, 220., Some(1.))]);
        assert!(BrakingAnalyzer.extract(&[&hard]) > BrakingAnalyzer.extract(&[&soft]));
    }

    #[test]
    fn test_laps_without_brake_channel_are_skipped() {
        let no_channel = lap(vec![sample(0, 300., None), sample(1, 200., None)]);
        assert_eq!(BrakingAnalyzer.extract(&[&no_channel]), None);

        let braking_lap = lap(vec![
            sample(0, 300., Some(0.)),
            sample(1, 300. - 88.259_85, Some(1.)),
        ]);
        let g = BrakingAnalyzer.extract(&[&no_channel, &braking_lap]).unwrap();
        assert!((g - 5.).abs() < 1e-3);
    }

    #[test]
    fn test_lap_without_braking_scores_zero() {
        let coasting = lap(vec![
            sample(0, 300., Some(0.)),
            sample(1, 280., Some(0.)),
            sample(2, 290., Some(0.)),
        ]);
        assert_eq!(BrakingAnalyzer.extract(&[&coasting]), Some(0.));

        // it still pulls the average down next to a braking lap
        let braking_lap = lap(vec![
            sample(0, 300., Some(0.)),
            sample(1, 300. - 88.259_85, Some(1.)),
        ]);
        let g = BrakingAnalyzer.extract(&[&coasting, &braking_lap]).unwrap();
        assert!((g - 2.5).abs() < 1e-3, "got {}", g);
    }

    #[test]
    fn test_missing_timestamps_are_skipped() {
        let mut untimed = lap(vec![sample(0, 300., Some(0.)), sample(1, 200., Some(1.))]);
        untimed.telemetry[1].time_s = None;
        assert_eq!(BrakingAnalyzer.extract(&[&untimed]), None);
    }
}
