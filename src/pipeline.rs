// Request pipeline: select -> fetch -> extract -> assemble

use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    SignatureError,
    comparison::{ComparisonResult, assemble},
    metrics::{LapSelection, StyleFingerprint},
    session::{SessionProvider, SessionSelector},
};

/// Everything one "Analyze Drivers" action needs, captured when the action is triggered.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub session: SessionSelector,
    pub driver_a: String,
    pub driver_b: String,
    pub lap_selection: LapSelection,
}

impl AnalysisRequest {
    pub fn new(
        session: SessionSelector,
        driver_a: &str,
        driver_b: &str,
        lap_selection: LapSelection,
    ) -> Result<Self, SignatureError> {
        let (driver_a, driver_b) = (driver_a.trim(), driver_b.trim());
        if driver_a.is_empty() || driver_b.is_empty() {
            return Err(SignatureError::invalid_input(
                "drivers",
                "two drivers must be selected",
            ));
        }
        if driver_a == driver_b {
            return Err(SignatureError::invalid_input(
                "drivers",
                "select two different drivers for comparison",
            ));
        }
        Ok(Self {
            session,
            driver_a: driver_a.to_string(),
            driver_b: driver_b.to_string(),
            lap_selection,
        })
    }
}

/// Result of the "Load Session Data" action
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionOverview {
    pub selector: SessionSelector,
    /// Sorted driver identifiers
    pub drivers: Vec<String>,
    pub lap_count: usize,
}

pub fn load_session(
    provider: &mut impl SessionProvider,
    selector: &SessionSelector,
) -> Result<SessionOverview, SignatureError> {
    let session = provider.fetch_session(selector)?;
    let drivers = session.drivers();
    if drivers.is_empty() {
        return Err(SignatureError::data_unavailable(format!(
            "{} has no laps",
            selector
        )));
    }
    info!("Loaded {} with {} drivers", selector, drivers.len());
    Ok(SessionOverview {
        selector: session.selector.clone(),
        drivers,
        lap_count: session.lap_count(),
    })
}

/// Runs one comparison. The session is fetched once and a failed fetch ends the request.
pub fn analyze(
    provider: &mut impl SessionProvider,
    request: &AnalysisRequest,
) -> Result<ComparisonResult, SignatureError> {
    if request.driver_a == request.driver_b {
        return Err(SignatureError::invalid_input(
            "drivers",
            "select two different drivers for comparison",
        ));
    }
    let session = provider.fetch_session(&request.session)?;
    let (fingerprint_a, fingerprint_b) = StyleFingerprint::pair_from_session(
        &session,
        &request.driver_a,
        &request.driver_b,
        request.lap_selection,
    )?;
    let result = assemble(&fingerprint_a, &fingerprint_b)?;
    info!(
        "Compared {} and {} in {}",
        request.driver_a, request.driver_b, request.session
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        metrics::{CorneringMode, test_laps::corner_lap},
        session::{LapRecord, SessionData, SessionType, StaticSessionProvider},
    };

    fn selector() -> SessionSelector {
        SessionSelector::new(2022, "Abu Dhabi Grand Prix", SessionType::Qualifying).unwrap()
    }

    fn session() -> SessionData {
        let mut laps = vec![
            corner_lap(1, "VER", 100.),
            corner_lap(2, "VER", 102.),
            corner_lap(1, "LEC", 97.),
            corner_lap(2, "LEC", 104.),
        ];
        // driver with telemetry but no timed laps
        laps.push(LapRecord {
            lap_time_s: None,
            ..corner_lap(1, "MSC", 100.)
        });
        SessionData::from_laps(selector(), laps)
    }

    fn provider() -> StaticSessionProvider {
        StaticSessionProvider::new(vec![session()])
    }

    #[test]
    fn test_load_session_lists_sorted_drivers() {
        let overview = load_session(&mut provider(), &selector()).unwrap();
        assert_eq!(overview.drivers, vec!["LEC", "MSC", "VER"]);
        assert_eq!(overview.lap_count, 5);
    }

    #[test]
    fn test_analyze() {
        let request =
            AnalysisRequest::new(selector(), "VER", "LEC", LapSelection::AllLaps).unwrap();
        let result = analyze(&mut provider(), &request).unwrap();
        assert_eq!(result.driver_a, "VER");
        assert_eq!(result.driver_b, "LEC");
        assert_eq!(result.session, selector());
        // LEC's apex speeds vary more
        assert!(result.rows[2].delta < 0.);
    }

    #[test]
    fn test_analyze_single_lap_driver_against_multi_lap_driver() {
        let mut session = session();
        session.push_lap(corner_lap(1, "TSU", 100.));
        let mut provider = StaticSessionProvider::new(vec![session]);

        let request =
            AnalysisRequest::new(selector(), "TSU", "VER", LapSelection::AllLaps).unwrap();
        let result = analyze(&mut provider, &request).unwrap();
        assert_eq!(result.fingerprint_a.cornering_mode, CorneringMode::WithinLap);
        assert_eq!(result.fingerprint_b.cornering_mode, CorneringMode::WithinLap);
        assert_eq!(result.fingerprint_b.analyzed_laps, 2);
        assert!(result.rows[2].delta.is_finite());
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let request =
            AnalysisRequest::new(selector(), "VER", "LEC", LapSelection::AllLaps).unwrap();
        let mut provider = provider();
        let first = serde_json::to_string(&analyze(&mut provider, &request).unwrap()).unwrap();
        let second = serde_json::to_string(&analyze(&mut provider, &request).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_driver_without_valid_laps() {
        let request =
            AnalysisRequest::new(selector(), "VER", "MSC", LapSelection::AllLaps).unwrap();
        assert!(matches!(
            analyze(&mut provider(), &request),
            Err(SignatureError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_unknown_driver_and_session() {
        let request =
            AnalysisRequest::new(selector(), "VER", "HAM", LapSelection::AllLaps).unwrap();
        assert!(matches!(
            analyze(&mut provider(), &request),
            Err(SignatureError::DataUnavailable { .. })
        ));

        let other_session =
            SessionSelector::new(2022, "Abu Dhabi Grand Prix", SessionType::Race).unwrap();
        let request =
            AnalysisRequest::new(other_session, "VER", "LEC", LapSelection::AllLaps).unwrap();
        assert!(matches!(
            analyze(&mut provider(), &request),
            Err(SignatureError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_request_validation() {
        assert!(matches!(
            AnalysisRequest::new(selector(), "VER", "VER", LapSelection::AllLaps),
            Err(SignatureError::InvalidUserInput { .. })
        ));
        assert!(AnalysisRequest::new(selector(), "", "VER", LapSelection::AllLaps).is_err());
    }
}
