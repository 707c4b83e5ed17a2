pub mod file_provider;
pub mod writer;

use std::{
    collections::BTreeMap,
    fmt,
    hash::{Hash, Hasher},
    rc::Rc,
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::SignatureError;

pub use file_provider::FileSessionProvider;

/// First season with telemetry available from the timing provider.
pub const FIRST_SEASON: u16 = 2018;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionType {
    Practice1,
    Practice2,
    Practice3,
    Qualifying,
    Sprint,
    Race,
}

impl SessionType {
    pub const ALL: [SessionType; 6] = [
        SessionType::Practice1,
        SessionType::Practice2,
        SessionType::Practice3,
        SessionType::Qualifying,
        SessionType::Sprint,
        SessionType::Race,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Practice1 => "Practice 1",
            Self::Practice2 => "Practice 2",
            Self::Practice3 => "Practice 3",
            Self::Qualifying => "Qualifying",
            Self::Sprint => "Sprint",
            Self::Race => "Race",
        }
    }

    /// File name stem used in the session cache
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Practice1 => "practice_1",
            Self::Practice2 => "practice_2",
            Self::Practice3 => "practice_3",
            Self::Qualifying => "qualifying",
            Self::Sprint => "sprint",
            Self::Race => "race",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for SessionType {
    type Err = SignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_name(s);
        SessionType::ALL
            .into_iter()
            .find(|t| t.slug() == normalized || normalize_name(t.display_name()) == normalized)
            .or(match normalized.as_str() {
                "fp1" => Some(SessionType::Practice1),
                "fp2" => Some(SessionType::Practice2),
                "fp3" => Some(SessionType::Practice3),
                "q" => Some(SessionType::Qualifying),
                "r" => Some(SessionType::Race),
                _ => None,
            })
            .ok_or_else(|| {
                SignatureError::invalid_input("session type", format!("unknown session '{}'", s))
            })
    }
}

/// Lowercase a name and replace everything that is not alphanumeric with `_`
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

/// Identifies one session: season, event and session type.
///
/// Event names are compared through their normalized slug, so "Monaco Grand Prix" and
/// "monaco grand prix" select the same session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSelector {
    pub season: u16,
    pub event: String,
    pub session_type: SessionType,
}

impl SessionSelector {
    pub fn new(
        season: u16,
        event: &str,
        session_type: SessionType,
    ) -> Result<Self, SignatureError> {
        if season < FIRST_SEASON {
            return Err(SignatureError::invalid_input(
                "season",
                format!("telemetry is only available from {} onwards", FIRST_SEASON),
            ));
        }
        let event = event.trim();
        if event.is_empty() {
            return Err(SignatureError::invalid_input(
                "event",
                "event name cannot be empty",
            ));
        }
        Ok(Self {
            season,
            event: event.to_string(),
            session_type,
        })
    }

    pub fn event_slug(&self) -> String {
        normalize_name(&self.event)
    }
}

impl PartialEq for SessionSelector {
    fn eq(&self, other: &Self) -> bool {
        self.season == other.season
            && self.session_type == other.session_type
            && self.event_slug() == other.event_slug()
    }
}

impl Eq for SessionSelector {}

impl Hash for SessionSelector {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.season.hash(state);
        self.event_slug().hash(state);
        self.session_type.hash(state);
    }
}

impl fmt::Display for SessionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} - {}", self.season, self.event, self.session_type)
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct TelemetrySample {
    /// Meters traveled from the start of the lap
    pub distance_m: f64,
    /// Seconds since the start of the lap
    pub time_s: Option<f64>,
    pub speed_kph: Option<f64>,
    /// Throttle use. 0=off throttle to 100=full throttle
    pub throttle_pct: Option<f64>,
    /// Brake use. 0=released to 1=max pedal force, on/off channels report 0 or 1
    pub brake: Option<f64>,
    pub gear: Option<u8>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LapRecord {
    pub lap_number: u32,
    pub driver: String,
    /// Missing for in/out laps and laps deleted by the timing provider
    pub lap_time_s: Option<f64>,
    pub telemetry: Vec<TelemetrySample>,
}

/// All laps of a session, keyed by driver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionData {
    pub selector: SessionSelector,
    pub laps: BTreeMap<String, Vec<LapRecord>>,
}

impl SessionData {
    pub fn new(selector: SessionSelector) -> Self {
        Self {
            selector,
            laps: BTreeMap::new(),
        }
    }

    /// Builds the session from a flat list of laps, grouping them by driver
    pub fn from_laps(selector: SessionSelector, laps: impl IntoIterator<Item = LapRecord>) -> Self {
        let mut session = Self::new(selector);
        for lap in laps {
            session.push_lap(lap);
        }
        session
    }

    pub fn push_lap(&mut self, lap: LapRecord) {
        self.laps.entry(lap.driver.clone()).or_default().push(lap);
    }

    /// Driver identifiers in sorted order
    pub fn drivers(&self) -> Vec<String> {
        self.laps.keys().cloned().collect()
    }

    pub fn driver_laps(&self, driver: &str) -> Result<&[LapRecord], SignatureError> {
        self.laps
            .get(driver)
            .filter(|laps| !laps.is_empty())
            .map(|laps| laps.as_slice())
            .ok_or_else(|| {
                SignatureError::data_unavailable(format!(
                    "no laps for driver {} in {}",
                    driver, self.selector
                ))
            })
    }

    pub fn lap_count(&self) -> usize {
        self.laps.values().map(Vec::len).sum()
    }
}

/// One line of a cached session file. The first line of a file is always a `Session` header.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum SessionRecord {
    Session(SessionSelector),
    Lap(Box<LapRecord>),
}

/// Narrow interface to the timing data provider.
pub trait SessionProvider {
    /// Names of the events of a season the provider can serve
    fn event_schedule(&self, season: u16) -> Result<Vec<String>, SignatureError>;

    /// Fetch every lap of a session. Failures are reported as `DataUnavailable`.
    fn fetch_session(
        &mut self,
        selector: &SessionSelector,
    ) -> Result<Rc<SessionData>, SignatureError>;
}

/// Provider serving sessions held in memory, used for synthetic fixtures
#[derive(Default, Debug)]
pub struct StaticSessionProvider {
    sessions: Vec<Rc<SessionData>>,
}

impl StaticSessionProvider {
    pub fn new(sessions: Vec<SessionData>) -> Self {
        Self {
            sessions: sessions.into_iter().map(Rc::new).collect(),
        }
    }
}

impl SessionProvider for StaticSessionProvider {
    fn event_schedule(&self, season: u16) -> Result<Vec<String>, SignatureError> {
        let mut events: Vec<String> = Vec::new();
        for session in self.sessions.iter().filter(|s| s.selector.season == season) {
            if !events
                .iter()
                .any(|e| normalize_name(e) == session.selector.event_slug())
            {
                events.push(session.selector.event.clone());
            }
        }
        Ok(events)
    }

    fn fetch_session(
        &mut self,
        selector: &SessionSelector,
    ) -> Result<Rc<SessionData>, SignatureError> {
        self.sessions
            .iter()
            .find(|s| &s.selector == selector)
            .cloned()
            .ok_or_else(|| SignatureError::data_unavailable(format!("no session {}", selector)))
    }
}
