// Session provider backed by a local cache of JSON-lines session files

use std::{
    collections::HashMap,
    fs::{self, File},
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{debug, info, warn};

use crate::SignatureError;

use super::{
    SessionData, SessionProvider, SessionRecord, SessionSelector, writer::write_session,
};

const SESSION_FILE_EXTENSION: &str = "jsonl";

/// Reads sessions from `<data_dir>/<season>/<event_slug>/<session_slug>.jsonl`.
///
/// Sessions are kept in memory once loaded, so repeated comparisons on the same session only
/// touch the disk once.
pub struct FileSessionProvider {
    data_dir: PathBuf,
    cache: HashMap<SessionSelector, Rc<SessionData>>,
}

impl FileSessionProvider {
    pub fn new(data_dir: PathBuf) -> Result<Self, SignatureError> {
        // Ensure the cache directory exists
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir)
                .map_err(|e| SignatureError::CacheDirError { source: e })?;
        }

        Ok(Self {
            data_dir,
            cache: HashMap::new(),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Forget sessions held in memory so the next fetch reads the files again
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub fn session_path(&self, selector: &SessionSelector) -> PathBuf {
        self.data_dir
            .join(selector.season.to_string())
            .join(selector.event_slug())
            .join(format!(
                "{}.{}",
                selector.session_type.slug(),
                SESSION_FILE_EXTENSION
            ))
    }

    /// Saves a session to the cache directory, replacing any previous copy
    pub fn store_session(&mut self, session: &SessionData) -> Result<(), SignatureError> {
        let path = self.session_path(&session.selector);
        write_session(&path, session)?;
        self.cache
            .insert(session.selector.clone(), Rc::new(session.clone()));
        info!("Stored {} in {:?}", session.selector, path);
        Ok(())
    }

    fn load_from_file(&self, selector: &SessionSelector) -> Result<SessionData, SignatureError> {
        let path = self.session_path(selector);
        if !path.exists() {
            return Err(SignatureError::data_unavailable(format!(
                "no {} session cached for {} {}",
                selector.session_type, selector.season, selector.event
            )));
        }

        let records = serde_jsonlines::json_lines::<SessionRecord, _>(&path)
            .and_then(|lines| lines.collect::<Result<Vec<SessionRecord>, std::io::Error>>())
            .map_err(|e| {
                SignatureError::data_unavailable(format!("could not read {:?}: {}", path, e))
            })?;

        let mut records = records.into_iter();
        let mut session = match records.next() {
            Some(SessionRecord::Session(header)) if &header == selector => SessionData::new(header),
            Some(SessionRecord::Session(header)) => {
                return Err(SignatureError::data_unavailable(format!(
                    "{:?} holds {} instead of {}",
                    path, header, selector
                )));
            }
            _ => {
                return Err(SignatureError::data_unavailable(format!(
                    "{:?} is missing its session header",
                    path
                )));
            }
        };
        for record in records {
            match record {
                SessionRecord::Lap(lap) => session.push_lap(*lap),
                SessionRecord::Session(_) => {
                    warn!("Ignoring repeated session header in {:?}", path);
                }
            }
        }

        info!(
            "Loaded {:?}, found {} drivers with a total of {} laps",
            path,
            session.laps.len(),
            session.lap_count()
        );
        Ok(session)
    }

    /// Reads the event name from the header of the first session file in an event directory
    fn read_event_name(event_dir: &Path) -> Option<String> {
        let mut session_files: Vec<PathBuf> = fs::read_dir(event_dir)
            .ok()?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.extension()
                    .is_some_and(|ext| ext == SESSION_FILE_EXTENSION)
            })
            .collect();
        session_files.sort();

        for session_file in session_files {
            let mut first_line = String::new();
            let read = File::open(&session_file)
                .and_then(|f| BufReader::new(f).read_line(&mut first_line));
            if read.is_err() {
                continue;
            }
            match serde_json::from_str::<SessionRecord>(&first_line) {
                Ok(SessionRecord::Session(header)) => return Some(header.event),
                _ => debug!("No session header in {:?}", session_file),
            }
        }
        None
    }
}

impl SessionProvider for FileSessionProvider {
    fn event_schedule(&self, season: u16) -> Result<Vec<String>, SignatureError> {
        let season_dir = self.data_dir.join(season.to_string());
        let entries = fs::read_dir(&season_dir).map_err(|e| {
            SignatureError::data_unavailable(format!(
                "no sessions cached for season {}: {}",
                season, e
            ))
        })?;

        let mut event_dirs: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir())
            .collect();
        event_dirs.sort();

        let mut events = Vec::new();
        for event_dir in event_dirs {
            match Self::read_event_name(&event_dir) {
                Some(event) => events.push(event),
                None => warn!("Skipping {:?}, no readable session file", event_dir),
            }
        }
        debug!("Found {} cached events for season {}", events.len(), season);
        Ok(events)
    }

    fn fetch_session(
        &mut self,
        selector: &SessionSelector,
    ) -> Result<Rc<SessionData>, SignatureError> {
        if let Some(session) = self.cache.get(selector) {
            debug!("Serving {} from memory", selector);
            return Ok(Rc::clone(session));
        }

        let session = Rc::new(self.load_from_file(selector)?);
        self.cache.insert(selector.clone(), Rc::clone(&session));
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{LapRecord, SessionType, TelemetrySample};
    use std::io::Write;
    use tempfile::TempDir;

    fn sample_session(event: &str, session_type: SessionType) -> SessionData {
        let selector = SessionSelector::new(2023, event, session_type).unwrap();
        SessionData::from_laps(
            selector,
            ["VER", "HAM"].iter().map(|driver| LapRecord {
                lap_number: 3,
                driver: driver.to_string(),
                lap_time_s: Some(92.5),
                telemetry: vec![
                    TelemetrySample {
                        distance_m: 0.,
                        speed_kph: Some(280.),
                        ..Default::default()
                    },
                    TelemetrySample {
                        distance_m: 10.,
                        speed_kph: Some(281.),
                        ..Default::default()
                    },
                ],
            }),
        )
    }

    #[test]
    fn test_store_and_fetch_from_disk() {
        let temp_dir = TempDir::new().unwrap();
        let session = sample_session("Bahrain Grand Prix", SessionType::Race);
        {
            let mut provider = FileSessionProvider::new(temp_dir.path().to_path_buf()).unwrap();
            provider.store_session(&session).unwrap();
        }

        // A fresh provider has nothing in memory and reads the file
        let mut provider = FileSessionProvider::new(temp_dir.path().to_path_buf()).unwrap();
        let loaded = provider.fetch_session(&session.selector).unwrap();
        assert_eq!(loaded.selector, session.selector);
        assert_eq!(loaded.laps, session.laps);
        assert!(
            temp_dir
                .path()
                .join("2023")
                .join("bahrain_grand_prix")
                .join("race.jsonl")
                .exists()
        );
    }

    #[test]
    fn test_clear_cache_rereads_files() {
        let temp_dir = TempDir::new().unwrap();
        let mut provider = FileSessionProvider::new(temp_dir.path().to_path_buf()).unwrap();
        let session = sample_session("Dutch Grand Prix", SessionType::Race);
        provider.store_session(&session).unwrap();

        let first = provider.fetch_session(&session.selector).unwrap();
        assert!(Rc::ptr_eq(
            &first,
            &provider.fetch_session(&session.selector).unwrap()
        ));

        // the downloader replaces the file behind the provider's back
        let mut updated = session.clone();
        updated.laps.remove("HAM");
        write_session(&provider.session_path(&session.selector), &updated).unwrap();
        assert_eq!(
            provider.fetch_session(&session.selector).unwrap().drivers(),
            vec!["HAM".to_string(), "VER".to_string()]
        );

        provider.clear_cache();
        assert_eq!(
            provider.fetch_session(&session.selector).unwrap().drivers(),
            vec!["VER".to_string()]
        );
    }

    #[test]
    fn test_unusable_data_dir_is_cache_dir_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("sessions");
        File::create(&file).unwrap();
        assert!(matches!(
            FileSessionProvider::new(file.join("nested")),
            Err(SignatureError::CacheDirError { .. })
        ));
    }

    #[test]
    fn test_missing_session_is_data_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let mut provider = FileSessionProvider::new(temp_dir.path().to_path_buf()).unwrap();
        let selector =
            SessionSelector::new(2023, "Monaco Grand Prix", SessionType::Sprint).unwrap();
        match provider.fetch_session(&selector) {
            Err(SignatureError::DataUnavailable { reason }) => {
                assert!(reason.contains("Sprint"));
            }
            other => panic!("Expected DataUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_corrupted_file_is_data_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let provider_dir = temp_dir.path().to_path_buf();
        let mut provider = FileSessionProvider::new(provider_dir).unwrap();
        let selector = SessionSelector::new(2023, "Monaco Grand Prix", SessionType::Race).unwrap();
        let path = provider.session_path(&selector);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let mut file = File::create(&path).unwrap();
        writeln!(file, "not json").unwrap();

        assert!(matches!(
            provider.fetch_session(&selector),
            Err(SignatureError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_header_mismatch_is_data_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let mut provider = FileSessionProvider::new(temp_dir.path().to_path_buf()).unwrap();
        let session = sample_session("Monaco Grand Prix", SessionType::Race);
        let wrong_selector =
            SessionSelector::new(2023, "Monaco Grand Prix", SessionType::Qualifying).unwrap();
        write_session(&provider.session_path(&wrong_selector), &session).unwrap();

        assert!(matches!(
            provider.fetch_session(&wrong_selector),
            Err(SignatureError::DataUnavailable { .. })
        ));
    }

    #[test]
    fn test_event_schedule_lists_cached_events() {
        let temp_dir = TempDir::new().unwrap();
        let mut provider = FileSessionProvider::new(temp_dir.path().to_path_buf()).unwrap();
        provider
            .store_session(&sample_session("Monaco Grand Prix", SessionType::Race))
            .unwrap();
        provider
            .store_session(&sample_session("Monaco Grand Prix", SessionType::Qualifying))
            .unwrap();
        provider
            .store_session(&sample_session("Bahrain Grand Prix", SessionType::Race))
            .unwrap();

        assert_eq!(
            provider.event_schedule(2023).unwrap(),
            vec![
                "Bahrain Grand Prix".to_string(),
                "Monaco Grand Prix".to_string()
            ]
        );
        assert!(matches!(
            provider.event_schedule(2019),
            Err(SignatureError::DataUnavailable { .. })
        ));
    }
}
