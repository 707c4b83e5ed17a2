mod charts;
mod results_view;

use std::time::{SystemTime, UNIX_EPOCH};

use driver_signature::{
    AnalysisRequest, ComparisonResult, FileSessionProvider, LapSelection, SessionOverview,
    SessionProvider, SessionSelector, SessionType, analyze, config::AppConfig, load_session,
    session::FIRST_SEASON,
};
use egui::{Color32, Frame, Margin, RichText, Ui, Visuals, style::Widgets};
use egui_dropdown::DropDownBox;
use log::{error, info, warn};

pub(crate) const PALETTE_BLACK: Color32 = Color32::from_rgb(12, 12, 12);
pub(crate) const PALETTE_BROWN: Color32 = Color32::from_rgb(72, 30, 20);
pub(crate) const PALETTE_MAROON: Color32 = Color32::from_rgb(155, 57, 34);

pub(crate) const DRIVER_A_COLOR: Color32 = Color32::from_rgb(255, 107, 107);
pub(crate) const DRIVER_B_COLOR: Color32 = Color32::from_rgb(78, 205, 196);

const SECONDS_PER_YEAR: u64 = 31_556_952;

enum UiState {
    Idle,
    Error { message: String },
    Display { result: Box<ComparisonResult> },
}

/// Desktop front end: session selection on the left, comparison in the center.
///
/// Widget state only lives here until an action is triggered; every action builds an immutable
/// request from it and replaces the previous outcome wholesale.
pub(crate) struct SignatureApp {
    provider: FileSessionProvider,
    config: AppConfig,
    season: u16,
    events: Vec<String>,
    events_season: Option<u16>,
    schedule_message: Option<String>,
    selected_event: String,
    session_type: SessionType,
    lap_selection: LapSelection,
    overview: Option<SessionOverview>,
    driver_a: String,
    driver_b: String,
    status_message: Option<String>,
    ui_state: UiState,
}

impl SignatureApp {
    pub(crate) fn new(
        provider: FileSessionProvider,
        config: AppConfig,
        cc: &eframe::CreationContext<'_>,
    ) -> Self {
        let default_visuals = Visuals {
            dark_mode: true,
            hyperlink_color: PALETTE_MAROON,
            faint_bg_color: PALETTE_BLACK,
            extreme_bg_color: PALETTE_BROWN,
            panel_fill: PALETTE_BLACK,
            button_frame: true,
            window_fill: PALETTE_BLACK,
            widgets: Widgets::dark(),
            striped: true,
            ..Default::default()
        };
        cc.egui_ctx.set_visuals(default_visuals);

        Self {
            provider,
            season: config.default_season.clamp(FIRST_SEASON, current_season()),
            session_type: config.default_session_type,
            lap_selection: config.lap_selection,
            config,
            events: Vec::new(),
            events_season: None,
            schedule_message: None,
            selected_event: String::new(),
            overview: None,
            driver_a: String::new(),
            driver_b: String::new(),
            status_message: None,
            ui_state: UiState::Idle,
        }
    }

    fn refresh_events(&mut self) {
        if self.events_season == Some(self.season) {
            return;
        }
        self.events_season = Some(self.season);
        match self.provider.event_schedule(self.season) {
            Ok(events) => {
                self.schedule_message = events
                    .is_empty()
                    .then(|| format!("No cached events for {}", self.season));
                if !events.contains(&self.selected_event) {
                    self.selected_event = events.first().cloned().unwrap_or_default();
                }
                self.events = events;
            }
            Err(e) => {
                warn!("Failed to load season schedule: {}", e);
                self.events.clear();
                self.selected_event.clear();
                self.schedule_message = Some(format!("Failed to load season schedule: {}", e));
            }
        }
    }

    fn load_session_data(&mut self) {
        let loaded = SessionSelector::new(self.season, &self.selected_event, self.session_type)
            .and_then(|selector| load_session(&mut self.provider, &selector));
        match loaded {
            Ok(overview) => {
                self.driver_a = overview.drivers.first().cloned().unwrap_or_default();
                self.driver_b = overview
                    .drivers
                    .get(1)
                    .or(overview.drivers.first())
                    .cloned()
                    .unwrap_or_default();
                let selector = &overview.selector;
                self.status_message = Some(format!(
                    "✅ Loaded {} data for {} {}",
                    selector.session_type, selector.event, selector.season
                ));
                self.overview = Some(overview);
                self.ui_state = UiState::Idle;
            }
            Err(e) => {
                error!("Error loading session data: {}", e);
                self.overview = None;
                self.status_message = None;
                self.ui_state = UiState::Error {
                    message: format!("Error loading session data: {}", e),
                };
            }
        }
    }

    fn analyze_drivers(&mut self) {
        let Some(overview) = &self.overview else {
            return;
        };
        let analysis = AnalysisRequest::new(
            overview.selector.clone(),
            &self.driver_a,
            &self.driver_b,
            self.lap_selection,
        )
        .and_then(|request| analyze(&mut self.provider, &request));

        self.ui_state = match analysis {
            Ok(result) => UiState::Display {
                result: Box::new(result),
            },
            Err(e) => {
                error!("Analysis failed: {}", e);
                UiState::Error {
                    message: e.to_string(),
                }
            }
        };
    }

    fn change_data_dir(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_directory(self.provider.data_dir())
            .pick_folder()
        else {
            return;
        };
        match FileSessionProvider::new(path.clone()) {
            Ok(provider) => {
                info!("Switched session cache to {:?}", path);
                self.provider = provider;
                self.config.data_dir = path;
                self.events_season = None;
                self.overview = None;
                self.ui_state = UiState::Idle;
            }
            Err(e) => {
                self.ui_state = UiState::Error {
                    message: format!("Could not use {:?}: {}", path, e),
                }
            }
        }
    }

    fn show_session_selection(&mut self, ui: &mut Ui) {
        ui.heading("Session Selection");
        ui.add_space(4.);

        ui.label("Select Season");
        egui::ComboBox::from_id_salt("season_combo")
            .selected_text(self.season.to_string())
            .show_ui(ui, |ui| {
                for season in (FIRST_SEASON..=current_season()).rev() {
                    ui.selectable_value(&mut self.season, season, season.to_string());
                }
            });
        self.refresh_events();

        ui.label("Select Grand Prix");
        ui.add(
            DropDownBox::from_iter(
                self.events.iter().map(String::as_str),
                "event_dropbox",
                &mut self.selected_event,
                |ui, text| ui.selectable_label(false, text),
            )
            .filter_by_input(true),
        );
        if let Some(message) = &self.schedule_message {
            ui.label(RichText::new(message).color(Color32::YELLOW).small());
        }

        ui.label("Select Session");
        egui::ComboBox::from_id_salt("session_type_combo")
            .selected_text(self.session_type.display_name())
            .show_ui(ui, |ui| {
                for session_type in SessionType::ALL {
                    ui.selectable_value(
                        &mut self.session_type,
                        session_type,
                        session_type.display_name(),
                    );
                }
            });

        let mut fastest_only = self.lap_selection == LapSelection::FastestLap;
        if ui.checkbox(&mut fastest_only, "Fastest lap only").changed() {
            self.lap_selection = if fastest_only {
                LapSelection::FastestLap
            } else {
                LapSelection::AllLaps
            };
            self.config.lap_selection = self.lap_selection;
        }

        ui.add_space(4.);
        if ui.button("Load Session Data").clicked() {
            self.load_session_data();
        }
        if let Some(message) = &self.status_message {
            ui.label(RichText::new(message).color(Color32::LIGHT_GREEN).small());
        }
    }

    fn show_driver_selection(&mut self, ui: &mut Ui) {
        ui.heading("Driver Selection");
        let Some(overview) = &self.overview else {
            return;
        };
        let drivers = overview.drivers.clone();

        ui.horizontal(|ui| {
            for (label, selected) in [
                ("Driver 1", &mut self.driver_a),
                ("Driver 2", &mut self.driver_b),
            ] {
                ui.vertical(|ui| {
                    ui.label(label);
                    egui::ComboBox::from_id_salt(label)
                        .selected_text(selected.as_str())
                        .show_ui(ui, |ui| {
                            for driver in &drivers {
                                ui.selectable_value(selected, driver.clone(), driver);
                            }
                        });
                });
            }
        });

        ui.add_space(4.);
        if ui
            .button(RichText::new("🔍 Analyze Drivers").strong())
            .clicked()
        {
            self.analyze_drivers();
        }
    }

    /// Drops sessions held in memory and rereads the schedule, picking up newly cached files
    fn rescan_cache(&mut self) {
        info!("Rescanning session cache in {:?}", self.provider.data_dir());
        self.provider.clear_cache();
        self.events_season = None;
        self.overview = None;
        self.status_message = None;
        self.ui_state = UiState::Idle;
    }

    fn show_data_dir(&mut self, ui: &mut Ui) {
        ui.label(
            RichText::new(format!("Session cache: {}", self.provider.data_dir().display()))
                .small(),
        );
        ui.horizontal(|ui| {
            if ui.small_button("📂 Change…").clicked() {
                self.change_data_dir();
            }
            if ui.small_button("🔄 Rescan").clicked() {
                self.rescan_cache();
            }
        });
    }
}

impl eframe::App for SignatureApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.config.default_season = self.season;
        self.config.default_session_type = self.session_type;
        if let Err(e) = self.config.save() {
            error!("Error while saving config file: {}", e);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("SessionControls")
            .frame(
                Frame::default()
                    .fill(PALETTE_BLACK)
                    .inner_margin(Margin::same(8)),
            )
            .resizable(false)
            .min_width(240.)
            .show(ctx, |ui| {
                self.show_session_selection(ui);
                ui.separator();
                self.show_driver_selection(ui);
                ui.with_layout(egui::Layout::bottom_up(egui::Align::LEFT), |ui| {
                    self.show_data_dir(ui);
                });
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("🏎️ F1 Driver Signature Analysis & Performance Dissector");
                ui.separator();
                match &self.ui_state {
                    UiState::Idle if self.overview.is_none() => {
                        ui.label("👈 Please load session data first using the sidebar controls.");
                    }
                    UiState::Idle => {
                        ui.label("Pick two drivers and press Analyze Drivers.");
                    }
                    UiState::Error { message } => {
                        ui.label(RichText::new(message).color(Color32::RED));
                    }
                    UiState::Display { result } => {
                        results_view::show_comparison(ui, result);
                    }
                }
                results_view::show_footer(ui);
            });
        });
    }
}

/// Calendar year from the mean Gregorian year length. It can be off by a day around New Year,
/// which only shifts when the next season shows up in the picker.
fn current_season() -> u16 {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    u16::try_from(1970 + secs / SECONDS_PER_YEAR)
        .unwrap_or(u16::MAX)
        .max(FIRST_SEASON)
}
