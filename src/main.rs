mod ui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use driver_signature::{
    AnalysisRequest, FileSessionProvider, LapSelection, SessionProvider, SessionSelector,
    SessionType, SignatureError, analyze, comparison::report::render_text, config::AppConfig,
};
use egui::Vec2;
use log::{error, info};
use ui::SignatureApp;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// Session cache directory, overrides the one in the config file
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Open the comparison window
    Ui,
    /// List the cached events of a season
    Events {
        #[arg(short, long)]
        season: u16,
    },
    /// Compare two drivers and print the result
    Compare {
        #[arg(long)]
        season: u16,
        #[arg(long)]
        event: String,
        #[arg(long, value_parser = parse_session_type)]
        session: SessionType,
        #[arg(long)]
        driver_a: String,
        #[arg(long)]
        driver_b: String,
        /// Only analyze each driver's fastest valid lap
        #[arg(long)]
        fastest_lap: bool,
        /// Print the comparison as JSON instead of a text report
        #[arg(long)]
        json: bool,
    },
}

fn parse_session_type(value: &str) -> Result<SessionType, String> {
    value.parse().map_err(|e: SignatureError| e.to_string())
}

fn run_ui(provider: FileSessionProvider, config: AppConfig) -> Result<(), String> {
    let mut native_options = eframe::NativeOptions::default();
    native_options.viewport = native_options
        .viewport
        .with_inner_size(Vec2::new(1280., 860.))
        .with_min_inner_size(Vec2::new(900., 600.));

    eframe::run_native(
        "F1 Driver Signature",
        native_options,
        Box::new(|cc| Ok(Box::new(SignatureApp::new(provider, config, cc)))),
    )
    .map_err(|e| format!("could not start app: {}", e))
}

fn list_events(provider: &FileSessionProvider, season: u16) -> Result<(), SignatureError> {
    for event in provider.event_schedule(season)? {
        println!("{}", event);
    }
    Ok(())
}

fn compare(
    provider: &mut FileSessionProvider,
    selector: SessionSelector,
    driver_a: &str,
    driver_b: &str,
    lap_selection: LapSelection,
    json: bool,
) -> Result<(), SignatureError> {
    let request = AnalysisRequest::new(selector, driver_a, driver_b, lap_selection)?;
    let result = analyze(provider, &request)?;
    if json {
        let output = serde_json::to_string_pretty(&result)
            .map_err(|e| SignatureError::OutputSerializeError { source: e })?;
        println!("{}", output);
    } else {
        print!("{}", render_text(&result));
    }
    Ok(())
}

fn exit_with_error(message: impl std::fmt::Display) -> ! {
    error!("{}", message);
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

fn main() {
    #[cfg(debug_assertions)]
    colog::init();

    let cli = Args::parse();
    if let Err(e) = ctrlc::set_handler(move || {
        println!("Exiting...");
        std::process::exit(0);
    }) {
        error!("Could not set Ctrl-C handler: {}", e);
    }

    let mut config = AppConfig::from_local_file().unwrap_or_default();
    if let Some(data_dir) = &cli.data_dir {
        config.data_dir = data_dir.clone();
    }
    info!("Using session cache in {:?}", config.data_dir);
    let mut provider = FileSessionProvider::new(config.data_dir.clone())
        .unwrap_or_else(|e| exit_with_error(e));

    match cli.command.unwrap_or(Commands::Ui) {
        Commands::Ui => run_ui(provider, config).unwrap_or_else(|e| exit_with_error(e)),
        Commands::Events { season } => {
            list_events(&provider, season).unwrap_or_else(|e| exit_with_error(e))
        }
        Commands::Compare {
            season,
            event,
            session,
            driver_a,
            driver_b,
            fastest_lap,
            json,
        } => {
            let lap_selection = if fastest_lap {
                LapSelection::FastestLap
            } else {
                config.lap_selection
            };
            SessionSelector::new(season, &event, session)
                .and_then(|selector| {
                    compare(
                        &mut provider,
                        selector,
                        &driver_a,
                        &driver_b,
                        lap_selection,
                        json,
                    )
                })
                .unwrap_or_else(|e| exit_with_error(e))
        }
    }
}
