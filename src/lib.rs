// Driving-style fingerprints and two-driver comparisons over cached F1 sessions.
// The binary adds the CLI and the egui front end on top of this crate.

pub mod comparison;
pub mod config;
pub mod errors;
pub mod metrics;
pub mod pipeline;
pub mod session;

// Re-export commonly used types
pub use comparison::{ComparisonResult, assemble};
pub use errors::SignatureError;
pub use metrics::{CorneringMode, LapSelection, StyleFingerprint, StyleMetric};
pub use pipeline::{AnalysisRequest, SessionOverview, analyze, load_session};
pub use session::{
    FileSessionProvider, LapRecord, SessionData, SessionProvider, SessionSelector, SessionType,
    TelemetrySample,
};
