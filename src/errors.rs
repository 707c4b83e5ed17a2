// Error types for driver-signature

use snafu::Snafu;
use std::io;

#[derive(Debug, Snafu)]
pub enum SignatureError {
    // Errors surfaced by the session provider or the metric extractor
    #[snafu(display("Session data unavailable: {reason}"))]
    DataUnavailable { reason: String },
    #[snafu(display("Cannot compare drivers from different sessions: {left} vs {right}"))]
    SessionMismatch { left: String, right: String },
    #[snafu(display("{metric} cannot be computed for {driver} from the available telemetry"))]
    MetricUndefined { metric: String, driver: String },
    #[snafu(display("{metric} was measured differently for {left} and {right}"))]
    IncomparableMetric {
        metric: String,
        left: String,
        right: String,
    },

    // User input validation errors
    #[snafu(display("Invalid user input: {field} - {reason}"))]
    InvalidUserInput { field: String, reason: String },

    // Session cache errors
    #[snafu(display("Error creating session cache directory"))]
    CacheDirError { source: io::Error },

    // Config management errors
    #[snafu(display("Could not find application data directory to save config file"))]
    NoConfigDir,
    #[snafu(display("Error writing config file"))]
    ConfigIOError { source: io::Error },
    #[snafu(display("Error serializing config file"))]
    ConfigSerializeError { source: serde_json::Error },

    // Errors while writing results
    #[snafu(display("Error serializing comparison result"))]
    OutputSerializeError { source: serde_json::Error },

    // Errors for the session cache writer
    #[snafu(display("Error writing session file"))]
    WriterError { source: io::Error },
}

impl SignatureError {
    pub(crate) fn data_unavailable(reason: impl Into<String>) -> Self {
        SignatureError::DataUnavailable {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SignatureError::InvalidUserInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
