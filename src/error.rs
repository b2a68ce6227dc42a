//! Error types for the tape calculator.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for calculator operations
pub type Result<T> = std::result::Result<T, TapeError>;

/// Errors that can occur while running the calculator.
///
/// None of these unwind past a single keystroke: device and configuration
/// errors are reported where they happen and the loop carries on.
#[derive(Error, Debug)]
pub enum TapeError {
    /// Terminal, script or settings file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Printer unreachable, write timed out, or disconnected mid-write
    #[error("Printer error: {0}")]
    Serial(#[from] serialport::Error),

    /// Significant digit count was not an integer in 0..=255
    #[error("Invalid number {0}")]
    InvalidDigits(String),

    /// Printer target entered as empty or whitespace
    #[error("Printer target must not be blank")]
    BlankPrinterTarget,

    /// Settings file exists but could not be parsed
    #[error("Invalid settings file {path}: {source}")]
    SettingsParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Settings could not be serialized for saving
    #[error("Could not serialize settings: {0}")]
    SettingsWrite(#[from] toml::ser::Error),

    /// A running total left the representable decimal range
    #[error("Arithmetic overflow, {0} ignored")]
    Overflow(String),
}
