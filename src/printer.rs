//! Receipt printer sinks.
//!
//! The serial printer opens the device for every single emission and lets
//! the handle drop straight after, so an unplugged or stalled printer costs
//! at most one write timeout per line and never wedges the input loop.

use crate::error::Result;
use crate::settings::Settings;
use log::debug;
use std::io::{self, Write};
use std::time::Duration;

/// ESC/POS sequence that turns off the demo watermark, sent once at start-up.
pub const REMOVE_WATERMARK: [u8; 5] = [10, 29, 123, 119, 0];

/// ESC/POS sequence that feeds and cuts the paper.
pub const CUT_PAPER: [u8; 5] = [10, 29, 86, 66, 0];

/// A device that accepts tape lines and raw control sequences.
pub trait Printer {
    /// Writes one line of text followed by a newline.
    fn write_line(&mut self, line: &str) -> Result<()>;

    /// Writes a raw control sequence.
    fn write_raw(&mut self, bytes: &[u8]) -> Result<()>;

    /// Identifier of the device currently written to.
    fn target(&self) -> &str;

    /// Points subsequent writes at another device.
    fn retarget(&mut self, target: String);
}

/// Printer attached to a serial port.
#[derive(Debug, Clone)]
pub struct SerialPrinter {
    port: String,
    baud_rate: u32,
    timeout: Duration,
}

impl SerialPrinter {
    pub fn new(port: impl Into<String>, baud_rate: u32, timeout: Duration) -> Self {
        SerialPrinter {
            port: port.into(),
            baud_rate,
            timeout,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.port.clone(),
            settings.baud_rate,
            Duration::from_millis(settings.write_timeout_ms),
        )
    }

    /// Opens the port, writes `bytes`, and closes it again.
    fn emit(&self, bytes: &[u8]) -> Result<()> {
        let mut port = serialport::new(&self.port, self.baud_rate)
            .timeout(self.timeout)
            .open()?;
        port.write_all(bytes)?;
        port.flush()?;
        debug!("Wrote {} bytes to {}", bytes.len(), self.port);
        Ok(())
    }
}

impl Printer for SerialPrinter {
    fn write_line(&mut self, line: &str) -> Result<()> {
        let mut bytes = Vec::with_capacity(line.len() + 1);
        bytes.extend_from_slice(line.as_bytes());
        bytes.push(b'\n');
        self.emit(&bytes)
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.emit(bytes)
    }

    fn target(&self) -> &str {
        &self.port
    }

    fn retarget(&mut self, target: String) {
        self.port = target;
    }
}

/// One emission captured by [`MemoryPrinter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    Line(String),
    Raw(Vec<u8>),
}

/// In-memory printer that records everything sent to it.
///
/// Set `fail` to make every write return an I/O error, as an unplugged
/// printer would.
#[derive(Debug, Clone, Default)]
pub struct MemoryPrinter {
    pub target: String,
    pub emissions: Vec<Emission>,
    pub fail: bool,
}

impl MemoryPrinter {
    pub fn new() -> Self {
        MemoryPrinter::default()
    }

    /// Creates a printer whose every write fails.
    pub fn failing() -> Self {
        MemoryPrinter {
            fail: true,
            ..MemoryPrinter::default()
        }
    }

    /// Text lines printed so far, in order.
    pub fn lines(&self) -> Vec<&str> {
        self.emissions
            .iter()
            .filter_map(|e| match e {
                Emission::Line(line) => Some(line.as_str()),
                Emission::Raw(_) => None,
            })
            .collect()
    }

    /// Number of paper cuts sent.
    pub fn cuts(&self) -> usize {
        self.emissions
            .iter()
            .filter(|e| matches!(e, Emission::Raw(bytes) if bytes.as_slice() == CUT_PAPER))
            .count()
    }

    fn check(&self) -> Result<()> {
        if self.fail {
            return Err(io::Error::new(io::ErrorKind::NotConnected, "printer disconnected").into());
        }
        Ok(())
    }
}

impl Printer for MemoryPrinter {
    fn write_line(&mut self, line: &str) -> Result<()> {
        self.check()?;
        self.emissions.push(Emission::Line(line.to_string()));
        Ok(())
    }

    fn write_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.check()?;
        self.emissions.push(Emission::Raw(bytes.to_vec()));
        Ok(())
    }

    fn target(&self) -> &str {
        &self.target
    }

    fn retarget(&mut self, target: String) {
        self.target = target;
    }
}
