//! Persisted printer connection settings.

use crate::error::{Result, TapeError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Printer connection parameters kept between runs.
///
/// Missing keys fall back to their defaults, so a settings file holding only
/// `port = "..."` is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Device identifier of the receipt printer.
    pub port: String,

    pub baud_rate: u32,

    /// Per-write timeout so a stalled printer cannot hang the loop.
    pub write_timeout_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            port: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            write_timeout_ms: 200,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, using defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings at {}, using defaults", path.display());
                return Ok(Settings::default());
            }
            Err(e) => return Err(e.into()),
        };

        toml::from_str(&text).map_err(|source| TapeError::SettingsParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes settings to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, text)?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    /// Default settings file location.
    ///
    /// `$XDG_CONFIG_HOME/tapecalc/settings.toml`, else
    /// `$HOME/.config/tapecalc/settings.toml`, else `./tapecalc.toml`.
    pub fn default_path() -> PathBuf {
        let config_home = env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                env::var_os("HOME")
                    .filter(|v| !v.is_empty())
                    .map(|home| PathBuf::from(home).join(".config"))
            });

        match config_home {
            Some(dir) => dir.join("tapecalc").join("settings.toml"),
            None => PathBuf::from("tapecalc.toml"),
        }
    }
}
