//! Configuration-related functionality for Quarry.

use std::{
    ffi::OsStr,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use eyre::{Result, WrapErr};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{Error, Palette};

/// The port the dashboard listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 8972;

/// Quarry configuration.
///
/// Built once at startup and shared read-only with every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// The SQLite database file queried by the reports.
    pub database: PathBuf,
    /// The address to bind the HTTP server to.
    pub host: String,
    pub port: u16,
    /// Enables verbose logging and reloads templates from disk on every
    /// render.
    pub debug: bool,
    /// Optional directory of `*.hbs` (and `tips.md`) overrides for the
    /// built-in page templates.
    pub templates_dir: Option<PathBuf>,
    /// Colours used for chart segments.
    pub palette: Palette,
    /// The page heading.
    pub title: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: PathBuf::from("cookies.db"),
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            debug: false,
            templates_dir: None,
            palette: Palette::default(),
            title: "SQL Generative Business Intelligence Report".to_string(),
        }
    }
}

/// The file formats from which configuration can be loaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Yaml,
}

impl FromStr for ConfigFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_ref() {
            "json" => Self::Json,
            "yaml" | "yml" => Self::Yaml,
            _ => return Err(Error::UnsupportedFileType(s.to_string())),
        })
    }
}

impl Config {
    /// Parses configuration from a string in the given format.
    pub fn load_as(fmt: ConfigFormat, content: &str) -> Result<Self, Error> {
        Ok(match fmt {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        })
    }

    /// Loads configuration from the given file, detecting its format from the
    /// file extension.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(OsStr::to_str)
            .ok_or_else(|| Error::CannotDetermineFileType(path.to_path_buf()))?;
        let fmt = ConfigFormat::from_str(ext)?;
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Io(format!("while trying to read from {}", path.display()), e))?;
        Self::load_as(fmt, &content)
    }

    /// Loads configuration from the given file if it exists, and falls back
    /// to the defaults if it does not.
    pub fn load_or_default<P: AsRef<Path>>(maybe_config_file: P) -> Result<Self> {
        let maybe_config_file = maybe_config_file.as_ref();
        debug!(
            "Attempting to load config file: {}",
            maybe_config_file.display()
        );
        if !maybe_config_file.exists() {
            debug!(
                "No such configuration file, using defaults: {}",
                maybe_config_file.display()
            );
            return Ok(Self::default());
        }
        let config_path = maybe_config_file.canonicalize()?;
        let config = Self::load_from_file(&config_path)
            .wrap_err_with(|| Error::FailedToLoadConfig(config_path.clone()))?;
        debug!("Loaded configuration from {}", config_path.display());
        Ok(config)
    }

    /// The `host:port` address to listen on.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
