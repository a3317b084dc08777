//! Configuration loading.
//!
//! Values are layered with figment, later sources overriding earlier ones:
//! 1. Built-in defaults
//! 2. TOML file (`flightbook.toml` in the working directory unless `--config` is given)
//! 3. Environment variables prefixed with `FLIGHTBOOK_`, using `__` to nest
//!    (e.g. `FLIGHTBOOK_STORAGE__LEDGER_FORMAT=jsonl`)

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ServiceCatalog;
use crate::storage::LedgerFormat;

/// Config file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = "flightbook.toml";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "FLIGHTBOOK_";

const DEFAULT_FLIGHTS_FILE: &str = "Flights.txt";
const DEFAULT_BOOKINGS_FILE: &str = "BookedFlights.txt";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(Box<figment::Error>),

    #[error("configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("invalid configuration: {message}")]
    Validation { message: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Load(Box::new(err))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    /// Service menus. Loaded once and never changed while running.
    pub catalog: ServiceCatalog,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Flight inventory file.
    pub flights_file: PathBuf,
    /// Booking ledger file.
    pub bookings_file: PathBuf,
    pub ledger_format: LedgerFormat,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            flights_file: PathBuf::from(DEFAULT_FLIGHTS_FILE),
            bookings_file: PathBuf::from(DEFAULT_BOOKINGS_FILE),
            ledger_format: LedgerFormat::default(),
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// An explicitly given config file must exist; the default one is optional.
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_file = match config_path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::FileNotFound(path.to_path_buf()));
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config: Config = Self::figment(&config_file)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults layered with a TOML file, without environment overrides.
    pub fn figment(config_file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.flights_file.as_os_str().is_empty() {
            return Err(ConfigError::Validation {
                message: "storage.flights_file must not be empty".to_string(),
            });
        }
        if self.storage.bookings_file.as_os_str().is_empty() {
            return Err(ConfigError::Validation {
                message: "storage.bookings_file must not be empty".to_string(),
            });
        }
        if self.storage.flights_file == self.storage.bookings_file {
            return Err(ConfigError::Validation {
                message: "flights and bookings must be stored in different files".to_string(),
            });
        }

        self.catalog
            .validate()
            .map_err(|e| ConfigError::Validation {
                message: e.to_string(),
            })
    }
}
