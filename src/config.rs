//! Service configuration.
//!
//! Configuration can be loaded from:
//! 1. A TOML file
//! 2. Environment variables
//!
//! Environment variables override the file, and the file overrides the
//! defaults.
//!
//! # Example TOML Configuration
//!
//! ```toml
//! [canvas]
//! height = 12
//! width = 32
//!
//! [http]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [store]
//! backend = "sqlite"
//! path = "sketch.db"
//! ```
//!
//! # Environment Variables
//!
//! | Variable         | Overrides        |
//! |------------------|------------------|
//! | `CANVAS_HEIGHT`  | `canvas.height`  |
//! | `CANVAS_WIDTH`   | `canvas.width`   |
//! | `HOST`           | `http.host`      |
//! | `PORT`           | `http.port`      |
//! | `SKETCH_STORE`   | `store.backend`  |
//! | `SKETCH_DB_PATH` | `store.path`     |

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SketchConfig {
    /// Dimensions given to newly created canvases.
    pub canvas: CanvasConfig,
    /// HTTP listener.
    pub http: HttpConfig,
    /// Persistence.
    pub store: StoreConfig,
}

/// Dimensions for new canvases. Existing canvases keep the dimensions they
/// were created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Rows.
    pub height: u32,
    /// Columns.
    pub width: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            height: 12,
            width: 32,
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl HttpConfig {
    /// `host:port`, suitable for binding a listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which repository implementation to open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackendKind {
    /// Arena of canvases in process memory.
    #[default]
    Memory,
    /// Partitioned key-value store in process memory.
    Partitioned,
    /// SQLite database, one table per task kind.
    Sqlite,
}

impl FromStr for StoreBackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "partitioned" => Ok(Self::Partitioned),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(ConfigError::InvalidValue {
                key: "store.backend".to_string(),
                value: other.to_string(),
            }),
        }
    }
}

/// Persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Repository implementation.
    pub backend: StoreBackendKind,
    /// Database file for the SQLite backend. `None` opens an in-memory
    /// database.
    pub path: Option<PathBuf>,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file '{path}': {source}")]
    Io {
        /// Path to the configuration file.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The configuration file is not valid TOML for [`SketchConfig`].
    #[error("failed to parse config: {0}")]
    Parse(String),
    /// A setting holds a value that cannot be used.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Setting or environment variable name.
        key: String,
        /// Offending value.
        value: String,
    },
}

impl SketchConfig {
    /// Loads defaults, then `path` if given, then environment overrides.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Io`] / [`ConfigError::Parse`] for a bad file.
    /// - [`ConfigError::InvalidValue`] for an unparseable override.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Reads a TOML file without applying environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|source| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    /// Parses TOML content. Missing sections take their defaults.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CANVAS_HEIGHT") {
            self.canvas.height = parse_var("CANVAS_HEIGHT", &value)?;
        }
        if let Some(value) = lookup("CANVAS_WIDTH") {
            self.canvas.width = parse_var("CANVAS_WIDTH", &value)?;
        }
        if let Some(value) = lookup("HOST") {
            self.http.host = value;
        }
        if let Some(value) = lookup("PORT") {
            self.http.port = parse_var("PORT", &value)?;
        }
        if let Some(value) = lookup("SKETCH_STORE") {
            self.store.backend = value.parse()?;
        }
        if let Some(value) = lookup("SKETCH_DB_PATH") {
            self.store.path = Some(PathBuf::from(value));
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: name.to_string(),
        value: value.to_string(),
    })
}
