//! Runner configuration.
//!
//! Defaults reproduce the classic behavior: wait for a tool as long as it
//! takes and keep all of its output. A config file can bound both:
//!
//! ```toml
//! # ~/.config/codeval/config.toml
//! timeout_secs = 30
//! max_output_bytes = 1048576
//! ```

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::paths;

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// How the command runner treats external tools.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// Kill a tool that runs longer than this. `None` waits forever.
    pub timeout: Option<Duration>,
    /// Keep at most this many bytes of captured output. `None` keeps all.
    pub max_output_bytes: Option<usize>,
}

/// On-disk shape of the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    timeout_secs: Option<u64>,
    max_output_bytes: Option<usize>,
}

impl ValidatorConfig {
    /// No timeout, no output cap.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Builder-style timeout setter.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder-style output cap setter.
    pub fn with_max_output_bytes(mut self, max: Option<usize>) -> Self {
        self.max_output_bytes = max;
        self
    }

    /// Load from the user config file, or defaults when it does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&paths::config_file())
    }

    /// Load from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn parse(text: &str) -> Result<Self, toml::de::Error> {
        let file: ConfigFile = toml::from_str(text)?;
        Ok(Self {
            timeout: file.timeout_secs.map(Duration::from_secs),
            max_output_bytes: file.max_output_bytes,
        })
    }
}
