//! Service configuration via `finstrument.toml`
//!
//! Every field has a default, so an empty file (or no file at all) yields a
//! working configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;
use crate::Result;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "finstrument.toml";

/// Default number of (id, hash) pairs fetched per enumeration page
pub const DEFAULT_PAGE_SIZE: u64 = 4096;

/// What bulk enumeration does when a page fetch fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumerationFailure {
    /// Stop and return the executor error to the caller
    #[default]
    Propagate,
    /// Stop and report success, as if the last page had been reached
    EndOfStream,
}

/// Service configuration loaded from `finstrument.toml`.
///
/// # Example
///
/// ```toml
/// page_size = 4096
/// enumeration_failure = "propagate"
/// serialize_writes = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Entries fetched per enumeration page; must be positive
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Behaviour when an enumeration page fetch fails
    #[serde(default)]
    pub enumeration_failure: EnumerationFailure,
    /// Serialize writes and deletes of the same id within this process
    #[serde(default)]
    pub serialize_writes: bool,
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            enumeration_failure: EnumerationFailure::default(),
            serialize_writes: false,
        }
    }
}

impl ServiceConfig {
    /// Check field values
    ///
    /// # Errors
    ///
    /// Returns an error if `page_size` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config {
                reason: "page_size must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Financial instrument service configuration
#
# Number of (id, hash) pairs fetched per page during bulk enumeration.
page_size = 4096

# What enumeration does when a page fetch fails:
#   "propagate"     = stop and return the error (default)
#   "end_of_stream" = stop and report success (legacy behaviour)
enumeration_failure = "propagate"

# Serialize writes and deletes of the same id inside this process.
# Does not protect against other processes writing the same id.
serialize_writes = false
"#
    }

    /// Parse and validate config from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ServiceConfig = toml::from_str(content).map_err(|e| Error::Config {
            reason: format!("Failed to parse config: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::Config {
            reason: format!("Failed to read config file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config { reason } => Error::Config {
                reason: format!("{} ({})", reason, path.display()),
            },
            other => other,
        })
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| Error::Config {
                reason: format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ),
            })?;
        }
        Ok(())
    }
}
