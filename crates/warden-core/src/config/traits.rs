//! Core trait for layered Warden configuration
//!
//! Layers apply in order: built-in defaults, file, environment, then
//! validation. A value that fails validation never reaches the protocol.

use crate::{Result, WardenError};
use std::path::Path;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "WARDEN_";

/// Configuration that can be loaded from a file and overlaid from the environment.
pub trait LayeredConfig: Clone + Default + Send + Sync + 'static {
    /// Parse configuration from TOML text
    fn from_toml_str(content: &str) -> Result<Self>;

    /// Apply `WARDEN_*` overrides from an explicit variable list
    fn merge_with_vars<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>;

    /// Validate the configuration
    fn validate(&self) -> Result<()>;

    /// Load configuration from a TOML file
    fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            let context = format!("Failed to read config file {}: {e}", path.display());
            WardenError::from(std::io::Error::new(e.kind(), context))
        })?;
        Self::from_toml_str(&content)
    }

    /// Apply `WARDEN_*` overrides from the process environment
    fn merge_with_env(&mut self) -> Result<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// File, then environment, then validation
    fn load(path: &Path) -> Result<Self> {
        let mut config = Self::load_from_file(path)?;
        config.merge_with_env()?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }
}

/// Parse an unsigned override value, naming the variable on failure.
pub(crate) fn parse_u64_var(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| WardenError::invalid(format!("{key}: expected unsigned integer ({e})")))
}
