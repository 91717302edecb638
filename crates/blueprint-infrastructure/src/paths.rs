//! Path management for Blueprint configuration files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/blueprint/
//! ├── config.toml              # Application configuration
//! └── secret.json              # API keys
//! ```

use std::path::{Path, PathBuf};

use blueprint_core::{BlueprintError, Result};

/// Resolves where Blueprint keeps its files.
///
/// A base directory can be injected, which is how the tests avoid touching
/// the real home directory.
#[derive(Debug, Clone)]
pub struct BlueprintPaths {
    base: Option<PathBuf>,
}

impl BlueprintPaths {
    pub fn new(base: Option<&Path>) -> Self {
        Self {
            base: base.map(Path::to_path_buf),
        }
    }

    /// Returns the configuration directory (e.g. `~/.config/blueprint/`).
    pub fn config_dir(&self) -> Result<PathBuf> {
        if let Some(base) = &self.base {
            return Ok(base.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("blueprint"))
            .ok_or_else(|| BlueprintError::config("Cannot find configuration directory"))
    }

    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("config.toml"))
    }

    /// Path to secret.json. Keep it readable by the owner only.
    pub fn secret_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join("secret.json"))
    }
}

impl Default for BlueprintPaths {
    fn default() -> Self {
        Self::new(None)
    }
}
