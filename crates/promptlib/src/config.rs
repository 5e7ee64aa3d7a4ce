//! Storage location configuration.
//!
//! [`StorageConfig`] names where the two CSV files should live.
//! [`StorageConfig::resolve`] turns that into a usable directory, falling
//! back to the working directory when the preferred one cannot be created.
//! The fallback is not an error: the reason is kept on the returned
//! [`StorageLocation`] so a front end can show it.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

/// Directory name used under the platform data directory.
pub const APP_DIR_NAME: &str = "promptlib";

/// Where to keep the fragment library and prompt history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    /// Preferred directory. `None` means the platform data directory
    /// joined with [`APP_DIR_NAME`].
    pub data_dir: Option<PathBuf>,
    /// Used when the preferred directory cannot be created. Default: `"."`.
    pub fallback_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            fallback_dir: PathBuf::from("."),
        }
    }
}

/// A resolved, existing storage directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageLocation {
    pub dir: PathBuf,
    /// Why the preferred directory was not used, if it wasn't.
    pub fallback_reason: Option<String>,
}

impl StorageLocation {
    pub fn is_fallback(&self) -> bool {
        self.fallback_reason.is_some()
    }
}

impl StorageConfig {
    /// Use `dir` as the preferred directory.
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_fallback_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback_dir = dir.into();
        self
    }

    /// The directory that will be tried first, if one can be determined.
    pub fn preferred_dir(&self) -> Option<PathBuf> {
        self.data_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|d| d.join(APP_DIR_NAME)))
    }

    /// Create the preferred directory, or fall back.
    ///
    /// The fallback directory is returned as-is without being created; the
    /// first table write reports any problem with it.
    pub fn resolve(&self) -> StorageLocation {
        let Some(preferred) = self.preferred_dir() else {
            let reason = "no platform data directory is available".to_string();
            return self.fall_back(reason);
        };

        match ensure_dir(&preferred) {
            Ok(()) => {
                debug!("Using storage directory {}", preferred.display());
                StorageLocation {
                    dir: preferred,
                    fallback_reason: None,
                }
            }
            Err(e) => {
                let reason = format!("cannot use {}: {e}", preferred.display());
                self.fall_back(reason)
            }
        }
    }

    fn fall_back(&self, reason: String) -> StorageLocation {
        warn!(
            "Storage unavailable ({reason}); falling back to {}",
            self.fallback_dir.display()
        );
        StorageLocation {
            dir: self.fallback_dir.clone(),
            fallback_reason: Some(reason),
        }
    }
}

fn ensure_dir(dir: &Path) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    if !dir.is_dir() {
        return Err(std::io::Error::other("not a directory"));
    }
    Ok(())
}
