use std::path::PathBuf;

use ap_core::app_dirs::AppDirs;
use ap_core::config::StorageConfig;
use ap_core::ports::{AppDirsError, AppDirsPort};

const APP_DIR_NAME: &str = "autopress";

/// Resolves the data directories from the platform defaults, overridden by
/// whatever the storage config pins.
///
/// # Platform-specific Paths
/// - macOS: ~/Library/Application Support/autopress
/// - Windows: %APPDATA%\autopress
/// - Linux: $XDG_DATA_HOME/autopress or ~/.local/share/autopress
///
/// Nothing is created here; the store decides when to touch the disk.
pub struct DirsAppDirs {
    data_dir: Option<PathBuf>,
    fallback_dir: Option<PathBuf>,
}

impl DirsAppDirs {
    pub fn new() -> Self {
        Self {
            data_dir: None,
            fallback_dir: None,
        }
    }

    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            data_dir: config.data_dir.clone(),
            fallback_dir: config.fallback_dir.clone(),
        }
    }
}

impl Default for DirsAppDirs {
    fn default() -> Self {
        Self::new()
    }
}

impl AppDirsPort for DirsAppDirs {
    fn get_app_dirs(&self) -> Result<AppDirs, AppDirsError> {
        let app_data_root = match &self.data_dir {
            Some(dir) => dir.clone(),
            None => platform_data_dir()?.join(APP_DIR_NAME),
        };
        let fallback_root = self
            .fallback_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join(APP_DIR_NAME));

        Ok(AppDirs {
            app_data_root,
            fallback_root,
        })
    }
}

fn platform_data_dir() -> Result<PathBuf, AppDirsError> {
    #[cfg(target_os = "linux")]
    {
        // XDG_DATA_HOME first, then ~/.local/share
        if let Some(xdg_data_home) = std::env::var_os("XDG_DATA_HOME") {
            return Ok(PathBuf::from(xdg_data_home));
        }
    }

    dirs::data_dir().ok_or(AppDirsError::DataDirUnavailable)
}
