use directories::ProjectDirs;
use std::path::PathBuf;

pub const DATA_FILE_NAME: &str = "zenfocus_data.json";
const APP_NAME: &str = "zenfocus";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Backing file for the session record; relative to the working
    /// directory when no platform data dir can be resolved
    pub fn data_file() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.data_local_dir().join(DATA_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DATA_FILE_NAME))
    }

    pub fn config_file() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("zenfocus_config.json"))
    }

    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(PathBuf::from(home).join(".local").join("state").join(APP_NAME))
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().join("logs"))
        }
    }
}
