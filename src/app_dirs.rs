use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Directory receiving the log file; the terminal itself belongs to the UI
    pub fn log_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join("partizip"),
            )
        } else {
            ProjectDirs::from("", "", "partizip")
                .map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}
