// ABOUTME: XDG locations for the guanaco config file and rolling log files
// ABOUTME: Falls back to the working directory when no home directory is known

use directories::ProjectDirs;
use std::path::PathBuf;

const QUALIFIER: &str = "org";
const ORGANIZATION: &str = "guanaco";
const APPLICATION: &str = "guanaco";

pub fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
}

/// `~/.local/share/guanaco/` on Linux, `./data` without a home directory
pub fn data_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("./data"))
}

/// Daily rolling log files go here
pub fn log_dir() -> PathBuf {
    data_dir().join("logs")
}

/// `~/.config/guanaco/` on Linux, `.` without a home directory
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Last place searched for `config.toml`
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}
