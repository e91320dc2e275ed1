//! Directory names, file names and path helpers.
//!
//! Centralizes every hardcoded path used by the store and the configuration
//! discovery so they stay consistent.

use std::path::{Path, PathBuf};

/// Application directory name (hidden, like .git)
pub const PLACEMENT_DIR_NAME: &str = ".placement";

/// Configuration file name inside the application directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up in the working directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "placement.toml";

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "PLACEMENT_DATA_DIR";

/// Session storage names
pub mod session {
    /// Sessions directory name within the data directory
    pub const SESSIONS_DIR_NAME: &str = "sessions";

    /// Extension of stored session documents
    pub const SESSION_FILE_EXTENSION: &str = "json";

    /// Extension of in-flight writes before they are renamed into place
    pub const TEMP_FILE_EXTENSION: &str = "tmp";
}

/// Build the application directory path from a root
pub fn placement_dir_path(root: &Path) -> PathBuf {
    root.join(PLACEMENT_DIR_NAME)
}

/// Build the sessions directory path from a data directory
pub fn sessions_dir_path(data_dir: &Path) -> PathBuf {
    data_dir.join(session::SESSIONS_DIR_NAME)
}

/// Build a stored session file path
pub fn session_file_path(data_dir: &Path, session_id: &str) -> PathBuf {
    sessions_dir_path(data_dir).join(format!(
        "{}.{}",
        session_id,
        session::SESSION_FILE_EXTENSION
    ))
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    placement_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build config file path inside the current directory's application directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    placement_dir_path(current_dir).join(CONFIG_FILE_NAME)
}

/// Default data directory when none is configured
pub fn default_data_dir(current_dir: &Path) -> PathBuf {
    placement_dir_path(current_dir)
}
