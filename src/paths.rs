//! Filesystem locations.
//!
//! | Purpose | Linux default |
//! |---------|---------------|
//! | Config  | `~/.config/giftbox/` |
//! | Data    | `~/.local/share/giftbox/` |
//!
//! `GIFTBOX_CONFIG_DIR` and `GIFTBOX_DATA_DIR` override either root.

use std::path::PathBuf;

const APP_DIR: &str = "giftbox";

#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("GIFTBOX_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    dirs::config_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
}

#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("GIFTBOX_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::data_dir()
        .map(|d| d.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(".").join(APP_DIR))
}

/// `config_dir()/config.toml`.
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Stored project list (`data_dir()/projects.json`).
#[must_use]
pub fn projects_file() -> PathBuf {
    data_dir().join("projects.json")
}

/// Default poems directory (`data_dir()/poems/`).
#[must_use]
pub fn poems_dir() -> PathBuf {
    data_dir().join("poems")
}

#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}

/// Scratch directory for player IPC sockets.
#[must_use]
pub fn runtime_dir() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(APP_DIR)
}
