use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::theme::ThemeName;

const DEFAULT_CATALOG: &[&str] = &[
    "https://youtu.be/lSD_L-xic9o?list=RDlSD_L-xic9o",
    "https://youtu.be/1F3OGIFnW1k",
    "https://youtu.be/PEM0Vs8jf1w",
    "https://www.youtube.com/watch?v=60rLYaz9Q1w&pp=ygUHbG92ZSBtZQ%3D%3D",
    "https://youtu.be/dTS_aNfpbIM",
    "https://youtu.be/SkcO47UDzzY",
    "https://youtu.be/5r3B7yz6J68",
    "https://youtu.be/vGJTaP6anOU",
    "https://youtu.be/Bx27Kn6Ct9A",
    "https://www.youtube.com/watch?v=450p7goxZqg&pp=ygUJYWxsIG9mIG1l0gcJCSkKAYcqIYzv",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub theme: ThemeName,
    /// Video references resolved into the playlist at startup.
    pub catalog: Vec<String>,
    pub poems_dir: Option<PathBuf>,
    /// Looping background track; the fader only drives the meter without one.
    pub ambience_track: Option<PathBuf>,
    pub player_command: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: ThemeName::default(),
            catalog: DEFAULT_CATALOG.iter().map(|s| s.to_string()).collect(),
            poems_dir: None,
            ambience_track: None,
            player_command: "mpv".into(),
        }
    }
}

impl Config {
    /// Reads the config, falling back to defaults when the file is missing
    /// or unparsable.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config unreadable, using defaults");
                return Self::default();
            }
        };
        match Self::parse(&content) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "config invalid, using defaults");
                Self::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn poems_dir(&self) -> PathBuf {
        self.poems_dir
            .clone()
            .unwrap_or_else(crate::paths::poems_dir)
    }
}
