//! Projects: named timer presets with accumulated statistics.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::timer::{Completion, TimerMode, TimerSettings};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub name: String,
    pub goals: String,
    pub custom_settings: TimerSettings,
    /// Credited seconds.
    pub total_time: u64,
    pub pomodoros_completed: u32,
}

impl Project {
    pub fn new(fields: ProjectFields) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: fields.name,
            goals: fields.goals,
            custom_settings: fields.settings,
            total_time: 0,
            pomodoros_completed: 0,
        }
    }

    pub fn credit(&mut self, completion: Completion) {
        self.total_time += u64::from(completion.credited);
        if completion.mode == TimerMode::Pomodoro {
            self.pomodoros_completed += 1;
        }
    }
}

/// Validated form contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectFields {
    pub name: String,
    pub goals: String,
    pub settings: TimerSettings,
}

/// Raw text of the project form, durations in minutes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub goals: String,
    pub pomodoro: String,
    pub short_break: String,
    pub long_break: String,
}

impl Default for ProjectDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            goals: String::new(),
            pomodoro: "25".into(),
            short_break: "5".into(),
            long_break: "15".into(),
        }
    }
}

impl ProjectDraft {
    /// Prefills the form for editing.
    pub fn from_project(project: &Project) -> Self {
        let s = &project.custom_settings;
        Self {
            name: project.name.clone(),
            goals: project.goals.clone(),
            pomodoro: (s.pomodoro / 60).to_string(),
            short_break: (s.short_break / 60).to_string(),
            long_break: (s.long_break / 60).to_string(),
        }
    }

    /// Checks every field, collecting all problems rather than stopping at
    /// the first.
    pub fn validate(&self) -> std::result::Result<ProjectFields, Vec<String>> {
        let mut errors = Vec::new();
        let name = self.name.trim();
        let goals = self.goals.trim();
        if name.is_empty() {
            errors.push("Project name is required".to_string());
        }
        if goals.is_empty() {
            errors.push("Project goals are required".to_string());
        }

        let pomodoro = minutes_in(&self.pomodoro, 120);
        if pomodoro.is_none() {
            errors.push("Pomodoro duration must be between 1 and 120 minutes".to_string());
        }
        let short_break = minutes_in(&self.short_break, 60);
        if short_break.is_none() {
            errors.push("Short break must be between 1 and 60 minutes".to_string());
        }
        let long_break = minutes_in(&self.long_break, 90);
        if long_break.is_none() {
            errors.push("Long break must be between 1 and 90 minutes".to_string());
        }

        match (pomodoro, short_break, long_break) {
            (Some(p), Some(s), Some(l)) if errors.is_empty() => Ok(ProjectFields {
                name: name.to_string(),
                goals: goals.to_string(),
                settings: TimerSettings::from_minutes(p, s, l),
            }),
            _ => Err(errors),
        }
    }
}

fn minutes_in(text: &str, max: u32) -> Option<u32> {
    text.trim()
        .parse::<u32>()
        .ok()
        .filter(|m| (1..=max).contains(m))
}

// ── Persistence ────────────────────────────────────────────────────

/// The stored project list. Always written whole.
#[derive(Debug, Clone)]
pub struct ProjectFile {
    path: PathBuf,
}

impl ProjectFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the list. A missing file is an empty list; a malformed one is
    /// logged and discarded.
    pub fn load(&self) -> Vec<Project> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "project file unreadable");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Vec<Project>>(&content) {
            Ok(projects) => {
                tracing::info!(count = projects.len(), "loaded projects");
                projects
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "discarding malformed project file");
                Vec::new()
            }
        }
    }

    pub fn save(&self, projects: &[Project]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(projects)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
