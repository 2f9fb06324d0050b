//! The Home view engine: projects plus the live countdown session.

use std::time::{Duration, Instant};

use crate::project::{Project, ProjectDraft, ProjectFile};
use crate::ticker::Ticker;
use crate::timer::{Completion, Session, Tick, TimerMode, TimerSettings};

const TICK: Duration = Duration::from_secs(1);

pub struct FocusEngine {
    projects: Vec<Project>,
    active: Option<String>,
    session: Session,
    ticker: Ticker,
    file: Option<ProjectFile>,
    persist_error: Option<String>,
}

impl FocusEngine {
    /// Engine backed by `file`, read once here.
    pub fn open(file: ProjectFile) -> Self {
        let projects = file.load();
        Self::with_projects(projects, Some(file))
    }

    /// Engine that never touches disk.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::with_projects(Vec::new(), None)
    }

    fn with_projects(projects: Vec<Project>, file: Option<ProjectFile>) -> Self {
        Self {
            projects,
            active: None,
            session: Session::new(&TimerSettings::DEFAULT),
            ticker: Ticker::new(TICK),
            file,
            persist_error: None,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn active_project(&self) -> Option<&Project> {
        let id = self.active.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    /// Durations in force: the active project's, else the defaults.
    pub fn settings(&self) -> TimerSettings {
        self.active_project()
            .map(|p| p.custom_settings)
            .unwrap_or(TimerSettings::DEFAULT)
    }

    /// Credited seconds across every project.
    pub fn total_time(&self) -> u64 {
        self.projects.iter().map(|p| p.total_time).sum()
    }

    /// Last persistence failure, cleared on read.
    pub fn take_persist_error(&mut self) -> Option<String> {
        self.persist_error.take()
    }

    // ── Session ────────────────────────────────────────────────────

    pub fn change_mode(&mut self, mode: TimerMode) {
        let settings = self.settings();
        self.session.change_mode(mode, &settings);
        self.ticker.cancel();
        tracing::debug!(mode = mode.label(), "timer mode changed");
    }

    pub fn reset(&mut self) {
        let settings = self.settings();
        self.session.reset(&settings);
        self.ticker.cancel();
    }

    /// Start/pause. Returns whether the timer is now running.
    pub fn toggle(&mut self, now: Instant) -> bool {
        let running = self.session.toggle();
        if running {
            self.ticker.start(now);
        } else {
            self.ticker.cancel();
        }
        running
    }

    /// Stops the countdown without touching the credit snapshot.
    pub fn pause(&mut self) {
        if self.session.is_running() {
            self.session.toggle();
        }
        self.ticker.cancel();
    }

    /// Applies every elapsed second. Returns the completion, if one happened.
    pub fn poll(&mut self, now: Instant) -> Option<Completion> {
        for _ in 0..self.ticker.due(now) {
            match self.session.tick() {
                Tick::Completed(completion) => {
                    self.ticker.cancel();
                    self.complete(completion);
                    return Some(completion);
                }
                Tick::Counted => {}
                Tick::Idle => {
                    self.ticker.cancel();
                    break;
                }
            }
        }
        None
    }

    fn complete(&mut self, completion: Completion) {
        let Some(id) = self.active.clone() else {
            tracing::info!(mode = completion.mode.label(), "session completed without a project");
            return;
        };
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            project.credit(completion);
            tracing::info!(
                project = %project.name,
                credited = completion.credited,
                pomodoros = project.pomodoros_completed,
                "session completed"
            );
        }
        self.persist();
    }

    // ── Projects ───────────────────────────────────────────────────

    /// Makes `id` active and loads its durations. Unknown ids are ignored.
    pub fn select_project(&mut self, id: &str) -> bool {
        let Some(project) = self.projects.iter().find(|p| p.id == id) else {
            return false;
        };
        let settings = project.custom_settings;
        self.active = Some(id.to_string());
        self.session.reset(&settings);
        self.ticker.cancel();
        true
    }

    /// Validates and appends a project, which becomes active.
    pub fn create_project(&mut self, draft: &ProjectDraft) -> Result<String, Vec<String>> {
        let fields = draft.validate()?;
        let project = Project::new(fields);
        let id = project.id.clone();
        tracing::info!(project = %project.name, "project created");
        self.projects.push(project);
        self.persist();
        self.select_project(&id);
        Ok(id)
    }

    /// Replaces name, goals and durations; statistics are kept.
    pub fn update_project(&mut self, id: &str, draft: &ProjectDraft) -> Result<(), Vec<String>> {
        let fields = draft.validate()?;
        let Some(project) = self.projects.iter_mut().find(|p| p.id == id) else {
            return Err(vec!["Project no longer exists".to_string()]);
        };
        project.name = fields.name;
        project.goals = fields.goals;
        project.custom_settings = fields.settings;
        tracing::info!(project = %project.name, "project updated");
        self.persist();
        if self.active.as_deref() == Some(id) {
            self.reset();
        }
        Ok(())
    }

    /// Removes a project. Callers confirm with the user first.
    pub fn delete_project(&mut self, id: &str) -> bool {
        let before = self.projects.len();
        self.projects.retain(|p| p.id != id);
        if self.projects.len() == before {
            return false;
        }
        tracing::info!(id, "project deleted");
        self.persist();
        if self.active.as_deref() == Some(id) {
            self.active = None;
            // A running countdown carries on from the default duration.
            self.session.load_duration(&TimerSettings::DEFAULT);
        }
        true
    }

    fn persist(&mut self) {
        let Some(file) = &self.file else {
            return;
        };
        if let Err(e) = file.save(&self.projects) {
            tracing::error!(path = %file.path().display(), error = %e, "failed to save projects");
            self.persist_error = Some(format!("Could not save projects: {e}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(p: &str, s: &str, l: &str) -> ProjectDraft {
        ProjectDraft {
            name: "Garden".into(),
            goals: "plant tulips".into(),
            pomodoro: p.into(),
            short_break: s.into(),
            long_break: l.into(),
        }
    }

    fn run_seconds(engine: &mut FocusEngine, start: Instant, secs: u64) -> Option<Completion> {
        engine.poll(start + Duration::from_secs(secs))
    }

    #[test]
    fn create_activates_and_loads_durations() {
        let mut engine = FocusEngine::in_memory();
        let id = engine.create_project(&draft("40", "8", "20")).unwrap();
        assert_eq!(engine.active_project().map(|p| p.id.as_str()), Some(id.as_str()));
        assert_eq!(engine.session().time_left(), 40 * 60);
        assert!(!engine.session().is_running());
    }

    #[test]
    fn create_in_break_mode_uses_that_mode() {
        let mut engine = FocusEngine::in_memory();
        engine.change_mode(TimerMode::ShortBreak);
        engine.create_project(&draft("40", "8", "20")).unwrap();
        assert_eq!(engine.session().time_left(), 8 * 60);
    }

    #[test]
    fn every_valid_duration_is_accepted() {
        let mut engine = FocusEngine::in_memory();
        for (p, s, l) in [(1, 1, 1), (120, 60, 90), (25, 5, 15), (77, 33, 45)] {
            let id = engine
                .create_project(&draft(&p.to_string(), &s.to_string(), &l.to_string()))
                .unwrap();
            assert_eq!(engine.active_project().unwrap().id, id);
            assert_eq!(engine.session().time_left(), p * 60);
        }
        assert_eq!(engine.projects().len(), 4);
    }

    #[test]
    fn invalid_create_leaves_list_unchanged() {
        let mut engine = FocusEngine::in_memory();
        engine.create_project(&draft("25", "5", "15")).unwrap();
        for (p, s, l) in [("0", "5", "15"), ("121", "5", "15"), ("25", "61", "15"), ("25", "5", "91")] {
            assert!(engine.create_project(&draft(p, s, l)).is_err());
        }
        assert_eq!(engine.projects().len(), 1);
    }

    #[test]
    fn one_second_pomodoro_completes_on_next_tick() {
        let mut engine = FocusEngine::in_memory();
        engine.create_project(&draft("1", "1", "1")).unwrap();
        let start = Instant::now();
        engine.toggle(start);
        assert_eq!(run_seconds(&mut engine, start, 59), None);
        assert_eq!(engine.session().time_left(), 1);

        let completion = run_seconds(&mut engine, start, 60).unwrap();
        assert_eq!(completion.credited, 60);
        let project = engine.active_project().unwrap();
        assert_eq!(project.pomodoros_completed, 1);
        assert_eq!(project.total_time, 60);
        assert!(!engine.session().is_running());
        assert_eq!(run_seconds(&mut engine, start, 120), None);
    }

    #[test]
    fn break_completion_credits_time_only() {
        let mut engine = FocusEngine::in_memory();
        engine.create_project(&draft("1", "1", "1")).unwrap();
        engine.change_mode(TimerMode::LongBreak);
        let start = Instant::now();
        engine.toggle(start);
        run_seconds(&mut engine, start, 60).unwrap();
        let project = engine.active_project().unwrap();
        assert_eq!(project.pomodoros_completed, 0);
        assert_eq!(project.total_time, 60);
        assert_eq!(engine.total_time(), 60);
    }

    #[test]
    fn completion_without_project_credits_nobody() {
        let mut engine = FocusEngine::in_memory();
        engine.change_mode(TimerMode::ShortBreak);
        let start = Instant::now();
        engine.toggle(start);
        assert!(run_seconds(&mut engine, start, 300).is_some());
        assert_eq!(engine.total_time(), 0);
    }

    #[test]
    fn mode_switch_while_running_stops() {
        let mut engine = FocusEngine::in_memory();
        let start = Instant::now();
        engine.toggle(start);
        run_seconds(&mut engine, start, 10);
        engine.change_mode(TimerMode::LongBreak);
        assert!(!engine.session().is_running());
        assert_eq!(engine.session().time_left(), 15 * 60);
        assert_eq!(run_seconds(&mut engine, start, 30), None);
        assert_eq!(engine.session().time_left(), 15 * 60);

        engine.create_project(&draft("30", "6", "45")).unwrap();
        engine.toggle(start);
        engine.change_mode(TimerMode::Pomodoro);
        assert!(!engine.session().is_running());
        assert_eq!(engine.session().time_left(), 30 * 60);
    }

    #[test]
    fn deleting_active_project_restores_defaults() {
        let mut engine = FocusEngine::in_memory();
        let id = engine.create_project(&draft("50", "10", "30")).unwrap();
        engine.change_mode(TimerMode::ShortBreak);
        assert_eq!(engine.session().time_left(), 10 * 60);
        assert!(engine.delete_project(&id));
        assert!(engine.active_project().is_none());
        assert_eq!(engine.session().time_left(), 5 * 60);
        assert!(!engine.session().is_running());
        assert!(!engine.delete_project(&id));
    }

    #[test]
    fn deleting_active_project_keeps_countdown_running() {
        let mut engine = FocusEngine::in_memory();
        let id = engine.create_project(&draft("50", "10", "30")).unwrap();
        let start = Instant::now();
        engine.toggle(start);
        run_seconds(&mut engine, start, 5);
        assert_eq!(engine.session().time_left(), 50 * 60 - 5);

        assert!(engine.delete_project(&id));
        assert!(engine.session().is_running());
        assert_eq!(engine.session().time_left(), 25 * 60);
        run_seconds(&mut engine, start, 6);
        assert_eq!(engine.session().time_left(), 25 * 60 - 1);
    }

    #[test]
    fn deleting_other_project_keeps_session() {
        let mut engine = FocusEngine::in_memory();
        let first = engine.create_project(&draft("50", "10", "30")).unwrap();
        let second = engine.create_project(&draft("45", "10", "30")).unwrap();
        let start = Instant::now();
        engine.toggle(start);
        engine.delete_project(&first);
        assert_eq!(engine.active_project().unwrap().id, second);
        assert!(engine.session().is_running());
    }

    #[test]
    fn updating_active_project_reapplies_duration() {
        let mut engine = FocusEngine::in_memory();
        let id = engine.create_project(&draft("50", "10", "30")).unwrap();
        engine.toggle(Instant::now());
        engine.update_project(&id, &draft("20", "10", "30")).unwrap();
        assert_eq!(engine.session().time_left(), 20 * 60);
        assert!(!engine.session().is_running());
        assert!(engine.update_project(&id, &draft("20", "0", "30")).is_err());
        assert_eq!(engine.active_project().unwrap().custom_settings.short_break, 600);
    }

    #[test]
    fn select_switches_durations() {
        let mut engine = FocusEngine::in_memory();
        let a = engine.create_project(&draft("50", "10", "30")).unwrap();
        engine.create_project(&draft("20", "4", "12")).unwrap();
        assert_eq!(engine.session().time_left(), 20 * 60);
        assert!(engine.select_project(&a));
        assert_eq!(engine.session().time_left(), 50 * 60);
        assert!(!engine.select_project("missing"));
    }

    #[test]
    fn mutations_are_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("projects.json");
        let mut engine = FocusEngine::open(ProjectFile::new(&path));
        let id = engine.create_project(&draft("1", "1", "1")).unwrap();
        let start = Instant::now();
        engine.toggle(start);
        engine.poll(start + Duration::from_secs(60));

        let reloaded = FocusEngine::open(ProjectFile::new(&path));
        assert_eq!(reloaded.projects().len(), 1);
        assert_eq!(reloaded.projects()[0].pomodoros_completed, 1);
        assert!(reloaded.active_project().is_none());

        engine.delete_project(&id);
        assert!(FocusEngine::open(ProjectFile::new(&path)).projects().is_empty());
    }
}
