use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use tokio::sync::mpsc::UnboundedSender;

use crate::affirmations::{self, Affirmation};
use crate::ambience::Ambience;
use crate::config::Config;
use crate::focus::FocusEngine;
use crate::format::{format_clock, format_time};
use crate::playback::catalog::{spawn_add, CatalogMessage};
use crate::playback::lookup::VideoLookup;
use crate::playback::widget::WidgetEvent;
use crate::playback::PlaybackEngine;
use crate::poems::Poem;
use crate::project::ProjectDraft;
use crate::theme::{Theme, ThemeName};
use crate::ticker::Delay;
use crate::timer::TimerMode;

const STATUS_TTL: Duration = Duration::from_secs(5);
const GOODBYE_REVEAL: Duration = Duration::from_millis(500);
const SEEK_STEP: f64 = 10.0;
const SCROLL_STEP: isize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Home,
    Playlist,
    Poems,
    Affirmations,
    Goodbye,
}

impl View {
    pub const ALL: [View; 5] = [
        Self::Home,
        Self::Playlist,
        Self::Poems,
        Self::Affirmations,
        Self::Goodbye,
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::Home => "Home",
            Self::Playlist => "Playlist",
            Self::Poems => "Poems",
            Self::Affirmations => "Affirmations",
            Self::Goodbye => "Goodbye",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// `1`..`5` on the dock.
    fn from_digit(c: char) -> Option<Self> {
        let n = c.to_digit(10)? as usize;
        Self::ALL.get(n.checked_sub(1)?).copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FormField {
    Name,
    Goals,
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl FormField {
    pub const ALL: [FormField; 5] = [
        Self::Name,
        Self::Goals,
        Self::Pomodoro,
        Self::ShortBreak,
        Self::LongBreak,
    ];

    pub fn label(&self) -> &str {
        match self {
            Self::Name => "Name",
            Self::Goals => "Goals",
            Self::Pomodoro => "Pomodoro (min)",
            Self::ShortBreak => "Short break (min)",
            Self::LongBreak => "Long break (min)",
        }
    }

    fn next(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    fn prev(&self) -> Self {
        let i = Self::ALL.iter().position(|f| f == self).unwrap_or(0);
        Self::ALL[(i + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// The create/edit project overlay.
pub struct ProjectForm {
    /// Id of the project being edited; `None` when creating.
    pub editing: Option<String>,
    pub draft: ProjectDraft,
    pub field: FormField,
    pub errors: Vec<String>,
}

impl ProjectForm {
    pub fn value(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.draft.name,
            FormField::Goals => &self.draft.goals,
            FormField::Pomodoro => &self.draft.pomodoro,
            FormField::ShortBreak => &self.draft.short_break,
            FormField::LongBreak => &self.draft.long_break,
        }
    }

    fn value_mut(&mut self) -> &mut String {
        match self.field {
            FormField::Name => &mut self.draft.name,
            FormField::Goals => &mut self.draft.goals,
            FormField::Pomodoro => &mut self.draft.pomodoro,
            FormField::ShortBreak => &mut self.draft.short_break,
            FormField::LongBreak => &mut self.draft.long_break,
        }
    }
}

/// Engines and channels the app drives.
pub struct Services {
    pub focus: FocusEngine,
    pub playback: PlaybackEngine,
    pub ambience: Ambience,
    pub lookup: Arc<dyn VideoLookup>,
    pub catalog_tx: UnboundedSender<CatalogMessage>,
}

pub struct App {
    pub config: Config,
    config_path: PathBuf,
    pub theme_name: ThemeName,
    pub theme: Theme,
    pub view: View,
    pub focus: FocusEngine,
    pub playback: PlaybackEngine,
    pub ambience: Ambience,
    lookup: Arc<dyn VideoLookup>,
    catalog_tx: UnboundedSender<CatalogMessage>,
    pub poems: Vec<Poem>,
    pub affirmation: &'static Affirmation,
    pub project_list_state: ListState,
    pub song_list_state: ListState,
    pub poem_list_state: ListState,
    pub open_poem: Option<usize>,
    pub poem_scroll: u16,
    pub form: Option<ProjectForm>,
    /// Project awaiting a y/n delete confirmation.
    pub confirm_delete: Option<String>,
    /// Text typed into the add-song prompt.
    pub add_song: Option<String>,
    pub pending_adds: usize,
    goodbye: Delay,
    pub goodbye_revealed: bool,
    pub show_help: bool,
    pub should_quit: bool,
    pub status: String,
    status_time: Instant,
    pub progress_bar_area: Option<Rect>,
}

impl App {
    pub fn new(config: Config, config_path: PathBuf, services: Services, poems: Vec<Poem>) -> Self {
        let theme_name = config.theme;
        let mut poem_list_state = ListState::default();
        if !poems.is_empty() {
            poem_list_state.select(Some(0));
        }
        let mut project_list_state = ListState::default();
        if !services.focus.projects().is_empty() {
            project_list_state.select(Some(0));
        }
        Self {
            config,
            config_path,
            theme_name,
            theme: theme_name.theme(),
            view: View::Home,
            focus: services.focus,
            playback: services.playback,
            ambience: services.ambience,
            lookup: services.lookup,
            catalog_tx: services.catalog_tx,
            poems,
            affirmation: affirmations::today(),
            project_list_state,
            song_list_state: ListState::default(),
            poem_list_state,
            open_poem: None,
            poem_scroll: 0,
            form: None,
            confirm_delete: None,
            add_song: None,
            pending_adds: 0,
            goodbye: Delay::default(),
            goodbye_revealed: false,
            show_help: false,
            should_quit: false,
            status: "Loading songs...".into(),
            status_time: Instant::now(),
            progress_bar_area: None,
        }
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.status = msg.into();
        self.status_time = Instant::now();
    }

    /// Advances every ticker the current state has armed.
    pub fn tick(&mut self, now: Instant) {
        if let Some(completion) = self.focus.poll(now) {
            let msg = match self.focus.active_project() {
                Some(p) => format!(
                    "{} complete, {} credited to {}",
                    completion.mode.label(),
                    format_clock(completion.credited),
                    p.name
                ),
                None => format!("{} complete", completion.mode.label()),
            };
            self.set_status(msg);
        }
        if let Some(err) = self.focus.take_persist_error() {
            self.set_status(err);
        }
        self.playback.poll(now);
        self.ambience.poll(now);
        if self.goodbye.fired(now) {
            self.goodbye_revealed = true;
        }
        if now.duration_since(self.status_time) > STATUS_TTL && self.status != "Ready" {
            self.status = "Ready".into();
        }
    }

    pub fn on_widget_event(&mut self, event: WidgetEvent, now: Instant) {
        let before = self.playback.current_index();
        if let Some(msg) = self.playback.handle_event(event, now) {
            self.set_status(msg);
        }
        if self.playback.current_index() != before {
            sync_song_selection(self);
        }
    }

    pub fn on_catalog(&mut self, msg: CatalogMessage) {
        match msg {
            CatalogMessage::Loaded(load) => {
                let loaded = load.songs.len();
                let skipped = load.failures.len();
                self.playback.set_catalog(load.songs);
                if loaded > 0 && self.song_list_state.selected().is_none() {
                    self.song_list_state.select(Some(0));
                }
                if skipped > 0 {
                    self.set_status(format!(
                        "Loaded {loaded} songs, skipped {skipped} that could not be found"
                    ));
                } else {
                    self.set_status(format!("Loaded {loaded} songs"));
                }
            }
            CatalogMessage::Added(song) => {
                self.pending_adds = self.pending_adds.saturating_sub(1);
                let title = song.title.clone();
                self.playback.append(song);
                if self.song_list_state.selected().is_none() {
                    self.song_list_state.select(Some(0));
                }
                self.set_status(format!("Added {title}"));
            }
            CatalogMessage::AddFailed { reference, reason } => {
                self.pending_adds = self.pending_adds.saturating_sub(1);
                self.set_status(format!("Could not add {reference}: {reason}"));
            }
        }
    }

    pub fn navigate(&mut self, to: View, now: Instant) {
        let from = self.view;
        if from == to {
            return;
        }
        match from {
            View::Home => self.focus.pause(),
            View::Playlist => self.playback.pause(),
            View::Goodbye => {
                self.goodbye.cancel();
                self.goodbye_revealed = false;
            }
            View::Poems => {
                self.open_poem = None;
            }
            View::Affirmations => {}
        }
        match to {
            View::Goodbye => {
                self.goodbye_revealed = false;
                self.goodbye.arm(now, GOODBYE_REVEAL);
            }
            View::Affirmations => self.affirmation = affirmations::today(),
            _ => {}
        }
        self.ambience
            .navigate(from == View::Playlist, to == View::Playlist, now);
        self.progress_bar_area = None;
        self.view = to;
        tracing::debug!(from = from.label(), to = to.label(), "view changed");
    }

    fn cycle_theme(&mut self) {
        self.theme_name = self.theme_name.next();
        self.theme = self.theme_name.theme();
        self.config.theme = self.theme_name;
        match self.config.save(&self.config_path) {
            Ok(()) => self.set_status(format!("Theme: {}", self.theme_name.label())),
            Err(e) => {
                tracing::warn!(error = %e, "failed to save config");
                self.set_status(format!("Theme: {} (not saved: {e})", self.theme_name.label()));
            }
        }
    }

    fn selected_project_id(&self) -> Option<String> {
        let idx = self.project_list_state.selected()?;
        self.focus.projects().get(idx).map(|p| p.id.clone())
    }

    fn active_list(&mut self) -> Option<(&mut ListState, usize)> {
        match self.view {
            View::Home => Some((&mut self.project_list_state, self.focus.projects().len())),
            View::Playlist => Some((&mut self.song_list_state, self.playback.queue().len())),
            View::Poems => Some((&mut self.poem_list_state, self.poems.len())),
            _ => None,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let Some((state, len)) = self.active_list() else {
            return;
        };
        if len == 0 {
            state.select(None);
            return;
        }
        let sel = state.selected().unwrap_or(0) as isize;
        let target = (sel + delta).clamp(0, len as isize - 1);
        state.select(Some(target as usize));
    }

    fn select_edge(&mut self, last: bool) {
        let Some((state, len)) = self.active_list() else {
            return;
        };
        if len > 0 {
            state.select(Some(if last { len - 1 } else { 0 }));
        }
    }

    fn seek_by(&mut self, delta: f64) {
        let duration = self.playback.duration();
        if duration <= 0.0 {
            return;
        }
        let ratio = (self.playback.current_time() + delta) / duration;
        if let Some(target) = self.playback.seek_fraction(ratio) {
            self.set_status(format!("Seek to {}", format_time(target)));
        }
    }

    pub fn shutdown(&mut self) {
        self.focus.pause();
        self.playback.shutdown();
        self.ambience.shutdown();
    }
}

// ── Event handling ─────────────────────────────────────────────────

pub fn handle_key(app: &mut App, key: KeyEvent, now: Instant) {
    // Ctrl+C always quits, whatever is open
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    if app.form.is_some() {
        handle_form_key(app, key);
        return;
    }
    if app.add_song.is_some() {
        handle_add_song_key(app, key);
        return;
    }
    if let Some(id) = app.confirm_delete.take() {
        handle_confirm_key(app, key, id);
        return;
    }
    if app.open_poem.is_some() {
        handle_poem_key(app, key);
        return;
    }
    if app.show_help && key.code != KeyCode::Char('?') {
        app.show_help = false;
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => app.should_quit = true,
        KeyCode::Char('?') => app.show_help = !app.show_help,
        KeyCode::Char('t') | KeyCode::Char('T') => app.cycle_theme(),
        KeyCode::Char('m') | KeyCode::Char('M') => {
            let muted = app.ambience.toggle_mute(now);
            app.set_status(if muted { "Ambience muted" } else { "Ambience on" });
        }
        KeyCode::Tab => app.navigate(app.view.next(), now),
        KeyCode::BackTab => app.navigate(app.view.prev(), now),
        KeyCode::Char(c @ '1'..='5') => {
            if let Some(view) = View::from_digit(c) {
                app.navigate(view, now);
            }
        }
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::PageDown => app.move_selection(10),
        KeyCode::PageUp => app.move_selection(-10),
        KeyCode::Char('g') | KeyCode::Home => app.select_edge(false),
        KeyCode::Char('G') | KeyCode::End => app.select_edge(true),
        _ => match app.view {
            View::Home => handle_home_key(app, key, now),
            View::Playlist => handle_playlist_key(app, key, now),
            View::Poems => handle_poems_key(app, key),
            View::Affirmations | View::Goodbye => {}
        },
    }
}

fn handle_home_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char(' ') => {
            if app.focus.toggle(now) {
                app.set_status(format!("{} started", app.focus.session().mode().label()));
            } else {
                app.set_status("Timer paused");
            }
        }
        KeyCode::Char('r') | KeyCode::Char('R') => {
            app.focus.reset();
            app.set_status("Timer reset");
        }
        KeyCode::Char('w') => app.focus.change_mode(TimerMode::Pomodoro),
        KeyCode::Char('s') => app.focus.change_mode(TimerMode::ShortBreak),
        KeyCode::Char('l') => app.focus.change_mode(TimerMode::LongBreak),
        KeyCode::Enter => {
            if let Some(id) = app.selected_project_id() {
                if app.focus.select_project(&id) {
                    if let Some(p) = app.focus.active_project() {
                        let msg = format!("Working on {}", p.name);
                        app.set_status(msg);
                    }
                }
            }
        }
        KeyCode::Char('a') | KeyCode::Char('A') => {
            app.form = Some(ProjectForm {
                editing: None,
                draft: ProjectDraft::default(),
                field: FormField::Name,
                errors: Vec::new(),
            });
        }
        KeyCode::Char('e') | KeyCode::Char('E') => {
            let Some(id) = app.selected_project_id() else {
                return;
            };
            if let Some(project) = app.focus.projects().iter().find(|p| p.id == id) {
                app.form = Some(ProjectForm {
                    editing: Some(id.clone()),
                    draft: ProjectDraft::from_project(project),
                    field: FormField::Name,
                    errors: Vec::new(),
                });
            }
        }
        KeyCode::Char('d') | KeyCode::Char('D') => {
            app.confirm_delete = app.selected_project_id();
        }
        _ => {}
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) {
    let Some(form) = app.form.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.form = None,
        KeyCode::Tab | KeyCode::Down => form.field = form.field.next(),
        KeyCode::BackTab | KeyCode::Up => form.field = form.field.prev(),
        KeyCode::Backspace => {
            form.value_mut().pop();
        }
        KeyCode::Char(c) => form.value_mut().push(c),
        KeyCode::Enter => submit_form(app),
        _ => {}
    }
}

fn submit_form(app: &mut App) {
    let Some(form) = app.form.as_mut() else {
        return;
    };
    let result = match form.editing.clone() {
        Some(id) => app.focus.update_project(&id, &form.draft).map(|()| id),
        None => app.focus.create_project(&form.draft),
    };
    match result {
        Ok(id) => {
            let editing = form.editing.is_some();
            app.form = None;
            if let Some(idx) = app.focus.projects().iter().position(|p| p.id == id) {
                app.project_list_state.select(Some(idx));
            }
            let name = app
                .focus
                .projects()
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone())
                .unwrap_or_default();
            app.set_status(if editing {
                format!("Updated {name}")
            } else {
                format!("Created {name}")
            });
        }
        Err(errors) => form.errors = errors,
    }
}

fn handle_confirm_key(app: &mut App, key: KeyEvent, id: String) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            let name = app
                .focus
                .projects()
                .iter()
                .find(|p| p.id == id)
                .map(|p| p.name.clone());
            if app.focus.delete_project(&id) {
                let len = app.focus.projects().len();
                let sel = app.project_list_state.selected().unwrap_or(0);
                app.project_list_state
                    .select(if len == 0 { None } else { Some(sel.min(len - 1)) });
                app.set_status(format!("Deleted {}", name.unwrap_or_default()));
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.set_status("Kept project"),
        // Anything else leaves the prompt up.
        _ => app.confirm_delete = Some(id),
    }
}

fn handle_playlist_key(app: &mut App, key: KeyEvent, now: Instant) {
    match key.code {
        KeyCode::Char(' ') => app.playback.toggle_current(now),
        KeyCode::Enter => {
            let id = app
                .song_list_state
                .selected()
                .and_then(|i| app.playback.queue().get(i))
                .map(|s| s.id);
            if let Some(id) = id {
                app.playback.toggle_song(id, now);
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') => {
            app.playback.next();
            sync_song_selection(app);
        }
        KeyCode::Char('p') | KeyCode::Char('P') => {
            app.playback.previous();
            sync_song_selection(app);
        }
        KeyCode::Char('x') | KeyCode::Char('X') => {
            let on = app.playback.toggle_shuffle();
            app.set_status(if on { "Shuffle on" } else { "Shuffle off" });
        }
        KeyCode::Char('v') | KeyCode::Char('V') => {
            let mode = app.playback.cycle_repeat();
            app.set_status(format!("Repeat: {}", mode.label()));
        }
        KeyCode::Left => app.seek_by(-SEEK_STEP),
        KeyCode::Right => app.seek_by(SEEK_STEP),
        KeyCode::Char('a') | KeyCode::Char('A') => app.add_song = Some(String::new()),
        _ => {}
    }
}

fn sync_song_selection(app: &mut App) {
    if let Some(idx) = app.playback.current_index() {
        app.song_list_state.select(Some(idx));
    }
}

fn handle_add_song_key(app: &mut App, key: KeyEvent) {
    let Some(input) = app.add_song.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc => app.add_song = None,
        KeyCode::Backspace => {
            input.pop();
        }
        KeyCode::Char(c) => input.push(c),
        KeyCode::Enter => {
            let reference = input.trim().to_string();
            app.add_song = None;
            if reference.is_empty() {
                return;
            }
            app.pending_adds += 1;
            app.set_status(format!("Looking up {reference}..."));
            spawn_add(app.lookup.clone(), reference, app.catalog_tx.clone());
        }
        _ => {}
    }
}

fn handle_poems_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        if let Some(idx) = app.poem_list_state.selected() {
            if idx < app.poems.len() {
                app.open_poem = Some(idx);
                app.poem_scroll = 0;
            }
        }
    }
}

fn handle_poem_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => app.open_poem = None,
        KeyCode::Down | KeyCode::Char('j') => app.poem_scroll = app.poem_scroll.saturating_add(1),
        KeyCode::Up | KeyCode::Char('k') => app.poem_scroll = app.poem_scroll.saturating_sub(1),
        KeyCode::PageDown => app.poem_scroll = app.poem_scroll.saturating_add(10),
        KeyCode::PageUp => app.poem_scroll = app.poem_scroll.saturating_sub(10),
        _ => {}
    }
}

pub fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let overlay = app.show_help || app.form.is_some() || app.open_poem.is_some();
    match mouse.kind {
        MouseEventKind::ScrollDown if !overlay => app.move_selection(SCROLL_STEP),
        MouseEventKind::ScrollUp if !overlay => app.move_selection(-SCROLL_STEP),
        MouseEventKind::Down(MouseButton::Left) if !overlay => {
            let Some(bar) = app.progress_bar_area else {
                return;
            };
            if app.view != View::Playlist
                || mouse.row != bar.y
                || mouse.column < bar.x
                || mouse.column >= bar.x + bar.width
            {
                return;
            }
            // First cell is the start, last cell the end.
            let span = f64::from(bar.width.saturating_sub(1).max(1));
            let ratio = f64::from(mouse.column - bar.x) / span;
            if let Some(target) = app.playback.seek_fraction(ratio) {
                app.set_status(format!("Seek to {}", format_time(target)));
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GiftError, Result};
    use crate::playback::catalog::{CatalogLoad, Song};
    use crate::playback::lookup::VideoInfo;
    use crate::playback::widget::{Notifier, PlayerWidget, WidgetFactory, WidgetNotice, WidgetState};
    use async_trait::async_trait;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    struct SilentWidget;

    impl PlayerWidget for SilentWidget {
        fn load(&mut self, _video_id: &str) {}
        fn play(&mut self) {}
        fn pause(&mut self) {}
        fn seek(&mut self, _seconds: f64) {}
        fn position(&self) -> f64 {
            0.0
        }
        fn duration(&self) -> f64 {
            0.0
        }
        fn destroy(&mut self) {}
    }

    struct SilentFactory;

    impl WidgetFactory for SilentFactory {
        fn create(&mut self, _notifier: Notifier) -> Box<dyn PlayerWidget> {
            Box::new(SilentWidget)
        }
    }

    struct Offline;

    #[async_trait]
    impl VideoLookup for Offline {
        async fn lookup(&self, _video_id: &str) -> Result<VideoInfo> {
            Err(GiftError::Lookup("offline".into()))
        }
    }

    struct Fixture {
        app: App,
        dir: tempfile::TempDir,
        catalog_rx: UnboundedReceiver<CatalogMessage>,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let (widget_tx, _) = unbounded_channel();
        let (catalog_tx, catalog_rx) = unbounded_channel();
        let services = Services {
            focus: FocusEngine::in_memory(),
            playback: PlaybackEngine::new(Box::new(SilentFactory), widget_tx),
            ambience: Ambience::new(None),
            lookup: Arc::new(Offline),
            catalog_tx,
        };
        let app = App::new(
            Config::default(),
            dir.path().join("config.toml"),
            services,
            vec![Poem {
                id: 1,
                title: "Evening".into(),
                text: "soft light".into(),
            }],
        );
        Fixture {
            app,
            dir,
            catalog_rx,
        }
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE), Instant::now());
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    fn create_project(app: &mut App, name: &str) {
        press(app, KeyCode::Char('a'));
        type_text(app, name);
        press(app, KeyCode::Tab);
        type_text(app, "finish it");
        press(app, KeyCode::Tab);
        press(app, KeyCode::Backspace);
        press(app, KeyCode::Backspace);
        type_text(app, "50");
        press(app, KeyCode::Enter);
    }

    #[test]
    fn form_creates_and_activates_project() {
        let mut f = fixture();
        create_project(&mut f.app, "Thesis");
        assert!(f.app.form.is_none());
        let active = f.app.focus.active_project().unwrap();
        assert_eq!(active.name, "Thesis");
        assert_eq!(active.custom_settings.pomodoro, 3000);
        assert_eq!(f.app.focus.session().time_left(), 3000);
        assert_eq!(f.app.project_list_state.selected(), Some(0));
        assert_eq!(f.app.status, "Created Thesis");
    }

    #[test]
    fn invalid_form_stays_open_with_errors() {
        let mut f = fixture();
        press(&mut f.app, KeyCode::Char('a'));
        press(&mut f.app, KeyCode::Enter);
        let form = f.app.form.as_ref().unwrap();
        assert_eq!(
            form.errors,
            ["Project name is required", "Project goals are required"]
        );
        assert!(f.app.focus.projects().is_empty());
        press(&mut f.app, KeyCode::Esc);
        assert!(f.app.form.is_none());
    }

    #[test]
    fn editing_prefills_and_updates() {
        let mut f = fixture();
        create_project(&mut f.app, "Thesis");
        press(&mut f.app, KeyCode::Char('e'));
        assert_eq!(f.app.form.as_ref().unwrap().value(FormField::Pomodoro), "50");
        type_text(&mut f.app, " v2");
        press(&mut f.app, KeyCode::Enter);
        assert_eq!(f.app.focus.projects()[0].name, "Thesis v2");
        assert_eq!(f.app.focus.projects().len(), 1);
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut f = fixture();
        create_project(&mut f.app, "Thesis");
        press(&mut f.app, KeyCode::Char('d'));
        assert!(f.app.confirm_delete.is_some());
        press(&mut f.app, KeyCode::Char('n'));
        assert_eq!(f.app.focus.projects().len(), 1);

        press(&mut f.app, KeyCode::Char('d'));
        press(&mut f.app, KeyCode::Char('x'));
        assert!(f.app.confirm_delete.is_some());
        press(&mut f.app, KeyCode::Char('y'));
        assert!(f.app.focus.projects().is_empty());
        assert!(f.app.focus.active_project().is_none());
        assert_eq!(f.app.focus.session().time_left(), 1500);
        assert_eq!(f.app.project_list_state.selected(), None);
    }

    #[test]
    fn mode_keys_switch_timer() {
        let mut f = fixture();
        press(&mut f.app, KeyCode::Char(' '));
        assert!(f.app.focus.session().is_running());
        press(&mut f.app, KeyCode::Char('s'));
        assert!(!f.app.focus.session().is_running());
        assert_eq!(f.app.focus.session().mode(), TimerMode::ShortBreak);
        assert_eq!(f.app.focus.session().time_left(), 300);
        press(&mut f.app, KeyCode::Char('l'));
        assert_eq!(f.app.focus.session().time_left(), 900);
    }

    #[test]
    fn leaving_home_pauses_timer() {
        let mut f = fixture();
        press(&mut f.app, KeyCode::Char(' '));
        press(&mut f.app, KeyCode::Char('2'));
        assert_eq!(f.app.view, View::Playlist);
        assert!(!f.app.focus.session().is_running());
        assert!(f.app.focus.session().session_start().is_some());
    }

    #[test]
    fn dock_keys_and_tab_cycle_views() {
        let mut f = fixture();
        press(&mut f.app, KeyCode::Char('3'));
        assert_eq!(f.app.view, View::Poems);
        press(&mut f.app, KeyCode::Tab);
        assert_eq!(f.app.view, View::Affirmations);
        press(&mut f.app, KeyCode::BackTab);
        press(&mut f.app, KeyCode::BackTab);
        press(&mut f.app, KeyCode::BackTab);
        assert_eq!(f.app.view, View::Home);
        press(&mut f.app, KeyCode::BackTab);
        assert_eq!(f.app.view, View::Goodbye);
    }

    #[test]
    fn first_navigation_unmutes_ambience() {
        let mut f = fixture();
        assert!(f.app.ambience.is_muted());
        press(&mut f.app, KeyCode::Char('3'));
        assert!(!f.app.ambience.is_muted());
    }

    #[test]
    fn goodbye_reveals_after_delay() {
        let mut f = fixture();
        let start = Instant::now();
        f.app.navigate(View::Goodbye, start);
        f.app.tick(start + Duration::from_millis(400));
        assert!(!f.app.goodbye_revealed);
        f.app.tick(start + Duration::from_millis(500));
        assert!(f.app.goodbye_revealed);
        f.app.navigate(View::Home, start + Duration::from_secs(1));
        assert!(!f.app.goodbye_revealed);
    }

    #[test]
    fn poem_overlay_opens_and_closes() {
        let mut f = fixture();
        press(&mut f.app, KeyCode::Char('3'));
        press(&mut f.app, KeyCode::Enter);
        assert_eq!(f.app.open_poem, Some(0));
        press(&mut f.app, KeyCode::Char('j'));
        assert_eq!(f.app.poem_scroll, 1);
        press(&mut f.app, KeyCode::Esc);
        assert_eq!(f.app.open_poem, None);
    }

    #[test]
    fn theme_cycle_is_saved() {
        let mut f = fixture();
        press(&mut f.app, KeyCode::Char('t'));
        assert_eq!(f.app.theme_name, ThemeName::Midnight);
        let saved = Config::load(&f.dir.path().join("config.toml"));
        assert_eq!(saved.theme, ThemeName::Midnight);
    }

    #[test]
    fn catalog_skips_are_reported() {
        let mut f = fixture();
        f.app.on_catalog(CatalogMessage::Loaded(CatalogLoad {
            songs: vec![Song::new("abcdefghijk", "One".into(), "Someone".into())],
            failures: vec![("nope".into(), "invalid video reference".into())],
        }));
        assert_eq!(
            f.app.status,
            "Loaded 1 songs, skipped 1 that could not be found"
        );
        assert_eq!(f.app.song_list_state.selected(), Some(0));
        assert_eq!(f.app.playback.current_song().unwrap().title, "One");
    }

    #[test]
    fn status_decays_to_ready() {
        let mut f = fixture();
        f.app.set_status("Hello");
        f.app.tick(Instant::now() + Duration::from_secs(6));
        assert_eq!(f.app.status, "Ready");
    }

    fn load_songs(app: &mut App, n: usize) {
        let songs = (0..n)
            .map(|i| Song::new(&format!("song{i:07}"), format!("Song {i}"), "Someone".into()))
            .collect();
        app.on_catalog(CatalogMessage::Loaded(CatalogLoad {
            songs,
            failures: Vec::new(),
        }));
    }

    fn notify(app: &mut App, notice: WidgetNotice) {
        let event = WidgetEvent {
            generation: app.playback.generation(),
            notice,
        };
        app.on_widget_event(event, Instant::now());
    }

    fn click(app: &mut App, column: u16, row: u16) {
        let event = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(app, event);
    }

    #[test]
    fn progress_bar_click_maps_bar_cells_to_track() {
        let mut f = fixture();
        load_songs(&mut f.app, 1);
        notify(&mut f.app, WidgetNotice::Ready { duration: 100.0 });
        press(&mut f.app, KeyCode::Char('2'));

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| crate::ui::draw(frame, &mut f.app)).unwrap();
        let bar = f.app.progress_bar_area.unwrap();
        assert!(bar.width > 10);

        click(&mut f.app, bar.x + bar.width - 1, bar.y);
        assert_eq!(f.app.playback.current_time(), 100.0);
        click(&mut f.app, bar.x, bar.y);
        assert_eq!(f.app.playback.current_time(), 0.0);

        // The time labels either side of the bar do not seek.
        click(&mut f.app, bar.x + bar.width / 2, bar.y);
        let middle = f.app.playback.current_time();
        assert!((middle - 50.0).abs() < 1.0, "{middle}");
        click(&mut f.app, bar.x - 3, bar.y);
        click(&mut f.app, bar.x + bar.width + 1, bar.y);
        assert_eq!(f.app.playback.current_time(), middle);
    }

    #[test]
    fn natural_end_moves_queue_highlight() {
        let mut f = fixture();
        load_songs(&mut f.app, 3);
        assert_eq!(f.app.song_list_state.selected(), Some(0));
        notify(&mut f.app, WidgetNotice::StateChange(WidgetState::Playing));
        notify(&mut f.app, WidgetNotice::StateChange(WidgetState::Ended));
        assert_eq!(f.app.playback.current_index(), Some(1));
        assert_eq!(f.app.song_list_state.selected(), Some(1));
    }

    #[tokio::test]
    async fn add_song_prompt_reports_failure() {
        let mut f = fixture();
        press(&mut f.app, KeyCode::Char('2'));
        press(&mut f.app, KeyCode::Char('a'));
        type_text(&mut f.app, "zzzzzzzzzzz");
        press(&mut f.app, KeyCode::Enter);
        assert!(f.app.add_song.is_none());
        assert_eq!(f.app.pending_adds, 1);

        let msg = f.catalog_rx.recv().await.unwrap();
        f.app.on_catalog(msg);
        assert_eq!(f.app.pending_adds, 0);
        assert!(f.app.status.starts_with("Could not add zzzzzzzzzzz"));
    }
}
