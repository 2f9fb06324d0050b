//! The Playlist view engine: song queue, shuffle/repeat policy, and the
//! external player widget that actually makes sound.

pub mod catalog;
pub mod lookup;
pub mod mpv;
pub mod widget;

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tokio::sync::mpsc::UnboundedSender;

use crate::ticker::Ticker;
use catalog::Song;
use widget::{Notifier, PlayerWidget, WidgetEvent, WidgetFactory, WidgetNotice, WidgetState};

const POSITION_POLL: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RepeatMode {
    #[default]
    Off,
    All,
    One,
}

impl RepeatMode {
    pub fn next(&self) -> Self {
        match self {
            Self::Off => Self::All,
            Self::All => Self::One,
            Self::One => Self::Off,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Off => "Off",
            Self::All => "All",
            Self::One => "One",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Paused,
    Playing,
}

pub struct PlaybackEngine {
    queue: Vec<Song>,
    current: Option<u64>,
    is_playing: bool,
    current_time: f64,
    duration: f64,
    shuffle: bool,
    repeat: RepeatMode,
    loading: bool,
    factory: Box<dyn WidgetFactory>,
    widget: Option<Box<dyn PlayerWidget>>,
    autoplay: bool,
    generation: u64,
    events: UnboundedSender<WidgetEvent>,
    poll: Ticker,
    rng: StdRng,
}

impl PlaybackEngine {
    pub fn new(factory: Box<dyn WidgetFactory>, events: UnboundedSender<WidgetEvent>) -> Self {
        Self::with_rng(factory, events, StdRng::from_entropy())
    }

    pub fn with_rng(
        factory: Box<dyn WidgetFactory>,
        events: UnboundedSender<WidgetEvent>,
        rng: StdRng,
    ) -> Self {
        Self {
            queue: Vec::new(),
            current: None,
            is_playing: false,
            current_time: 0.0,
            duration: 0.0,
            shuffle: false,
            repeat: RepeatMode::Off,
            loading: false,
            factory,
            widget: None,
            autoplay: false,
            generation: 0,
            events,
            poll: Ticker::new(POSITION_POLL),
            rng,
        }
    }

    // ── Accessors ──────────────────────────────────────────────────

    pub fn queue(&self) -> &[Song] {
        &self.queue
    }

    pub fn current_song(&self) -> Option<&Song> {
        let id = self.current?;
        self.queue.iter().find(|s| s.id == id)
    }

    pub fn current_index(&self) -> Option<usize> {
        let id = self.current?;
        self.queue.iter().position(|s| s.id == id)
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.current.is_none() {
            Phase::Idle
        } else if self.is_playing {
            Phase::Playing
        } else {
            Phase::Paused
        }
    }

    // ── Catalog ────────────────────────────────────────────────────

    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    /// Installs the startup catalog. The first song is cued, not played.
    pub fn set_catalog(&mut self, songs: Vec<Song>) {
        self.loading = false;
        self.queue = songs;
        if self.current.is_none() {
            if let Some(first) = self.queue.first().map(|s| s.id) {
                self.switch_to(first, false);
            }
        }
    }

    pub fn append(&mut self, song: Song) {
        let id = song.id;
        self.queue.push(song);
        if self.current.is_none() {
            self.switch_to(id, false);
        }
    }

    // ── Commands ───────────────────────────────────────────────────

    /// Play/pause on a queue entry: flips the current song, or switches to
    /// another one and plays it.
    pub fn toggle_song(&mut self, id: u64, now: Instant) {
        if self.current.is_none() || self.widget.is_none() {
            return;
        }
        if self.current != Some(id) {
            if self.queue.iter().any(|s| s.id == id) {
                self.switch_to(id, true);
            }
            return;
        }
        let Some(widget) = self.widget.as_mut() else {
            return;
        };
        if self.is_playing {
            widget.pause();
            self.is_playing = false;
            self.poll.cancel();
        } else {
            widget.play();
            self.is_playing = true;
            self.poll.start(now);
        }
    }

    /// Pauses without changing the current song; used when the view closes.
    pub fn pause(&mut self) {
        self.autoplay = false;
        if !self.is_playing {
            return;
        }
        if let Some(widget) = self.widget.as_mut() {
            widget.pause();
        }
        self.is_playing = false;
        self.poll.cancel();
    }

    pub fn toggle_current(&mut self, now: Instant) {
        if let Some(id) = self.current {
            self.toggle_song(id, now);
        }
    }

    pub fn next(&mut self) {
        let Some(idx) = self.current_index() else {
            return;
        };
        let next = if self.shuffle {
            self.pick_other()
        } else {
            self.queue[(idx + 1) % self.queue.len()].id
        };
        self.switch_to(next, true);
    }

    /// Always sequential, whatever the shuffle setting.
    pub fn previous(&mut self) {
        let Some(idx) = self.current_index() else {
            return;
        };
        let len = self.queue.len();
        let prev = self.queue[(idx + len - 1) % len].id;
        self.switch_to(prev, true);
    }

    pub fn toggle_shuffle(&mut self) -> bool {
        self.shuffle = !self.shuffle;
        self.shuffle
    }

    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.repeat = self.repeat.next();
        self.repeat
    }

    /// Seeks to `ratio` (0.0..=1.0) of the track. Returns the target time.
    pub fn seek_fraction(&mut self, ratio: f64) -> Option<f64> {
        let widget = self.widget.as_mut()?;
        if self.duration <= 0.0 {
            return None;
        }
        let target = (ratio.clamp(0.0, 1.0) * self.duration).clamp(0.0, self.duration);
        widget.seek(target);
        self.current_time = target;
        Some(target)
    }

    /// Refreshes the play position while playing.
    pub fn poll(&mut self, now: Instant) {
        if self.poll.due(now) == 0 || !self.is_playing {
            return;
        }
        if let Some(widget) = &self.widget {
            self.current_time = widget.position();
        }
    }

    /// Handles a widget notice. Returns a message worth showing the user.
    pub fn handle_event(&mut self, event: WidgetEvent, now: Instant) -> Option<String> {
        if event.generation != self.generation {
            tracing::trace!(generation = event.generation, "dropping stale widget event");
            return None;
        }
        match event.notice {
            WidgetNotice::Ready { duration } => {
                self.duration = duration;
                if std::mem::take(&mut self.autoplay) {
                    if let Some(widget) = self.widget.as_mut() {
                        widget.play();
                    }
                }
                None
            }
            WidgetNotice::StateChange(WidgetState::Playing) => {
                self.is_playing = true;
                if let Some(widget) = &self.widget {
                    self.duration = widget.duration();
                }
                self.poll.start(now);
                None
            }
            WidgetNotice::StateChange(WidgetState::Paused) => {
                self.is_playing = false;
                self.poll.cancel();
                None
            }
            WidgetNotice::StateChange(WidgetState::Ended) => {
                self.on_ended(now);
                None
            }
            WidgetNotice::Error(reason) => {
                tracing::error!(error = %reason, "player error, stopping playback");
                self.is_playing = false;
                self.autoplay = false;
                self.poll.cancel();
                if let Some(widget) = self.widget.as_mut() {
                    widget.pause();
                }
                Some(format!("Playback error: {reason}"))
            }
        }
    }

    /// Tears down the widget.
    pub fn shutdown(&mut self) {
        if let Some(mut widget) = self.widget.take() {
            widget.destroy();
        }
        self.is_playing = false;
        self.poll.cancel();
    }

    // ── Internals ──────────────────────────────────────────────────

    fn on_ended(&mut self, now: Instant) {
        let Some(idx) = self.current_index() else {
            return;
        };
        if self.repeat == RepeatMode::One {
            if let Some(widget) = self.widget.as_mut() {
                widget.seek(0.0);
                widget.play();
            }
            self.current_time = 0.0;
            self.is_playing = true;
            self.poll.start(now);
            return;
        }

        let next = if self.shuffle {
            Some(self.pick_other())
        } else if idx + 1 < self.queue.len() {
            Some(self.queue[idx + 1].id)
        } else if self.repeat == RepeatMode::All {
            Some(self.queue[0].id)
        } else {
            None
        };

        match next {
            Some(id) => self.switch_to(id, true),
            None => {
                tracing::debug!("reached end of queue");
                self.is_playing = false;
                self.poll.cancel();
            }
        }
    }

    /// A random song other than the current one; the first song when there
    /// is no other.
    fn pick_other(&mut self) -> u64 {
        let current = self.current;
        let others: Vec<u64> = self
            .queue
            .iter()
            .map(|s| s.id)
            .filter(|id| Some(*id) != current)
            .collect();
        match others.choose(&mut self.rng) {
            Some(id) => *id,
            None => self.queue[0].id,
        }
    }

    /// Makes `id` current, replacing the widget.
    fn switch_to(&mut self, id: u64, autoplay: bool) {
        let Some(song) = self.queue.iter().find(|s| s.id == id) else {
            return;
        };
        let youtube_id = song.youtube_id.clone();
        tracing::debug!(title = %song.title, autoplay, "switching song");

        if let Some(mut old) = self.widget.take() {
            old.destroy();
        }
        self.generation += 1;
        let mut widget = self
            .factory
            .create(Notifier::new(self.generation, self.events.clone()));
        widget.load(&youtube_id);
        self.widget = Some(widget);

        self.current = Some(id);
        self.current_time = 0.0;
        self.duration = 0.0;
        self.is_playing = false;
        self.autoplay = autoplay;
        self.poll.cancel();
    }
}

impl Drop for PlaybackEngine {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

    #[derive(Default)]
    struct Shared {
        log: Vec<String>,
        position: f64,
    }

    struct FakeWidget {
        shared: Arc<Mutex<Shared>>,
        generation: u64,
    }

    impl FakeWidget {
        fn record(&self, cmd: String) {
            self.shared.lock().unwrap().log.push(format!("{}:{cmd}", self.generation));
        }
    }

    impl PlayerWidget for FakeWidget {
        fn load(&mut self, video_id: &str) {
            self.record(format!("load {video_id}"));
        }
        fn play(&mut self) {
            self.record("play".into());
        }
        fn pause(&mut self) {
            self.record("pause".into());
        }
        fn seek(&mut self, seconds: f64) {
            self.record(format!("seek {seconds}"));
        }
        fn position(&self) -> f64 {
            self.shared.lock().unwrap().position
        }
        fn duration(&self) -> f64 {
            200.0
        }
        fn destroy(&mut self) {
            self.record("destroy".into());
        }
    }

    struct FakeFactory(Arc<Mutex<Shared>>);

    impl WidgetFactory for FakeFactory {
        fn create(&mut self, notifier: Notifier) -> Box<dyn PlayerWidget> {
            Box::new(FakeWidget {
                shared: self.0.clone(),
                generation: notifier.generation(),
            })
        }
    }

    struct Harness {
        engine: PlaybackEngine,
        shared: Arc<Mutex<Shared>>,
        _rx: UnboundedReceiver<WidgetEvent>,
    }

    impl Harness {
        fn new(n: usize) -> Self {
            let shared = Arc::new(Mutex::new(Shared::default()));
            let (tx, rx) = unbounded_channel();
            let mut engine = PlaybackEngine::with_rng(
                Box::new(FakeFactory(shared.clone())),
                tx,
                StdRng::seed_from_u64(7),
            );
            let songs = (0..n)
                .map(|i| Song::new(&format!("vid{i:08}"), format!("Song {i}"), "Artist".into()))
                .collect();
            engine.set_catalog(songs);
            Self {
                engine,
                shared,
                _rx: rx,
            }
        }

        fn notify(&mut self, notice: WidgetNotice) -> Option<String> {
            let event = WidgetEvent {
                generation: self.engine.generation(),
                notice,
            };
            self.engine.handle_event(event, Instant::now())
        }

        fn ended(&mut self) {
            self.notify(WidgetNotice::StateChange(WidgetState::Ended));
        }

        fn index(&self) -> usize {
            self.engine.current_index().unwrap()
        }

        fn go_to(&mut self, index: usize) {
            let id = self.engine.queue()[index].id;
            self.engine.toggle_song(id, Instant::now());
            self.notify(WidgetNotice::StateChange(WidgetState::Playing));
        }

        fn log(&self) -> Vec<String> {
            self.shared.lock().unwrap().log.clone()
        }
    }

    #[test]
    fn catalog_cues_first_song_without_playing() {
        let h = Harness::new(3);
        assert_eq!(h.index(), 0);
        assert_eq!(h.engine.phase(), Phase::Paused);
        assert_eq!(h.log(), ["1:load vid00000000"]);
    }

    #[test]
    fn empty_catalog_is_idle() {
        let mut h = Harness::new(0);
        assert_eq!(h.engine.phase(), Phase::Idle);
        h.engine.next();
        h.engine.previous();
        h.engine.toggle_current(Instant::now());
        assert!(h.log().is_empty());
    }

    #[test]
    fn loading_phase_until_catalog_arrives() {
        let shared = Arc::new(Mutex::new(Shared::default()));
        let (tx, _rx) = unbounded_channel();
        let mut engine = PlaybackEngine::new(Box::new(FakeFactory(shared)), tx);
        engine.begin_loading();
        assert_eq!(engine.phase(), Phase::Loading);
        engine.set_catalog(Vec::new());
        assert_eq!(engine.phase(), Phase::Idle);
    }

    #[test]
    fn selecting_another_song_recreates_widget_and_autoplays() {
        let mut h = Harness::new(3);
        let id = h.engine.queue()[2].id;
        h.engine.toggle_song(id, Instant::now());
        assert_eq!(h.index(), 2);
        assert!(!h.engine.is_playing());
        h.notify(WidgetNotice::Ready { duration: 180.0 });
        assert_eq!(h.engine.duration(), 180.0);
        assert_eq!(
            h.log(),
            ["1:load vid00000000", "1:destroy", "2:load vid00000002", "2:play"]
        );
        h.notify(WidgetNotice::StateChange(WidgetState::Playing));
        assert_eq!(h.engine.phase(), Phase::Playing);
    }

    #[test]
    fn repeated_ready_plays_once() {
        let mut h = Harness::new(3);
        let id = h.engine.queue()[1].id;
        h.engine.toggle_song(id, Instant::now());
        h.notify(WidgetNotice::Ready { duration: 180.0 });
        h.notify(WidgetNotice::Ready { duration: 181.0 });
        let plays = h.log().iter().filter(|l| *l == "2:play").count();
        assert_eq!(plays, 1);
        assert_eq!(h.engine.duration(), 181.0);
    }

    #[test]
    fn toggling_current_song_flips_play_pause() {
        let mut h = Harness::new(2);
        let id = h.engine.queue()[0].id;
        h.engine.toggle_song(id, Instant::now());
        assert!(h.engine.is_playing());
        h.engine.toggle_song(id, Instant::now());
        assert!(!h.engine.is_playing());
        assert_eq!(h.log()[1..], ["1:play", "1:pause"]);
    }

    #[test]
    fn pause_is_a_no_op_when_already_paused() {
        let mut h = Harness::new(2);
        h.engine.pause();
        assert_eq!(h.log(), ["1:load vid00000000"]);
        h.go_to(0);
        h.engine.pause();
        assert!(!h.engine.is_playing());
        assert_eq!(h.log().last().map(String::as_str), Some("1:pause"));
    }

    #[test]
    fn stale_events_are_ignored() {
        let mut h = Harness::new(2);
        let stale = h.engine.generation();
        h.engine.next();
        let event = WidgetEvent {
            generation: stale,
            notice: WidgetNotice::StateChange(WidgetState::Playing),
        };
        h.engine.handle_event(event, Instant::now());
        assert!(!h.engine.is_playing());
    }

    #[test]
    fn next_and_previous_wrap_sequentially() {
        let mut h = Harness::new(3);
        h.engine.next();
        h.engine.next();
        assert_eq!(h.index(), 2);
        h.engine.next();
        assert_eq!(h.index(), 0);
        h.engine.previous();
        assert_eq!(h.index(), 2);
    }

    #[test]
    fn previous_ignores_shuffle() {
        let mut h = Harness::new(5);
        h.engine.toggle_shuffle();
        for expected in [4, 3, 2, 1, 0, 4] {
            h.engine.previous();
            assert_eq!(h.index(), expected);
        }
    }

    #[test]
    fn shuffle_next_never_repeats_current() {
        let mut h = Harness::new(4);
        h.engine.toggle_shuffle();
        for _ in 0..50 {
            let before = h.index();
            h.engine.next();
            assert_ne!(h.index(), before);
        }
    }

    #[test]
    fn shuffle_with_single_song_returns_it() {
        let mut h = Harness::new(1);
        let only = h.engine.queue()[0].id;
        h.engine.toggle_shuffle();
        h.engine.next();
        assert_eq!(h.engine.current_song().unwrap().id, only);
        h.ended();
        assert_eq!(h.engine.current_song().unwrap().id, only);
    }

    #[test]
    fn natural_end_on_last_song_stops_without_repeat() {
        let mut h = Harness::new(3);
        h.go_to(2);
        assert!(h.engine.is_playing());
        h.ended();
        assert_eq!(h.index(), 2);
        assert!(!h.engine.is_playing());
    }

    #[test]
    fn natural_end_advances_mid_queue() {
        let mut h = Harness::new(3);
        h.go_to(1);
        h.ended();
        assert_eq!(h.index(), 2);
    }

    #[test]
    fn repeat_all_wraps_to_first() {
        let mut h = Harness::new(3);
        assert_eq!(h.engine.cycle_repeat(), RepeatMode::All);
        h.go_to(2);
        h.ended();
        assert_eq!(h.index(), 0);
        h.notify(WidgetNotice::Ready { duration: 100.0 });
        assert_eq!(h.log().last().map(String::as_str), Some("3:play"));
    }

    #[test]
    fn repeat_one_restarts_same_song() {
        let mut h = Harness::new(3);
        h.engine.cycle_repeat();
        assert_eq!(h.engine.cycle_repeat(), RepeatMode::One);
        h.go_to(1);
        let id = h.engine.current_song().unwrap().id;
        h.shared.lock().unwrap().position = 150.0;
        h.engine.poll(Instant::now() + Duration::from_millis(150));
        assert_eq!(h.engine.current_time(), 150.0);

        h.ended();
        assert_eq!(h.engine.current_song().unwrap().id, id);
        assert_eq!(h.engine.current_time(), 0.0);
        assert_eq!(h.log()[h.log().len() - 2..], ["2:seek 0", "2:play"]);
        assert_eq!(h.engine.cycle_repeat(), RepeatMode::Off);
    }

    #[test]
    fn position_polls_only_while_playing() {
        let mut h = Harness::new(2);
        let start = Instant::now();
        h.shared.lock().unwrap().position = 12.5;
        h.engine.poll(start + Duration::from_secs(1));
        assert_eq!(h.engine.current_time(), 0.0);

        h.engine.toggle_current(start);
        h.engine.poll(start + Duration::from_millis(50));
        assert_eq!(h.engine.current_time(), 0.0);
        h.engine.poll(start + Duration::from_millis(100));
        assert_eq!(h.engine.current_time(), 12.5);

        h.notify(WidgetNotice::StateChange(WidgetState::Paused));
        h.shared.lock().unwrap().position = 40.0;
        h.engine.poll(start + Duration::from_secs(5));
        assert_eq!(h.engine.current_time(), 12.5);
    }

    #[test]
    fn seek_maps_fraction_to_duration() {
        let mut h = Harness::new(1);
        assert_eq!(h.engine.seek_fraction(0.5), None);
        h.notify(WidgetNotice::Ready { duration: 200.0 });
        assert_eq!(h.engine.seek_fraction(0.25), Some(50.0));
        assert_eq!(h.engine.current_time(), 50.0);
        assert_eq!(h.engine.seek_fraction(3.0), Some(200.0));
        assert_eq!(h.log().last().map(String::as_str), Some("1:seek 200"));
    }

    #[test]
    fn widget_error_stops_playback() {
        let mut h = Harness::new(2);
        h.go_to(0);
        let msg = h.notify(WidgetNotice::Error("mpv exited".into()));
        assert_eq!(msg.as_deref(), Some("Playback error: mpv exited"));
        assert!(!h.engine.is_playing());
        assert_eq!(h.log().last().map(String::as_str), Some("1:pause"));
    }

    #[test]
    fn appended_song_is_cued_when_queue_was_empty() {
        let mut h = Harness::new(0);
        h.engine.append(Song::new("abcdefghijk", "Late".into(), "Someone".into()));
        assert_eq!(h.engine.current_song().unwrap().title, "Late");
        h.engine.append(Song::new("bcdefghijkl", "Later".into(), "Someone".into()));
        assert_eq!(h.engine.current_song().unwrap().title, "Late");
        assert_eq!(h.engine.queue().len(), 2);
    }
}
