//! Background ambience: a looping track whose volume is faded in and out as
//! the user moves between views.

use std::time::{Duration, Instant};

use crate::ticker::Ticker;

const FADE_STEP: Duration = Duration::from_millis(50);
const MUTE_FADE_STEPS: u32 = 20;
const VIEW_FADE_STEPS: u32 = 30;

/// Whatever actually emits the background audio.
pub trait AmbienceSink: Send {
    fn play(&mut self);
    fn pause(&mut self);
    /// `volume` in `0.0..=1.0`.
    fn set_volume(&mut self, volume: f64);
    fn failed(&self) -> bool {
        false
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum FadeKind {
    In,
    Out { from: f64 },
}

#[derive(Debug)]
struct Fade {
    kind: FadeKind,
    step: u32,
    steps: u32,
    ticker: Ticker,
}

pub struct Ambience {
    sink: Option<Box<dyn AmbienceSink>>,
    volume: f64,
    muted: bool,
    playing: bool,
    fade: Option<Fade>,
}

impl Ambience {
    /// Starts muted and silent; nothing plays until the user asks for it.
    pub fn new(sink: Option<Box<dyn AmbienceSink>>) -> Self {
        let mut ambience = Self {
            sink,
            volume: 0.0,
            muted: true,
            playing: false,
            fade: None,
        };
        ambience.apply_volume();
        ambience
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    /// Returns the new muted state.
    pub fn toggle_mute(&mut self, now: Instant) -> bool {
        if self.muted {
            self.unmute(now);
        } else {
            self.muted = true;
            self.fade = None;
            self.volume = 0.0;
            self.apply_volume();
            tracing::debug!("ambience muted");
        }
        self.muted
    }

    /// Reacts to a view change. The playlist has its own music, so the
    /// ambience fades out on the way in and back in on the way out.
    pub fn navigate(&mut self, from_playlist: bool, to_playlist: bool, now: Instant) {
        if self.muted && !self.playing && !to_playlist {
            self.unmute(now);
        }
        if !from_playlist && to_playlist {
            let from = self.volume;
            self.begin(FadeKind::Out { from }, VIEW_FADE_STEPS, now);
        } else if from_playlist && !to_playlist && !self.muted {
            self.start_playing();
            self.begin(FadeKind::In, VIEW_FADE_STEPS, now);
        }
    }

    /// Advances a running fade.
    pub fn poll(&mut self, now: Instant) {
        if self.sink.as_ref().is_some_and(|s| s.failed()) && self.playing {
            tracing::error!("ambience track failed, stopping");
            self.playing = false;
            self.fade = None;
        }
        let Some(fade) = self.fade.as_mut() else {
            return;
        };
        let due = fade.ticker.due(now);
        for _ in 0..due {
            if self.step() {
                self.fade = None;
                break;
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.fade = None;
        if let Some(sink) = self.sink.as_mut() {
            sink.pause();
        }
        self.playing = false;
    }

    fn unmute(&mut self, now: Instant) {
        self.muted = false;
        self.start_playing();
        self.begin(FadeKind::In, MUTE_FADE_STEPS, now);
        tracing::debug!("ambience unmuted");
    }

    fn start_playing(&mut self) {
        self.volume = 0.0;
        self.apply_volume();
        if let Some(sink) = self.sink.as_mut() {
            sink.play();
        }
        self.playing = true;
    }

    fn begin(&mut self, kind: FadeKind, steps: u32, now: Instant) {
        let mut ticker = Ticker::new(FADE_STEP);
        ticker.start(now);
        self.fade = Some(Fade {
            kind,
            step: 0,
            steps,
            ticker,
        });
    }

    /// One fade step. True when the fade is finished.
    fn step(&mut self) -> bool {
        let Some(fade) = self.fade.as_mut() else {
            return true;
        };
        fade.step += 1;
        let progress = f64::from(fade.step) / f64::from(fade.steps);
        let kind = fade.kind;
        match kind {
            FadeKind::In => {
                self.volume = progress.min(1.0);
                self.apply_volume();
                self.volume >= 1.0
            }
            FadeKind::Out { from } => {
                self.volume = (from * (1.0 - progress)).max(0.0);
                self.apply_volume();
                if self.volume <= 0.0 {
                    if let Some(sink) = self.sink.as_mut() {
                        sink.pause();
                    }
                    self.playing = false;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn apply_volume(&mut self) {
        let volume = self.volume;
        if let Some(sink) = self.sink.as_mut() {
            sink.set_volume(volume);
        }
    }
}
