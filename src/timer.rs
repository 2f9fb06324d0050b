//! Countdown session for the focus timer.
//!
//! The session knows nothing about projects; callers hand it the
//! [`TimerSettings`] in force (a project's or the defaults) whenever the
//! durations may have changed.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimerMode {
    #[default]
    Pomodoro,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [Self::Pomodoro, Self::ShortBreak, Self::LongBreak];

    pub fn label(&self) -> &str {
        match self {
            Self::Pomodoro => "Pomodoro",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    /// Caption under the clock.
    pub fn caption(&self) -> &str {
        match self {
            Self::Pomodoro => "Focus Time",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }
}

/// Mode durations in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettings {
    pub pomodoro: u32,
    pub short_break: u32,
    pub long_break: u32,
}

impl TimerSettings {
    pub const DEFAULT: TimerSettings = TimerSettings {
        pomodoro: 25 * 60,
        short_break: 5 * 60,
        long_break: 15 * 60,
    };

    pub fn from_minutes(pomodoro: u32, short_break: u32, long_break: u32) -> Self {
        Self {
            pomodoro: pomodoro * 60,
            short_break: short_break * 60,
            long_break: long_break * 60,
        }
    }

    pub fn duration(&self, mode: TimerMode) -> u32 {
        match mode {
            TimerMode::Pomodoro => self.pomodoro,
            TimerMode::ShortBreak => self.short_break,
            TimerMode::LongBreak => self.long_break,
        }
    }
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A finished run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Completion {
    pub mode: TimerMode,
    /// Seconds captured when the run first started.
    pub credited: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    Idle,
    Counted,
    Completed(Completion),
}

#[derive(Clone, Debug)]
pub struct Session {
    mode: TimerMode,
    duration: u32,
    time_left: u32,
    is_running: bool,
    session_start: Option<u32>,
}

impl Session {
    pub fn new(settings: &TimerSettings) -> Self {
        let duration = settings.duration(TimerMode::Pomodoro);
        Self {
            mode: TimerMode::Pomodoro,
            duration,
            time_left: duration,
            is_running: false,
            session_start: None,
        }
    }

    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn session_start(&self) -> Option<u32> {
        self.session_start
    }

    /// Fraction of the current mode already elapsed, 0.0..=1.0.
    pub fn progress(&self) -> f64 {
        if self.duration == 0 {
            return 0.0;
        }
        (self.duration - self.time_left) as f64 / self.duration as f64
    }

    pub fn change_mode(&mut self, mode: TimerMode, settings: &TimerSettings) {
        self.mode = mode;
        self.reset(settings);
    }

    /// Reloads the current mode's duration from `settings` and stops.
    pub fn reset(&mut self, settings: &TimerSettings) {
        self.duration = settings.duration(self.mode);
        self.time_left = self.duration;
        self.is_running = false;
        self.session_start = None;
    }

    /// Swaps in the current mode's duration from `settings`, leaving the
    /// run state and credit snapshot alone.
    pub fn load_duration(&mut self, settings: &TimerSettings) {
        self.duration = settings.duration(self.mode);
        self.time_left = self.duration;
    }

    /// Starts or pauses. Returns whether the session is now running.
    pub fn toggle(&mut self) -> bool {
        if self.is_running {
            self.is_running = false;
        } else if self.time_left > 0 {
            self.session_start.get_or_insert(self.time_left);
            self.is_running = true;
        }
        self.is_running
    }

    /// Advances one second.
    pub fn tick(&mut self) -> Tick {
        if !self.is_running || self.time_left == 0 {
            return Tick::Idle;
        }
        if self.time_left > 1 {
            self.time_left -= 1;
            return Tick::Counted;
        }
        self.time_left = 0;
        self.is_running = false;
        Tick::Completed(Completion {
            mode: self.mode,
            credited: self.session_start.take().unwrap_or(0),
        })
    }

    /// Overrides the remaining time, clamped to the mode duration.
    #[cfg(test)]
    pub fn set_time_left(&mut self, secs: u32) {
        self.time_left = secs.min(self.duration);
    }
}
