//! The boundary between the queue engine and whatever actually plays audio.

use tokio::sync::mpsc::UnboundedSender;

/// Playback state reported by a widget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WidgetState {
    Playing,
    Paused,
    Ended,
}

#[derive(Clone, Debug, PartialEq)]
pub enum WidgetNotice {
    /// The track is loaded and commands will take effect.
    Ready { duration: f64 },
    StateChange(WidgetState),
    Error(String),
}

/// A notice tagged with the widget instance that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct WidgetEvent {
    pub generation: u64,
    pub notice: WidgetNotice,
}

/// Sending half handed to each widget instance.
#[derive(Clone, Debug)]
pub struct Notifier {
    generation: u64,
    tx: UnboundedSender<WidgetEvent>,
}

impl Notifier {
    pub fn new(generation: u64, tx: UnboundedSender<WidgetEvent>) -> Self {
        Self { generation, tx }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn send(&self, notice: WidgetNotice) {
        // The engine may already have shut down.
        let _ = self.tx.send(WidgetEvent {
            generation: self.generation,
            notice,
        });
    }
}

/// One loaded track in an external player.
pub trait PlayerWidget: Send {
    fn load(&mut self, video_id: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn position(&self) -> f64;
    fn duration(&self) -> f64;
    fn destroy(&mut self);
}

/// Creates an empty widget that reports through `notifier`; the engine
/// then loads a track into it.
pub trait WidgetFactory: Send {
    fn create(&mut self, notifier: Notifier) -> Box<dyn PlayerWidget>;
}
