use std::time::{Duration, Instant};

/// A cancellable periodic deadline polled from the UI loop.
///
/// Nothing fires while disarmed, so a stopped timer or paused track costs
/// nothing per frame.
#[derive(Clone, Debug)]
pub struct Ticker {
    period: Duration,
    next: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// Arms the ticker; the first fire is one period after `now`.
    /// Re-arming an armed ticker keeps its phase.
    pub fn start(&mut self, now: Instant) {
        if self.next.is_none() {
            self.next = Some(now + self.period);
        }
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    /// Number of periods elapsed since the last call, advancing the deadline.
    pub fn due(&mut self, now: Instant) -> u32 {
        let Some(mut next) = self.next else {
            return 0;
        };
        let mut fired = 0;
        while next <= now {
            fired += 1;
            next += self.period;
        }
        self.next = Some(next);
        fired
    }
}

/// A one-shot deadline, e.g. the delayed reveal of the goodbye message.
#[derive(Clone, Debug, Default)]
pub struct Delay {
    at: Option<Instant>,
}

impl Delay {
    pub fn arm(&mut self, now: Instant, after: Duration) {
        self.at = Some(now + after);
    }

    pub fn cancel(&mut self) {
        self.at = None;
    }

    /// True exactly once, on the first poll at or after the deadline.
    pub fn fired(&mut self, now: Instant) -> bool {
        match self.at {
            Some(at) if at <= now => {
                self.at = None;
                true
            }
            _ => false,
        }
    }
}
