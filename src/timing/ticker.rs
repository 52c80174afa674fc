use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver};

/// Periodic tick source. While armed, `receiver()` yields one message per
/// period; once cancelled it hands out a channel that never fires.
pub struct Ticker {
    period: Duration,
    ticks: Option<Receiver<Instant>>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ticks: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_armed(&self) -> bool {
        self.ticks.is_some()
    }

    /// Returns `false` if a tick stream is already running.
    pub fn start(&mut self) -> bool {
        if self.ticks.is_some() {
            return false;
        }
        self.ticks = Some(channel::tick(self.period));
        true
    }

    pub fn cancel(&mut self) -> bool {
        self.ticks.take().is_some()
    }

    pub fn receiver(&self) -> Receiver<Instant> {
        match &self.ticks {
            Some(ticks) => ticks.clone(),
            None => channel::never(),
        }
    }
}
