use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::audio::SoundTrigger;
use crate::events::{Event, StopReason};
use crate::grid::{BlockId, PlacementStore};

/// Seconds between two ticks.
pub const TICK_PERIOD: f32 = 0.01;
/// Grid units the playhead covers per second.
pub const PLAY_SPEED: f32 = 100.0;
/// Playback stops once the playhead passes this offset.
pub const TRACK_WIDTH: f32 = 400.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub tick_period: f32,
    pub speed: f32,
    pub track_width: f32,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tick_period: TICK_PERIOD,
            speed: PLAY_SPEED,
            track_width: TRACK_WIDTH,
        }
    }
}

impl TransportConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs_f32(self.tick_period)
    }

    /// Playhead advance per tick.
    pub fn step(&self) -> f32 {
        self.speed * self.tick_period
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stopped,
    Running,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackState {
    pub transport: Transport,
    pub playhead: f32,
}

impl PlaybackState {
    pub fn is_running(&self) -> bool {
        self.transport == Transport::Running
    }
}

/// Moves the playhead across the grid and fires every block it crosses once per run.
pub struct Scheduler<S> {
    config: TransportConfig,
    sound: S,
    state: PlaybackState,
}

impl<S: SoundTrigger> Scheduler<S> {
    pub fn new(config: TransportConfig, sound: S) -> Self {
        Self {
            config,
            sound,
            state: PlaybackState {
                transport: Transport::Stopped,
                playhead: 0.0,
            },
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn playhead(&self) -> f32 {
        self.state.playhead
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn sound(&self) -> &S {
        &self.sound
    }

    /// Rewinds the playhead and clears every trigger flag. Returns `false`
    /// without touching anything when already running.
    pub fn start(&mut self, store: &mut PlacementStore) -> bool {
        if self.is_running() {
            return false;
        }
        store.reset_triggered();
        self.state = PlaybackState {
            transport: Transport::Running,
            playhead: 0.0,
        };
        info!("playback started");
        true
    }

    pub fn stop(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        self.state.transport = Transport::Stopped;
        info!(playhead = self.state.playhead, "playback stopped");
        true
    }

    /// Returns whether playback is running afterwards.
    pub fn toggle(&mut self, store: &mut PlacementStore) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            self.start(store);
        }
        self.is_running()
    }

    pub fn tick(&mut self, store: &mut PlacementStore) -> Vec<Event> {
        if !self.is_running() {
            return Vec::new();
        }

        self.state.playhead += self.config.step();
        let playhead = self.state.playhead;
        trace!(playhead, "tick");

        let mut events = vec![Event::PlayheadMoved { position: playhead }];

        if playhead > self.config.track_width {
            self.state.transport = Transport::Stopped;
            info!(playhead, "playhead reached end of track");
            events.push(Event::Stopped {
                reason: StopReason::TrackEnd,
            });
            return events;
        }

        let geometry = *store.geometry();
        let crossed: Vec<BlockId> = store
            .notes_near(playhead, |y| geometry.is_on_row(y))
            .filter(|block| !block.triggered)
            .map(|block| block.id)
            .collect();

        for id in crossed {
            if let Some(pitch) = store.mark_triggered(id) {
                debug!(%id, %pitch, playhead, "note triggered");
                self.sound.play(pitch);
                events.push(Event::NoteTriggered { id, pitch });
            }
        }

        events
    }
}
