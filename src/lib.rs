//! Playback core of a grid step sequencer: note blocks sit on a grid of rows
//! and a playhead sweeping left to right fires each block once per pass.

pub mod audio;
pub mod config;
pub mod engine;
pub mod events;
pub mod grid;
pub mod timing;

pub use audio::{RecordingTrigger, Silent, SoundTrigger, ToneOutput};
pub use config::{Config, ConfigError};
pub use engine::{
    Board, EngineCommand, EngineHandle, EngineUpdate, UPDATE_CAPACITY, spawn_engine,
};
pub use events::{Event, StopReason};
pub use grid::{BlockId, NoteBlock, PitchClass, Placement, PlacementStore, Position};
pub use timing::{Scheduler, Ticker};
