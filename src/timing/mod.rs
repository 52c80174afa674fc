mod scheduler;
mod ticker;

pub use scheduler::{
    PLAY_SPEED, PlaybackState, Scheduler, TICK_PERIOD, TRACK_WIDTH, Transport, TransportConfig,
};
pub use ticker::Ticker;
