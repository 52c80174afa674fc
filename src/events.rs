use crate::grid::{BlockId, PitchClass};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Command,
    TrackEnd,
}

/// What a scheduler tick or transport change produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    PlayheadMoved { position: f32 },
    NoteTriggered { id: BlockId, pitch: PitchClass },
    Started,
    Stopped { reason: StopReason },
}
