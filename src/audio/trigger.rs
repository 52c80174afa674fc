use std::sync::Arc;

use parking_lot::Mutex;

use crate::grid::PitchClass;

/// Starts the sound for a pitch. Fire and forget: implementations must not
/// block and have no way to report failure back to the caller.
pub trait SoundTrigger {
    fn play(&mut self, pitch: PitchClass);
}

impl<T: SoundTrigger + ?Sized> SoundTrigger for Box<T> {
    fn play(&mut self, pitch: PitchClass) {
        (**self).play(pitch);
    }
}

/// Swallows every trigger.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl SoundTrigger for Silent {
    fn play(&mut self, _pitch: PitchClass) {}
}

/// Remembers every pitch it was asked to play. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingTrigger {
    calls: Arc<Mutex<Vec<PitchClass>>>,
}

impl RecordingTrigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<PitchClass> {
        self.calls.lock().clone()
    }

    pub fn count(&self, pitch: PitchClass) -> usize {
        self.calls.lock().iter().filter(|p| **p == pitch).count()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl SoundTrigger for RecordingTrigger {
    fn play(&mut self, pitch: PitchClass) {
        self.calls.lock().push(pitch);
    }
}
