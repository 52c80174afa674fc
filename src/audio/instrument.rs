use serde::{Deserialize, Serialize};

use super::ADSRConfig;
use crate::grid::PitchClass;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Wave {
    Sine,
    Square,
    Saw,
}

impl Wave {
    /// One sample of the waveform at `phase` in `[0, 1)`.
    pub fn sample(self, phase: f32) -> f32 {
        match self {
            Wave::Sine => (phase * 2.0 * std::f32::consts::PI).sin(),
            Wave::Square => {
                if phase < 0.5 {
                    -1.0
                } else {
                    1.0
                }
            }
            Wave::Saw => phase * 2.0 - 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscConfig {
    pub wave: Wave,
    pub gain: f32,
    pub semitone: i8,
}

/// The tone every pitch is played with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Instrument {
    pub oscillators: Vec<OscConfig>,
    pub adsr: ADSRConfig,
    /// Seconds a triggered note holds before it is released.
    pub gate: f32,
    pub octave: u8,
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            oscillators: vec![
                OscConfig {
                    wave: Wave::Sine,
                    gain: 0.6,
                    semitone: 0,
                },
                OscConfig {
                    wave: Wave::Saw,
                    gain: 0.15,
                    semitone: 12,
                },
            ],
            adsr: ADSRConfig::default(),
            gate: 0.25,
            octave: 4,
        }
    }
}

impl Instrument {
    pub fn frequency(&self, pitch: PitchClass) -> f32 {
        let note = (self.octave as u16 + 1) * 12 + pitch.semitone() as u16;
        super::midi_to_freq(note.min(127) as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    pub volume: f32,
    /// Capacity of the trigger queue between the engine and the audio callback.
    pub queue_capacity: usize,
    pub instrument: Instrument,
    /// Pitches without a sound. Triggers for them are ignored.
    pub muted: Vec<PitchClass>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            volume: 0.5,
            queue_capacity: 256,
            instrument: Instrument::default(),
            muted: Vec::new(),
        }
    }
}
