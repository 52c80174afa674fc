use serde::{Deserialize, Serialize};

use super::Instrument;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ADSRConfig {
    /// Seconds
    pub attack: f32,
    /// Seconds
    pub decay: f32,
    /// 0.0 -> 1.0
    pub sustain: f32,
    /// Seconds
    pub release: f32,
}

impl Default for ADSRConfig {
    fn default() -> Self {
        Self {
            attack: 0.005,
            decay: 0.08,
            sustain: 0.6,
            release: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnvelopeState {
    Attack { time: f32 },
    Decay { time: f32 },
    Sustain,
    Release { time: f32, from: f32 },
}

/// A single sounding note. Each pitch owns at most one.
#[derive(Debug, Clone)]
pub struct Voice {
    pub frequency: f32,
    pub envelope_state: EnvelopeState,
    pub envelope_level: f32,
    pub oscillator_phases: Vec<f32>,
    /// Seconds since the trigger.
    pub age: f32,
}

impl Voice {
    pub fn new(frequency: f32, num_oscillators: usize) -> Self {
        Self {
            frequency,
            envelope_state: EnvelopeState::Attack { time: 0.0 },
            envelope_level: 0.0,
            oscillator_phases: vec![0.0; num_oscillators],
            age: 0.0,
        }
    }

    pub fn render_sample(&mut self, instrument: &Instrument, sample_rate: f32) -> f32 {
        let envelope = calculate_envelope(self, &instrument.adsr);
        let mut output = 0.0;

        for (osc, phase) in instrument
            .oscillators
            .iter()
            .zip(self.oscillator_phases.iter_mut())
        {
            let freq = self.frequency * 2.0_f32.powf(osc.semitone as f32 / 12.0);
            output += osc.wave.sample(*phase) * osc.gain;

            *phase += freq / sample_rate;
            if *phase >= 1.0 {
                *phase -= 1.0;
            }
        }

        advance_envelope(self, instrument, 1.0 / sample_rate);
        output * envelope
    }

    pub fn is_finished(&self, adsr: &ADSRConfig) -> bool {
        matches!(self.envelope_state, EnvelopeState::Release { time, .. } if time >= adsr.release)
    }
}

pub fn calculate_envelope(voice: &Voice, adsr: &ADSRConfig) -> f32 {
    match &voice.envelope_state {
        EnvelopeState::Attack { time } => {
            if adsr.attack == 0.0 {
                1.0
            } else {
                (time / adsr.attack).min(1.0)
            }
        }
        EnvelopeState::Decay { time } => {
            let decay_progress = if adsr.decay == 0.0 {
                1.0
            } else {
                (time / adsr.decay).min(1.0)
            };
            1.0 - (1.0 - adsr.sustain) * decay_progress
        }
        EnvelopeState::Sustain => adsr.sustain,
        EnvelopeState::Release { time, from } => {
            let release_progress = if adsr.release == 0.0 {
                1.0
            } else {
                (time / adsr.release).min(1.0)
            };
            from * (1.0 - release_progress)
        }
    }
}

/// Moves the envelope forward by `dt` seconds and releases the voice once
/// the instrument's gate has elapsed.
pub fn advance_envelope(voice: &mut Voice, instrument: &Instrument, dt: f32) {
    let adsr = &instrument.adsr;
    voice.age += dt;

    match &mut voice.envelope_state {
        EnvelopeState::Attack { time } => {
            *time += dt;
            if *time >= adsr.attack {
                voice.envelope_state = EnvelopeState::Decay { time: 0.0 };
                voice.envelope_level = 1.0;
            } else {
                voice.envelope_level = calculate_envelope(voice, adsr);
            }
        }
        EnvelopeState::Decay { time } => {
            *time += dt;
            if *time >= adsr.decay {
                voice.envelope_state = EnvelopeState::Sustain;
                voice.envelope_level = adsr.sustain;
            } else {
                voice.envelope_level = calculate_envelope(voice, adsr);
            }
        }
        EnvelopeState::Sustain => {
            voice.envelope_level = adsr.sustain;
        }
        EnvelopeState::Release { time, .. } => {
            *time += dt;
            voice.envelope_level = calculate_envelope(voice, adsr);
            return;
        }
    }

    if voice.age >= instrument.gate {
        voice.envelope_state = EnvelopeState::Release {
            time: 0.0,
            from: voice.envelope_level,
        };
    }
}
