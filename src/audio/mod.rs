mod instrument;
mod output;
mod trigger;
mod voice;

pub use instrument::{AudioConfig, Instrument, OscConfig, Wave};
pub use output::{AudioError, ToneOutput, ToneTrigger};
pub use trigger::{RecordingTrigger, Silent, SoundTrigger};
pub use voice::{ADSRConfig, EnvelopeState, Voice};

pub fn midi_to_freq(note: u8) -> f32 {
    440.0 * 2.0_f32.powf((note as f32 - 69.0) / 12.0)
}
