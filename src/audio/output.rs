use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use ringbuf::{
    HeapCons, HeapProd, HeapRb,
    traits::{Consumer, Producer, Split},
};
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use super::{AudioConfig, Instrument, SoundTrigger, Voice};
use crate::grid::PitchClass;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("no audio output device available")]
    NoDevice,
    #[error("failed to query output config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Keeps the output stream alive. Dropping it silences playback.
pub struct ToneOutput {
    _stream: cpal::Stream,
}

/// Sending half of the tone output; owned by whoever fires notes.
pub struct ToneTrigger {
    producer: HeapProd<PitchClass>,
}

impl SoundTrigger for ToneTrigger {
    fn play(&mut self, pitch: PitchClass) {
        if self.producer.try_push(pitch).is_err() {
            warn!(%pitch, "trigger queue full, dropping note");
        }
    }
}

impl ToneOutput {
    pub fn open(config: &AudioConfig) -> Result<(ToneOutput, ToneTrigger), AudioError> {
        let ring_buffer = HeapRb::<PitchClass>::new(config.queue_capacity.max(1));
        let (producer, consumer) = ring_buffer.split();

        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;
        let stream_config: cpal::StreamConfig = device.default_output_config()?.into();

        let num_channels = stream_config.channels as usize;
        let sample_rate = stream_config.sample_rate;
        info!(channels = num_channels, sample_rate, "audio output opened");

        let mut state = ToneState::new(config, consumer, num_channels, sample_rate);

        let stream = device.build_output_stream(
            &stream_config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                state.render(data);
            },
            |err| warn!("audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        Ok((ToneOutput { _stream: stream }, ToneTrigger { producer }))
    }
}

/// Everything the audio callback owns.
struct ToneState {
    consumer: HeapCons<PitchClass>,
    instrument: Instrument,
    /// Frequency per pitch class; `None` when the pitch has no sound.
    bank: [Option<f32>; 12],
    voices: [Option<Voice>; 12],
    volume: f32,
    sample_rate: f32,
    num_channels: usize,
}

impl ToneState {
    fn new(
        config: &AudioConfig,
        consumer: HeapCons<PitchClass>,
        num_channels: usize,
        sample_rate: u32,
    ) -> Self {
        let instrument = config.instrument.clone();
        let bank = PitchClass::ALL.map(|pitch| {
            (!config.muted.contains(&pitch)).then(|| instrument.frequency(pitch))
        });

        Self {
            consumer,
            instrument,
            bank,
            voices: std::array::from_fn(|_| None),
            volume: config.volume,
            sample_rate: sample_rate.max(1) as f32,
            num_channels: num_channels.max(1),
        }
    }

    fn retrigger(&mut self, pitch: PitchClass) {
        let slot = pitch.semitone() as usize;
        match self.bank[slot] {
            Some(frequency) => {
                trace!(%pitch, frequency, "voice restarted");
                self.voices[slot] = Some(Voice::new(
                    frequency,
                    self.instrument.oscillators.len(),
                ));
            }
            None => debug!(%pitch, "no sound for pitch"),
        }
    }

    fn render(&mut self, data: &mut [f32]) {
        while let Some(pitch) = self.consumer.try_pop() {
            self.retrigger(pitch);
        }

        data.fill(0.0);

        for frame in data.chunks_mut(self.num_channels) {
            let mut sample = 0.0;
            for voice in self.voices.iter_mut() {
                if let Some(active) = voice {
                    sample += active.render_sample(&self.instrument, self.sample_rate);
                    if active.is_finished(&self.instrument.adsr) {
                        *voice = None;
                    }
                }
            }

            let sample = (sample * self.volume).clamp(-1.0, 1.0);
            frame.fill(sample);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_at(config: &AudioConfig, sample_rate: u32) -> (ToneState, ToneTrigger) {
        let (producer, consumer) = HeapRb::<PitchClass>::new(config.queue_capacity).split();
        (
            ToneState::new(config, consumer, 2, sample_rate),
            ToneTrigger { producer },
        )
    }

    fn state(config: &AudioConfig) -> (ToneState, ToneTrigger) {
        state_at(config, 44100)
    }

    #[test]
    fn test_phase_follows_device_rate() {
        let config = AudioConfig::default();
        let (mut state, mut trigger) = state_at(&config, 48000);
        let frequency = config.instrument.frequency(PitchClass::A);

        trigger.play(PitchClass::A);
        state.render(&mut [0.0; 2]);

        let voice = state.voices[PitchClass::A.semitone() as usize]
            .as_ref()
            .unwrap();
        assert_eq!(config.instrument.oscillators[0].semitone, 0);
        assert!((voice.oscillator_phases[0] - frequency / 48000.0).abs() < 1e-7);
        assert!((voice.age - 1.0 / 48000.0).abs() < 1e-9);
    }

    #[test]
    fn test_trigger_starts_one_voice_per_pitch() {
        let config = AudioConfig::default();
        let (mut state, mut trigger) = state(&config);

        trigger.play(PitchClass::C);
        trigger.play(PitchClass::C);
        trigger.play(PitchClass::E);

        let mut buffer = vec![0.0; 256];
        state.render(&mut buffer);

        let active = state.voices.iter().filter(|voice| voice.is_some()).count();
        assert_eq!(active, 2);
        assert!(buffer.iter().any(|sample| *sample != 0.0));
        assert!(buffer.chunks(2).all(|frame| frame[0] == frame[1]));
    }

    #[test]
    fn test_retrigger_restarts_voice() {
        let config = AudioConfig::default();
        let (mut state, mut trigger) = state(&config);

        trigger.play(PitchClass::G);
        let mut buffer = vec![0.0; 512];
        state.render(&mut buffer);
        let aged = state.voices[PitchClass::G.semitone() as usize]
            .as_ref()
            .map(|voice| voice.age)
            .unwrap();
        assert!(aged > 0.0);

        trigger.play(PitchClass::G);
        state.render(&mut buffer[..2]);
        let restarted = state.voices[PitchClass::G.semitone() as usize]
            .as_ref()
            .map(|voice| voice.age)
            .unwrap();
        assert!(restarted < aged);
    }

    #[test]
    fn test_muted_pitch_is_ignored() {
        let config = AudioConfig {
            muted: vec![PitchClass::FSharp],
            ..Default::default()
        };
        let (mut state, mut trigger) = state(&config);

        trigger.play(PitchClass::FSharp);
        let mut buffer = vec![1.0; 64];
        state.render(&mut buffer);

        assert!(state.voices.iter().all(|voice| voice.is_none()));
        assert!(buffer.iter().all(|sample| *sample == 0.0));
    }

    #[test]
    fn test_full_queue_drops_trigger() {
        let config = AudioConfig {
            queue_capacity: 1,
            ..Default::default()
        };
        let (mut state, mut trigger) = state(&config);

        trigger.play(PitchClass::A);
        trigger.play(PitchClass::B);
        state.render(&mut [0.0; 8]);

        assert!(state.voices[PitchClass::A.semitone() as usize].is_some());
        assert!(state.voices[PitchClass::B.semitone() as usize].is_none());
    }
}
