//! Synthesized sound effects.
//!
//! Effects are rendered once into sample buffers with fundsp and handed to a
//! fresh rodio sink per play, so playback never blocks the frame loop.

use fundsp::prelude::*;
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

use crate::error::AudioError;

const SAMPLE_RATE: u32 = 44_100;

/// Render `seconds` of a mono unit into samples.
fn render(unit: &mut dyn AudioUnit, seconds: f64) -> Vec<f32> {
    unit.set_sample_rate(SAMPLE_RATE as f64);
    let n = (SAMPLE_RATE as f64 * seconds) as usize;
    (0..n).map(|_| unit.get_mono() as f32).collect()
}

/// Falling sawtooth: 400Hz to 80Hz over 0.4s, fading out over 0.5s.
pub fn death_samples() -> Vec<f32> {
    let freq = lfo(|t: f32| 400.0 + (80.0 - 400.0) * (t / 0.4).min(1.0));
    let gain = lfo(|t: f32| 0.15 * (1.0 - (t / 0.5).min(1.0)));
    let mut sound = (freq >> saw()) * gain;
    render(&mut sound, 0.5)
}

/// Two-note rising blip for a passed pipe.
pub fn score_samples() -> Vec<f32> {
    let freq = lfo(|t: f32| if t < 0.05 { 660.0 } else { 990.0 });
    let gain = lfo(|t: f32| 0.1 * (1.0 - (t / 0.12).min(1.0)));
    let mut sound = (freq >> sine::<f32>()) * gain;
    render(&mut sound, 0.12)
}

pub struct Audio {
    // Dropping the stream silences every sink.
    _stream: OutputStream,
    handle: OutputStreamHandle,
    death: Vec<f32>,
    score: Vec<f32>,
}

impl Audio {
    pub fn open() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        Ok(Self {
            _stream: stream,
            handle,
            death: death_samples(),
            score: score_samples(),
        })
    }

    pub fn play_death(&self) -> Result<(), AudioError> {
        self.play(&self.death)
    }

    pub fn play_score(&self) -> Result<(), AudioError> {
        self.play(&self.score)
    }

    fn play(&self, samples: &[f32]) -> Result<(), AudioError> {
        let sink = Sink::try_new(&self.handle)?;
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec()));
        sink.detach(); // Play in background
        Ok(())
    }
}
