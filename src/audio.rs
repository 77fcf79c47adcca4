use fundsp::prelude::*;
use rodio::{OutputStream, OutputStreamBuilder, Sink, buffer::SamplesBuffer};

use crate::error::{GameError, GameResult};

const SAMPLE_RATE: u32 = 44_100;
const CRASH_SECS: f64 = 0.5;

// ── Sounds ──────────────────────────────────────────────────────────────────

/// Maps `[0, 1]` progress onto the `[-1, 1]` input `lerp11` expects.
fn ramp(t: f64, secs: f64) -> f64 {
    (t / secs).min(1.0) * 2.0 - 1.0
}

/// Falling sawtooth: 400Hz down to 80Hz over 0.4s, fading out over 0.5s.
pub fn crash_samples() -> Vec<f32> {
    let freq = lfo(|t: f64| lerp11(400.0, 80.0, ramp(t, 0.4)));
    let gain = lfo(|t: f64| lerp11(0.15, 0.0, ramp(t, CRASH_SECS)));
    let mut sound = (freq >> saw()) * gain;
    sound.set_sample_rate(SAMPLE_RATE as f64);

    let len = (SAMPLE_RATE as f64 * CRASH_SECS) as usize;
    (0..len).map(|_| sound.get_mono() as f32).collect()
}

/// Open output device. Dropping it silences everything.
pub struct Audio {
    stream: OutputStream,
}

impl Audio {
    pub fn open() -> GameResult<Self> {
        let mut stream =
            OutputStreamBuilder::open_default_stream().map_err(|e| GameError::Audio(e.to_string()))?;
        stream.log_on_drop(false);
        Ok(Self { stream })
    }

    pub fn play_crash(&self) {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(SamplesBuffer::new(1, SAMPLE_RATE, crash_samples()));
        sink.detach(); // Play in background
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crash_sound_fades_out() {
        let samples = crash_samples();
        assert_eq!(samples.len(), 22_050);
        assert!(samples.iter().all(|s| s.is_finite() && s.abs() <= 0.2));

        let loudest = |chunk: &[f32]| chunk.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        let head = loudest(&samples[..4_000]);
        let tail = loudest(&samples[samples.len() - 500..]);
        assert!(head > 0.01);
        assert!(tail < head);
    }
}
