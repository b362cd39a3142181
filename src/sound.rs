//! Sound effects, synthesized with fundsp and played through a rodio mixer.

use fundsp::prelude::*;
use rodio::Sink;
use rodio::buffer::SamplesBuffer;
use rodio::mixer::Mixer;

const SAMPLE_RATE: u32 = 44100;

/// Short rising blip for a scored gate.
pub fn play_score(mixer: &Mixer) {
    // 660Hz to 990Hz over 0.08s, gain fading out over 0.12s
    let freq = lfo(|t: f64| lerp(660.0, 990.0, (t / 0.08).min(1.0)));
    let gain = lfo(|t: f64| lerp(0.12, 0.0, (t / 0.12).min(1.0)));
    play(mixer, (freq >> sine::<f64>()) * gain, 0.15);
}

/// Falling sawtooth sweep for the crash.
pub fn play_death(mixer: &Mixer) {
    // 400Hz to 80Hz over 0.4s, gain fading out over 0.5s
    let freq = lfo(|t: f64| lerp(400.0, 80.0, (t / 0.4).min(1.0)));
    let gain = lfo(|t: f64| lerp(0.15, 0.0, (t / 0.5).min(1.0)));
    play(mixer, (freq >> saw()) * gain, 0.5);
}

/// Render a mono unit to a sample buffer and hand it to a detached sink so
/// it plays in the background.
fn play(mixer: &Mixer, mut unit: impl AudioUnit, seconds: f64) {
    unit.set_sample_rate(SAMPLE_RATE as f64);
    let n = (seconds * SAMPLE_RATE as f64) as usize;
    let samples: Vec<f32> = (0..n).map(|_| unit.get_mono()).collect();

    let sink = Sink::connect_new(mixer);
    sink.append(SamplesBuffer::new(1, SAMPLE_RATE, samples));
    sink.detach();
}
