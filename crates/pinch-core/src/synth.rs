//! Procedural fallback audio.
//!
//! When no music file is present each lane gets its own short tone, and a
//! miss plays a burst of noise. Everything here renders plain mono `f32`
//! buffers in [-1, 1]; the frontend owns playback and caching.

use rand::prelude::*;
use std::f32::consts::PI;

use crate::constants::{
    ERROR_NOISE_AMPLITUDE, ERROR_NOISE_DURATION_SEC, TONE_DECAY_RATE, TONE_DURATION_SEC,
    WAVETABLE_SIZE,
};
use crate::lane::Lane;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Timbre {
    /// Plain sine with an exponential decay.
    #[default]
    Sine,
    /// Electric-piano harmonics with a percussive envelope.
    Piano,
    /// Drawbar organ harmonics with a rotary wobble.
    Organ,
}

pub fn midi_to_hz(midi: f32) -> f32 {
    440.0 * (2.0_f32).powf((midi - 69.0) / 12.0)
}

/// Attack/decay/release in seconds, sustain as a level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Adsr {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl Adsr {
    pub const PIANO: Adsr = Adsr {
        attack: 0.005,
        decay: 0.3,
        sustain: 0.3,
        release: 0.4,
    };
    pub const ORGAN: Adsr = Adsr {
        attack: 0.008,
        decay: 0.02,
        sustain: 0.95,
        release: 0.08,
    };

    /// Envelope of `n` samples. Stages are capped so that very short notes
    /// still get all four of them; when even that does not fit the envelope
    /// collapses to a linear rise and an exponential fall.
    pub fn envelope(&self, n: usize, sample_rate: u32) -> Vec<f32> {
        let sr = sample_rate as f32;
        let mut env = vec![1.0f32; n];
        let attack_n = ((self.attack * sr) as usize).min(n / 4);
        let decay_n = ((self.decay * sr) as usize).min(n / 4);
        let release_n = ((self.release * sr) as usize).min(n / 3);

        let Some(sustain_n) = n.checked_sub(attack_n + decay_n + release_n) else {
            let rel = n / 2;
            let att = n - rel;
            for (i, v) in env[..att].iter_mut().enumerate() {
                *v = ramp(i, att);
            }
            for (i, v) in env[att..].iter_mut().enumerate() {
                *v = (-5.0 * ramp(i, rel)).exp();
            }
            return env;
        };

        let mut at = 0;
        for (i, v) in env[at..at + attack_n].iter_mut().enumerate() {
            *v = 1.0 - (-5.0 * ramp(i, attack_n)).exp();
        }
        at += attack_n;
        for (i, v) in env[at..at + decay_n].iter_mut().enumerate() {
            *v = self.sustain + (1.0 - self.sustain) * (-3.0 * ramp(i, decay_n)).exp();
        }
        at += decay_n;
        for v in env[at..at + sustain_n].iter_mut() {
            *v = self.sustain;
        }
        at += sustain_n;
        for (i, v) in env[at..].iter_mut().enumerate() {
            *v = self.sustain * (-4.0 * ramp(i, release_n)).exp();
        }
        env
    }
}

/// `i`-th point of an inclusive 0..1 ramp of `len` points.
#[inline]
fn ramp(i: usize, len: usize) -> f32 {
    if len <= 1 {
        0.0
    } else {
        i as f32 / (len - 1) as f32
    }
}

/// Single-cycle tables for the harmonic timbres, normalized to peak 1.
pub struct Wavetables {
    piano: Vec<f32>,
    organ: Vec<f32>,
}

impl Wavetables {
    pub fn new() -> Self {
        let build = |partials: &[(f32, f32)]| {
            let mut table: Vec<f32> = (0..WAVETABLE_SIZE)
                .map(|i| {
                    let t = 2.0 * PI * i as f32 / WAVETABLE_SIZE as f32;
                    partials.iter().map(|(mult, amp)| amp * (mult * t).sin()).sum()
                })
                .collect();
            let peak = table.iter().fold(0.0f32, |m, v| m.max(v.abs()));
            if peak > 0.0 {
                table.iter_mut().for_each(|v| *v /= peak);
            }
            table
        };
        Self {
            piano: build(&[
                (1.0, 0.6),
                (2.0, 0.25 * 0.95),
                (3.0, 0.1),
                (4.0, 0.04),
                (5.0, 0.01),
            ]),
            organ: build(&[
                (1.0, 0.4),
                (2.0, 0.3),
                (3.0, 0.15),
                (4.0, 0.1),
                (0.5, 0.15),
                (6.0, 0.05),
            ]),
        }
    }

    /// Linear-interpolated lookup; `phase` in radians, any range.
    fn read(table: &[f32], phase: f32) -> f32 {
        let size = table.len() as f32;
        let pos = (phase / (2.0 * PI) * size).rem_euclid(size);
        let i0 = pos as usize % table.len();
        let i1 = (i0 + 1) % table.len();
        let frac = pos - pos.floor();
        table[i0] * (1.0 - frac) + table[i1] * frac
    }

    /// Render a tone of `duration_sec` at `freq_hz`.
    pub fn render(
        &self,
        timbre: Timbre,
        freq_hz: f32,
        duration_sec: f32,
        sample_rate: u32,
    ) -> Vec<f32> {
        let sr = sample_rate as f32;
        let n = (duration_sec * sr) as usize;
        match timbre {
            Timbre::Sine => (0..n)
                .map(|i| {
                    let t = i as f32 / sr;
                    (2.0 * PI * freq_hz * t).sin() * (-TONE_DECAY_RATE * t).exp()
                })
                .collect(),
            Timbre::Piano => {
                let env = Adsr::PIANO.envelope(n, sample_rate);
                (0..n)
                    .map(|i| {
                        let t = i as f32 / sr;
                        let wave = Self::read(&self.piano, 2.0 * PI * freq_hz * t);
                        // subtle vibrato after 0.3s, tremolo after 0.1s
                        let vibrato =
                            1.0 + 0.002 * (t - 0.3).clamp(0.0, 1.0) * (2.0 * PI * 5.5 * t).sin();
                        let tremolo =
                            1.0 + 0.03 * (2.0 * PI * 4.0 * t).sin() * (t - 0.1).clamp(0.0, 0.5);
                        (wave * vibrato * env[i] * tremolo * 0.5).clamp(-1.0, 1.0)
                    })
                    .collect()
            }
            Timbre::Organ => {
                let env = Adsr::ORGAN.envelope(n, sample_rate);
                let leslie = 6.0;
                (0..n)
                    .map(|i| {
                        let t = i as f32 / sr;
                        let wave = Self::read(&self.organ, 2.0 * PI * freq_hz * t);
                        let vibrato = 1.0 + 0.005 * (2.0 * PI * leslie * t).sin();
                        let tremolo = 1.0 + 0.08 * (2.0 * PI * leslie * t + PI / 4.0).sin();
                        (wave * vibrato * tremolo * env[i] * 0.5 * 0.75).clamp(-1.0, 1.0)
                    })
                    .collect()
            }
        }
    }

    /// Fallback tone for a lane hit.
    pub fn lane_tone(&self, lane: Lane, timbre: Timbre, sample_rate: u32) -> Vec<f32> {
        let freq = midi_to_hz(lane.midi_note() as f32);
        self.render(timbre, freq, TONE_DURATION_SEC, sample_rate)
    }
}

impl Default for Wavetables {
    fn default() -> Self {
        Self::new()
    }
}

/// Short burst of white noise played on a miss.
pub fn error_noise(sample_rate: u32, seed: u64) -> Vec<f32> {
    let n = (ERROR_NOISE_DURATION_SEC * sample_rate as f32) as usize;
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| rng.gen_range(-1.0f32..1.0) * ERROR_NOISE_AMPLITUDE)
        .collect()
}
