// ---------------- Native audio (cpal) ----------------
//
// One output stream mixes the looping background track (scaled by the
// session volume) with one-shot voices: lane tones when no track is loaded,
// and the noise burst on a miss.

use std::sync::{Arc, Mutex};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SizedSample};
use fnv::FnvHashMap;
use pinch_core::{error_noise, Lane, Timbre, Wavetables, DEFAULT_SEED, VOLUME_LOW};

use crate::music_file::MusicTrack;

const MAX_VOICES: usize = 16;

#[derive(Clone)]
struct Voice {
    samples: Arc<[f32]>,
    pos: usize,
    gain: f32,
}

struct MusicLoop {
    frames: Vec<[f32; 2]>,
    pos: usize,
}

/// Everything the audio callback reads; shared with the game loop.
pub struct Mixer {
    music: Option<MusicLoop>,
    music_volume: f32,
    voices: Vec<Voice>,
}

impl Mixer {
    pub fn new(music: Option<MusicTrack>) -> Self {
        Self {
            music: music.map(|t| MusicLoop {
                frames: t.frames,
                pos: 0,
            }),
            music_volume: VOLUME_LOW,
            voices: Vec::new(),
        }
    }

    pub fn has_music(&self) -> bool {
        self.music.is_some()
    }

    pub fn set_music_volume(&mut self, volume: f32) {
        self.music_volume = volume.clamp(0.0, 1.0);
    }

    pub fn play(&mut self, samples: Arc<[f32]>, gain: f32) {
        if self.voices.len() >= MAX_VOICES {
            // drop the oldest
            self.voices.remove(0);
        }
        self.voices.push(Voice {
            samples,
            pos: 0,
            gain,
        });
    }

    /// Next stereo frame, soft-clipped.
    pub fn next_frame(&mut self) -> (f32, f32) {
        let (mut left, mut right) = (0.0f32, 0.0f32);
        if let Some(music) = self.music.as_mut() {
            if !music.frames.is_empty() {
                let [l, r] = music.frames[music.pos];
                left += l * self.music_volume;
                right += r * self.music_volume;
                music.pos = (music.pos + 1) % music.frames.len();
            }
        }
        let mut i = 0usize;
        while i < self.voices.len() {
            let voice = &mut self.voices[i];
            let s = voice.samples[voice.pos] * voice.gain;
            left += s;
            right += s;
            voice.pos += 1;
            if voice.pos >= voice.samples.len() {
                self.voices.swap_remove(i);
                continue;
            }
            i += 1;
        }
        (left.tanh(), right.tanh())
    }
}

/// Cached one-shot buffers at the device rate.
pub struct SoundBank {
    sample_rate: u32,
    timbre: Timbre,
    wavetables: Wavetables,
    tones: FnvHashMap<(Lane, Timbre), Arc<[f32]>>,
    noise: Arc<[f32]>,
}

impl SoundBank {
    pub fn new(sample_rate: u32, timbre: Timbre) -> Self {
        Self {
            sample_rate,
            timbre,
            wavetables: Wavetables::new(),
            tones: FnvHashMap::default(),
            noise: error_noise(sample_rate, DEFAULT_SEED).into(),
        }
    }

    pub fn lane_tone(&mut self, lane: Lane) -> Arc<[f32]> {
        let (sr, timbre) = (self.sample_rate, self.timbre);
        let tables = &self.wavetables;
        self.tones
            .entry((lane, timbre))
            .or_insert_with(|| tables.lane_tone(lane, timbre, sr).into())
            .clone()
    }

    pub fn noise(&self) -> Arc<[f32]> {
        Arc::clone(&self.noise)
    }
}

/// Live output device. Dropping it stops the stream.
pub struct AudioOutput {
    mixer: Arc<Mutex<Mixer>>,
    bank: SoundBank,
    _stream: cpal::Stream,
}

impl AudioOutput {
    /// Open the default output device. Returns `None` (after a warning) when
    /// there is no usable device; the game then runs silently.
    pub fn start(music: Option<MusicTrack>, timbre: Timbre) -> Option<Self> {
        match Self::try_start(music, timbre) {
            Ok(out) => Some(out),
            Err(err) => {
                log::warn!("[audio] output unavailable, running silent: {err:#}");
                None
            }
        }
    }

    fn try_start(music: Option<MusicTrack>, timbre: Timbre) -> anyhow::Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow::anyhow!("no default output device"))?;
        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;

        let music = music.map(|t| t.resampled(sample_rate));
        let mixer = Arc::new(Mutex::new(Mixer::new(music)));

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config.into(), channels, Arc::clone(&mixer))?
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config.into(), channels, Arc::clone(&mixer))?
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config.into(), channels, Arc::clone(&mixer))?
            }
            other => anyhow::bail!("unsupported sample format {other:?}"),
        };
        stream.play()?;
        log::info!("[audio] output at {sample_rate} Hz, {channels} channel(s)");

        Ok(Self {
            mixer,
            bank: SoundBank::new(sample_rate, timbre),
            _stream: stream,
        })
    }

    pub fn has_music(&self) -> bool {
        self.mixer.lock().map(|m| m.has_music()).unwrap_or(false)
    }

    pub fn set_music_volume(&self, volume: f32) {
        if let Ok(mut m) = self.mixer.lock() {
            m.set_music_volume(volume);
        }
    }

    /// Lane tone for a hit, used only when no music track is playing.
    pub fn play_lane(&mut self, lane: Lane) {
        let tone = self.bank.lane_tone(lane);
        if let Ok(mut m) = self.mixer.lock() {
            m.play(tone, 0.5);
        }
    }

    pub fn play_error(&self) {
        let noise = self.bank.noise();
        if let Ok(mut m) = self.mixer.lock() {
            m.play(noise, 1.0);
        }
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mixer: Arc<Mutex<Mixer>>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + FromSample<f32>,
{
    let err_fn = |err: cpal::StreamError| log::error!("[audio] stream error: {err}");
    device.build_output_stream(
        config,
        move |data: &mut [T], _| {
            let Ok(mut mixer) = mixer.lock() else {
                data.fill(T::EQUILIBRIUM);
                return;
            };
            for frame in data.chunks_mut(channels.max(1)) {
                let (l, r) = mixer.next_frame();
                match frame {
                    [mono] => *mono = T::from_sample(0.5 * (l + r)),
                    [left, right, rest @ ..] => {
                        *left = T::from_sample(l);
                        *right = T::from_sample(r);
                        rest.fill(T::EQUILIBRIUM);
                    }
                    [] => {}
                }
            }
        },
        err_fn,
        None,
    )
}
