//! Background music discovery and decoding.

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Looked up in this order; the first one that decodes wins. The `musica.*`
/// names are still picked up for existing track folders.
pub const MUSIC_CANDIDATES: [&str; 6] = [
    "music.mp3",
    "music.ogg",
    "music.wav",
    "musica.mp3",
    "musica.ogg",
    "musica.wav",
];

/// Fully decoded stereo track.
#[derive(Clone, Debug)]
pub struct MusicTrack {
    pub frames: Vec<[f32; 2]>,
    pub sample_rate: u32,
}

impl MusicTrack {
    pub fn duration_sec(&self) -> f32 {
        self.frames.len() as f32 / self.sample_rate.max(1) as f32
    }

    /// Linear resample to `target_rate`; the mixer plays tracks at the device
    /// rate.
    pub fn resampled(&self, target_rate: u32) -> MusicTrack {
        if target_rate == self.sample_rate || self.frames.len() < 2 {
            return self.clone();
        }
        let ratio = self.sample_rate as f64 / target_rate as f64;
        let out_len = (self.frames.len() as f64 / ratio) as usize;
        let last = self.frames.len() - 1;
        let frames = (0..out_len)
            .map(|i| {
                let pos = i as f64 * ratio;
                let i0 = (pos as usize).min(last);
                let i1 = (i0 + 1).min(last);
                let frac = (pos - i0 as f64) as f32;
                let (a, b) = (self.frames[i0], self.frames[i1]);
                [
                    a[0] + (b[0] - a[0]) * frac,
                    a[1] + (b[1] - a[1]) * frac,
                ]
            })
            .collect();
        MusicTrack {
            frames,
            sample_rate: target_rate,
        }
    }
}

pub fn decode_file(path: &Path) -> Result<MusicTrack, SymphoniaError> {
    let file = File::open(path).map_err(SymphoniaError::from)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.sample_rate.is_some())
        .ok_or(SymphoniaError::Unsupported("no audio track"))?
        .clone();
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or(SymphoniaError::Unsupported("no sample rate"))?;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut frames: Vec<[f32; 2]> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(p) => p,
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(e),
        };
        if packet.track_id() != track.id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            // a corrupt packet is skipped, not fatal
            Err(SymphoniaError::DecodeError(msg)) => {
                log::debug!("[music] skipping packet: {msg}");
                continue;
            }
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(e),
        };
        let spec = *decoded.spec();
        let chans = spec.channels.count().max(1);
        let mut buf = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        buf.copy_interleaved_ref(decoded);
        for frame in buf.samples().chunks(chans) {
            let l = frame[0];
            let r = if chans > 1 { frame[1] } else { l };
            frames.push([l, r]);
        }
    }

    if frames.is_empty() {
        return Err(SymphoniaError::Unsupported("no decodable audio"));
    }
    Ok(MusicTrack {
        frames,
        sample_rate,
    })
}

/// Find and decode the first usable music file in `dir`.
///
/// Missing files are expected and logged at info; a file that exists but
/// fails to decode is logged at warn and the next candidate is tried.
pub fn discover(dir: &Path) -> Option<MusicTrack> {
    for name in MUSIC_CANDIDATES {
        let path = dir.join(name);
        if !path.is_file() {
            continue;
        }
        match decode_file(&path) {
            Ok(track) => {
                log::info!(
                    "[music] loaded {} ({:.1}s @ {} Hz)",
                    path.display(),
                    track.duration_sec(),
                    track.sample_rate
                );
                return Some(track);
            }
            Err(err) => log::warn!("[music] could not decode {}: {err}", path.display()),
        }
    }
    log::info!("[music] no music file found, using synthesized lane tones");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Minimal 16-bit PCM mono WAV.
    fn write_wav(path: &Path, sample_rate: u32, samples: &[i16]) {
        let data_len = (samples.len() * 2) as u32;
        let mut bytes = Vec::with_capacity(44 + data_len as usize);
        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
        bytes.extend_from_slice(b"WAVEfmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes()); // PCM
        bytes.extend_from_slice(&1u16.to_le_bytes()); // mono
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        bytes.extend_from_slice(&2u16.to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        let mut f = File::create(path).unwrap();
        f.write_all(&bytes).unwrap();
    }

    #[test]
    fn empty_dir_has_no_music() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover(dir.path()).is_none());
    }

    #[test]
    fn undecodable_candidate_falls_through_to_next() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("music.mp3"), b"definitely not audio").unwrap();
        let samples: Vec<i16> = (0..800).map(|i| ((i % 40) as i16 - 20) * 500).collect();
        write_wav(&dir.path().join("music.wav"), 8_000, &samples);

        let track = discover(dir.path()).expect("wav should load");
        assert_eq!(track.sample_rate, 8_000);
        assert_eq!(track.frames.len(), 800);
        assert!(track.frames.iter().all(|[l, r]| l == r));
    }

    #[test]
    fn legacy_musica_name_is_found() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<i16> = vec![1_000; 400];
        write_wav(&dir.path().join("musica.wav"), 8_000, &samples);

        let track = discover(dir.path()).expect("musica.wav should load");
        assert_eq!(track.frames.len(), 400);
    }

    #[test]
    fn resampling_scales_length() {
        let track = MusicTrack {
            frames: vec![[0.5, -0.5]; 1_000],
            sample_rate: 22_050,
        };
        let up = track.resampled(44_100);
        assert_eq!(up.sample_rate, 44_100);
        assert_eq!(up.frames.len(), 2_000);
        assert!(up.frames.iter().all(|f| (f[0] - 0.5).abs() < 1e-6));
        assert!((up.duration_sec() - track.duration_sec()).abs() < 1e-3);
    }
}
