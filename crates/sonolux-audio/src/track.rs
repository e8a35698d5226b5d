//! Music track loading and looping playback fill.

use crate::Result;
use std::path::Path;
use tracing::info;

/// A fully decoded music track: interleaved 16-bit samples plus the
/// metadata the output stream needs. The track loops forever during
/// playback; the read position lives here so the data callback only has
/// to hand over its output buffer.
pub struct MusicTrack {
    samples: Vec<i16>,
    channels: u16,
    sample_rate: u32,
    position: usize,
}

impl MusicTrack {
    /// Loads a WAV file and decodes it to interleaved 16-bit samples.
    ///
    /// Integer WAVs wider than 16 bits are shifted down; float WAVs are
    /// scaled to full 16-bit range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path)?;
        let spec = reader.spec();

        let samples: Vec<i16> = match spec.sample_format {
            hound::SampleFormat::Int => {
                if spec.bits_per_sample <= 16 {
                    reader.samples::<i16>().collect::<hound::Result<_>>()?
                } else {
                    let shift = spec.bits_per_sample - 16;
                    reader
                        .samples::<i32>()
                        .map(|s| s.map(|s| (s >> shift) as i16))
                        .collect::<hound::Result<_>>()?
                }
            }
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16))
                .collect::<hound::Result<_>>()?,
        };

        let track = Self::from_samples(samples, spec.channels, spec.sample_rate);
        info!(
            "Loaded music track {:?}: {} ch, {} Hz, {:.1} s",
            path,
            track.channels(),
            track.sample_rate(),
            track.duration_secs()
        );
        Ok(track)
    }

    /// Builds a track from already decoded samples. A trailing partial
    /// frame is dropped so the loop cursor always stays frame aligned.
    pub fn from_samples(mut samples: Vec<i16>, channels: u16, sample_rate: u32) -> Self {
        let channels = channels.max(1);
        let whole = samples.len() - samples.len() % channels as usize;
        samples.truncate(whole);
        Self {
            samples,
            channels,
            sample_rate,
            position: 0,
        }
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total number of samples across all channels.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the track holds no samples at all.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Track length in seconds.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        let frames = self.samples.len() / self.channels as usize;
        frames as f64 / self.sample_rate as f64
    }

    /// Fills `out` with the next interleaved samples, wrapping back to the
    /// start of the track when the end is reached.
    ///
    /// `out_channels` is the stream's channel count; when it differs from
    /// the track's, channels are duplicated or dropped frame by frame. An
    /// empty track fills silence.
    pub fn fill_next(&mut self, out: &mut [i16], out_channels: u16) {
        let out_channels = out_channels.max(1) as usize;
        if self.samples.is_empty() {
            out.fill(0);
            return;
        }

        let track_channels = self.channels as usize;
        for frame in out.chunks_mut(out_channels) {
            if self.position >= self.samples.len() {
                self.position = 0;
            }
            let track_frame = &self.samples[self.position..self.position + track_channels];
            for (c, sample) in frame.iter_mut().enumerate() {
                *sample = track_frame[c.min(track_channels - 1)];
            }
            self.position += track_channels;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wav_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("track.wav");

        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0i16, 8192, -8192, 0, 100, -100] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let mut track = MusicTrack::load(&path).unwrap();
        assert_eq!(track.channels(), 2);
        assert_eq!(track.sample_rate(), 44100);
        assert_eq!(track.len(), 6);

        let mut out = [0i16; 6];
        track.fill_next(&mut out, 2);
        assert_eq!(out, [0, 8192, -8192, 0, 100, -100]);
    }

    #[test]
    fn test_float_wav_is_scaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");

        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 32,
            sample_format: hound::SampleFormat::Float,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for s in [0.0f32, 0.5, -1.0] {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();

        let mut track = MusicTrack::load(&path).unwrap();
        let mut out = [0i16; 3];
        track.fill_next(&mut out, 1);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], (0.5 * i16::MAX as f32) as i16);
        assert_eq!(out[2], -i16::MAX);
    }

    #[test]
    fn test_fill_wraps_around() {
        let mut track = MusicTrack::from_samples(vec![1, 2, 3, 4], 1, 44100);

        let mut out = [0i16; 6];
        track.fill_next(&mut out, 1);
        assert_eq!(out, [1, 2, 3, 4, 1, 2]);

        // The cursor survives across calls.
        track.fill_next(&mut out, 1);
        assert_eq!(out, [3, 4, 1, 2, 3, 4]);
    }

    #[test]
    fn test_mono_track_feeds_stereo_stream() {
        let mut track = MusicTrack::from_samples(vec![10, 20, 30], 1, 44100);

        let mut out = [0i16; 8];
        track.fill_next(&mut out, 2);
        assert_eq!(out, [10, 10, 20, 20, 30, 30, 10, 10]);
    }

    #[test]
    fn test_stereo_track_feeds_mono_stream() {
        let mut track = MusicTrack::from_samples(vec![10, 11, 20, 21], 2, 44100);

        let mut out = [0i16; 3];
        track.fill_next(&mut out, 1);
        // The first channel wins when the stream is narrower.
        assert_eq!(out, [10, 20, 10]);
    }

    #[test]
    fn test_empty_track_is_silent() {
        let mut track = MusicTrack::from_samples(Vec::new(), 2, 44100);
        let mut out = [7i16; 4];
        track.fill_next(&mut out, 2);
        assert_eq!(out, [0, 0, 0, 0]);
    }

    #[test]
    fn test_duration() {
        let track = MusicTrack::from_samples(vec![0; 88200], 2, 44100);
        assert!((track.duration_secs() - 1.0).abs() < 1e-9);
    }
}
