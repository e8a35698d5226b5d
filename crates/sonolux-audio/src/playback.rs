//! cpal output stream wiring.
//!
//! The data callback does two things per block: fill the device buffer
//! from the looping track, and hand the same interleaved 16-bit block to
//! the loudness estimator. Both must finish within the block's real-time
//! budget; the callback allocates nothing after its scratch buffer has
//! reached the device's block size.

use crate::{AudioError, MusicTrack, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, SampleFormat, SizedSample};
use sonolux_core::LoudnessEstimator;
use tracing::{error, info, warn};

/// Owns the live output stream. Playback runs for as long as this value
/// is alive; dropping it stops the audio callback.
///
/// `cpal::Stream` is not `Send`, so the player stays on the thread that
/// created it.
pub struct MusicPlayer {
    _stream: cpal::Stream,
    device_name: String,
    sample_rate: u32,
    channels: u16,
}

impl MusicPlayer {
    /// Opens the output device and starts looping playback of `track`,
    /// feeding `estimator` from the data callback.
    ///
    /// `device_name` selects an output device by name; an unknown name
    /// falls back to the default device with a warning.
    pub fn start(
        device_name: Option<&str>,
        track: MusicTrack,
        estimator: LoudnessEstimator,
    ) -> Result<Self> {
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => match host
                .output_devices()?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
            {
                Some(device) => device,
                None => {
                    warn!("Output device '{}' not found, using default", name);
                    host.default_output_device().ok_or(AudioError::NoDevice)?
                }
            },
            None => host.default_output_device().ok_or(AudioError::NoDevice)?,
        };
        let resolved_name = device.name().unwrap_or_else(|_| "<unknown>".to_string());

        let default_config = device.default_output_config()?;
        let sample_format = default_config.sample_format();
        let mut config: cpal::StreamConfig = default_config.into();

        // Play at the track's own rate; resampling is out of scope.
        if config.sample_rate.0 != track.sample_rate() {
            info!(
                "Requesting {} Hz (device default {} Hz)",
                track.sample_rate(),
                config.sample_rate.0
            );
            config.sample_rate = cpal::SampleRate(track.sample_rate());
        }

        info!(
            "Opening output stream on '{}': {} ch, {} Hz, {:?}",
            resolved_name, config.channels, config.sample_rate.0, sample_format
        );

        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, track, estimator)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, track, estimator)?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, track, estimator)?,
            SampleFormat::I32 => build_stream::<i32>(&device, &config, track, estimator)?,
            format => return Err(AudioError::UnsupportedFormat(format.to_string())),
        };

        stream.play()?;
        info!("Music playback started");

        Ok(Self {
            _stream: stream,
            device_name: resolved_name,
            sample_rate: config.sample_rate.0,
            channels: config.channels,
        })
    }

    /// Name of the device the stream runs on.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Sample rate of the running stream.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count of the running stream.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut track: MusicTrack,
    mut estimator: LoudnessEstimator,
) -> Result<cpal::Stream>
where
    T: SizedSample + FromSample<i16>,
{
    let channels = config.channels;
    let mut scratch: Vec<i16> = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            scratch.resize(data.len(), 0);
            track.fill_next(&mut scratch, channels);
            estimator.process_block(&scratch);
            for (out, &sample) in data.iter_mut().zip(scratch.iter()) {
                *out = T::from_sample(sample);
            }
        },
        // Stream errors are logged and playback is not restarted.
        |err| error!("Audio output stream error: {}", err),
        None,
    )?;

    Ok(stream)
}

/// Names of all output devices on the default host. Hosts that fail to
/// enumerate report an empty list.
pub fn list_output_devices() -> Vec<String> {
    let host = cpal::default_host();
    match host.output_devices() {
        Ok(devices) => devices.filter_map(|d| d.name().ok()).collect(),
        Err(e) => {
            warn!("Failed to enumerate output devices: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_output_devices_does_not_panic() {
        // Headless CI often has no audio host; an empty list is fine.
        let devices = list_output_devices();
        for name in devices {
            assert!(!name.is_empty());
        }
    }
}
