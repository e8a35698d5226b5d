//! Sonolux Audio - Music Playback
//!
//! This crate owns the audio side of Sonolux:
//! - WAV track loading and looping playback buffers
//! - The cpal output stream whose data callback feeds the loudness
//!   estimator with every block it plays

#![warn(missing_docs)]

use thiserror::Error;

pub mod playback;
pub mod track;

pub use playback::{list_output_devices, MusicPlayer};
pub use track::MusicTrack;

/// Audio errors
#[derive(Error, Debug)]
pub enum AudioError {
    /// No output device is available on the host.
    #[error("No audio output device available")]
    NoDevice,

    /// Enumerating the host's devices failed.
    #[error("Failed to enumerate audio devices: {0}")]
    Devices(#[from] cpal::DevicesError),

    /// The device's native sample format has no conversion path.
    #[error("Unsupported output sample format: {0}")]
    UnsupportedFormat(String),

    /// The music file could not be read or decoded.
    #[error("Failed to load music track: {0}")]
    TrackLoad(#[from] hound::Error),

    /// Querying the device's stream configuration failed.
    #[error("Failed to query output configuration: {0}")]
    StreamConfig(#[from] cpal::DefaultStreamConfigError),

    /// Building the output stream failed.
    #[error("Failed to build output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    /// Starting playback failed.
    #[error("Failed to start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;
