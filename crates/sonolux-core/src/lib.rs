//! Sonolux Core - Loudness Estimation and Reactive Scene Parameters
//!
//! This crate contains the audio-reactive heart of Sonolux:
//! - Block loudness estimation feeding a shared lock-free cell
//! - The lighting amplification and pulse-scale model
//! - The frame-rate independent animation clock
//! - Logging configuration consumed by the application binary

#![warn(missing_docs)]

pub mod clock;
pub mod lighting;
pub mod logging;
pub mod loudness;

pub use clock::AnimationClock;
pub use lighting::{LightLevels, LightingConfig};
pub use logging::LogConfig;
pub use loudness::{block_loudness, LoudnessCell, LoudnessConfig, LoudnessEstimator};
