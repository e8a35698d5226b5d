//! Block loudness estimation.
//!
//! The audio output callback hands every block of interleaved 16-bit samples
//! to [`LoudnessEstimator::process_block`], which reduces it to a single
//! normalized scalar and publishes it through a [`LoudnessCell`]. The render
//! loop reads the cell on its own cadence; neither side ever blocks on the
//! other.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Configuration for the loudness estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoudnessConfig {
    /// Normalization divisor applied to each sample magnitude.
    ///
    /// Deliberately 2^13 rather than the i16 full-scale 2^15: a full-scale
    /// sine then averages to roughly 0.25-0.3 before the clamp, which leaves
    /// headroom before the signal saturates to 1.0.
    #[serde(default = "default_divisor")]
    pub divisor: f64,
}

impl LoudnessConfig {
    /// Default normalization divisor (2^13).
    pub const DEFAULT_DIVISOR: f64 = 8192.0;
}

impl Default for LoudnessConfig {
    fn default() -> Self {
        Self {
            divisor: Self::DEFAULT_DIVISOR,
        }
    }
}

fn default_divisor() -> f64 {
    LoudnessConfig::DEFAULT_DIVISOR
}

/// Single-slot cell holding the most recent loudness value.
///
/// One writer (the audio callback), one reader (the render loop),
/// last-write-wins. The value is an `f32` stored as its bit pattern in an
/// `AtomicU32`; relaxed ordering is all the contract requires - the reader
/// only needs an approximately fresh value, never a consistent history.
#[derive(Debug, Default)]
pub struct LoudnessCell(AtomicU32);

impl LoudnessCell {
    /// Creates a cell initialized to silence (0.0).
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Publishes a new loudness value.
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    /// Reads the most recently published loudness value.
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }
}

/// Computes the normalized average magnitude of one interleaved sample block.
///
/// Returns `None` for an empty block - the caller keeps its previous value
/// rather than dividing by zero. Magnitudes are accumulated in `f64`
/// (`|i16::MIN|` does not fit an `i16`), then clamped to 1.0.
pub fn block_loudness(samples: &[i16], divisor: f64) -> Option<f32> {
    if samples.is_empty() {
        return None;
    }

    let mut sum = 0.0f64;
    for &sample in samples {
        sum += f64::from(sample).abs() / divisor;
    }
    let raw = sum / samples.len() as f64;

    Some(raw.min(1.0) as f32)
}

/// Estimator bound to a shared [`LoudnessCell`].
///
/// Owned by the audio callback. Must stay within the real-time budget of one
/// block: a single pass over the samples, no allocation, no locking.
pub struct LoudnessEstimator {
    config: LoudnessConfig,
    cell: Arc<LoudnessCell>,
    blocks_processed: u64,
}

impl LoudnessEstimator {
    /// Creates a new estimator publishing into `cell`.
    pub fn new(config: LoudnessConfig, cell: Arc<LoudnessCell>) -> Self {
        Self {
            config,
            cell,
            blocks_processed: 0,
        }
    }

    /// Reduces one interleaved block to a loudness scalar and publishes it.
    ///
    /// An empty block is a no-op; the cell keeps its previous value.
    pub fn process_block(&mut self, samples: &[i16]) {
        let Some(loudness) = block_loudness(samples, self.config.divisor) else {
            return;
        };

        self.cell.store(loudness);
        self.blocks_processed += 1;

        // Roughly once per few seconds at typical block rates.
        if self.blocks_processed % 256 == 0 {
            debug!(
                "Loudness: {} blocks processed, current={:.3}",
                self.blocks_processed, loudness
            );
        }
    }

    /// Number of non-empty blocks processed so far.
    pub fn blocks_processed(&self) -> u64 {
        self.blocks_processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimate(samples: &[i16]) -> f32 {
        block_loudness(samples, LoudnessConfig::DEFAULT_DIVISOR).expect("non-empty block")
    }

    #[test]
    fn test_reference_block() {
        // Two stereo frames: left = {0, -8192}, right = {8192, 0}.
        // (0 + 8192 + 8192 + 0) / 8192 / 4 = 0.5
        let block = [0i16, 8192, -8192, 0];
        assert_eq!(estimate(&block), 0.5);
    }

    #[test]
    fn test_silence_is_zero() {
        let block = [0i16; 1024];
        assert_eq!(estimate(&block), 0.0);
    }

    #[test]
    fn test_sign_invariance() {
        let block: Vec<i16> = (0..512).map(|i| ((i * 37) % 20000) as i16 - 10000).collect();
        let negated: Vec<i16> = block.iter().map(|&s| s.saturating_neg()).collect();
        assert_eq!(estimate(&block), estimate(&negated));
    }

    #[test]
    fn test_monotonic_in_magnitude() {
        let full = [i16::MIN; 256];
        let half = [-16384i16; 256];
        assert!(estimate(&full) >= estimate(&half));
    }

    #[test]
    fn test_full_scale_saturates() {
        // |i16::MIN| / 8192 = 4.0 per sample, well above the clamp.
        let block = [i16::MIN; 64];
        assert_eq!(estimate(&block), 1.0);
    }

    #[test]
    fn test_empty_block_is_noop() {
        let cell = Arc::new(LoudnessCell::new());
        let mut estimator = LoudnessEstimator::new(LoudnessConfig::default(), cell.clone());

        estimator.process_block(&[0, 8192, -8192, 0]);
        assert_eq!(cell.load(), 0.5);

        estimator.process_block(&[]);
        assert_eq!(cell.load(), 0.5);
        assert_eq!(estimator.blocks_processed(), 1);
    }

    #[test]
    fn test_cell_starts_silent() {
        let cell = LoudnessCell::new();
        assert_eq!(cell.load(), 0.0);
    }

    #[test]
    fn test_cell_cross_thread_visibility() {
        let cell = Arc::new(LoudnessCell::new());
        let writer_cell = cell.clone();

        let writer = std::thread::spawn(move || {
            for i in 0..100 {
                writer_cell.store(i as f32 / 100.0);
            }
        });
        writer.join().unwrap();

        assert_eq!(cell.load(), 0.99);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn loudness_always_in_unit_range(block in prop::collection::vec(any::<i16>(), 1..4096)) {
                let loudness = estimate(&block);
                prop_assert!((0.0..=1.0).contains(&loudness));
            }

            #[test]
            fn loudness_ignores_sign(block in prop::collection::vec(-20000i16..20000, 1..512)) {
                let negated: Vec<i16> = block.iter().map(|&s| -s).collect();
                prop_assert_eq!(estimate(&block), estimate(&negated));
            }
        }
    }
}
