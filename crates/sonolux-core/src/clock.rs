//! Animation clock.
//!
//! Accumulates a monotone angle from wall-clock time so that animation speed
//! is independent of rendering frame rate. The very first tick reports a
//! delta of zero - there is no previous timestamp to measure against, and a
//! spurious startup jump would lurch every animation forward.

use std::time::Instant;

/// Default angle advance per second.
pub const DEFAULT_RATE: f32 = 60.0;

/// Frame clock driving camera and object motion.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    last: Option<Instant>,
    angle: f32,
    rate: f32,
}

impl AnimationClock {
    /// Creates a clock advancing `rate` angle units per second.
    pub fn new(rate: f32) -> Self {
        Self {
            last: None,
            angle: 0.0,
            rate,
        }
    }

    /// Advances the clock to now and returns the elapsed seconds since the
    /// previous tick (0.0 on the first tick).
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to an explicit timestamp. Timestamps earlier than
    /// the previous tick count as zero elapsed time.
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let dt = match self.last {
            Some(prev) => now.saturating_duration_since(prev).as_secs_f32(),
            None => 0.0,
        };
        self.last = Some(now);
        self.angle += self.rate * dt;
        dt
    }

    /// The accumulated animation angle.
    pub fn angle(&self) -> f32 {
        self.angle
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(DEFAULT_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = AnimationClock::default();
        // Whatever happened before the first tick does not count.
        std::thread::sleep(Duration::from_millis(5));
        let dt = clock.tick();
        assert_eq!(dt, 0.0);
        assert_eq!(clock.angle(), 0.0);
    }

    #[test]
    fn test_angle_advances_with_time() {
        let mut clock = AnimationClock::new(60.0);
        let start = Instant::now();
        clock.tick_at(start);
        let dt = clock.tick_at(start + Duration::from_millis(16));

        assert!((dt - 0.016).abs() < 1e-6);
        assert!((clock.angle() - 60.0 * 0.016).abs() < 1e-4);
    }

    #[test]
    fn test_angle_is_monotone() {
        let mut clock = AnimationClock::new(60.0);
        let start = Instant::now();
        let mut previous = clock.angle();
        for i in 0..10 {
            clock.tick_at(start + Duration::from_millis(i * 7));
            assert!(clock.angle() >= previous);
            previous = clock.angle();
        }
    }

    #[test]
    fn test_clock_going_backwards_counts_as_zero() {
        let mut clock = AnimationClock::new(60.0);
        let start = Instant::now();
        clock.tick_at(start + Duration::from_secs(1));
        let dt = clock.tick_at(start);
        assert_eq!(dt, 0.0);
    }

    #[test]
    fn test_rate_is_honored() {
        let mut clock = AnimationClock::new(10.0);
        let start = Instant::now();
        clock.tick_at(start);
        clock.tick_at(start + Duration::from_secs(2));
        assert!((clock.angle() - 20.0).abs() < 1e-4);
    }
}
