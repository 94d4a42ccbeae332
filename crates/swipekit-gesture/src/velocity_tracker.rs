//! Velocity tracking for swipe gesture support.
//!
//! Collects timestamped pointer positions in a small rolling buffer and
//! derives a smoothed 2D velocity. With three or more samples the estimate
//! is a weighted average of consecutive-segment velocities where segment `i`
//! weighs `i²`, so the newest motion dominates and jitter from older samples
//! is damped while a final flick still registers.

use smallvec::SmallVec;

/// Upper bound on retained samples; also the inline buffer capacity.
const DEFAULT_MAX_SAMPLES: usize = 10;

/// Samples older than this (relative to the newest) are discarded.
const DEFAULT_MAX_AGE_MS: f64 = 100.0;

/// Fewer valid samples than this yields zero velocity.
const DEFAULT_MIN_SAMPLES: usize = 2;

/// One recorded pointer location.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchSample {
    pub x: f32,
    pub y: f32,
    /// Monotonic milliseconds in the host's event clock.
    pub time_ms: f64,
}

/// A 2D velocity estimate in pixels per second.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    pub const ZERO: Velocity = Velocity { x: 0.0, y: 0.0 };

    /// Magnitude in px/s.
    pub fn speed(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Direction angle in degrees: 0 = right, 90 = down, 270 = up.
    pub fn direction_degrees(&self) -> f32 {
        let angle = self.y.atan2(self.x).to_degrees();
        if angle < 0.0 {
            angle + 360.0
        } else {
            angle
        }
    }
}

/// Tuning for a [`VelocityTracker`].
#[derive(Clone, Copy, Debug)]
pub struct VelocityTrackerConfig {
    /// Maximum number of samples to keep.
    pub max_samples: usize,
    /// Maximum sample age in milliseconds.
    pub max_age_ms: f64,
    /// Minimum samples needed for a nonzero estimate.
    pub min_samples: usize,
}

impl Default for VelocityTrackerConfig {
    fn default() -> Self {
        Self {
            max_samples: DEFAULT_MAX_SAMPLES,
            max_age_ms: DEFAULT_MAX_AGE_MS,
            min_samples: DEFAULT_MIN_SAMPLES,
        }
    }
}

/// Rolling-buffer velocity estimator.
///
/// # Usage
/// ```ignore
/// let mut tracker = VelocityTracker::new();
/// tracker.add_sample(touch.x, touch.y, event_time_ms);
/// // ... more points ...
/// let velocity = tracker.velocity(); // px/sec
/// ```
pub struct VelocityTracker {
    samples: SmallVec<[TouchSample; DEFAULT_MAX_SAMPLES]>,
    config: VelocityTrackerConfig,
}

impl Default for VelocityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VelocityTracker {
    pub fn new() -> Self {
        Self::with_config(VelocityTrackerConfig::default())
    }

    pub fn with_config(config: VelocityTrackerConfig) -> Self {
        Self {
            samples: SmallVec::new(),
            config,
        }
    }

    /// Records a position sample.
    ///
    /// Non-finite coordinates or timestamps are ignored, as are samples
    /// whose timestamp precedes the newest retained sample.
    pub fn add_sample(&mut self, x: f32, y: f32, time_ms: f64) {
        if !x.is_finite() || !y.is_finite() || !time_ms.is_finite() {
            log::debug!("ignoring non-finite sample ({x}, {y}) at {time_ms}");
            return;
        }
        if let Some(last) = self.samples.last() {
            if time_ms < last.time_ms {
                log::trace!(
                    "ignoring sample with timestamp {time_ms} earlier than last {}",
                    last.time_ms
                );
                return;
            }
        }

        self.samples.push(TouchSample { x, y, time_ms });
        self.prune(time_ms);
    }

    fn prune(&mut self, now_ms: f64) {
        let cutoff = now_ms - self.config.max_age_ms;
        while self
            .samples
            .first()
            .is_some_and(|sample| sample.time_ms < cutoff)
        {
            self.samples.remove(0);
        }
        while self.samples.len() > self.config.max_samples {
            self.samples.remove(0);
        }
    }

    /// The current velocity estimate in px/s.
    pub fn velocity(&self) -> Velocity {
        let Some(newest) = self.samples.last() else {
            return Velocity::ZERO;
        };
        let cutoff = newest.time_ms - self.config.max_age_ms;
        let fresh: SmallVec<[TouchSample; DEFAULT_MAX_SAMPLES]> = self
            .samples
            .iter()
            .copied()
            .filter(|sample| sample.time_ms >= cutoff)
            .collect();

        if fresh.len() < self.config.min_samples.max(2) {
            return Velocity::ZERO;
        }

        if fresh.len() >= 3 {
            return weighted_velocity(&fresh);
        }

        let first = fresh[0];
        let last = fresh[fresh.len() - 1];
        let dt = (last.time_ms - first.time_ms) / 1000.0;
        if dt <= 0.0 {
            return Velocity::ZERO;
        }
        Velocity {
            x: ((last.x - first.x) as f64 / dt) as f32,
            y: ((last.y - first.y) as f64 / dt) as f32,
        }
    }

    /// Direction angle of the current velocity in degrees (0..360).
    pub fn direction_degrees(&self) -> f32 {
        self.velocity().direction_degrees()
    }

    /// Speed magnitude of the current velocity in px/s.
    pub fn speed(&self) -> f32 {
        self.velocity().speed()
    }

    /// True when the speed exceeds `threshold` px/s.
    pub fn is_flick(&self, threshold: f32) -> bool {
        self.speed() > threshold
    }

    /// Net displacement from the first retained sample, as `(dx, dy)`.
    pub fn displacement(&self) -> (f32, f32) {
        if self.samples.len() < 2 {
            return (0.0, 0.0);
        }
        let first = self.samples[0];
        let last = self.samples[self.samples.len() - 1];
        (last.x - first.x, last.y - first.y)
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Clears the buffer for a new gesture.
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

/// Weighted average of consecutive-segment velocities; segment `i` (1-based)
/// weighs `i²`.
fn weighted_velocity(samples: &[TouchSample]) -> Velocity {
    let mut total_weight = 0.0f64;
    let mut weighted_x = 0.0f64;
    let mut weighted_y = 0.0f64;

    for i in 1..samples.len() {
        let prev = samples[i - 1];
        let curr = samples[i];
        let dt = (curr.time_ms - prev.time_ms) / 1000.0;
        if dt <= 0.0 {
            continue;
        }

        let weight = (i * i) as f64;
        weighted_x += ((curr.x - prev.x) as f64 / dt) * weight;
        weighted_y += ((curr.y - prev.y) as f64 / dt) * weight;
        total_weight += weight;
    }

    if total_weight == 0.0 {
        return Velocity::ZERO;
    }
    Velocity {
        x: (weighted_x / total_weight) as f32,
        y: (weighted_y / total_weight) as f32,
    }
}
