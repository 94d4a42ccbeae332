//! Snap-point sets and velocity-aware snap selection.

/// An ascending, non-empty set of allowed resting values for a continuously
/// draggable axis (here: sheet heights as viewport fractions).
#[derive(Clone, Debug, PartialEq)]
pub struct SnapPoints {
    points: Vec<f32>,
}

impl SnapPoints {
    /// Validates and wraps a snap set; `None` unless the points are finite,
    /// non-empty, and strictly increasing.
    pub fn new(points: Vec<f32>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        if points.iter().any(|p| !p.is_finite()) {
            return None;
        }
        if points.windows(2).any(|pair| pair[0] >= pair[1]) {
            return None;
        }
        Some(Self { points })
    }

    /// Constructor for statically known-good sets.
    pub(crate) fn from_static(points: &[f32]) -> Self {
        debug_assert!(!points.is_empty());
        debug_assert!(points.windows(2).all(|pair| pair[0] < pair[1]));
        Self {
            points: points.to_vec(),
        }
    }

    pub fn min(&self) -> f32 {
        self.points[0]
    }

    pub fn max(&self) -> f32 {
        self.points[self.points.len() - 1]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.points
    }

    /// The snap point closest to `value`; ties go to the lower point.
    pub fn nearest(&self, value: f32) -> f32 {
        self.points
            .iter()
            .copied()
            .reduce(|best, candidate| {
                if (candidate - value).abs() < (best - value).abs() {
                    candidate
                } else {
                    best
                }
            })
            .unwrap_or(self.points[0])
    }

    /// The first snap point strictly above `value`.
    pub fn next_above(&self, value: f32) -> Option<f32> {
        self.points.iter().copied().find(|p| *p > value)
    }

    /// The last snap point strictly below `value`.
    pub fn next_below(&self, value: f32) -> Option<f32> {
        self.points.iter().rev().copied().find(|p| *p < value)
    }

    /// Clamps `value` into `[min, max]`.
    pub fn clamp(&self, value: f32) -> f32 {
        value.max(self.min()).min(self.max())
    }
}

/// Picks the resting snap point for a release at `current` with the given
/// release velocity (px/s, positive = toward higher values).
///
/// A high-confidence flick selects the next snap point in its direction
/// even when position alone would round the other way, saturating at the
/// ends of the set; below the threshold, selection is purely
/// nearest-by-distance.
pub fn select_snap_point(
    current: f32,
    velocity_px_s: f32,
    points: &SnapPoints,
    flick_threshold_px_s: f32,
) -> f32 {
    if velocity_px_s.abs() > flick_threshold_px_s {
        let target = if velocity_px_s > 0.0 {
            points.next_above(current).unwrap_or(points.max())
        } else {
            points.next_below(current).unwrap_or(points.min())
        };
        log::debug!(
            "directional snap: {current:.3} at {velocity_px_s:.0} px/s -> {target:.3}"
        );
        return target;
    }
    points.nearest(current)
}
