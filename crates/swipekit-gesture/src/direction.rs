//! Direction classification for ambiguous early drags.
//!
//! A gesture is locked horizontal or vertical exactly once, from its net
//! displacement: below the horizontal angle threshold it is horizontal,
//! above the vertical threshold it is vertical, and in the dead band between
//! the two it stays unclassified until more movement accrues. Displacement
//! under the minimum distance never classifies, so hand tremor on a resting
//! finger cannot lock an axis.

/// Axis a gesture has been locked to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureDirection {
    Horizontal,
    Vertical,
}

/// Thresholds for [`classify_direction`].
#[derive(Clone, Copy, Debug)]
pub struct DirectionThresholds {
    /// Angles from the horizontal axis below this classify as horizontal.
    pub horizontal_max_deg: f32,
    /// Angles from the horizontal axis above this classify as vertical.
    pub vertical_min_deg: f32,
    /// Minimum displacement before classification is attempted at all.
    pub min_distance_px: f32,
}

impl Default for DirectionThresholds {
    fn default() -> Self {
        Self {
            horizontal_max_deg: 30.0,
            vertical_min_deg: 60.0,
            min_distance_px: 10.0,
        }
    }
}

/// Classifies a net displacement, or returns `None` while it is still
/// ambiguous.
pub fn classify_direction(
    delta_x: f32,
    delta_y: f32,
    thresholds: &DirectionThresholds,
) -> Option<GestureDirection> {
    if !delta_x.is_finite() || !delta_y.is_finite() {
        return None;
    }

    let distance = (delta_x * delta_x + delta_y * delta_y).sqrt();
    if distance < thresholds.min_distance_px {
        return None;
    }

    // Angle from the horizontal axis, folded into the first quadrant.
    let angle = delta_y.abs().atan2(delta_x.abs()).to_degrees();

    if angle < thresholds.horizontal_max_deg {
        Some(GestureDirection::Horizontal)
    } else if angle > thresholds.vertical_min_deg {
        Some(GestureDirection::Vertical)
    } else {
        None
    }
}
