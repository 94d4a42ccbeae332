//! Centralized tuning constants for the gesture controllers.
//!
//! Everything here is a default; both controllers take the values through
//! their config structs, so hosts can override any of them per surface.

use crate::snap::SnapPoints;

/// Bottom-sheet tuning.
pub mod sheet {
    /// Collapsed resting height, as a viewport fraction.
    pub const SNAP_COLLAPSED: f32 = 0.3;
    /// Half-open transition point.
    pub const SNAP_HALF: f32 = 0.5;
    /// Expanded height when nothing is selected.
    pub const SNAP_EXPANDED: f32 = 0.75;
    /// Full-detail height when an item is selected.
    pub const SNAP_FULL_DETAILS: f32 = 0.9;

    /// Height of the band at the sheet's top edge where drags may start.
    pub const DRAG_HANDLE_HEIGHT_PX: f32 = 60.0;

    /// Release speed above which snapping goes directional.
    pub const FLICK_VELOCITY_PX_S: f32 = 800.0;

    /// Furthest the sheet may visually travel past its snap range.
    pub const MAX_OVERSCROLL_FRACTION: f32 = 0.08;
    /// Rubber-band tension; stiffer than the carousel's edges.
    pub const RUBBER_BAND_RESISTANCE: f32 = 0.3;
}

/// Carousel tuning.
pub mod carousel {
    /// Each card's width as a percentage of the container.
    pub const ITEM_WIDTH_PERCENT: f32 = 80.0;
    /// Gap between cards as a percentage of the container.
    pub const GAP_PERCENT: f32 = 10.0;

    /// Release speed that always advances exactly one card.
    pub const FLICK_VELOCITY_PX_S: f32 = 500.0;
    /// Release speed that biases nearest-card rounding.
    pub const MIN_SWIPE_VELOCITY_PX_S: f32 = 200.0;
    /// Rounding bias (in card units) applied in the swipe's direction.
    pub const VELOCITY_INDEX_BIAS: f32 = 0.3;

    /// Furthest a drag may visually travel past the first/last card.
    pub const MAX_OVERSCROLL_PERCENT: f32 = 15.0;
    pub const RUBBER_BAND_TENSION: f32 = 0.55;

    /// Converts release velocity (px/s) into the percent offset space when
    /// seeding the snap spring. A feel constant, not a unit conversion.
    pub const VELOCITY_PERCENT_SCALE: f32 = 0.01;
}

/// Direction-lock tuning shared by both axes.
pub mod gesture {
    /// Angles from horizontal below this lock the gesture horizontal.
    pub const HORIZONTAL_ANGLE_DEG: f32 = 30.0;
    /// Angles from horizontal above this lock the gesture vertical.
    pub const VERTICAL_ANGLE_DEG: f32 = 60.0;
    /// Minimum displacement before a gesture is classified at all.
    pub const MIN_CLASSIFY_DISTANCE_PX: f32 = 10.0;
}

/// Sheet resting heights while an item is selected (full-detail variant).
pub fn snap_points_with_selection() -> SnapPoints {
    SnapPoints::from_static(&[sheet::SNAP_COLLAPSED, sheet::SNAP_HALF, sheet::SNAP_FULL_DETAILS])
}

/// Sheet resting heights with no active selection.
pub fn snap_points_without_selection() -> SnapPoints {
    SnapPoints::from_static(&[sheet::SNAP_COLLAPSED, sheet::SNAP_HALF, sheet::SNAP_EXPANDED])
}

/// Maps a height fraction to a translateY percentage for hosts that present
/// the sheet as a fixed-height surface shifted down by a transform.
///
/// At `height_fraction == max_height_fraction` the sheet is fully revealed
/// (0%); at smaller heights it is pushed down proportionally.
pub fn sheet_transform_percent(height_fraction: f32, max_height_fraction: f32) -> f32 {
    if max_height_fraction <= 0.0 {
        return 0.0;
    }
    ((max_height_fraction - height_fraction) / max_height_fraction) * 100.0
}
