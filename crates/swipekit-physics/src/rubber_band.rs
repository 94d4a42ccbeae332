//! Rubber-band overscroll damping and small interpolation helpers.
//!
//! The rubber band maps how far a drag has pushed past a boundary into a
//! bounded visual displacement: it grows quickly at first, then approaches
//! `max_distance` asymptotically, so no amount of overscroll escapes the
//! hard ceiling.

/// Tension that reproduces the familiar stretchy edge feel.
pub const DEFAULT_TENSION: f32 = 0.55;

/// Deceleration rate used by [`momentum_offset`].
pub const DEFAULT_DECELERATION: f32 = 0.998;

/// Damped displacement for `offset` units of overscroll.
///
/// `rubber_band(offset, max, t)` is monotonically increasing in `offset` and
/// strictly below `max` for every finite positive `offset`.
pub fn rubber_band(offset: f32, max_distance: f32, tension: f32) -> f32 {
    if offset <= 0.0 {
        return 0.0;
    }
    let resistance = 1.0 - 1.0 / ((offset / max_distance) * tension + 1.0);
    max_distance * resistance
}

/// Applies the rubber band on whichever side of `[min_bound, max_bound]`
/// the value has escaped to; values inside the bounds pass through.
pub fn rubber_band_clamp(
    offset: f32,
    min_bound: f32,
    max_bound: f32,
    max_overscroll: f32,
    tension: f32,
) -> f32 {
    if offset < min_bound {
        let overscroll = min_bound - offset;
        return min_bound - rubber_band(overscroll, max_overscroll, tension);
    }
    if offset > max_bound {
        let overscroll = offset - max_bound;
        return max_bound + rubber_band(overscroll, max_overscroll, tension);
    }
    offset
}

/// Where a freely decelerating value released at `velocity` px/s would come
/// to rest, relative to its current position.
pub fn momentum_offset(velocity: f32, deceleration: f32) -> f32 {
    let acceleration = (1.0 - deceleration) * 1000.0;
    (velocity * velocity.abs()) / (2.0 * acceleration)
}

/// Linear interpolation from `from` to `to` by `progress`.
pub fn lerp(from: f32, to: f32, progress: f32) -> f32 {
    from + (to - from) * progress
}

/// Clamps `value` into `[min, max]`.
pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_and_negative_offsets_produce_no_displacement() {
        assert_eq!(rubber_band(0.0, 100.0, DEFAULT_TENSION), 0.0);
        assert_eq!(rubber_band(-50.0, 100.0, DEFAULT_TENSION), 0.0);
    }

    #[test]
    fn displacement_is_monotonic_and_bounded() {
        let mut previous = 0.0;
        for step in 1..200 {
            let offset = step as f32 * 25.0;
            let displaced = rubber_band(offset, 100.0, DEFAULT_TENSION);
            assert!(displaced > previous, "not monotonic at offset {offset}");
            assert!(displaced < 100.0, "escaped ceiling at offset {offset}");
            previous = displaced;
        }
    }

    #[test]
    fn hundred_px_overscroll_feels_like_a_third() {
        let displaced = rubber_band(100.0, 100.0, DEFAULT_TENSION);
        assert!((displaced - 35.0).abs() < 1.0, "got {displaced}");
    }

    #[test]
    fn clamp_passes_in_bounds_values_through() {
        assert_eq!(rubber_band_clamp(50.0, 0.0, 100.0, 40.0, DEFAULT_TENSION), 50.0);
        assert_eq!(rubber_band_clamp(0.0, 0.0, 100.0, 40.0, DEFAULT_TENSION), 0.0);
        assert_eq!(rubber_band_clamp(100.0, 0.0, 100.0, 40.0, DEFAULT_TENSION), 100.0);
    }

    #[test]
    fn clamp_damps_both_edges_symmetrically() {
        let below = rubber_band_clamp(-30.0, 0.0, 100.0, 40.0, DEFAULT_TENSION);
        let above = rubber_band_clamp(130.0, 0.0, 100.0, 40.0, DEFAULT_TENSION);
        assert!(below < 0.0 && below > -40.0);
        assert!(above > 100.0 && above < 140.0);
        assert!((above - 100.0 + below).abs() < 1e-4);
    }

    #[test]
    fn momentum_offset_is_signed() {
        let forward = momentum_offset(1000.0, DEFAULT_DECELERATION);
        let backward = momentum_offset(-1000.0, DEFAULT_DECELERATION);
        assert!(forward > 0.0);
        assert_eq!(forward, -backward);
    }

    #[test]
    fn lerp_and_clamp_helpers() {
        assert_eq!(lerp(0.0, 10.0, 0.5), 5.0);
        assert_eq!(clamp(5.0, 0.0, 3.0), 3.0);
        assert_eq!(clamp(-1.0, 0.0, 3.0), 0.0);
    }
}
