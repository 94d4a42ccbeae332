//! Gesture input vocabulary for swipekit.
//!
//! - [`VelocityTracker`]: rolling-buffer velocity estimation from
//!   timestamped pointer samples
//! - [`classify_direction`]: one-time horizontal/vertical lock for an
//!   ambiguous early drag
//! - [`GestureArbiter`]: the claim/release ownership ledger that keeps two
//!   consumers from fighting over one touch stream

mod arbiter;
mod direction;
mod velocity_tracker;

pub use arbiter::{GestureArbiter, GestureOwner, GestureState};
pub use direction::{classify_direction, DirectionThresholds, GestureDirection};
pub use velocity_tracker::{TouchSample, Velocity, VelocityTracker, VelocityTrackerConfig};
