//! Physics primitives for swipekit.
//!
//! Pure functions plus one stateful piece:
//!
//! - [`spring_step`] / [`is_spring_at_rest`]: one semi-implicit Euler
//!   integration step and its settle check
//! - [`rubber_band`] / [`rubber_band_clamp`]: bounded overscroll damping
//! - [`momentum_offset`], [`lerp`], [`clamp`]: small helpers callers use to
//!   classify and map gestures
//! - [`spring_animation`] / [`spring_animation_with_velocity`]: the
//!   frame-driven runner, returning a cancel-only [`AnimationHandle`]

mod animation;
mod rubber_band;
mod spring;

pub use animation::{spring_animation, spring_animation_with_velocity, AnimationHandle};
pub use rubber_band::{
    clamp, lerp, momentum_offset, rubber_band, rubber_band_clamp, DEFAULT_DECELERATION,
    DEFAULT_TENSION,
};
pub use spring::{
    is_spring_at_rest, is_spring_at_rest_with, spring_step, SpringConfig, SpringState,
    REST_POSITION_EPSILON, REST_VELOCITY_EPSILON,
};
