//! Frame scheduling for swipekit.
//!
//! This crate provides the one primitive every animation in the engine is
//! built on: a single-threaded registry of one-shot frame callbacks, driven
//! by the host. Nothing here knows about springs, gestures, or controllers.
//!
//! - [`Runtime`] / [`RuntimeHandle`]: own and reference the callback registry
//! - [`FrameClock`]: schedule a callback for the next frame
//! - [`FrameCallbackRegistration`]: cancel handle (also cancels on drop)
//! - [`FrameTimer`]: wall-clock source for hosts that don't get frame
//!   timestamps from their event loop

mod frame_clock;
mod runtime;

pub use frame_clock::{FrameCallbackRegistration, FrameClock, FrameTimer};
pub use runtime::{FrameCallbackId, Runtime, RuntimeHandle};
