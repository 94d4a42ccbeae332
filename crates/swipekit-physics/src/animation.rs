//! Frame-driven spring animation runner.
//!
//! Drives [`spring_step`] through successive frame callbacks until the
//! spring settles, then snaps exactly to the target and reports completion.
//! The caller gets back an [`AnimationHandle`] whose only operation is
//! `cancel()`; starting a replacement animation is always expressed as
//! cancel-then-create by the controllers above this crate.

use crate::spring::{is_spring_at_rest, spring_step, SpringConfig};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use swipekit_core::{FrameCallbackRegistration, FrameClock};

/// Upper bound on a single integration step, in seconds. A dropped frame or
/// a backgrounded tab must not turn into one giant leap.
const MAX_FRAME_DT: f32 = 1.0 / 30.0;

/// Step used for the first frame, before two timestamps exist.
const NOMINAL_FRAME_DT: f32 = 1.0 / 60.0;

struct HandleInner {
    cancelled: Cell<bool>,
    completed: Cell<bool>,
    registration: RefCell<Option<FrameCallbackRegistration>>,
}

/// Cancel handle for a running spring animation.
///
/// `cancel()` is idempotent and remains safe after natural completion; it
/// stops future frames but never rolls back values already applied.
/// Dropping the handle does *not* cancel the animation.
#[derive(Clone)]
pub struct AnimationHandle {
    inner: Rc<HandleInner>,
}

impl AnimationHandle {
    fn new() -> Self {
        Self {
            inner: Rc::new(HandleInner {
                cancelled: Cell::new(false),
                completed: Cell::new(false),
                registration: RefCell::new(None),
            }),
        }
    }

    /// Stops the animation before its next frame.
    pub fn cancel(&self) {
        if self.inner.cancelled.replace(true) {
            return;
        }
        // Dropping the registration removes the pending frame callback.
        self.inner.registration.borrow_mut().take();
    }

    /// True while frames are still being scheduled.
    pub fn is_running(&self) -> bool {
        !self.inner.cancelled.get() && !self.inner.completed.get()
    }
}

struct SpringDriver {
    position: Cell<f32>,
    velocity: Cell<f32>,
    target: f32,
    config: SpringConfig,
    last_frame_nanos: Cell<Option<u64>>,
    clock: FrameClock,
    handle: Rc<HandleInner>,
    on_update: RefCell<Box<dyn FnMut(f32)>>,
    on_complete: RefCell<Option<Box<dyn FnOnce()>>>,
}

impl SpringDriver {
    fn schedule(driver: &Rc<SpringDriver>) {
        let for_frame = Rc::clone(driver);
        let registration = driver
            .clock
            .with_frame_nanos(move |time| SpringDriver::on_frame(for_frame, time));
        *driver.handle.registration.borrow_mut() = Some(registration);
    }

    fn on_frame(driver: Rc<SpringDriver>, frame_time_nanos: u64) {
        if driver.handle.cancelled.get() {
            return;
        }
        driver.handle.registration.borrow_mut().take();

        let dt = match driver.last_frame_nanos.get() {
            None => NOMINAL_FRAME_DT,
            Some(previous) => {
                let elapsed = frame_time_nanos.saturating_sub(previous) as f32 / 1_000_000_000.0;
                elapsed.min(MAX_FRAME_DT)
            }
        };
        driver.last_frame_nanos.set(Some(frame_time_nanos));

        let next = spring_step(
            driver.position.get(),
            driver.velocity.get(),
            driver.target,
            &driver.config,
            dt,
        );
        driver.position.set(next.position);
        driver.velocity.set(next.velocity);
        (driver.on_update.borrow_mut())(next.position);

        if is_spring_at_rest(next.position, next.velocity, driver.target) {
            // Snap exactly onto the target so floating-point creep never
            // leaks into the committed value.
            (driver.on_update.borrow_mut())(driver.target);
            driver.handle.completed.set(true);
            log::trace!("spring settled at {}", driver.target);
            if let Some(on_complete) = driver.on_complete.borrow_mut().take() {
                on_complete();
            }
            return;
        }

        SpringDriver::schedule(&driver);
    }
}

/// Animates a value from `from` to `to` with spring physics, starting from
/// rest.
pub fn spring_animation(
    clock: &FrameClock,
    from: f32,
    to: f32,
    config: SpringConfig,
    on_update: impl FnMut(f32) + 'static,
    on_complete: impl FnOnce() + 'static,
) -> AnimationHandle {
    spring_animation_with_velocity(clock, from, to, 0.0, config, on_update, on_complete)
}

/// Animates a value from `from` to `to`, seeded with the release velocity of
/// a gesture so momentum carries smoothly into the settle.
pub fn spring_animation_with_velocity(
    clock: &FrameClock,
    from: f32,
    to: f32,
    initial_velocity: f32,
    config: SpringConfig,
    on_update: impl FnMut(f32) + 'static,
    on_complete: impl FnOnce() + 'static,
) -> AnimationHandle {
    let handle = AnimationHandle::new();
    let driver = Rc::new(SpringDriver {
        position: Cell::new(from),
        velocity: Cell::new(initial_velocity),
        target: to,
        config,
        last_frame_nanos: Cell::new(None),
        clock: clock.clone(),
        handle: Rc::clone(&handle.inner),
        on_update: RefCell::new(Box::new(on_update)),
        on_complete: RefCell::new(Some(Box::new(on_complete))),
    });
    log::trace!("spring animation {from} -> {to} (v0 = {initial_velocity})");
    SpringDriver::schedule(&driver);
    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use swipekit_core::Runtime;

    const FRAME_NANOS: u64 = 16_000_000;

    fn drive_until_settled(runtime: &Runtime, max_frames: usize) -> usize {
        let mut frames = 0;
        while runtime.has_frame_callbacks() && frames < max_frames {
            frames += 1;
            runtime.drain_frame_callbacks(frames as u64 * FRAME_NANOS);
        }
        frames
    }

    #[test]
    fn animation_settles_exactly_on_target() {
        let runtime = Runtime::new();
        let clock = runtime.handle().frame_clock();
        let value = Rc::new(Cell::new(0.0f32));
        let completed = Rc::new(Cell::new(false));

        let value_in_frame = Rc::clone(&value);
        let completed_flag = Rc::clone(&completed);
        let handle = spring_animation(
            &clock,
            0.0,
            100.0,
            SpringConfig::snap(),
            move |v| value_in_frame.set(v),
            move || completed_flag.set(true),
        );

        let frames = drive_until_settled(&runtime, 1000);
        assert!(frames < 1000, "never settled");
        assert_eq!(value.get(), 100.0);
        assert!(completed.get());
        assert!(!handle.is_running());
    }

    #[test]
    fn cancel_stops_further_frames() {
        let runtime = Runtime::new();
        let clock = runtime.handle().frame_clock();
        let updates = Rc::new(Cell::new(0u32));
        let completed = Rc::new(Cell::new(false));

        let updates_in_frame = Rc::clone(&updates);
        let completed_flag = Rc::clone(&completed);
        let handle = spring_animation(
            &clock,
            0.0,
            100.0,
            SpringConfig::snap(),
            move |_| updates_in_frame.set(updates_in_frame.get() + 1),
            move || completed_flag.set(true),
        );

        runtime.drain_frame_callbacks(FRAME_NANOS);
        let seen = updates.get();
        assert!(seen > 0);

        handle.cancel();
        runtime.drain_frame_callbacks(2 * FRAME_NANOS);
        runtime.drain_frame_callbacks(3 * FRAME_NANOS);

        assert_eq!(updates.get(), seen);
        assert!(!completed.get(), "cancel must not report completion");
        assert!(!handle.is_running());
    }

    #[test]
    fn cancel_is_idempotent_and_safe_after_completion() {
        let runtime = Runtime::new();
        let clock = runtime.handle().frame_clock();

        let handle = spring_animation(&clock, 0.0, 1.0, SpringConfig::stiff(), |_| {}, || {});
        drive_until_settled(&runtime, 1000);

        handle.cancel();
        handle.cancel();
        assert!(!handle.is_running());
    }

    #[test]
    fn seeded_velocity_overshoots_before_settling() {
        let runtime = Runtime::new();
        let clock = runtime.handle().frame_clock();
        let max_seen = Rc::new(Cell::new(f32::MIN));

        let max_in_frame = Rc::clone(&max_seen);
        let _handle = spring_animation_with_velocity(
            &clock,
            0.0,
            10.0,
            2000.0,
            SpringConfig::snap(),
            move |v| max_in_frame.set(max_in_frame.get().max(v)),
            || {},
        );

        drive_until_settled(&runtime, 1000);
        assert!(
            max_seen.get() > 10.0,
            "momentum should overshoot the target, peaked at {}",
            max_seen.get()
        );
    }

    #[test]
    fn dropped_frame_gap_is_capped() {
        let runtime = Runtime::new();
        let clock = runtime.handle().frame_clock();
        let value = Rc::new(Cell::new(0.0f32));

        let value_in_frame = Rc::clone(&value);
        let _handle = spring_animation(
            &clock,
            0.0,
            100.0,
            SpringConfig::snap(),
            move |v| value_in_frame.set(v),
            || {},
        );

        runtime.drain_frame_callbacks(FRAME_NANOS);
        let before_gap = value.get();
        // Simulate a two-second stall; the step must be capped at 1/30 s.
        runtime.drain_frame_callbacks(FRAME_NANOS + 2_000_000_000);
        let after_gap = value.get();

        // An uncapped two-second Euler step would land far past the target;
        // a capped one advances by a normal frame's worth.
        assert!(
            after_gap < 60.0,
            "gap frame moved too far: {before_gap} -> {after_gap}"
        );
        assert!(after_gap > before_gap);
    }
}
