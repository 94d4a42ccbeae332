//! Horizontal card-carousel controller.
//!
//! Binds the velocity tracker, the physics primitives, and the gesture
//! arbiter to a horizontal, index-based item list:
//!
//! - touch-start snapshots the gesture, cancels any in-flight snap
//!   animation, and resets the tracker
//! - touch-move classifies the axis once, claims the arbiter when the lock
//!   is horizontal, and rubber-bands the offset past the first/last card
//! - touch-end picks a target index from position and release velocity
//!   (flick / biased / nearest) and spring-animates to it, seeding the
//!   spring with the gesture's momentum
//!
//! The controller never renders: each new offset goes out through the
//! `on_offset` hook and the host applies it however it paints.
//!
//! State is split the same way the scroll state holders split it: the
//! persistent model (current index, committed offset) lives in `Cell`s that
//! survive gestures, while per-gesture state (start point, direction lock,
//! tracker buffer) is reset on every touch-start. All mutation happens in
//! pointer callbacks or frame callbacks on the same thread.

use crate::config;
use crate::haptics::{HapticKind, Haptics};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use swipekit_core::FrameClock;
use swipekit_gesture::{
    classify_direction, DirectionThresholds, GestureArbiter, GestureDirection, GestureOwner,
    VelocityTracker,
};
use swipekit_physics::{
    clamp, rubber_band_clamp, spring_animation_with_velocity, AnimationHandle, SpringConfig,
};

/// Tuning for a [`CarouselController`]. All fields are overridable; the
/// defaults come from [`config::carousel`] and [`config::gesture`].
#[derive(Clone, Debug)]
pub struct CarouselConfig {
    pub item_count: usize,
    /// Card width as a percentage of the container.
    pub item_width_percent: f32,
    /// Inter-card gap as a percentage of the container.
    pub gap_percent: f32,
    pub initial_index: usize,
    /// Container width in pixels, for mapping drag deltas into percent.
    pub container_width_px: f32,
    pub flick_velocity_px_s: f32,
    pub min_swipe_velocity_px_s: f32,
    /// Rounding bias (in card units) applied in the swipe's direction for
    /// medium-speed releases.
    pub velocity_index_bias: f32,
    pub max_overscroll_percent: f32,
    pub rubber_band_tension: f32,
    /// Scale from release px/s into percent-space spring seed velocity.
    pub velocity_percent_scale: f32,
    pub snap_spring: SpringConfig,
    pub classify: DirectionThresholds,
}

impl CarouselConfig {
    pub fn new(item_count: usize) -> Self {
        Self {
            item_count,
            item_width_percent: config::carousel::ITEM_WIDTH_PERCENT,
            gap_percent: config::carousel::GAP_PERCENT,
            initial_index: 0,
            container_width_px: 375.0,
            flick_velocity_px_s: config::carousel::FLICK_VELOCITY_PX_S,
            min_swipe_velocity_px_s: config::carousel::MIN_SWIPE_VELOCITY_PX_S,
            velocity_index_bias: config::carousel::VELOCITY_INDEX_BIAS,
            max_overscroll_percent: config::carousel::MAX_OVERSCROLL_PERCENT,
            rubber_band_tension: config::carousel::RUBBER_BAND_TENSION,
            velocity_percent_scale: config::carousel::VELOCITY_PERCENT_SCALE,
            snap_spring: SpringConfig::carousel_snap(),
            classify: DirectionThresholds {
                horizontal_max_deg: config::gesture::HORIZONTAL_ANGLE_DEG,
                vertical_min_deg: config::gesture::VERTICAL_ANGLE_DEG,
                min_distance_px: config::gesture::MIN_CLASSIFY_DISTANCE_PX,
            },
        }
    }

    /// Distance between adjacent card origins, in percent.
    pub fn step_percent(&self) -> f32 {
        self.item_width_percent + self.gap_percent
    }

    fn max_offset(&self) -> f32 {
        self.item_count.saturating_sub(1) as f32 * self.step_percent()
    }
}

/// Output hooks for a [`CarouselController`].
pub struct CarouselHooks {
    on_offset: Rc<dyn Fn(f32)>,
    on_index_change: Option<Rc<dyn Fn(usize)>>,
    on_swipe_start: Option<Rc<dyn Fn()>>,
    on_swipe_end: Option<Rc<dyn Fn()>>,
}

impl CarouselHooks {
    /// `on_offset` receives the offset in percent every frame the value
    /// moves; it is the controller's whole presentation surface.
    pub fn new(on_offset: impl Fn(f32) + 'static) -> Self {
        Self {
            on_offset: Rc::new(on_offset),
            on_index_change: None,
            on_swipe_start: None,
            on_swipe_end: None,
        }
    }

    /// Fired on settle, only when the index actually changed.
    pub fn with_index_change(mut self, callback: impl Fn(usize) + 'static) -> Self {
        self.on_index_change = Some(Rc::new(callback));
        self
    }

    pub fn with_swipe_start(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_swipe_start = Some(Rc::new(callback));
        self
    }

    pub fn with_swipe_end(mut self, callback: impl Fn() + 'static) -> Self {
        self.on_swipe_end = Some(Rc::new(callback));
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Dragging,
    Animating,
}

struct CarouselInner {
    config: RefCell<CarouselConfig>,
    frame_clock: FrameClock,
    arbiter: Option<GestureArbiter>,
    haptics: Rc<dyn Haptics>,
    hooks: CarouselHooks,
    enabled: Cell<bool>,
    phase: Cell<Phase>,
    // Persistent model: survives gestures, mutated by the drag handler, the
    // animation frame callback, and programmatic navigation only.
    current_index: Cell<usize>,
    offset: Cell<f32>,
    // Per-gesture state, reset on every touch-start.
    start_x: Cell<f32>,
    start_y: Cell<f32>,
    start_offset: Cell<f32>,
    direction_lock: Cell<Option<GestureDirection>>,
    tracker: RefCell<VelocityTracker>,
    edge_engaged: Cell<bool>,
    // At most one live animation; cancel-then-create.
    animation: RefCell<Option<AnimationHandle>>,
}

impl CarouselInner {
    fn try_claim(&self) -> bool {
        match &self.arbiter {
            Some(arbiter) => arbiter.claim(GestureOwner::Carousel, GestureDirection::Horizontal),
            None => true,
        }
    }

    fn release_claim(&self) {
        if let Some(arbiter) = &self.arbiter {
            arbiter.release(GestureOwner::Carousel);
        }
    }

    fn cancel_animation(&self) {
        if let Some(animation) = self.animation.borrow_mut().take() {
            animation.cancel();
        }
    }
}

/// Controller for a horizontally swipeable, index-snapping item carousel.
#[derive(Clone)]
pub struct CarouselController {
    inner: Rc<CarouselInner>,
}

impl CarouselController {
    pub fn new(
        frame_clock: FrameClock,
        config: CarouselConfig,
        arbiter: Option<GestureArbiter>,
        haptics: Rc<dyn Haptics>,
        hooks: CarouselHooks,
    ) -> Self {
        let initial_index = config.initial_index.min(config.item_count.saturating_sub(1));
        let initial_offset = clamp(
            initial_index as f32 * config.step_percent(),
            0.0,
            config.max_offset(),
        );
        (hooks.on_offset)(initial_offset);

        Self {
            inner: Rc::new(CarouselInner {
                config: RefCell::new(config),
                frame_clock,
                arbiter,
                haptics,
                hooks,
                enabled: Cell::new(true),
                phase: Cell::new(Phase::Idle),
                current_index: Cell::new(initial_index),
                offset: Cell::new(initial_offset),
                start_x: Cell::new(0.0),
                start_y: Cell::new(0.0),
                start_offset: Cell::new(initial_offset),
                direction_lock: Cell::new(None),
                tracker: RefCell::new(VelocityTracker::new()),
                edge_engaged: Cell::new(false),
                animation: RefCell::new(None),
            }),
        }
    }

    /// Begins a touch sequence.
    pub fn touch_start(&self, x: f32, y: f32, time_ms: f64) {
        let inner = &self.inner;
        if !inner.enabled.get() || inner.config.borrow().item_count <= 1 {
            return;
        }
        if !x.is_finite() || !y.is_finite() || !time_ms.is_finite() {
            return;
        }

        inner.cancel_animation();
        inner.phase.set(Phase::Dragging);
        inner.start_x.set(x);
        inner.start_y.set(y);
        inner.start_offset.set(inner.offset.get());
        inner.direction_lock.set(None);
        inner.edge_engaged.set(false);
        {
            let mut tracker = inner.tracker.borrow_mut();
            tracker.reset();
            tracker.add_sample(x, y, time_ms);
        }
        if let Some(on_swipe_start) = &inner.hooks.on_swipe_start {
            on_swipe_start();
        }
    }

    /// Feeds a touch movement. Returns `true` when the event was consumed
    /// (the gesture is locked horizontal and the host should suppress its
    /// default handling).
    pub fn touch_move(&self, x: f32, y: f32, time_ms: f64) -> bool {
        let inner = &self.inner;
        if inner.phase.get() != Phase::Dragging {
            return false;
        }
        if !x.is_finite() || !y.is_finite() || !time_ms.is_finite() {
            return false;
        }

        inner.tracker.borrow_mut().add_sample(x, y, time_ms);
        let delta_x = x - inner.start_x.get();
        let delta_y = y - inner.start_y.get();

        if inner.direction_lock.get().is_none() {
            let thresholds = inner.config.borrow().classify;
            if let Some(direction) = classify_direction(delta_x, delta_y, &thresholds) {
                if direction == GestureDirection::Horizontal && !inner.try_claim() {
                    // Another consumer owns this touch sequence; yield for
                    // the remainder of the gesture.
                    log::debug!("carousel claim denied, yielding");
                    inner.direction_lock.set(Some(GestureDirection::Vertical));
                } else {
                    inner.direction_lock.set(Some(direction));
                }
            }
        }

        if inner.direction_lock.get() != Some(GestureDirection::Horizontal) {
            return false;
        }

        let (damped, out_of_bounds) = {
            let config = inner.config.borrow();
            let width = config.container_width_px.max(1.0);
            let delta_percent = delta_x / width * 100.0;
            // Swiping left (negative delta) moves forward through the list.
            let candidate = inner.start_offset.get() - delta_percent;
            let max_offset = config.max_offset();
            let damped = rubber_band_clamp(
                candidate,
                0.0,
                max_offset,
                config.max_overscroll_percent,
                config.rubber_band_tension,
            );
            (damped, candidate < 0.0 || candidate > max_offset)
        };

        inner.offset.set(damped);
        (inner.hooks.on_offset)(damped);

        if out_of_bounds {
            if !inner.edge_engaged.replace(true) {
                inner.haptics.trigger(HapticKind::Edge);
            }
        } else {
            inner.edge_engaged.set(false);
        }
        true
    }

    /// Ends the touch sequence and snaps to the chosen index.
    pub fn touch_end(&self) {
        self.finish_gesture();
    }

    /// Host-side cancellation of the touch sequence; treated as a release.
    pub fn touch_cancel(&self) {
        self.finish_gesture();
    }

    fn finish_gesture(&self) {
        let inner = &self.inner;
        if inner.phase.get() != Phase::Dragging {
            return;
        }
        if let Some(on_swipe_end) = &inner.hooks.on_swipe_end {
            on_swipe_end();
        }

        let velocity_x = inner.tracker.borrow().velocity().x;
        let locked_horizontal = inner.direction_lock.get() == Some(GestureDirection::Horizontal);
        inner.release_claim();

        if !locked_horizontal {
            // The gesture never moved this axis; nothing to settle.
            inner.phase.set(Phase::Idle);
            return;
        }

        let target_index = {
            let config = inner.config.borrow();
            let step = config.step_percent();
            let offset = inner.offset.get();
            let raw = if velocity_x.abs() > config.flick_velocity_px_s {
                // Positive velocity = swipe right = go back one card.
                let direction = if velocity_x > 0.0 { -1.0 } else { 1.0 };
                inner.current_index.get() as f32 + direction
            } else if velocity_x.abs() > config.min_swipe_velocity_px_s {
                let bias = if velocity_x > 0.0 {
                    -config.velocity_index_bias
                } else {
                    config.velocity_index_bias
                };
                (offset / step + bias).round()
            } else {
                (offset / step).round()
            };
            clamp(raw, 0.0, config.item_count.saturating_sub(1) as f32) as usize
        };

        log::debug!(
            "carousel release: offset {:.1}% at {velocity_x:.0} px/s -> index {target_index}",
            inner.offset.get()
        );
        self.snap_to_index(target_index, velocity_x, true);
    }

    fn snap_to_index(&self, target_index: usize, velocity_px_s: f32, animated: bool) {
        let inner = &self.inner;
        inner.cancel_animation();

        let (target_offset, final_index, seed, spring) = {
            let config = inner.config.borrow();
            let step = config.step_percent();
            let target_offset = clamp(target_index as f32 * step, 0.0, config.max_offset());
            let final_index = (target_offset / step).round() as usize;
            let seed = -velocity_px_s * config.velocity_percent_scale;
            (target_offset, final_index, seed, config.snap_spring)
        };
        let previous_index = inner.current_index.get();

        if !animated {
            inner.phase.set(Phase::Idle);
            inner.offset.set(target_offset);
            (inner.hooks.on_offset)(target_offset);
            if final_index != previous_index {
                inner.current_index.set(final_index);
                if let Some(on_index_change) = &inner.hooks.on_index_change {
                    on_index_change(final_index);
                }
            }
            return;
        }

        inner.phase.set(Phase::Animating);
        let update_inner = Rc::clone(inner);
        let complete_inner = Rc::clone(inner);
        let handle = spring_animation_with_velocity(
            &inner.frame_clock,
            inner.offset.get(),
            target_offset,
            seed,
            spring,
            move |value| {
                update_inner.offset.set(value);
                (update_inner.hooks.on_offset)(value);
            },
            move || {
                complete_inner.animation.borrow_mut().take();
                complete_inner.phase.set(Phase::Idle);
                complete_inner.offset.set(target_offset);
                if final_index != previous_index {
                    complete_inner.current_index.set(final_index);
                    if let Some(on_index_change) = &complete_inner.hooks.on_index_change {
                        on_index_change(final_index);
                    }
                    complete_inner.haptics.trigger(HapticKind::Selection);
                }
            },
        );
        *inner.animation.borrow_mut() = Some(handle);
    }

    /// Programmatic navigation; bypasses the drag path entirely.
    pub fn go_to_index(&self, index: usize, animated: bool) {
        let inner = &self.inner;
        if inner.phase.get() == Phase::Dragging {
            log::debug!("go_to_index ignored mid-drag");
            return;
        }
        let item_count = inner.config.borrow().item_count;
        if item_count == 0 {
            return;
        }
        self.snap_to_index(index.min(item_count - 1), 0.0, animated);
    }

    /// Resynchronizes from an externally changed selection.
    ///
    /// Applied immediately (without animation or settle callbacks) when
    /// idle; dropped while a drag or an animation is in progress so a
    /// user-driven motion is never interrupted from outside.
    pub fn sync_index(&self, index: usize) {
        let inner = &self.inner;
        if inner.phase.get() != Phase::Idle {
            log::trace!("external resync to {index} dropped mid-gesture");
            return;
        }
        let (target_offset, index) = {
            let config = inner.config.borrow();
            if config.item_count == 0 {
                return;
            }
            let index = index.min(config.item_count - 1);
            let target = clamp(
                index as f32 * config.step_percent(),
                0.0,
                config.max_offset(),
            );
            (target, index)
        };
        if index == inner.current_index.get() {
            return;
        }
        inner.current_index.set(index);
        inner.offset.set(target_offset);
        (inner.hooks.on_offset)(target_offset);
    }

    /// Updates the backing item count (the listing set changed upstream).
    pub fn set_item_count(&self, item_count: usize) {
        let inner = &self.inner;
        inner.config.borrow_mut().item_count = item_count;
        if item_count == 0 {
            return;
        }
        let max_index = item_count - 1;
        if inner.current_index.get() > max_index {
            inner.current_index.set(max_index);
        }
        if inner.phase.get() == Phase::Idle {
            let target = {
                let config = inner.config.borrow();
                clamp(
                    inner.current_index.get() as f32 * config.step_percent(),
                    0.0,
                    config.max_offset(),
                )
            };
            if (target - inner.offset.get()).abs() > f32::EPSILON {
                inner.offset.set(target);
                (inner.hooks.on_offset)(target);
            }
        }
    }

    pub fn set_container_width(&self, width_px: f32) {
        if width_px.is_finite() && width_px > 0.0 {
            self.inner.config.borrow_mut().container_width_px = width_px;
        }
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.inner.enabled.set(enabled);
    }

    pub fn current_index(&self) -> usize {
        self.inner.current_index.get()
    }

    pub fn offset_percent(&self) -> f32 {
        self.inner.offset.get()
    }

    pub fn is_dragging(&self) -> bool {
        self.inner.phase.get() == Phase::Dragging
    }

    pub fn is_animating(&self) -> bool {
        self.inner.phase.get() == Phase::Animating
    }

    /// Offset that centers the first card, for hosts composing the track
    /// transform as `initial_centering - offset`.
    pub fn initial_centering_offset_percent(&self) -> f32 {
        (100.0 - self.inner.config.borrow().item_width_percent) / 2.0
    }
}
