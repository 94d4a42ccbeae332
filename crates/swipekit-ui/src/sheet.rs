//! Bottom-sheet drag controller.
//!
//! A continuous height value (viewport fraction) constrained to a small set
//! of snap points. Movement is inverted relative to the carousel: dragging
//! up grows the sheet. Drags may only start inside the handle band at the
//! sheet's top edge, so the rest of the surface can host its own scrollable
//! content.
//!
//! Release velocity intentionally does not use the weighted tracker: the
//! sheet samples its own short window (the last few move events) and takes
//! the first-to-last secant, which is what the snap selector's thresholds
//! were tuned against.

use crate::config;
use crate::haptics::{HapticKind, Haptics};
use crate::snap::{select_snap_point, SnapPoints};
use smallvec::SmallVec;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use swipekit_core::FrameClock;
use swipekit_gesture::{GestureArbiter, GestureDirection, GestureOwner};
use swipekit_physics::{
    rubber_band_clamp, spring_animation_with_velocity, AnimationHandle, SpringConfig,
};

/// Number of trailing move samples the release velocity is computed from.
const RELEASE_VELOCITY_WINDOW: usize = 5;

/// Tuning for a [`SheetController`]. Defaults come from [`config::sheet`].
#[derive(Clone, Debug)]
pub struct SheetConfig {
    pub snap_points: SnapPoints,
    pub viewport_height_px: f32,
    /// Height of the drag-handle band at the sheet's top edge.
    pub handle_height_px: f32,
    pub flick_velocity_px_s: f32,
    pub max_overscroll_fraction: f32,
    /// Rubber-band tension; lower = stiffer, shorter travel.
    pub rubber_band_resistance: f32,
    pub snap_spring: SpringConfig,
    pub initial_height: f32,
}

impl SheetConfig {
    pub fn new(viewport_height_px: f32) -> Self {
        Self {
            snap_points: config::snap_points_without_selection(),
            viewport_height_px,
            handle_height_px: config::sheet::DRAG_HANDLE_HEIGHT_PX,
            flick_velocity_px_s: config::sheet::FLICK_VELOCITY_PX_S,
            max_overscroll_fraction: config::sheet::MAX_OVERSCROLL_FRACTION,
            rubber_band_resistance: config::sheet::RUBBER_BAND_RESISTANCE,
            snap_spring: SpringConfig::default(),
            initial_height: config::sheet::SNAP_COLLAPSED,
        }
    }
}

/// Output hooks for a [`SheetController`].
pub struct SheetHooks {
    on_height: Rc<dyn Fn(f32)>,
    on_snap_change: Option<Rc<dyn Fn(f32)>>,
}

impl SheetHooks {
    /// `on_height` receives the height fraction every frame the value moves.
    pub fn new(on_height: impl Fn(f32) + 'static) -> Self {
        Self {
            on_height: Rc::new(on_height),
            on_snap_change: None,
        }
    }

    /// Fired when a gesture settles on a different snap point than the one
    /// the gesture started from.
    pub fn with_snap_change(mut self, callback: impl Fn(f32) + 'static) -> Self {
        self.on_snap_change = Some(Rc::new(callback));
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Idle,
    Dragging,
    Animating,
}

struct SheetInner {
    config: RefCell<SheetConfig>,
    frame_clock: FrameClock,
    arbiter: Option<GestureArbiter>,
    haptics: Rc<dyn Haptics>,
    hooks: SheetHooks,
    phase: Cell<Phase>,
    /// Current height fraction; the committed value between gestures and
    /// the live value during drags and animations.
    height: Cell<f32>,
    start_y: Cell<f32>,
    start_height: Cell<f32>,
    /// Trailing (y, time_ms) move samples for the release secant.
    release_window: RefCell<SmallVec<[(f32, f64); RELEASE_VELOCITY_WINDOW]>>,
    animation: RefCell<Option<AnimationHandle>>,
    /// Set when the user manually collapses; cleared by a selection event.
    suppress_auto_expand: Cell<bool>,
    selection_active: Cell<bool>,
}

impl SheetInner {
    fn try_claim(&self) -> bool {
        match &self.arbiter {
            Some(arbiter) => arbiter.claim(GestureOwner::Sheet, GestureDirection::Vertical),
            None => true,
        }
    }

    fn release_claim(&self) {
        if let Some(arbiter) = &self.arbiter {
            arbiter.release(GestureOwner::Sheet);
        }
    }

    fn cancel_animation(&self) {
        if let Some(animation) = self.animation.borrow_mut().take() {
            animation.cancel();
        }
    }

    /// The sheet's top edge in the host's pixel space.
    fn sheet_top_px(&self) -> f32 {
        let config = self.config.borrow();
        config.viewport_height_px * (1.0 - self.height.get())
    }
}

/// Controller for a vertically draggable bottom sheet with snap points.
#[derive(Clone)]
pub struct SheetController {
    inner: Rc<SheetInner>,
}

impl SheetController {
    pub fn new(
        frame_clock: FrameClock,
        config: SheetConfig,
        arbiter: Option<GestureArbiter>,
        haptics: Rc<dyn Haptics>,
        hooks: SheetHooks,
    ) -> Self {
        let initial_height = config.snap_points.clamp(config.initial_height);
        (hooks.on_height)(initial_height);

        Self {
            inner: Rc::new(SheetInner {
                config: RefCell::new(config),
                frame_clock,
                arbiter,
                haptics,
                hooks,
                phase: Cell::new(Phase::Idle),
                height: Cell::new(initial_height),
                start_y: Cell::new(0.0),
                start_height: Cell::new(initial_height),
                release_window: RefCell::new(SmallVec::new()),
                animation: RefCell::new(None),
                suppress_auto_expand: Cell::new(false),
                selection_active: Cell::new(false),
            }),
        }
    }

    /// Begins a touch sequence. Touches outside the handle band at the
    /// sheet's current top edge are ignored so the content below can own
    /// its own gestures.
    pub fn touch_start(&self, _x: f32, y: f32, time_ms: f64) {
        let inner = &self.inner;
        if !y.is_finite() || !time_ms.is_finite() {
            return;
        }

        let offset_from_top = y - inner.sheet_top_px();
        let handle_height = inner.config.borrow().handle_height_px;
        if !(0.0..=handle_height).contains(&offset_from_top) {
            return;
        }
        if !inner.try_claim() {
            return;
        }

        inner.cancel_animation();
        inner.phase.set(Phase::Dragging);
        inner.start_y.set(y);
        inner.start_height.set(inner.height.get());
        let mut window = inner.release_window.borrow_mut();
        window.clear();
        window.push((y, time_ms));
    }

    /// Feeds a touch movement. Returns `true` when the sheet is tracking
    /// this gesture and the host should suppress its default handling.
    pub fn touch_move(&self, _x: f32, y: f32, time_ms: f64) -> bool {
        let inner = &self.inner;
        if inner.phase.get() != Phase::Dragging {
            return false;
        }
        if !y.is_finite() || !time_ms.is_finite() {
            return false;
        }

        {
            let mut window = inner.release_window.borrow_mut();
            if window.len() == RELEASE_VELOCITY_WINDOW {
                window.remove(0);
            }
            window.push((y, time_ms));
        }

        // Dragging up (decreasing y) grows the sheet.
        let delta_y = inner.start_y.get() - y;
        let (damped, consumed) = {
            let config = inner.config.borrow();
            let viewport = config.viewport_height_px.max(1.0);
            let candidate = inner.start_height.get() + delta_y / viewport;
            let damped = rubber_band_clamp(
                candidate,
                config.snap_points.min(),
                config.snap_points.max(),
                config.max_overscroll_fraction,
                config.rubber_band_resistance,
            );
            (
                damped,
                delta_y.abs() > config::gesture::MIN_CLASSIFY_DISTANCE_PX,
            )
        };

        inner.height.set(damped);
        (inner.hooks.on_height)(damped);
        consumed
    }

    /// Ends the touch sequence and settles on a snap point.
    pub fn touch_end(&self) {
        self.finish_gesture(self.release_velocity_px_s());
    }

    /// Host-side cancellation; settles on the nearest snap point without
    /// flick behavior.
    pub fn touch_cancel(&self) {
        self.finish_gesture(0.0);
    }

    /// First-to-last secant over the trailing move window, in px/s.
    /// Positive = upward (growing).
    fn release_velocity_px_s(&self) -> f32 {
        let window = self.inner.release_window.borrow();
        let (Some(first), Some(last)) = (window.first(), window.last()) else {
            return 0.0;
        };
        let dt = (last.1 - first.1) / 1000.0;
        if dt <= 0.0 {
            return 0.0;
        }
        ((first.0 - last.0) as f64 / dt) as f32
    }

    fn finish_gesture(&self, velocity_px_s: f32) {
        let inner = &self.inner;
        if inner.phase.get() != Phase::Dragging {
            return;
        }
        inner.release_claim();

        let (target, seed, spring) = {
            let config = inner.config.borrow();
            let target = select_snap_point(
                inner.height.get(),
                velocity_px_s,
                &config.snap_points,
                config.flick_velocity_px_s,
            );
            // Seed in fraction/s so momentum carries into the settle.
            let seed = velocity_px_s / config.viewport_height_px.max(1.0);
            (target, seed, config.snap_spring)
        };

        let started_from = inner.start_height.get();
        log::debug!(
            "sheet release: {:.3} at {velocity_px_s:.0} px/s -> {target:.3}",
            inner.height.get()
        );

        // A user-driven collapse suppresses auto-expand until the next
        // selection event.
        if target < started_from - f32::EPSILON {
            inner.suppress_auto_expand.set(true);
        }

        self.animate_to(target, seed, Some(started_from));
    }

    /// Starts the settle spring. When `gesture_start` is set, the settle
    /// reports snap changes and haptics; programmatic moves stay silent.
    fn animate_to(&self, target: f32, seed_velocity: f32, gesture_start: Option<f32>) {
        let inner = &self.inner;
        inner.cancel_animation();
        inner.phase.set(Phase::Animating);

        let spring = inner.config.borrow().snap_spring;
        let update_inner = Rc::clone(inner);
        let complete_inner = Rc::clone(inner);
        let handle = spring_animation_with_velocity(
            &inner.frame_clock,
            inner.height.get(),
            target,
            seed_velocity,
            spring,
            move |value| {
                update_inner.height.set(value);
                (update_inner.hooks.on_height)(value);
            },
            move || {
                complete_inner.animation.borrow_mut().take();
                complete_inner.phase.set(Phase::Idle);
                complete_inner.height.set(target);
                if let Some(started_from) = gesture_start {
                    if (target - started_from).abs() > f32::EPSILON {
                        if let Some(on_snap_change) = &complete_inner.hooks.on_snap_change {
                            on_snap_change(target);
                        }
                        complete_inner.haptics.trigger(HapticKind::Snap);
                    }
                }
            },
        );
        *inner.animation.borrow_mut() = Some(handle);
    }

    /// Programmatically moves the sheet to `fraction` (clamped to the snap
    /// range). Does not report a snap change; the caller already knows.
    pub fn set_height(&self, fraction: f32, animated: bool) {
        let inner = &self.inner;
        if !fraction.is_finite() {
            return;
        }
        if inner.phase.get() == Phase::Dragging {
            log::debug!("set_height ignored mid-drag");
            return;
        }
        let target = inner.config.borrow().snap_points.clamp(fraction);
        if animated {
            self.animate_to(target, 0.0, None);
        } else {
            inner.cancel_animation();
            inner.phase.set(Phase::Idle);
            inner.height.set(target);
            (inner.hooks.on_height)(target);
        }
    }

    /// Expands to the top snap point unless the user has manually collapsed
    /// the sheet since the last selection event.
    pub fn request_auto_expand(&self) {
        let inner = &self.inner;
        if inner.suppress_auto_expand.get() {
            log::debug!("auto-expand suppressed by manual collapse");
            return;
        }
        let target = inner.config.borrow().snap_points.max();
        self.set_height(target, true);
    }

    /// Switches between the with- and without-selection snap sets and
    /// clears auto-expand suppression. If the committed height falls
    /// outside the new range, the sheet animates back inside it.
    pub fn set_selection_active(&self, active: bool) {
        let inner = &self.inner;
        if inner.selection_active.replace(active) == active {
            return;
        }
        inner.suppress_auto_expand.set(false);

        let (needs_reclamp, max) = {
            let mut config = inner.config.borrow_mut();
            config.snap_points = if active {
                config::snap_points_with_selection()
            } else {
                config::snap_points_without_selection()
            };
            let max = config.snap_points.max();
            (inner.height.get() > max, max)
        };
        if needs_reclamp && inner.phase.get() != Phase::Dragging {
            self.set_height(max, true);
        }
    }

    pub fn set_viewport_height(&self, height_px: f32) {
        if height_px.is_finite() && height_px > 0.0 {
            self.inner.config.borrow_mut().viewport_height_px = height_px;
        }
    }

    pub fn height_fraction(&self) -> f32 {
        self.inner.height.get()
    }

    pub fn is_dragging(&self) -> bool {
        self.inner.phase.get() == Phase::Dragging
    }

    pub fn is_animating(&self) -> bool {
        self.inner.phase.get() == Phase::Animating
    }

    pub fn selection_active(&self) -> bool {
        self.inner.selection_active.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::haptics::test_support::RecordingHaptics;
    use swipekit_core::Runtime;

    const FRAME_NANOS: u64 = 16_000_000;
    const VIEWPORT: f32 = 1000.0;

    struct Fixture {
        runtime: Runtime,
        controller: SheetController,
        height: Rc<Cell<f32>>,
        snap_changes: Rc<RefCell<Vec<f32>>>,
        haptics: Rc<RefCell<Vec<HapticKind>>>,
    }

    fn fixture() -> Fixture {
        fixture_with(SheetConfig::new(VIEWPORT), None)
    }

    fn fixture_with(config: SheetConfig, arbiter: Option<GestureArbiter>) -> Fixture {
        let runtime = Runtime::new();
        let clock = runtime.handle().frame_clock();

        let height = Rc::new(Cell::new(0.0f32));
        let snap_changes = Rc::new(RefCell::new(Vec::new()));
        let recording = RecordingHaptics::default();
        let haptics = Rc::clone(&recording.triggered);

        let height_hook = Rc::clone(&height);
        let snap_hook = Rc::clone(&snap_changes);
        let hooks = SheetHooks::new(move |value| height_hook.set(value))
            .with_snap_change(move |value| snap_hook.borrow_mut().push(value));

        let controller = SheetController::new(clock, config, arbiter, Rc::new(recording), hooks);
        Fixture {
            runtime,
            controller,
            height,
            snap_changes,
            haptics,
        }
    }

    fn settle(fixture: &Fixture) {
        let mut frames = 0u64;
        while fixture.runtime.has_frame_callbacks() && frames < 2000 {
            frames += 1;
            fixture.runtime.drain_frame_callbacks(frames * FRAME_NANOS);
        }
        assert!(frames < 2000, "animation never settled");
    }

    /// Top of the sheet at height 0.3 with the 1000px viewport.
    const COLLAPSED_TOP: f32 = 700.0;

    #[test]
    fn touches_below_the_handle_are_ignored() {
        let f = fixture();
        f.controller.touch_start(50.0, COLLAPSED_TOP + 120.0, 0.0);
        assert!(!f.controller.is_dragging());

        // Above the sheet entirely.
        f.controller.touch_start(50.0, COLLAPSED_TOP - 5.0, 0.0);
        assert!(!f.controller.is_dragging());
    }

    #[test]
    fn drag_up_grows_the_sheet() {
        let f = fixture();
        f.controller.touch_start(50.0, COLLAPSED_TOP + 10.0, 0.0);
        assert!(f.controller.is_dragging());

        assert!(f.controller.touch_move(50.0, COLLAPSED_TOP - 110.0, 50.0));
        assert!((f.height.get() - 0.42).abs() < 1e-4, "got {}", f.height.get());
    }

    #[test]
    fn slow_release_settles_on_nearest_snap() {
        let f = fixture();
        f.controller.touch_start(50.0, COLLAPSED_TOP + 10.0, 0.0);
        // 120px upward over 400ms: 300 px/s, below the 800 px/s flick bar.
        f.controller.touch_move(50.0, COLLAPSED_TOP - 30.0, 100.0);
        f.controller.touch_move(50.0, COLLAPSED_TOP - 70.0, 200.0);
        f.controller.touch_move(50.0, COLLAPSED_TOP - 110.0, 400.0);
        f.controller.touch_end();
        settle(&f);

        assert_eq!(f.height.get(), 0.5);
        assert_eq!(*f.snap_changes.borrow(), vec![0.5]);
        assert_eq!(*f.haptics.borrow(), vec![HapticKind::Snap]);
    }

    #[test]
    fn strong_downward_flick_overrides_distance() {
        let mut config = SheetConfig::new(VIEWPORT);
        config.initial_height = 0.5;
        let f = fixture_with(config, None);
        let top = VIEWPORT * (1.0 - 0.5);

        f.controller.touch_start(50.0, top + 10.0, 0.0);
        // Down 80px in 50ms: -1600 px/s, position 0.42 still nearest to 0.5.
        f.controller.touch_move(50.0, top + 40.0, 20.0);
        f.controller.touch_move(50.0, top + 90.0, 50.0);
        assert!((f.height.get() - 0.42).abs() < 1e-4);
        f.controller.touch_end();
        settle(&f);

        assert_eq!(f.height.get(), 0.3);
        assert_eq!(*f.snap_changes.borrow(), vec![0.3]);
    }

    #[test]
    fn upward_flick_selects_next_higher_snap() {
        let f = fixture();
        let top = COLLAPSED_TOP;

        f.controller.touch_start(50.0, top + 10.0, 0.0);
        // Up 50px in 40ms: 1250 px/s; position 0.35 would round down to 0.3.
        f.controller.touch_move(50.0, top - 20.0, 20.0);
        f.controller.touch_move(50.0, top - 40.0, 40.0);
        f.controller.touch_end();
        settle(&f);

        assert_eq!(f.height.get(), 0.5);
    }

    #[test]
    fn overscroll_past_the_top_snap_is_rubber_banded() {
        let mut config = SheetConfig::new(VIEWPORT);
        config.initial_height = 0.75;
        let f = fixture_with(config, None);
        let top = VIEWPORT * (1.0 - 0.75);

        f.controller.touch_start(50.0, top + 10.0, 0.0);
        f.controller.touch_move(50.0, top - 190.0, 100.0);

        let height = f.height.get();
        assert!(height > 0.75, "expected overscroll, got {height}");
        assert!(height < 0.75 + 0.08, "rubber band must bound the excursion");
    }

    #[test]
    fn release_after_cancel_settles_without_flick() {
        let f = fixture();
        f.controller.touch_start(50.0, COLLAPSED_TOP + 10.0, 0.0);
        // Fast upward motion that would flick to 0.5 on a normal release.
        f.controller.touch_move(50.0, COLLAPSED_TOP - 30.0, 20.0);
        f.controller.touch_cancel();
        settle(&f);

        // 0.34 is nearest to 0.3: the cancel ignores the velocity.
        assert_eq!(f.height.get(), 0.3);
    }

    #[test]
    fn arbiter_claim_and_release_bracket_the_gesture() {
        let arbiter = GestureArbiter::new();
        let f = fixture_with(SheetConfig::new(VIEWPORT), Some(arbiter.clone()));

        f.controller.touch_start(50.0, COLLAPSED_TOP + 10.0, 0.0);
        assert!(arbiter.is_owner(GestureOwner::Sheet));

        f.controller.touch_end();
        assert!(!arbiter.is_active());
        settle(&f);
    }

    #[test]
    fn claimed_arbiter_blocks_the_sheet() {
        let arbiter = GestureArbiter::new();
        assert!(arbiter.claim(GestureOwner::Carousel, GestureDirection::Horizontal));
        let f = fixture_with(SheetConfig::new(VIEWPORT), Some(arbiter.clone()));

        f.controller.touch_start(50.0, COLLAPSED_TOP + 10.0, 0.0);
        assert!(!f.controller.is_dragging());
    }

    #[test]
    fn manual_collapse_suppresses_auto_expand() {
        let mut config = SheetConfig::new(VIEWPORT);
        config.initial_height = 0.5;
        let f = fixture_with(config, None);
        let top = VIEWPORT * (1.0 - 0.5);

        // User drags down to collapsed.
        f.controller.touch_start(50.0, top + 10.0, 0.0);
        f.controller.touch_move(50.0, top + 100.0, 50.0);
        f.controller.touch_move(50.0, top + 160.0, 100.0);
        f.controller.touch_end();
        settle(&f);
        assert_eq!(f.height.get(), 0.3);

        f.controller.request_auto_expand();
        settle(&f);
        assert_eq!(f.height.get(), 0.3, "auto-expand should be suppressed");

        // A new selection clears the suppression.
        f.controller.set_selection_active(true);
        f.controller.request_auto_expand();
        settle(&f);
        assert_eq!(f.height.get(), 0.9);
    }

    #[test]
    fn selection_swap_changes_the_snap_set() {
        let f = fixture();
        f.controller.set_selection_active(true);
        f.controller.set_height(0.9, false);
        assert_eq!(f.height.get(), 0.9);

        // Dropping the selection shrinks the range; the sheet re-enters it.
        f.controller.set_selection_active(false);
        settle(&f);
        assert_eq!(f.height.get(), 0.75);
    }

    #[test]
    fn programmatic_set_height_reports_nothing() {
        let f = fixture();
        f.controller.set_height(0.75, false);
        assert_eq!(f.height.get(), 0.75);
        assert!(f.snap_changes.borrow().is_empty());
        assert!(f.haptics.borrow().is_empty());
    }

    #[test]
    fn settling_back_where_the_gesture_started_reports_nothing() {
        let f = fixture();
        f.controller.touch_start(50.0, COLLAPSED_TOP + 10.0, 0.0);
        f.controller.touch_move(50.0, COLLAPSED_TOP - 40.0, 300.0);
        f.controller.touch_end();
        settle(&f);

        assert_eq!(f.height.get(), 0.3);
        assert!(f.snap_changes.borrow().is_empty());
        assert!(f.haptics.borrow().is_empty());
    }

    #[test]
    fn new_drag_cancels_in_flight_settle() {
        let f = fixture();
        f.controller.set_height(0.75, true);
        f.runtime.drain_frame_callbacks(FRAME_NANOS);
        assert!(f.controller.is_animating());

        // The sheet's top has moved with the animated height.
        let top = VIEWPORT * (1.0 - f.height.get());
        f.controller.touch_start(50.0, top + 10.0, 1000.0);
        assert!(f.controller.is_dragging());

        let frozen = f.height.get();
        f.runtime.drain_frame_callbacks(2 * FRAME_NANOS);
        assert_eq!(f.height.get(), frozen, "cancelled animation kept running");
    }
}
