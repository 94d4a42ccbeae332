//! Frame-clock facade over the runtime's callback registry.

use crate::runtime::{FrameCallbackId, RuntimeHandle};
use web_time::Instant;

/// Schedules one-shot callbacks for the next frame.
#[derive(Clone)]
pub struct FrameClock {
    runtime: RuntimeHandle,
}

impl FrameClock {
    pub fn new(runtime: RuntimeHandle) -> Self {
        Self { runtime }
    }

    pub fn runtime_handle(&self) -> RuntimeHandle {
        self.runtime.clone()
    }

    /// Registers `callback` to run on the next frame with the frame
    /// timestamp in nanoseconds.
    pub fn with_frame_nanos(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        let mut callback_opt = Some(callback);
        let runtime = self.runtime.clone();
        match runtime.register_frame_callback(move |time| {
            if let Some(callback) = callback_opt.take() {
                callback(time);
            }
        }) {
            Some(id) => FrameCallbackRegistration::new(runtime, id),
            None => FrameCallbackRegistration::inactive(runtime),
        }
    }

    /// Like [`with_frame_nanos`](Self::with_frame_nanos) but reports
    /// milliseconds.
    pub fn with_frame_millis(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> FrameCallbackRegistration {
        self.with_frame_nanos(move |nanos| {
            let millis = nanos / 1_000_000;
            callback(millis);
        })
    }
}

/// Keeps a scheduled frame callback alive.
///
/// Dropping the registration cancels the callback; [`cancel`] does the same
/// explicitly. Cancelling after the callback has already fired is a no-op.
///
/// [`cancel`]: FrameCallbackRegistration::cancel
pub struct FrameCallbackRegistration {
    runtime: RuntimeHandle,
    id: Option<FrameCallbackId>,
}

impl FrameCallbackRegistration {
    fn new(runtime: RuntimeHandle, id: FrameCallbackId) -> Self {
        Self {
            runtime,
            id: Some(id),
        }
    }

    fn inactive(runtime: RuntimeHandle) -> Self {
        Self { runtime, id: None }
    }

    pub fn cancel(mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

impl Drop for FrameCallbackRegistration {
    fn drop(&mut self) {
        if let Some(id) = self.id.take() {
            self.runtime.cancel_frame_callback(id);
        }
    }
}

/// Converts host wall time into the monotonic nanosecond timestamps
/// [`Runtime::drain_frame_callbacks`](crate::Runtime::drain_frame_callbacks)
/// expects.
pub struct FrameTimer {
    start: Instant,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_nanos(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Runtime;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn with_frame_nanos_delivers_frame_time() {
        let runtime = Runtime::new();
        let clock = runtime.handle().frame_clock();
        let seen = Rc::new(Cell::new(0u64));

        let seen_in_frame = Rc::clone(&seen);
        let _registration = clock.with_frame_nanos(move |t| seen_in_frame.set(t));
        runtime.drain_frame_callbacks(42);

        assert_eq!(seen.get(), 42);
    }

    #[test]
    fn dropping_registration_cancels() {
        let runtime = Runtime::new();
        let clock = runtime.handle().frame_clock();
        let fired = Rc::new(Cell::new(false));

        let flag = Rc::clone(&fired);
        let registration = clock.with_frame_nanos(move |_| flag.set(true));
        drop(registration);

        runtime.drain_frame_callbacks(0);
        assert!(!fired.get());
    }

    #[test]
    fn with_frame_millis_converts() {
        let runtime = Runtime::new();
        let clock = runtime.handle().frame_clock();
        let seen = Rc::new(Cell::new(0u64));

        let seen_in_frame = Rc::clone(&seen);
        let _registration = clock.with_frame_millis(move |t| seen_in_frame.set(t));
        runtime.drain_frame_callbacks(16_000_000);

        assert_eq!(seen.get(), 16);
    }
}
