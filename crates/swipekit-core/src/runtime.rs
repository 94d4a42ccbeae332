//! Single-threaded frame-callback runtime.
//!
//! The runtime owns a FIFO registry of one-shot frame callbacks. Animation
//! drivers register a callback for the next frame; the host (an event loop,
//! or a test) advances time by calling [`Runtime::drain_frame_callbacks`]
//! with the current frame timestamp in nanoseconds.
//!
//! Everything here is cooperative and single-threaded: callbacks run on the
//! thread that drains them, and callbacks registered while a drain is in
//! progress are deferred to the next drain so a self-rescheduling animation
//! advances exactly one step per frame.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

/// Identifier for a registered frame callback.
pub type FrameCallbackId = u64;

struct FrameCallbackEntry {
    id: FrameCallbackId,
    callback: Option<Box<dyn FnOnce(u64) + 'static>>,
}

struct RuntimeInner {
    next_frame_callback_id: Cell<FrameCallbackId>,
    frame_callbacks: RefCell<VecDeque<FrameCallbackEntry>>,
}

impl RuntimeInner {
    fn new() -> Self {
        Self {
            next_frame_callback_id: Cell::new(1),
            frame_callbacks: RefCell::new(VecDeque::new()),
        }
    }

    fn register_frame_callback(&self, callback: Box<dyn FnOnce(u64) + 'static>) -> FrameCallbackId {
        let id = self.next_frame_callback_id.get();
        self.next_frame_callback_id.set(id + 1);
        self.frame_callbacks
            .borrow_mut()
            .push_back(FrameCallbackEntry {
                id,
                callback: Some(callback),
            });
        id
    }

    fn cancel_frame_callback(&self, id: FrameCallbackId) {
        let mut callbacks = self.frame_callbacks.borrow_mut();
        if let Some(index) = callbacks.iter().position(|entry| entry.id == id) {
            callbacks.remove(index);
        }
    }

    fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        // Take the current batch first; callbacks registered while running
        // (e.g. an animation scheduling its next step) run on the next drain.
        let mut pending: Vec<Box<dyn FnOnce(u64) + 'static>> = Vec::new();
        {
            let mut callbacks = self.frame_callbacks.borrow_mut();
            pending.reserve(callbacks.len());
            while let Some(mut entry) = callbacks.pop_front() {
                if let Some(callback) = entry.callback.take() {
                    pending.push(callback);
                }
            }
        }
        for callback in pending {
            callback(frame_time_nanos);
        }
    }

    fn has_frame_callbacks(&self) -> bool {
        !self.frame_callbacks.borrow().is_empty()
    }
}

/// Owner of the frame-callback registry.
///
/// Hosts create one `Runtime` per UI surface, hand out [`RuntimeHandle`]s to
/// anything that needs to schedule frames, and drive it from their frame
/// source:
///
/// ```ignore
/// let runtime = Runtime::new();
/// let clock = runtime.handle().frame_clock();
/// // each vsync / rAF tick:
/// runtime.drain_frame_callbacks(frame_time_nanos);
/// ```
pub struct Runtime {
    inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RuntimeInner::new()),
        }
    }

    /// Returns a cloneable, weak handle to this runtime.
    pub fn handle(&self) -> RuntimeHandle {
        RuntimeHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Runs every callback registered before this call with the given frame
    /// timestamp, in registration order.
    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        self.inner.drain_frame_callbacks(frame_time_nanos);
    }

    /// True while at least one callback is waiting for the next frame.
    ///
    /// Hosts use this to decide whether to request another frame.
    pub fn has_frame_callbacks(&self) -> bool {
        self.inner.has_frame_callbacks()
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak handle to a [`Runtime`].
///
/// Registration through a handle whose runtime is gone is a no-op returning
/// `None`; animations degrade to "never advances" instead of panicking.
#[derive(Clone)]
pub struct RuntimeHandle {
    inner: Weak<RuntimeInner>,
}

impl RuntimeHandle {
    pub fn register_frame_callback(
        &self,
        callback: impl FnOnce(u64) + 'static,
    ) -> Option<FrameCallbackId> {
        let inner = self.inner.upgrade()?;
        Some(inner.register_frame_callback(Box::new(callback)))
    }

    pub fn cancel_frame_callback(&self, id: FrameCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel_frame_callback(id);
        }
    }

    /// Convenience for tests and embedded drivers; see
    /// [`Runtime::drain_frame_callbacks`].
    pub fn drain_frame_callbacks(&self, frame_time_nanos: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.drain_frame_callbacks(frame_time_nanos);
        }
    }

    pub fn frame_clock(&self) -> crate::FrameClock {
        crate::FrameClock::new(self.clone())
    }
}
