//! Gesture ownership arbitration.
//!
//! A single shared ledger records which gesture consumer owns the active
//! touch sequence and on which axis. Claiming succeeds when the slot is
//! free or already held by the claimant (whose direction is then updated in
//! place); a release from anyone else is a safe no-op. This is the only
//! coordination between the bottom sheet's vertical drag and the carousel's
//! horizontal swipe.
//!
//! The protocol is advisory mutual exclusion without a mutex, valid only
//! because the runtime is single-threaded and cooperative. A port to a
//! multi-threaded host would need a real lock or a message-passing boundary
//! here.

use crate::direction::GestureDirection;
use std::cell::RefCell;
use std::rc::Rc;

/// A gesture consumer competing for the touch stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureOwner {
    Carousel,
    Sheet,
}

/// Snapshot of the arbiter's ledger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureState {
    pub owner: Option<GestureOwner>,
    pub direction: Option<GestureDirection>,
    pub is_dragging: bool,
}

impl GestureState {
    const IDLE: GestureState = GestureState {
        owner: None,
        direction: None,
        is_dragging: false,
    };
}

/// Cheaply cloneable handle to the shared ownership ledger.
#[derive(Clone)]
pub struct GestureArbiter {
    state: Rc<RefCell<GestureState>>,
}

impl Default for GestureArbiter {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureArbiter {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(GestureState::IDLE)),
        }
    }

    /// Attempts to claim the active gesture for `owner`.
    ///
    /// Returns `true` when the gesture was unowned or already held by
    /// `owner` (in which case the direction is updated in place); `false`,
    /// with no state change, when another consumer holds it.
    pub fn claim(&self, owner: GestureOwner, direction: GestureDirection) -> bool {
        let mut state = self.state.borrow_mut();
        match state.owner {
            None => {
                *state = GestureState {
                    owner: Some(owner),
                    direction: Some(direction),
                    is_dragging: true,
                };
                log::trace!("gesture claimed by {owner:?} ({direction:?})");
                true
            }
            Some(current) if current == owner => {
                state.direction = Some(direction);
                true
            }
            Some(current) => {
                log::trace!("gesture claim by {owner:?} denied, owned by {current:?}");
                false
            }
        }
    }

    /// Clears ownership if `owner` holds it; a stale release is a no-op.
    pub fn release(&self, owner: GestureOwner) {
        let mut state = self.state.borrow_mut();
        if state.owner == Some(owner) {
            *state = GestureState::IDLE;
            log::trace!("gesture released by {owner:?}");
        }
    }

    pub fn state(&self) -> GestureState {
        *self.state.borrow()
    }

    pub fn is_owner(&self, owner: GestureOwner) -> bool {
        self.state.borrow().owner == Some(owner)
    }

    pub fn is_active(&self) -> bool {
        self.state.borrow().owner.is_some()
    }

    pub fn current_owner(&self) -> Option<GestureOwner> {
        self.state.borrow().owner
    }

    pub fn current_direction(&self) -> Option<GestureDirection> {
        self.state.borrow().direction
    }

    /// Marks `owner` as actively dragging, taking ownership if free.
    ///
    /// Unlike [`claim`](Self::claim) this leaves the direction untouched;
    /// it exists for consumers that know a drag has begun before the axis
    /// is classified.
    pub fn start_drag(&self, owner: GestureOwner) {
        let mut state = self.state.borrow_mut();
        if state.owner.is_none() || state.owner == Some(owner) {
            state.owner = Some(owner);
            state.is_dragging = true;
        }
    }

    /// Ends a drag owned by `owner`, resetting the ledger.
    pub fn end_drag(&self, owner: GestureOwner) {
        let mut state = self.state.borrow_mut();
        if state.owner == Some(owner) {
            *state = GestureState::IDLE;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_succeeds_when_unowned() {
        let arbiter = GestureArbiter::new();
        assert!(arbiter.claim(GestureOwner::Carousel, GestureDirection::Horizontal));
        let state = arbiter.state();
        assert_eq!(state.owner, Some(GestureOwner::Carousel));
        assert_eq!(state.direction, Some(GestureDirection::Horizontal));
        assert!(state.is_dragging);
    }

    #[test]
    fn competing_claim_is_denied_without_state_change() {
        let arbiter = GestureArbiter::new();
        assert!(arbiter.claim(GestureOwner::Carousel, GestureDirection::Horizontal));
        assert!(!arbiter.claim(GestureOwner::Sheet, GestureDirection::Vertical));

        let state = arbiter.state();
        assert_eq!(state.owner, Some(GestureOwner::Carousel));
        assert_eq!(state.direction, Some(GestureDirection::Horizontal));
    }

    #[test]
    fn reclaim_by_owner_updates_direction() {
        let arbiter = GestureArbiter::new();
        assert!(arbiter.claim(GestureOwner::Sheet, GestureDirection::Horizontal));
        assert!(arbiter.claim(GestureOwner::Sheet, GestureDirection::Vertical));
        assert_eq!(
            arbiter.current_direction(),
            Some(GestureDirection::Vertical)
        );
    }

    #[test]
    fn stale_release_is_a_no_op() {
        let arbiter = GestureArbiter::new();
        arbiter.claim(GestureOwner::Carousel, GestureDirection::Horizontal);

        arbiter.release(GestureOwner::Sheet);
        assert!(arbiter.is_owner(GestureOwner::Carousel));

        arbiter.release(GestureOwner::Carousel);
        assert_eq!(arbiter.current_owner(), None);
        assert!(!arbiter.is_active());
        assert!(!arbiter.state().is_dragging);
    }

    #[test]
    fn owner_none_implies_not_dragging() {
        let arbiter = GestureArbiter::new();
        arbiter.start_drag(GestureOwner::Sheet);
        assert!(arbiter.state().is_dragging);
        arbiter.end_drag(GestureOwner::Sheet);

        let state = arbiter.state();
        assert_eq!(state.owner, None);
        assert!(!state.is_dragging);
    }

    #[test]
    fn clones_share_the_ledger() {
        let arbiter = GestureArbiter::new();
        let other = arbiter.clone();
        assert!(arbiter.claim(GestureOwner::Carousel, GestureDirection::Horizontal));
        assert!(other.is_owner(GestureOwner::Carousel));
    }
}
