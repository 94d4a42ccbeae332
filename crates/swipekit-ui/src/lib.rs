//! Gesture controllers for swipekit.
//!
//! Two consumers share one touch stream and one arbiter:
//!
//! - [`CarouselController`]: a horizontally swipeable, index-snapping card
//!   list
//! - [`SheetController`]: a vertically draggable bottom sheet with a fixed
//!   set of resting heights
//!
//! Both are `Rc`-shared, single-threaded state machines mutated from
//! pointer callbacks and frame callbacks only; neither renders anything.
//! Presentation goes out through per-frame value hooks, discrete settle
//! callbacks, and the [`Haptics`] trait.

pub mod config;

mod carousel;
mod haptics;
mod sheet;
mod snap;

pub use carousel::{CarouselConfig, CarouselController, CarouselHooks};
pub use haptics::{HapticKind, Haptics, NoopHaptics};
pub use sheet::{SheetConfig, SheetController, SheetHooks};
pub use snap::{select_snap_point, SnapPoints};
