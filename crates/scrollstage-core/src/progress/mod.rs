//! Scroll progress tracking
//!
//! - `throttle` - Last-value-wins signal throttle
//! - `model` - Progress model combining raw mapping, smoothing and markers
//!
//! # Usage
//!
//! ```ignore
//! use scrollstage_core::progress::ScrollProgressModel;
//!
//! let mut model = ScrollProgressModel::with_defaults();
//!
//! // From the scroll handler
//! model.on_scroll_signal(offset, viewport_height, document_height);
//!
//! // Once per frame
//! let progress = model.tick();
//! for crossing in model.take_crossings() {
//!     // light up endpoint markers
//! }
//! ```

pub mod model;
pub mod throttle;

pub use model::{
    raw_progress, ScrollDirection, ScrollProgressModel, ScrollProgressState, ScrollSample,
    ThresholdCrossing,
};
pub use throttle::SignalThrottle;
