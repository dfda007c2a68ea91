pub mod config;
pub mod error;
pub mod frame;
pub mod motion;
pub mod progress;
pub mod sequence;
pub mod timer;
pub mod watcher;

pub use config::{AppConfig, DelayProfile, RetriggerPolicy, ThemeMode};
pub use error::{Error, Result};
pub use frame::{FrameControl, FrameLoop};
pub use progress::{ScrollDirection, ScrollProgressModel, ScrollProgressState};
pub use sequence::{Placement, SequenceDirection, StagedVisibilitySequencer, TriggerOutcome};
pub use timer::{Clock, ManualClock, MonotonicClock};
pub use watcher::{ThresholdWatcher, TargetId};
