//! Smoothed mirror of the page scroll position.

use serde::Serialize;
use tracing::{debug, trace};

use super::throttle::SignalThrottle;
use crate::config::ProgressConfig;
use crate::timer::{Clock, MonotonicClock};
use crate::Result;

/// Sign of the last change in raw scroll offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDirection {
    Up,
    Down,
    #[default]
    None,
}

impl ScrollDirection {
    fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            ScrollDirection::Down
        } else if delta < 0.0 {
            ScrollDirection::Up
        } else {
            ScrollDirection::None
        }
    }
}

/// Values exposed to the render sink
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScrollProgressState {
    /// Instantaneous scroll fraction, 0 = top, 1 = bottom
    pub raw_progress: f64,
    /// Smoothed value that trails `raw_progress`
    pub display_progress: f64,
    pub direction: ScrollDirection,
}

/// Raw scroll signal as delivered by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollSample {
    pub offset: f64,
    pub viewport_height: f64,
    pub document_height: f64,
}

/// A marker changed sides
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdCrossing {
    pub marker: String,
    pub threshold: f64,
    /// true when the displayed progress moved above the threshold
    pub entered: bool,
}

#[derive(Debug, Clone)]
struct Marker {
    name: String,
    threshold: f64,
    active: bool,
}

/// Map a scroll offset to [0, 1]
///
/// A document that fits inside the viewport has nothing to scroll and maps to 0.
pub fn raw_progress(offset: f64, viewport_height: f64, document_height: f64) -> f64 {
    let scrollable = document_height - viewport_height;
    if !(scrollable > 0.0) || !offset.is_finite() {
        return 0.0;
    }
    (offset / scrollable).clamp(0.0, 1.0)
}

/// Converts raw scroll signals into a smoothed progress value
///
/// `on_scroll_signal` and `tick` may interleave freely; both run on the
/// caller's thread and touch only this instance.
#[derive(Debug)]
pub struct ScrollProgressModel<C: Clock = MonotonicClock> {
    clock: C,
    config: ProgressConfig,
    throttle: SignalThrottle<ScrollSample>,
    state: ScrollProgressState,
    last_offset: Option<f64>,
    viewport_height: f64,
    document_height: f64,
    markers: Vec<Marker>,
    crossings: Vec<ThresholdCrossing>,
    mounted: bool,
}

impl ScrollProgressModel<MonotonicClock> {
    /// Create with default configuration on the wall clock
    pub fn with_defaults() -> Self {
        Self::from_valid(ProgressConfig::default(), MonotonicClock::new())
    }
}

impl<C: Clock> ScrollProgressModel<C> {
    pub fn new(config: ProgressConfig, clock: C) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config, clock))
    }

    fn from_valid(config: ProgressConfig, clock: C) -> Self {
        let markers = config
            .markers
            .iter()
            .map(|m| Marker {
                name: m.name.clone(),
                threshold: m.threshold,
                active: false,
            })
            .collect();
        Self {
            throttle: SignalThrottle::new(config.throttle_interval()),
            clock,
            config,
            state: ScrollProgressState::default(),
            last_offset: None,
            viewport_height: 0.0,
            document_height: 0.0,
            markers,
            crossings: Vec::new(),
            mounted: true,
        }
    }

    #[inline]
    pub fn state(&self) -> ScrollProgressState {
        self.state
    }

    #[inline]
    pub fn display_progress(&self) -> f64 {
        self.state.display_progress
    }

    #[inline]
    pub fn raw_progress(&self) -> f64 {
        self.state.raw_progress
    }

    #[inline]
    pub fn direction(&self) -> ScrollDirection {
        self.state.direction
    }

    /// Last applied scroll offset
    pub fn offset(&self) -> f64 {
        self.last_offset.unwrap_or(0.0)
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Nothing left to animate: display has caught up and no sample is parked
    pub fn is_settled(&self) -> bool {
        self.state.display_progress == self.state.raw_progress && !self.throttle.has_parked()
    }

    /// Feed a scroll event
    pub fn on_scroll_signal(&mut self, raw_offset: f64, viewport_height: f64, document_height: f64) {
        if !self.mounted {
            return;
        }
        let sample = ScrollSample {
            offset: raw_offset,
            viewport_height,
            document_height,
        };
        let now = self.clock.now();
        match self.throttle.offer(now, sample) {
            Some(sample) => self.apply(sample),
            None => trace!(offset = raw_offset, "Scroll signal parked by throttle"),
        }
    }

    /// Page or viewport changed size; the smoothed value is left alone
    pub fn on_resize(&mut self, viewport_height: f64, document_height: f64) {
        if !self.mounted {
            return;
        }
        self.viewport_height = viewport_height;
        self.document_height = document_height;
        // A sample parked before the resize must not bring the old layout back
        if let Some(parked) = self.throttle.parked_mut() {
            parked.viewport_height = viewport_height;
            parked.document_height = document_height;
        }
        self.state.raw_progress = raw_progress(self.offset(), viewport_height, document_height);
        debug!(
            viewport_height,
            document_height,
            raw = self.state.raw_progress,
            "Recomputed progress after resize"
        );
    }

    fn apply(&mut self, sample: ScrollSample) {
        let offset = sample.offset.max(0.0);
        let first = self.last_offset.is_none();
        self.state.direction = match self.last_offset {
            Some(prev) => ScrollDirection::from_delta(offset - prev),
            None => ScrollDirection::None,
        };
        self.last_offset = Some(offset);
        self.viewport_height = sample.viewport_height;
        self.document_height = sample.document_height;
        self.state.raw_progress =
            raw_progress(offset, sample.viewport_height, sample.document_height);

        if first && self.config.jump_on_first_paint {
            self.state.display_progress = self.state.raw_progress;
        }
    }

    /// Smoothing factor for the current displayed value
    fn smoothing_factor(&self) -> f64 {
        let display = self.state.display_progress;
        let near = self
            .config
            .smoothing_thresholds
            .iter()
            .any(|t| (display - t).abs() < self.config.threshold_band);
        if near {
            self.config.near_factor
        } else {
            self.config.far_factor
        }
    }

    /// Advance one animation frame and return the displayed progress
    pub fn tick(&mut self) -> f64 {
        if !self.mounted {
            return self.state.display_progress;
        }
        if let Some(sample) = self.throttle.flush(self.clock.now()) {
            self.apply(sample);
        }

        let raw = self.state.raw_progress;
        let display = self.state.display_progress;
        let diff = raw - display;
        self.state.display_progress = if diff.abs() < self.config.snap_epsilon {
            raw
        } else {
            display + diff * self.smoothing_factor()
        };
        debug_assert!((0.0..=1.0).contains(&self.state.display_progress));

        self.update_markers();
        self.state.display_progress
    }

    fn update_markers(&mut self) {
        let display = self.state.display_progress;
        for marker in &mut self.markers {
            let active = display > marker.threshold;
            if active != marker.active {
                marker.active = active;
                debug!(
                    marker = %marker.name,
                    threshold = marker.threshold,
                    entered = active,
                    "Progress marker crossed"
                );
                self.crossings.push(ThresholdCrossing {
                    marker: marker.name.clone(),
                    threshold: marker.threshold,
                    entered: active,
                });
            }
        }
    }

    /// Strictly above `value`
    #[inline]
    pub fn crossed_threshold(&self, value: f64) -> bool {
        self.state.display_progress > value
    }

    /// Whether a named marker is currently lit
    pub fn marker_active(&self, name: &str) -> bool {
        self.markers
            .iter()
            .any(|m| m.name == name && m.active)
    }

    /// Drain marker changes recorded since the last call
    pub fn take_crossings(&mut self) -> Vec<ThresholdCrossing> {
        std::mem::take(&mut self.crossings)
    }

    /// Stop reacting to signals and frames
    pub fn unmount(&mut self) {
        if self.mounted {
            debug!("Scroll progress model unmounted");
        }
        self.mounted = false;
        self.throttle.clear();
    }
}
