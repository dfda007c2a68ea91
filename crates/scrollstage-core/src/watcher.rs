//! Viewport intersection watching
//!
//! A [`ThresholdWatcher`] reports `(is_intersecting, ratio)` for one region of
//! the page. Hosts with their own intersection source push updates through
//! [`ThresholdWatcher::deliver`]; hosts without one call
//! [`ThresholdWatcher::update`] with the current viewport and the watcher
//! computes the ratio itself, reporting only when a threshold is crossed.

use serde::Serialize;
use tracing::{debug, trace};

use crate::{Error, Result};

/// Opaque handle for an observed region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TargetId(pub u32);

/// Vertical span in document coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Region {
    pub top: f64,
    pub height: f64,
}

impl Region {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The visible window, also in document coordinates
pub type Viewport = Region;

/// Fraction of `region` inside `viewport`, in [0, 1]
pub fn intersection_ratio(region: Region, viewport: Viewport) -> f64 {
    if !(region.height > 0.0) {
        return 0.0;
    }
    let overlap = region.bottom().min(viewport.bottom()) - region.top.max(viewport.top);
    (overlap.max(0.0) / region.height).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IntersectionEntry {
    pub target: TargetId,
    pub ratio: f64,
    pub is_intersecting: bool,
}

/// Which side of `threshold` a ratio falls on; a zero threshold means "any overlap"
#[inline]
fn meets(ratio: f64, threshold: f64) -> bool {
    if threshold <= 0.0 {
        ratio > 0.0
    } else {
        ratio >= threshold
    }
}

#[derive(Debug, Clone, Copy)]
struct Subscription {
    target: TargetId,
    region: Region,
    threshold: f64,
    last_side: Option<bool>,
}

/// Subscription to "is this region at least X% inside the viewport"
pub struct ThresholdWatcher<F>
where
    F: FnMut(bool, f64),
{
    callback: F,
    subscription: Option<Subscription>,
}

impl<F> std::fmt::Debug for ThresholdWatcher<F>
where
    F: FnMut(bool, f64),
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThresholdWatcher")
            .field("subscription", &self.subscription)
            .finish_non_exhaustive()
    }
}

impl<F> ThresholdWatcher<F>
where
    F: FnMut(bool, f64),
{
    pub fn new(callback: F) -> Self {
        Self {
            callback,
            subscription: None,
        }
    }

    /// Start watching `target`, replacing any previous subscription
    pub fn observe(&mut self, target: TargetId, region: Region, ratio_threshold: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&ratio_threshold) {
            return Err(Error::InvalidThreshold {
                value: ratio_threshold,
                reason: "intersection ratio threshold must lie in [0, 1]".to_string(),
            });
        }
        debug!(target = target.0, threshold = ratio_threshold, "Observing region");
        self.subscription = Some(Subscription {
            target,
            region,
            threshold: ratio_threshold,
            last_side: None,
        });
        Ok(())
    }

    /// Stop watching; safe to call any number of times
    pub fn unobserve(&mut self) {
        if let Some(sub) = self.subscription.take() {
            debug!(target = sub.target.0, "Stopped observing region");
        }
    }

    pub fn is_observing(&self) -> bool {
        self.subscription.is_some()
    }

    pub fn target(&self) -> Option<TargetId> {
        self.subscription.map(|s| s.target)
    }

    pub fn threshold(&self) -> Option<f64> {
        self.subscription.map(|s| s.threshold)
    }

    /// Layout moved the observed region
    pub fn set_region(&mut self, region: Region) {
        if let Some(sub) = self.subscription.as_mut() {
            sub.region = region;
        }
    }

    /// Forward one intersection update to the callback
    ///
    /// Every update for the observed target is forwarded exactly once; there
    /// is no deduplication. Returns false when the update was not for us.
    pub fn deliver(&mut self, entry: IntersectionEntry) -> bool {
        match self.subscription.as_mut() {
            Some(sub) if sub.target == entry.target => {
                sub.last_side = Some(entry.is_intersecting);
                (self.callback)(entry.is_intersecting, entry.ratio);
                true
            }
            _ => false,
        }
    }

    /// Recompute against `viewport`; reports on the first computation and on
    /// every threshold crossing after that
    pub fn update(&mut self, viewport: Viewport) -> Option<IntersectionEntry> {
        let sub = self.subscription?;
        let ratio = intersection_ratio(sub.region, viewport);
        let side = meets(ratio, sub.threshold);
        if sub.last_side == Some(side) {
            return None;
        }
        trace!(target = sub.target.0, ratio, intersecting = side, "Threshold crossed");
        let entry = IntersectionEntry {
            target: sub.target,
            ratio,
            is_intersecting: side,
        };
        self.deliver(entry);
        Some(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<(bool, f64)>>>, impl FnMut(bool, f64)) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        (log, move |hit, ratio| sink.borrow_mut().push((hit, ratio)))
    }

    #[test]
    fn test_intersection_ratio() {
        let viewport = Viewport::new(0.0, 1000.0);
        assert_eq!(intersection_ratio(Region::new(100.0, 200.0), viewport), 1.0);
        assert_eq!(intersection_ratio(Region::new(900.0, 200.0), viewport), 0.5);
        assert_eq!(intersection_ratio(Region::new(1200.0, 200.0), viewport), 0.0);
        assert_eq!(intersection_ratio(Region::new(-100.0, 400.0), viewport), 0.75);
        assert_eq!(intersection_ratio(Region::new(0.0, 0.0), viewport), 0.0);
    }

    #[test]
    fn test_reports_initial_state_then_crossings_only() {
        let (log, callback) = recorder();
        let mut watcher = ThresholdWatcher::new(callback);
        watcher
            .observe(TargetId(1), Region::new(1000.0, 400.0), 0.5)
            .unwrap();

        assert!(watcher.update(Viewport::new(0.0, 1000.0)).is_some());
        // Still below threshold: no report
        assert!(watcher.update(Viewport::new(100.0, 1000.0)).is_none());
        let entry = watcher.update(Viewport::new(300.0, 1000.0)).unwrap();
        assert!(entry.is_intersecting);
        assert_eq!(entry.ratio, 0.75);
        assert!(watcher.update(Viewport::new(400.0, 1000.0)).is_none());
        assert!(watcher.update(Viewport::new(2000.0, 1000.0)).is_some());

        assert_eq!(*log.borrow(), vec![(false, 0.0), (true, 0.75), (false, 0.0)]);
    }

    #[test]
    fn test_deliver_forwards_every_update() {
        let (log, callback) = recorder();
        let mut watcher = ThresholdWatcher::new(callback);
        watcher.observe(TargetId(7), Region::default(), 0.3).unwrap();

        let entry = IntersectionEntry {
            target: TargetId(7),
            ratio: 0.4,
            is_intersecting: true,
        };
        assert!(watcher.deliver(entry));
        assert!(watcher.deliver(entry));
        assert!(!watcher.deliver(IntersectionEntry {
            target: TargetId(8),
            ..entry
        }));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_unobserve_is_idempotent() {
        let (log, callback) = recorder();
        let mut watcher = ThresholdWatcher::new(callback);
        watcher.observe(TargetId(1), Region::new(0.0, 100.0), 0.1).unwrap();
        watcher.unobserve();
        watcher.unobserve();
        assert!(!watcher.is_observing());
        assert!(watcher.update(Viewport::new(0.0, 1000.0)).is_none());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_zero_threshold_means_any_overlap() {
        let (_log, callback) = recorder();
        let mut watcher = ThresholdWatcher::new(callback);
        watcher.observe(TargetId(1), Region::new(990.0, 100.0), 0.0).unwrap();
        let entry = watcher.update(Viewport::new(0.0, 1000.0)).unwrap();
        assert!(entry.is_intersecting);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let (_log, callback) = recorder();
        let mut watcher = ThresholdWatcher::new(callback);
        assert!(watcher.observe(TargetId(1), Region::default(), 1.5).is_err());
        assert!(!watcher.is_observing());
    }
}
