//! Small timed state holders used around the main engine.
//!
//! These take `now` from the caller's clock instead of owning one, so a
//! single frame can update many of them against the same timestamp.

use std::time::Duration;

use crate::config::MotionConfig;
use crate::progress::ScrollDirection;
use crate::timer::OneShot;

/// Pushes the floating control against the scroll direction while the page
/// moves, then lets it settle with a wobble once scrolling stops
#[derive(Debug, Clone)]
pub struct ScrollInertia {
    amplitude: f64,
    settle: Duration,
    offset: f64,
    last_direction: ScrollDirection,
    wobble: Option<ScrollDirection>,
    quiet: OneShot,
}

impl ScrollInertia {
    pub fn new(amplitude: f64, settle: Duration) -> Self {
        Self {
            amplitude,
            settle,
            offset: 0.0,
            last_direction: ScrollDirection::None,
            wobble: None,
            quiet: OneShot::new(),
        }
    }

    pub fn from_config(config: &MotionConfig) -> Self {
        Self::new(
            config.inertia_px,
            Duration::from_millis(config.inertia_settle_ms),
        )
    }

    pub fn on_scroll(&mut self, now: Duration, direction: ScrollDirection) {
        self.offset = match direction {
            ScrollDirection::Down => -self.amplitude,
            ScrollDirection::Up => self.amplitude,
            ScrollDirection::None => return,
        };
        self.last_direction = direction;
        self.quiet.arm(now, self.settle);
    }

    /// Returns true on the frame the nudge settles
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.quiet.fire_if_due(now) {
            self.offset = 0.0;
            self.wobble = Some(self.last_direction);
            return true;
        }
        false
    }

    /// Current nudge in pixels (negative is up)
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Direction of the settling wobble, if one is playing
    pub fn wobble(&self) -> Option<ScrollDirection> {
        self.wobble
    }

    pub fn finish_wobble(&mut self) {
        self.wobble = None;
    }
}

/// Flag that stays up for a fixed window after each raise
#[derive(Debug, Clone)]
pub struct TransientFlag {
    window: Duration,
    until: OneShot,
}

impl TransientFlag {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            until: OneShot::new(),
        }
    }

    /// Raise (or extend) the flag
    pub fn raise(&mut self, now: Duration) {
        self.until.arm(now, self.window);
    }

    pub fn is_active(&self, now: Duration) -> bool {
        self.until.due().is_some_and(|due| now < due)
    }

    /// Returns true on the frame the flag drops
    pub fn poll(&mut self, now: Duration) -> bool {
        self.until.fire_if_due(now)
    }
}

/// Turns on a fixed delay after its region becomes visible and off at once
/// when it leaves; leaving early cancels the pending activation
#[derive(Debug, Clone)]
pub struct DelayedActivation {
    delay: Duration,
    pending: OneShot,
    active: bool,
}

impl DelayedActivation {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: OneShot::new(),
            active: false,
        }
    }

    pub fn set_visible(&mut self, now: Duration, visible: bool) {
        if visible {
            if !self.active && !self.pending.is_armed() {
                self.pending.arm(now, self.delay);
            }
        } else {
            self.pending.disarm();
            self.active = false;
        }
    }

    /// Returns true on the frame the activation lands
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.pending.fire_if_due(now) {
            self.active = true;
            return true;
        }
        false
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }
}

/// Rotating slide index with autoplay that only runs while the carousel is
/// on screen. A slide change starts a transition window during which manual
/// navigation is ignored.
#[derive(Debug, Clone)]
pub struct Carousel {
    len: usize,
    interval: Duration,
    current: usize,
    visible: bool,
    autoplay: OneShot,
    transition: TransientFlag,
}

impl Carousel {
    pub fn new(len: usize, interval: Duration, transition: Duration) -> Self {
        Self {
            len,
            interval,
            current: 0,
            visible: false,
            autoplay: OneShot::new(),
            transition: TransientFlag::new(transition),
        }
    }

    pub fn from_config(len: usize, config: &MotionConfig) -> Self {
        Self::new(
            len,
            Duration::from_millis(config.carousel_interval_ms),
            Duration::from_millis(config.carousel_transition_ms),
        )
    }

    /// Autoplay starts a full interval after the carousel shows up and stops
    /// as soon as it leaves
    pub fn set_visible(&mut self, now: Duration, visible: bool) {
        if visible == self.visible {
            return;
        }
        self.visible = visible;
        if visible {
            self.rearm(now);
        } else {
            self.autoplay.disarm();
        }
    }

    /// Jump to `index`; returns false when the request is ignored
    pub fn go_to(&mut self, now: Duration, index: usize) -> bool {
        if index >= self.len || index == self.current || self.is_transitioning(now) {
            return false;
        }
        self.show(now, index);
        true
    }

    pub fn next(&mut self, now: Duration) -> bool {
        if self.len == 0 {
            return false;
        }
        self.go_to(now, (self.current + 1) % self.len)
    }

    /// Returns true on the frame autoplay moves to the next slide
    pub fn poll(&mut self, now: Duration) -> bool {
        self.transition.poll(now);
        if !self.autoplay.fire_if_due(now) {
            return false;
        }
        self.show(now, (self.current + 1) % self.len);
        true
    }

    fn show(&mut self, now: Duration, index: usize) {
        self.current = index;
        self.transition.raise(now);
        // Every slide change restarts the countdown
        self.rearm(now);
    }

    fn rearm(&mut self, now: Duration) {
        if self.visible && self.len > 1 {
            self.autoplay.arm(now, self.interval);
        } else {
            self.autoplay.disarm();
        }
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_playing(&self) -> bool {
        self.autoplay.is_armed()
    }

    pub fn is_transitioning(&self, now: Duration) -> bool {
        self.transition.is_active(now)
    }
}

/// Glow strength while the pointer is away or resting in the middle
pub const GLOW_IDLE: f64 = 0.15;
pub const GLOW_ACTIVE: f64 = 1.0;

/// Screen-space box of a glowing element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width * 0.5, self.top + self.height * 0.5)
    }
}

/// Angle reached by turning from `current` toward `target` the short way
/// round, in degrees. The result may sit outside 0..360 so that animating
/// between the two never spins through the long arc.
pub fn shortest_arc(current: f64, target: f64) -> f64 {
    current + ((target - current + 180.0).rem_euclid(360.0) - 180.0)
}

/// Border glow that points toward the pointer
#[derive(Debug, Clone)]
pub struct GlowTracker {
    /// Fraction of the half short side around the centre that never lights up
    inactive_zone: f64,
    /// Extra reach outside the bounds, in pixels
    proximity: f64,
    angle: f64,
    level: f64,
}

impl GlowTracker {
    pub fn new(inactive_zone: f64, proximity: f64) -> Self {
        Self {
            inactive_zone,
            proximity,
            angle: 0.0,
            level: GLOW_IDLE,
        }
    }

    /// Feed a pointer position; returns the glow level
    pub fn track(&mut self, bounds: Bounds, x: f64, y: f64) -> f64 {
        let (cx, cy) = bounds.center();
        let inactive_radius = 0.5 * bounds.width.min(bounds.height) * self.inactive_zone;
        if (x - cx).hypot(y - cy) < inactive_radius {
            self.level = GLOW_IDLE;
            return self.level;
        }

        let near = x > bounds.left - self.proximity
            && x < bounds.left + bounds.width + self.proximity
            && y > bounds.top - self.proximity
            && y < bounds.top + bounds.height + self.proximity;
        if !near {
            self.level = GLOW_IDLE;
            return self.level;
        }

        self.level = GLOW_ACTIVE;
        // 0 degrees points up
        let target = (y - cy).atan2(x - cx).to_degrees() + 90.0;
        self.angle = shortest_arc(self.angle, target);
        self.level
    }

    /// Where the glow arc starts, in degrees
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn level(&self) -> f64 {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_inertia_pushes_against_scroll() {
        let mut inertia = ScrollInertia::new(10.0, ms(100));
        inertia.on_scroll(ms(0), ScrollDirection::Down);
        assert_eq!(inertia.offset(), -10.0);
        inertia.on_scroll(ms(50), ScrollDirection::Up);
        assert_eq!(inertia.offset(), 10.0);
    }

    #[test]
    fn test_inertia_settles_after_quiet_period() {
        let mut inertia = ScrollInertia::new(10.0, ms(100));
        inertia.on_scroll(ms(0), ScrollDirection::Down);
        inertia.on_scroll(ms(80), ScrollDirection::Down);
        assert!(!inertia.poll(ms(150)));
        assert!(inertia.poll(ms(180)));
        assert_eq!(inertia.offset(), 0.0);
        assert_eq!(inertia.wobble(), Some(ScrollDirection::Down));
        inertia.finish_wobble();
        assert_eq!(inertia.wobble(), None);
    }

    #[test]
    fn test_transient_flag_window_extends() {
        let mut flag = TransientFlag::new(ms(800));
        assert!(!flag.is_active(ms(0)));
        flag.raise(ms(0));
        assert!(flag.is_active(ms(500)));
        flag.raise(ms(500));
        assert!(flag.is_active(ms(1200)));
        assert!(!flag.poll(ms(1200)));
        assert!(flag.poll(ms(1300)));
        assert!(!flag.is_active(ms(1300)));
    }

    #[test]
    fn test_activation_waits_for_delay() {
        let mut activation = DelayedActivation::new(ms(300));
        activation.set_visible(ms(0), true);
        activation.set_visible(ms(100), true);
        assert!(!activation.poll(ms(299)));
        assert!(activation.poll(ms(300)));
        assert!(activation.is_active());
        activation.set_visible(ms(400), false);
        assert!(!activation.is_active());
    }

    #[test]
    fn test_leaving_early_cancels_activation() {
        let mut activation = DelayedActivation::new(ms(300));
        activation.set_visible(ms(0), true);
        activation.set_visible(ms(200), false);
        assert!(!activation.poll(ms(1000)));
        assert!(!activation.is_active());
    }

    #[test]
    fn test_carousel_autoplays_only_while_visible() {
        let mut carousel = Carousel::new(3, ms(6000), ms(1500));
        assert!(!carousel.poll(ms(10_000)));
        assert_eq!(carousel.current(), 0);

        carousel.set_visible(ms(10_000), true);
        assert!(!carousel.poll(ms(15_999)));
        assert!(carousel.poll(ms(16_000)));
        assert_eq!(carousel.current(), 1);
        assert!(carousel.poll(ms(22_000)));
        assert_eq!(carousel.current(), 2);

        carousel.set_visible(ms(25_000), false);
        assert!(!carousel.is_playing());
        assert!(!carousel.poll(ms(40_000)));
        assert_eq!(carousel.current(), 2);
    }

    #[test]
    fn test_carousel_wraps_around() {
        let mut carousel = Carousel::new(2, ms(100), ms(10));
        carousel.set_visible(ms(0), true);
        assert!(carousel.poll(ms(100)));
        assert!(carousel.poll(ms(200)));
        assert_eq!(carousel.current(), 0);
    }

    #[test]
    fn test_carousel_ignores_navigation_mid_transition() {
        let mut carousel = Carousel::new(4, ms(6000), ms(1500));
        carousel.set_visible(ms(0), true);
        assert!(carousel.go_to(ms(100), 2));
        assert_eq!(carousel.current(), 2);
        assert!(carousel.is_transitioning(ms(1000)));

        assert!(!carousel.go_to(ms(1000), 3));
        assert!(!carousel.next(ms(1599)));
        assert_eq!(carousel.current(), 2);

        carousel.poll(ms(1600));
        assert!(!carousel.is_transitioning(ms(1600)));
        assert!(!carousel.go_to(ms(1600), 2));
        assert!(!carousel.go_to(ms(1600), 9));
        assert!(carousel.next(ms(1600)));
        assert_eq!(carousel.current(), 3);
    }

    #[test]
    fn test_manual_slide_change_restarts_autoplay() {
        let mut carousel = Carousel::new(3, ms(6000), ms(1500));
        carousel.set_visible(ms(0), true);
        assert!(carousel.go_to(ms(5000), 1));
        // The countdown started at 0 would have fired here
        assert!(!carousel.poll(ms(6000)));
        assert!(carousel.poll(ms(11_000)));
        assert_eq!(carousel.current(), 2);
    }

    #[test]
    fn test_single_slide_never_autoplays() {
        let mut carousel = Carousel::new(1, ms(100), ms(10));
        carousel.set_visible(ms(0), true);
        assert!(!carousel.is_playing());
        assert!(!carousel.next(ms(50)));
        assert!(!Carousel::new(0, ms(100), ms(10)).next(ms(0)));
    }

    #[test]
    fn test_shortest_arc_crosses_zero() {
        assert_eq!(shortest_arc(350.0, 10.0), 370.0);
        assert_eq!(shortest_arc(10.0, 350.0), -10.0);
        assert_eq!(shortest_arc(0.0, 90.0), 90.0);
        assert_eq!(shortest_arc(720.0, 45.0), 765.0);
        assert_eq!(shortest_arc(-90.0, 180.0), -180.0);
    }

    #[test]
    fn test_glow_follows_pointer_around_the_box() {
        let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let mut glow = GlowTracker::new(0.4, 0.0);

        // Straight above the centre
        assert_eq!(glow.track(bounds, 50.0, 2.0), GLOW_ACTIVE);
        assert!(glow.angle().abs() < 1e-9);

        // Left edge is -90 but reached through the short way
        glow.track(bounds, 2.0, 50.0);
        assert!((glow.angle() - -90.0).abs() < 1e-9);
        glow.track(bounds, 50.0, 98.0);
        assert!((glow.angle() - -180.0).abs() < 1e-9);
    }

    #[test]
    fn test_glow_rests_in_inactive_zone_and_far_away() {
        let bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
        let mut glow = GlowTracker::new(0.4, 10.0);
        glow.track(bounds, 98.0, 50.0);
        let angle = glow.angle();
        assert!((angle - 90.0).abs() < 1e-9);

        // Within 20px of the centre
        assert_eq!(glow.track(bounds, 60.0, 50.0), GLOW_IDLE);
        assert_eq!(glow.angle(), angle);

        // Inside the proximity margin still counts
        assert_eq!(glow.track(bounds, 105.0, 50.0), GLOW_ACTIVE);
        assert_eq!(glow.track(bounds, 200.0, 50.0), GLOW_IDLE);
        assert_eq!(glow.level(), GLOW_IDLE);
    }
}
