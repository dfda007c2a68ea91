//! Per-frame scheduling loop for hosts running on tokio.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// What the frame callback wants next
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameControl {
    Continue,
    Stop,
}

/// Calls a frame callback at a fixed period until it asks to stop or a
/// shutdown signal arrives
#[derive(Debug, Clone, Copy)]
pub struct FrameLoop {
    period: Duration,
}

impl FrameLoop {
    pub fn new(period: Duration) -> Self {
        Self { period }
    }

    /// Period from a millisecond tick rate
    pub fn from_tick_rate(tick_rate_ms: u64) -> Self {
        if tick_rate_ms == 0 {
            Self::new(Duration::from_millis(16)) // ~60fps fallback
        } else {
            Self::new(Duration::from_millis(tick_rate_ms))
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Run until `on_frame` returns [`FrameControl::Stop`] or `shutdown` turns
    /// true (or its sender goes away). Returns the number of frames delivered.
    pub async fn run<F>(self, mut on_frame: F, mut shutdown: watch::Receiver<bool>) -> u64
    where
        F: FnMut(u64) -> FrameControl,
    {
        let mut interval = tokio::time::interval(self.period);
        // A stalled host should not get a burst of catch-up frames
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        debug!(period_ms = self.period.as_millis() as u64, "Frame loop started");

        let mut frames = 0u64;
        loop {
            tokio::select! {
                result = shutdown.changed() => {
                    if result.is_err() || *shutdown.borrow() {
                        info!("Frame loop received shutdown signal");
                        break;
                    }
                }

                _ = interval.tick() => {
                    frames += 1;
                    if on_frame(frames) == FrameControl::Stop {
                        break;
                    }
                }
            }
        }

        debug!(frames, "Frame loop stopped");
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProgressConfig;
    use crate::progress::ScrollProgressModel;
    use crate::timer::ManualClock;

    #[test]
    fn test_zero_tick_rate_falls_back() {
        assert_eq!(FrameLoop::from_tick_rate(0).period(), Duration::from_millis(16));
        assert_eq!(FrameLoop::from_tick_rate(33).period(), Duration::from_millis(33));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_until_callback_stops() {
        let (_tx, rx) = watch::channel(false);
        let frames = FrameLoop::new(Duration::from_millis(16))
            .run(
                |n| {
                    if n >= 10 {
                        FrameControl::Stop
                    } else {
                        FrameControl::Continue
                    }
                },
                rx,
            )
            .await;
        assert_eq!(frames, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_shutdown() {
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            FrameLoop::new(Duration::from_millis(16))
                .run(|_| FrameControl::Continue, rx)
                .await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(true).unwrap();
        let frames = handle.await.unwrap();
        assert!(frames > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drives_progress_model() {
        let (_tx, rx) = watch::channel(false);
        let clock = ManualClock::new();
        let mut model = ScrollProgressModel::new(ProgressConfig::default(), clock.clone()).unwrap();
        model.on_scroll_signal(500.0, 1000.0, 2000.0);

        FrameLoop::new(Duration::from_millis(16))
            .run(
                |_| {
                    clock.advance_ms(16);
                    model.tick();
                    if model.is_settled() {
                        FrameControl::Stop
                    } else {
                        FrameControl::Continue
                    }
                },
                rx,
            )
            .await;
        assert_eq!(model.display_progress(), 0.5);
    }
}
