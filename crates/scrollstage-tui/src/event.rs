use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// How long to wait for input when nothing is animating
const IDLE_TICK_MS: u64 = 100;

/// Event handler for terminal events
pub struct EventHandler {
    frame_rate: Duration,
    idle_rate: Duration,
}

impl EventHandler {
    pub fn new(tick_rate_ms: u64) -> Self {
        let frame_ms = if tick_rate_ms == 0 { 16 } else { tick_rate_ms };
        Self {
            frame_rate: Duration::from_millis(frame_ms),
            idle_rate: Duration::from_millis(IDLE_TICK_MS.max(frame_ms)),
        }
    }

    pub fn frame_rate(&self) -> Duration {
        self.frame_rate
    }

    /// Poll for the next event, waking at frame rate while `animating`
    pub fn next(&self, animating: bool) -> Result<Option<AppEvent>> {
        let timeout = if animating {
            self.frame_rate
        } else {
            self.idle_rate
        };

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) => {
                    // Release events arrive on some platforms; only presses count
                    if key.kind == KeyEventKind::Press {
                        Ok(Some(AppEvent::Key(key)))
                    } else {
                        Ok(None)
                    }
                }
                Event::Resize(w, h) => Ok(Some(AppEvent::Resize(w, h))),
                _ => Ok(None),
            }
        } else {
            Ok(Some(AppEvent::Tick))
        }
    }
}

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    /// Nothing happened within the poll window
    Tick,
}
