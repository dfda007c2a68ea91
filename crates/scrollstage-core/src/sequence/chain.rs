//! Single cancellable chain of container steps.

use std::collections::VecDeque;
use std::time::Duration;

use super::plan::{ChainStep, ContainerAction};

/// Runs [`ChainStep`]s strictly one after another
///
/// Only the head of the chain has a pending deadline at any time, so
/// [`StepChain::clear`] stops the whole remainder in one operation.
#[derive(Debug, Default)]
pub struct StepChain {
    steps: VecDeque<ChainStep>,
    next_due: Option<Duration>,
}

impl StepChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace whatever is pending with `steps`, timed from `now`
    pub fn start(&mut self, now: Duration, steps: Vec<ChainStep>) {
        self.steps = steps.into();
        self.next_due = self.steps.front().map(|s| now + s.delay);
    }

    #[inline]
    pub fn next_due(&self) -> Option<Duration> {
        self.next_due
    }

    /// Pop the head step if it is due; the next step is timed from the
    /// head's deadline so late polling does not stretch the chain
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, ContainerAction)> {
        let due = self.next_due.filter(|due| *due <= now)?;
        let step = self.steps.pop_front()?;
        self.next_due = self.steps.front().map(|next| due + next.delay);
        Some((due, step.action))
    }

    pub fn clear(&mut self) {
        self.steps.clear();
        self.next_due = None;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}
