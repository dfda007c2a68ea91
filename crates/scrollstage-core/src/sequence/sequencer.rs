//! Staged visibility sequencer
//!
//! Turns a single open/close trigger into timed per-stage flag flips plus the
//! container steps around them. Every stage timer carries the token of the
//! run that scheduled it and is skipped if that run is no longer current, so
//! a cancelled or superseded run can never change a flag.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, trace};

use super::chain::StepChain;
use super::plan::{
    container_chain, stage_offsets, ContainerAction, Placement, ProfileTable, SequenceDirection,
};
use crate::config::{DelayProfile, RetriggerPolicy, SequenceConfig};
use crate::timer::{Clock, MonotonicClock, RunToken, TimerQueue, TokenSource};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    Idle,
    Running {
        direction: SequenceDirection,
        token: RunToken,
        /// Timing chosen when the run started; placement changes mid-run do not touch it
        profile: DelayProfile,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    Started,
    /// A run was in flight and the policy is to ignore re-triggers
    Ignored,
    /// The in-flight run was cancelled and replaced
    Restarted,
}

/// Container flags driven by the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ContainerState {
    /// The stage group is shown at all
    pub visible: bool,
    /// The control has slid out of its resting position
    pub slid: bool,
}

/// Something that changed while advancing
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SequenceEvent {
    Stage {
        at_ms: u64,
        index: usize,
        visible: bool,
    },
    Container {
        at_ms: u64,
        action: ContainerAction,
    },
    Finished {
        at_ms: u64,
        direction: SequenceDirection,
    },
}

impl SequenceEvent {
    pub fn at_ms(&self) -> u64 {
        match self {
            SequenceEvent::Stage { at_ms, .. }
            | SequenceEvent::Container { at_ms, .. }
            | SequenceEvent::Finished { at_ms, .. } => *at_ms,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct StageFlip {
    index: usize,
    visible: bool,
}

#[derive(Debug)]
pub struct StagedVisibilitySequencer<C: Clock = MonotonicClock> {
    clock: C,
    flags: Vec<bool>,
    state: SequencerState,
    tokens: TokenSource,
    stage_timers: TimerQueue<StageFlip>,
    chain: StepChain,
    container: ContainerState,
    placement: Placement,
    profiles: ProfileTable,
    policy: RetriggerPolicy,
}

impl StagedVisibilitySequencer<MonotonicClock> {
    pub fn with_defaults() -> Self {
        let config = SequenceConfig::default();
        let profiles = ProfileTable {
            opening: config.opening,
            closing: config.closing,
        };
        Self::build(config.stage_count, profiles, config.retrigger, MonotonicClock::new())
    }
}

impl<C: Clock> StagedVisibilitySequencer<C> {
    pub fn new(config: &SequenceConfig, clock: C) -> Result<Self> {
        let profiles = ProfileTable {
            opening: config.opening,
            closing: config.closing,
        };
        Self::with_profiles(config.stage_count, profiles, config.retrigger, clock)
    }

    pub fn with_profiles(
        stage_count: usize,
        profiles: ProfileTable,
        policy: RetriggerPolicy,
        clock: C,
    ) -> Result<Self> {
        if stage_count == 0 {
            return Err(Error::InvalidStageCount(stage_count));
        }
        Ok(Self::build(stage_count, profiles, policy, clock))
    }

    fn build(stage_count: usize, profiles: ProfileTable, policy: RetriggerPolicy, clock: C) -> Self {
        Self {
            clock,
            flags: vec![false; stage_count],
            state: SequencerState::Idle,
            tokens: TokenSource::new(),
            stage_timers: TimerQueue::new(),
            chain: StepChain::new(),
            container: ContainerState::default(),
            placement: Placement::default(),
            profiles,
            policy,
        }
    }

    #[inline]
    pub fn stage_flags(&self) -> &[bool] {
        &self.flags
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    pub fn stage_count(&self) -> usize {
        self.flags.len()
    }

    #[inline]
    pub fn state(&self) -> SequencerState {
        self.state
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        matches!(self.state, SequencerState::Running { .. })
    }

    pub fn container(&self) -> ContainerState {
        self.container
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Takes effect on the next run; a run in flight keeps its own timing
    pub fn set_placement(&mut self, placement: Placement) {
        self.placement = placement;
    }

    pub fn policy(&self) -> RetriggerPolicy {
        self.policy
    }

    /// Timers still queued, stale ones included
    pub fn pending_timers(&self) -> usize {
        self.stage_timers.len() + self.chain.remaining()
    }

    /// Earliest moment `advance` has work to do
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.stage_timers.next_due(), self.chain.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Start a run in `direction`
    pub fn trigger(&mut self, direction: SequenceDirection) -> TriggerOutcome {
        let outcome = match self.state {
            SequencerState::Idle => TriggerOutcome::Started,
            SequencerState::Running {
                direction: running, ..
            } => match self.policy {
                RetriggerPolicy::Ignore => {
                    debug!(?direction, ?running, "Sequence busy, trigger ignored");
                    return TriggerOutcome::Ignored;
                }
                RetriggerPolicy::Restart => {
                    self.cancel();
                    TriggerOutcome::Restarted
                }
            },
        };

        let token = self.tokens.issue();
        let profile = self.profiles.select(direction, self.placement);
        let steps = container_chain(direction, self.placement, profile, self.flags.len());
        self.chain.start(self.clock.now(), steps);
        self.state = SequencerState::Running {
            direction,
            token,
            profile,
        };

        debug!(
            ?direction,
            placement = ?self.placement,
            run = token.id(),
            stages = self.flags.len(),
            step_ms = profile.stage_step_ms,
            "Sequence started"
        );
        outcome
    }

    /// Invalidate the current run; flags keep whatever values they reached
    pub fn cancel(&mut self) {
        if let SequencerState::Running {
            direction, token, ..
        } = self.state
        {
            debug!(?direction, run = token.id(), "Sequence cancelled");
        }
        self.tokens.invalidate();
        self.chain.clear();
        self.state = SequencerState::Idle;
    }

    /// Fire everything due at the clock's current time, in deadline order
    pub fn advance(&mut self) -> Vec<SequenceEvent> {
        let now = self.clock.now();
        let mut events = Vec::new();

        loop {
            let stage_due = self.stage_timers.next_due().filter(|d| *d <= now);
            let chain_due = self.chain.next_due().filter(|d| *d <= now);

            // Stage flips win ties so the last stage lands before Finish
            let take_stage = match (stage_due, chain_due) {
                (Some(s), Some(c)) => s <= c,
                (Some(_), None) => true,
                (None, Some(_)) => false,
                (None, None) => break,
            };

            if take_stage {
                let Some(fired) = self.stage_timers.pop_due(now) else {
                    break;
                };
                if !self.tokens.is_current(fired.token) {
                    trace!(
                        run = fired.token.id(),
                        stage = fired.payload.index,
                        "Skipping stale stage timer"
                    );
                    continue;
                }
                let StageFlip { index, visible } = fired.payload;
                debug_assert!(index < self.flags.len());
                self.flags[index] = visible;
                events.push(SequenceEvent::Stage {
                    at_ms: fired.due.as_millis() as u64,
                    index,
                    visible,
                });
            } else {
                let Some((due, action)) = self.chain.pop_due(now) else {
                    break;
                };
                self.apply(due, action, &mut events);
            }
        }

        events
    }

    fn apply(&mut self, due: Duration, action: ContainerAction, events: &mut Vec<SequenceEvent>) {
        let at_ms = due.as_millis() as u64;
        let SequencerState::Running {
            direction,
            token,
            profile,
        } = self.state
        else {
            debug_assert!(false, "container step fired while idle");
            return;
        };

        match action {
            ContainerAction::SlideIn => self.container.slid = true,
            ContainerAction::SlideOut => self.container.slid = false,
            ContainerAction::ShowContainer => self.container.visible = true,
            ContainerAction::HideContainer => self.container.visible = false,
            ContainerAction::RevealStages => {
                let visible = direction.target_visibility();
                for (index, offset) in
                    stage_offsets(direction, self.flags.len(), profile.stage_step())
                {
                    self.stage_timers
                        .schedule(due + offset, token, StageFlip { index, visible });
                }
            }
            ContainerAction::Finish => {
                // Nothing left over from this run may count as current
                self.tokens.invalidate();
                self.state = SequencerState::Idle;
                debug!(?direction, run = token.id(), "Sequence finished");
                events.push(SequenceEvent::Finished { at_ms, direction });
                return;
            }
        }
        events.push(SequenceEvent::Container { at_ms, action });
    }

    /// Owning view is going away
    pub fn unmount(&mut self) {
        self.cancel();
        self.stage_timers.clear();
    }
}
