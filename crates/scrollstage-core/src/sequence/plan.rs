//! Pure timing plans for staged sequences.
//!
//! Nothing in here touches state; the sequencer turns these plans into
//! scheduled timers.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{DelayProfile, PlacementProfiles};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SequenceDirection {
    Opening,
    Closing,
}

impl SequenceDirection {
    /// Flag value every stage ends up with
    #[inline]
    pub fn target_visibility(self) -> bool {
        matches!(self, SequenceDirection::Opening)
    }

    pub fn reversed(self) -> Self {
        match self {
            SequenceDirection::Opening => SequenceDirection::Closing,
            SequenceDirection::Closing => SequenceDirection::Opening,
        }
    }
}

/// Where the control currently sits, which selects the delay profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Pinned inside the fixed header region
    Docked,
    /// Resting in its own position; opening slides it first
    #[default]
    Floating,
}

impl Placement {
    /// Docked once the page has scrolled strictly past `dock_offset`
    pub fn for_offset(offset: f64, dock_offset: f64) -> Self {
        if offset > dock_offset {
            Placement::Docked
        } else {
            Placement::Floating
        }
    }
}

/// Container-level step in a compound transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerAction {
    SlideIn,
    ShowContainer,
    /// Schedule the per-stage flips of the current run
    RevealStages,
    HideContainer,
    SlideOut,
    Finish,
}

/// One link of a timer chain; `delay` counts from the previous link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainStep {
    pub action: ContainerAction,
    pub delay: Duration,
}

impl ChainStep {
    pub fn new(action: ContainerAction, delay: Duration) -> Self {
        Self { action, delay }
    }

    pub fn now(action: ContainerAction) -> Self {
        Self::new(action, Duration::ZERO)
    }
}

/// Delay tables for both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileTable {
    pub opening: PlacementProfiles,
    pub closing: PlacementProfiles,
}

impl ProfileTable {
    /// Same profile for every direction and placement
    pub fn uniform(profile: DelayProfile) -> Self {
        let both = PlacementProfiles {
            docked: profile,
            floating: profile,
        };
        Self {
            opening: both,
            closing: both,
        }
    }

    pub fn select(&self, direction: SequenceDirection, placement: Placement) -> DelayProfile {
        let profiles = match direction {
            SequenceDirection::Opening => &self.opening,
            SequenceDirection::Closing => &self.closing,
        };
        match placement {
            Placement::Docked => profiles.docked,
            Placement::Floating => profiles.floating,
        }
    }
}

/// Ordered `(stage, offset)` pairs, earliest first
///
/// Opening reveals from the last stage back to the first; closing hides from
/// the first stage forward.
pub fn stage_offsets(
    direction: SequenceDirection,
    stage_count: usize,
    step: Duration,
) -> Vec<(usize, Duration)> {
    (0..stage_count)
        .map(|slot| {
            let stage = match direction {
                SequenceDirection::Opening => stage_count - 1 - slot,
                SequenceDirection::Closing => slot,
            };
            (stage, step * slot as u32)
        })
        .collect()
}

/// Time from the first stage flip to the last
pub fn stage_span(stage_count: usize, step: Duration) -> Duration {
    step * stage_count.saturating_sub(1) as u32
}

/// Container chain for one run
pub fn container_chain(
    direction: SequenceDirection,
    placement: Placement,
    profile: DelayProfile,
    stage_count: usize,
) -> Vec<ChainStep> {
    let tail = stage_span(stage_count, profile.stage_step()) + profile.settle();
    let mut steps = Vec::with_capacity(5);
    match direction {
        SequenceDirection::Opening => {
            if placement == Placement::Floating {
                steps.push(ChainStep::now(ContainerAction::SlideIn));
            }
            steps.push(ChainStep::new(ContainerAction::ShowContainer, profile.lead_in()));
            steps.push(ChainStep::now(ContainerAction::RevealStages));
            steps.push(ChainStep::new(ContainerAction::Finish, tail));
        }
        SequenceDirection::Closing => {
            steps.push(ChainStep::new(ContainerAction::RevealStages, profile.lead_in()));
            steps.push(ChainStep::new(ContainerAction::HideContainer, tail));
            if placement == Placement::Floating {
                steps.push(ChainStep::now(ContainerAction::SlideOut));
            }
            steps.push(ChainStep::now(ContainerAction::Finish));
        }
    }
    steps
}
