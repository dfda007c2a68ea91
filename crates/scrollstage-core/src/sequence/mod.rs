//! Staged visibility sequencing
//!
//! - `plan` - Pure stage offsets and container chains per direction/placement
//! - `chain` - Single cancellable chain of container steps
//! - `sequencer` - State machine combining both with token-checked timers

pub mod chain;
pub mod plan;
pub mod sequencer;

pub use chain::StepChain;
pub use plan::{
    container_chain, stage_offsets, stage_span, ChainStep, ContainerAction, Placement,
    ProfileTable, SequenceDirection,
};
pub use sequencer::{
    ContainerState, SequenceEvent, SequencerState, StagedVisibilitySequencer, TriggerOutcome,
};
