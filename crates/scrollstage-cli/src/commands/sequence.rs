use anyhow::Result;

use scrollstage_core::sequence::{SequenceEvent, SequencerState};
use scrollstage_core::{
    AppConfig, Clock, ManualClock, Placement, SequenceDirection, StagedVisibilitySequencer,
};

/// Drive the sequencer until idle, jumping the clock from deadline to deadline
fn run_to_idle(
    sequencer: &mut StagedVisibilitySequencer<ManualClock>,
    clock: &ManualClock,
) -> Vec<SequenceEvent> {
    let mut events = Vec::new();
    while sequencer.state() != SequencerState::Idle {
        let Some(deadline) = sequencer.next_deadline() else {
            break;
        };
        clock.set(deadline);
        events.extend(sequencer.advance());
    }
    events
}

/// Shift an event so `origin_ms` reads as zero
fn rebase(event: SequenceEvent, origin_ms: u64) -> SequenceEvent {
    match event {
        SequenceEvent::Stage { at_ms, index, visible } => SequenceEvent::Stage {
            at_ms: at_ms - origin_ms,
            index,
            visible,
        },
        SequenceEvent::Container { at_ms, action } => SequenceEvent::Container {
            at_ms: at_ms - origin_ms,
            action,
        },
        SequenceEvent::Finished { at_ms, direction } => SequenceEvent::Finished {
            at_ms: at_ms - origin_ms,
            direction,
        },
    }
}

/// Timeline of one run, relative to its trigger
pub fn timeline(
    config: &AppConfig,
    stages: Option<usize>,
    direction: SequenceDirection,
    placement: Placement,
) -> Result<Vec<SequenceEvent>> {
    let mut sequence_config = config.sequence.clone();
    if let Some(stages) = stages {
        sequence_config.stage_count = stages;
    }

    let clock = ManualClock::new();
    let mut sequencer = StagedVisibilitySequencer::new(&sequence_config, clock.clone())?;
    sequencer.set_placement(placement);

    // Closing only makes sense from the open state
    if direction == SequenceDirection::Closing {
        sequencer.trigger(SequenceDirection::Opening);
        run_to_idle(&mut sequencer, &clock);
    }

    let origin_ms = clock.now().as_millis() as u64;
    sequencer.trigger(direction);
    Ok(run_to_idle(&mut sequencer, &clock)
        .into_iter()
        .map(|event| rebase(event, origin_ms))
        .collect())
}

pub fn run(
    config: &AppConfig,
    stages: Option<usize>,
    direction: SequenceDirection,
    docked: bool,
    json: bool,
) -> Result<()> {
    let placement = if docked {
        Placement::Docked
    } else {
        Placement::Floating
    };
    let events = timeline(config, stages, direction, placement)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&events)?);
        return Ok(());
    }

    println!("{:?} run, {:?} placement", direction, placement);
    for event in &events {
        let what = match event {
            SequenceEvent::Stage { index, visible, .. } => {
                format!("stage {} {}", index, if *visible { "shown" } else { "hidden" })
            }
            SequenceEvent::Container { action, .. } => format!("{:?}", action),
            SequenceEvent::Finished { .. } => "finished".to_string(),
        };
        println!("{:>6} ms  {}", event.at_ms(), what);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage_times(events: &[SequenceEvent]) -> Vec<(usize, u64)> {
        events
            .iter()
            .filter_map(|e| match e {
                SequenceEvent::Stage { at_ms, index, .. } => Some((*index, *at_ms)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_docked_opening_reveals_last_stage_first() {
        let events = timeline(
            &AppConfig::default(),
            None,
            SequenceDirection::Opening,
            Placement::Docked,
        )
        .unwrap();
        let stages = stage_times(&events);
        assert_eq!(stages.first().map(|s| s.0), Some(3));
        assert_eq!(stages.last().map(|s| s.0), Some(0));
        assert!(matches!(events.last(), Some(SequenceEvent::Finished { .. })));
    }

    #[test]
    fn test_closing_timeline_starts_at_zero() {
        let events = timeline(
            &AppConfig::default(),
            Some(2),
            SequenceDirection::Closing,
            Placement::Docked,
        )
        .unwrap();
        let stages = stage_times(&events);
        assert_eq!(stages.len(), 2);
        assert_eq!(stages[0], (0, 0));
    }

    #[test]
    fn test_zero_stages_rejected() {
        assert!(timeline(
            &AppConfig::default(),
            Some(0),
            SequenceDirection::Opening,
            Placement::Floating,
        )
        .is_err());
    }
}
