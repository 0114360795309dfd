//! Project timeline. Array order is the chronological order, so reordering is the
//! only structural edit.

use serde::Serialize;
use thiserror::Error;

use crate::{PhaseStatus, TimelinePhase};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    #[error("phase index {index} out of range (timeline has {len} phases)")]
    OutOfRange { index: usize, len: usize },
}

/// Move the phase at `from` so it ends up at index `to`, shifting the rest.
pub fn move_phase(phases: &mut Vec<TimelinePhase>, from: usize, to: usize) -> Result<(), TimelineError> {
    let len = phases.len();
    for index in [from, to] {
        if index >= len {
            return Err(TimelineError::OutOfRange { index, len });
        }
    }
    let phase = phases.remove(from);
    phases.insert(to, phase);
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StatusCounts {
    pub planned: usize,
    pub in_progress: usize,
    pub completed: usize,
}

pub fn status_counts(phases: &[TimelinePhase]) -> StatusCounts {
    let mut counts = StatusCounts::default();
    for phase in phases {
        match phase.status {
            PhaseStatus::Planned => counts.planned += 1,
            PhaseStatus::InProgress => counts.in_progress += 1,
            PhaseStatus::Completed => counts.completed += 1,
        }
    }
    counts
}
