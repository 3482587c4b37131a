//! Export run state machine
//!
//! ```text
//! Fetching -> Validating -> Aggregating -> Writing -> Done
//!     |            |
//!     +------------+--> NoData
//! any non-terminal state --> Failed
//! ```
//!
//! The tabular path skips `Validating` and `Aggregating`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stage of one export run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExportState {
    Fetching,
    Validating,
    Aggregating,
    Writing,
    Done,
    /// The source returned no records for the period
    NoData,
    Failed,
}

impl ExportState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportState::Done | ExportState::NoData | ExportState::Failed
        )
    }

    /// Whether `next` may follow `self`
    pub fn can_transition_to(&self, next: ExportState) -> bool {
        use ExportState::*;
        match (self, next) {
            (Fetching, Validating | Writing | NoData) => true,
            (Validating, Aggregating | NoData) => true,
            (Aggregating, Writing) => true,
            (Writing, Done) => true,
            (state, Failed) => !state.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExportState::Fetching => "FETCHING",
            ExportState::Validating => "VALIDATING",
            ExportState::Aggregating => "AGGREGATING",
            ExportState::Writing => "WRITING",
            ExportState::Done => "DONE",
            ExportState::NoData => "NO_DATA",
            ExportState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Ordered list of the states a run has visited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateTrail {
    states: Vec<ExportState>,
}

impl StateTrail {
    /// A trail starting in [`ExportState::Fetching`]
    pub fn new() -> Self {
        Self {
            states: vec![ExportState::Fetching],
        }
    }

    pub fn current(&self) -> ExportState {
        self.states
            .last()
            .copied()
            .unwrap_or(ExportState::Fetching)
    }

    /// Moves to `next`, rejecting transitions the state machine does not allow
    pub fn advance(&mut self, next: ExportState) -> Result<(), String> {
        let current = self.current();
        if !current.can_transition_to(next) {
            return Err(format!("Illegal export state transition {current} -> {next}"));
        }
        tracing::debug!(from = %current, to = %next, "Export state transition");
        self.states.push(next);
        Ok(())
    }

    /// Moves to [`ExportState::Failed`] unless the run already ended
    pub fn fail(&mut self) {
        if !self.current().is_terminal() {
            self.states.push(ExportState::Failed);
        }
    }

    pub fn states(&self) -> &[ExportState] {
        &self.states
    }
}

impl Default for StateTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StateTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<String> = self.states.iter().map(ToString::to_string).collect();
        f.write_str(&names.join(" -> "))
    }
}
