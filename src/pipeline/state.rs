//! Per-date processing states.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Where a date is in the pipeline.
///
/// Dates move strictly forward:
/// `Pending → ContextBuilt → Computed → Validated`, or to `Failed` from any
/// non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayState {
    /// Not started.
    Pending,
    /// Source record, monthly aggregate and carry resolved.
    ContextBuilt,
    /// Every facility computed.
    Computed,
    /// Every configured check passed; the row is in the table.
    Validated,
    /// The date produced no row.
    Failed,
}

impl DayState {
    /// Returns true when `next` is a legal successor of this state.
    pub fn can_transition_to(self, next: DayState) -> bool {
        matches!(
            (self, next),
            (DayState::Pending, DayState::ContextBuilt)
                | (DayState::ContextBuilt, DayState::Computed)
                | (DayState::Computed, DayState::Validated)
                | (
                    DayState::Pending | DayState::ContextBuilt | DayState::Computed,
                    DayState::Failed
                )
        )
    }

    /// Returns true for `Validated` and `Failed`.
    pub fn is_terminal(self) -> bool {
        matches!(self, DayState::Validated | DayState::Failed)
    }

    /// Upper-case state name.
    pub fn as_str(self) -> &'static str {
        match self {
            DayState::Pending => "PENDING",
            DayState::ContextBuilt => "CONTEXT_BUILT",
            DayState::Computed => "COMPUTED",
            DayState::Validated => "VALIDATED",
            DayState::Failed => "FAILED",
        }
    }
}

impl fmt::Display for DayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks one date through its states.
#[derive(Debug)]
pub(crate) struct DayProgress {
    date: NaiveDate,
    state: DayState,
}

impl DayProgress {
    pub(crate) fn new(date: NaiveDate) -> Self {
        Self {
            date,
            state: DayState::Pending,
        }
    }

    pub(crate) fn state(&self) -> DayState {
        self.state
    }

    /// Moves to `next`, rejecting out-of-order transitions.
    pub(crate) fn advance(&mut self, next: DayState) -> EngineResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(EngineError::CalculationError {
                message: format!(
                    "illegal state transition {} -> {} for {}",
                    self.state, next, self.date
                ),
            });
        }
        debug!(date = %self.date, from = %self.state, to = %next, "day state transition");
        self.state = next;
        Ok(())
    }

    /// Marks the date failed unless it already reached a terminal state.
    pub(crate) fn fail(&mut self, error: &EngineError) {
        if self.state.is_terminal() {
            return;
        }
        debug!(
            date = %self.date,
            from = %self.state,
            to = %DayState::Failed,
            code = error.code(),
            "day state transition"
        );
        self.state = DayState::Failed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut progress = DayProgress::new(day());
        progress.advance(DayState::ContextBuilt).unwrap();
        progress.advance(DayState::Computed).unwrap();
        progress.advance(DayState::Validated).unwrap();
        assert_eq!(progress.state(), DayState::Validated);
    }

    #[test]
    fn test_skipping_a_state_is_rejected() {
        let mut progress = DayProgress::new(day());
        let result = progress.advance(DayState::Computed);
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
        assert_eq!(progress.state(), DayState::Pending);
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        assert!(!DayState::Validated.can_transition_to(DayState::Failed));
        assert!(!DayState::Failed.can_transition_to(DayState::Pending));
        assert!(DayState::Computed.can_transition_to(DayState::Failed));
    }

    #[test]
    fn test_fail_from_pending() {
        let mut progress = DayProgress::new(day());
        progress.fail(&EngineError::MissingRecord { date: day() });
        assert_eq!(progress.state(), DayState::Failed);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(DayState::ContextBuilt.to_string(), "CONTEXT_BUILT");
        assert_eq!(
            serde_json::to_string(&DayState::ContextBuilt).unwrap(),
            "\"CONTEXT_BUILT\""
        );
    }
}
