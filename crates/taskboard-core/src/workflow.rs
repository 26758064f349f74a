/*
[INPUT]:  Status from the adapter, raw status literals from UI drop targets
[OUTPUT]: Validated status transitions and column membership
[POS]:    Task domain logic - state machine for the board columns
[UPDATE]: When the set of workflow states or transition rules change
*/

use taskboard_adapter::Status;

use crate::error::BoardError;

/// A validated move between two workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Status,
    pub to: Status,
}

impl Transition {
    /// True when the task already sits in the target column
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }
}

/// State machine for a single task's status.
///
/// States: TODO, In Progress, Done. Any state may move to any other and
/// there is no terminal state, so finished tasks can be reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskWorkflow {
    current_state: Status,
}

impl TaskWorkflow {
    /// State assigned to a new task when none is given
    pub const INITIAL: Status = Status::Todo;

    pub fn new(initial: Status) -> Self {
        Self {
            current_state: initial,
        }
    }

    /// Every workflow state, in column order
    pub fn states() -> &'static [Status] {
        &Status::ALL
    }

    /// Parse a raw status literal, rejecting anything outside the fixed state set
    pub fn parse(raw: &str) -> Result<Status, BoardError> {
        raw.parse::<Status>().map_err(|_| BoardError::InvalidStatus {
            value: raw.to_string(),
        })
    }

    /// Column index of a state, left to right
    pub fn column_index(status: Status) -> usize {
        Status::ALL
            .iter()
            .position(|s| *s == status)
            .unwrap_or_default()
    }

    /// Check if moving to `to` is allowed from the current state.
    ///
    /// Holds for every `Status`; literals outside the set are rejected by `parse`.
    pub fn can_transition(&self, to: Status) -> bool {
        Self::states().contains(&self.current_state) && Self::states().contains(&to)
    }

    /// Perform a transition
    pub fn transition(&mut self, to: Status) -> Result<Transition, BoardError> {
        if !self.can_transition(to) {
            return Err(BoardError::InvalidStatus {
                value: to.to_string(),
            });
        }

        let transition = Transition {
            from: self.current_state,
            to,
        };
        self.current_state = to;
        Ok(transition)
    }

    /// Get the current state
    pub fn state(&self) -> Status {
        self.current_state
    }
}

impl Default for TaskWorkflow {
    fn default() -> Self {
        Self::new(Self::INITIAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let machine = TaskWorkflow::default();
        assert_eq!(machine.state(), Status::Todo);
    }

    #[test]
    fn test_every_pair_of_states_is_allowed() {
        for &from in TaskWorkflow::states() {
            for &to in TaskWorkflow::states() {
                let mut machine = TaskWorkflow::new(from);
                let transition = machine.transition(to).expect("transition allowed");
                assert_eq!(transition.from, from);
                assert_eq!(machine.state(), to);
                assert_eq!(transition.is_noop(), from == to);
            }
        }
    }

    #[test]
    fn test_done_can_be_reopened() {
        let mut machine = TaskWorkflow::new(Status::Done);
        assert!(machine.transition(Status::Todo).is_ok());
        assert_eq!(machine.state(), Status::Todo);
    }

    #[test]
    fn test_parse_rejects_inconsistent_literals() {
        for raw in ["Completed", "done", "IN_PROGRESS", ""] {
            match TaskWorkflow::parse(raw) {
                Err(BoardError::InvalidStatus { value }) => assert_eq!(value, raw),
                other => panic!("Expected InvalidStatus for {raw:?}, got {other:?}"),
            }
        }
        assert_eq!(TaskWorkflow::parse("In Progress").unwrap(), Status::InProgress);
        assert_eq!(TaskWorkflow::parse("InProgress").unwrap(), Status::InProgress);
    }

    #[test]
    fn test_column_index() {
        assert_eq!(TaskWorkflow::column_index(Status::Todo), 0);
        assert_eq!(TaskWorkflow::column_index(Status::InProgress), 1);
        assert_eq!(TaskWorkflow::column_index(Status::Done), 2);
    }
}
