//! Status transition table.
//!
//! The single source for which status moves are legal. The board consults it
//! both to reject a drop and to grey out columns a grabbed card cannot enter.

use crate::task::Status;

/// Legal targets for each status. A status never lists itself.
pub const TRANSITIONS: [(Status, &[Status]); 4] = [
    (
        Status::InProgress,
        &[Status::InReview, Status::Completed, Status::OnHold],
    ),
    (Status::InReview, &[Status::Completed, Status::OnHold]),
    (
        Status::OnHold,
        &[Status::InProgress, Status::InReview, Status::Completed],
    ),
    (Status::Completed, &[Status::InProgress, Status::InReview]),
];

/// A status move that the table does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// `to` is not in the allowed set of `from`.
    #[error("Invalid transition: Cannot move from {from} to {to}")]
    NotAllowed {
        /// Current status.
        from: Status,
        /// Requested status.
        to: Status,
    },
    /// Source and target are the same status.
    #[error("task is already {0}")]
    Unchanged(Status),
}

/// Returns the statuses reachable from `from` in one move.
#[must_use]
pub fn allowed_targets(from: Status) -> &'static [Status] {
    for (status, targets) in TRANSITIONS {
        if status == from {
            return targets;
        }
    }
    &[]
}

/// True when a task in `from` may be moved to `to`.
#[must_use]
pub fn can_transition(from: Status, to: Status) -> bool {
    allowed_targets(from).contains(&to)
}

/// Checks a move against the table.
///
/// # Errors
///
/// Returns [`TransitionError::Unchanged`] when `from == to` and
/// [`TransitionError::NotAllowed`] when the table has no such edge.
pub fn check_transition(from: Status, to: Status) -> Result<(), TransitionError> {
    if from == to {
        return Err(TransitionError::Unchanged(from));
    }
    if can_transition(from, to) {
        Ok(())
    } else {
        Err(TransitionError::NotAllowed { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_status_has_an_entry() {
        for status in Status::ALL {
            assert!(!allowed_targets(status).is_empty(), "{status} has no targets");
        }
    }

    #[test]
    fn no_status_lists_itself() {
        for (status, targets) in TRANSITIONS {
            assert!(!targets.contains(&status));
        }
    }

    #[test]
    fn completed_cannot_go_on_hold() {
        let err = check_transition(Status::Completed, Status::OnHold).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid transition: Cannot move from Completed to On Hold"
        );
    }

    #[test]
    fn in_review_cannot_go_back_to_in_progress() {
        assert!(!can_transition(Status::InReview, Status::InProgress));
    }

    #[test]
    fn on_hold_can_resume() {
        assert!(check_transition(Status::OnHold, Status::InProgress).is_ok());
    }

    #[test]
    fn self_move_is_unchanged() {
        assert_eq!(
            check_transition(Status::InReview, Status::InReview),
            Err(TransitionError::Unchanged(Status::InReview))
        );
    }
}
