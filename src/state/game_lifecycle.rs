//! Allowed moves between game statuses.

use thiserror::Error;

use crate::dao::models::GameStatus;

/// Error returned when a game cannot move from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("invalid game status transition: {} cannot become {}", from.as_str(), to.as_str())]
pub struct InvalidTransition {
    /// Status currently stored.
    pub from: GameStatus,
    /// Status requested by the caller.
    pub to: GameStatus,
}

/// Statuses no game can leave.
pub fn is_terminal(status: GameStatus) -> bool {
    matches!(status, GameStatus::Completed | GameStatus::Cancelled)
}

/// Validate a status change. Writing the current status again is always accepted.
pub fn check_transition(from: GameStatus, to: GameStatus) -> Result<(), InvalidTransition> {
    use GameStatus::*;

    if from == to {
        return Ok(());
    }

    let allowed = match from {
        Scheduled => matches!(to, InProgress | Cancelled | Postponed),
        InProgress => matches!(to, Completed | Cancelled | Postponed),
        Postponed => matches!(to, Scheduled | InProgress | Cancelled),
        Completed | Cancelled => false,
    };

    if allowed {
        Ok(())
    } else {
        Err(InvalidTransition { from, to })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use GameStatus::*;

    const ALL: [GameStatus; 5] = [Scheduled, InProgress, Completed, Cancelled, Postponed];

    #[test]
    fn regular_season_flow_is_accepted() {
        assert!(check_transition(Scheduled, InProgress).is_ok());
        assert!(check_transition(InProgress, Completed).is_ok());
    }

    #[test]
    fn postponed_game_can_be_rescheduled() {
        assert!(check_transition(Scheduled, Postponed).is_ok());
        assert!(check_transition(Postponed, Scheduled).is_ok());
        assert!(check_transition(Postponed, InProgress).is_ok());
    }

    #[test]
    fn scheduled_game_cannot_jump_to_completed() {
        assert_eq!(
            check_transition(Scheduled, Completed),
            Err(InvalidTransition {
                from: Scheduled,
                to: Completed
            })
        );
    }

    #[test]
    fn terminal_statuses_only_accept_themselves() {
        for from in [Completed, Cancelled] {
            assert!(is_terminal(from));
            for to in ALL {
                assert_eq!(check_transition(from, to).is_ok(), from == to, "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn same_status_is_always_accepted() {
        for status in ALL {
            assert!(check_transition(status, status).is_ok());
        }
    }

    #[test]
    fn error_message_uses_wire_names() {
        let err = check_transition(Completed, InProgress).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid game status transition: completed cannot become in_progress"
        );
    }
}
