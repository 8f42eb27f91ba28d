use crate::bookings::BookingStatus;

/// Service for managing booking status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Pending → Confirmed, Cancelled
    /// - Confirmed → Completed, Cancelled
    /// - Completed → (terminal)
    /// - Cancelled → (terminal)
    /// - Any status → Same status (idempotent)
    ///
    /// There is no path back to Pending once it has been left.
    pub fn is_valid_transition(from: BookingStatus, to: BookingStatus) -> bool {
        // Same status is always valid (idempotent)
        if from == to {
            return true;
        }

        match (from, to) {
            // From Pending
            (BookingStatus::Pending, BookingStatus::Confirmed) => true,
            (BookingStatus::Pending, BookingStatus::Cancelled) => true,

            // From Confirmed
            (BookingStatus::Confirmed, BookingStatus::Completed) => true,
            (BookingStatus::Confirmed, BookingStatus::Cancelled) => true,

            // Completed and Cancelled are terminal
            (BookingStatus::Completed, _) => false,
            (BookingStatus::Cancelled, _) => false,

            // All other transitions are invalid
            _ => false,
        }
    }

    /// Attempt to transition from one status to another
    ///
    /// # Returns
    /// `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(from: BookingStatus, to: BookingStatus) -> Result<BookingStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!(
                "Invalid status transition from {} to {}",
                from, to
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_to_confirmed() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Pending,
            BookingStatus::Confirmed
        ));
    }

    #[test]
    fn test_pending_to_cancelled() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Pending,
            BookingStatus::Cancelled
        ));
    }

    #[test]
    fn test_confirmed_to_completed() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Confirmed,
            BookingStatus::Completed
        ));
    }

    #[test]
    fn test_confirmed_to_cancelled() {
        assert!(StatusMachine::is_valid_transition(
            BookingStatus::Confirmed,
            BookingStatus::Cancelled
        ));
    }

    #[test]
    fn test_pending_cannot_skip_to_completed() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Pending,
            BookingStatus::Completed
        ));
    }

    #[test]
    fn test_no_return_to_pending() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Confirmed,
            BookingStatus::Pending
        ));
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Completed,
            BookingStatus::Pending
        ));
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Cancelled,
            BookingStatus::Pending
        ));
    }

    #[test]
    fn test_completed_is_terminal() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Completed,
            BookingStatus::Confirmed
        ));
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Completed,
            BookingStatus::Cancelled
        ));
    }

    #[test]
    fn test_cancelled_is_terminal() {
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Cancelled,
            BookingStatus::Confirmed
        ));
        assert!(!StatusMachine::is_valid_transition(
            BookingStatus::Cancelled,
            BookingStatus::Completed
        ));
    }

    #[test]
    fn test_same_status_is_idempotent() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ] {
            assert!(StatusMachine::is_valid_transition(status, status));
        }
    }

    #[test]
    fn test_transition_valid() {
        let result = StatusMachine::transition(BookingStatus::Pending, BookingStatus::Confirmed);
        assert!(result.is_ok());
        assert_eq!(result.unwrap(), BookingStatus::Confirmed);
    }

    #[test]
    fn test_transition_invalid() {
        let result = StatusMachine::transition(BookingStatus::Pending, BookingStatus::Completed);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Invalid status transition"));
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    // Helper to generate BookingStatus
    fn booking_status_strategy() -> impl Strategy<Value = BookingStatus> {
        prop_oneof![
            Just(BookingStatus::Pending),
            Just(BookingStatus::Confirmed),
            Just(BookingStatus::Completed),
            Just(BookingStatus::Cancelled),
        ]
    }

    /// All valid transitions are accepted; everything else is rejected
    #[test]
    fn prop_transition_table_is_exact() {
        let valid_transitions = vec![
            (BookingStatus::Pending, BookingStatus::Confirmed),
            (BookingStatus::Pending, BookingStatus::Cancelled),
            (BookingStatus::Confirmed, BookingStatus::Completed),
            (BookingStatus::Confirmed, BookingStatus::Cancelled),
        ];

        let all = [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
        ];

        for from in all {
            for to in all {
                let expected = from == to || valid_transitions.contains(&(from, to));
                assert_eq!(
                    StatusMachine::is_valid_transition(from, to),
                    expected,
                    "transition {} -> {} should be {}",
                    from,
                    to,
                    if expected { "valid" } else { "invalid" }
                );
            }
        }
    }

    /// Terminal states accept nothing but themselves
    #[test]
    fn prop_terminal_states() {
        proptest!(|(to_status in booking_status_strategy())| {
            for terminal in [BookingStatus::Completed, BookingStatus::Cancelled] {
                if to_status != terminal {
                    prop_assert!(
                        !StatusMachine::is_valid_transition(terminal, to_status),
                        "No transition should be allowed from {} to {}",
                        terminal,
                        to_status
                    );
                }
            }
        });
    }

    /// Pending is never reachable again once left
    #[test]
    fn prop_pending_is_unreachable() {
        proptest!(|(from_status in booking_status_strategy())| {
            if from_status != BookingStatus::Pending {
                prop_assert!(
                    !StatusMachine::is_valid_transition(from_status, BookingStatus::Pending)
                );
            }
        });
    }

    /// transition() and is_valid_transition() agree
    #[test]
    fn prop_transition_consistency() {
        proptest!(|(
            from in booking_status_strategy(),
            to in booking_status_strategy()
        )| {
            let is_valid = StatusMachine::is_valid_transition(from, to);
            let transition_result = StatusMachine::transition(from, to);

            if is_valid {
                prop_assert!(transition_result.is_ok());
                prop_assert_eq!(transition_result.unwrap(), to);
            } else {
                prop_assert!(transition_result.is_err());
            }
        });
    }
}
