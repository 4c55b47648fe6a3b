use crate::orders::CheckoutStatus;

/// Service for managing checkout status transitions
pub struct StatusMachine;

impl StatusMachine {
    /// Check if a status transition is valid
    ///
    /// # Valid Transitions
    /// - Idle → Submitting
    /// - Submitting → Processing
    /// - Processing → Succeeded, Declined, TimedOut, Cancelled
    /// - Succeeded, Declined, TimedOut, Cancelled → Submitting (new attempt)
    pub fn is_valid_transition(from: CheckoutStatus, to: CheckoutStatus) -> bool {
        use CheckoutStatus::*;

        match (from, to) {
            (Idle, Submitting) => true,
            (Submitting, Processing) => true,

            // Gateway outcomes, or the buyer leaving the processing page
            (Processing, Succeeded) => true,
            (Processing, Declined) => true,
            (Processing, TimedOut) => true,
            (Processing, Cancelled) => true,

            (terminal, Submitting) if terminal.is_terminal() => true,

            _ => false,
        }
    }

    /// Attempt to transition from one status to another
    ///
    /// # Returns
    /// `Ok(to)` if the transition is valid, `Err(message)` otherwise
    pub fn transition(from: CheckoutStatus, to: CheckoutStatus) -> Result<CheckoutStatus, String> {
        if Self::is_valid_transition(from, to) {
            Ok(to)
        } else {
            Err(format!("Invalid checkout transition from {} to {}", from, to))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use CheckoutStatus::*;

    #[test]
    fn test_happy_path() {
        assert!(StatusMachine::is_valid_transition(Idle, Submitting));
        assert!(StatusMachine::is_valid_transition(Submitting, Processing));
        assert!(StatusMachine::is_valid_transition(Processing, Succeeded));
    }

    #[test]
    fn test_processing_outcomes() {
        for to in [Declined, TimedOut, Cancelled] {
            assert!(StatusMachine::is_valid_transition(Processing, to));
        }
    }

    #[test]
    fn test_idle_cannot_skip_ahead() {
        for to in [Processing, Succeeded, Declined, TimedOut, Cancelled] {
            assert!(!StatusMachine::is_valid_transition(Idle, to));
        }
    }

    #[test]
    fn test_submitting_cannot_complete_directly() {
        assert!(!StatusMachine::is_valid_transition(Submitting, Succeeded));
        assert!(!StatusMachine::is_valid_transition(Submitting, Cancelled));
    }

    #[test]
    fn test_no_return_to_idle() {
        for from in [Submitting, Processing, Succeeded, Declined, TimedOut, Cancelled] {
            assert!(!StatusMachine::is_valid_transition(from, Idle));
        }
    }

    #[test]
    fn test_terminal_states_allow_new_attempt() {
        for from in [Succeeded, Declined, TimedOut, Cancelled] {
            assert!(StatusMachine::is_valid_transition(from, Submitting));
            assert!(!StatusMachine::is_valid_transition(from, Processing));
        }
    }

    #[test]
    fn test_transition_valid() {
        assert_eq!(StatusMachine::transition(Idle, Submitting), Ok(Submitting));
    }

    #[test]
    fn test_transition_invalid() {
        let result = StatusMachine::transition(Succeeded, Cancelled);
        assert!(result.unwrap_err().contains("Invalid checkout transition"));
    }
}
