use thiserror::Error;

/// Checks performed on the client before any request is issued.
///
/// These are advisory: the backend remains the authority on every rule below.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("{field} must be a number")]
    NotANumber { field: &'static str },
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },
    #[error("no places available ({enrolled} of {capacity} taken)")]
    CapacityExceeded { enrolled: usize, capacity: u32 },
    #[error("cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },
    #[error("you must sign in first")]
    NotAuthenticated,
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn requires_reauth(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }
}
