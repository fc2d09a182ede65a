//! Error types for a guard cycle.
//!
//! Authentication, market-gate and snapshot faults end the cycle at once.
//! Closure faults are isolated per instruction and only surface, all together,
//! after every instruction has been attempted.

use thiserror::Error;

/// One close instruction the order gateway did not accept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosureFailure {
    pub deal_id: String,
    pub message: String,
}

impl std::fmt::Display for ClosureFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.deal_id, self.message)
    }
}

#[derive(Debug, Error)]
pub enum GuardError {
    /// The session provider could not open a session.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// The market-gate lookup itself failed.
    #[error("market gate error: {0}")]
    MarketGate(String),

    /// Open positions could not be fetched or were malformed.
    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Closed-trade history could not be fetched.
    #[error("history error: {0}")]
    History(String),

    /// At least one close instruction failed; every failure is listed.
    #[error("{} position closure(s) failed: {}", .failures.len(), join_failures(.failures))]
    ClosureFailures {
        /// Failures in submission order.
        failures: Vec<ClosureFailure>,
    },
}

fn join_failures(failures: &[ClosureFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl GuardError {
    pub fn snapshot(message: impl Into<String>) -> Self {
        Self::Snapshot(message.into())
    }

    /// True when the cycle got as far as submitting closures.
    #[must_use]
    pub fn is_partial_failure(&self) -> bool {
        matches!(self, Self::ClosureFailures { .. })
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn failure(deal_id: &str, message: &str) -> ClosureFailure {
        ClosureFailure {
            deal_id: deal_id.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn aggregate_message_lists_every_failure() {
        let err = GuardError::ClosureFailures {
            failures: vec![
                failure("D1", "status 400"),
                failure("D2", "status 500"),
                failure("D3", "connection reset"),
            ],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("3 position closure(s) failed"));
        assert!(msg.contains("D1: status 400; D2: status 500; D3: connection reset"));
        assert!(err.is_partial_failure());
    }

    #[test]
    fn fatal_faults_are_not_partial() {
        let err = GuardError::Authentication("bad credentials".to_string());
        assert!(err.to_string().contains("bad credentials"));
        assert!(!err.is_partial_failure());
        assert!(!GuardError::snapshot("unknown direction").is_partial_failure());
    }
}
