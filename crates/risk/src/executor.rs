//! Sequential close-order submission with per-order failure isolation.

use position_guard_core::{CloseConfirmation, CloseInstruction, OrderGateway, Session};
use tracing::{info, warn};

use crate::error::{ClosureFailure, GuardError, Result};

/// Outcome of submitting one cycle's close instructions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionReport {
    pub attempted: usize,
    pub closed: Vec<CloseConfirmation>,
    pub failures: Vec<ClosureFailure>,
}

impl ExecutionReport {
    /// Converts any recorded failures into a single aggregate error.
    ///
    /// # Errors
    /// Returns [`GuardError::ClosureFailures`] carrying every failure, in
    /// submission order, if at least one instruction failed.
    pub fn into_result(self) -> Result<Self> {
        if self.failures.is_empty() {
            Ok(self)
        } else {
            Err(GuardError::ClosureFailures {
                failures: self.failures,
            })
        }
    }
}

/// Submits close instructions one at a time.
///
/// Each submission is awaited before the next starts, so external side effects
/// happen in a fixed order. A failed submission is recorded and the remaining
/// instructions are still attempted. Nothing is retried.
pub struct ClosureExecutor<'a> {
    gateway: &'a dyn OrderGateway,
}

impl<'a> ClosureExecutor<'a> {
    pub fn new(gateway: &'a dyn OrderGateway) -> Self {
        Self { gateway }
    }

    pub async fn execute(&self, session: &Session, instructions: &[CloseInstruction]) -> ExecutionReport {
        let mut report = ExecutionReport::default();

        for instruction in instructions {
            report.attempted += 1;
            match self.gateway.close_position(session, instruction).await {
                Ok(confirmation) => {
                    info!(
                        deal_id = %instruction.deal_id,
                        direction = %instruction.direction,
                        size = %instruction.size,
                        deal_reference = ?confirmation.deal_reference,
                        "Position closed"
                    );
                    report.closed.push(confirmation);
                }
                Err(e) => {
                    warn!(deal_id = %instruction.deal_id, error = %e, "Failed to close position");
                    report.failures.push(ClosureFailure {
                        deal_id: instruction.deal_id.clone(),
                        message: format!("{e:#}"),
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use position_guard_core::{Direction, OrderType, TimeInForce};
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct RecordingGateway {
        failing: HashSet<String>,
        attempts: Mutex<Vec<String>>,
    }

    impl RecordingGateway {
        fn failing(ids: &[&str]) -> Self {
            Self {
                failing: ids.iter().map(|s| s.to_string()).collect(),
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderGateway for RecordingGateway {
        async fn close_position(
            &self,
            _session: &Session,
            instruction: &CloseInstruction,
        ) -> anyhow::Result<CloseConfirmation> {
            self.attempts.lock().unwrap().push(instruction.deal_id.clone());
            if self.failing.contains(&instruction.deal_id) {
                anyhow::bail!("rejected {}", instruction.deal_id);
            }
            Ok(CloseConfirmation {
                deal_id: instruction.deal_id.clone(),
                deal_reference: Some(format!("REF-{}", instruction.deal_id)),
            })
        }
    }

    fn instruction(deal_id: &str) -> CloseInstruction {
        CloseInstruction {
            deal_id: deal_id.to_string(),
            direction: Direction::Short,
            size: "1".to_string(),
            order_type: OrderType::Market,
            time_in_force: TimeInForce::FillOrKill,
        }
    }

    fn session() -> Session {
        Session::new("cst", "xst")
    }

    #[tokio::test]
    async fn all_successful_closes_yield_ok() {
        let gateway = RecordingGateway::failing(&[]);
        let report = ClosureExecutor::new(&gateway)
            .execute(&session(), &[instruction("A"), instruction("B")])
            .await;

        assert_eq!(report.attempted, 2);
        assert_eq!(report.closed.len(), 2);
        assert!(report.failures.is_empty());
        assert!(report.into_result().is_ok());
    }

    #[tokio::test]
    async fn failures_do_not_stop_later_submissions() {
        let gateway = RecordingGateway::failing(&["A", "C"]);
        let report = ClosureExecutor::new(&gateway)
            .execute(
                &session(),
                &[instruction("A"), instruction("B"), instruction("C"), instruction("D")],
            )
            .await;

        assert_eq!(gateway.attempts(), vec!["A", "B", "C", "D"]);
        assert_eq!(report.attempted, 4);
        assert_eq!(report.closed.len(), 2);

        let err = report.into_result().unwrap_err();
        match &err {
            GuardError::ClosureFailures { failures } => {
                let ids: Vec<&str> = failures.iter().map(|f| f.deal_id.as_str()).collect();
                assert_eq!(ids, vec!["A", "C"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn every_failure_reason_is_joined() {
        let gateway = RecordingGateway::failing(&["A", "B", "C"]);
        let report = ClosureExecutor::new(&gateway)
            .execute(&session(), &[instruction("A"), instruction("B"), instruction("C")])
            .await;

        assert_eq!(report.attempted, 3);
        let msg = report.into_result().unwrap_err().to_string();
        assert!(msg.contains("3 position closure(s) failed"));
        assert!(msg.contains("rejected A; B: rejected B; C: rejected C"));
    }

    #[tokio::test]
    async fn no_instructions_means_no_attempts() {
        let gateway = RecordingGateway::failing(&[]);
        let report = ClosureExecutor::new(&gateway).execute(&session(), &[]).await;
        assert_eq!(report.attempted, 0);
        assert!(gateway.attempts().is_empty());
        assert!(report.into_result().is_ok());
    }
}
