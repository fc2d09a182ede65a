//! One evaluation-and-closure cycle.
//!
//! Sequence: open a session, check the market gate, snapshot open positions,
//! detect averaging down, build close instructions, submit them. Any
//! collaborator fault before submission ends the cycle immediately; closure
//! faults are reported together once every instruction has been tried.

use std::sync::Arc;

use position_guard_core::{MarketGate, MarketStatus, OrderGateway, PositionSource, SessionProvider};
use rust_decimal::Decimal;
use tracing::{debug, error, info, warn};

use crate::closure::build_close_instructions;
use crate::detector::{AveragingDownDetector, ClosureCandidate};
use crate::error::{GuardError, Result};
use crate::executor::{ClosureExecutor, ExecutionReport};
use crate::normalizer::normalize_snapshot;

/// Progress through a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Start,
    Authenticated,
    MarketGateChecked,
    SnapshotTaken,
    CandidatesDetected,
    InstructionsBuilt,
    ClosuresExecuted,
    Done,
    /// Market gate reported a restricted market; nothing was touched.
    Aborted,
    Error,
}

impl std::fmt::Display for CycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Authenticated => "authenticated",
            Self::MarketGateChecked => "market_gate_checked",
            Self::SnapshotTaken => "snapshot_taken",
            Self::CandidatesDetected => "candidates_detected",
            Self::InstructionsBuilt => "instructions_built",
            Self::ClosuresExecuted => "closures_executed",
            Self::Done => "done",
            Self::Aborted => "aborted",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// What a completed cycle saw and did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub positions_seen: usize,
    pub instruments_seen: usize,
    pub total_profit_loss: Decimal,
    pub candidates: Vec<ClosureCandidate>,
    pub instructions_built: usize,
    pub execution: ExecutionReport,
}

impl CycleReport {
    /// Candidates dropped because their market was not tradeable.
    #[must_use]
    pub fn skipped_non_tradeable(&self) -> usize {
        self.candidates.len() - self.instructions_built
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Gate reported a restricted market; the cycle exited early.
    MarketRestricted { status: MarketStatus },
    Completed(CycleReport),
}

/// States a cycle passed through, in order, starting at [`CycleState::Start`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleTrace {
    states: Vec<CycleState>,
}

impl CycleTrace {
    fn new() -> Self {
        Self {
            states: vec![CycleState::Start],
        }
    }

    #[must_use]
    pub fn current(&self) -> CycleState {
        self.states.last().copied().unwrap_or(CycleState::Start)
    }

    #[must_use]
    pub fn states(&self) -> &[CycleState] {
        &self.states
    }

    fn advance(&mut self, next: CycleState) {
        debug!(from = %self.current(), to = %next, "Cycle state transition");
        self.states.push(next);
    }
}

/// A cycle's result together with the states it went through.
#[derive(Debug)]
pub struct CycleRun {
    pub trace: CycleTrace,
    pub result: Result<CycleOutcome>,
}

pub struct CycleOrchestrator {
    sessions: Arc<dyn SessionProvider>,
    gate: Arc<dyn MarketGate>,
    positions: Arc<dyn PositionSource>,
    orders: Arc<dyn OrderGateway>,
    detector: AveragingDownDetector,
}

impl CycleOrchestrator {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        gate: Arc<dyn MarketGate>,
        positions: Arc<dyn PositionSource>,
        orders: Arc<dyn OrderGateway>,
        detector: AveragingDownDetector,
    ) -> Self {
        Self {
            sessions,
            gate,
            positions,
            orders,
            detector,
        }
    }

    /// Wires every collaborator to one broker implementation.
    pub fn from_broker<B>(broker: Arc<B>, detector: AveragingDownDetector) -> Self
    where
        B: SessionProvider + MarketGate + PositionSource + OrderGateway + 'static,
    {
        Self::new(
            broker.clone(),
            broker.clone(),
            broker.clone(),
            broker,
            detector,
        )
    }

    /// Runs one cycle against a fresh snapshot.
    ///
    /// # Errors
    /// - [`GuardError::Authentication`], [`GuardError::MarketGate`] or
    ///   [`GuardError::Snapshot`] if a collaborator fails before any order is sent
    /// - [`GuardError::ClosureFailures`] if any close instruction failed; all
    ///   instructions have still been attempted
    pub async fn run_cycle(&self) -> Result<CycleOutcome> {
        self.run_traced().await.result
    }

    /// Runs one cycle and also returns the state path it took.
    ///
    /// A failed cycle ends in [`CycleState::Error`], entered from the last
    /// state it reached.
    pub async fn run_traced(&self) -> CycleRun {
        let mut trace = CycleTrace::new();
        let result = self.run_from(&mut trace).await;

        match &result {
            Ok(CycleOutcome::MarketRestricted { status }) => {
                info!(%status, final_state = %trace.current(), "Market restricted, cycle aborted");
            }
            Ok(CycleOutcome::Completed(report)) => {
                info!(
                    positions = report.positions_seen,
                    candidates = report.candidates.len(),
                    closed = report.execution.closed.len(),
                    final_state = %trace.current(),
                    "Cycle complete"
                );
            }
            Err(e) => {
                error!(failed_after = %trace.current(), error = %e, "Cycle failed");
                trace.advance(CycleState::Error);
            }
        }

        CycleRun { trace, result }
    }

    async fn run_from(&self, trace: &mut CycleTrace) -> Result<CycleOutcome> {
        let session = self
            .sessions
            .authenticate()
            .await
            .map_err(|e| GuardError::Authentication(format!("{e:#}")))?;
        trace.advance(CycleState::Authenticated);

        let status = self
            .gate
            .market_status(&session)
            .await
            .map_err(|e| GuardError::MarketGate(format!("{e:#}")))?;
        trace.advance(CycleState::MarketGateChecked);

        if status == MarketStatus::EditsOnly {
            trace.advance(CycleState::Aborted);
            return Ok(CycleOutcome::MarketRestricted { status });
        }

        let raw = self
            .positions
            .open_positions(&session)
            .await
            .map_err(|e| GuardError::Snapshot(format!("{e:#}")))?;
        let snapshot = normalize_snapshot(raw)?;
        trace.advance(CycleState::SnapshotTaken);

        let candidates = self.detector.detect(&snapshot);
        trace.advance(CycleState::CandidatesDetected);

        let instructions = build_close_instructions(&candidates);
        trace.advance(CycleState::InstructionsBuilt);
        if instructions.len() < candidates.len() {
            warn!(
                skipped = candidates.len() - instructions.len(),
                "Flagged positions left open on non-tradeable markets"
            );
        }

        let execution = ClosureExecutor::new(self.orders.as_ref())
            .execute(&session, &instructions)
            .await;
        trace.advance(CycleState::ClosuresExecuted);
        let execution = execution.into_result()?;

        let report = CycleReport {
            positions_seen: snapshot.position_count(),
            instruments_seen: snapshot.instrument_count(),
            total_profit_loss: snapshot.total_profit_loss(),
            candidates,
            instructions_built: instructions.len(),
            execution,
        };
        trace.advance(CycleState::Done);

        Ok(CycleOutcome::Completed(report))
    }
}
