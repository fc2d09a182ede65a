//! Averaging-down risk control for open leveraged positions.
//!
//! One cycle takes a fresh snapshot of open positions and:
//! - Normalizes it into per-instrument chronological series with profit/loss
//! - Flags positions re-entered at a price no better than the previous entry
//! - Builds market, fill-or-kill close instructions for tradeable flagged positions
//! - Submits them one at a time, collecting failures into a single error
//!
//! Nothing is carried between cycles; a position that could not be closed is
//! picked up again by the next snapshot.

pub mod closed_trades;
pub mod closure;
pub mod detector;
pub mod error;
pub mod executor;
pub mod normalizer;
pub mod orchestrator;

pub use closed_trades::{closed_trade_report, group_closed_trades};
pub use closure::build_close_instructions;
pub use detector::{AveragingDownDetector, ClosureCandidate, DetectionReason};
pub use error::{ClosureFailure, GuardError, Result};
pub use executor::{ClosureExecutor, ExecutionReport};
pub use normalizer::{normalize_snapshot, profit_loss, InstrumentGroup, Snapshot};
pub use orchestrator::{
    CycleOrchestrator, CycleOutcome, CycleReport, CycleRun, CycleState, CycleTrace,
};
