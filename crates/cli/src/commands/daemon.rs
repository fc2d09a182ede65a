//! Scheduled cycles until Ctrl-C.

use std::future::Future;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Args;
use position_guard_core::GuardConfig;
use tokio::time::MissedTickBehavior;

use super::build_orchestrator;
use super::run_once::describe_outcome;

/// Arguments for the daemon command.
#[derive(Args, Debug, Clone)]
pub struct DaemonArgs {
    /// Seconds between cycles (overrides `schedule.interval_secs`)
    #[arg(long)]
    pub interval_secs: Option<u64>,
}

fn resolve_interval(config: &GuardConfig, args: &DaemonArgs) -> Result<Duration> {
    let secs = args.interval_secs.unwrap_or(config.schedule.interval_secs);
    if secs == 0 {
        bail!("cycle interval must be at least one second");
    }
    Ok(Duration::from_secs(secs))
}

/// Calls `run` on every tick until `shutdown` resolves, returning the number
/// of cycles run.
///
/// `shutdown` is polled for the whole lifetime of the loop, so a request that
/// lands mid-cycle stops the loop once that cycle returns.
async fn run_cycles<S, F, Fut>(period: Duration, shutdown: S, mut run: F) -> u64
where
    S: Future<Output = ()>,
    F: FnMut(u64) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut cycles: u64 = 0;
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            _ = ticker.tick() => {
                cycles += 1;
                run(cycles).await;
            }
        }
    }
    cycles
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Unable to listen for Ctrl-C; daemon must be killed to stop");
        std::future::pending::<()>().await;
    }
}

/// Runs a cycle on every tick. A failed cycle is logged and the loop carries
/// on; ticks missed while a cycle is still running are skipped.
///
/// # Errors
/// Returns an error if the broker cannot be configured or the interval is zero.
pub async fn run_daemon(config: &GuardConfig, args: DaemonArgs) -> Result<()> {
    let period = resolve_interval(config, &args)?;
    let orchestrator = build_orchestrator(config)?;

    tracing::info!(interval_secs = period.as_secs(), "Position guard daemon started");

    let cycles = run_cycles(period, ctrl_c(), |cycle| {
        let orchestrator = &orchestrator;
        async move {
            let run = orchestrator.run_traced().await;
            let final_state = run.trace.current();
            match run.result {
                Ok(outcome) => {
                    tracing::info!(cycle, %final_state, "{}", describe_outcome(&outcome));
                }
                Err(e) => {
                    tracing::error!(cycle, %final_state, error = %e, "Cycle failed; retrying next interval");
                }
            }
        }
    })
    .await;

    tracing::info!(cycles, "Shutdown requested, daemon stopped");
    Ok(())
}
