//! Closed-trade report command.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use clap::Args;
use position_guard_core::{ClosedTrade, GuardConfig};
use position_guard_ig::IgBroker;
use position_guard_risk::closed_trade_report;
use rust_decimal::Decimal;

/// Arguments for the closed-trades command.
#[derive(Args, Debug, Clone)]
pub struct ClosedTradesArgs {
    /// Days of history to include (defaults to `reporting.closed_trade_days`)
    #[arg(long)]
    pub days: Option<u32>,
}

/// Prints trades closed in the look-back window, grouped by instrument.
///
/// # Errors
/// Returns an error if login or the history lookup fails.
pub async fn run_closed_trades(config: &GuardConfig, args: ClosedTradesArgs) -> Result<()> {
    let days = args.days.unwrap_or(config.reporting.closed_trade_days);
    let broker = IgBroker::from_config(config).context("failed to configure IG broker")?;

    let report = closed_trade_report(&broker, &broker, days).await?;
    print!("{}", render_report(days, &report));
    Ok(())
}

fn format_level(level: Option<Decimal>) -> String {
    level.map_or_else(|| "-".to_string(), |l| l.to_string())
}

fn render_report(days: u32, report: &BTreeMap<String, Vec<ClosedTrade>>) -> String {
    if report.is_empty() {
        return format!("No trades closed in the last {days} day(s)\n");
    }

    let total: usize = report.values().map(Vec::len).sum();
    let mut out = format!(
        "{total} trade(s) closed in the last {days} day(s) across {} instrument(s)\n",
        report.len()
    );

    for (instrument, trades) in report {
        out.push_str(&format!("\n{instrument}\n"));
        for trade in trades {
            out.push_str(&format!(
                "  {}  {:<12} size {:>6}  open {:>10}  close {:>10}  P/L {}\n",
                trade.closed_at.format("%Y-%m-%d %H:%M"),
                trade.reference,
                format_level(trade.size),
                format_level(trade.open_level),
                format_level(trade.close_level),
                trade.profit_and_loss
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn trade(instrument: &str, reference: &str, pnl: &str) -> ClosedTrade {
        ClosedTrade {
            instrument_name: instrument.to_string(),
            reference: reference.to_string(),
            closed_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            open_level: Some(dec!(2300)),
            close_level: None,
            size: Some(dec!(1)),
            profit_and_loss: pnl.to_string(),
            currency: Some("£".to_string()),
        }
    }

    #[test]
    fn test_render_empty_report() {
        let text = render_report(7, &BTreeMap::new());
        assert_eq!(text, "No trades closed in the last 7 day(s)\n");
    }

    #[test]
    fn test_render_groups_in_instrument_order() {
        let mut report = BTreeMap::new();
        report.insert(
            "Spot Gold".to_string(),
            vec![trade("Spot Gold", "R1", "£10.00"), trade("Spot Gold", "R2", "£-4.20")],
        );
        report.insert("Oil".to_string(), vec![trade("Oil", "R3", "£1.00")]);

        let text = render_report(3, &report);
        assert!(text.starts_with("3 trade(s) closed in the last 3 day(s) across 2 instrument(s)"));

        let oil = text.find("\nOil\n").unwrap();
        let gold = text.find("\nSpot Gold\n").unwrap();
        assert!(oil < gold);

        let r1 = text.find("R1").unwrap();
        let r2 = text.find("R2").unwrap();
        assert!(r1 < r2);
        assert!(text.contains("2024-05-01 09:30"));
        assert!(text.contains("£-4.20"));
    }

    #[test]
    fn test_missing_level_rendered_as_dash() {
        assert_eq!(format_level(None), "-");
        assert_eq!(format_level(Some(dec!(1.5))), "1.5");
    }
}
