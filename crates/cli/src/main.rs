use anyhow::Context;
use clap::{Parser, Subcommand};

mod commands;

use commands::{ClosedTradesArgs, DaemonArgs};
use position_guard_core::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(name = "position-guard")]
#[command(about = "Closes positions that average down on an IG account", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a single evaluation-and-closure cycle
    RunOnce,
    /// Run cycles on a fixed interval until interrupted
    Daemon(DaemonArgs),
    /// List recently closed trades grouped by instrument
    ClosedTrades(ClosedTradesArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = position_guard_core::ConfigLoader::load_from(&cli.config)
        .with_context(|| format!("failed to load configuration from {}", cli.config))?;
    tracing::debug!(config_path = %cli.config, environment = ?config.broker.environment, "Loaded configuration");

    match cli.command {
        Commands::RunOnce => {
            commands::run_once(&config).await?;
        }
        Commands::Daemon(args) => {
            commands::run_daemon(&config, args).await?;
        }
        Commands::ClosedTrades(args) => {
            commands::run_closed_trades(&config, args).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_once_with_default_config() {
        let cli = Cli::try_parse_from(["position-guard", "run-once"]).unwrap();
        assert_eq!(cli.config, DEFAULT_CONFIG_PATH);
        assert!(matches!(cli.command, Commands::RunOnce));
    }

    #[test]
    fn test_parse_global_config_after_subcommand() {
        let cli =
            Cli::try_parse_from(["position-guard", "daemon", "--config", "/etc/guard.toml"]).unwrap();
        assert_eq!(cli.config, "/etc/guard.toml");
        assert!(matches!(
            cli.command,
            Commands::Daemon(DaemonArgs { interval_secs: None })
        ));
    }

    #[test]
    fn test_parse_closed_trades_days() {
        let cli = Cli::try_parse_from(["position-guard", "closed-trades", "--days", "30"]).unwrap();
        match cli.command {
            Commands::ClosedTrades(args) => assert_eq!(args.days, Some(30)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["position-guard", "backtest"]).is_err());
    }
}
