//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Effective playing time analytics.
///
/// Imports match events and splits them into ball-in-play and stoppage
/// intervals per period.
#[derive(Debug, Parser)]
#[command(name = "et", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import match events from JSON Lines (stdin or a file).
    Import(ImportArgs),

    /// Compute effective playing time per period.
    Effective(EffectiveArgs),

    /// List stoppages with a per-cause summary.
    Pauses(PausesArgs),

    /// Show match length, foul and stoppage timing for a period.
    Stats(StatsArgs),
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// File to read instead of stdin.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct EffectiveArgs {
    /// Match to analyze.
    #[arg(long = "match", value_name = "MATCH", required_unless_present = "all")]
    pub match_id: Option<String>,

    /// Restrict to one period.
    #[arg(long, conflicts_with = "all")]
    pub period: Option<u8>,

    /// Analyze every stored match in parallel.
    #[arg(long)]
    pub all: bool,

    /// Reject out-of-order events instead of processing them.
    #[arg(long)]
    pub strict: bool,

    /// Do not append results to the `effective_time` table.
    #[arg(long)]
    pub no_store: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct PausesArgs {
    /// Match to analyze.
    #[arg(long = "match", value_name = "MATCH")]
    pub match_id: String,

    /// Restrict to one period.
    #[arg(long)]
    pub period: Option<u8>,

    /// Reject out-of-order events instead of processing them.
    #[arg(long)]
    pub strict: bool,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct StatsArgs {
    /// Match to analyze.
    #[arg(long = "match", value_name = "MATCH")]
    pub match_id: String,

    /// Period for foul and stoppage timing.
    #[arg(long, default_value_t = 1)]
    pub period: u8,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_requires_match_or_all() {
        assert!(Cli::try_parse_from(["et", "effective"]).is_err());
        assert!(Cli::try_parse_from(["et", "effective", "--all"]).is_ok());

        let cli = Cli::try_parse_from(["et", "effective", "--match", "m1", "--period", "2"]).unwrap();
        match cli.command {
            Some(Commands::Effective(args)) => {
                assert_eq!(args.match_id.as_deref(), Some("m1"));
                assert_eq!(args.period, Some(2));
                assert!(!args.json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_period_cannot_be_combined_with_all() {
        assert!(Cli::try_parse_from(["et", "effective", "--all", "--period", "1"]).is_err());
    }

    #[test]
    fn test_stats_defaults_to_first_period() {
        let cli = Cli::try_parse_from(["et", "-v", "stats", "--match", "m1"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Some(Commands::Stats(args)) => assert_eq!(args.period, 1),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
