//! Pauses command: every stoppage of a match with a per-cause summary.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use et_core::{ActionType, Interval, MatchAnalytics, Period, StoppageSummary};
use et_db::Database;

use super::util::{format_clock, machine_config, parse_match, parse_period};
use crate::Config;
use crate::cli::PausesArgs;

/// One stoppage, as printed.
#[derive(Debug, Serialize)]
struct PauseRow {
    period: Period,
    start: u32,
    end: u32,
    seconds: u32,
    cause: ActionType,
    resumed_by: ActionType,
}

impl From<&Interval> for PauseRow {
    fn from(pause: &Interval) -> Self {
        Self {
            period: pause.period(),
            start: pause.start().seconds,
            end: pause.end().seconds,
            seconds: pause.duration_secs(),
            cause: pause.start().action,
            resumed_by: pause.end().action,
        }
    }
}

#[derive(Debug, Serialize)]
struct PausesOutput {
    pauses: Vec<PauseRow>,
    summary: StoppageSummary,
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    args: &PausesArgs,
) -> Result<()> {
    let match_id = parse_match(&args.match_id)?;
    let analytics = MatchAnalytics::new(db).with_config(machine_config(config, args.strict));
    let analysis = match args.period {
        Some(period) => analytics.effective_time(&match_id, parse_period(period)?)?,
        None => analytics.match_effective_time(&match_id)?,
    };

    let output = PausesOutput {
        pauses: analysis.pauses.pauses().iter().map(PauseRow::from).collect(),
        summary: analysis.pauses.summary(),
    };

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    if output.pauses.is_empty() {
        writeln!(writer, "No stoppages recorded for {match_id}.")?;
        return Ok(());
    }

    for row in &output.pauses {
        writeln!(
            writer,
            "P{}  {} - {}  {:>4}s  {} -> {}",
            row.period,
            format_clock(u64::from(row.start)),
            format_clock(u64::from(row.end)),
            row.seconds,
            row.cause,
            row.resumed_by
        )?;
    }

    let summary = &output.summary;
    writeln!(writer)?;
    write!(
        writer,
        "{} stoppages, {}s total",
        summary.count, summary.total_seconds
    )?;
    if let Some(mean) = summary.mean_seconds {
        write!(writer, ", mean {mean:.1}s")?;
    }
    writeln!(writer)?;
    for cause in &summary.by_cause {
        writeln!(
            writer,
            "  {}: {} ({}s)",
            cause.cause, cause.count, cause.total_seconds
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;

    use insta::assert_snapshot;

    fn args(match_id: &str, period: Option<u8>, json: bool) -> PausesArgs {
        PausesArgs {
            match_id: match_id.to_string(),
            period,
            strict: false,
            json,
        }
    }

    fn render(args: &PausesArgs) -> String {
        let db = fixtures::database();
        let mut output = Vec::new();
        run(&mut output, &db, &Config::default(), args).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_lists_stoppages_with_summary() {
        let output = render(&args("m1", None, false));
        assert_snapshot!(output, @r"
        P1  00:15 - 00:20     5s  foul -> throw_in
        P1  00:50 - 00:58     8s  foul -> free_kick
        P2  00:40 - 00:45     5s  ball_out -> throw_in

        3 stoppages, 18s total, mean 6.0s
          foul: 2 (13s)
          ball_out: 1 (5s)
        ");
    }

    #[test]
    fn test_single_period_json() {
        let output = render(&args("m1", Some(2), true));
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["pauses"].as_array().unwrap().len(), 1);
        assert_eq!(value["pauses"][0]["cause"], "ball_out");
        assert_eq!(value["pauses"][0]["resumed_by"], "throw_in");
        assert_eq!(value["pauses"][0]["seconds"], 5);
        assert_eq!(value["summary"]["count"], 1);
        assert_eq!(value["summary"]["mean_seconds"], 5.0);
    }

    #[test]
    fn test_match_without_stoppages() {
        let output = render(&args("m2", None, false));
        assert_snapshot!(output, @"No stoppages recorded for m2.");
    }
}
