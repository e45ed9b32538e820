//! Stats command: match length and foul/stoppage timing for a period.

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use et_core::{MatchAnalytics, MatchId, Period};
use et_db::Database;

use super::util::{parse_match, parse_period};
use crate::cli::StatsArgs;

#[derive(Debug, Serialize)]
struct PeriodEnd {
    period: Period,
    seconds: u32,
}

#[derive(Debug, Serialize)]
struct StatsOutput {
    #[serde(rename = "match")]
    match_id: MatchId,
    period: Period,
    period_ends: Vec<PeriodEnd>,
    foul_times: Vec<u32>,
    mean_time_between_fouls: Option<f64>,
    stoppage_times: Vec<u32>,
    mean_time_between_stoppages: Option<f64>,
}

pub fn run<W: Write>(writer: &mut W, db: &Database, args: &StatsArgs) -> Result<()> {
    let match_id = parse_match(&args.match_id)?;
    let period = parse_period(args.period)?;
    let analytics = MatchAnalytics::new(db);

    let output = StatsOutput {
        period_ends: analytics
            .match_length(&match_id)?
            .into_iter()
            .map(|(period, seconds)| PeriodEnd { period, seconds })
            .collect(),
        foul_times: analytics.foul_times(&match_id, period)?,
        mean_time_between_fouls: analytics.mean_time_between_fouls(&match_id, period)?,
        stoppage_times: analytics.stoppage_times(&match_id, period)?,
        mean_time_between_stoppages: analytics.mean_time_between_stoppages(&match_id, period)?,
        match_id,
        period,
    };

    if args.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&output)?)?;
        return Ok(());
    }

    writeln!(writer, "{} period {}", output.match_id, output.period)?;
    let ends = if output.period_ends.is_empty() {
        "n/a".to_string()
    } else {
        output
            .period_ends
            .iter()
            .map(|end| format!("P{} {}s", end.period, end.seconds))
            .collect::<Vec<_>>()
            .join(", ")
    };
    writeln!(writer, "  period ends:     {ends}")?;
    writeln!(writer, "  fouls:           {}", join_times(&output.foul_times))?;
    writeln!(
        writer,
        "  mean foul gap:   {}",
        format_mean(output.mean_time_between_fouls)
    )?;
    writeln!(
        writer,
        "  stoppages:       {}",
        join_times(&output.stoppage_times)
    )?;
    writeln!(
        writer,
        "  mean stop gap:   {}",
        format_mean(output.mean_time_between_stoppages)
    )?;
    Ok(())
}

fn join_times(times: &[u32]) -> String {
    if times.is_empty() {
        return "none".to_string();
    }
    let mut out = String::new();
    for (i, seconds) in times.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{seconds}s");
    }
    out
}

fn format_mean(mean: Option<f64>) -> String {
    mean.map_or_else(|| "n/a".to_string(), |mean| format!("{mean:.1}s"))
}
