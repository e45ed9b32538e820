//! Effective command: ball-in-play time per period.
//!
//! Totals are appended to the `effective_time` table (unless `--no-store`)
//! and to the configured CSV file once each analysis has closed.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use et_core::{MatchAnalytics, MatchId, PeriodAnalysis, PeriodTotal, TotalsExporter};
use et_db::Database;

use super::util::{csv_exporter, format_clock, machine_config, parse_match, parse_period};
use crate::Config;
use crate::cli::EffectiveArgs;

/// Effective time of one match, as printed.
#[derive(Debug, Serialize)]
pub struct MatchReport {
    #[serde(rename = "match")]
    pub match_id: MatchId,
    pub periods: Vec<PeriodTotal>,
    pub total_seconds: u64,
    pub stoppages: usize,
    pub stoppage_seconds: u64,
}

impl MatchReport {
    fn new(match_id: MatchId, analysis: PeriodAnalysis) -> Self {
        Self {
            match_id,
            total_seconds: analysis.effective_seconds(),
            stoppages: analysis.pauses.count(),
            stoppage_seconds: analysis.pauses.total_seconds(),
            periods: analysis.totals,
        }
    }
}

pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    config: &Config,
    args: &EffectiveArgs,
) -> Result<()> {
    let analytics = MatchAnalytics::new(db).with_config(machine_config(config, args.strict));
    let store = (!args.no_store).then(|| db.results_exporter());
    let mut exporter = (store, csv_exporter(config)?);

    let reports = if args.all {
        analyze_all(db, &analytics, &mut exporter)?
    } else {
        let id = args.match_id.as_deref().unwrap_or_default();
        let match_id = parse_match(id)?;
        let analysis = match args.period {
            Some(period) => {
                analytics.effective_time_with(&match_id, parse_period(period)?, &mut exporter)?
            }
            None => analytics.match_effective_time_with(&match_id, &mut exporter)?,
        };
        vec![MatchReport::new(match_id, analysis)]
    };

    if args.json {
        let json = if args.all {
            serde_json::to_string_pretty(&reports)?
        } else {
            serde_json::to_string_pretty(&reports[0])?
        };
        writeln!(writer, "{json}")?;
    } else {
        write_reports(writer, &reports)?;
    }
    Ok(())
}

/// Analyzes every stored match; a match that fails to load or whose stream
/// is rejected is logged and skipped.
fn analyze_all<X: TotalsExporter>(
    db: &Database,
    analytics: &MatchAnalytics<&Database>,
    exporter: &mut X,
) -> Result<Vec<MatchReport>> {
    let match_ids = db
        .list_matches()?
        .into_iter()
        .map(MatchId::new)
        .collect::<Result<Vec<_>, _>>()?;

    let mut reports = Vec::with_capacity(match_ids.len());
    for (match_id, result) in analytics.effective_time_for_matches(&match_ids) {
        match result {
            Ok(analysis) => {
                if !analysis.totals.is_empty() {
                    exporter.export(&analysis.totals)?;
                }
                reports.push(MatchReport::new(match_id, analysis));
            }
            Err(err) => {
                tracing::warn!(%match_id, error = %err, "skipping match");
            }
        }
    }
    Ok(reports)
}

fn write_reports<W: Write>(writer: &mut W, reports: &[MatchReport]) -> Result<()> {
    if reports.is_empty() {
        writeln!(writer, "No matches found.")?;
        return Ok(());
    }
    for (i, report) in reports.iter().enumerate() {
        if i > 0 {
            writeln!(writer)?;
        }
        writeln!(writer, "{}", report.match_id)?;
        if report.periods.is_empty() {
            writeln!(writer, "  no effective time recorded")?;
            continue;
        }
        for total in &report.periods {
            writeln!(
                writer,
                "  period {}  {}  ({}s)",
                total.period,
                format_clock(total.seconds),
                total.seconds
            )?;
        }
        writeln!(
            writer,
            "  total     {}  ({}s)",
            format_clock(report.total_seconds),
            report.total_seconds
        )?;
        writeln!(
            writer,
            "  stoppages {}  ({}s)",
            report.stoppages, report.stoppage_seconds
        )?;
    }
    Ok(())
}
