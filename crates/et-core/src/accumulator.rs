//! Effective time accumulation and export.

use std::collections::BTreeMap;
use std::io::Write;

use serde::Serialize;

use crate::event::Interval;
use crate::sink::{IntervalSink, SinkError};
use crate::types::{MatchId, Period};

/// Accumulated effective time for one period of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodTotal {
    #[serde(rename = "match")]
    pub match_id: MatchId,
    pub period: Period,
    /// Seconds of ball-in-play time.
    pub seconds: u64,
}

/// Destination for final effective time totals.
pub trait TotalsExporter {
    fn export(&mut self, totals: &[PeriodTotal]) -> Result<(), SinkError>;
}

impl<X: TotalsExporter + ?Sized> TotalsExporter for &mut X {
    fn export(&mut self, totals: &[PeriodTotal]) -> Result<(), SinkError> {
        (**self).export(totals)
    }
}

impl<X: TotalsExporter> TotalsExporter for Option<X> {
    fn export(&mut self, totals: &[PeriodTotal]) -> Result<(), SinkError> {
        match self {
            Some(exporter) => exporter.export(totals),
            None => Ok(()),
        }
    }
}

/// Exports to both, first to second; stops at the first failure.
impl<A: TotalsExporter, B: TotalsExporter> TotalsExporter for (A, B) {
    fn export(&mut self, totals: &[PeriodTotal]) -> Result<(), SinkError> {
        self.0.export(totals)?;
        self.1.export(totals)
    }
}

/// Exporter that keeps totals in memory only.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExport;

impl TotalsExporter for NoExport {
    fn export(&mut self, _totals: &[PeriodTotal]) -> Result<(), SinkError> {
        Ok(())
    }
}

/// Writes one `match,period,seconds` line per period.
#[derive(Debug)]
pub struct CsvExporter<W> {
    writer: W,
}

impl<W: Write> CsvExporter<W> {
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> TotalsExporter for CsvExporter<W> {
    fn export(&mut self, totals: &[PeriodTotal]) -> Result<(), SinkError> {
        for total in totals {
            writeln!(
                self.writer,
                "{},{},{}",
                total.match_id, total.period, total.seconds
            )?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

/// Sums effective play intervals per match and period.
///
/// Totals can be read at any time; they become final once the machine is
/// closed and the exporter has accepted them. A failed export is retried on
/// the next `finish`.
#[derive(Debug, Default)]
pub struct EffectiveTimeAccumulator<X = NoExport> {
    totals: BTreeMap<(MatchId, Period), u64>,
    exporter: X,
    finished: bool,
}

impl EffectiveTimeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<X: TotalsExporter> EffectiveTimeAccumulator<X> {
    /// Creates an accumulator that exports its totals on close.
    pub const fn with_exporter(exporter: X) -> Self {
        Self {
            totals: BTreeMap::new(),
            exporter,
            finished: false,
        }
    }

    /// Effective seconds accumulated so far for a period.
    pub fn total(&self, match_id: &MatchId, period: Period) -> u64 {
        self.totals
            .get(&(match_id.clone(), period))
            .copied()
            .unwrap_or(0)
    }

    /// All totals, ordered by match then period.
    pub fn totals(&self) -> Vec<PeriodTotal> {
        self.totals
            .iter()
            .map(|((match_id, period), seconds)| PeriodTotal {
                match_id: match_id.clone(),
                period: *period,
                seconds: *seconds,
            })
            .collect()
    }

    /// Whether the totals are final and, if non-empty, exported.
    pub const fn is_final(&self) -> bool {
        self.finished
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl<X: TotalsExporter> IntervalSink for EffectiveTimeAccumulator<X> {
    fn accept(&mut self, interval: Interval) {
        let key = (interval.start().match_id.clone(), interval.period());
        *self.totals.entry(key).or_insert(0) += u64::from(interval.duration_secs());
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        if self.finished {
            return Ok(());
        }
        if !self.totals.is_empty() {
            let totals = self.totals();
            tracing::debug!(periods = totals.len(), "exporting effective time totals");
            self.exporter.export(&totals)?;
        }
        self.finished = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionType;
    use crate::event::{IntervalKind, MatchEvent};

    fn interval(match_id: &str, period: u8, start: u32, end: u32) -> Interval {
        let event = |seconds, action| {
            MatchEvent::new(
                MatchId::new(match_id).unwrap(),
                Period::new(period).unwrap(),
                seconds,
                action,
            )
        };
        Interval::new(
            IntervalKind::Effective,
            event(start, ActionType::StartPeriod),
            event(end, ActionType::Foul),
        )
        .unwrap()
    }

    #[test]
    fn test_sums_per_match_and_period() {
        let mut acc = EffectiveTimeAccumulator::new();
        acc.accept(interval("m1", 1, 0, 15));
        acc.accept(interval("m1", 1, 20, 90));
        acc.accept(interval("m1", 2, 0, 30));
        acc.accept(interval("m2", 1, 5, 10));

        let m1 = MatchId::new("m1").unwrap();
        assert_eq!(acc.total(&m1, Period::FIRST), 85);
        assert_eq!(acc.total(&m1, Period::new(2).unwrap()), 30);
        assert_eq!(acc.total(&m1, Period::new(3).unwrap()), 0);

        let totals = acc.totals();
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[2].match_id.as_str(), "m2");
        assert_eq!(totals[2].seconds, 5);
    }

    #[test]
    fn test_csv_export_happens_once_on_finish() {
        let mut acc = EffectiveTimeAccumulator::with_exporter(CsvExporter::new(Vec::new()));
        acc.accept(interval("m1", 1, 0, 15));
        acc.accept(interval("m1", 2, 0, 40));
        assert!(!acc.is_final());

        acc.finish().unwrap();
        acc.finish().unwrap();
        assert!(acc.is_final());

        let written = String::from_utf8(acc.exporter.into_inner()).unwrap();
        assert_eq!(written, "m1,1,15\nm1,2,40\n");
    }

    #[test]
    fn test_combined_exporters_skip_missing_ones() {
        let exporter = (None::<CsvExporter<Vec<u8>>>, CsvExporter::new(Vec::new()));
        let mut acc = EffectiveTimeAccumulator::with_exporter(exporter);
        acc.accept(interval("m3", 1, 10, 30));
        acc.finish().unwrap();

        let (skipped, written) = acc.exporter;
        assert!(skipped.is_none());
        assert_eq!(String::from_utf8(written.into_inner()).unwrap(), "m3,1,20\n");
    }

    #[test]
    fn test_empty_accumulator_exports_nothing() {
        let mut acc = EffectiveTimeAccumulator::with_exporter(CsvExporter::new(Vec::new()));
        acc.finish().unwrap();
        assert!(acc.is_empty());
        assert!(acc.exporter.into_inner().is_empty());
    }

    #[test]
    fn test_failed_export_is_retried() {
        struct FailOnce {
            failed: bool,
            exported: Vec<PeriodTotal>,
        }

        impl TotalsExporter for FailOnce {
            fn export(&mut self, totals: &[PeriodTotal]) -> Result<(), SinkError> {
                if !self.failed {
                    self.failed = true;
                    return Err(SinkError::Io(std::io::Error::other("disk full")));
                }
                self.exported.extend_from_slice(totals);
                Ok(())
            }
        }

        let mut acc = EffectiveTimeAccumulator::with_exporter(FailOnce {
            failed: false,
            exported: Vec::new(),
        });
        acc.accept(interval("m1", 1, 0, 15));

        assert!(acc.finish().is_err());
        assert!(!acc.is_final());
        acc.finish().unwrap();
        acc.finish().unwrap();
        assert!(acc.is_final());
        assert_eq!(acc.exporter.exported.len(), 1);
        assert_eq!(acc.exporter.exported[0].seconds, 15);
    }
}
