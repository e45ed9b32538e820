//! Stoppage recording and reporting.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::action::ActionType;
use crate::event::Interval;
use crate::sink::IntervalSink;

/// Stores every pause interval exactly as emitted.
#[derive(Debug, Clone, Default)]
pub struct PauseRecorder {
    pauses: Vec<Interval>,
}

/// Stoppage count and duration for one cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CauseSummary {
    /// Action that anchors the start of the pause.
    pub cause: ActionType,
    pub count: usize,
    pub total_seconds: u64,
}

/// Aggregate view over recorded pauses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoppageSummary {
    pub count: usize,
    pub total_seconds: u64,
    pub mean_seconds: Option<f64>,
    /// Most frequent causes first.
    pub by_cause: Vec<CauseSummary>,
}

impl PauseRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pauses(&self) -> &[Interval] {
        &self.pauses
    }

    pub fn into_pauses(self) -> Vec<Interval> {
        self.pauses
    }

    pub fn count(&self) -> usize {
        self.pauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pauses.is_empty()
    }

    /// Sum of all pause durations.
    pub fn total_seconds(&self) -> u64 {
        self.pauses
            .iter()
            .map(|pause| u64::from(pause.duration_secs()))
            .sum()
    }

    /// Groups pauses by the action that opened them.
    ///
    /// A pause re-anchored by a substitution counts as a substitution stoppage.
    #[expect(
        clippy::cast_precision_loss,
        reason = "pause totals are far below 2^52 seconds"
    )]
    pub fn summary(&self) -> StoppageSummary {
        let mut causes: BTreeMap<ActionType, (usize, u64)> = BTreeMap::new();
        for pause in &self.pauses {
            let entry = causes.entry(pause.start().action).or_insert((0, 0));
            entry.0 += 1;
            entry.1 += u64::from(pause.duration_secs());
        }

        let mut by_cause: Vec<CauseSummary> = causes
            .into_iter()
            .map(|(cause, (count, total_seconds))| CauseSummary {
                cause,
                count,
                total_seconds,
            })
            .collect();
        by_cause.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.cause.cmp(&b.cause)));

        let count = self.count();
        let total_seconds = self.total_seconds();
        let mean_seconds = (count > 0).then(|| total_seconds as f64 / count as f64);

        StoppageSummary {
            count,
            total_seconds,
            mean_seconds,
            by_cause,
        }
    }
}

impl IntervalSink for PauseRecorder {
    fn accept(&mut self, interval: Interval) {
        self.pauses.push(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{IntervalKind, MatchEvent};
    use crate::types::{MatchId, Period};

    fn pause(start: u32, cause: ActionType, end: u32) -> Interval {
        let event = |seconds, action| {
            MatchEvent::new(MatchId::new("m1").unwrap(), Period::FIRST, seconds, action)
        };
        Interval::new(
            IntervalKind::Pause,
            event(start, cause),
            event(end, ActionType::ThrowIn),
        )
        .unwrap()
    }

    #[test]
    fn test_records_every_pause_without_dedup() {
        let mut recorder = PauseRecorder::new();
        recorder.accept(pause(15, ActionType::Foul, 20));
        recorder.accept(pause(15, ActionType::Foul, 20));

        assert_eq!(recorder.count(), 2);
        assert_eq!(recorder.total_seconds(), 10);
    }

    #[test]
    fn test_summary_groups_by_opening_action() {
        let mut recorder = PauseRecorder::new();
        recorder.accept(pause(10, ActionType::BallOut, 18));
        recorder.accept(pause(40, ActionType::Foul, 45));
        recorder.accept(pause(55, ActionType::Substitution, 60));
        recorder.accept(pause(70, ActionType::Foul, 82));

        let summary = recorder.summary();
        assert_eq!(summary.count, 4);
        assert_eq!(summary.total_seconds, 30);
        assert_eq!(summary.mean_seconds, Some(7.5));
        assert_eq!(
            summary.by_cause[0],
            CauseSummary {
                cause: ActionType::Foul,
                count: 2,
                total_seconds: 17,
            }
        );
        assert_eq!(summary.by_cause[1].cause, ActionType::BallOut);
        assert_eq!(summary.by_cause[2].cause, ActionType::Substitution);
    }

    #[test]
    fn test_empty_summary_has_no_mean() {
        let summary = PauseRecorder::new().summary();
        assert_eq!(summary.count, 0);
        assert_eq!(summary.mean_seconds, None);
        assert!(summary.by_cause.is_empty());
    }
}
