//! Parallel analysis of independent matches.

use rayon::prelude::*;

use crate::accumulator::NoExport;
use crate::analytics::{PeriodAnalysis, analyze_events};
use crate::event::MatchEvent;
use crate::machine::{MachineConfig, MachineError};

/// Runs each stream through its own state machine on the rayon pool.
///
/// Results are returned in input order. A stream that failed to load keeps
/// its error and is not analyzed. Machines share nothing but the read-only
/// configuration.
pub fn analyze_streams<E>(
    streams: Vec<Result<Vec<MatchEvent>, E>>,
    config: &MachineConfig,
) -> Vec<Result<PeriodAnalysis, E>>
where
    E: From<MachineError> + Send,
{
    streams
        .into_par_iter()
        .map(|stream| -> Result<PeriodAnalysis, E> {
            Ok(analyze_events(stream?, config, NoExport)?)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionType;
    use crate::types::{MatchId, Period};

    fn events(match_id: &str, end: u32) -> Vec<MatchEvent> {
        let id = MatchId::new(match_id).unwrap();
        vec![
            MatchEvent::new(id.clone(), Period::FIRST, 0, ActionType::StartPeriod),
            MatchEvent::new(id, Period::FIRST, end, ActionType::EndPeriod),
        ]
    }

    fn stream(match_id: &str, end: u32) -> Result<Vec<MatchEvent>, MachineError> {
        Ok(events(match_id, end))
    }

    #[test]
    fn test_results_follow_input_order() {
        let streams: Vec<_> = (1..=16).map(|i| stream(&format!("m{i}"), i * 10)).collect();
        let results = analyze_streams(streams, &MachineConfig::default());

        assert_eq!(results.len(), 16);
        for (i, result) in (1..=16u64).zip(&results) {
            let analysis = result.as_ref().unwrap();
            assert_eq!(analysis.effective_seconds(), i * 10);
            assert_eq!(analysis.totals[0].match_id.as_str(), format!("m{i}"));
        }
    }

    #[test]
    fn test_one_bad_stream_does_not_affect_others() {
        let config = MachineConfig {
            strict_ordering: true,
            ..MachineConfig::default()
        };
        let mut bad = events("bad", 50);
        bad.reverse();
        let results = analyze_streams(vec![stream("good", 40), Ok(bad)], &config);

        assert_eq!(results[0].as_ref().unwrap().effective_seconds(), 40);
        assert!(matches!(results[1], Err(MachineError::Sequence(_))));
    }

    #[test]
    fn test_failed_stream_passes_its_error_through() {
        let streams = vec![Err(MachineError::Closed), stream("good", 25)];
        let results = analyze_streams(streams, &MachineConfig::default());

        assert!(matches!(results[0], Err(MachineError::Closed)));
        assert_eq!(results[1].as_ref().unwrap().effective_seconds(), 25);
    }
}
