//! Match analytics facade.
//!
//! Loads ordered events from an [`EventSource`], drives a fresh
//! [`PlayStateMachine`] per request and derives statistics from the result.
//! The timestamp queries (`foul_times`, `stoppage_times`, ...) are plain
//! filters and never touch the state machine.

use std::convert::Infallible;

use thiserror::Error;

use crate::accumulator::{EffectiveTimeAccumulator, NoExport, PeriodTotal, TotalsExporter};
use crate::action::ActionType;
use crate::batch::analyze_streams;
use crate::event::MatchEvent;
use crate::machine::{MachineConfig, MachineError, PlayStateMachine};
use crate::pause::PauseRecorder;
use crate::stats::mean_gap;
use crate::types::{MatchId, Period};

/// Actions counted by [`MatchAnalytics::stoppage_times`].
///
/// Unlike the state machine's stop set this includes throw-ins and leaves
/// out cards, matching how stoppages are tallied for reporting.
pub const STOPPAGE_ACTIONS: [ActionType; 7] = [
    ActionType::ThrowIn,
    ActionType::BallOut,
    ActionType::Foul,
    ActionType::Offside,
    ActionType::Goal,
    ActionType::Substitution,
    ActionType::Stopped,
];

/// Storage collaborator providing a match's events.
///
/// Implementations must return events in non-decreasing `(period, seconds)`
/// order.
pub trait EventSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Events of one period of a match.
    fn period_events(
        &self,
        match_id: &MatchId,
        period: Period,
    ) -> Result<Vec<MatchEvent>, Self::Error>;

    /// Events of every period of a match.
    fn match_events(&self, match_id: &MatchId) -> Result<Vec<MatchEvent>, Self::Error>;
}

impl<T: EventSource + ?Sized> EventSource for &T {
    type Error = T::Error;

    fn period_events(
        &self,
        match_id: &MatchId,
        period: Period,
    ) -> Result<Vec<MatchEvent>, Self::Error> {
        (**self).period_events(match_id, period)
    }

    fn match_events(&self, match_id: &MatchId) -> Result<Vec<MatchEvent>, Self::Error> {
        (**self).match_events(match_id)
    }
}

/// In-memory source; sorts matching events by match time, keeping input
/// order for ties.
impl EventSource for [MatchEvent] {
    type Error = Infallible;

    fn period_events(
        &self,
        match_id: &MatchId,
        period: Period,
    ) -> Result<Vec<MatchEvent>, Self::Error> {
        let mut events: Vec<MatchEvent> = self
            .iter()
            .filter(|e| &e.match_id == match_id && e.period == period)
            .cloned()
            .collect();
        events.sort_by_key(MatchEvent::position);
        Ok(events)
    }

    fn match_events(&self, match_id: &MatchId) -> Result<Vec<MatchEvent>, Self::Error> {
        let mut events: Vec<MatchEvent> = self
            .iter()
            .filter(|e| &e.match_id == match_id)
            .cloned()
            .collect();
        events.sort_by_key(MatchEvent::position);
        Ok(events)
    }
}

impl EventSource for Vec<MatchEvent> {
    type Error = Infallible;

    fn period_events(
        &self,
        match_id: &MatchId,
        period: Period,
    ) -> Result<Vec<MatchEvent>, Self::Error> {
        self.as_slice().period_events(match_id, period)
    }

    fn match_events(&self, match_id: &MatchId) -> Result<Vec<MatchEvent>, Self::Error> {
        self.as_slice().match_events(match_id)
    }
}

/// Errors returned by [`MatchAnalytics`].
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The event source failed.
    #[error("failed to load events for match {match_id}")]
    Source {
        match_id: MatchId,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// The state machine rejected the stream or a sink failed on close.
    #[error(transparent)]
    Machine(#[from] MachineError),
}

/// Effective time and stoppages derived from one event stream.
#[derive(Debug, Clone)]
pub struct PeriodAnalysis {
    /// Effective seconds per period, ordered by period.
    pub totals: Vec<PeriodTotal>,
    /// Every recorded stoppage.
    pub pauses: PauseRecorder,
}

impl PeriodAnalysis {
    /// Effective seconds summed over all periods.
    pub fn effective_seconds(&self) -> u64 {
        self.totals.iter().map(|total| total.seconds).sum()
    }
}

/// Runs one event stream through a fresh machine and closes it.
pub fn analyze_events<X: TotalsExporter>(
    events: impl IntoIterator<Item = MatchEvent>,
    config: &MachineConfig,
    exporter: X,
) -> Result<PeriodAnalysis, MachineError> {
    let mut machine = PlayStateMachine::new(
        config.clone(),
        EffectiveTimeAccumulator::with_exporter(exporter),
        PauseRecorder::new(),
    );
    for event in events {
        machine.process(event)?;
    }
    machine.close()?;

    let (effective, pauses) = machine.into_sinks();
    Ok(PeriodAnalysis {
        totals: effective.totals(),
        pauses,
    })
}

/// Facade over an event source.
#[derive(Debug)]
pub struct MatchAnalytics<S> {
    source: S,
    config: MachineConfig,
}

impl<S: EventSource> MatchAnalytics<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            config: MachineConfig::default(),
        }
    }

    /// Uses the given configuration for every machine this facade builds.
    #[must_use]
    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Effective time and stoppages for one period.
    pub fn effective_time(
        &self,
        match_id: &MatchId,
        period: Period,
    ) -> Result<PeriodAnalysis, AnalyticsError> {
        self.effective_time_with(match_id, period, NoExport)
    }

    /// Like [`effective_time`](Self::effective_time), exporting the totals on close.
    pub fn effective_time_with<X: TotalsExporter>(
        &self,
        match_id: &MatchId,
        period: Period,
        exporter: X,
    ) -> Result<PeriodAnalysis, AnalyticsError> {
        let events = self.load(match_id, |source| source.period_events(match_id, period))?;
        tracing::debug!(%match_id, %period, event_count = events.len(), "analyzing period");
        Ok(analyze_events(events, &self.config, exporter)?)
    }

    /// Effective time and stoppages for every period of a match.
    pub fn match_effective_time(&self, match_id: &MatchId) -> Result<PeriodAnalysis, AnalyticsError> {
        self.match_effective_time_with(match_id, NoExport)
    }

    pub fn match_effective_time_with<X: TotalsExporter>(
        &self,
        match_id: &MatchId,
        exporter: X,
    ) -> Result<PeriodAnalysis, AnalyticsError> {
        let events = self.load(match_id, |source| source.match_events(match_id))?;
        tracing::debug!(%match_id, event_count = events.len(), "analyzing match");
        Ok(analyze_events(events, &self.config, exporter)?)
    }

    /// Analyzes several matches, one machine per match, in parallel.
    ///
    /// Events are loaded sequentially. A load or machine failure is reported
    /// against its own match only.
    pub fn effective_time_for_matches(
        &self,
        match_ids: &[MatchId],
    ) -> Vec<(MatchId, Result<PeriodAnalysis, AnalyticsError>)> {
        let streams = match_ids
            .iter()
            .map(|match_id| self.load(match_id, |source| source.match_events(match_id)))
            .collect();
        let results = analyze_streams(streams, &self.config);
        match_ids.iter().cloned().zip(results).collect()
    }

    /// Elapsed seconds at which each period ended.
    pub fn match_length(&self, match_id: &MatchId) -> Result<Vec<(Period, u32)>, AnalyticsError> {
        let events = self.load(match_id, |source| source.match_events(match_id))?;
        Ok(events
            .iter()
            .filter(|e| e.action == ActionType::EndPeriod)
            .map(MatchEvent::position)
            .collect())
    }

    /// Sorted times of unsuccessful fouls in a period.
    pub fn foul_times(&self, match_id: &MatchId, period: Period) -> Result<Vec<u32>, AnalyticsError> {
        let events = self.load(match_id, |source| source.period_events(match_id, period))?;
        let mut times: Vec<u32> = events
            .iter()
            .filter(|e| e.action == ActionType::Foul && !e.successful)
            .map(|e| e.seconds)
            .collect();
        times.sort_unstable();
        Ok(times)
    }

    /// Sorted, distinct times of stoppage actions in a period.
    pub fn stoppage_times(
        &self,
        match_id: &MatchId,
        period: Period,
    ) -> Result<Vec<u32>, AnalyticsError> {
        let events = self.load(match_id, |source| source.period_events(match_id, period))?;
        let mut times: Vec<u32> = events
            .iter()
            .filter(|e| STOPPAGE_ACTIONS.contains(&e.action))
            .map(|e| e.seconds)
            .collect();
        times.sort_unstable();
        times.dedup();
        Ok(times)
    }

    pub fn mean_time_between_fouls(
        &self,
        match_id: &MatchId,
        period: Period,
    ) -> Result<Option<f64>, AnalyticsError> {
        Ok(mean_gap(&self.foul_times(match_id, period)?))
    }

    pub fn mean_time_between_stoppages(
        &self,
        match_id: &MatchId,
        period: Period,
    ) -> Result<Option<f64>, AnalyticsError> {
        Ok(mean_gap(&self.stoppage_times(match_id, period)?))
    }

    fn load<F>(&self, match_id: &MatchId, query: F) -> Result<Vec<MatchEvent>, AnalyticsError>
    where
        F: FnOnce(&S) -> Result<Vec<MatchEvent>, S::Error>,
    {
        query(&self.source).map_err(|err| AnalyticsError::Source {
            match_id: match_id.clone(),
            source: Box::new(err),
        })
    }
}
