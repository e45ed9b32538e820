//! Match events and the intervals bounded by them.

use serde::{Deserialize, Serialize};

use crate::action::ActionType;
use crate::types::{MatchId, Period, TeamId};

/// One observed moment in a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    /// The match this event belongs to.
    #[serde(rename = "match")]
    pub match_id: MatchId,
    /// Match period (1-based).
    pub period: Period,
    /// Elapsed seconds within the period.
    pub seconds: u32,
    /// What happened.
    pub action: ActionType,
    /// Team responsible, absent for period boundaries.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<TeamId>,
    /// Whether the action succeeded. Only meaningful for fouls, passes and the like.
    #[serde(default = "default_successful")]
    pub successful: bool,
}

const fn default_successful() -> bool {
    true
}

impl MatchEvent {
    /// Creates a successful event with no team attached.
    pub const fn new(match_id: MatchId, period: Period, seconds: u32, action: ActionType) -> Self {
        Self {
            match_id,
            period,
            seconds,
            action,
            team: None,
            successful: true,
        }
    }

    /// Attaches the team responsible for the action.
    #[must_use]
    pub fn with_team(mut self, team: TeamId) -> Self {
        self.team = Some(team);
        self
    }

    /// Marks the action as unsuccessful.
    #[must_use]
    pub const fn failed(mut self) -> Self {
        self.successful = false;
        self
    }

    /// Position of the event in match time, for ordering checks.
    pub const fn position(&self) -> (Period, u32) {
        (self.period, self.seconds)
    }
}

/// What an interval represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    /// Ball continuously in play.
    Effective,
    /// Play halted.
    Pause,
}

/// A span of match time bounded by two events.
///
/// Construction goes through [`Interval::new`], which refuses empty, inverted
/// and cross-period spans, so every `Interval` has `end.seconds > start.seconds`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interval {
    kind: IntervalKind,
    start: MatchEvent,
    end: MatchEvent,
}

impl Interval {
    /// Builds an interval, or `None` if the bounds do not describe a positive
    /// span inside a single period.
    pub fn new(kind: IntervalKind, start: MatchEvent, end: MatchEvent) -> Option<Self> {
        if start.period != end.period || end.seconds <= start.seconds {
            return None;
        }
        Some(Self { kind, start, end })
    }

    pub const fn kind(&self) -> IntervalKind {
        self.kind
    }

    /// The event that opened the interval.
    pub const fn start(&self) -> &MatchEvent {
        &self.start
    }

    /// The event that closed the interval.
    pub const fn end(&self) -> &MatchEvent {
        &self.end
    }

    pub const fn period(&self) -> Period {
        self.start.period
    }

    /// Length of the interval in seconds.
    pub const fn duration_secs(&self) -> u32 {
        self.end.seconds - self.start.seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(period: u8, seconds: u32, action: ActionType) -> MatchEvent {
        MatchEvent::new(
            MatchId::new("m1").unwrap(),
            Period::new(period).unwrap(),
            seconds,
            action,
        )
    }

    #[test]
    fn test_interval_requires_positive_span() {
        let start = event(1, 10, ActionType::Pass);
        assert!(Interval::new(IntervalKind::Effective, start.clone(), start.clone()).is_none());
        assert!(
            Interval::new(
                IntervalKind::Effective,
                start.clone(),
                event(1, 5, ActionType::Foul)
            )
            .is_none()
        );

        let interval =
            Interval::new(IntervalKind::Effective, start, event(1, 25, ActionType::Foul)).unwrap();
        assert_eq!(interval.duration_secs(), 15);
        assert_eq!(interval.period(), Period::FIRST);
    }

    #[test]
    fn test_interval_rejects_cross_period_span() {
        let interval = Interval::new(
            IntervalKind::Pause,
            event(1, 2700, ActionType::Foul),
            event(2, 2800, ActionType::FreeKick),
        );
        assert!(interval.is_none());
    }

    #[test]
    fn test_event_json_uses_defaults() {
        let json = r#"{"match":"m1","period":2,"seconds":65,"action":"Throw-In","team":"home"}"#;
        let parsed: MatchEvent = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.action, ActionType::ThrowIn);
        assert_eq!(parsed.period.value(), 2);
        assert_eq!(parsed.team.as_ref().map(TeamId::as_str), Some("home"));
        assert!(parsed.successful);
    }

    #[test]
    fn test_event_json_rejects_period_zero() {
        let json = r#"{"match":"m1","period":0,"seconds":0,"action":"start_period"}"#;
        let result: Result<MatchEvent, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
