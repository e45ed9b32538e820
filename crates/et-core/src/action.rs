//! Action type enum as the single source of truth for action strings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of things that can happen at a match event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ActionType {
    StartPeriod,
    EndPeriod,
    Pass,
    Dribble,
    Cross,
    ThrowIn,
    BallOut,
    Shot,
    Goal,
    Penalty,
    Offside,
    Save,
    Foul,
    Card,
    Error,
    Challenge,
    Block,
    Tackle,
    Interception,
    Goalkeeper,
    Clearance,
    CornerKick,
    FreeKick,
    GoalKick,
    Substitution,
    Shootout,
    Stopped,
}

impl ActionType {
    /// Every action type, in declaration order.
    pub const ALL: [Self; 27] = [
        Self::StartPeriod,
        Self::EndPeriod,
        Self::Pass,
        Self::Dribble,
        Self::Cross,
        Self::ThrowIn,
        Self::BallOut,
        Self::Shot,
        Self::Goal,
        Self::Penalty,
        Self::Offside,
        Self::Save,
        Self::Foul,
        Self::Card,
        Self::Error,
        Self::Challenge,
        Self::Block,
        Self::Tackle,
        Self::Interception,
        Self::Goalkeeper,
        Self::Clearance,
        Self::CornerKick,
        Self::FreeKick,
        Self::GoalKick,
        Self::Substitution,
        Self::Shootout,
        Self::Stopped,
    ];

    /// Canonical string used for storage and JSON.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StartPeriod => "start_period",
            Self::EndPeriod => "end_period",
            Self::Pass => "pass",
            Self::Dribble => "dribble",
            Self::Cross => "cross",
            Self::ThrowIn => "throw_in",
            Self::BallOut => "ball_out",
            Self::Shot => "shot",
            Self::Goal => "goal",
            Self::Penalty => "penalty",
            Self::Offside => "offside",
            Self::Save => "save",
            Self::Foul => "foul",
            Self::Card => "card",
            Self::Error => "error",
            Self::Challenge => "challenge",
            Self::Block => "block",
            Self::Tackle => "tackle",
            Self::Interception => "interception",
            Self::Goalkeeper => "goalkeeper",
            Self::Clearance => "clearance",
            Self::CornerKick => "corner_kick",
            Self::FreeKick => "free_kick",
            Self::GoalKick => "goal_kick",
            Self::Substitution => "substitution",
            Self::Shootout => "shootout",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ActionType {
    type Err = UnknownActionType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(action) = Self::ALL.iter().find(|action| action.as_str() == s) {
            return Ok(*action);
        }
        // Supplier display names
        match s {
            "Start Period" => Ok(Self::StartPeriod),
            "End Period" => Ok(Self::EndPeriod),
            "Pass" | "ball_pass" => Ok(Self::Pass),
            "Throw-In" | "throwin" => Ok(Self::ThrowIn),
            "Out of Play" => Ok(Self::BallOut),
            "Goalkeeper Action" => Ok(Self::Goalkeeper),
            "Corner Kick" => Ok(Self::CornerKick),
            "Free Kick" => Ok(Self::FreeKick),
            "Goal Kick" => Ok(Self::GoalKick),
            "Shootout Penalty" => Ok(Self::Shootout),
            "Match Stoppage" => Ok(Self::Stopped),
            _ => Self::ALL
                .iter()
                .find(|action| action.as_str().eq_ignore_ascii_case(s))
                .copied()
                .ok_or_else(|| UnknownActionType(s.to_string())),
        }
    }
}

impl Serialize for ActionType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ActionType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unknown action strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action type: {0}")]
pub struct UnknownActionType(String);
