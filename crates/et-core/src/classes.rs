//! Action classification sets driving the play/stoppage state machine.

use std::collections::HashSet;

use crate::action::ActionType;

/// The role an action plays in the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionClass {
    /// Beginning of a period.
    Start,
    /// End of a period.
    End,
    /// Halts play, but is not a substitution.
    Stop,
    /// Halts play and re-anchors a pending pause.
    Substitution,
    /// Resumes play after a stoppage.
    Restart,
    /// Any other in-play action.
    Other,
}

/// Groupings of action kinds, fixed when a machine is built.
///
/// The substitution set is expected to be a subset of the stop set; an action
/// listed as a substitution but not as a stop is still treated as one.
#[derive(Debug, Clone)]
pub struct ActionClasses {
    start: HashSet<ActionType>,
    end: HashSet<ActionType>,
    stop: HashSet<ActionType>,
    restart: HashSet<ActionType>,
    substitution: HashSet<ActionType>,
}

impl Default for ActionClasses {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ActionClasses {
    /// Starts from the football defaults.
    pub fn builder() -> ActionClassesBuilder {
        ActionClassesBuilder::default()
    }

    /// Classifies an action. Period markers win over every other set.
    pub fn classify(&self, action: ActionType) -> ActionClass {
        if self.start.contains(&action) {
            ActionClass::Start
        } else if self.end.contains(&action) {
            ActionClass::End
        } else if self.substitution.contains(&action) {
            ActionClass::Substitution
        } else if self.stop.contains(&action) {
            ActionClass::Stop
        } else if self.restart.contains(&action) {
            ActionClass::Restart
        } else {
            ActionClass::Other
        }
    }
}

/// Builder for [`ActionClasses`].
#[derive(Debug, Clone)]
pub struct ActionClassesBuilder {
    classes: ActionClasses,
}

impl Default for ActionClassesBuilder {
    fn default() -> Self {
        Self {
            classes: ActionClasses {
                start: HashSet::from([ActionType::StartPeriod]),
                end: HashSet::from([ActionType::EndPeriod]),
                stop: HashSet::from([
                    ActionType::BallOut,
                    ActionType::Foul,
                    ActionType::Offside,
                    ActionType::Card,
                    ActionType::Goal,
                    ActionType::Substitution,
                    ActionType::Stopped,
                ]),
                restart: HashSet::from([
                    ActionType::ThrowIn,
                    ActionType::CornerKick,
                    ActionType::FreeKick,
                    ActionType::GoalKick,
                    ActionType::Pass,
                ]),
                substitution: HashSet::from([ActionType::Substitution]),
            },
        }
    }
}

impl ActionClassesBuilder {
    /// Replaces the stop set.
    #[must_use]
    pub fn stop(mut self, actions: impl IntoIterator<Item = ActionType>) -> Self {
        self.classes.stop = actions.into_iter().collect();
        self
    }

    /// Replaces the restart set.
    #[must_use]
    pub fn restart(mut self, actions: impl IntoIterator<Item = ActionType>) -> Self {
        self.classes.restart = actions.into_iter().collect();
        self
    }

    /// Replaces the substitution set.
    #[must_use]
    pub fn substitution(mut self, actions: impl IntoIterator<Item = ActionType>) -> Self {
        self.classes.substitution = actions.into_iter().collect();
        self
    }

    pub fn build(self) -> ActionClasses {
        self.classes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_sets_match_football_rules() {
        let classes = ActionClasses::default();

        assert_eq!(classes.classify(ActionType::StartPeriod), ActionClass::Start);
        assert_eq!(classes.classify(ActionType::EndPeriod), ActionClass::End);
        assert_eq!(classes.classify(ActionType::Foul), ActionClass::Stop);
        assert_eq!(classes.classify(ActionType::BallOut), ActionClass::Stop);
        assert_eq!(
            classes.classify(ActionType::Substitution),
            ActionClass::Substitution
        );
        assert_eq!(classes.classify(ActionType::ThrowIn), ActionClass::Restart);
        assert_eq!(classes.classify(ActionType::Pass), ActionClass::Restart);
        assert_eq!(classes.classify(ActionType::Shot), ActionClass::Other);
    }

    #[test]
    fn test_builder_replaces_sets() {
        let classes = ActionClasses::builder()
            .restart([ActionType::ThrowIn])
            .stop([ActionType::BallOut])
            .build();

        assert_eq!(classes.classify(ActionType::Pass), ActionClass::Other);
        assert_eq!(classes.classify(ActionType::Foul), ActionClass::Other);
        // Substitution keeps halting play even when absent from the stop set.
        assert_eq!(
            classes.classify(ActionType::Substitution),
            ActionClass::Substitution
        );
    }
}
