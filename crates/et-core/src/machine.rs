//! Play/stoppage state machine.
//!
//! Classifies one match's ordered event stream into effective play intervals
//! and stoppage intervals. Feeds that never record an explicit "ball out of
//! play" event are handled by closing the running interval at the last
//! in-play event whenever a restart shows up without a preceding stop.
//!
//! # States
//!
//! - `MatchStopped`: before the first period starts; only a START is accepted.
//! - `Playing`: ball in play since `start`.
//! - `Stopped`: a stop was seen; waiting for play to resume.
//! - `AwaitingRestartOfPeriod`: a period ended; waiting for the next START.
//!
//! Possession chains are not derived here. Every event carries its `team`,
//! so a possession tracker can sit beside this machine as another consumer of
//! the same stream.

use std::mem;

use thiserror::Error;

use crate::classes::{ActionClass, ActionClasses};
use crate::event::{Interval, IntervalKind, MatchEvent};
use crate::sink::{IntervalSink, SinkError};
use crate::types::Period;

/// Configuration for a state machine instance.
#[derive(Debug, Clone, Default)]
pub struct MachineConfig {
    /// Action groupings driving the transitions.
    pub classes: ActionClasses,

    /// Reject events that go back in match time instead of absorbing them.
    /// Default: false.
    pub strict_ordering: bool,
}

/// An event arrived earlier in match time than one already processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "event at period {} +{}s arrived after period {} +{}s",
    .received.0, .received.1, .previous.0, .previous.1
)]
pub struct SequenceError {
    /// Position of the last accepted event.
    pub previous: (Period, u32),
    /// Position of the rejected event.
    pub received: (Period, u32),
}

/// Errors returned by [`PlayStateMachine`].
#[derive(Debug, Error)]
pub enum MachineError {
    /// Out-of-order input in strict mode.
    #[error(transparent)]
    Sequence(#[from] SequenceError),
    /// `process` was called after `close`.
    #[error("state machine already closed")]
    Closed,
    /// A sink failed while finalizing.
    #[error(transparent)]
    Sink(#[from] SinkError),
}

/// Externally visible state of the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineState {
    MatchStopped,
    Playing,
    Stopped,
    AwaitingRestartOfPeriod,
    Closed,
}

#[derive(Debug, Clone)]
enum Mode {
    MatchStopped,
    Playing {
        /// Event that started the current run of play.
        start: MatchEvent,
        /// Most recent event seen while playing.
        previous: MatchEvent,
    },
    Stopped,
    AwaitingRestartOfPeriod,
    Closed,
}

/// Streaming classifier for one match.
///
/// Effective intervals go to `E`, pause intervals go to `P`. Both sinks are
/// called inline from [`process`](Self::process); nothing is buffered.
#[derive(Debug)]
pub struct PlayStateMachine<E, P> {
    config: MachineConfig,
    mode: Mode,
    pending_pause: Option<MatchEvent>,
    last_position: Option<(Period, u32)>,
    sinks_finished: bool,
    effective: E,
    pauses: P,
}

impl<E: IntervalSink, P: IntervalSink> PlayStateMachine<E, P> {
    pub const fn new(config: MachineConfig, effective: E, pauses: P) -> Self {
        Self {
            config,
            mode: Mode::MatchStopped,
            pending_pause: None,
            last_position: None,
            sinks_finished: false,
            effective,
            pauses,
        }
    }

    /// Feeds one event.
    ///
    /// Events must arrive in non-decreasing `(period, seconds)` order. In
    /// strict mode a violation is rejected and leaves the machine untouched;
    /// otherwise it is logged and processed anyway.
    pub fn process(&mut self, event: MatchEvent) -> Result<(), MachineError> {
        if matches!(self.mode, Mode::Closed) {
            return Err(MachineError::Closed);
        }
        self.check_order(&event)?;
        self.last_position = Some(event.position());

        let class = self.config.classes.classify(event.action);
        self.mode = match mem::replace(&mut self.mode, Mode::MatchStopped) {
            Mode::MatchStopped | Mode::AwaitingRestartOfPeriod if class == ActionClass::Start => {
                tracing::debug!(period = %event.period, seconds = event.seconds, "period started");
                Mode::Playing {
                    start: event.clone(),
                    previous: event,
                }
            }
            mode @ (Mode::MatchStopped | Mode::AwaitingRestartOfPeriod) => {
                tracing::trace!(action = %event.action, seconds = event.seconds, "discarding event outside play");
                mode
            }
            Mode::Playing { start, previous } => self.on_playing(start, previous, event, class),
            Mode::Stopped => self.on_stopped(event, class),
            Mode::Closed => Mode::Closed,
        };
        Ok(())
    }

    /// Ends the stream and finalizes both sinks.
    ///
    /// Play in progress and any pending pause are dropped rather than
    /// closed at the last event. If a sink fails to finish, the machine
    /// still stops accepting events and a later `close` retries the sinks.
    /// Once both have finished, `close` is a no-op.
    pub fn close(&mut self) -> Result<(), MachineError> {
        match mem::replace(&mut self.mode, Mode::Closed) {
            Mode::Playing { start, .. } => {
                tracing::debug!(
                    period = %start.period,
                    seconds = start.seconds,
                    "stream closed during play, dropping open interval"
                );
            }
            Mode::Closed if self.sinks_finished => return Ok(()),
            _ => {}
        }
        if let Some(pause_start) = self.pending_pause.take() {
            tracing::debug!(
                period = %pause_start.period,
                seconds = pause_start.seconds,
                "stream closed during stoppage, dropping pending pause"
            );
        }
        self.effective.finish()?;
        self.pauses.finish()?;
        self.sinks_finished = true;
        Ok(())
    }

    pub const fn state(&self) -> MachineState {
        match self.mode {
            Mode::MatchStopped => MachineState::MatchStopped,
            Mode::Playing { .. } => MachineState::Playing,
            Mode::Stopped => MachineState::Stopped,
            Mode::AwaitingRestartOfPeriod => MachineState::AwaitingRestartOfPeriod,
            Mode::Closed => MachineState::Closed,
        }
    }

    pub const fn effective_sink(&self) -> &E {
        &self.effective
    }

    pub const fn pause_sink(&self) -> &P {
        &self.pauses
    }

    /// Consumes the machine, returning `(effective, pauses)` sinks.
    pub fn into_sinks(self) -> (E, P) {
        (self.effective, self.pauses)
    }

    fn check_order(&self, event: &MatchEvent) -> Result<(), SequenceError> {
        let Some(previous) = self.last_position else {
            return Ok(());
        };
        let received = event.position();
        if received >= previous {
            return Ok(());
        }
        if self.config.strict_ordering {
            return Err(SequenceError { previous, received });
        }
        tracing::warn!(
            match_id = %event.match_id,
            previous_period = %previous.0,
            previous_seconds = previous.1,
            period = %received.0,
            seconds = received.1,
            "out-of-order event, intervals may be meaningless"
        );
        Ok(())
    }

    fn on_playing(
        &mut self,
        start: MatchEvent,
        previous: MatchEvent,
        event: MatchEvent,
        class: ActionClass,
    ) -> Mode {
        match class {
            // A restart without a recorded stop: the ball went out after
            // `previous`. Equal timestamps mean nothing elapsed, so this is
            // just another in-play event.
            ActionClass::Restart if start.seconds < previous.seconds => {
                self.emit(IntervalKind::Effective, start, previous);
                if let Some(pause_start) = self.pending_pause.take() {
                    self.emit(IntervalKind::Pause, pause_start, event.clone());
                }
                Mode::Playing {
                    start: event.clone(),
                    previous: event,
                }
            }
            ActionClass::Stop | ActionClass::Substitution => {
                self.emit(IntervalKind::Effective, start, event.clone());
                self.pending_pause = Some(event);
                Mode::Stopped
            }
            ActionClass::End => {
                self.emit(IntervalKind::Effective, start, event.clone());
                self.pending_pause = None;
                tracing::debug!(period = %event.period, seconds = event.seconds, "period ended");
                Mode::AwaitingRestartOfPeriod
            }
            ActionClass::Restart | ActionClass::Start | ActionClass::Other => Mode::Playing {
                start,
                previous: event,
            },
        }
    }

    fn on_stopped(&mut self, event: MatchEvent, class: ActionClass) -> Mode {
        match class {
            ActionClass::Substitution => {
                if self.pending_pause.is_some() {
                    self.pending_pause = Some(event);
                }
                Mode::Stopped
            }
            ActionClass::Stop => Mode::Stopped,
            ActionClass::End => {
                // Dead time between the stop and the end of the period is
                // neither play nor a recorded pause.
                self.pending_pause = None;
                tracing::debug!(period = %event.period, seconds = event.seconds, "period ended during stoppage");
                Mode::AwaitingRestartOfPeriod
            }
            ActionClass::Restart | ActionClass::Start | ActionClass::Other => {
                if let Some(pause_start) = self.pending_pause.take() {
                    self.emit(IntervalKind::Pause, pause_start, event.clone());
                }
                Mode::Playing {
                    start: event.clone(),
                    previous: event,
                }
            }
        }
    }

    fn emit(&mut self, kind: IntervalKind, start: MatchEvent, end: MatchEvent) {
        let (start_secs, end_secs) = (start.seconds, end.seconds);
        let Some(interval) = Interval::new(kind, start, end) else {
            tracing::debug!(
                ?kind,
                start = start_secs,
                end = end_secs,
                "skipping empty interval"
            );
            return;
        };
        tracing::trace!(
            ?kind,
            period = %interval.period(),
            start = start_secs,
            end = end_secs,
            "emitting interval"
        );
        match kind {
            IntervalKind::Effective => self.effective.accept(interval),
            IntervalKind::Pause => self.pauses.accept(interval),
        }
    }
}
