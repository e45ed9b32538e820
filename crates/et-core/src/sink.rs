//! Interval sinks fed by the play/stoppage state machine.

use thiserror::Error;

use crate::event::Interval;

/// Errors raised while finalizing a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing exported totals failed.
    #[error("failed to write effective time: {0}")]
    Io(#[from] std::io::Error),
    /// A storage backend rejected the exported totals.
    #[error("failed to export effective time")]
    Export(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Receives intervals pushed by the state machine.
///
/// Sinks run inline: `accept` is called synchronously from
/// [`PlayStateMachine::process`](crate::PlayStateMachine::process) and must
/// not block. `finish` is called from
/// [`PlayStateMachine::close`](crate::PlayStateMachine::close); after a
/// failed close it may be called again, so it must tolerate repeat calls.
pub trait IntervalSink {
    /// Takes ownership of one emitted interval.
    fn accept(&mut self, interval: Interval);

    /// Signals the end of the stream. Results become final.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl IntervalSink for Vec<Interval> {
    fn accept(&mut self, interval: Interval) {
        self.push(interval);
    }
}

impl<S: IntervalSink + ?Sized> IntervalSink for &mut S {
    fn accept(&mut self, interval: Interval) {
        (**self).accept(interval);
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}

/// Sink that drops every interval.
#[derive(Debug, Clone, Copy, Default)]
pub struct Discard;

impl IntervalSink for Discard {
    fn accept(&mut self, _interval: Interval) {}
}
