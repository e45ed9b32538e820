//! Core domain logic for effective playing time analytics.
//!
//! This crate contains the fundamental types and logic for:
//! - Match events and action classification
//! - The play/stoppage state machine splitting a stream into effective play
//!   and stoppage intervals
//! - Sinks accumulating effective time and recording pauses
//! - The analytics facade driving the machine from an event source

mod accumulator;
pub mod action;
pub mod analytics;
pub mod batch;
pub mod classes;
pub mod event;
pub mod machine;
pub mod pause;
pub mod sink;
pub mod stats;
pub mod types;

pub use accumulator::{
    CsvExporter, EffectiveTimeAccumulator, NoExport, PeriodTotal, TotalsExporter,
};
pub use action::{ActionType, UnknownActionType};
pub use analytics::{AnalyticsError, EventSource, MatchAnalytics, PeriodAnalysis, analyze_events};
pub use classes::{ActionClass, ActionClasses};
pub use event::{Interval, IntervalKind, MatchEvent};
pub use machine::{MachineConfig, MachineError, MachineState, PlayStateMachine, SequenceError};
pub use pause::{CauseSummary, PauseRecorder, StoppageSummary};
pub use sink::{Discard, IntervalSink, SinkError};
pub use types::{MatchId, Period, TeamId, ValidationError};
