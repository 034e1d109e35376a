//! Generic state machine infrastructure.
//!
//! This module provides the output type and the trait that the channel state machine implements.

/// Output of a state machine after processing an event.
///
/// It contains:
/// - `duties`: Actions that need to be executed externally
/// - `signals`: Outcomes that need to be reported to whoever is waiting on the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SMOutput<D, S> {
    /// The duties that need to be performed by external executors.
    pub duties: Vec<D>,
    /// The signals that need to be delivered.
    pub signals: Vec<S>,
}

impl<D, S> Default for SMOutput<D, S> {
    fn default() -> Self {
        Self {
            duties: Vec::new(),
            signals: Vec::new(),
        }
    }
}

impl<D, S> SMOutput<D, S> {
    /// Creates a new empty output.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an output with only duties.
    pub const fn with_duties(duties: Vec<D>) -> Self {
        Self {
            duties,
            signals: Vec::new(),
        }
    }

    /// Creates an output with both duties and signals.
    pub const fn with_duties_and_signals(duties: Vec<D>, signals: Vec<S>) -> Self {
        Self { duties, signals }
    }

    /// Whether the output asks for nothing to be done.
    pub fn is_empty(&self) -> bool {
        self.duties.is_empty() && self.signals.is_empty()
    }
}

/// Trait for state machines driven by discrete events.
///
/// Each implementation specifies its own configuration, duty, signal, event and error types.
pub trait StateMachine {
    /// Configuration that stays the same across events.
    type Config;

    /// The type of duties this state machine can emit.
    type Duty;

    /// The type of signals this state machine can emit.
    type OutgoingSignal;

    /// The type of events this state machine can process.
    type Event;

    /// The error type returned when event processing fails.
    type Error;

    /// Processes an event and returns the output (duties and signals) or an error.
    ///
    /// This is the main entry point for advancing the state machine. The implementation
    /// should perform the appropriate state transition based on the current state and
    /// the incoming event, then return any duties to be executed and signals to be delivered.
    fn process_event(
        &mut self,
        cfg: Self::Config,
        event: Self::Event,
    ) -> Result<SMOutput<Self::Duty, Self::OutgoingSignal>, Self::Error>;
}
