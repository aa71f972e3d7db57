//! Driver-side bookkeeping for one predicate instance.
//!
//! [`Handshake`] makes the protocol explicit: it only lets a predicate be
//! resumed in handshake order, turns a premature [`Step::Finished`] into a
//! [`ProtocolViolation`], and guarantees `close` reaches the predicate at most
//! once and never after it finished on its own.

use tracing::trace;

use crate::core::args::CallArgs;
use crate::core::predicate::{Input, Predicate, Step};
use crate::error::{BoundError, Phase, ProtocolViolation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeState {
    Fresh,
    Primed,
    Cycling,
    /// The predicate ended its own process.
    Done,
    Closed,
}

pub struct Handshake<T> {
    name: String,
    inner: Box<dyn Predicate<T>>,
    state: HandshakeState,
    cycles: usize,
}

impl<T> Handshake<T> {
    pub fn new(name: impl Into<String>, inner: Box<dyn Predicate<T>>) -> Self {
        Self {
            name: name.into(),
            inner,
            state: HandshakeState::Fresh,
            cycles: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> HandshakeState {
        self.state
    }

    /// True once the predicate finished on its own or was closed.
    pub fn is_settled(&self) -> bool {
        matches!(self.state, HandshakeState::Done | HandshakeState::Closed)
    }

    pub fn prime(&mut self) -> Result<(), BoundError> {
        self.expect(HandshakeState::Fresh, "prime")?;
        self.signal(Input::Prime, Phase::Prime)?;
        self.state = HandshakeState::Primed;
        Ok(())
    }

    /// Deliver the call arguments; returns the initial stop-signal.
    pub fn deliver_args(&mut self, args: &CallArgs) -> Result<bool, BoundError> {
        self.expect(HandshakeState::Primed, "deliver arguments to")?;
        let stop = self.signal(Input::Args(args), Phase::ArgsDelivery)?;
        self.state = HandshakeState::Cycling;
        Ok(stop)
    }

    /// Show a produced value; returns the stop-signal for this cycle.
    pub fn observe(&mut self, value: &T) -> Result<bool, BoundError> {
        self.expect(HandshakeState::Cycling, "resume")?;
        self.cycles += 1;
        let phase = Phase::Cycle(self.cycles);
        let stop = self.signal(Input::Value(value), phase)?;
        trace!(predicate = %self.name, cycle = self.cycles, stop, "cycle signal");
        Ok(stop)
    }

    /// Offer a data-process error; returns whether the predicate absorbs it.
    ///
    /// A predicate that finishes instead of answering simply does not absorb
    /// the error; that is not a protocol violation.
    pub fn absorb(&mut self, err: &anyhow::Error) -> Result<bool, BoundError> {
        self.expect(HandshakeState::Cycling, "offer an error to")?;
        match self
            .inner
            .resume(Input::Error(err))
            .map_err(BoundError::from_predicate)?
        {
            Step::Finished => {
                self.state = HandshakeState::Done;
                Ok(false)
            }
            step => Ok(step.is_stop()),
        }
    }

    /// Issue the cancellation signal unless the predicate already settled.
    pub fn close(&mut self) -> Result<(), BoundError> {
        if self.is_settled() {
            return Ok(());
        }
        self.state = HandshakeState::Closed;
        trace!(predicate = %self.name, "closing predicate");
        self.inner.close().map_err(BoundError::from_predicate)
    }

    fn signal(&mut self, input: Input<'_, T>, phase: Phase) -> Result<bool, BoundError> {
        match self
            .inner
            .resume(input)
            .map_err(BoundError::from_predicate)?
        {
            Step::Finished => {
                self.state = HandshakeState::Done;
                Err(ProtocolViolation {
                    predicate: self.name.clone(),
                    phase,
                }
                .into())
            }
            step => Ok(step.is_stop()),
        }
    }

    fn expect(&self, state: HandshakeState, action: &str) -> Result<(), BoundError> {
        if self.state == state {
            return Ok(());
        }
        Err(BoundError::usage(format!(
            "cannot {action} predicate `{}` while it is {:?}",
            self.name, self.state
        )))
    }
}
