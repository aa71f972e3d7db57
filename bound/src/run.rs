//! Bound runner: drives one data process under one boundary.
//!
//! A run instantiates the data process (with the call arguments) and the
//! predicate, primes the predicate and delivers the arguments, then pulls
//! values until the predicate says stop or the process ends. Both the data
//! process and the predicate are closed on every exit path: normal end, an
//! error from either side, or the run being dropped half-way.

use tracing::{debug, trace, warn};

use crate::core::args::CallArgs;
use crate::core::boundary::{Boundary, Process};
use crate::core::handshake::Handshake;
use crate::core::process::BoxProcess;
use crate::error::BoundError;

/// Reason why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The initial stop-signal was `true`; nothing was produced.
    Initial,
    /// The predicate said stop after a value.
    Signal,
    /// The data process ended on its own.
    Exhausted,
    /// The data process failed and the predicate absorbed the error.
    ErrorAbsorbed,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome<T> {
    pub values: Vec<T>,
    pub stop: StopReason,
}

impl<T> RunOutcome<T> {
    pub fn last(&self) -> Option<&T> {
        self.values.last()
    }
}

/// A boundary bound to a data process. Every call performs an independent
/// run with its own data process and predicate.
pub struct Bounded<T> {
    process: Process<T>,
    boundary: Boundary<T>,
}

impl<T> Boundary<T> {
    pub fn bind(&self, process: Process<T>) -> Bounded<T> {
        Bounded {
            process,
            boundary: self.clone(),
        }
    }
}

impl<T> Bounded<T> {
    pub fn boundary(&self) -> &Boundary<T> {
        &self.boundary
    }

    /// Start a run. Values are produced lazily by iterating the result.
    pub fn run(&self, args: &CallArgs) -> Result<BoundedRun<T>, BoundError> {
        debug!(boundary = %self.boundary.name(), "starting bounded run");
        let process = self.process.instantiate(args)?;
        let predicate = match self.boundary.instantiate() {
            Ok(predicate) => predicate,
            Err(err) => {
                let mut process = process;
                process.close();
                return Err(err);
            }
        };
        BoundedRun::start(
            process,
            Handshake::new(self.boundary.name(), predicate),
            args,
        )
    }

    /// Run to completion and return the last value, if any.
    pub fn call(&self, args: &CallArgs) -> Result<Option<T>, BoundError> {
        let mut last = None;
        for value in self.run(args)? {
            last = Some(value?);
        }
        Ok(last)
    }

    /// Run to completion and return every value produced.
    pub fn generate(&self, args: &CallArgs) -> Result<Vec<T>, BoundError> {
        self.run(args)?.collect()
    }

    /// Run to completion and report why the run stopped.
    pub fn outcome(&self, args: &CallArgs) -> Result<RunOutcome<T>, BoundError> {
        let mut run = self.run(args)?;
        let mut values = Vec::new();
        for value in run.by_ref() {
            values.push(value?);
        }
        let stop = run.stop_reason().ok_or_else(|| {
            BoundError::usage("bounded run ended without a stop reason")
        })?;
        Ok(RunOutcome { values, stop })
    }
}

/// One bounded run in progress. Iterating yields the produced values; an
/// `Err` item ends the iteration.
pub struct BoundedRun<T> {
    process: Option<BoxProcess<T>>,
    predicate: Handshake<T>,
    produced: usize,
    stop: Option<StopReason>,
    closed: bool,
}

impl<T> BoundedRun<T> {
    fn start(
        process: BoxProcess<T>,
        predicate: Handshake<T>,
        args: &CallArgs,
    ) -> Result<Self, BoundError> {
        let mut run = Self {
            process: Some(process),
            predicate,
            produced: 0,
            stop: None,
            closed: false,
        };
        let initial = run
            .predicate
            .prime()
            .and_then(|()| run.predicate.deliver_args(args));
        match initial {
            Ok(true) => {
                debug!(predicate = %run.predicate.name(), "initial stop-signal, nothing to produce");
                run.stop = Some(StopReason::Initial);
                run.close()?;
            }
            Ok(false) => {}
            Err(err) => return Err(run.fail(err)),
        }
        Ok(run)
    }

    pub fn produced(&self) -> usize {
        self.produced
    }

    /// Why the run stopped; `None` while it is still going or after it
    /// failed.
    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stop
    }

    /// Close everything now and report a failed close.
    pub fn finish(mut self) -> Result<Option<StopReason>, BoundError> {
        self.close()?;
        Ok(self.stop)
    }

    fn advance(&mut self) -> Result<Option<T>, BoundError> {
        if self.stop.is_some() {
            return Ok(None);
        }
        let Some(process) = self.process.as_mut() else {
            return Ok(None);
        };
        match process.resume() {
            Ok(Some(value)) => {
                self.produced += 1;
                if self.predicate.observe(&value)? {
                    self.stop = Some(StopReason::Signal);
                }
                trace!(produced = self.produced, "value produced");
                Ok(Some(value))
            }
            Ok(None) => {
                self.stop = Some(StopReason::Exhausted);
                Ok(None)
            }
            Err(err) => match self.predicate.absorb(&err) {
                Ok(true) => {
                    debug!(error = %err, "data process error absorbed by predicate");
                    self.stop = Some(StopReason::ErrorAbsorbed);
                    Ok(None)
                }
                Ok(false) => Err(BoundError::Process(err)),
                // The data process error wins over the predicate's.
                Err(secondary) => {
                    warn!(error = %secondary, "predicate failed while offered a data process error");
                    Err(BoundError::Process(err))
                }
            },
        }
    }

    /// Close the data process, then the predicate. Runs at most once.
    fn close(&mut self) -> Result<(), BoundError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if let Some(mut process) = self.process.take() {
            process.close();
        }
        if let Some(stop) = self.stop {
            debug!(?stop, produced = self.produced, "bounded run stopped");
        }
        self.predicate.close()
    }

    /// Clean up after `err`; a close failure is logged, `err` wins.
    fn fail(&mut self, err: BoundError) -> BoundError {
        self.stop = None;
        if let Err(close_err) = self.close() {
            warn!(error = %close_err, "close failed while unwinding a failed run");
        }
        err
    }
}

impl<T> Iterator for BoundedRun<T> {
    type Item = Result<T, BoundError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.closed {
            return None;
        }
        match self.advance() {
            Ok(Some(value)) => Some(Ok(value)),
            Ok(None) => self.close().err().map(Err),
            Err(err) => Some(Err(self.fail(err))),
        }
    }
}

impl<T> Drop for BoundedRun<T> {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            warn!(error = %err, "close failed while dropping a bounded run");
        }
    }
}
