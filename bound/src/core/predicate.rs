//! The predicate contract: a resumable decision process driven through the
//! boundary handshake.
//!
//! A predicate is resumed at fixed suspension points, in this order:
//!
//! 1. [`Input::Prime`] once, for setup. Whatever it answers is discarded
//!    unless it is [`Step::Finished`].
//! 2. [`Input::Args`] once, with the call arguments. The answer is the
//!    initial stop-signal.
//! 3. [`Input::Value`] after every value the data process produces. The
//!    answer is the stop-signal for that cycle.
//!
//! [`Input::Error`] may replace step 3 when the data process fails; a
//! [`Step::Stop`] answer absorbs the error and ends the run gracefully.
//!
//! Answering [`Step::Finished`] at step 2 or 3 is a protocol violation. A
//! predicate that loops forever must therefore keep answering
//! [`Step::Continue`] or [`Step::Stop`] until it is closed.

use anyhow::Result;

use crate::core::args::CallArgs;

/// What the driver resumes a predicate with.
#[derive(Debug)]
pub enum Input<'a, T> {
    Prime,
    Args(&'a CallArgs),
    Value(&'a T),
    Error(&'a anyhow::Error),
}

/// What a predicate produces at its next suspension point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Stop-signal `false`.
    Continue,
    /// Stop-signal `true`.
    Stop,
    /// The predicate has no suspension points left.
    Finished,
}

impl Step {
    pub fn is_stop(self) -> bool {
        self == Self::Stop
    }
}

impl From<bool> for Step {
    fn from(stop: bool) -> Self {
        if stop { Self::Stop } else { Self::Continue }
    }
}

pub trait Predicate<T> {
    fn resume(&mut self, input: Input<'_, T>) -> Result<Step>;

    /// Cancellation signal, issued at most once per run to a predicate that
    /// has not finished on its own. Must stop the predicate; an error means
    /// it refused to.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T, P: Predicate<T> + ?Sized> Predicate<T> for Box<P> {
    fn resume(&mut self, input: Input<'_, T>) -> Result<Step> {
        (**self).resume(input)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// A predicate backed by a closure. `close` is a no-op.
pub struct FnPredicate<F> {
    f: F,
}

pub fn predicate_fn<T, F>(f: F) -> FnPredicate<F>
where
    F: FnMut(Input<'_, T>) -> Result<Step>,
{
    FnPredicate { f }
}

impl<T, F> Predicate<T> for FnPredicate<F>
where
    F: FnMut(Input<'_, T>) -> Result<Step>,
{
    fn resume(&mut self, input: Input<'_, T>) -> Result<Step> {
        (self.f)(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_maps_to_stop_signal() {
        assert_eq!(Step::from(true), Step::Stop);
        assert_eq!(Step::from(false), Step::Continue);
        assert!(Step::Stop.is_stop());
        assert!(!Step::Finished.is_stop());
    }

    fn drive(pred: &mut impl Predicate<u32>) {
        let args = CallArgs::new();
        pred.resume(Input::Prime).expect("prime");
        pred.resume(Input::Args(&args)).expect("args");
        pred.resume(Input::Value(&1)).expect("value");
        pred.resume(Input::Value(&2)).expect("value");
        pred.close().expect("close");
    }

    #[test]
    fn closure_predicate_sees_every_input() {
        let mut seen = Vec::new();
        let mut pred = predicate_fn(|input: Input<'_, u32>| {
            let step = match input {
                Input::Prime => Step::Continue,
                Input::Args(args) => Step::from(!args.is_empty()),
                Input::Value(v) => Step::from(*v >= 2),
                Input::Error(_) => Step::Finished,
            };
            seen.push(step);
            Ok(step)
        });

        drive(&mut pred);
        drop(pred);

        assert_eq!(
            seen,
            vec![Step::Continue, Step::Continue, Step::Continue, Step::Stop]
        );
    }
}
