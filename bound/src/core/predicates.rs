//! Reference predicates.
//!
//! Each constructor takes the predicate's configuration and returns a
//! [`Boundary`] that builds a fresh predicate for every run. Once a
//! reference predicate decides to stop it keeps answering `Stop`, so it stays
//! well-behaved inside an `all_of` that outlives it.

use std::fmt::Debug;
use std::marker::PhantomData;
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::Result;

use crate::core::boundary::Boundary;
use crate::core::predicate::{Input, Predicate, Step};

/// Stops once `limit` values have been produced.
pub struct Times {
    limit: usize,
    seen: usize,
}

impl<T> Predicate<T> for Times {
    fn resume(&mut self, input: Input<'_, T>) -> Result<Step> {
        Ok(match input {
            Input::Prime | Input::Error(_) => Step::Continue,
            Input::Args(_) => Step::from(self.limit == 0),
            Input::Value(_) => {
                self.seen = self.seen.saturating_add(1);
                Step::from(self.seen >= self.limit)
            }
        })
    }
}

pub fn times<T: 'static>(limit: usize) -> Boundary<T> {
    Boundary::new(format!("times({limit})"), move || Times { limit, seen: 0 })
}

/// Stops once the wall-clock time since priming exceeds `budget`.
///
/// The initial signal only stops for a zero budget: any positive budget lets
/// at least one cycle start, however long that cycle takes.
pub struct Timed {
    budget: Duration,
    started: Option<Instant>,
}

impl Timed {
    fn exhausted(&self) -> bool {
        if self.budget.is_zero() {
            return true;
        }
        self.started
            .is_some_and(|started| started.elapsed() > self.budget)
    }
}

impl<T> Predicate<T> for Timed {
    fn resume(&mut self, input: Input<'_, T>) -> Result<Step> {
        Ok(match input {
            Input::Prime => {
                self.started = Some(Instant::now());
                Step::Continue
            }
            Input::Args(_) => Step::from(self.budget.is_zero()),
            Input::Value(_) => Step::from(self.exhausted()),
            Input::Error(_) => Step::Continue,
        })
    }
}

pub fn timed<T: 'static>(budget: Duration) -> Boundary<T> {
    Boundary::new(format!("timed({budget:?})"), move || Timed {
        budget,
        started: None,
    })
}

/// Numbers a running total can be kept in.
///
/// Integer sums saturate instead of overflowing: a saturated total is at
/// least as large as any threshold of the same type.
pub trait Accumulate: Copy + Default + PartialOrd {
    fn accumulate(self, rhs: Self) -> Self;
}

macro_rules! saturating_accumulate {
    ($($ty:ty),*) => {
        $(impl Accumulate for $ty {
            fn accumulate(self, rhs: Self) -> Self {
                self.saturating_add(rhs)
            }
        })*
    };
}

saturating_accumulate!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl Accumulate for f32 {
    fn accumulate(self, rhs: Self) -> Self {
        self + rhs
    }
}

impl Accumulate for f64 {
    fn accumulate(self, rhs: Self) -> Self {
        self + rhs
    }
}

/// Stops once the running sum of `extract(value)` reaches `threshold`.
///
/// The total is frozen once reached; later values are not summed.
pub struct Accumulated<T, N, F> {
    threshold: N,
    total: N,
    reached: bool,
    extract: F,
    _value: PhantomData<fn(&T)>,
}

impl<T, N, F> Predicate<T> for Accumulated<T, N, F>
where
    N: Accumulate,
    F: Fn(&T) -> N,
{
    fn resume(&mut self, input: Input<'_, T>) -> Result<Step> {
        Ok(match input {
            Input::Prime | Input::Error(_) => Step::Continue,
            Input::Args(_) => {
                self.reached = self.threshold <= N::default();
                Step::from(self.reached)
            }
            Input::Value(_) if self.reached => Step::Stop,
            Input::Value(value) => {
                self.total = self.total.accumulate((self.extract)(value));
                self.reached = self.total >= self.threshold;
                Step::from(self.reached)
            }
        })
    }
}

pub fn accumulated<T>(threshold: T) -> Boundary<T>
where
    T: Accumulate + Debug + 'static,
{
    accumulated_with(threshold, |value: &T| *value)
}

/// Accumulate a numeric projection of each value instead of the value itself.
pub fn accumulated_with<T, N, F>(threshold: N, extract: F) -> Boundary<T>
where
    T: 'static,
    N: Accumulate + Debug + 'static,
    F: Fn(&T) -> N + 'static,
{
    let extract = Rc::new(extract);
    Boundary::new(format!("accumulated({threshold:?})"), move || {
        let extract = Rc::clone(&extract);
        Accumulated {
            threshold,
            total: N::default(),
            reached: false,
            extract: move |value: &T| extract(value),
            _value: PhantomData,
        }
    })
}

/// Stops at the first value for which `test` holds.
pub struct When<F> {
    test: F,
}

impl<T, F> Predicate<T> for When<F>
where
    F: Fn(&T) -> bool,
{
    fn resume(&mut self, input: Input<'_, T>) -> Result<Step> {
        Ok(match input {
            Input::Prime | Input::Args(_) | Input::Error(_) => Step::Continue,
            Input::Value(value) => Step::from((self.test)(value)),
        })
    }
}

pub fn when<T, F>(name: impl Into<String>, test: F) -> Boundary<T>
where
    T: 'static,
    F: Fn(&T) -> bool + 'static,
{
    let test = Rc::new(test);
    Boundary::new(name, move || {
        let test = Rc::clone(&test);
        When {
            test: move |value: &T| test(value),
        }
    })
}

/// Absorbs data-process errors accepted by `matches`, ending the run
/// gracefully with the values produced so far.
pub struct UntilErrors<F> {
    matches: F,
}

impl<T, F> Predicate<T> for UntilErrors<F>
where
    F: Fn(&anyhow::Error) -> bool,
{
    fn resume(&mut self, input: Input<'_, T>) -> Result<Step> {
        Ok(match input {
            Input::Prime | Input::Args(_) | Input::Value(_) => Step::Continue,
            Input::Error(err) => Step::from((self.matches)(err)),
        })
    }
}

pub fn until_errors<T, F>(name: impl Into<String>, matches: F) -> Boundary<T>
where
    T: 'static,
    F: Fn(&anyhow::Error) -> bool + 'static,
{
    let matches = Rc::new(matches);
    Boundary::new(name, move || {
        let matches = Rc::clone(&matches);
        UntilErrors {
            matches: move |err: &anyhow::Error| matches(err),
        }
    })
}

/// [`until_errors`] matching errors whose chain contains an `E`.
pub fn until_error<T, E>() -> Boundary<T>
where
    T: 'static,
    E: std::error::Error + Send + Sync + 'static,
{
    let name = format!("until_error({})", std::any::type_name::<E>());
    until_errors(name, |err: &anyhow::Error| {
        err.chain().any(|cause| cause.is::<E>())
    })
}
