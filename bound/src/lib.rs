//! Bounded iteration: stop consuming an unbounded sequence once a composable
//! set of predicates says so.
//!
//! - **[`core`]**: the protocol. Predicates are explicit state machines
//!   resumed through a fixed handshake (prime, argument delivery, one signal
//!   per produced value), composed with [`all_of`] / [`any_of`], and
//!   [`Boundary`] turns a predicate factory into something bindable.
//! - **[`run`]**: the driver. [`Bounded`] performs one independent run per
//!   call and always closes the data process and every live predicate.
//! - **[`io`]**: TOML configuration for the `bound` binary.
//!
//! ```
//! use bound::{CallArgs, accumulated, all_of, sequences, times};
//!
//! let fib = sequences::process(sequences::SequenceKind::Fibonacci);
//! let bounded = all_of([accumulated(500), times(20)]).bind(fib);
//! let last = bounded.call(&CallArgs::new()).unwrap();
//! assert_eq!(last, Some(6765));
//! ```

pub mod core;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod run;
pub mod sequences;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use crate::core::args::CallArgs;
pub use crate::core::boundary::{Boundary, Process, boundary};
pub use crate::core::combinators::{all_of, any_of};
pub use crate::core::predicate::{Input, Predicate, Step, predicate_fn};
pub use crate::core::predicates::{
    Accumulate, accumulated, accumulated_with, timed, times, until_error, until_errors, when,
};
pub use crate::core::process::{DataProcess, from_fn, from_iter};
pub use crate::error::{BoundError, Phase, ProtocolViolation};
pub use crate::run::{Bounded, BoundedRun, RunOutcome, StopReason};
