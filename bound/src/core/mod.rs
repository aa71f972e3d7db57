//! The bounded-iteration protocol itself.
//!
//! Core modules are free of I/O. Everything here is single-threaded: runs,
//! predicates and data processes are driven cooperatively on the caller's
//! thread and share nothing across runs.

pub mod args;
pub mod boundary;
pub mod combinators;
pub mod handshake;
pub mod predicate;
pub mod predicates;
pub mod process;
