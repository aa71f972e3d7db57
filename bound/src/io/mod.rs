//! I/O helpers for the `bound` binary.

pub mod config;
