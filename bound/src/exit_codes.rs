//! Stable exit codes for the `bound` CLI.

/// The bounded run completed (including an empty run).
pub const OK: i32 = 0;
/// Invalid usage or config, or the data process failed.
pub const INVALID: i32 = 1;
/// A predicate violated the boundary handshake.
///
/// The `bound` binary only builds reference predicates, which never violate
/// it, so this code is reserved for tools that drive their own predicates
/// through the library and share these codes.
pub const PROTOCOL: i32 = 2;
