//! Built-in unbounded data processes used by the CLI and the tests.

use std::thread;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::core::args::CallArgs;
use crate::core::boundary::Process;
use crate::core::process::DataProcess;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SequenceKind {
    /// 1, 1, 2, 3, 5, 8, ...
    Fibonacci,
    /// 0, 1, 2, 3, ...
    Naturals,
}

/// Fibonacci numbers, optionally sleeping before each one.
#[derive(Debug)]
pub struct Fibonacci {
    current: Option<u64>,
    following: Option<u64>,
    produced: usize,
    wait: Option<Duration>,
}

impl Fibonacci {
    pub fn new(wait: Option<Duration>) -> Self {
        Self {
            current: Some(1),
            following: Some(1),
            produced: 0,
            wait,
        }
    }
}

impl DataProcess for Fibonacci {
    type Item = u64;

    fn resume(&mut self) -> Result<Option<u64>> {
        if let Some(wait) = self.wait {
            thread::sleep(wait);
        }
        let value = self
            .current
            .ok_or_else(|| anyhow!("fibonacci overflowed u64 after {} terms", self.produced))?;
        self.current = self.following;
        self.following = self.following.and_then(|following| value.checked_add(following));
        self.produced += 1;
        Ok(Some(value))
    }
}

/// 0, 1, 2, ... optionally sleeping before each one.
#[derive(Debug)]
pub struct Naturals {
    next: u64,
    wait: Option<Duration>,
}

impl Naturals {
    pub fn new(wait: Option<Duration>) -> Self {
        Self { next: 0, wait }
    }
}

impl DataProcess for Naturals {
    type Item = u64;

    fn resume(&mut self) -> Result<Option<u64>> {
        if let Some(wait) = self.wait {
            thread::sleep(wait);
        }
        let value = self.next;
        self.next = value
            .checked_add(1)
            .ok_or_else(|| anyhow!("naturals overflowed u64"))?;
        Ok(Some(value))
    }
}

/// Read the optional `wait` call argument (seconds, non-negative number).
pub fn wait_arg(args: &CallArgs) -> Result<Option<Duration>> {
    let Some(value) = args.named("wait") else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let Some(secs) = value.as_f64() else {
        bail!("`wait` must be a number of seconds, got {value}");
    };
    let wait = Duration::try_from_secs_f64(secs)
        .map_err(|err| anyhow!("invalid `wait` of {secs} seconds: {err}"))?;
    Ok(Some(wait))
}

/// A process factory for `kind`; honours the `wait` call argument.
pub fn process(kind: SequenceKind) -> Process<u64> {
    match kind {
        SequenceKind::Fibonacci => {
            Process::factory(|args: &CallArgs| Ok(Fibonacci::new(wait_arg(args)?)))
        }
        SequenceKind::Naturals => {
            Process::factory(|args: &CallArgs| Ok(Naturals::new(wait_arg(args)?)))
        }
    }
}
