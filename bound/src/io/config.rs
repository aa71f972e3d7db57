//! Declarative boundary configuration stored as TOML (`bound.toml`).
//!
//! ```toml
//! [sequence]
//! kind = "fibonacci"
//! wait_ms = 0
//!
//! [boundary]
//! kind = "all"
//!
//! [[boundary.children]]
//! kind = "accumulated"
//! threshold = 500
//!
//! [[boundary.children]]
//! kind = "times"
//! n = 20
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::boundary::Boundary;
use crate::core::combinators::{all_of, any_of};
use crate::core::predicates::{accumulated, timed, times};
use crate::error::BoundError;
use crate::sequences::SequenceKind;

/// A boundary described as data.
///
/// Parameters are optional on purpose: a reference predicate left without
/// its parameter still loads, and reports a usage error when a run tries to
/// instantiate it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundarySpec {
    Times {
        n: Option<i64>,
    },
    Timed {
        seconds: Option<f64>,
    },
    Accumulated {
        threshold: Option<u64>,
    },
    All {
        #[serde(default)]
        children: Vec<BoundarySpec>,
    },
    Any {
        #[serde(default)]
        children: Vec<BoundarySpec>,
    },
}

impl BoundarySpec {
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Timed {
                seconds: Some(seconds),
            } if !seconds.is_finite() => Err(anyhow!("timed.seconds must be finite")),
            Self::All { children } | Self::Any { children } => {
                if children.is_empty() {
                    return Err(anyhow!("all/any boundaries need at least one child"));
                }
                children.iter().try_for_each(BoundarySpec::validate)
            }
            _ => Ok(()),
        }
    }

    /// Build the boundary over unsigned integer sequences.
    pub fn to_boundary(&self) -> Boundary<u64> {
        match self {
            Self::Times { n: Some(n) } => times(usize::try_from(*n).unwrap_or(0)),
            Self::Timed { seconds: Some(seconds) } => timed(seconds_to_duration(*seconds)),
            Self::Accumulated {
                threshold: Some(threshold),
            } => accumulated(*threshold),
            Self::Times { n: None } => unconfigured("times", "n"),
            Self::Timed { seconds: None } => unconfigured("timed", "seconds"),
            Self::Accumulated { threshold: None } => unconfigured("accumulated", "threshold"),
            Self::All { children } => all_of(children.iter().map(BoundarySpec::to_boundary)),
            Self::Any { children } => any_of(children.iter().map(BoundarySpec::to_boundary)),
        }
    }
}

/// Non-positive durations mean "no time at all".
fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}

/// A boundary for a reference predicate used without its parameter.
fn unconfigured(kind: &'static str, param: &'static str) -> Boundary<u64> {
    Boundary::try_new(kind, move || {
        Err(BoundError::usage(format!(
            "`{kind}` must be configured with `{param}` before it can bound a run"
        )))
    })
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SequenceConfig {
    pub kind: SequenceKind,

    /// Sleep before producing each value, in milliseconds.
    pub wait_ms: u64,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            kind: SequenceKind::Fibonacci,
            wait_ms: 0,
        }
    }
}

/// Bound configuration (TOML). Missing fields default to a Fibonacci
/// sequence bounded by `times(10)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoundConfig {
    pub sequence: SequenceConfig,
    pub boundary: BoundarySpec,
}

impl Default for BoundConfig {
    fn default() -> Self {
        Self {
            sequence: SequenceConfig::default(),
            boundary: BoundarySpec::Times { n: Some(10) },
        }
    }
}

impl BoundConfig {
    pub fn validate(&self) -> Result<()> {
        self.boundary.validate()
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `BoundConfig::default()`.
pub fn load_config(path: &Path) -> Result<BoundConfig> {
    if !path.exists() {
        let cfg = BoundConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: BoundConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &BoundConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
