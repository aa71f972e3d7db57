//! `all_of` / `any_of`: aggregate predicates combining their children's
//! stop-signals with AND / OR.
//!
//! Every step is forwarded to every child in the order given, without
//! short-circuiting, so each child sees the same values and the same call
//! arguments. Aggregates are predicates themselves and nest freely.

use anyhow::Result;

use crate::core::boundary::Boundary;
use crate::core::handshake::Handshake;
use crate::core::predicate::{Input, Predicate, Step};
use crate::error::BoundError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Stop once every child says stop.
    All,
    /// Stop as soon as any child says stop.
    Any,
}

impl Mode {
    fn combine(self, signals: &[bool]) -> bool {
        match self {
            Self::All => signals.iter().all(|stop| *stop),
            Self::Any => signals.iter().any(|stop| *stop),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::All => "all_of",
            Self::Any => "any_of",
        }
    }
}

pub struct Aggregate<T> {
    mode: Mode,
    children: Vec<Handshake<T>>,
}

impl<T> Aggregate<T> {
    pub fn new(mode: Mode, children: Vec<Handshake<T>>) -> Self {
        Self { mode, children }
    }

    fn collect(
        &mut self,
        mut step: impl FnMut(&mut Handshake<T>) -> Result<bool, BoundError>,
    ) -> Result<Step> {
        let mut signals = Vec::with_capacity(self.children.len());
        for child in &mut self.children {
            signals.push(step(child)?);
        }
        Ok(Step::from(self.mode.combine(&signals)))
    }
}

impl<T> Predicate<T> for Aggregate<T> {
    fn resume(&mut self, input: Input<'_, T>) -> Result<Step> {
        match input {
            Input::Prime => {
                for child in &mut self.children {
                    child.prime()?;
                }
                Ok(Step::Continue)
            }
            Input::Args(args) => self.collect(|child| child.deliver_args(args)),
            Input::Value(value) => self.collect(|child| child.observe(value)),
            // A child that already finished cannot absorb anything.
            Input::Error(err) => self.collect(|child| {
                if child.is_settled() {
                    Ok(false)
                } else {
                    child.absorb(err)
                }
            }),
        }
    }

    /// Close every child that has not settled, in order. All children are
    /// closed even if one fails; the first failure is reported.
    fn close(&mut self) -> Result<()> {
        let mut first_err = None;
        for child in &mut self.children {
            if let Err(err) = child.close() {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err.into()),
            None => Ok(()),
        }
    }
}

/// Stop only once every child has said stop.
pub fn all_of<T: 'static>(children: impl IntoIterator<Item = Boundary<T>>) -> Boundary<T> {
    aggregate(Mode::All, children.into_iter().collect())
}

/// Stop as soon as any child says stop.
pub fn any_of<T: 'static>(children: impl IntoIterator<Item = Boundary<T>>) -> Boundary<T> {
    aggregate(Mode::Any, children.into_iter().collect())
}

fn aggregate<T: 'static>(mode: Mode, children: Vec<Boundary<T>>) -> Boundary<T> {
    let names: Vec<&str> = children.iter().map(Boundary::name).collect();
    let name = format!("{}({})", mode.label(), names.join(", "));
    let label = name.clone();
    Boundary::try_new(name, move || {
        if children.is_empty() {
            return Err(BoundError::usage(format!(
                "{} needs at least one predicate",
                mode.label()
            )));
        }
        // Fail fast: no child is primed unless all of them could be built.
        let handshakes = children
            .iter()
            .map(|child| -> Result<Handshake<T>, BoundError> {
                Ok(Handshake::new(child.name(), child.instantiate()?))
            })
            .collect::<Result<Vec<_>, BoundError>>()
            .map_err(|err| match err {
                BoundError::Usage(msg) => BoundError::Usage(format!("{label}: {msg}")),
                other => other,
            })?;
        Ok(Box::new(Aggregate::new(mode, handshakes)) as Box<dyn Predicate<T>>)
    })
    .receiving_args()
}
