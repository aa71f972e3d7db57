//! Predicate and data-process sources: the factory-or-instance tagged unions
//! resolved once per run.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use anyhow::Result;

use crate::core::args::CallArgs;
use crate::core::predicate::Predicate;
use crate::core::process::{BoxProcess, DataProcess};
use crate::error::BoundError;

type PredicateFactory<T> = Rc<dyn Fn() -> Result<Box<dyn Predicate<T>>, BoundError>>;
type ProcessFactory<T> = Rc<dyn Fn(&CallArgs) -> Result<BoxProcess<T>>>;

enum Source<T> {
    Factory(PredicateFactory<T>),
    /// Single-use; shared by clones so reuse is detected across all of them.
    Instance(Rc<RefCell<Option<Box<dyn Predicate<T>>>>>),
}

impl<T> Clone for Source<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Factory(f) => Self::Factory(Rc::clone(f)),
            Self::Instance(slot) => Self::Instance(Rc::clone(slot)),
        }
    }
}

/// A reusable boundary: creates the predicate that decides when a bound run
/// stops.
pub struct Boundary<T> {
    name: String,
    receives_args: bool,
    source: Source<T>,
}

impl<T> Clone for Boundary<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            receives_args: self.receives_args,
            source: self.source.clone(),
        }
    }
}

impl<T> fmt::Debug for Boundary<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = match self.source {
            Source::Factory(_) => "factory",
            Source::Instance(_) => "instance",
        };
        f.debug_struct("Boundary")
            .field("name", &self.name)
            .field("receives_args", &self.receives_args)
            .field("source", &source)
            .finish()
    }
}

/// Turn a predicate factory into a boundary.
pub fn boundary<T, P, F>(name: impl Into<String>, factory: F) -> Boundary<T>
where
    T: 'static,
    P: Predicate<T> + 'static,
    F: Fn() -> P + 'static,
{
    Boundary::new(name, factory)
}

impl<T: 'static> Boundary<T> {
    pub fn new<P, F>(name: impl Into<String>, factory: F) -> Self
    where
        P: Predicate<T> + 'static,
        F: Fn() -> P + 'static,
    {
        Self::try_new(name, move || Ok(Box::new(factory()) as Box<dyn Predicate<T>>))
    }

    /// Like [`Boundary::new`] for factories that can refuse to build, e.g.
    /// a reference predicate missing its configuration.
    pub fn try_new<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Box<dyn Predicate<T>>, BoundError> + 'static,
    {
        Self {
            name: name.into(),
            receives_args: false,
            source: Source::Factory(Rc::new(factory)),
        }
    }

    /// Wrap an already-created predicate. It serves a single run.
    pub fn from_instance<P: Predicate<T> + 'static>(name: impl Into<String>, predicate: P) -> Self {
        let predicate: Box<dyn Predicate<T>> = Box::new(predicate);
        Self {
            name: name.into(),
            receives_args: false,
            source: Source::Instance(Rc::new(RefCell::new(Some(predicate)))),
        }
    }
}

impl<T> Boundary<T> {
    /// Mark the predicate as consuming the call arguments. Informational:
    /// arguments are delivered either way.
    pub fn receiving_args(mut self) -> Self {
        self.receives_args = true;
        self
    }

    pub fn receives_args(&self) -> bool {
        self.receives_args
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Produce the predicate for one run.
    pub fn instantiate(&self) -> Result<Box<dyn Predicate<T>>, BoundError> {
        match &self.source {
            Source::Factory(factory) => factory(),
            Source::Instance(slot) => slot.borrow_mut().take().ok_or_else(|| {
                BoundError::usage(format!(
                    "predicate instance `{}` was already used by an earlier run",
                    self.name
                ))
            }),
        }
    }
}

/// The data process a boundary is bound to.
pub enum Process<T> {
    /// Called with the call arguments at the start of every run.
    Factory(ProcessFactory<T>),
    /// Used as is, ignoring call arguments. Serves a single run.
    Instance(Rc<RefCell<Option<BoxProcess<T>>>>),
}

impl<T> Clone for Process<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Factory(f) => Self::Factory(Rc::clone(f)),
            Self::Instance(slot) => Self::Instance(Rc::clone(slot)),
        }
    }
}

impl<T: 'static> Process<T> {
    pub fn factory<P, F>(factory: F) -> Self
    where
        P: DataProcess<Item = T> + 'static,
        F: Fn(&CallArgs) -> Result<P> + 'static,
    {
        Self::Factory(Rc::new(move |args: &CallArgs| -> Result<BoxProcess<T>> {
            Ok(Box::new(factory(args)?))
        }))
    }

    pub fn instance<P: DataProcess<Item = T> + 'static>(process: P) -> Self {
        let process: BoxProcess<T> = Box::new(process);
        Self::Instance(Rc::new(RefCell::new(Some(process))))
    }
}

impl<T> Process<T> {
    /// Produce the data process for one run.
    pub fn instantiate(&self, args: &CallArgs) -> Result<BoxProcess<T>, BoundError> {
        match self {
            Self::Factory(factory) => factory(args).map_err(BoundError::Process),
            Self::Instance(slot) => slot.borrow_mut().take().ok_or_else(|| {
                BoundError::usage("data process instance was already used by an earlier run")
            }),
        }
    }
}
