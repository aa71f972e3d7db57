//! Test-only predicates and data processes that record how they were driven.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;

use crate::core::args::CallArgs;
use crate::core::boundary::{Boundary, Process};
use crate::core::predicate::{Input, Predicate, Step};
use crate::core::process::DataProcess;
use crate::sequences::{self, SequenceKind};

/// Shared record of what happened to a predicate or data process.
/// Clones observe the same counters.
#[derive(Debug, Clone, Default)]
pub struct Probe {
    closes: Rc<Cell<u32>>,
    resumes: Rc<Cell<u32>>,
    args: Rc<RefCell<Vec<CallArgs>>>,
}

impl Probe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn closes(&self) -> u32 {
        self.closes.get()
    }

    pub fn resumes(&self) -> u32 {
        self.resumes.get()
    }

    /// Call arguments delivered, one entry per run.
    pub fn args(&self) -> Vec<CallArgs> {
        self.args.borrow().clone()
    }

    fn record_close(&self) {
        self.closes.set(self.closes.get() + 1);
    }

    fn record_resume(&self) {
        self.resumes.set(self.resumes.get() + 1);
    }

    fn record_args(&self, args: &CallArgs) {
        self.args.borrow_mut().push(args.clone());
    }
}

/// Answers each resume (priming included) from `script`, then `tail`
/// forever.
pub struct ScriptedPredicate {
    script: Vec<Step>,
    tail: Step,
    probe: Probe,
}

impl ScriptedPredicate {
    pub fn new(script: impl IntoIterator<Item = Step>, tail: Step, probe: &Probe) -> Self {
        let mut script: Vec<Step> = script.into_iter().collect();
        script.reverse();
        Self {
            script,
            tail,
            probe: probe.clone(),
        }
    }
}

impl<T> Predicate<T> for ScriptedPredicate {
    fn resume(&mut self, input: Input<'_, T>) -> Result<Step> {
        self.probe.record_resume();
        if let Input::Args(args) = input {
            self.probe.record_args(args);
        }
        Ok(self.script.pop().unwrap_or(self.tail))
    }

    fn close(&mut self) -> Result<()> {
        self.probe.record_close();
        Ok(())
    }
}

/// A boundary building a fresh [`ScriptedPredicate`] for every run.
pub fn scripted<T: 'static>(
    name: &str,
    script: &[Step],
    tail: Step,
    probe: &Probe,
) -> Boundary<T> {
    let script = script.to_vec();
    let probe = probe.clone();
    Boundary::new(name, move || {
        ScriptedPredicate::new(script.iter().copied(), tail, &probe)
    })
}

/// A predicate that never stops and records closes.
pub fn forever<T: 'static>(probe: &Probe) -> Boundary<T> {
    scripted("forever", &[], Step::Continue, probe)
}

/// Lets the first value through, then keeps saying stop until closed.
pub fn bailout<T: 'static>(probe: &Probe) -> Boundary<T> {
    scripted("bailout", &[Step::Continue, Step::Continue], Step::Stop, probe)
}

/// Ends its process right after priming.
pub fn ends_after_prime<T: 'static>() -> Boundary<T> {
    scripted("ends_after_prime", &[Step::Continue], Step::Finished, &Probe::new())
}

/// Ends its process after the initial signal, before any cycle.
pub fn ends_after_args<T: 'static>() -> Boundary<T> {
    scripted(
        "ends_after_args",
        &[Step::Continue, Step::Continue],
        Step::Finished,
        &Probe::new(),
    )
}

/// 1, 2, 3, ... recording closes and the arguments it was built with.
pub struct Counting {
    next: u64,
    probe: Probe,
}

impl DataProcess for Counting {
    type Item = u64;

    fn resume(&mut self) -> Result<Option<u64>> {
        self.probe.record_resume();
        self.next += 1;
        Ok(Some(self.next))
    }

    fn close(&mut self) {
        self.probe.record_close();
    }
}

pub fn counting(probe: &Probe) -> Process<u64> {
    let probe = probe.clone();
    Process::factory(move |args: &CallArgs| {
        probe.record_args(args);
        Ok(Counting {
            next: 0,
            probe: probe.clone(),
        })
    })
}

pub fn fibonacci() -> Process<u64> {
    sequences::process(SequenceKind::Fibonacci)
}
