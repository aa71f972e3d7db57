//! The data-process contract: the resumable value producer being bounded.

use anyhow::Result;

pub trait DataProcess {
    type Item;

    /// Produce the next value, or `None` once the sequence has ended.
    fn resume(&mut self) -> Result<Option<Self::Item>>;

    /// Release resources early. The driver calls this exactly once per run,
    /// whether or not the process already ended.
    fn close(&mut self) {}
}

pub type BoxProcess<T> = Box<dyn DataProcess<Item = T>>;

impl<P: DataProcess + ?Sized> DataProcess for Box<P> {
    type Item = P::Item;

    fn resume(&mut self) -> Result<Option<Self::Item>> {
        (**self).resume()
    }

    fn close(&mut self) {
        (**self).close();
    }
}

/// Adapts an infallible iterator. Closing drops the iterator.
pub struct IterProcess<I> {
    iter: Option<I>,
}

pub fn from_iter<I: IntoIterator>(iter: I) -> IterProcess<I::IntoIter> {
    IterProcess {
        iter: Some(iter.into_iter()),
    }
}

impl<I: Iterator> DataProcess for IterProcess<I> {
    type Item = I::Item;

    fn resume(&mut self) -> Result<Option<I::Item>> {
        Ok(self.iter.as_mut().and_then(Iterator::next))
    }

    fn close(&mut self) {
        self.iter = None;
    }
}

/// Adapts a fallible producer closure.
pub struct FnProcess<F> {
    f: F,
    closed: bool,
}

pub fn from_fn<T, F>(f: F) -> FnProcess<F>
where
    F: FnMut() -> Result<Option<T>>,
{
    FnProcess { f, closed: false }
}

impl<T, F> DataProcess for FnProcess<F>
where
    F: FnMut() -> Result<Option<T>>,
{
    type Item = T;

    fn resume(&mut self) -> Result<Option<T>> {
        if self.closed {
            return Ok(None);
        }
        (self.f)()
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
