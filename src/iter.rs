//! Iterator adapters for automatic progress tracking.
//!
//! The [`ProgressIteratorExt`] trait lets any [`Iterator`] register a task in a
//! [`Registry`] and advance it once per item, with a single method call.
//!
//! # Heuristics
//!
//! The adapters check [`Iterator::size_hint`]:
//! * If the iterator reports an exact length, a **Bar** is registered with that total.
//! * Otherwise a **Spinner** is registered.
//!
//! The task is marked complete when the iterator is exhausted.
//!
//! # Example
//!
//! ```
//! use live_progress::{ProgressIteratorExt as _, Registry};
//!
//! let registry = Registry::new();
//! let sum: i32 = vec![1, 2, 3].into_iter().progress_in(&registry, "summing").sum();
//!
//! assert_eq!(sum, 6);
//! assert!(registry.is_all_complete());
//! ```

use compact_str::CompactString;

use crate::{
    registry::Registry,
    task::{TaskId, TaskKind},
};

/// An iterator adapter that advances a task on every item.
#[derive(Debug)]
pub struct ProgressIter<I> {
    iter: I,
    registry: Registry,
    id: TaskId,
    finished: bool,
}

impl<I> ProgressIter<I> {
    /// Creates a new `ProgressIter` advancing an existing task.
    ///
    /// Note: This is usually constructed via [`ProgressIteratorExt`] methods.
    pub const fn new(iter: I, registry: Registry, id: TaskId) -> Self {
        Self {
            iter,
            registry,
            id,
            finished: false,
        }
    }

    /// The task being advanced.
    pub const fn task(&self) -> TaskId {
        self.id
    }
}

impl<I: Iterator> Iterator for ProgressIter<I> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.iter.next();

        if item.is_some() {
            self.registry.advance(self.id, 1);
        } else if !self.finished {
            self.finished = true;
            self.registry.complete(self.id);
        }

        item
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Extension trait to attach progress tracking to any Iterator.
pub trait ProgressIteratorExt: Iterator + Sized {
    /// Registers an unnamed task in `registry` and wraps the iterator.
    ///
    /// Chooses a Bar or a Spinner from `size_hint`.
    fn progress(self, registry: &Registry) -> ProgressIter<Self> {
        self.progress_in(registry, CompactString::default())
    }

    /// Registers a task named `description` in `registry` and wraps the iterator.
    fn progress_in(
        self,
        registry: &Registry,
        description: impl Into<CompactString>,
    ) -> ProgressIter<Self> {
        let id = match kind_from_size_hint(&self) {
            (TaskKind::Bar, total) => registry.add_bar(description, total),
            (TaskKind::Spinner, _) => registry.add_spinner(description),
        };
        ProgressIter::new(self, registry.clone(), id)
    }

    /// Wraps the iterator, advancing a task that is already registered.
    fn progress_with(self, registry: &Registry, id: TaskId) -> ProgressIter<Self> {
        ProgressIter::new(self, registry.clone(), id)
    }
}

impl<I: Iterator> ProgressIteratorExt for I {}

fn kind_from_size_hint<I: Iterator>(iter: &I) -> (TaskKind, u64) {
    match iter.size_hint() {
        (lower, Some(upper)) if lower == upper => (TaskKind::Bar, upper as u64),
        _ => (TaskKind::Spinner, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressIteratorExt as _;
    use crate::{registry::Registry, task::TaskKind};

    /// Iterator Integration
    /// Verifies the extension trait registers, advances and completes a bar.
    #[test]
    fn test_iterator_adapter() {
        let registry = Registry::new();
        let data = [1, 2, 3, 4, 5];
        let mut count = 0;

        let iter = data.iter().progress_in(&registry, "iter_test");
        let id = iter.task();
        for _ in iter {
            count += 1;
        }

        let snap = registry.get(id).unwrap();
        assert_eq!(count, 5);
        assert_eq!(snap.kind(), TaskKind::Bar);
        assert_eq!((snap.current(), snap.total()), (5, 5));
        assert_eq!(snap.description(), "iter_test");
        assert!(snap.completed(), "Iterator exhaustion should complete the task");
    }

    /// Unknown Length
    /// Iterators without an exact size get a spinner.
    #[test]
    fn test_unknown_length_spinner() {
        let registry = Registry::new();
        let evens = (0..10).filter(|n| n % 2 == 0).progress(&registry);
        let id = evens.task();

        assert_eq!(evens.count(), 5);
        let snap = registry.get(id).unwrap();
        assert_eq!(snap.kind(), TaskKind::Spinner);
        assert!(snap.completed());
    }

    /// Existing Task
    #[test]
    fn test_progress_with() {
        let registry = Registry::new();
        let id = registry.add_bar("batch", 10);

        let taken: Vec<_> = (0..3).progress_with(&registry, id).collect();
        assert_eq!(taken.len(), 3);
        assert_eq!(registry.get(id).unwrap().current(), 3);
    }
}
