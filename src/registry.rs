//! The shared task registry.
//!
//! [`Registry`] is the single piece of state that producers and the render thread
//! share. Producers add tasks and push progress into it from any thread; the render
//! thread reads it once per tick.
//!
//! # Synchronization Strategy
//!
//! All tasks sit behind one coarse-grained [`RwLock`](parking_lot::RwLock).
//!
//! * **Producers:** Take the write lock briefly to mutate one task. No call waits
//!   for a repaint; updates landing between two ticks are coalesced and only the
//!   latest value is drawn.
//! * **Renderer:** Takes the write lock once per tick to advance spinners, then the
//!   read lock to turn every task into a line of text. Writing to the terminal
//!   happens after the lock is released.
//!
//! Tasks are keyed by monotonically increasing [`TaskId`]s in a `BTreeMap`, so
//! iteration order is registration order and every task keeps its line position
//! from one repaint to the next.

use std::{collections::BTreeMap, fmt, sync::Arc};

use compact_str::CompactString;
use parking_lot::RwLock;
use tracing::{debug, trace};
use web_time::Instant;

use crate::{
    bar::Bar,
    columns::Columns,
    spinner::Spinner,
    style::ColorMode,
    task::{Indicator, Task, TaskId, TaskSnapshot},
};

#[derive(Default)]
struct Inner {
    tasks: BTreeMap<TaskId, Task>,
    last_id: u64,
}

impl Inner {
    fn insert(&mut self, indicator: Indicator, columns: Option<Columns>) -> TaskId {
        self.last_id += 1;
        let id = TaskId(self.last_id);
        debug!(task = %id, kind = ?indicator.kind(), "task added");
        self.tasks.insert(id, Task::new(id, indicator, columns));
        id
    }

    /// Applies `write` to the bar of task `id` and records the resulting position.
    fn with_bar(&mut self, id: TaskId, write: impl FnOnce(&mut Bar) -> u64) {
        match self.tasks.get_mut(&id) {
            Some(Task {
                indicator: Indicator::Bar(bar),
                tracker,
                ..
            }) => {
                let position = write(bar);
                tracker.record(position);
            }
            Some(_) => trace!(task = %id, "progress update ignored for spinner"),
            None => trace!(task = %id, "progress update ignored for unknown task"),
        }
    }
}

/// A thread-safe, cheaply clonable registry of progress tasks.
///
/// Clones share the same tasks; hand one to every worker that reports progress.
/// Every operation is infallible: ids that are unknown (or were removed) and
/// updates aimed at a spinner are silently ignored.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<RwLock<Inner>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("count", &self.len())
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry.
    ///
    /// # Examples
    ///
    /// ```
    /// use live_progress::Registry;
    ///
    /// let registry = Registry::new();
    /// assert!(registry.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a bar counting up to `total` and returns its id.
    pub fn add_bar(&self, description: impl Into<CompactString>, total: u64) -> TaskId {
        self.add(Bar::new(total).with_description(description))
    }

    /// Registers a spinner with the default animation and returns its id.
    pub fn add_spinner(&self, description: impl Into<CompactString>) -> TaskId {
        self.add_spinner_with(Spinner::default().with_description(description))
    }

    /// Registers a preconfigured bar.
    pub fn add(&self, bar: Bar) -> TaskId {
        self.inner.write().insert(bar.into(), None)
    }

    /// Registers a preconfigured spinner.
    pub fn add_spinner_with(&self, spinner: Spinner) -> TaskId {
        self.inner.write().insert(spinner.into(), None)
    }

    /// Registers a bar drawn through a column layout instead of its own rendering.
    pub fn add_with_columns(&self, bar: Bar, columns: Columns) -> TaskId {
        self.inner.write().insert(bar.into(), Some(columns))
    }

    /// Sets a bar's absolute position, clamped into `0..=total`.
    pub fn update(&self, id: TaskId, value: i64) {
        self.inner
            .write()
            .with_bar(id, |bar| bar.set_position(value));
    }

    /// Moves a bar's position by `delta`, clamped into `0..=total`.
    pub fn advance(&self, id: TaskId, delta: i64) {
        self.inner.write().with_bar(id, |bar| bar.advance(delta));
    }

    /// Marks a task complete. It keeps rendering until removed or the display stops.
    pub fn complete(&self, id: TaskId) {
        if let Some(task) = self.inner.write().tasks.get_mut(&id) {
            task.complete();
        }
    }

    /// Removes a task; it is gone from the next repaint.
    pub fn remove(&self, id: TaskId) {
        if self.inner.write().tasks.remove(&id).is_some() {
            debug!(task = %id, "task removed");
        }
    }

    /// Removes every task. Ids are still never reused.
    pub fn clear(&self) {
        self.inner.write().tasks.clear();
    }

    /// Returns `true` if `id` is currently registered.
    #[must_use]
    pub fn contains(&self, id: TaskId) -> bool {
        self.inner.read().tasks.contains_key(&id)
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().tasks.len()
    }

    /// Returns `true` if no tasks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().tasks.is_empty()
    }

    /// Returns `true` if every registered task was marked complete (or there are none).
    #[must_use]
    pub fn is_all_complete(&self) -> bool {
        self.inner.read().tasks.values().all(Task::is_completed)
    }

    /// A snapshot of one task.
    #[must_use]
    pub fn get(&self, id: TaskId) -> Option<TaskSnapshot> {
        let now = Instant::now();
        self.inner.read().tasks.get(&id).map(|t| t.snapshot(now))
    }

    /// Snapshots of every task, in display order.
    #[must_use]
    pub fn snapshot(&self) -> RegistrySnapshot {
        let now = Instant::now();
        RegistrySnapshot(
            self.inner
                .read()
                .tasks
                .values()
                .map(|t| t.snapshot(now))
                .collect(),
        )
    }

    /// Moves every spinner that is not yet complete on by one frame.
    pub(crate) fn advance_spinners(&self) {
        for task in self.inner.write().tasks.values_mut() {
            if let (Indicator::Spinner(spinner), None) = (&mut task.indicator, task.completed_at) {
                spinner.next();
            }
        }
    }

    /// Renders every task to one escape-coded line, in display order.
    ///
    /// Each line is cut to `width` columns so it occupies exactly one terminal row.
    pub(crate) fn render_lines(&self, width: usize, mode: ColorMode) -> Vec<String> {
        self.inner
            .read()
            .tasks
            .values()
            .map(|t| {
                let mut line = t.render(width);
                line.truncate(width);
                line.to_escape(mode)
            })
            .collect()
    }
}

/// Snapshots of all tasks at one instant, in display order.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegistrySnapshot(pub Vec<TaskSnapshot>);

#[cfg(test)]
mod tests {
    use std::thread;

    use super::Registry;
    use crate::{
        bar::Bar,
        spinner::{LINE, Spinner},
        style::ColorMode,
        task::TaskKind,
    };

    /// Registration
    /// Ids are monotonic and never reused, even after removal.
    #[test]
    fn test_ids_monotonic() {
        let registry = Registry::new();
        let a = registry.add_bar("a", 10);
        let b = registry.add_spinner("b");
        registry.remove(b);
        let c = registry.add(Bar::new(5));

        assert!(a < b && b < c);
        assert_eq!(a.get(), 1);
        assert_eq!(registry.len(), 2);
        assert!(!registry.contains(b));
    }

    /// Update & Advance
    /// Values are clamped and fed to the task's tracker.
    #[test]
    fn test_update_and_advance() {
        let registry = Registry::new();
        let id = registry.add_bar("dl", 100);

        registry.update(id, 40);
        registry.advance(id, 30);
        assert_eq!(registry.get(id).unwrap().current(), 70);

        registry.update(id, 1_000);
        assert_eq!(registry.get(id).unwrap().current(), 100);

        registry.advance(id, -500);
        assert_eq!(registry.get(id).unwrap().current(), 0);

        let inner = registry.inner.read();
        assert_eq!(inner.tasks[&id].tracker.len(), 4);
    }

    /// Silent No-ops
    /// Updates to spinners and unknown ids are dropped without error.
    #[test]
    fn test_silent_noops() {
        let registry = Registry::new();
        let spin = registry.add_spinner("s");
        let gone = registry.add_bar("g", 10);
        registry.remove(gone);

        registry.update(spin, 5);
        registry.advance(spin, 5);
        registry.update(gone, 5);
        registry.complete(gone);
        registry.remove(gone);

        let snap = registry.get(spin).unwrap();
        assert_eq!(snap.kind(), TaskKind::Spinner);
        assert_eq!(snap.current(), 0);
        assert!(registry.get(gone).is_none());
        assert!(registry.inner.read().tasks[&spin].tracker.is_empty());
    }

    /// Completion
    /// Completed tasks stay registered and keep rendering.
    #[test]
    fn test_complete_keeps_task() {
        let registry = Registry::new();
        let id = registry.add_bar("x", 10);
        assert!(!registry.is_all_complete());

        registry.update(id, 10);
        registry.complete(id);

        assert!(registry.is_all_complete());
        assert!(registry.get(id).unwrap().completed());
        assert_eq!(registry.render_lines(40, ColorMode::None).len(), 1);
    }

    /// Display Order
    /// Lines come out in registration order regardless of id hashing.
    #[test]
    fn test_render_order() {
        let registry = Registry::new();
        for name in ["one", "two", "three", "four", "five"] {
            registry.add_spinner_with(Spinner::new(LINE.iter().copied()).with_description(name));
        }

        let lines = registry.render_lines(80, ColorMode::None);
        assert_eq!(lines, ["- one", "- two", "- three", "- four", "- five"]);

        let names: Vec<String> = registry
            .snapshot()
            .0
            .iter()
            .map(|s| s.description().to_owned())
            .collect();
        assert_eq!(names, ["one", "two", "three", "four", "five"]);
    }

    /// Spinner Advancement
    /// Only spinners that are still running move.
    #[test]
    fn test_advance_spinners() {
        let registry = Registry::new();
        let running = registry.add_spinner_with(Spinner::new(LINE.iter().copied()));
        let done = registry.add_spinner_with(Spinner::new(LINE.iter().copied()));
        registry.complete(done);

        registry.advance_spinners();
        assert_eq!(registry.render_lines(80, ColorMode::None), ["\\", "-"]);
        assert!(registry.contains(running));
    }

    /// Concurrent Producers
    /// Updates from many threads are linearized by the lock.
    #[test]
    fn test_concurrent_advance() {
        let registry = Registry::new();
        let id = registry.add_bar("shared", 10_000);

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        registry.advance(id, 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(registry.get(id).unwrap().current(), 1_000);
    }
}
