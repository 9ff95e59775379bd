//! Per-task state held by the registry.
//!
//! A [`Task`] pairs an [`Indicator`] with the [`RateTracker`] fed by its updates and
//! the lifetime flags the display needs. Tasks live only inside the
//! [`Registry`](crate::Registry); callers address them by [`TaskId`] and read them
//! back through [`TaskSnapshot`]s.

use std::{fmt, time::Duration};

use compact_str::CompactString;
use web_time::Instant;

use crate::{
    bar::Bar, columns::Columns, segment::Segments, spinner::Spinner, tracker::RateTracker,
};

/// Opaque handle to a registered task.
///
/// Ids are assigned in increasing order and never reused by the same registry, so
/// ordering by id is ordering by registration.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    /// The numeric value of the id.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which kind of indicator a task displays.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TaskKind {
    /// An animated spinner for work of unknown length.
    #[default]
    Spinner,
    /// A bar with a known total.
    Bar,
}

/// The visual model of a task.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Indicator {
    /// A determinate bar.
    Bar(Bar),
    /// An indeterminate spinner.
    Spinner(Spinner),
}

impl Indicator {
    /// The kind of this indicator.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        match self {
            Self::Bar(_) => TaskKind::Bar,
            Self::Spinner(_) => TaskKind::Spinner,
        }
    }

    /// The description shown with the indicator.
    #[must_use]
    pub fn description(&self) -> &str {
        match self {
            Self::Bar(bar) => bar.description(),
            Self::Spinner(spinner) => spinner.description(),
        }
    }

    /// Renders the indicator for a line `available` columns wide.
    #[must_use]
    pub fn render(&self, available: usize) -> Segments {
        match self {
            Self::Bar(bar) => bar.render(available),
            Self::Spinner(spinner) => spinner.render(available),
        }
    }
}

impl From<Bar> for Indicator {
    fn from(bar: Bar) -> Self {
        Self::Bar(bar)
    }
}

impl From<Spinner> for Indicator {
    fn from(spinner: Spinner) -> Self {
        Self::Spinner(spinner)
    }
}

/// A registered task.
#[derive(Clone, Debug)]
pub(crate) struct Task {
    pub(crate) id: TaskId,
    pub(crate) indicator: Indicator,
    pub(crate) tracker: RateTracker,
    pub(crate) columns: Option<Columns>,
    pub(crate) completed_at: Option<Instant>,
}

impl Task {
    pub(crate) fn new(id: TaskId, indicator: Indicator, columns: Option<Columns>) -> Self {
        Self {
            id,
            indicator,
            tracker: RateTracker::new(),
            columns,
            completed_at: None,
        }
    }

    pub(crate) const fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Marks the task complete, keeping the first completion time.
    ///
    /// The tracker's elapsed clock stops at the same instant, so columns and
    /// snapshots agree on how long the task took.
    pub(crate) fn complete(&mut self) {
        let at = *self.completed_at.get_or_insert_with(Instant::now);
        self.tracker.finish_at(at);
    }

    /// Renders one display line for this task.
    pub(crate) fn render(&self, available: usize) -> Segments {
        match (&self.indicator, &self.columns) {
            (Indicator::Bar(bar), Some(columns)) => columns.render(bar, &self.tracker),
            (indicator, _) => indicator.render(available),
        }
    }

    pub(crate) fn snapshot(&self, now: Instant) -> TaskSnapshot {
        let (current, total) = match &self.indicator {
            Indicator::Bar(bar) => (bar.current(), bar.total()),
            Indicator::Spinner(_) => (0, 0),
        };

        TaskSnapshot {
            id: self.id,
            kind: self.indicator.kind(),
            description: self.indicator.description().into(),
            current,
            total,
            completed: self.is_completed(),
            elapsed: self.tracker.elapsed_at(now),
            rate: self.tracker.rate_at(now),
            eta: self.tracker.eta_at(now, current, total),
        }
    }
}

/// A plain-data copy of a task's state at one instant.
///
/// Holds owned data, so it can be inspected without holding any lock.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TaskSnapshot {
    id: TaskId,
    kind: TaskKind,
    description: CompactString,
    current: u64,
    total: u64,
    completed: bool,
    elapsed: Duration,
    rate: f64,
    eta: Duration,
}

impl TaskSnapshot {
    /// The task's id.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// The kind of indicator.
    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// The description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The bar position; always 0 for spinners.
    #[must_use]
    pub const fn current(&self) -> u64 {
        self.current
    }

    /// The bar total; always 0 for spinners.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Whether the task was marked complete.
    #[must_use]
    pub const fn completed(&self) -> bool {
        self.completed
    }

    /// Time from registration to completion, or to the snapshot if still running.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Recent throughput in units per second.
    #[must_use]
    pub const fn rate(&self) -> f64 {
        self.rate
    }

    /// Estimated time remaining.
    #[must_use]
    pub const fn eta(&self) -> Duration {
        self.eta
    }

    /// Completion as a fraction; `0.0` for spinners and zero totals.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use web_time::Instant;

    use super::{Indicator, Task, TaskId, TaskKind};
    use crate::{
        bar::Bar,
        columns::{Columns, ElapsedColumn, PercentageColumn, format_duration},
        spinner::{LINE, Spinner},
        tracker::RateTracker,
    };

    /// Snapshot Contents
    #[allow(clippy::float_cmp)]
    #[test]
    fn test_snapshot() {
        let bar = Bar::new(200).with_description("copy");
        let mut task = Task::new(TaskId(3), bar.into(), None);
        if let Indicator::Bar(bar) = &mut task.indicator {
            bar.set_position(50);
        }

        let snap = task.snapshot(Instant::now());
        assert_eq!(snap.id(), TaskId(3));
        assert_eq!(snap.kind(), TaskKind::Bar);
        assert_eq!(snap.description(), "copy");
        assert_eq!((snap.current(), snap.total()), (50, 200));
        assert_eq!(snap.percentage(), 0.25);
        assert!(!snap.completed());
        assert_eq!(snap.rate(), 0.0);
    }

    /// Completion Freezes Elapsed
    /// Elapsed time stops at the first `complete`.
    #[test]
    fn test_complete_freezes_elapsed() {
        let mut task = Task::new(TaskId(1), Spinner::default().into(), None);
        task.complete();
        let first = task.completed_at;
        task.complete();
        assert_eq!(task.completed_at, first);

        let later = Instant::now() + Duration::from_secs(60);
        let snap = task.snapshot(later);
        assert!(snap.completed());
        assert!(snap.elapsed() < Duration::from_secs(60));
        assert_eq!(snap.kind(), TaskKind::Spinner);
    }

    /// Elapsed Column After Completion
    /// The elapsed column and the snapshot both stop at completion.
    #[test]
    fn test_elapsed_column_matches_snapshot() {
        let columns = Columns::new(vec![Box::new(ElapsedColumn::new())]);
        let mut task = Task::new(TaskId(1), Bar::new(10).into(), Some(columns));
        let origin = Instant::now()
            .checked_sub(Duration::from_secs(90))
            .unwrap();
        task.tracker = RateTracker::starting_at(origin);
        task.complete();

        let later = Instant::now() + Duration::from_secs(600);
        let snap = task.snapshot(later);
        assert_eq!(task.render(80).plain(), "1m 30s");
        assert_eq!(format_duration(snap.elapsed()), "1m 30s");
    }

    /// Render Dispatch
    /// Bars with columns use the column layout; everything else renders itself.
    #[test]
    fn test_render_dispatch() {
        let spinner = Task::new(
            TaskId(1),
            Spinner::new(LINE.iter().copied()).with_description("wait").into(),
            None,
        );
        assert_eq!(spinner.render(80).plain(), "- wait");

        let columns = Columns::new(vec![Box::new(PercentageColumn::new())]);
        let bar = Task::new(TaskId(2), Bar::new(4).into(), Some(columns));
        assert_eq!(bar.render(80).plain(), "0%");
    }

    /// Id Display
    #[test]
    fn test_task_id_display() {
        assert_eq!(TaskId(7).to_string(), "#7");
        assert_eq!(TaskId(7).get(), 7);
    }
}
