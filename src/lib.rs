//! # `live_progress`
//!
//! Thread-safe progress bars and spinners, repainted in place on an ANSI terminal.
//!
//! Work is tracked in a shared [`Registry`]: any number of threads add tasks and
//! report progress into it without ever blocking on output. A [`LiveProgress`]
//! engine owns the terminal and redraws every task on a fixed interval, so
//! updates landing between two repaints are coalesced and only the latest value
//! is drawn.
//!
//! * **Concurrent**: the registry is cheap to clone ([`Arc`](std::sync::Arc)-based)
//!   and safe to share across threads.
//! * **Single Writer**: the output [`Sink`] is moved into the render thread while the
//!   display runs, so nothing else can interleave writes with a repaint.
//! * **Stable Layout**: tasks keep their line in registration order.
//!
//! ```
//! use std::time::Duration;
//! use live_progress::{BufferSink, LiveProgress};
//!
//! let mut live = LiveProgress::builder()
//!     .refresh_interval(Duration::from_millis(20))
//!     .build(BufferSink::new(80));
//! let registry = live.registry().clone();
//!
//! let id = registry.add_bar("compile", 3);
//! live.start()?;
//! for _ in 0..3 {
//!     registry.advance(id, 1);
//! }
//! registry.complete(id);
//! live.stop()?;
//!
//! assert!(live.sink().unwrap().contents().contains("100%"));
//! # Ok::<(), live_progress::LiveError>(())
//! ```
//!
//! ## Modules
//!
//! * [`registry`]: The shared, lock-protected set of tasks.
//! * [`live`]: The engine lifecycle and background repaint loop.
//! * [`bar`] / [`spinner`]: The two indicator kinds and how they render.
//! * [`columns`]: Composable column layouts (speed, ETA, ...) for bar tasks.
//! * [`tracker`]: Throughput and ETA estimation.
//! * [`sink`] / [`style`] / [`segment`]: Output destinations and styled text.
//! * [`io`] / [`iter`]: Wrappers that report progress automatically.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bar;
pub mod builder;
pub mod columns;
pub mod config;
pub mod error;
pub mod io;
pub mod iter;
pub mod live;
mod painter;
pub mod registry;
pub mod segment;
pub mod sink;
pub mod spinner;
pub mod style;
pub mod task;
pub mod tracker;

pub use bar::{Bar, format_percentage};
pub use builder::LiveBuilder;
pub use columns::{
    BarColumn, Column, Columns, DescriptionColumn, ElapsedColumn, EtaColumn, PercentageColumn,
    SpeedColumn, TransferSpeedColumn,
};
pub use config::LiveConfig;
pub use error::{LiveError, Result};
pub use io::{ProgressReader, ProgressWriter};
pub use iter::{ProgressIter, ProgressIteratorExt};
pub use live::LiveProgress;
pub use registry::{Registry, RegistrySnapshot};
pub use segment::{Segment, Segments};
pub use sink::{BufferSink, Sink, Stream, TermSink};
pub use spinner::Spinner;
pub use style::{Color, ColorMode, Style};
pub use task::{TaskId, TaskKind, TaskSnapshot};
pub use tracker::RateTracker;
