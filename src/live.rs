//! The live display engine.
//!
//! [`LiveProgress`] ties a [`Registry`] to a [`Sink`]. While running, a background
//! thread owns the sink and repaints every task once per refresh interval; callers
//! keep updating the registry from any thread without ever waiting on a repaint.
//!
//! # Lifecycle
//!
//! * `Stopped`: the engine holds the sink. [`LiveProgress::sink`] gives read access.
//! * `Running`: the sink has been moved into the render thread. Nothing else can
//!   write to it until [`LiveProgress::stop`] joins the thread and takes it back.
//!
//! An engine can be started again after stopping; each run begins below whatever
//! the previous run left on screen.

use std::{
    thread::{self, JoinHandle},
    time::Duration,
};

use crossbeam_channel::{Receiver, SendError, Sender, bounded, select, tick};
use tracing::{debug, trace, warn};

use crate::{
    builder::LiveBuilder,
    config::LiveConfig,
    error::{LiveError, Result},
    painter::Painter,
    registry::Registry,
    sink::{Sink, TermSink},
};

struct RenderThread<S> {
    // Dropping the sender disconnects the channel, which ends the loop.
    stop: Sender<()>,
    handle: JoinHandle<Option<Painter<S>>>,
}

/// A set of progress tasks repainted in place on a terminal.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use live_progress::{BufferSink, LiveProgress};
///
/// let mut live = LiveProgress::builder()
///     .refresh_interval(Duration::from_millis(10))
///     .transient(true)
///     .build(BufferSink::new(80));
///
/// let registry = live.registry().clone();
/// let id = registry.add_bar("download", 100);
///
/// live.start()?;
/// registry.advance(id, 100);
/// registry.complete(id);
/// live.stop()?;
/// # Ok::<(), live_progress::LiveError>(())
/// ```
pub struct LiveProgress<S: Sink = TermSink> {
    registry: Registry,
    config: LiveConfig,
    painter: Option<Painter<S>>,
    thread: Option<RenderThread<S>>,
}

impl LiveProgress<TermSink> {
    /// Creates an engine drawing to standard output with the default configuration.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(TermSink::stdout())
    }

    /// Creates an engine drawing to standard error with the default configuration.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(TermSink::stderr())
    }
}

impl LiveProgress {
    /// Starts configuring an engine.
    #[must_use]
    pub fn builder() -> LiveBuilder {
        LiveBuilder::new()
    }
}

impl<S: Sink> LiveProgress<S> {
    /// Creates a stopped engine that will draw to `sink`, with an empty registry.
    #[must_use]
    pub fn new(sink: S) -> Self {
        Self::with_parts(sink, LiveConfig::default(), Registry::new())
    }

    pub(crate) fn with_parts(sink: S, config: LiveConfig, registry: Registry) -> Self {
        Self {
            registry,
            config,
            painter: Some(Painter::new(sink)),
            thread: None,
        }
    }

    /// The tasks this engine displays. Clone it to report progress from other threads.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The engine's settings.
    #[must_use]
    pub const fn config(&self) -> &LiveConfig {
        &self.config
    }

    /// Returns `true` between a successful [`start`](Self::start) and the next
    /// [`stop`](Self::stop).
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.thread.is_some()
    }

    /// The sink, while the engine is stopped.
    #[must_use]
    pub fn sink(&self) -> Option<&S> {
        self.painter.as_ref().map(Painter::sink)
    }

    /// Stops the engine if needed and hands back its sink.
    ///
    /// Cleanup errors are discarded; call [`stop`](Self::stop) first to see them.
    /// Returns `None` if the sink was lost to a panicked render thread.
    #[must_use]
    pub fn into_sink(mut self) -> Option<S> {
        if let Err(err) = self.stop() {
            debug!(error = %err, "error while stopping before releasing sink");
        }
        self.painter.take().map(Painter::into_sink)
    }

    /// Hides the cursor and starts repainting in the background.
    ///
    /// Returns immediately. Does nothing if already running.
    ///
    /// # Errors
    ///
    /// * [`LiveError::Spawn`] if the render thread cannot be created.
    /// * [`LiveError::Io`] if hiding the cursor fails.
    /// * [`LiveError::SinkUnavailable`] if an earlier run lost the sink.
    ///
    /// On any error the engine stays stopped and keeps its sink, except in the
    /// last case where there is none.
    pub fn start(&mut self) -> Result<()> {
        self.start_on(thread::Builder::new().name("live-progress".into()))
    }

    /// Starts the render thread from `builder`.
    pub(crate) fn start_on(&mut self, builder: thread::Builder) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let mut painter = self.painter.take().ok_or(LiveError::SinkUnavailable)?;

        // The thread waits for the painter, which is sent once the cursor is hidden.
        let (handoff, handed) = bounded::<Painter<S>>(1);
        let (stop, stopped) = bounded(0);
        let registry = self.registry.clone();
        let interval = self.config.refresh_interval();
        let spawned = builder.spawn(move || {
            let painter = handed.recv().ok()?;
            Some(render_loop(painter, &registry, interval, &stopped))
        });
        let handle = match spawned {
            Ok(handle) => handle,
            Err(err) => {
                self.painter = Some(painter);
                return Err(LiveError::Spawn(err));
            }
        };

        if let Err(err) = painter.hide_cursor() {
            self.painter = Some(painter);
            drop(handoff);
            let _ = handle.join();
            return Err(err.into());
        }
        if let Err(SendError(painter)) = handoff.send(painter) {
            self.painter = Some(painter);
            let _ = handle.join();
            return Err(LiveError::RenderThread);
        }

        self.thread = Some(RenderThread { stop, handle });
        debug!(?interval, transient = self.config.transient(), "live display started");
        Ok(())
    }

    /// Stops repainting, draws the final state and shows the cursor again.
    ///
    /// Blocks until the render thread has exited, so no repaint can race the
    /// cleanup. A transient display is erased; otherwise its last frame stays on
    /// screen with the cursor below it. Does nothing if not running.
    ///
    /// # Errors
    ///
    /// * [`LiveError::Io`] with the first write failure seen during the run or the
    ///   cleanup. All cleanup writes are attempted regardless.
    /// * [`LiveError::RenderThread`] if the render thread panicked; the sink is lost.
    pub fn stop(&mut self) -> Result<()> {
        let Some(RenderThread { stop, handle }) = self.thread.take() else {
            return Ok(());
        };
        drop(stop);
        let mut painter = handle
            .join()
            .map_err(|_| LiveError::RenderThread)?
            .ok_or(LiveError::RenderThread)?;

        painter.finish(&self.registry, self.config.transient());
        let error = painter.take_error();
        self.painter = Some(painter);
        debug!(failed = error.is_some(), "live display stopped");

        error.map_or(Ok(()), |err| Err(err.into()))
    }
}

impl<S: Sink> Drop for LiveProgress<S> {
    fn drop(&mut self) {
        if let Err(err) = self.stop() {
            warn!(error = %err, "live display did not stop cleanly");
        }
    }
}

/// Body of the render thread: one spinner step and one repaint per tick.
fn render_loop<S: Sink>(
    mut painter: Painter<S>,
    registry: &Registry,
    interval: Duration,
    stopped: &Receiver<()>,
) -> Painter<S> {
    let ticker = tick(interval);
    loop {
        select! {
            recv(ticker) -> _ => {
                registry.advance_spinners();
                let painted = painter.paint(registry);
                painter.record(painted);
                trace!(lines = painter.last_painted(), "repainted");
            }
            recv(stopped) -> _ => break,
        }
    }
    painter
}

#[cfg(test)]
mod tests {
    use std::{io, thread, time::Duration};

    use super::LiveProgress;
    use crate::{
        error::LiveError,
        painter::tests::{FailingSink, Screen},
        sink::{BufferSink, Sink},
        style::ColorMode,
    };

    fn fast(sink: BufferSink, transient: bool) -> LiveProgress<BufferSink> {
        LiveProgress::builder()
            .refresh_interval(Duration::from_millis(5))
            .transient(transient)
            .build(sink)
    }

    /// Start & Stop
    /// The cursor is hidden on start and shown again on stop.
    #[test]
    fn test_start_stop() {
        let mut live = fast(BufferSink::new(40), false);
        assert!(!live.is_running());
        assert!(live.sink().is_some());

        live.start().unwrap();
        assert!(live.is_running());
        assert!(live.sink().is_none());
        live.start().unwrap();

        live.registry().add_spinner("work");
        thread::sleep(Duration::from_millis(30));
        live.stop().unwrap();
        live.stop().unwrap();

        let out = live.sink().unwrap().contents();
        assert!(out.starts_with("\x1b[?25l"));
        assert!(out.ends_with("\n\x1b[?25h"));
        assert!(out.contains(" work\n"));
    }

    /// Stop Without Start
    #[test]
    fn test_stop_when_stopped() {
        let mut live = fast(BufferSink::new(40), true);
        live.stop().unwrap();
        assert!(live.sink().unwrap().as_bytes().is_empty());
    }

    /// Transient Stop
    /// Two tasks, one finished and one untouched: nothing remains on screen.
    #[test]
    fn test_transient_stop_clears() {
        let mut live = fast(BufferSink::new(60), true);
        let registry = live.registry().clone();
        let done = registry.add_bar("done", 10);
        registry.add_bar("idle", 10);

        live.start().unwrap();
        registry.update(done, 10);
        registry.complete(done);
        thread::sleep(Duration::from_millis(30));
        live.stop().unwrap();

        let mut screen = Screen::new();
        screen.feed(live.sink().unwrap().as_bytes());
        assert!(screen.lines().is_empty());
        assert_eq!(screen.row, 0);
        assert!(screen.cursor_visible);
    }

    /// Final Frame
    /// A non-transient stop leaves the last state visible.
    #[test]
    fn test_persistent_stop_keeps_frame() {
        let mut live = fast(BufferSink::new(30), false);
        let registry = live.registry().clone();
        let id = registry.add_bar("x", 4);

        live.start().unwrap();
        registry.update(id, 4);
        live.stop().unwrap();

        let mut screen = Screen::new();
        screen.feed(live.sink().unwrap().as_bytes());
        assert_eq!(screen.lines(), [format!("x {} 100%", "█".repeat(22))]);
    }

    /// Restart
    /// A second run paints below the first run's final frame.
    #[test]
    fn test_restart() {
        let mut live = fast(BufferSink::new(30), false);
        let registry = live.registry().clone();
        registry.add_spinner("a");

        live.start().unwrap();
        live.stop().unwrap();
        live.start().unwrap();
        live.stop().unwrap();

        let mut screen = Screen::new();
        screen.feed(live.sink().unwrap().as_bytes());
        assert_eq!(screen.lines().len(), 3);
    }

    /// Unwritable Sink
    /// A failed cursor hide is returned and the engine stays stopped with its sink.
    #[test]
    fn test_failing_sink() {
        let mut live = LiveProgress::new(FailingSink);
        let err = live.start().unwrap_err();
        assert!(matches!(err, LiveError::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
        assert!(!live.is_running());
        assert!(live.sink().is_some());
    }

    /// Accepts a fixed number of writes, then fails every one after.
    struct FlakySink {
        allowed: usize,
    }

    impl Sink for FlakySink {
        fn width(&self) -> usize {
            40
        }

        fn height(&self) -> usize {
            24
        }

        fn color_mode(&self) -> ColorMode {
            ColorMode::None
        }

        fn write_raw(&mut self, _bytes: &[u8]) -> io::Result<()> {
            if self.allowed == 0 {
                return Err(io::Error::other("disk full"));
            }
            self.allowed -= 1;
            Ok(())
        }
    }

    /// Tick Failures
    /// Failures inside the render thread surface from `stop`.
    #[test]
    fn test_tick_failure_reported_on_stop() {
        let mut live = LiveProgress::builder()
            .refresh_interval(Duration::from_millis(5))
            .build(FlakySink { allowed: 1 });
        live.registry().add_spinner("x");

        live.start().unwrap();
        thread::sleep(Duration::from_millis(30));
        let err = live.stop().unwrap_err();

        assert!(matches!(err, LiveError::Io(_)));
        assert!(live.sink().is_some());
        assert!(live.stop().is_ok());
    }

    /// Spawn Failure
    /// Nothing is written and the engine keeps its sink, so it can start later.
    #[cfg(target_os = "linux")]
    #[test]
    fn test_spawn_failure_keeps_sink() {
        let mut live = fast(BufferSink::new(40), false);
        let oversized = thread::Builder::new().stack_size(usize::MAX / 2);

        let err = live.start_on(oversized).unwrap_err();
        assert!(matches!(err, LiveError::Spawn(_)));
        assert!(!live.is_running());
        assert!(live.sink().unwrap().as_bytes().is_empty());

        live.start().unwrap();
        live.stop().unwrap();
        assert!(live.sink().unwrap().contents().starts_with("\x1b[?25l"));
    }

    /// Concurrent Producers While Live
    /// Workers advance, complete and remove tasks during repaints; a transient
    /// stop still leaves a clean screen.
    #[test]
    fn test_concurrent_producers_while_running() {
        let mut live = fast(BufferSink::new(60), true);
        let registry = live.registry().clone();
        live.start().unwrap();

        let workers: Vec<_> = (0..4)
            .map(|w| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for round in 0..5 {
                        let id = registry.add_bar(format!("worker {w} round {round}"), 50);
                        for _ in 0..50 {
                            registry.advance(id, 1);
                        }
                        registry.complete(id);
                        thread::sleep(Duration::from_millis(2));
                        if round % 2 == 0 {
                            registry.remove(id);
                        }
                    }
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }
        thread::sleep(Duration::from_millis(20));
        live.stop().unwrap();

        assert_eq!(registry.len(), 8);
        assert!(registry.is_all_complete());
        let mut screen = Screen::new();
        screen.feed(live.sink().unwrap().as_bytes());
        assert!(screen.lines().is_empty());
        assert_eq!(screen.row, 0);
        assert!(screen.cursor_visible);
    }

    /// Release Sink
    #[test]
    fn test_into_sink() {
        let mut live = fast(BufferSink::new(40), true);
        live.start().unwrap();
        let sink = live.into_sink().unwrap();
        assert!(sink.contents().ends_with("\x1b[?25h"));
    }
}
