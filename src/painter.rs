//! The terminal repaint protocol.
//!
//! A [`Painter`] owns the sink while the display is live and remembers how many lines
//! the previous frame occupied. Every frame moves the cursor back up over those
//! lines and rewrites each one from column 0, so the block is redrawn in place.
//!
//! The control sequences below are a fixed wire format; any byte drift shows up on
//! the terminal as garbage or as a block that creeps down the screen.

use std::{fmt::Write as _, io};

use tracing::warn;

use crate::{
    registry::Registry,
    sink::{FALLBACK_WIDTH, Sink},
};

/// Move the cursor to column 0 (by moving left a large fixed count).
pub const CURSOR_TO_COLUMN_0: &str = "\x1b[1000D";
/// Clear from the cursor to the end of the line.
pub const CLEAR_LINE: &str = "\x1b[0K";
/// Hide the cursor.
pub const HIDE_CURSOR: &str = "\x1b[?25l";
/// Show the cursor.
pub const SHOW_CURSOR: &str = "\x1b[?25h";

/// Appends "cursor up `n` lines".
fn cursor_up(frame: &mut String, n: usize) {
    let _ = write!(frame, "\x1b[{n}A");
}

fn clear_line(frame: &mut String) {
    frame.push_str(CURSOR_TO_COLUMN_0);
    frame.push_str(CLEAR_LINE);
}

/// Builds one repaint: back up over the `previous` lines, rewrite every line, then
/// blank any lines the previous frame had beyond the new last one.
fn compose_frame(previous: usize, lines: &[String]) -> String {
    let mut frame = String::new();
    if previous > 0 {
        cursor_up(&mut frame, previous);
    }
    for line in lines {
        clear_line(&mut frame);
        frame.push_str(line);
        frame.push('\n');
    }

    let surplus = previous.saturating_sub(lines.len());
    if surplus > 0 {
        for _ in 0..surplus {
            clear_line(&mut frame);
            frame.push('\n');
        }
        cursor_up(&mut frame, surplus);
    }
    frame
}

/// Builds the erase sequence for `count` painted lines, ending where they began.
fn compose_erase(count: usize) -> String {
    let mut frame = String::new();
    if count == 0 {
        return frame;
    }
    cursor_up(&mut frame, count);
    for _ in 0..count {
        clear_line(&mut frame);
        frame.push('\n');
    }
    cursor_up(&mut frame, count);
    frame
}

/// Sole writer to a sink for the lifetime of a live display.
#[derive(Debug)]
pub(crate) struct Painter<S> {
    sink: S,
    last_painted: usize,
    first_error: Option<io::Error>,
}

impl<S: Sink> Painter<S> {
    pub(crate) const fn new(sink: S) -> Self {
        Self {
            sink,
            last_painted: 0,
            first_error: None,
        }
    }

    pub(crate) const fn sink(&self) -> &S {
        &self.sink
    }

    pub(crate) fn into_sink(self) -> S {
        self.sink
    }

    /// Number of lines the last frame left on screen.
    pub(crate) const fn last_painted(&self) -> usize {
        self.last_painted
    }

    /// Repaints every task in `registry` in place.
    ///
    /// The line count is recorded even if the write fails, so the next frame still
    /// backs up over what may have reached the terminal.
    pub(crate) fn paint(&mut self, registry: &Registry) -> io::Result<()> {
        let width = match self.sink.width() {
            0 => FALLBACK_WIDTH,
            w => w,
        };
        let lines = registry.render_lines(width, self.sink.color_mode());
        let frame = compose_frame(self.last_painted, &lines);
        self.last_painted = lines.len();
        self.emit(frame.as_bytes())
    }

    /// Blanks every painted line and leaves the cursor where the first one began.
    pub(crate) fn erase(&mut self) -> io::Result<()> {
        let frame = compose_erase(self.last_painted);
        self.last_painted = 0;
        self.emit(frame.as_bytes())
    }

    pub(crate) fn hide_cursor(&mut self) -> io::Result<()> {
        self.emit(HIDE_CURSOR.as_bytes())
    }

    pub(crate) fn show_cursor(&mut self) -> io::Result<()> {
        self.emit(SHOW_CURSOR.as_bytes())
    }

    /// Final output when the display stops.
    ///
    /// Transient displays erase themselves; others draw one last frame and step
    /// below it. The cursor is shown again either way. Failures are recorded.
    pub(crate) fn finish(&mut self, registry: &Registry, transient: bool) {
        if transient {
            let erased = self.erase();
            self.record(erased);
        } else {
            let painted = self.paint(registry);
            self.record(painted);
            let newline = self.emit(b"\n");
            self.record(newline);
            self.last_painted = 0;
        }
        let shown = self.show_cursor();
        self.record(shown);
    }

    /// Remembers the first write failure; later ones are dropped.
    pub(crate) fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            if self.first_error.is_none() {
                warn!(error = %err, "progress output write failed");
                self.first_error = Some(err);
            }
        }
    }

    pub(crate) fn take_error(&mut self) -> Option<io::Error> {
        self.first_error.take()
    }

    fn emit(&mut self, bytes: &[u8]) -> io::Result<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.sink.write_raw(bytes)?;
        self.sink.flush()
    }
}
