//! Output destinations for the live display.
//!
//! A [`Sink`] reports its size and color capability and accepts raw bytes. The
//! engine takes ownership of its sink for the whole time it is running, so nothing
//! else can interleave writes with a repaint.

use std::io::{self, IsTerminal as _, Write};

use crate::style::ColorMode;

/// Width assumed when a sink cannot report one.
pub const FALLBACK_WIDTH: usize = 80;

/// Height assumed when a sink cannot report one.
pub const FALLBACK_HEIGHT: usize = 24;

/// An output destination the live display paints into.
pub trait Sink: Send + 'static {
    /// Current width in columns. `0` means unknown.
    fn width(&self) -> usize;

    /// Current height in rows. `0` means unknown.
    fn height(&self) -> usize;

    /// The color capability to render segments with.
    fn color_mode(&self) -> ColorMode;

    /// Writes raw bytes (text and control sequences) to the destination.
    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Flushes buffered output.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: Sink + ?Sized> Sink for Box<S> {
    fn width(&self) -> usize {
        (**self).width()
    }

    fn height(&self) -> usize {
        (**self).height()
    }

    fn color_mode(&self) -> ColorMode {
        (**self).color_mode()
    }

    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        (**self).write_raw(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}

/// Which standard stream a [`TermSink`] writes to.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Stream {
    /// Standard output.
    #[default]
    Stdout,
    /// Standard error.
    Stderr,
}

/// A sink writing to the process's stdout or stderr.
///
/// The color mode is detected once at construction; the size is queried from the
/// terminal on every call so resizes are picked up by the next repaint.
#[derive(Debug)]
pub struct TermSink {
    stream: Stream,
    color_mode: ColorMode,
}

impl TermSink {
    /// Creates a sink on standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(Stream::Stdout)
    }

    /// Creates a sink on standard error.
    #[must_use]
    pub fn stderr() -> Self {
        Self::new(Stream::Stderr)
    }

    /// Creates a sink on `stream`, detecting its color mode.
    #[must_use]
    pub fn new(stream: Stream) -> Self {
        let is_terminal = match stream {
            Stream::Stdout => io::stdout().is_terminal(),
            Stream::Stderr => io::stderr().is_terminal(),
        };
        Self {
            stream,
            color_mode: ColorMode::detect(is_terminal),
        }
    }

    /// Overrides the detected color mode.
    #[must_use]
    pub const fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    fn size() -> Option<(usize, usize)> {
        crossterm::terminal::size()
            .ok()
            .map(|(cols, rows)| (usize::from(cols), usize::from(rows)))
    }
}

impl Default for TermSink {
    fn default() -> Self {
        Self::stdout()
    }
}

impl Sink for TermSink {
    fn width(&self) -> usize {
        Self::size().map_or(FALLBACK_WIDTH, |(cols, _)| cols)
    }

    fn height(&self) -> usize {
        Self::size().map_or(FALLBACK_HEIGHT, |(_, rows)| rows)
    }

    fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().lock().write_all(bytes),
            Stream::Stderr => io::stderr().lock().write_all(bytes),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().flush(),
            Stream::Stderr => io::stderr().flush(),
        }
    }
}

/// An in-memory sink with a fixed size and color mode.
///
/// Useful for capturing output when no terminal is attached, and for asserting on
/// the exact bytes a repaint produces.
#[derive(Clone, Debug)]
pub struct BufferSink {
    buf: Vec<u8>,
    width: usize,
    height: usize,
    color_mode: ColorMode,
}

impl BufferSink {
    /// Creates an empty buffer reporting the given width, with no colors.
    #[must_use]
    pub const fn new(width: usize) -> Self {
        Self {
            buf: Vec::new(),
            width,
            height: FALLBACK_HEIGHT,
            color_mode: ColorMode::None,
        }
    }

    /// Sets the color mode reported to the renderer.
    #[must_use]
    pub const fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_mode = mode;
        self
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Returns the written bytes as text, replacing invalid UTF-8.
    #[must_use]
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buf).into_owned()
    }

    /// Discards everything written so far.
    pub fn clear(&mut self) {
        self.buf.clear();
    }
}

impl Default for BufferSink {
    fn default() -> Self {
        Self::new(FALLBACK_WIDTH)
    }
}

impl Sink for BufferSink {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn color_mode(&self) -> ColorMode {
        self.color_mode
    }

    fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.buf.extend_from_slice(bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{BufferSink, Sink};
    use crate::style::ColorMode;

    /// Buffer Capture
    #[test]
    fn test_buffer_sink() {
        let mut sink = BufferSink::new(40).with_color_mode(ColorMode::Standard);
        sink.write_raw(b"hello ").unwrap();
        sink.write_raw("█".as_bytes()).unwrap();

        assert_eq!(sink.contents(), "hello █");
        assert_eq!(sink.width(), 40);
        assert_eq!(sink.color_mode(), ColorMode::Standard);

        sink.clear();
        assert!(sink.as_bytes().is_empty());
    }

    /// Boxed Sinks
    /// A boxed trait object forwards to the inner sink.
    #[test]
    fn test_boxed_sink() {
        let mut sink: Box<dyn Sink> = Box::new(BufferSink::new(10));
        sink.write_raw(b"x").unwrap();
        sink.flush().unwrap();
        assert_eq!(sink.width(), 10);
    }
}
