//! I/O wrappers for tracking data transfer.
//!
//! [`ProgressReader`] and [`ProgressWriter`] wrap any [`std::io::Read`] or
//! [`std::io::Write`] and advance a registry task by every byte that passes through.
//! Useful for:
//!
//! * File downloads/uploads.
//! * Hashing large files.
//! * Compressing/Decompressing data streams.
//!
//! Errors from the inner stream pass through unchanged; zero-byte transfers do not
//! touch the registry.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::{registry::Registry, task::TaskId};

fn advance_by(registry: &Registry, id: TaskId, n: usize) {
    if n > 0 {
        registry.advance(id, i64::try_from(n).unwrap_or(i64::MAX));
    }
}

/// A wrapper around [`Read`] that advances a task by the bytes read.
///
/// # Examples
///
/// ```
/// use std::io::{Cursor, Read as _};
/// use live_progress::{ProgressReader, Registry};
///
/// let registry = Registry::new();
/// let id = registry.add_bar("read", 5);
/// let mut reader = ProgressReader::new(Cursor::new(b"hello"), registry.clone(), id);
///
/// let mut out = String::new();
/// reader.read_to_string(&mut out)?;
/// assert_eq!(registry.get(id).unwrap().current(), 5);
/// # Ok::<(), std::io::Error>(())
/// ```
#[derive(Debug)]
pub struct ProgressReader<R> {
    inner: R,
    registry: Registry,
    id: TaskId,
}

impl<R> ProgressReader<R> {
    /// Wraps `inner`, advancing task `id` in `registry`.
    pub const fn new(inner: R, registry: Registry, id: TaskId) -> Self {
        Self {
            inner,
            registry,
            id,
        }
    }

    /// The task being advanced.
    pub const fn task(&self) -> TaskId {
        self.id
    }

    /// A reference to the wrapped reader.
    pub const fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Unwraps the reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        advance_by(&self.registry, self.id, n);
        Ok(n)
    }
}

/// Seeking moves the inner stream only; progress already counted stays.
impl<R: Seek> Seek for ProgressReader<R> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

/// A wrapper around [`Write`] that advances a task by the bytes written.
#[derive(Debug)]
pub struct ProgressWriter<W> {
    inner: W,
    registry: Registry,
    id: TaskId,
}

impl<W> ProgressWriter<W> {
    /// Wraps `inner`, advancing task `id` in `registry`.
    pub const fn new(inner: W, registry: Registry, id: TaskId) -> Self {
        Self {
            inner,
            registry,
            id,
        }
    }

    /// The task being advanced.
    pub const fn task(&self) -> TaskId {
        self.id
    }

    /// A reference to the wrapped writer.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwraps the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ProgressWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        advance_by(&self.registry, self.id, n);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: Seek> Seek for ProgressWriter<W> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.inner.seek(pos)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor, Read, Seek as _, SeekFrom, Write as _};

    use super::{ProgressReader, ProgressWriter};
    use crate::registry::Registry;

    /// Reader Tracking
    /// Verifies bytes read are counted.
    #[test]
    fn test_io_reader() {
        let data = vec![0u8; 100];
        let registry = Registry::new();
        let id = registry.add_bar("read", 100);
        let mut reader = ProgressReader::new(Cursor::new(&data), registry.clone(), id);

        let mut buf = [0u8; 10];
        reader.read_exact(&mut buf).unwrap();
        assert_eq!(registry.get(id).unwrap().current(), 10);

        reader.seek(SeekFrom::Start(0)).unwrap();
        io::copy(&mut reader, &mut io::sink()).unwrap();
        assert_eq!(registry.get(id).unwrap().current(), 100);
    }

    /// Writer Tracking
    /// Verifies bytes written are counted.
    #[test]
    fn test_io_writer() {
        let registry = Registry::new();
        let id = registry.add_bar("write", 50);
        let mut writer = ProgressWriter::new(Vec::new(), registry.clone(), id);

        writer.write_all(&[1, 2, 3, 4, 5]).unwrap();
        writer.flush().unwrap();

        assert_eq!(registry.get(id).unwrap().current(), 5);
        assert_eq!(writer.into_inner(), [1, 2, 3, 4, 5]);
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    /// Error Pass-through
    /// Inner errors are returned as-is and nothing is counted.
    #[test]
    fn test_io_error_passthrough() {
        let registry = Registry::new();
        let id = registry.add_bar("net", 10);
        let mut reader = ProgressReader::new(Broken, registry.clone(), id);

        let err = reader.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert_eq!(registry.get(id).unwrap().current(), 0);
        assert_eq!(reader.task(), id);
    }
}
