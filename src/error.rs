//! Error type for the live display lifecycle.
//!
//! Registry operations (adding, updating, removing tasks) never fail: unknown ids are
//! ignored and out-of-range values are clamped. Only the engine lifecycle
//! ([`LiveProgress::start`](crate::LiveProgress::start) and
//! [`LiveProgress::stop`](crate::LiveProgress::stop)) can report errors, and only
//! those that concern the output sink or the render thread.

use std::io;

use thiserror::Error;

/// Errors surfaced by the live display engine.
#[derive(Error, Debug)]
pub enum LiveError {
    /// Writing to the output sink failed.
    ///
    /// Failures during periodic repaints are remembered and reported by `stop()`.
    #[error("failed to write progress output: {0}")]
    Io(#[from] io::Error),

    /// The background render thread could not be spawned.
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[source] io::Error),

    /// The background render thread panicked; the sink it owned is lost.
    #[error("render thread panicked")]
    RenderThread,

    /// `start()` was called but the engine no longer owns a sink.
    #[error("output sink is no longer available")]
    SinkUnavailable,
}

/// Convenience alias for lifecycle results.
pub type Result<T, E = LiveError> = std::result::Result<T, E>;
