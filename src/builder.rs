//! Fluent interface for constructing [`LiveProgress`] instances.
//!
//! [`LiveProgress::new`] covers the common case. [`LiveBuilder`] adds:
//!
//! * **Timing:** the refresh interval between repaints.
//! * **Transient Mode:** erase the display on stop instead of leaving the final frame.
//! * **Shared State:** inject an existing [`Registry`], so tasks registered before the
//!   engine exists (or by another component) are displayed by it.

use std::time::Duration;

use crate::{config::LiveConfig, live::LiveProgress, registry::Registry, sink::Sink};

/// A builder for [`LiveProgress`].
#[derive(Clone, Debug, Default)]
pub struct LiveBuilder {
    config: LiveConfig,
    registry: Option<Registry>,
}

impl LiveBuilder {
    /// Starts from the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time between repaints. Zero is raised to one millisecond.
    #[must_use]
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.config = self.config.with_refresh_interval(interval);
        self
    }

    /// Erase the display on stop instead of leaving the final frame.
    #[must_use]
    pub const fn transient(mut self, transient: bool) -> Self {
        self.config = self.config.with_transient(transient);
        self
    }

    /// Replaces every setting with `config`.
    #[must_use]
    pub const fn with_config(mut self, config: LiveConfig) -> Self {
        self.config = config;
        self
    }

    /// Displays the tasks of an existing registry instead of a fresh one.
    #[must_use]
    pub fn with_registry(mut self, registry: Registry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Consumes the builder and returns a stopped engine drawing to `sink`.
    #[must_use]
    pub fn build<S: Sink>(self, sink: S) -> LiveProgress<S> {
        LiveProgress::with_parts(sink, self.config, self.registry.unwrap_or_default())
    }
}
