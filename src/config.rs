//! Settings for the live display.

use std::time::Duration;

/// Time between repaints unless configured otherwise.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest accepted refresh interval; shorter values (including zero) are raised to it.
pub const MIN_REFRESH_INTERVAL: Duration = Duration::from_millis(1);

/// How a [`LiveProgress`](crate::LiveProgress) repaints and what it leaves behind.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use live_progress::LiveConfig;
///
/// let config = LiveConfig::new()
///     .with_refresh_interval(Duration::from_millis(50))
///     .with_transient(true);
/// assert!(config.transient());
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LiveConfig {
    refresh_interval: Duration,
    transient: bool,
}

impl Default for LiveConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            transient: false,
        }
    }
}

impl LiveConfig {
    /// The default configuration: 100ms refresh, final frame left on screen.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the time between repaints.
    #[must_use]
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval.max(MIN_REFRESH_INTERVAL);
        self
    }

    /// Whether stopping erases the display instead of leaving its final frame.
    #[must_use]
    pub const fn with_transient(mut self, transient: bool) -> Self {
        self.transient = transient;
        self
    }

    /// The time between repaints, never below [`MIN_REFRESH_INTERVAL`].
    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        self.refresh_interval.max(MIN_REFRESH_INTERVAL)
    }

    /// Whether stopping erases the display.
    #[must_use]
    pub const fn transient(&self) -> bool {
        self.transient
    }
}
