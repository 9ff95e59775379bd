//! Throughput and remaining-time estimation.
//!
//! A [`RateTracker`] keeps a bounded history of `(timestamp, value)` observations
//! where `value` is the absolute progress count. Throughput is the slope between
//! the first and last sample of the recent window; this is deliberately simple and
//! tolerates the irregular sampling that comes from coalesced updates.
//!
//! Every method has an `_at` variant taking the current [`Instant`] explicitly so
//! the estimator can be driven by a synthetic clock.

use std::time::Duration;

use web_time::Instant;

/// Samples kept before pruning kicks in.
pub const MAX_SAMPLES: usize = 100;

/// Samples kept after a prune.
pub const RETAINED_SAMPLES: usize = 50;

/// How far back the throughput window reaches.
pub const RATE_WINDOW: Duration = Duration::from_secs(2);

/// Upper bound for [`RateTracker::eta`].
pub const MAX_ETA: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Sample {
    at: Instant,
    value: u64,
}

/// Bounded sample history for one task.
#[derive(Clone, Debug)]
pub struct RateTracker {
    origin: Instant,
    finished_at: Option<Instant>,
    samples: Vec<Sample>,
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl RateTracker {
    /// Creates an empty tracker whose elapsed time starts now.
    #[must_use]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates an empty tracker whose elapsed time starts at `origin`.
    #[must_use]
    pub fn starting_at(origin: Instant) -> Self {
        Self {
            origin,
            finished_at: None,
            samples: Vec::with_capacity(MAX_SAMPLES + 1),
        }
    }

    /// Records the absolute progress `value` observed now.
    pub fn record(&mut self, value: u64) {
        self.record_at(Instant::now(), value);
    }

    /// Records the absolute progress `value` observed at `at`.
    ///
    /// Timestamps older than the newest sample are moved forward to it so the
    /// history stays ordered. Once the history exceeds [`MAX_SAMPLES`] it is cut
    /// back to the newest [`RETAINED_SAMPLES`].
    pub fn record_at(&mut self, at: Instant, value: u64) {
        let at = self.samples.last().map_or(at, |last| at.max(last.at));
        self.samples.push(Sample { at, value });

        if self.samples.len() > MAX_SAMPLES {
            let excess = self.samples.len() - RETAINED_SAMPLES;
            self.samples.drain(..excess);
        }
    }

    /// Number of samples currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples have been recorded since creation or the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// The most recently recorded value, if any.
    #[must_use]
    pub fn last_value(&self) -> Option<u64> {
        self.samples.last().map(|s| s.value)
    }

    /// Units per second over the recent window, or `0.0` without enough data.
    #[must_use]
    pub fn rate(&self) -> f64 {
        self.rate_at(Instant::now())
    }

    /// Units per second as seen from `now`.
    ///
    /// Uses the samples from the last [`RATE_WINDOW`]; if fewer than two fall in
    /// that window the whole history is used instead.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn rate_at(&self, now: Instant) -> f64 {
        if self.samples.len() < 2 {
            return 0.0;
        }

        let start = self
            .samples
            .partition_point(|s| now.saturating_duration_since(s.at) > RATE_WINDOW);
        let window = match &self.samples[start..] {
            recent if recent.len() >= 2 => recent,
            _ => &self.samples[..],
        };

        let (first, last) = (window[0], window[window.len() - 1]);
        let secs = last.at.saturating_duration_since(first.at).as_secs_f64();
        if secs <= 0.0 {
            return 0.0;
        }

        (last.value as f64 - first.value as f64) / secs
    }

    /// Estimated time until `current` reaches `total`.
    #[must_use]
    pub fn eta(&self, current: u64, total: u64) -> Duration {
        self.eta_at(Instant::now(), current, total)
    }

    /// Estimated time until `current` reaches `total`, as seen from `now`.
    ///
    /// Zero when already complete or when throughput is not positive; capped at
    /// [`MAX_ETA`].
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn eta_at(&self, now: Instant, current: u64, total: u64) -> Duration {
        if current >= total {
            return Duration::ZERO;
        }

        let rate = self.rate_at(now);
        if rate <= 0.0 {
            return Duration::ZERO;
        }

        let secs = (total - current) as f64 / rate;
        if secs >= MAX_ETA.as_secs_f64() {
            MAX_ETA
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Wall-clock time since creation or the last reset, frozen once finished.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    /// Time between the origin and `now`, or the finish time if earlier.
    #[must_use]
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        let end = self.finished_at.map_or(now, |at| at.min(now));
        end.saturating_duration_since(self.origin)
    }

    /// Stops the elapsed clock now.
    pub fn finish(&mut self) {
        self.finish_at(Instant::now());
    }

    /// Stops the elapsed clock at `at`. Only the first call counts.
    pub fn finish_at(&mut self, at: Instant) {
        self.finished_at.get_or_insert(at);
    }

    /// Returns `true` once the elapsed clock has been stopped.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Drops all samples, clears the finish time and restarts the elapsed-time origin.
    pub fn reset(&mut self) {
        self.reset_at(Instant::now());
    }

    /// Drops all samples and restarts the elapsed-time origin at `origin`.
    pub fn reset_at(&mut self, origin: Instant) {
        self.origin = origin;
        self.finished_at = None;
        self.samples.clear();
    }
}
