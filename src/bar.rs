//! Determinate progress bars.
//!
//! A [`Bar`] is a plain value holding `current` and `total`. Writes are clamped into
//! `0..=total`, so a bar can never show more than 100% or less than 0%, and a zero
//! total simply reads as 0%.

use compact_str::{CompactString, format_compact};
use unicode_width::UnicodeWidthStr;

use crate::{
    segment::{Measurement, Segment, Segments},
    style::Style,
};

/// Narrowest auto-sized bar.
pub const MIN_BAR_WIDTH: usize = 10;

/// Columns reserved for the percentage suffix (`" 100%"` plus slack).
pub const PERCENT_WIDTH: usize = 6;

/// Bar width assumed by [`Bar::measure`] when auto-sizing.
pub const DEFAULT_MAX_BAR_WIDTH: usize = 40;

/// Default glyph for the completed portion.
pub const COMPLETE_GLYPH: &str = "█";

/// Default glyph for the remaining portion.
pub const REMAINING_GLYPH: &str = "░";

/// A progress bar with a known total.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bar {
    current: u64,
    total: u64,
    description: CompactString,
    width: usize,
    complete_glyph: CompactString,
    remaining_glyph: CompactString,
    complete_style: Style,
    remaining_style: Style,
}

impl Bar {
    /// Creates an empty bar that completes at `total`.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            current: 0,
            total,
            description: CompactString::default(),
            width: 0,
            complete_glyph: COMPLETE_GLYPH.into(),
            remaining_glyph: REMAINING_GLYPH.into(),
            complete_style: Style::new(),
            remaining_style: Style::new(),
        }
    }

    /// Sets the text shown before the bar.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<CompactString>) -> Self {
        self.description = description.into();
        self
    }

    /// Fixes the bar at `width` columns. `0` sizes it to the available width.
    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the glyph repeated over the completed portion.
    #[must_use]
    pub fn with_complete_glyph(mut self, glyph: impl Into<CompactString>) -> Self {
        self.complete_glyph = glyph.into();
        self
    }

    /// Sets the glyph repeated over the remaining portion.
    #[must_use]
    pub fn with_remaining_glyph(mut self, glyph: impl Into<CompactString>) -> Self {
        self.remaining_glyph = glyph.into();
        self
    }

    /// Sets the style of the completed portion.
    #[must_use]
    pub const fn with_complete_style(mut self, style: Style) -> Self {
        self.complete_style = style;
        self
    }

    /// Sets the style of the remaining portion.
    #[must_use]
    pub const fn with_remaining_style(mut self, style: Style) -> Self {
        self.remaining_style = style;
        self
    }

    /// Sets the absolute position, clamped into `0..=total`. Returns the stored value.
    pub fn set_position(&mut self, value: i64) -> u64 {
        self.current = u64::try_from(value).unwrap_or(0).min(self.total);
        self.current
    }

    /// Moves the position by `delta`, clamped into `0..=total`. Returns the stored value.
    pub fn advance(&mut self, delta: i64) -> u64 {
        let next = if delta >= 0 {
            self.current.saturating_add(delta.unsigned_abs())
        } else {
            self.current.saturating_sub(delta.unsigned_abs())
        };
        self.current = next.min(self.total);
        self.current
    }

    /// The current position.
    #[must_use]
    pub const fn current(&self) -> u64 {
        self.current
    }

    /// The total.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// The description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Completion as a fraction in `0.0..=1.0`; `0.0` when the total is zero.
    #[allow(clippy::cast_precision_loss)]
    #[must_use]
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.current as f64 / self.total as f64
        }
    }

    /// Returns `true` once the position has reached the total.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.current >= self.total
    }

    fn description_width(&self) -> usize {
        match self.description.width() {
            0 => 0,
            w => w + 1,
        }
    }

    /// Width of the glyph run for a line `available` columns wide.
    ///
    /// An explicit width always wins. Auto-sizing takes what is left after the
    /// description and percentage, never less than [`MIN_BAR_WIDTH`] unless even
    /// that would overflow a known line width.
    #[must_use]
    pub fn bar_width(&self, available: usize) -> usize {
        if self.width > 0 {
            return self.width;
        }

        let fits = available.saturating_sub(self.description_width() + PERCENT_WIDTH);
        if available == 0 || fits >= MIN_BAR_WIDTH {
            fits.max(MIN_BAR_WIDTH)
        } else {
            fits
        }
    }

    /// Renders the bar for a line `available` columns wide.
    ///
    /// Emits the description (with a trailing space), the completed run, the
    /// remaining run, and the percentage, in that order.
    #[must_use]
    pub fn render(&self, available: usize) -> Segments {
        let mut segments = Segments::new();

        if !self.description.is_empty() {
            segments.push(Segment::plain(format_compact!("{} ", self.description)));
        }

        segments.extend(glyph_runs(
            self.bar_width(available),
            self.percentage(),
            (self.complete_glyph.as_str(), self.complete_style),
            (self.remaining_glyph.as_str(), self.remaining_style),
        ));
        segments.push(Segment::plain(format_compact!(
            " {}",
            format_percentage(self.percentage())
        )));

        segments
    }

    /// Minimum and maximum line widths for this bar.
    #[must_use]
    pub fn measure(&self) -> Measurement {
        let desc = self.description_width();
        let bar = if self.width > 0 {
            self.width
        } else {
            DEFAULT_MAX_BAR_WIDTH
        };
        Measurement {
            minimum: desc + MIN_BAR_WIDTH + PERCENT_WIDTH,
            maximum: desc + bar + PERCENT_WIDTH,
        }
    }
}

/// Splits `width` columns into a completed run and a remaining run for `fraction`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub(crate) fn glyph_runs(
    width: usize,
    fraction: f64,
    (complete_glyph, complete_style): (&str, Style),
    (remaining_glyph, remaining_style): (&str, Style),
) -> Segments {
    let mut segments = Segments::new();
    let filled = ((width as f64 * fraction) as usize).min(width);
    let empty = width - filled;

    if filled > 0 {
        segments.push(Segment::new(complete_glyph.repeat(filled), complete_style));
    }
    if empty > 0 {
        segments.push(Segment::new(remaining_glyph.repeat(empty), remaining_style));
    }
    segments
}

/// Formats a completion fraction to one decimal place, dropping a trailing `.0`.
///
/// Anything that rounds to 1000 tenths of a percent reads `100%`.
///
/// ```
/// use live_progress::bar::format_percentage;
///
/// assert_eq!(format_percentage(0.755), "75.5%");
/// assert_eq!(format_percentage(0.5), "50%");
/// assert_eq!(format_percentage(1.0), "100%");
/// ```
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn format_percentage(fraction: f64) -> CompactString {
    let tenths = (fraction * 1000.0 + 0.5) as u64;
    if tenths >= 1000 {
        return CompactString::const_new("100%");
    }

    match (tenths / 10, tenths % 10) {
        (whole, 0) => format_compact!("{whole}%"),
        (whole, decimal) => format_compact!("{whole}.{decimal}%"),
    }
}
