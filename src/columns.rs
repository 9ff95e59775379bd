//! Composable columns for bar tasks.
//!
//! A bar registered with [`Registry::add_with_columns`](crate::Registry::add_with_columns)
//! is drawn as a row of [`Column`]s instead of the default
//! `description bar percentage` layout. Columns see both the bar and the task's
//! [`RateTracker`], so speed, ETA and elapsed time can sit next to the bar.

use std::{fmt, sync::Arc, time::Duration};

use compact_str::{CompactString, format_compact};

use crate::{
    bar::{Bar, COMPLETE_GLYPH, REMAINING_GLYPH, format_percentage, glyph_runs},
    segment::{Segment, Segments},
    style::Style,
    tracker::RateTracker,
};

/// One cell of a column layout.
pub trait Column: Send + Sync {
    /// Renders this column for `bar`.
    fn render(&self, bar: &Bar, tracker: &RateTracker) -> Segments;

    /// Columns this cell occupies; shorter output is padded to it.
    fn width(&self, bar: &Bar) -> usize;
}

/// An ordered, shareable set of columns joined by single spaces.
#[derive(Clone)]
pub struct Columns(Arc<[Box<dyn Column>]>);

impl fmt::Debug for Columns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Columns")
            .field("count", &self.0.len())
            .finish()
    }
}

impl Columns {
    /// Creates a layout from `columns`, rendered left to right.
    #[must_use]
    pub fn new(columns: Vec<Box<dyn Column>>) -> Self {
        Self(columns.into())
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the layout has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Renders every column, padding all but the last to its nominal width.
    #[must_use]
    pub fn render(&self, bar: &Bar, tracker: &RateTracker) -> Segments {
        let mut line = Segments::new();
        let last = self.0.len().saturating_sub(1);

        for (i, column) in self.0.iter().enumerate() {
            if i > 0 {
                line.push(Segment::plain(" "));
            }
            let cell = column.render(bar, tracker);
            let pad = column.width(bar).saturating_sub(cell.width());
            line.extend(cell);
            if i < last && pad > 0 {
                line.push(Segment::plain(" ".repeat(pad)));
            }
        }
        line
    }
}

/// The bar's description.
#[derive(Clone, Debug, Default)]
pub struct DescriptionColumn {
    style: Style,
}

impl DescriptionColumn {
    /// Creates an unstyled description column.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text style.
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl Column for DescriptionColumn {
    fn render(&self, bar: &Bar, _tracker: &RateTracker) -> Segments {
        if bar.description().is_empty() {
            return Segments::new();
        }
        [Segment::new(bar.description(), self.style)]
            .into_iter()
            .collect()
    }

    fn width(&self, bar: &Bar) -> usize {
        unicode_width::UnicodeWidthStr::width(bar.description())
    }
}

/// A fixed-width glyph bar.
#[derive(Clone, Debug)]
pub struct BarColumn {
    width: usize,
    complete_glyph: CompactString,
    remaining_glyph: CompactString,
    complete_style: Style,
    remaining_style: Style,
}

impl Default for BarColumn {
    fn default() -> Self {
        Self {
            width: 40,
            complete_glyph: COMPLETE_GLYPH.into(),
            remaining_glyph: REMAINING_GLYPH.into(),
            complete_style: Style::new(),
            remaining_style: Style::new(),
        }
    }
}

impl BarColumn {
    /// Creates a 40-column bar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the width in columns.
    #[must_use]
    pub const fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    /// Sets the glyph of the completed portion.
    #[must_use]
    pub fn with_complete_glyph(mut self, glyph: impl Into<CompactString>) -> Self {
        self.complete_glyph = glyph.into();
        self
    }

    /// Sets the glyph of the remaining portion.
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
}

impl Column for BarColumn {
    fn render(&self, bar: &Bar, _tracker: &RateTracker) -> Segments {
        glyph_runs(
            self.width,
            bar.percentage(),
            (self.complete_glyph.as_str(), self.complete_style),
            (self.remaining_glyph.as_str(), self.remaining_style),
        )
    }

    fn width(&self, _bar: &Bar) -> usize {
        self.width
    }
}

macro_rules! text_column {
    ($(#[$doc:meta])* $name:ident, $width:expr, |$bar:ident, $tracker:ident| $text:expr) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Default)]
        pub struct $name {
            style: Style,
        }

        impl $name {
            /// Creates an unstyled column.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Sets the text style.
            #[must_use]
            pub const fn with_style(mut self, style: Style) -> Self {
                self.style = style;
                self
            }
        }

        impl Column for $name {
            fn render(&self, $bar: &Bar, $tracker: &RateTracker) -> Segments {
                [Segment::new($text, self.style)].into_iter().collect()
            }

            fn width(&self, _bar: &Bar) -> usize {
                $width
            }
        }
    };
}

text_column!(
    /// Completion percentage, e.g. `42.5%`.
    PercentageColumn, 5, |bar, _tracker| format_percentage(bar.percentage())
);

text_column!(
    /// Bytes per second in binary units, e.g. `1.5 MB/s`.
    TransferSpeedColumn, 12, |_bar, tracker| format_transfer_speed(tracker.rate())
);

text_column!(
    /// Estimated time remaining, e.g. `3m 12s`.
    EtaColumn, 10, |bar, tracker| format_duration(tracker.eta(bar.current(), bar.total()))
);

text_column!(
    /// Time since the task was registered, stopping when it completes.
    ElapsedColumn, 10, |_bar, tracker| format_duration(tracker.elapsed())
);

/// Items per second with a unit suffix, e.g. `12.5 it/s`.
#[derive(Clone, Debug)]
pub struct SpeedColumn {
    style: Style,
    unit: CompactString,
}

impl Default for SpeedColumn {
    fn default() -> Self {
        Self {
            style: Style::new(),
            unit: CompactString::const_new("it"),
        }
    }
}

impl SpeedColumn {
    /// Creates a column counting `it/s`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the text style.
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the unit shown before `/s`.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<CompactString>) -> Self {
        self.unit = unit.into();
        self
    }
}

impl Column for SpeedColumn {
    fn render(&self, _bar: &Bar, tracker: &RateTracker) -> Segments {
        [Segment::new(
            format_speed(tracker.rate(), &self.unit),
            self.style,
        )]
        .into_iter()
        .collect()
    }

    fn width(&self, _bar: &Bar) -> usize {
        12
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn tenths(value: f64) -> (u64, u64) {
    let tenths = (value * 10.0 + 0.5) as u64;
    (tenths / 10, tenths % 10)
}

/// Formats a rate to one decimal place, e.g. `12.5 it/s`.
#[must_use]
pub fn format_speed(per_second: f64, unit: &str) -> CompactString {
    match tenths(per_second) {
        (whole, 0) => format_compact!("{whole} {unit}/s"),
        (whole, decimal) => format_compact!("{whole}.{decimal} {unit}/s"),
    }
}

/// Formats bytes per second with 1024-based units up to TB/s.
///
/// One decimal is kept below 100 of a unit, e.g. `1.5 KB/s` but `512 KB/s`.
#[must_use]
pub fn format_transfer_speed(bytes_per_second: f64) -> CompactString {
    const UNITS: [&str; 5] = ["B/s", "KB/s", "MB/s", "GB/s", "TB/s"];

    let mut value = bytes_per_second.max(0.0);
    let mut unit = 0;
    while unit < UNITS.len() - 1 && value >= 1024.0 {
        value /= 1024.0;
        unit += 1;
    }

    match tenths(value) {
        (whole, decimal) if decimal > 0 && whole < 100 => {
            format_compact!("{whole}.{decimal} {}", UNITS[unit])
        }
        (whole, _) => format_compact!("{whole} {}", UNITS[unit]),
    }
}

/// Formats a duration coarsely: `45s`, `3m 12s`, or `2h 5m`.
#[must_use]
pub fn format_duration(duration: Duration) -> CompactString {
    let secs = duration.as_secs();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    if hours > 0 {
        format_compact!("{hours}h {minutes}m")
    } else if minutes > 0 {
        format_compact!("{minutes}m {seconds}s")
    } else {
        format_compact!("{seconds}s")
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{
        BarColumn, Column, Columns, DescriptionColumn, EtaColumn, PercentageColumn,
        SpeedColumn, format_duration, format_speed, format_transfer_speed,
    };
    use crate::{bar::Bar, tracker::RateTracker};

    /// Speed Formatting
    #[test]
    fn test_format_speed() {
        assert_eq!(format_speed(0.0, "it"), "0 it/s");
        assert_eq!(format_speed(12.34, "it"), "12.3 it/s");
        assert_eq!(format_speed(7.0, "files"), "7 files/s");
        assert_eq!(format_speed(-3.0, "it"), "0 it/s");
    }

    /// Transfer Speed Formatting
    #[test]
    fn test_format_transfer_speed() {
        assert_eq!(format_transfer_speed(0.0), "0 B/s");
        assert_eq!(format_transfer_speed(512.0), "512 B/s");
        assert_eq!(format_transfer_speed(1536.0), "1.5 KB/s");
        assert_eq!(format_transfer_speed(150.0 * 1024.0 * 1024.0), "150 MB/s");
        assert_eq!(
            format_transfer_speed(2.0 * 1024f64.powi(5)),
            "2048 TB/s"
        );
    }

    /// Duration Formatting
    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::ZERO), "0s");
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
        assert_eq!(format_duration(Duration::from_secs(192)), "3m 12s");
        assert_eq!(format_duration(Duration::from_secs(2 * 3600 + 301)), "2h 5m");
    }

    /// Column Layout
    /// Columns are space-joined and padded to their nominal width, except the last.
    #[test]
    fn test_columns_render() {
        let mut bar = Bar::new(10).with_description("dl");
        bar.set_position(5);
        let tracker = RateTracker::new();

        let columns = Columns::new(vec![
            Box::new(DescriptionColumn::new()),
            Box::new(
                BarColumn::new()
                    .with_width(4)
                    .with_complete_glyph("#")
                    .with_remaining_glyph("-"),
            ),
            Box::new(PercentageColumn::new()),
            Box::new(SpeedColumn::new().with_unit("B")),
        ]);

        assert_eq!(columns.len(), 4);
        assert_eq!(columns.render(&bar, &tracker).plain(), "dl ##-- 50%   0 B/s");
    }

    /// ETA Without Data
    #[test]
    fn test_eta_column_no_data() {
        let bar = Bar::new(10);
        let tracker = RateTracker::new();
        let cell = EtaColumn::new().render(&bar, &tracker);

        assert_eq!(cell.plain(), "0s");
        assert_eq!(EtaColumn::new().width(&bar), 10);
    }
}
