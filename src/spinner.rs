//! Indeterminate spinners.
//!
//! Rendering never changes the frame; [`Spinner::next`] is the only mutator, and the
//! live engine calls it once per tick.

use std::time::Duration;

use compact_str::{CompactString, format_compact};
use unicode_width::UnicodeWidthStr;

use crate::{
    segment::{Measurement, Segment, Segments},
    style::Style,
};

/// Braille dots (the default).
pub const DOTS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
/// ASCII line.
pub const LINE: &[&str] = &["-", "\\", "|", "/"];
/// Quarter arcs.
pub const ARC: &[&str] = &["◜", "◠", "◝", "◞", "◡", "◟"];
/// Rotating arrow.
pub const ARROW: &[&str] = &["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"];
/// Half-filled circle.
pub const CIRCLE: &[&str] = &["◐", "◓", "◑", "◒"];
/// Single bouncing dot.
pub const BOUNCE: &[&str] = &["⠁", "⠂", "⠄", "⡀", "⢀", "⠠", "⠐", "⠈"];
/// Quadrant block.
pub const BOX_BOUNCE: &[&str] = &["▖", "▘", "▝", "▗"];
/// ASCII line, clockwise.
pub const SIMPLE: &[&str] = &["|", "/", "-", "\\"];
/// Vertical bar growing and shrinking.
pub const GROW_VERTICAL: &[&str] = &["▁", "▃", "▄", "▅", "▆", "▇", "▆", "▅", "▄", "▃"];
/// Horizontal bar growing and shrinking.
pub const GROW_HORIZONTAL: &[&str] = &[
    "▏", "▎", "▍", "▌", "▋", "▊", "▉", "▊", "▋", "▌", "▍", "▎",
];

/// Default time between frames.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(80);

/// An animated indicator for work of unknown length.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Spinner {
    frames: Vec<CompactString>,
    frame_index: usize,
    interval: Duration,
    style: Style,
    description: CompactString,
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new(DOTS.iter().copied())
    }
}

impl Spinner {
    /// Creates a spinner cycling through `frames`. An empty list falls back to [`DOTS`].
    #[must_use]
    pub fn new<I, S>(frames: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        let mut frames: Vec<CompactString> = frames.into_iter().map(Into::into).collect();
        if frames.is_empty() {
            frames = DOTS.iter().map(|f| CompactString::from(*f)).collect();
        }
        Self {
            frames,
            frame_index: 0,
            interval: DEFAULT_INTERVAL,
            style: Style::new(),
            description: CompactString::default(),
        }
    }

    /// Sets the text shown after the glyph.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<CompactString>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the style of the glyph.
    #[must_use]
    pub const fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the preferred time between frames.
    ///
    /// The live engine advances spinners once per refresh; this is advisory metadata
    /// for callers choosing a refresh interval.
    #[must_use]
    pub const fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Advances exactly one frame, wrapping after the last.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) {
        self.frame_index = (self.frame_index + 1) % self.frames.len();
    }

    /// The glyph currently showing.
    #[must_use]
    pub fn current_frame(&self) -> &str {
        &self.frames[self.frame_index]
    }

    /// Index of the glyph currently showing.
    #[must_use]
    pub const fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Number of frames in the cycle.
    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// The preferred time between frames.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// The description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Renders the current frame followed by the description.
    ///
    /// The available width is accepted for symmetry with bars; spinners do not resize.
    #[must_use]
    pub fn render(&self, _available: usize) -> Segments {
        let mut segments = Segments::new();
        segments.push(Segment::new(self.current_frame(), self.style));
        if !self.description.is_empty() {
            segments.push(Segment::plain(format_compact!(" {}", self.description)));
        }
        segments
    }

    /// Line width of this spinner, which is the same at every frame.
    #[must_use]
    pub fn measure(&self) -> Measurement {
        let frame = self.frames.iter().map(|f| f.width()).max().unwrap_or(0);
        let desc = match self.description.width() {
            0 => 0,
            w => w + 1,
        };
        Measurement {
            minimum: frame + desc,
            maximum: frame + desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::{ARC, CIRCLE, DOTS, LINE, SIMPLE, Spinner};
    use crate::style::{Color, ColorMode, Style};

    /// Empty Frames
    /// Falls back to the dots animation.
    #[test]
    fn test_empty_frames() {
        let spinner = Spinner::new(Vec::<&str>::new());
        assert_eq!(spinner.frame_count(), DOTS.len());
        assert_eq!(spinner.current_frame(), DOTS[0]);
    }

    /// Frame Wrapping
    #[test]
    fn test_next_wraps() {
        let mut spinner = Spinner::new(LINE.iter().copied());
        let seen: Vec<String> = (0..5)
            .map(|_| {
                let frame = spinner.current_frame().to_owned();
                spinner.next();
                frame
            })
            .collect();

        assert_eq!(seen, ["-", "\\", "|", "/", "-"]);
    }

    /// Render Is Pure
    /// Rendering twice shows the same frame; only `next` moves it.
    #[test]
    fn test_render() {
        let mut spinner = Spinner::new(SIMPLE.iter().copied())
            .with_description("Loading")
            .with_style(Style::new().fg(Color::Cyan));

        assert_eq!(spinner.render(80).plain(), "| Loading");
        assert_eq!(spinner.render(80).plain(), "| Loading");
        spinner.next();
        assert_eq!(
            spinner.render(80).to_escape(ColorMode::Standard),
            "\x1b[36m/\x1b[0m Loading"
        );

        let bare = Spinner::new(ARC.iter().copied());
        assert_eq!(bare.render(80).plain(), "◜");
    }

    /// Measurement
    #[test]
    fn test_measure() {
        let m = Spinner::new(CIRCLE.iter().copied())
            .with_description("wait")
            .measure();
        assert_eq!(m.minimum, m.maximum);
        assert_eq!(m.minimum, 1 + 5);
    }

    proptest! {
        /// Cyclic Frames
        /// `len(frames)` calls to `next` return to the starting frame.
        #[test]
        fn prop_next_is_cyclic(len in 1usize..32, start in 0usize..64) {
            let frames: Vec<String> = (0..len).map(|i| i.to_string()).collect();
            let mut spinner = Spinner::new(frames);
            for _ in 0..start {
                spinner.next();
            }
            let before = spinner.frame_index();
            for _ in 0..len {
                spinner.next();
            }
            prop_assert_eq!(spinner.frame_index(), before);
            prop_assert!(spinner.frame_index() < len);
        }
    }
}
