//! Styled text segments, the common output of every indicator.

use compact_str::CompactString;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::style::{ColorMode, Style};

/// SGR 0: reset all attributes.
const RESET: &str = "\x1b[0m";

/// A run of text sharing one style.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Segment {
    /// The text content.
    pub text: CompactString,
    /// The style applied to the text.
    pub style: Style,
}

impl Segment {
    /// Creates a styled segment.
    pub fn new(text: impl Into<CompactString>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    /// Creates an unstyled segment.
    pub fn plain(text: impl Into<CompactString>) -> Self {
        Self::new(text, Style::new())
    }
}

/// An ordered list of [`Segment`]s making up one line of output.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Segments(pub Vec<Segment>);

impl Segments {
    /// Creates an empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a segment.
    pub fn push(&mut self, segment: Segment) {
        self.0.push(segment);
    }

    /// Appends every segment of `other`.
    pub fn extend(&mut self, other: Self) {
        self.0.extend(other.0);
    }

    /// Returns `true` if there are no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over the segments.
    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.0.iter()
    }

    /// Concatenates the text of all segments without any styling.
    #[must_use]
    pub fn plain(&self) -> String {
        self.0.iter().map(|s| s.text.as_str()).collect()
    }

    /// Returns the display width in terminal columns.
    #[must_use]
    pub fn width(&self) -> usize {
        self.0.iter().map(|s| s.text.width()).sum()
    }

    /// Cuts the line so it occupies at most `max_width` columns.
    ///
    /// Never splits a character; a wide glyph that would straddle the limit is
    /// dropped whole. Styles of the kept text are unchanged.
    pub fn truncate(&mut self, max_width: usize) {
        let mut used = 0;
        for i in 0..self.0.len() {
            let text = &self.0[i].text;
            let mut end = text.len();
            for (idx, ch) in text.char_indices() {
                let w = ch.width().unwrap_or(0);
                if used + w > max_width {
                    end = idx;
                    break;
                }
                used += w;
            }

            if end < self.0[i].text.len() {
                self.0[i].text.truncate(end);
                self.0.truncate(if end == 0 { i } else { i + 1 });
                return;
            }
        }
    }

    /// Serializes the segments to escape-coded text under `mode`.
    ///
    /// Each styled segment is followed by a reset so styles never bleed into the
    /// next segment or the next line.
    #[must_use]
    pub fn to_escape(&self, mode: ColorMode) -> String {
        if mode == ColorMode::None {
            return self.plain();
        }

        let mut out = String::new();
        for segment in &self.0 {
            let escape = segment.style.to_escape(mode);
            out.push_str(&escape);
            out.push_str(&segment.text);
            if !escape.is_empty() {
                out.push_str(RESET);
            }
        }
        out
    }
}

impl FromIterator<Segment> for Segments {
    fn from_iter<T: IntoIterator<Item = Segment>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Segments {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// The narrowest and widest an indicator can usefully be drawn.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Measurement {
    /// Fewest columns the indicator needs.
    pub minimum: usize,
    /// Most columns the indicator will use.
    pub maximum: usize,
}
