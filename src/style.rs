//! Terminal colors and text styles.
//!
//! A [`Style`] is an immutable value: every builder method returns a modified copy.
//! Converting a style to an escape sequence depends on the [`ColorMode`] negotiated
//! with the sink; richer colors are downgraded to the closest color the terminal
//! can show, and [`ColorMode::None`] produces no escape codes at all.

use std::fmt::Write as _;

/// The color capability of an output sink.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum ColorMode {
    /// No styling is emitted.
    #[default]
    None,
    /// The 8 standard ANSI colors.
    Standard,
    /// The 256-color palette.
    Palette256,
    /// 24-bit RGB.
    TrueColor,
}

impl ColorMode {
    /// Detects the color mode from the environment for a stream that is (or is not) a terminal.
    ///
    /// `NO_COLOR` disables colors, non-terminals get no colors, `COLORTERM=truecolor|24bit`
    /// enables RGB, a `TERM` containing `256color` enables the palette, and any other
    /// non-`dumb` `TERM` gets the standard colors.
    #[must_use]
    pub fn detect(is_terminal: bool) -> Self {
        Self::from_env(
            is_terminal,
            std::env::var("NO_COLOR").ok().as_deref(),
            std::env::var("COLORTERM").ok().as_deref(),
            std::env::var("TERM").ok().as_deref(),
        )
    }

    fn from_env(
        is_terminal: bool,
        no_color: Option<&str>,
        colorterm: Option<&str>,
        term: Option<&str>,
    ) -> Self {
        if no_color.is_some_and(|v| !v.is_empty()) || !is_terminal {
            return Self::None;
        }
        if matches!(colorterm, Some("truecolor" | "24bit")) {
            return Self::TrueColor;
        }
        match term {
            Some(t) if t.contains("256color") => Self::Palette256,
            Some(t) if !t.is_empty() && t != "dumb" => Self::Standard,
            _ => Self::None,
        }
    }
}

/// A terminal color.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Color {
    /// Black (SGR 30/40).
    Black,
    /// Red (SGR 31/41).
    Red,
    /// Green (SGR 32/42).
    Green,
    /// Yellow (SGR 33/43).
    Yellow,
    /// Blue (SGR 34/44).
    Blue,
    /// Magenta (SGR 35/45).
    Magenta,
    /// Cyan (SGR 36/46).
    Cyan,
    /// White (SGR 37/47).
    White,
    /// An index into the 256-color palette.
    Palette(u8),
    /// A 24-bit color.
    Rgb(u8, u8, u8),
}

impl Color {
    fn standard_index(self) -> u8 {
        match self {
            Self::Black => 0,
            Self::Red => 1,
            Self::Green => 2,
            Self::Yellow => 3,
            Self::Blue => 4,
            Self::Magenta => 5,
            Self::Cyan => 6,
            Self::White => 7,
            Self::Palette(n) => palette_to_standard(n),
            Self::Rgb(r, g, b) => palette_to_standard(rgb_to_palette(r, g, b)),
        }
    }

    fn write_escape(self, mode: ColorMode, foreground: bool, out: &mut String) {
        let base = if foreground { 30 } else { 40 };
        let extended = if foreground { 38 } else { 48 };
        match (mode, self) {
            (ColorMode::None, _) => {}
            (ColorMode::TrueColor, Self::Rgb(r, g, b)) => {
                let _ = write!(out, "\x1b[{extended};2;{r};{g};{b}m");
            }
            (ColorMode::TrueColor | ColorMode::Palette256, Self::Palette(n)) => {
                let _ = write!(out, "\x1b[{extended};5;{n}m");
            }
            (ColorMode::Palette256, Self::Rgb(r, g, b)) => {
                let n = rgb_to_palette(r, g, b);
                let _ = write!(out, "\x1b[{extended};5;{n}m");
            }
            _ => {
                let code = base + u32::from(self.standard_index());
                let _ = write!(out, "\x1b[{code}m");
            }
        }
    }
}

fn palette_to_standard(n: u8) -> u8 {
    match n {
        0..=15 => n % 8,
        232..=243 => 0,
        244..=255 => 7,
        _ => {
            let n = n - 16;
            let (r, g, b) = (n / 36, (n % 36) / 6, n % 6);
            u8::from(r >= 3) | (u8::from(g >= 3) << 1) | (u8::from(b >= 3) << 2)
        }
    }
}

fn rgb_to_palette(r: u8, g: u8, b: u8) -> u8 {
    if r == g && g == b {
        return match r {
            0..=7 => 16,
            249..=255 => 231,
            _ => 232 + ((u16::from(r) - 8) * 24 / 241) as u8,
        };
    }
    let scale = |c: u8| (u16::from(c) * 5 / 255) as u8;
    16 + 36 * scale(r) + 6 * scale(g) + scale(b)
}

/// An immutable text style: optional colors plus attributes.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Style {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    dim: bool,
    italic: bool,
    underline: bool,
    reverse: bool,
    strikethrough: bool,
}

impl Style {
    /// Creates an empty style.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fg: None,
            bg: None,
            bold: false,
            dim: false,
            italic: false,
            underline: false,
            reverse: false,
            strikethrough: false,
        }
    }

    /// Sets the foreground color.
    #[must_use]
    pub const fn fg(mut self, color: Color) -> Self {
        self.fg = Some(color);
        self
    }

    /// Sets the background color.
    #[must_use]
    pub const fn bg(mut self, color: Color) -> Self {
        self.bg = Some(color);
        self
    }

    /// Enables bold.
    #[must_use]
    pub const fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Enables dim.
    #[must_use]
    pub const fn dim(mut self) -> Self {
        self.dim = true;
        self
    }

    /// Enables italic.
    #[must_use]
    pub const fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    /// Enables underline.
    #[must_use]
    pub const fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    /// Enables reverse video.
    #[must_use]
    pub const fn reverse(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Enables strikethrough.
    #[must_use]
    pub const fn strikethrough(mut self) -> Self {
        self.strikethrough = true;
        self
    }

    /// Returns `true` if the style carries no colors and no attributes.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        *self == Self::new()
    }

    /// Returns the escape sequence that switches the terminal to this style.
    ///
    /// The result is empty for [`ColorMode::None`] and for plain styles.
    #[must_use]
    pub fn to_escape(&self, mode: ColorMode) -> String {
        let mut out = String::new();
        if mode == ColorMode::None {
            return out;
        }

        let attrs = [
            (self.bold, 1),
            (self.dim, 2),
            (self.italic, 3),
            (self.underline, 4),
            (self.reverse, 7),
            (self.strikethrough, 9),
        ];
        let mut codes = attrs.iter().filter(|(on, _)| *on).map(|(_, code)| code);
        if let Some(first) = codes.next() {
            let _ = write!(out, "\x1b[{first}");
            for code in codes {
                let _ = write!(out, ";{code}");
            }
            out.push('m');
        }

        if let Some(fg) = self.fg {
            fg.write_escape(mode, true, &mut out);
        }
        if let Some(bg) = self.bg {
            bg.write_escape(mode, false, &mut out);
        }
        out
    }
}
