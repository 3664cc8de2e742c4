//! # Colors
//!
//! Per-level rendering strategies for colorized sinks.
//!
//! A [`ColorMap`] assigns a [`ColorStyle`] to each level. The style is
//! applied to the fully assembled line (timestamp, tags, body), so a
//! colorized line and its plain twin differ only by the wrapping codes.
//! Levels without an entry render through [`ColorStyle::Plain`].

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::level::Level;

/// ANSI escape codes available to [`ColorStyle::Ansi`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnsiColor
{
    Reset,
    Bright,
    Dim,
    Underscore,
    Blink,
    Reverse,
    Hidden,

    FgBlack,
    FgRed,
    FgGreen,
    FgYellow,
    FgBlue,
    FgMagenta,
    FgCyan,
    FgWhite,

    BgBlack,
    BgRed,
    BgGreen,
    BgYellow,
    BgBlue,
    BgMagenta,
    BgCyan,
    BgWhite,
}

impl AnsiColor
{
    /// The raw escape sequence
    #[must_use]
    pub const fn code(self) -> &'static str
    {
        match self {
            AnsiColor::Reset => "\x1b[0m",
            AnsiColor::Bright => "\x1b[1m",
            AnsiColor::Dim => "\x1b[2m",
            AnsiColor::Underscore => "\x1b[4m",
            AnsiColor::Blink => "\x1b[5m",
            AnsiColor::Reverse => "\x1b[7m",
            AnsiColor::Hidden => "\x1b[8m",

            AnsiColor::FgBlack => "\x1b[30m",
            AnsiColor::FgRed => "\x1b[31m",
            AnsiColor::FgGreen => "\x1b[32m",
            AnsiColor::FgYellow => "\x1b[33m",
            AnsiColor::FgBlue => "\x1b[34m",
            AnsiColor::FgMagenta => "\x1b[35m",
            AnsiColor::FgCyan => "\x1b[36m",
            AnsiColor::FgWhite => "\x1b[37m",

            AnsiColor::BgBlack => "\x1b[40m",
            AnsiColor::BgRed => "\x1b[41m",
            AnsiColor::BgGreen => "\x1b[42m",
            AnsiColor::BgYellow => "\x1b[43m",
            AnsiColor::BgBlue => "\x1b[44m",
            AnsiColor::BgMagenta => "\x1b[45m",
            AnsiColor::BgCyan => "\x1b[46m",
            AnsiColor::BgWhite => "\x1b[47m",
        }
    }
}

/// User-supplied line painter
pub type PaintFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// How a line is colored
#[derive(Clone, Default)]
pub enum ColorStyle
{
    /// Leave the line untouched
    #[default]
    Plain,
    /// Prefix with an ANSI code and terminate with a reset
    Ansi(AnsiColor),
    /// Arbitrary transformation of the whole line
    Custom(PaintFn),
}

impl ColorStyle
{
    /// Build a custom style from a closure
    pub fn custom(paint: impl Fn(&str) -> String + Send + Sync + 'static) -> Self
    {
        ColorStyle::Custom(Arc::new(paint))
    }

    /// Apply the style to an assembled line
    #[must_use]
    pub fn paint(&self, line: &str) -> String
    {
        match self {
            ColorStyle::Plain => line.to_string(),
            ColorStyle::Ansi(color) => format!("{}{line}{}", color.code(), AnsiColor::Reset.code()),
            ColorStyle::Custom(paint) => paint(line),
        }
    }
}

impl fmt::Debug for ColorStyle
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match self {
            ColorStyle::Plain => f.write_str("Plain"),
            ColorStyle::Ansi(color) => f.debug_tuple("Ansi").field(color).finish(),
            ColorStyle::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl From<AnsiColor> for ColorStyle
{
    fn from(color: AnsiColor) -> Self
    {
        ColorStyle::Ansi(color)
    }
}

/// Mapping from level to color style
#[derive(Debug, Clone)]
pub struct ColorMap
{
    styles: HashMap<Level, ColorStyle>,
}

impl ColorMap
{
    /// A map with no entries; every level renders plain
    #[must_use]
    pub fn empty() -> Self
    {
        Self { styles: HashMap::new() }
    }

    /// Set the style for a level, returning the map for chaining
    #[must_use]
    pub fn with(mut self, level: impl Into<Level>, style: impl Into<ColorStyle>) -> Self
    {
        self.insert(level, style);
        self
    }

    /// Set the style for a level
    pub fn insert(&mut self, level: impl Into<Level>, style: impl Into<ColorStyle>)
    {
        self.styles.insert(level.into(), style.into());
    }

    /// Style for `level`, if one is set
    #[must_use]
    pub fn style(&self, level: &Level) -> Option<&ColorStyle>
    {
        self.styles.get(level)
    }

    /// Color `line` with the style registered for `level`
    ///
    /// Missing entries leave the line unchanged.
    #[must_use]
    pub fn paint(&self, level: &Level, line: &str) -> String
    {
        match self.styles.get(level) {
            Some(style) => style.paint(line),
            None => line.to_string(),
        }
    }
}

impl Default for ColorMap
{
    fn default() -> Self
    {
        Self::empty()
            .with(Level::Error, AnsiColor::FgRed)
            .with(Level::Warn, AnsiColor::FgYellow)
            .with(Level::Info, AnsiColor::FgGreen)
            .with(Level::Debug, AnsiColor::FgCyan)
    }
}
