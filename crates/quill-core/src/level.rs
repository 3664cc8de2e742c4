//! # Levels
//!
//! Severities and the registry that ranks them.
//!
//! A [`Level`] is one of the four built-in severities or a custom name
//! introduced through [`crate::Quill::set_levels`]. The [`LevelRegistry`]
//! maps each level to a numeric priority where lower numbers are more severe:
//!
//! | Level | Priority |
//! |-------|----------|
//! | error | 0        |
//! | warn  | 1        |
//! | info  | 2        |
//! | debug | 3        |
//!
//! The registry is replaced wholesale, never merged. A call site bound to a
//! level that no longer exists keeps working: the event renders with its
//! literal tag and skips threshold filtering.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Severity of a log event
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Level
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level
    Info,
    /// Debug level
    Debug,
    /// A level introduced by a replacement registry (stored lowercased)
    Custom(String),
}

impl Level
{
    /// Lowercase name of the level, as used for registry and color lookups
    #[must_use]
    pub fn as_str(&self) -> &str
    {
        match self {
            Level::Error => "error",
            Level::Warn => "warn",
            Level::Info => "info",
            Level::Debug => "debug",
            Level::Custom(name) => name,
        }
    }

    /// Uppercased tag rendered between brackets in every line
    ///
    /// ```rust
    /// use quill_core::Level;
    ///
    /// assert_eq!(Level::Warn.tag(), "WARN");
    /// assert_eq!(Level::from("audit").tag(), "AUDIT");
    /// ```
    #[must_use]
    pub fn tag(&self) -> String
    {
        self.as_str().to_uppercase()
    }

    /// Whether this is one of the four built-in severities
    #[must_use]
    pub fn is_builtin(&self) -> bool
    {
        !matches!(self, Level::Custom(_))
    }
}

impl fmt::Display for Level
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level
{
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        let name = s.trim().to_lowercase();
        Ok(match name.as_str() {
            "error" => Level::Error,
            "warn" => Level::Warn,
            "info" => Level::Info,
            "debug" => Level::Debug,
            _ => Level::Custom(name),
        })
    }
}

impl From<&str> for Level
{
    fn from(s: &str) -> Self
    {
        match s.parse() {
            Ok(level) => level,
            Err(never) => match never {},
        }
    }
}

impl From<String> for Level
{
    fn from(s: String) -> Self
    {
        Level::from(s.as_str())
    }
}

/// Mapping from level to numeric priority (lower = more severe)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelRegistry
{
    priorities: HashMap<Level, u32>,
}

impl LevelRegistry
{
    /// Create an empty registry
    #[must_use]
    pub fn empty() -> Self
    {
        Self {
            priorities: HashMap::new(),
        }
    }

    /// Register (or re-rank) a level, returning the registry for chaining
    #[must_use]
    pub fn with(mut self, level: impl Into<Level>, priority: u32) -> Self
    {
        self.insert(level, priority);
        self
    }

    /// Register (or re-rank) a level
    pub fn insert(&mut self, level: impl Into<Level>, priority: u32)
    {
        self.priorities.insert(level.into(), priority);
    }

    /// Priority of `level`, or `None` if the level is not registered
    #[must_use]
    pub fn priority(&self, level: &Level) -> Option<u32>
    {
        self.priorities.get(level).copied()
    }

    /// Whether `level` is registered
    #[must_use]
    pub fn contains(&self, level: &Level) -> bool
    {
        self.priorities.contains_key(level)
    }

    /// Registered levels ordered from most to least severe
    ///
    /// Ties are broken by name so the order is deterministic.
    #[must_use]
    pub fn levels(&self) -> Vec<(Level, u32)>
    {
        let mut levels: Vec<_> = self.priorities.iter().map(|(l, p)| (l.clone(), *p)).collect();
        levels.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.as_str().cmp(b.0.as_str())));
        levels
    }

    /// Number of registered levels
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.priorities.len()
    }

    /// Whether the registry has no levels
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.priorities.is_empty()
    }

    /// Decide whether an event at `level` passes `threshold`
    ///
    /// An event is suppressed only when both levels are registered and the
    /// event's priority is numerically greater than the threshold's.
    #[must_use]
    pub fn allows(&self, level: &Level, threshold: &Level) -> bool
    {
        match (self.priority(level), self.priority(threshold)) {
            (Some(event), Some(limit)) => event <= limit,
            _ => true,
        }
    }
}

impl Default for LevelRegistry
{
    fn default() -> Self
    {
        Self::empty()
            .with(Level::Error, 0)
            .with(Level::Warn, 1)
            .with(Level::Info, 2)
            .with(Level::Debug, 3)
    }
}

impl<L: Into<Level>> FromIterator<(L, u32)> for LevelRegistry
{
    fn from_iter<I: IntoIterator<Item = (L, u32)>>(iter: I) -> Self
    {
        let mut registry = Self::empty();
        for (level, priority) in iter {
            registry.insert(level, priority);
        }
        registry
    }
}
