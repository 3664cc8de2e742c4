//! # Name Chains
//!
//! Ordered labels identifying where a logger sits in the application.
//!
//! A chain is built once and never mutated. Deriving a child copies the
//! parent's segments and appends the new ones, so parent and child share no
//! mutable state and no child can reach back into its ancestors.

use std::fmt;
use std::sync::Arc;

/// Immutable ordered sequence of name segments
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameChain
{
    segments: Arc<[String]>,
}

impl NameChain
{
    /// The empty chain of a root logger
    #[must_use]
    pub fn root() -> Self
    {
        Self::default()
    }

    /// Build a chain from segments in order
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// A new chain equal to this one with `names` appended
    ///
    /// ```rust
    /// use quill_core::NameChain;
    ///
    /// let nested = NameChain::root().child(["x"]).child(["y"]);
    /// assert_eq!(nested, NameChain::root().child(["x", "y"]));
    /// ```
    #[must_use]
    pub fn child<I, S>(&self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: self
                .segments
                .iter()
                .cloned()
                .chain(names.into_iter().map(Into::into))
                .collect(),
        }
    }

    /// The segments in order
    #[must_use]
    pub fn segments(&self) -> &[String]
    {
        &self.segments
    }

    /// Number of segments
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.segments.len()
    }

    /// Whether this is a root chain
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.segments.is_empty()
    }

    /// Render as adjacent bracketed segments, `[a][b]`
    #[must_use]
    pub fn render(&self) -> String
    {
        self.to_string()
    }
}

impl Default for NameChain
{
    fn default() -> Self
    {
        Self {
            segments: Arc::from(Vec::new()),
        }
    }
}

impl fmt::Display for NameChain
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        for segment in self.segments.iter() {
            write!(f, "[{segment}]")?;
        }
        Ok(())
    }
}

impl<S: Into<String>> FromIterator<S> for NameChain
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self
    {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_root_renders_nothing()
    {
        assert_eq!(NameChain::root().render(), "");
        assert!(NameChain::root().is_empty());
    }

    #[test]
    fn test_render_has_no_separators()
    {
        assert_eq!(NameChain::new(["a", "b"]).render(), "[a][b]");
    }

    #[test]
    fn test_child_does_not_touch_parent()
    {
        let parent = NameChain::new(["server"]);
        let child = parent.child(["http"]);
        assert_eq!(parent.segments(), ["server"]);
        assert_eq!(child.segments(), ["server", "http"]);
    }

    #[test]
    fn test_child_composition_is_associative()
    {
        let stepwise = NameChain::root().child(["x"]).child(["y"]).child(["z"]);
        let direct = NameChain::root().child(["x", "y", "z"]);
        let mixed = NameChain::root().child(["x", "y"]).child(["z"]);
        assert_eq!(stepwise, direct);
        assert_eq!(mixed, direct);
    }

    #[test]
    fn test_display_matches_render()
    {
        let chain = NameChain::new(["db", "pool"]);
        assert_eq!(chain.to_string(), chain.render());
    }
}
