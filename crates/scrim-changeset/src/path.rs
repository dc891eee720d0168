//! Dotted property paths for navigating nested content.
//!
//! A path is a sequence of key segments addressing a (possibly nested)
//! property, e.g. `user.name`. The staging buffer never stores arrays as
//! intermediate nodes, so segments are plain keys; the default accessor
//! interprets numeric segments as array indices when reading content.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dotted property path.
///
/// Paths are immutable sequences of key segments. They parse from dotted
/// strings and display back in the same form.
///
/// # Examples
///
/// ```
/// use scrim_changeset::Path;
///
/// let path = Path::from("user.name");
/// assert_eq!(path.len(), 2);
/// assert_eq!(path.to_string(), "user.name");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
    /// Create an empty path (root).
    #[inline]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from a vector of segments.
    #[inline]
    pub fn from_segments(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Append a key segment and return self (builder pattern).
    #[inline]
    pub fn key(mut self, k: impl Into<String>) -> Self {
        self.0.push(k.into());
        self
    }

    /// Push a key segment onto the path (mutating).
    #[inline]
    pub fn push(&mut self, k: impl Into<String>) {
        self.0.push(k.into());
    }

    /// Append a single raw key and return a new path.
    ///
    /// Unlike `From<&str>`, the key is taken verbatim and never split on dots.
    #[inline]
    pub fn child(&self, key: impl Into<String>) -> Path {
        let mut result = self.clone();
        result.0.push(key.into());
        result
    }

    /// Get the segments of this path.
    #[inline]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Check if this path is empty (root).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the number of segments in this path.
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Get the first segment.
    #[inline]
    pub fn first(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Get the last segment.
    #[inline]
    pub fn last(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    /// Split off the first segment, returning it together with the rest.
    ///
    /// Returns `None` for the root path.
    #[inline]
    pub fn split_first(&self) -> Option<(&str, Path)> {
        let (first, rest) = self.0.split_first()?;
        Some((first.as_str(), Path(rest.to_vec())))
    }

    /// Join this path with another path.
    #[inline]
    pub fn join(&self, other: &Path) -> Path {
        let mut result = self.clone();
        result.0.extend(other.0.iter().cloned());
        result
    }

    /// Get the parent path (path without the last segment).
    #[inline]
    pub fn parent(&self) -> Option<Path> {
        if self.0.is_empty() {
            None
        } else {
            Some(Path(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Check if this path is a prefix of another path.
    ///
    /// A path is a prefix of itself.
    #[inline]
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        other.0.starts_with(&self.0)
    }

    /// Iterate over the segments.
    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for seg in &self.0 {
            if !first {
                write!(f, ".")?;
            }
            write!(f, "{seg}")?;
            first = false;
        }
        Ok(())
    }
}

impl From<&str> for Path {
    /// Parse a dotted path string. Empty segments are skipped.
    fn from(s: &str) -> Self {
        Path(
            s.split('.')
                .filter(|seg| !seg.is_empty())
                .map(str::to_owned)
                .collect(),
        )
    }
}

impl From<String> for Path {
    fn from(s: String) -> Self {
        Path::from(s.as_str())
    }
}

impl From<&String> for Path {
    fn from(s: &String) -> Self {
        Path::from(s.as_str())
    }
}

impl From<&Path> for Path {
    fn from(p: &Path) -> Self {
        p.clone()
    }
}

impl FromIterator<String> for Path {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Path(iter.into_iter().collect())
    }
}

impl IntoIterator for Path {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Path {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Construct a `Path` from a sequence of raw key segments.
///
/// Segments are taken verbatim, never split on dots.
///
/// # Examples
///
/// ```
/// use scrim_changeset::path;
///
/// let p = path!("user", "name");
/// assert_eq!(p.to_string(), "user.name");
/// ```
#[macro_export]
macro_rules! path {
    () => {
        $crate::Path::root()
    };
    ($($seg:expr),+ $(,)?) => {{
        let mut p = $crate::Path::root();
        $(
            p.push($seg);
        )+
        p
    }};
}
