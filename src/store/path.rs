use crate::error::{Result, SyncError};
use std::{fmt, str::FromStr};

/// Characters the realtime backend refuses inside a single path segment
pub const FORBIDDEN_CHARS: [char; 6] = ['.', '#', '$', '[', ']', '/'];

/// Checks whether `segment` can be used as one component of a [`StorePath`]
pub fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && !segment
            .chars()
            .any(|c| FORBIDDEN_CHARS.contains(&c) || c.is_ascii_control())
}

/// A slash-delimited location in the store's hierarchical namespace
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorePath {
    segments: Vec<String>,
}

impl StorePath {
    /// The root of the namespace
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a path like `clipboards/naw12345/items`
    ///
    /// Empty segments produced by leading, trailing, or doubled slashes are ignored.
    pub fn parse(path: &str) -> Result<Self> {
        let mut out = Self::root();
        for segment in path.split('/').filter(|s| !s.is_empty()) {
            out = out.child(segment)?;
        }
        Ok(out)
    }

    /// Returns a new path one level below this one
    pub fn child(&self, segment: &str) -> Result<Self> {
        if !is_valid_segment(segment) {
            return Err(SyncError::InvalidPath(segment.to_string()));
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// The last segment, or `None` for the root
    pub fn key(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// True when `other` equals this path or lies below it
    pub fn contains(&self, other: &StorePath) -> bool {
        other.segments.starts_with(&self.segments)
    }

    /// True when a write at `self` can change the subtree at `other` or vice versa
    pub fn overlaps(&self, other: &StorePath) -> bool {
        self.contains(other) || other.contains(self)
    }
}

impl FromStr for StorePath {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for StorePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_empty_segments() {
        let path = StorePath::parse("/clipboards//naw12345/items/").unwrap();
        assert_eq!(path.segments(), &["clipboards", "naw12345", "items"]);
        assert_eq!(path.to_string(), "/clipboards/naw12345/items");
        assert_eq!(path.key(), Some("items"));
    }

    #[test]
    fn test_forbidden_segments() {
        for bad in ["a.b", "a#b", "a$b", "a[b", "a]b", "tab\there"] {
            assert!(
                matches!(StorePath::root().child(bad), Err(SyncError::InvalidPath(_))),
                "{bad:?} should be rejected"
            );
        }
        assert!(StorePath::root().child("").is_err());
        assert!(StorePath::root().child("abc-def_1").is_ok());
    }

    #[test]
    fn test_parent_and_root() {
        let path = StorePath::parse("a/b").unwrap();
        assert_eq!(path.parent().unwrap(), StorePath::parse("a").unwrap());
        assert!(StorePath::root().parent().is_none());
        assert!(StorePath::root().is_root());
        assert_eq!(StorePath::root().to_string(), "/");
    }

    #[test]
    fn test_overlaps() {
        let items = StorePath::parse("clipboards/b1/items").unwrap();
        let item = items.child("x").unwrap();
        let board = StorePath::parse("clipboards/b1").unwrap();
        let other = StorePath::parse("clipboards/b2/items").unwrap();

        assert!(items.contains(&item));
        assert!(!item.contains(&items));
        assert!(items.overlaps(&item));
        assert!(items.overlaps(&board));
        assert!(!items.overlaps(&other));
        assert!(StorePath::root().overlaps(&other));
    }
}
