//! Tag paths.
//!
//! A tag path such as `catalog/items/item` names the container elements
//! that lead to the records (`catalog`, `items`) followed by the tag of the
//! records themselves (`item`). A target of `*` accepts any element once the
//! containers have been entered.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Target segment that matches any element.
pub const WILDCARD: &str = "*";

/// The last segment of a tag path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetTag {
    /// Any element is a record
    Any,
    /// Only elements with this name are records
    Name(String),
}

impl TargetTag {
    /// Returns true if an element named `name` is a record.
    pub fn matches(&self, name: &str) -> bool {
        match self {
            TargetTag::Any => true,
            TargetTag::Name(tag) => tag == name,
        }
    }
}

impl fmt::Display for TargetTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetTag::Any => f.write_str(WILDCARD),
            TargetTag::Name(tag) => f.write_str(tag),
        }
    }
}

/// A parsed slash-separated tag path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPath {
    roots: Vec<String>,
    target: TargetTag,
}

impl TagPath {
    /// Parses a path like `root/container/tag`.
    ///
    /// Fails on an empty path or an empty segment.
    pub fn parse(path: &str) -> Result<Self> {
        let mut segments: Vec<String> = path.split('/').map(str::to_string).collect();
        if segments.iter().any(String::is_empty) {
            return Err(Error::Configuration(format!("Invalid tag path: {:?}", path)));
        }

        // split() always yields at least one segment
        let last = segments.pop().unwrap_or_default();
        let target = if last == WILDCARD {
            TargetTag::Any
        } else {
            TargetTag::Name(last)
        };

        Ok(Self {
            roots: segments,
            target,
        })
    }

    /// Container segments preceding the target, in document order.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// The record tag.
    pub fn target(&self) -> &TargetTag {
        &self.target
    }
}

impl FromStr for TagPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for TagPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for root in &self.roots {
            write!(f, "{}/", root)?;
        }
        write!(f, "{}", self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_segment() {
        let path = TagPath::parse("root").unwrap();
        assert!(path.roots().is_empty());
        assert_eq!(path.target(), &TargetTag::Name("root".to_string()));
    }

    #[test]
    fn test_parse_nested() {
        let path: TagPath = "a/b/c".parse().unwrap();
        assert_eq!(path.roots(), &["a".to_string(), "b".to_string()]);
        assert_eq!(path.target(), &TargetTag::Name("c".to_string()));
        assert_eq!(path.to_string(), "a/b/c");
    }

    #[test]
    fn test_parse_wildcard() {
        let path = TagPath::parse("root/*").unwrap();
        assert_eq!(path.target(), &TargetTag::Any);
        assert!(path.target().matches("anything"));
        assert_eq!(path.to_string(), "root/*");
    }

    #[test]
    fn test_target_matches() {
        let target = TargetTag::Name("item".to_string());
        assert!(target.matches("item"));
        assert!(!target.matches("other"));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(matches!(TagPath::parse(""), Err(Error::Configuration(_))));
        assert!(matches!(TagPath::parse("a//b"), Err(Error::Configuration(_))));
        assert!(matches!(TagPath::parse("a/"), Err(Error::Configuration(_))));
    }
}
