//! Tag names and tag collections
//!
//! Tags drive styling and filtering. Every model item carries an ordered,
//! de-duplicated list of tags. The names in this module are the tags the
//! model attaches on its own.

use std::fmt;

use serde::{Deserialize, Serialize};

pub const ELEMENT: &str = "Element";
pub const RELATIONSHIP: &str = "Relationship";
pub const PERSON: &str = "Person";
pub const SOFTWARE_SYSTEM: &str = "Software System";
pub const CONTAINER: &str = "Container";
pub const COMPONENT: &str = "Component";
pub const DEPLOYMENT_NODE: &str = "Deployment Node";
pub const INFRASTRUCTURE_NODE: &str = "Infrastructure Node";
pub const CONTAINER_INSTANCE: &str = "Container Instance";
pub const SYNCHRONOUS: &str = "Synchronous";
pub const ASYNCHRONOUS: &str = "Asynchronous";

/// An ordered set of tags.
///
/// Tags are trimmed on insertion; blank tags and repeats are ignored, and the
/// first insertion order is preserved.
///
/// # Examples
///
/// ```
/// use archmodel_core::tags::Tags;
///
/// let mut tags = Tags::new();
/// tags.add(" Database ");
/// tags.add("Database");
/// tags.add("Legacy");
/// assert_eq!(tags.to_string(), "Database,Legacy");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated tag list.
    pub fn from_comma_separated(value: &str) -> Self {
        value.split(',').collect()
    }

    /// Adds a tag, returning `true` when the collection changed.
    pub fn add(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.contains(tag) {
            return false;
        }
        self.0.push(tag.to_string());
        true
    }

    /// Removes a tag, returning `true` when it was present.
    pub fn remove(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        let before = self.0.len();
        self.0.retain(|existing| existing != tag);
        self.0.len() != before
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|existing| existing == tag.trim())
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for Tags {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut tags = Tags::new();
        for tag in iter {
            tags.add(tag);
        }
        tags
    }
}

impl<'a> Extend<&'a str> for Tags {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for tag in iter {
            self.add(tag);
        }
    }
}

impl fmt::Display for Tags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_ignores_blank_and_duplicate_tags() {
        let mut tags = Tags::new();
        assert!(tags.add("Database"));
        assert!(!tags.add("  "));
        assert!(!tags.add("Database "));
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn test_from_comma_separated_preserves_order() {
        let tags = Tags::from_comma_separated("Element, Person,,External,Person");
        let collected: Vec<_> = tags.iter().collect();
        assert_eq!(collected, ["Element", "Person", "External"]);
    }

    #[test]
    fn test_remove() {
        let mut tags = Tags::from_comma_separated("A,B,C");
        assert!(tags.remove("B"));
        assert!(!tags.remove("B"));
        assert_eq!(tags.to_string(), "A,C");
    }

    #[test]
    fn test_empty_collection() {
        let tags = Tags::new();
        assert!(tags.is_empty());
        assert_eq!(tags.to_string(), "");
    }
}
