//! Relationships between elements.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use archmodel_core::{
    identifier::{ElementId, RelationshipId},
    tags::{self, Tags},
};

use super::element::{Perspective, insert_perspective, insert_property};
use crate::error::{Result, validate_url};

/// Whether the source waits for the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InteractionStyle {
    #[default]
    Synchronous,
    Asynchronous,
}

impl InteractionStyle {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Synchronous => tags::SYNCHRONOUS,
            Self::Asynchronous => tags::ASYNCHRONOUS,
        }
    }
}

/// A directed relationship between two elements.
///
/// Identity is the (source, destination, description) triple; technology and
/// interaction style do not take part in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    id: RelationshipId,
    source_id: ElementId,
    destination_id: ElementId,
    #[serde(default)]
    pub(crate) description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub(crate) technology: String,
    #[serde(default)]
    interaction_style: InteractionStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    linked_relationship_id: Option<RelationshipId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    tags: Tags,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    perspectives: Vec<Perspective>,
}

impl Relationship {
    pub(crate) fn new(
        id: RelationshipId,
        source_id: ElementId,
        destination_id: ElementId,
        description: &str,
        technology: &str,
        interaction_style: InteractionStyle,
        linked_relationship_id: Option<RelationshipId>,
    ) -> Self {
        let mut tags = Tags::new();
        tags.add(interaction_style.tag());
        Self {
            id,
            source_id,
            destination_id,
            description: description.to_string(),
            technology: technology.to_string(),
            interaction_style,
            linked_relationship_id,
            url: None,
            tags,
            properties: IndexMap::new(),
            perspectives: Vec::new(),
        }
    }

    pub fn id(&self) -> &RelationshipId {
        &self.id
    }

    pub fn source_id(&self) -> &ElementId {
        &self.source_id
    }

    pub fn destination_id(&self) -> &ElementId {
        &self.destination_id
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn technology(&self) -> &str {
        &self.technology
    }

    pub fn interaction_style(&self) -> InteractionStyle {
        self.interaction_style
    }

    /// The explicit relationship this one was derived from, if any.
    pub fn linked_relationship_id(&self) -> Option<&RelationshipId> {
        self.linked_relationship_id.as_ref()
    }

    /// Returns `true` for relationships created by the model rather than a caller.
    pub fn is_linked(&self) -> bool {
        self.linked_relationship_id.is_some()
    }

    pub fn connects(&self, source_id: &ElementId, destination_id: &ElementId) -> bool {
        self.source_id == *source_id && self.destination_id == *destination_id
    }

    /// Returns `true` if either end is `element_id`.
    pub fn touches(&self, element_id: &ElementId) -> bool {
        self.source_id == *element_id || self.destination_id == *element_id
    }

    /// Returns the end opposite to `element_id`, if it is an end at all.
    pub fn other_end(&self, element_id: &ElementId) -> Option<&ElementId> {
        if self.source_id == *element_id {
            Some(&self.destination_id)
        } else if self.destination_id == *element_id {
            Some(&self.source_id)
        } else {
            None
        }
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: &str) -> Result<()> {
        self.url = validate_url(url)?;
        Ok(())
    }

    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// The base tag (unless linked) followed by the added ones.
    pub fn all_tags(&self) -> Vec<String> {
        let mut all = Vec::with_capacity(self.tags.len() + 1);
        if !self.is_linked() {
            all.push(tags::RELATIONSHIP.to_string());
        }
        all.extend(
            self.tags
                .iter()
                .filter(|tag| *tag != tags::RELATIONSHIP)
                .map(str::to_string),
        );
        all
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        (tag.trim() == tags::RELATIONSHIP && !self.is_linked()) || self.tags.contains(tag)
    }

    pub fn add_tags(&mut self, tags: &[&str]) {
        self.tags.extend(tags.iter().copied());
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(tag)
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    pub fn add_property(&mut self, name: &str, value: &str) -> Result<()> {
        insert_property(&mut self.properties, name, value)
    }

    pub fn perspectives(&self) -> &[Perspective] {
        &self.perspectives
    }

    pub fn add_perspective(&mut self, name: &str, description: &str) -> Result<&Perspective> {
        insert_perspective(&mut self.perspectives, name, description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relationship(linked: Option<&str>, style: InteractionStyle) -> Relationship {
        Relationship::new(
            RelationshipId::new("10"),
            ElementId::new("1"),
            ElementId::new("2"),
            "Uses",
            "HTTPS",
            style,
            linked.map(RelationshipId::from),
        )
    }

    #[test]
    fn test_explicit_relationship_tags() {
        let relationship = relationship(None, InteractionStyle::Synchronous);
        assert_eq!(relationship.all_tags(), ["Relationship", "Synchronous"]);
        assert!(relationship.has_tag("Relationship"));
    }

    #[test]
    fn test_linked_relationship_has_no_base_tag() {
        let relationship = relationship(Some("4"), InteractionStyle::Asynchronous);
        assert_eq!(relationship.all_tags(), ["Asynchronous"]);
        assert!(!relationship.has_tag("Relationship"));
        assert!(relationship.is_linked());
    }

    #[test]
    fn test_other_end() {
        let relationship = relationship(None, InteractionStyle::Synchronous);
        let source = ElementId::new("1");
        let destination = ElementId::new("2");
        assert_eq!(relationship.other_end(&source), Some(&destination));
        assert_eq!(relationship.other_end(&destination), Some(&source));
        assert_eq!(relationship.other_end(&ElementId::new("3")), None);
        assert!(relationship.connects(&source, &destination));
        assert!(!relationship.connects(&destination, &source));
    }
}
