//! Elements of the architecture model.
//!
//! An [`Element`] holds the data every kind shares: name, description, tags,
//! properties and perspectives. [`ElementKind`] carries what is specific to each
//! concrete kind. Structural fields (id, name, parent, kind) are fixed when the
//! [`Model`](super::Model) creates the element and cannot be changed afterwards.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use archmodel_core::{
    identifier::{ElementId, RelationshipId},
    tags::{self, Tags},
};

use super::deployment::{ContainerInstance, DeploymentNode, InfrastructureNode};
use crate::error::{ModelError, Result, require, validate_url};

/// Separator between the segments of a canonical name.
pub const CANONICAL_NAME_SEPARATOR: char = '/';

/// The concrete kind of an element, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Person,
    SoftwareSystem,
    Container,
    Component,
    DeploymentNode,
    InfrastructureNode,
    ContainerInstance,
}

impl ElementType {
    /// Returns the tags every element of this kind carries.
    pub fn required_tags(self) -> &'static [&'static str] {
        match self {
            Self::Person => &[tags::ELEMENT, tags::PERSON],
            Self::SoftwareSystem => &[tags::ELEMENT, tags::SOFTWARE_SYSTEM],
            Self::Container => &[tags::ELEMENT, tags::CONTAINER],
            Self::Component => &[tags::ELEMENT, tags::COMPONENT],
            Self::DeploymentNode => &[tags::ELEMENT, tags::DEPLOYMENT_NODE],
            Self::InfrastructureNode => &[tags::ELEMENT, tags::INFRASTRUCTURE_NODE],
            Self::ContainerInstance => &[tags::CONTAINER_INSTANCE],
        }
    }

    /// Human readable name used in messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::SoftwareSystem => "software system",
            Self::Container => "container",
            Self::Component => "component",
            Self::DeploymentNode => "deployment node",
            Self::InfrastructureNode => "infrastructure node",
            Self::ContainerInstance => "container instance",
        }
    }
}

/// Whether a person or software system sits inside the enterprise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Internal,
    External,
    #[default]
    Unspecified,
}

/// A named architectural viewpoint, such as "Security".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perspective {
    name: String,
    description: String,
}

impl Perspective {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    #[serde(default)]
    pub(crate) location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareSystem {
    #[serde(default)]
    pub(crate) location: Location,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub(crate) technology: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CodeElementRole {
    #[default]
    Primary,
    Supporting,
}

/// A type in the codebase that implements a component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeElement {
    role: CodeElementRole,
    type_name: String,
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
}

impl CodeElement {
    fn new(role: CodeElementRole, type_name: &str) -> Self {
        let type_name = type_name.trim().to_string();
        let name = type_name
            .rsplit(['.', ':'])
            .next()
            .unwrap_or_default()
            .to_string();
        Self {
            role,
            type_name,
            name,
            url: None,
        }
    }

    pub fn role(&self) -> CodeElementRole {
        self.role
    }

    /// Fully qualified type name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Unqualified type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: &str) -> Result<()> {
        self.url = validate_url(url)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub(crate) technology: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    code_elements: Vec<CodeElement>,
}

impl Component {
    pub(crate) fn new(technology: &str) -> Self {
        Self {
            technology: technology.to_string(),
            ..Self::default()
        }
    }

    pub fn size(&self) -> Option<u64> {
        self.size
    }

    pub fn set_size(&mut self, size: u64) {
        self.size = Some(size);
    }

    pub fn code_elements(&self) -> &[CodeElement] {
        &self.code_elements
    }

    /// Returns the primary code element, if one was set.
    pub fn primary_type(&self) -> Option<&CodeElement> {
        self.code_elements
            .iter()
            .find(|code| code.role == CodeElementRole::Primary)
    }

    /// Sets the type that primarily implements this component, replacing any
    /// previous primary type. Blank type names are ignored.
    pub fn set_primary_type(&mut self, type_name: &str) -> Option<&mut CodeElement> {
        if type_name.trim().is_empty() {
            return None;
        }
        self.code_elements
            .retain(|code| code.role != CodeElementRole::Primary);
        self.code_elements
            .insert(0, CodeElement::new(CodeElementRole::Primary, type_name));
        self.code_elements.first_mut()
    }

    /// Adds a supporting type. Blank and repeated type names are ignored.
    pub fn add_supporting_type(&mut self, type_name: &str) -> Option<&mut CodeElement> {
        let type_name = type_name.trim();
        if type_name.is_empty()
            || self
                .code_elements
                .iter()
                .any(|code| code.type_name == type_name)
        {
            return None;
        }
        self.code_elements
            .push(CodeElement::new(CodeElementRole::Supporting, type_name));
        self.code_elements.last_mut()
    }
}

/// Kind-specific element data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ElementKind {
    Person(Person),
    SoftwareSystem(SoftwareSystem),
    Container(Container),
    Component(Component),
    DeploymentNode(DeploymentNode),
    InfrastructureNode(InfrastructureNode),
    ContainerInstance(ContainerInstance),
}

impl ElementKind {
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Person(_) => ElementType::Person,
            Self::SoftwareSystem(_) => ElementType::SoftwareSystem,
            Self::Container(_) => ElementType::Container,
            Self::Component(_) => ElementType::Component,
            Self::DeploymentNode(_) => ElementType::DeploymentNode,
            Self::InfrastructureNode(_) => ElementType::InfrastructureNode,
            Self::ContainerInstance(_) => ElementType::ContainerInstance,
        }
    }
}

/// An element of the architecture model.
///
/// Two elements are equal when their canonical names match.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    id: ElementId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Tags::is_empty")]
    tags: Tags,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    properties: IndexMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    perspectives: Vec<Perspective>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) parent_id: Option<ElementId>,
    #[serde(flatten)]
    pub(crate) kind: ElementKind,
    #[serde(skip)]
    pub(crate) canonical_name: String,
    #[serde(skip)]
    pub(crate) relationships: Vec<RelationshipId>,
}

impl Element {
    pub(crate) fn new(
        id: ElementId,
        name: &str,
        description: &str,
        parent_id: Option<ElementId>,
        kind: ElementKind,
        canonical_name: String,
    ) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            url: None,
            tags: Tags::new(),
            properties: IndexMap::new(),
            perspectives: Vec::new(),
            parent_id,
            kind,
            canonical_name,
            relationships: Vec::new(),
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Sets the URL of this element. A blank value clears it.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] if the value is not an absolute URL.
    pub fn set_url(&mut self, url: &str) -> Result<()> {
        self.url = validate_url(url)?;
        Ok(())
    }

    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    pub fn parent_id(&self) -> Option<&ElementId> {
        self.parent_id.as_ref()
    }

    /// Slash-delimited path from the model root through the owning elements.
    pub fn canonical_name(&self) -> &str {
        &self.canonical_name
    }

    /// Ids of the relationships this element is the source of.
    pub fn relationships(&self) -> &[RelationshipId] {
        &self.relationships
    }

    /// Tags added on top of the required ones.
    pub fn tags(&self) -> &Tags {
        &self.tags
    }

    /// Required tags followed by the added ones.
    ///
    /// Container instances also carry their container's tags; use
    /// [`Model::all_tags`](super::Model::all_tags) to include those.
    pub fn all_tags(&self) -> Vec<String> {
        let required = self.element_type().required_tags();
        let mut all: Vec<String> = required.iter().map(|tag| tag.to_string()).collect();
        all.extend(
            self.tags
                .iter()
                .filter(|tag| !is_required(required, tag))
                .map(str::to_string),
        );
        all
    }

    /// Whether this element itself carries `tag`.
    ///
    /// Like [`Element::all_tags`], this leaves out the tags a container
    /// instance takes from its container; see
    /// [`Model::has_tag`](super::Model::has_tag).
    pub fn has_tag(&self, tag: &str) -> bool {
        is_required(self.element_type().required_tags(), tag) || self.tags.contains(tag)
    }

    pub fn add_tags(&mut self, tags: &[&str]) {
        let required = self.element_type().required_tags();
        for tag in tags {
            if !is_required(required, tag) {
                self.tags.add(tag);
            }
        }
    }

    /// Removes an added tag. Required tags are never removed, and container
    /// instances reject tag removal entirely.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        if matches!(self.kind, ElementKind::ContainerInstance(_)) {
            return false;
        }
        self.tags.remove(tag)
    }

    pub fn properties(&self) -> &IndexMap<String, String> {
        &self.properties
    }

    /// Adds or replaces a property.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] if the name or value is blank.
    pub fn add_property(&mut self, name: &str, value: &str) -> Result<()> {
        insert_property(&mut self.properties, name, value)
    }

    pub fn perspectives(&self) -> &[Perspective] {
        &self.perspectives
    }

    /// Adds a perspective.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] if the name or description is
    /// blank, or a perspective with the same name already exists.
    pub fn add_perspective(&mut self, name: &str, description: &str) -> Result<&Perspective> {
        insert_perspective(&mut self.perspectives, name, description)
    }

    pub fn location(&self) -> Option<Location> {
        match &self.kind {
            ElementKind::Person(person) => Some(person.location),
            ElementKind::SoftwareSystem(system) => Some(system.location),
            _ => None,
        }
    }

    /// Sets the location of a person or software system.
    pub fn set_location(&mut self, location: Location) -> Result<()> {
        let label = self.element_type().label();
        match &mut self.kind {
            ElementKind::Person(person) => person.location = location,
            ElementKind::SoftwareSystem(system) => system.location = location,
            _ => {
                return Err(ModelError::invalid(format!(
                    "A {label} does not have a location."
                )));
            }
        }
        Ok(())
    }

    pub fn technology(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Container(container) => Some(&container.technology),
            ElementKind::Component(component) => Some(&component.technology),
            ElementKind::DeploymentNode(node) => Some(node.technology()),
            ElementKind::InfrastructureNode(node) => Some(node.technology()),
            _ => None,
        }
    }

    pub fn set_technology(&mut self, technology: &str) -> Result<()> {
        let label = self.element_type().label();
        let technology = technology.to_string();
        match &mut self.kind {
            ElementKind::Container(container) => container.technology = technology,
            ElementKind::Component(component) => component.technology = technology,
            ElementKind::DeploymentNode(node) => node.technology = technology,
            ElementKind::InfrastructureNode(node) => node.technology = technology,
            _ => {
                return Err(ModelError::invalid(format!(
                    "A {label} does not have a technology."
                )));
            }
        }
        Ok(())
    }

    /// Deployment environment of deployment elements.
    pub fn environment(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::DeploymentNode(node) => Some(node.environment()),
            ElementKind::InfrastructureNode(node) => Some(node.environment()),
            ElementKind::ContainerInstance(instance) => Some(instance.environment()),
            _ => None,
        }
    }

    pub fn as_component_mut(&mut self) -> Option<&mut Component> {
        match &mut self.kind {
            ElementKind::Component(component) => Some(component),
            _ => None,
        }
    }

    pub fn as_deployment_node(&self) -> Option<&DeploymentNode> {
        match &self.kind {
            ElementKind::DeploymentNode(node) => Some(node),
            _ => None,
        }
    }

    pub fn as_container_instance(&self) -> Option<&ContainerInstance> {
        match &self.kind {
            ElementKind::ContainerInstance(instance) => Some(instance),
            _ => None,
        }
    }

    pub fn as_container_instance_mut(&mut self) -> Option<&mut ContainerInstance> {
        match &mut self.kind {
            ElementKind::ContainerInstance(instance) => Some(instance),
            _ => None,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.canonical_name == other.canonical_name
    }
}

impl Eq for Element {}

fn is_required(required: &[&str], tag: &str) -> bool {
    let tag = tag.trim();
    required.iter().any(|candidate| *candidate == tag)
}

/// Strips separators from one canonical name segment.
pub(crate) fn format_segment(name: &str) -> String {
    name.replace(CANONICAL_NAME_SEPARATOR, "")
}

pub(crate) fn insert_property(
    properties: &mut IndexMap<String, String>,
    name: &str,
    value: &str,
) -> Result<()> {
    require(name, "A property name must be specified.")?;
    require(value, "A property value must be specified.")?;
    properties.insert(name.to_string(), value.to_string());
    Ok(())
}

pub(crate) fn insert_perspective<'a>(
    perspectives: &'a mut Vec<Perspective>,
    name: &str,
    description: &str,
) -> Result<&'a Perspective> {
    require(name, "A name must be specified.")?;
    require(description, "A description must be specified.")?;
    if perspectives.iter().any(|perspective| perspective.name == name) {
        return Err(ModelError::invalid(format!(
            "A perspective named \"{name}\" already exists."
        )));
    }
    perspectives.push(Perspective {
        name: name.to_string(),
        description: description.to_string(),
    });
    Ok(&perspectives[perspectives.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(name: &str) -> Element {
        Element::new(
            ElementId::new("1"),
            name,
            "",
            None,
            ElementKind::Person(Person::default()),
            format!("/{}", format_segment(name)),
        )
    }

    #[test]
    fn test_required_tags_come_first() {
        let mut element = person("User");
        element.add_tags(&["External", "Element", "External"]);
        assert_eq!(element.all_tags(), ["Element", "Person", "External"]);
        assert!(element.has_tag("Person"));
        assert!(element.has_tag("External"));
    }

    #[test]
    fn test_required_tags_cannot_be_removed() {
        let mut element = person("User");
        element.add_tags(&["External"]);
        assert!(!element.remove_tag("Person"));
        assert!(element.remove_tag("External"));
        assert_eq!(element.all_tags(), ["Element", "Person"]);
    }

    #[test]
    fn test_set_url() {
        let mut element = person("User");
        element.set_url("https://example.com").unwrap();
        assert_eq!(element.url(), Some("https://example.com"));

        let err = element.set_url("www.somedomain.com").unwrap_err();
        assert_eq!(err.to_string(), "www.somedomain.com is not a valid URL.");
        assert_eq!(element.url(), Some("https://example.com"));

        element.set_url("").unwrap();
        assert_eq!(element.url(), None);
    }

    #[test]
    fn test_add_property_requires_name_and_value() {
        let mut element = person("User");
        assert!(element.add_property("", "value").is_err());
        assert!(element.add_property("name", " ").is_err());
        element.add_property("owner", "Team A").unwrap();
        assert_eq!(element.properties().get("owner").map(String::as_str), Some("Team A"));
    }

    #[test]
    fn test_duplicate_perspective_is_rejected() {
        let mut element = person("User");
        element.add_perspective("Security", "Data is encrypted").unwrap();
        let err = element
            .add_perspective("Security", "Something else")
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidArgument("A perspective named \"Security\" already exists.".into())
        );
        assert_eq!(element.perspectives().len(), 1);
    }

    #[test]
    fn test_location_only_for_people_and_systems() {
        let mut element = person("User");
        element.set_location(Location::External).unwrap();
        assert_eq!(element.location(), Some(Location::External));
        assert!(element.set_technology("Java").is_err());
    }

    #[test]
    fn test_format_segment_strips_separator() {
        assert_eq!(format_segment("Web/App"), "WebApp");
    }

    #[test]
    fn test_component_code_elements() {
        let mut component = Component::default();
        component.set_primary_type("com.example.AccountController");
        component.add_supporting_type("com.example.AccountRepository");
        component.add_supporting_type("com.example.AccountRepository");
        assert_eq!(component.code_elements().len(), 2);
        let primary = component.primary_type().unwrap();
        assert_eq!(primary.name(), "AccountController");

        component.set_primary_type("com.example.OtherController");
        assert_eq!(component.code_elements().len(), 2);
        assert_eq!(component.primary_type().unwrap().name(), "OtherController");
    }
}
