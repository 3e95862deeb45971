//! The element graph.
//!
//! A [`Model`] owns every element and relationship of a workspace. Elements
//! and relationships are only created through its factory methods, which
//! assign ids and enforce the structural rules:
//!
//! - an element gets its parent at creation and keeps it for life, so the
//!   ownership tree cannot contain cycles
//! - siblings of the same kind have distinct names, and canonical names are
//!   unique across the model
//! - a relationship never connects an element with its own ancestor or
//!   descendant
//! - no two relationships share source, destination and description

mod deployment;
mod element;
mod implied;
mod relationship;

pub use deployment::{
    ContainerInstance, DEFAULT_ENVIRONMENT, DEFAULT_HEALTH_CHECK_INTERVAL,
    DEFAULT_HEALTH_CHECK_TIMEOUT, DeploymentNode, HttpHealthCheck, InfrastructureNode,
};
pub use element::{
    CANONICAL_NAME_SEPARATOR, CodeElement, CodeElementRole, Component, Container, Element,
    ElementKind, ElementType, Location, Person, Perspective, SoftwareSystem,
};
pub use relationship::{InteractionStyle, Relationship};

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use archmodel_core::identifier::{ElementId, IdGenerator, RelationshipId};

use crate::error::{ModelError, Result, require};
use element::format_segment;

/// The organisation that owns the modelled software.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enterprise {
    name: String,
}

impl Enterprise {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// The set of elements and relationships of a workspace.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    enterprise: Option<Enterprise>,
    #[serde(default)]
    elements: IndexMap<ElementId, Element>,
    #[serde(default)]
    relationships: IndexMap<RelationshipId, Relationship>,
    #[serde(skip)]
    ids: IdGenerator,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enterprise(&self) -> Option<&Enterprise> {
        self.enterprise.as_ref()
    }

    pub fn set_enterprise(&mut self, name: &str) -> Result<()> {
        require(name, "A name must be specified.")?;
        self.enterprise = Some(Enterprise {
            name: name.trim().to_string(),
        });
        Ok(())
    }

    // ====================================================================
    // Element factories
    // ====================================================================

    /// Adds a person with an unspecified location.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for a blank name and
    /// [`ModelError::InvariantViolation`] if a person with the same name exists.
    pub fn add_person(&mut self, name: &str, description: &str) -> Result<ElementId> {
        self.add_person_with_location(Location::Unspecified, name, description)
    }

    pub fn add_person_with_location(
        &mut self,
        location: Location,
        name: &str,
        description: &str,
    ) -> Result<ElementId> {
        self.insert_element(
            name,
            description,
            None,
            ElementKind::Person(Person { location }),
        )
    }

    /// Adds a software system with an unspecified location.
    pub fn add_software_system(&mut self, name: &str, description: &str) -> Result<ElementId> {
        self.add_software_system_with_location(Location::Unspecified, name, description)
    }

    pub fn add_software_system_with_location(
        &mut self,
        location: Location,
        name: &str,
        description: &str,
    ) -> Result<ElementId> {
        self.insert_element(
            name,
            description,
            None,
            ElementKind::SoftwareSystem(SoftwareSystem { location }),
        )
    }

    /// Adds a container to a software system.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if `software_system_id` is unknown and
    /// [`ModelError::InvalidArgument`] if it is not a software system.
    pub fn add_container(
        &mut self,
        software_system_id: &ElementId,
        name: &str,
        description: &str,
        technology: &str,
    ) -> Result<ElementId> {
        self.expect_type(
            software_system_id,
            ElementType::SoftwareSystem,
            "A software system must be specified.",
        )?;
        self.insert_element(
            name,
            description,
            Some(software_system_id),
            ElementKind::Container(Container {
                technology: technology.to_string(),
            }),
        )
    }

    /// Adds a component to a container.
    pub fn add_component(
        &mut self,
        container_id: &ElementId,
        name: &str,
        description: &str,
        technology: &str,
    ) -> Result<ElementId> {
        self.expect_type(
            container_id,
            ElementType::Container,
            "A container must be specified.",
        )?;
        self.insert_element(
            name,
            description,
            Some(container_id),
            ElementKind::Component(Component::new(technology)),
        )
    }

    /// Adds a top-level deployment node. A blank environment means
    /// [`DEFAULT_ENVIRONMENT`].
    pub fn add_deployment_node(
        &mut self,
        environment: &str,
        name: &str,
        description: &str,
        technology: &str,
        instances: i32,
    ) -> Result<ElementId> {
        let node = DeploymentNode::new(environment, technology, instances)?;
        self.insert_element(name, description, None, ElementKind::DeploymentNode(node))
    }

    /// Adds a deployment node nested inside another one, in the same environment.
    pub fn add_child_deployment_node(
        &mut self,
        parent_id: &ElementId,
        name: &str,
        description: &str,
        technology: &str,
        instances: i32,
    ) -> Result<ElementId> {
        let environment = self.deployment_environment(parent_id)?;
        let node = DeploymentNode::new(&environment, technology, instances)?;
        self.insert_element(
            name,
            description,
            Some(parent_id),
            ElementKind::DeploymentNode(node),
        )
    }

    pub fn add_infrastructure_node(
        &mut self,
        deployment_node_id: &ElementId,
        name: &str,
        description: &str,
        technology: &str,
    ) -> Result<ElementId> {
        let environment = self.deployment_environment(deployment_node_id)?;
        self.insert_element(
            name,
            description,
            Some(deployment_node_id),
            ElementKind::InfrastructureNode(InfrastructureNode::new(&environment, technology)),
        )
    }

    /// Deploys a container onto a deployment node.
    ///
    /// The new instance is numbered after the existing instances of the same
    /// container in the same environment. Relationships between the container
    /// and the containers of the other instances in that environment are
    /// replicated between the instances.
    pub fn add_container_instance(
        &mut self,
        deployment_node_id: &ElementId,
        container_id: &ElementId,
    ) -> Result<ElementId> {
        let environment = self.deployment_environment(deployment_node_id)?;
        let container_name = self
            .expect_type(
                container_id,
                ElementType::Container,
                "A container must be specified.",
            )?
            .name()
            .to_string();

        let existing = self
            .container_instances()
            .filter(|(_, instance)| {
                instance.container_id() == container_id && instance.environment() == environment
            })
            .count();
        let instance_id = u32::try_from(existing + 1).unwrap_or(u32::MAX);

        let id = self.insert_element(
            &container_name,
            "",
            Some(deployment_node_id),
            ElementKind::ContainerInstance(ContainerInstance::new(
                container_id.clone(),
                instance_id,
                &environment,
            )),
        )?;
        self.replicate_container_relationships(&id);
        Ok(id)
    }

    fn deployment_environment(&self, deployment_node_id: &ElementId) -> Result<String> {
        let node = self.expect_type(
            deployment_node_id,
            ElementType::DeploymentNode,
            "A deployment node must be specified.",
        )?;
        Ok(node
            .environment()
            .unwrap_or(DEFAULT_ENVIRONMENT)
            .to_string())
    }

    fn container_instances(&self) -> impl Iterator<Item = (&ElementId, &ContainerInstance)> {
        self.elements.iter().filter_map(|(id, element)| {
            element
                .as_container_instance()
                .map(|instance| (id, instance))
        })
    }

    fn replicate_container_relationships(&mut self, instance_id: &ElementId) {
        let Some(instance) = self
            .element(instance_id)
            .and_then(Element::as_container_instance)
        else {
            return;
        };
        let container_id = instance.container_id().clone();
        let environment = instance.environment().to_string();

        let peers: Vec<(ElementId, ElementId)> = self
            .container_instances()
            .filter(|(id, other)| *id != instance_id && other.environment() == environment)
            .map(|(id, other)| (id.clone(), other.container_id().clone()))
            .collect();

        let mut replicas = Vec::new();
        for (peer_id, peer_container_id) in &peers {
            for relationship in self.relationships.values() {
                if relationship.connects(&container_id, peer_container_id) {
                    replicas.push((instance_id.clone(), peer_id.clone(), relationship.clone()));
                }
                if relationship.connects(peer_container_id, &container_id) {
                    replicas.push((peer_id.clone(), instance_id.clone(), relationship.clone()));
                }
            }
        }

        for (source, destination, template) in replicas {
            let result = self.create_relationship(
                &source,
                &destination,
                template.description(),
                template.technology(),
                template.interaction_style(),
                Some(template.id().clone()),
            );
            if let Err(err) = result {
                warn!(source = source.as_str(), destination = destination.as_str(), err:%; "Skipping replicated relationship");
            }
        }
    }

    fn insert_element(
        &mut self,
        name: &str,
        description: &str,
        parent_id: Option<&ElementId>,
        kind: ElementKind,
    ) -> Result<ElementId> {
        require(name, "A name must be specified.")?;
        self.check_sibling_names(name, parent_id, &kind, None)?;

        let parent_canonical = parent_id
            .and_then(|id| self.element(id))
            .map(Element::canonical_name);
        let container_canonical = match &kind {
            ElementKind::ContainerInstance(instance) => self
                .element(instance.container_id())
                .map(Element::canonical_name),
            _ => None,
        };
        let canonical_name =
            compute_canonical_name(name, &kind, parent_canonical, container_canonical);
        if self
            .elements
            .values()
            .any(|element| element.canonical_name == canonical_name)
        {
            return Err(ModelError::violation(format!(
                "An element with the canonical name {canonical_name} already exists."
            )));
        }

        let id = ElementId::new(self.next_id()?);
        debug!(id = id.as_str(), canonical_name = canonical_name.as_str(); "Element added");
        let element = Element::new(
            id.clone(),
            name,
            description,
            parent_id.cloned(),
            kind,
            canonical_name,
        );
        self.elements.insert(id.clone(), element);
        Ok(id)
    }

    /// Checks `name` against the siblings of a new element, or of `existing`
    /// when re-checking an element already in the model.
    fn check_sibling_names(
        &self,
        name: &str,
        parent_id: Option<&ElementId>,
        kind: &ElementKind,
        existing: Option<&ElementId>,
    ) -> Result<()> {
        let element_type = kind.element_type();
        let clash = |predicate: &dyn Fn(&Element) -> bool| {
            self.elements.values().any(|other| {
                Some(other.id()) != existing
                    && other.name() == name
                    && other.parent_id() == parent_id
                    && predicate(other)
            })
        };

        let message = match element_type {
            ElementType::Person | ElementType::SoftwareSystem | ElementType::Container
            | ElementType::Component => {
                if !clash(&|other: &Element| other.element_type() == element_type) {
                    return Ok(());
                }
                match element_type {
                    ElementType::Container => {
                        format!("A container named '{name}' already exists for this software system.")
                    }
                    ElementType::Component => {
                        format!("A component named '{name}' already exists for this container.")
                    }
                    other => format!("A {} named '{name}' already exists.", other.label()),
                }
            }
            ElementType::DeploymentNode | ElementType::InfrastructureNode if parent_id.is_some() => {
                if !clash(&|other: &Element| {
                    matches!(
                        other.element_type(),
                        ElementType::DeploymentNode | ElementType::InfrastructureNode
                    )
                }) {
                    return Ok(());
                }
                format!("A deployment/infrastructure node named '{name}' already exists.")
            }
            ElementType::DeploymentNode | ElementType::InfrastructureNode => {
                let environment = match kind {
                    ElementKind::DeploymentNode(node) => node.environment(),
                    ElementKind::InfrastructureNode(node) => node.environment(),
                    _ => DEFAULT_ENVIRONMENT,
                };
                if !clash(&|other: &Element| {
                    other.element_type() == ElementType::DeploymentNode
                        && other.environment() == Some(environment)
                }) {
                    return Ok(());
                }
                format!(
                    "A top-level deployment node named '{name}' already exists in the {environment} environment."
                )
            }
            ElementType::ContainerInstance => return Ok(()),
        };
        Err(ModelError::violation(message))
    }

    fn next_id(&self) -> Result<String> {
        self.ids
            .generate()
            .ok_or_else(|| ModelError::violation("The model has no unused ids left."))
    }

    fn expect_type(
        &self,
        id: &ElementId,
        expected: ElementType,
        message: &str,
    ) -> Result<&Element> {
        let element = self.require_element(id)?;
        if element.element_type() != expected {
            return Err(ModelError::invalid(message));
        }
        Ok(element)
    }

    fn require_element(&self, id: &ElementId) -> Result<&Element> {
        self.element(id).ok_or_else(|| {
            ModelError::not_found(format!(
                "The element with ID {id} does not exist in this model."
            ))
        })
    }

    // ====================================================================
    // Relationships
    // ====================================================================

    /// Adds a relationship from `source_id` to `destination_id`.
    ///
    /// A missing technology means none, and a missing interaction style means
    /// [`InteractionStyle::Synchronous`].
    ///
    /// # Returns
    ///
    /// The id of the new relationship, or `None` if a relationship with the
    /// same source, destination and description already exists. In that case
    /// the model is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if either end is unknown and
    /// [`ModelError::InvariantViolation`] if one end is an ancestor of the other.
    pub fn add_relationship(
        &mut self,
        source_id: &ElementId,
        destination_id: &ElementId,
        description: &str,
        technology: Option<&str>,
        interaction_style: Option<InteractionStyle>,
    ) -> Result<Option<RelationshipId>> {
        self.create_relationship(
            source_id,
            destination_id,
            description,
            technology.unwrap_or_default(),
            interaction_style.unwrap_or_default(),
            None,
        )
    }

    /// Shorthand for a synchronous relationship without technology.
    pub fn uses(
        &mut self,
        source_id: &ElementId,
        destination_id: &ElementId,
        description: &str,
    ) -> Result<Option<RelationshipId>> {
        self.add_relationship(source_id, destination_id, description, None, None)
    }

    pub(crate) fn create_relationship(
        &mut self,
        source_id: &ElementId,
        destination_id: &ElementId,
        description: &str,
        technology: &str,
        interaction_style: InteractionStyle,
        linked_relationship_id: Option<RelationshipId>,
    ) -> Result<Option<RelationshipId>> {
        self.require_element(source_id)?;
        self.require_element(destination_id)?;
        if self.is_ancestor_of(source_id, destination_id)
            || self.is_ancestor_of(destination_id, source_id)
        {
            return Err(ModelError::violation(
                "Relationships cannot be added between parents and children.",
            ));
        }
        if self.relationships.values().any(|existing| {
            existing.connects(source_id, destination_id) && existing.description() == description
        }) {
            debug!(source = source_id.as_str(), destination = destination_id.as_str(), description; "Relationship exists already");
            return Ok(None);
        }

        let id = RelationshipId::new(self.next_id()?);
        let relationship = Relationship::new(
            id.clone(),
            source_id.clone(),
            destination_id.clone(),
            description,
            technology,
            interaction_style,
            linked_relationship_id,
        );
        trace!(relationship:?; "Relationship added");
        self.relationships.insert(id.clone(), relationship);
        if let Some(source) = self.elements.get_mut(source_id) {
            source.relationships.push(id.clone());
        }
        Ok(Some(id))
    }

    /// Changes the description and technology of a relationship.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if the relationship is unknown and
    /// [`ModelError::InvariantViolation`] if another relationship between the
    /// same ends already has `description`.
    pub fn modify_relationship(
        &mut self,
        relationship_id: &RelationshipId,
        description: &str,
        technology: &str,
    ) -> Result<()> {
        let relationship = self.relationships.get(relationship_id).ok_or_else(|| {
            ModelError::not_found(format!(
                "The relationship with ID {relationship_id} does not exist in this model."
            ))
        })?;
        let (source_id, destination_id) = (relationship.source_id(), relationship.destination_id());
        if let Some(duplicate) = self.relationships.values().find(|other| {
            other.id() != relationship_id
                && other.connects(source_id, destination_id)
                && other.description() == description
        }) {
            return Err(ModelError::violation(format!(
                "This relationship exists already: {}",
                self.describe_relationship(duplicate)
            )));
        }

        if let Some(relationship) = self.relationships.get_mut(relationship_id) {
            relationship.description = description.to_string();
            relationship.technology = technology.to_string();
        }
        Ok(())
    }

    /// Renders a relationship as `source ---[description]---> destination`.
    pub fn describe_relationship(&self, relationship: &Relationship) -> String {
        let end = |id: &ElementId| match self.element(id) {
            Some(element) => format!("{{{} | {} | {}}}", id, element.name(), element.description()),
            None => format!("{{{id}}}"),
        };
        format!(
            "{} ---[{}]---> {}",
            end(relationship.source_id()),
            relationship.description(),
            end(relationship.destination_id())
        )
    }

    // ====================================================================
    // Lookups
    // ====================================================================

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    /// Mutable access to an element's non-structural data.
    pub fn element_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// All elements in creation order.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    pub fn elements_of_type(&self, element_type: ElementType) -> impl Iterator<Item = &Element> {
        self.elements
            .values()
            .filter(move |element| element.element_type() == element_type)
    }

    pub fn people(&self) -> impl Iterator<Item = &Element> {
        self.elements_of_type(ElementType::Person)
    }

    pub fn software_systems(&self) -> impl Iterator<Item = &Element> {
        self.elements_of_type(ElementType::SoftwareSystem)
    }

    /// Top-level deployment nodes of every environment.
    pub fn deployment_nodes(&self) -> impl Iterator<Item = &Element> {
        self.elements_of_type(ElementType::DeploymentNode)
            .filter(|element| element.parent_id().is_none())
    }

    /// Direct children of an element in the ownership tree.
    pub fn children<'a>(&'a self, id: &'a ElementId) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements
            .values()
            .filter(move |element| element.parent_id() == Some(id))
    }

    pub fn containers_of<'a>(
        &'a self,
        software_system_id: &'a ElementId,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children(software_system_id)
            .filter(|element| element.element_type() == ElementType::Container)
    }

    pub fn components_of<'a>(
        &'a self,
        container_id: &'a ElementId,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children(container_id)
            .filter(|element| element.element_type() == ElementType::Component)
    }

    pub fn person_with_name(&self, name: &str) -> Option<&Element> {
        self.people().find(|element| element.name() == name)
    }

    pub fn software_system_with_name(&self, name: &str) -> Option<&Element> {
        self.software_systems().find(|element| element.name() == name)
    }

    /// Finds a top-level deployment node by name within an environment.
    pub fn deployment_node_with_name(&self, name: &str, environment: &str) -> Option<&Element> {
        self.deployment_nodes()
            .find(|element| element.name() == name && element.environment() == Some(environment))
    }

    /// Finds a direct child deployment or infrastructure node by name.
    pub fn child_node_with_name<'a>(
        &'a self,
        parent_id: &'a ElementId,
        name: &str,
    ) -> Option<&'a Element> {
        self.children(parent_id).find(|element| {
            element.name() == name
                && matches!(
                    element.element_type(),
                    ElementType::DeploymentNode | ElementType::InfrastructureNode
                )
        })
    }

    pub fn element_with_canonical_name(&self, canonical_name: &str) -> Option<&Element> {
        let wanted = if canonical_name.starts_with(CANONICAL_NAME_SEPARATOR) {
            canonical_name.to_string()
        } else {
            format!("{CANONICAL_NAME_SEPARATOR}{canonical_name}")
        };
        self.elements
            .values()
            .find(|element| element.canonical_name == wanted)
    }

    /// Looks up an element by canonical name, with or without the leading
    /// separator.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for a blank name and
    /// [`ModelError::NotFound`] when nothing matches.
    pub fn get_element_with_canonical_name(&self, canonical_name: &str) -> Result<&Element> {
        require(canonical_name, "A canonical name must be specified.")?;
        self.element_with_canonical_name(canonical_name)
            .ok_or_else(|| {
                ModelError::not_found(format!(
                    "An element with the canonical name {canonical_name} does not exist."
                ))
            })
    }

    /// Every tag of an element, including those a container instance
    /// forwards from its container.
    pub fn all_tags(&self, id: &ElementId) -> Vec<String> {
        let Some(element) = self.element(id) else {
            return Vec::new();
        };
        let Some(instance) = element.as_container_instance() else {
            return element.all_tags();
        };
        let mut tags = self
            .element(instance.container_id())
            .map(Element::all_tags)
            .unwrap_or_default();
        for tag in element.all_tags() {
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }
        tags
    }

    /// Whether an element carries `tag`, counting the tags a container
    /// instance forwards from its container.
    pub fn has_tag(&self, id: &ElementId, tag: &str) -> bool {
        let Some(element) = self.element(id) else {
            return false;
        };
        element.has_tag(tag)
            || element
                .as_container_instance()
                .and_then(|instance| self.element(instance.container_id()))
                .is_some_and(|container| container.has_tag(tag))
    }

    /// Ancestors of an element, nearest first.
    pub fn ancestors(&self, id: &ElementId) -> Vec<ElementId> {
        let mut ancestors = Vec::new();
        let mut current = self.element(id).and_then(Element::parent_id);
        while let Some(parent_id) = current {
            if ancestors.contains(parent_id) || ancestors.len() > self.elements.len() {
                break;
            }
            ancestors.push(parent_id.clone());
            current = self.element(parent_id).and_then(Element::parent_id);
        }
        ancestors
    }

    /// Returns `true` if `ancestor_id` strictly contains `descendant_id`.
    pub fn is_ancestor_of(&self, ancestor_id: &ElementId, descendant_id: &ElementId) -> bool {
        self.ancestors(descendant_id).contains(ancestor_id)
    }

    pub fn relationship(&self, id: &RelationshipId) -> Option<&Relationship> {
        self.relationships.get(id)
    }

    /// Mutable access to a relationship's non-structural data.
    pub fn relationship_mut(&mut self, id: &RelationshipId) -> Option<&mut Relationship> {
        self.relationships.get_mut(id)
    }

    /// All relationships in creation order.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.values()
    }

    /// Relationships whose source is `element_id`.
    pub fn relationships_from<'a>(
        &'a self,
        element_id: &ElementId,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.element(element_id)
            .map(Element::relationships)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.relationships.get(id))
    }

    /// Relationships with `element_id` at either end.
    pub fn relationships_touching<'a>(
        &'a self,
        element_id: &'a ElementId,
    ) -> impl Iterator<Item = &'a Relationship> + 'a {
        self.relationships
            .values()
            .filter(move |relationship| relationship.touches(element_id))
    }

    pub fn has_efferent_relationship_with(
        &self,
        source_id: &ElementId,
        destination_id: &ElementId,
    ) -> bool {
        self.efferent_relationship_with(source_id, destination_id)
            .is_some()
    }

    /// First relationship from `source_id` to `destination_id`.
    pub fn efferent_relationship_with(
        &self,
        source_id: &ElementId,
        destination_id: &ElementId,
    ) -> Option<&Relationship> {
        self.relationships_from(source_id)
            .find(|relationship| relationship.destination_id() == destination_id)
    }

    /// Returns `true` if any relationship points at `element_id`.
    pub fn has_afferent_relationships(&self, element_id: &ElementId) -> bool {
        self.relationships
            .values()
            .any(|relationship| relationship.destination_id() == element_id)
    }

    // ====================================================================
    // Hydration
    // ====================================================================

    /// Rebuilds derived state after deserialization.
    ///
    /// Recomputes canonical names and outgoing relationship lists, and seeds
    /// the id counter past every numeric id in the model. The structural
    /// rules that the factory methods enforce are checked again, since a
    /// document may have been edited by hand. Nothing is changed unless every
    /// check passes.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] when a parent, container, relationship
    /// end or linked relationship is missing, and
    /// [`ModelError::InvariantViolation`] when an id does not match its entry,
    /// an element has the wrong kind of parent, the ownership tree has a
    /// cycle, two elements share a name or canonical name, or a relationship
    /// is duplicated or joins an element to its own ancestor.
    pub fn hydrate(&mut self) -> Result<()> {
        for (id, element) in &self.elements {
            if element.id() != id {
                return Err(ModelError::violation(format!(
                    "The element stored under ID {id} has ID {}.",
                    element.id()
                )));
            }
            self.check_placement(element)?;
        }
        for (id, relationship) in &self.relationships {
            if relationship.id() != id {
                return Err(ModelError::violation(format!(
                    "The relationship stored under ID {id} has ID {}.",
                    relationship.id()
                )));
            }
            self.require_element(relationship.source_id())?;
            self.require_element(relationship.destination_id())?;
            if let Some(linked) = relationship.linked_relationship_id() {
                if !self.relationships.contains_key(linked) {
                    return Err(ModelError::not_found(format!(
                        "The linked relationship with ID {linked} does not exist in this model."
                    )));
                }
            }
        }

        let canonical_names = self.resolve_canonical_names()?;
        let mut seen_names = HashSet::new();
        for name in canonical_names.values() {
            if !seen_names.insert(name.as_str()) {
                return Err(ModelError::violation(format!(
                    "An element with the canonical name {name} already exists."
                )));
            }
        }
        for element in self.elements.values() {
            self.check_sibling_names(
                element.name(),
                element.parent_id(),
                element.kind(),
                Some(element.id()),
            )?;
        }
        self.check_relationships()?;

        let mut outgoing: HashMap<ElementId, Vec<RelationshipId>> = HashMap::new();
        for relationship in self.relationships.values() {
            outgoing
                .entry(relationship.source_id().clone())
                .or_default()
                .push(relationship.id().clone());
        }
        for (id, element) in &mut self.elements {
            if let Some(name) = canonical_names.get(id) {
                element.canonical_name = name.clone();
            }
            element.relationships = outgoing.remove(id).unwrap_or_default();
        }

        for id in self.elements.keys() {
            self.ids.found(id.as_str());
        }
        for id in self.relationships.keys() {
            self.ids.found(id.as_str());
        }
        debug!(elements = self.elements.len(), relationships = self.relationships.len(); "Model hydrated");
        Ok(())
    }

    /// Checks that a restored element hangs off the kind of parent its
    /// factory method would have given it.
    fn check_placement(&self, element: &Element) -> Result<()> {
        let parent = match element.parent_id() {
            Some(parent_id) => Some(self.require_element(parent_id)?),
            None => None,
        };
        let parent_type = parent.map(Element::element_type);
        let allowed = match element.element_type() {
            ElementType::Person | ElementType::SoftwareSystem => parent_type.is_none(),
            ElementType::Container => parent_type == Some(ElementType::SoftwareSystem),
            ElementType::Component => parent_type == Some(ElementType::Container),
            ElementType::DeploymentNode => {
                matches!(parent_type, None | Some(ElementType::DeploymentNode))
            }
            ElementType::InfrastructureNode | ElementType::ContainerInstance => {
                parent_type == Some(ElementType::DeploymentNode)
            }
        };
        if !allowed {
            let owner = match parent {
                Some(parent) => format!("the {} {}", parent.element_type().label(), parent.id()),
                None => "the model root".to_string(),
            };
            return Err(ModelError::violation(format!(
                "The {} {} cannot belong to {owner}.",
                element.element_type().label(),
                element.id()
            )));
        }
        if let Some(instance) = element.as_container_instance() {
            let container = self.require_element(instance.container_id())?;
            if container.element_type() != ElementType::Container {
                return Err(ModelError::violation(format!(
                    "The container instance {} refers to {}, which is not a container.",
                    element.id(),
                    container.id()
                )));
            }
        }
        Ok(())
    }

    /// Checks restored relationships for duplicates and for ends that are
    /// ancestors of each other. Requires an acyclic ownership tree.
    fn check_relationships(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for relationship in self.relationships.values() {
            let source = relationship.source_id();
            let destination = relationship.destination_id();
            if self.is_ancestor_of(source, destination) || self.is_ancestor_of(destination, source) {
                return Err(ModelError::violation(format!(
                    "The relationship {} joins an element to its own ancestor.",
                    relationship.id()
                )));
            }
            if !seen.insert((source, destination, relationship.description())) {
                return Err(ModelError::violation(format!(
                    "The relationship {} duplicates another relationship.",
                    self.describe_relationship(relationship)
                )));
            }
        }
        Ok(())
    }

    fn resolve_canonical_names(&self) -> Result<HashMap<ElementId, String>> {
        let mut resolved: HashMap<ElementId, String> = HashMap::new();
        while resolved.len() < self.elements.len() {
            let before = resolved.len();
            for (id, element) in &self.elements {
                if resolved.contains_key(id) {
                    continue;
                }
                let parent = match element.parent_id() {
                    Some(parent_id) => match resolved.get(parent_id) {
                        Some(name) => Some(name.as_str()),
                        None => continue,
                    },
                    None => None,
                };
                let container = match element.as_container_instance() {
                    Some(instance) => match resolved.get(instance.container_id()) {
                        Some(name) => Some(name.as_str()),
                        None => continue,
                    },
                    None => None,
                };
                let name = compute_canonical_name(element.name(), element.kind(), parent, container);
                resolved.insert(id.clone(), name);
            }
            if resolved.len() == before {
                return Err(ModelError::violation(
                    "The ownership tree of the model contains a cycle.",
                ));
            }
        }
        Ok(resolved)
    }
}

fn compute_canonical_name(
    name: &str,
    kind: &ElementKind,
    parent: Option<&str>,
    container: Option<&str>,
) -> String {
    let segment = format_segment(name);
    match (kind, parent) {
        (ElementKind::ContainerInstance(instance), Some(parent)) => format!(
            "{parent}{}[{}]",
            container.unwrap_or_default(),
            instance.instance_id()
        ),
        (ElementKind::DeploymentNode(node), None) => format!(
            "/Deployment/{}/{segment}",
            format_segment(node.environment())
        ),
        (_, Some(parent)) => format!("{parent}{CANONICAL_NAME_SEPARATOR}{segment}"),
        (_, None) => format!("{CANONICAL_NAME_SEPARATOR}{segment}"),
    }
}
