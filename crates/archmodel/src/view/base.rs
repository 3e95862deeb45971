//! State and algorithms shared by every kind of view.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use archmodel_core::{
    identifier::{ElementId, RelationshipId},
    layout::{PaperSize, RankDirection, Routing, Vertex},
};

use crate::{
    error::{ModelError, Result, require},
    model::{ElementType, Model},
};

/// An element placed on a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementView {
    id: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    x: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    y: Option<i32>,
}

impl ElementView {
    fn new(id: ElementId) -> Self {
        Self { id, x: None, y: None }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn x(&self) -> Option<i32> {
        self.x
    }

    pub fn y(&self) -> Option<i32> {
        self.y
    }

    pub fn set_position(&mut self, x: i32, y: i32) {
        self.x = Some(x);
        self.y = Some(y);
    }

    fn copy_layout_information_from(&mut self, source: &ElementView) {
        self.x = source.x;
        self.y = source.y;
    }
}

/// A relationship placed on a view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationshipView {
    id: RelationshipId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    order: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    vertices: Vec<Vertex>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    routing: Option<Routing>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<i32>,
}

impl RelationshipView {
    pub(crate) fn new(id: RelationshipId) -> Self {
        Self {
            id,
            description: None,
            order: None,
            vertices: Vec::new(),
            routing: None,
            position: None,
        }
    }

    pub fn id(&self) -> &RelationshipId {
        &self.id
    }

    /// Description shown instead of the relationship's own, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string()).filter(|d| !d.is_empty());
    }

    /// Position in a dynamic view's sequence.
    pub fn order(&self) -> Option<&str> {
        self.order.as_deref()
    }

    /// Overrides the sequence position, for custom numbering such as `1.1` or `a`.
    pub fn set_order(&mut self, order: &str) {
        self.order = Some(order.to_string());
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn set_vertices(&mut self, vertices: Vec<Vertex>) {
        self.vertices = vertices;
    }

    pub fn routing(&self) -> Option<Routing> {
        self.routing
    }

    pub fn set_routing(&mut self, routing: Routing) {
        self.routing = Some(routing);
    }

    /// Annotation position along the line, from 0 to 100.
    pub fn position(&self) -> Option<i32> {
        self.position
    }

    /// Sets the annotation position, clamped to 0..=100.
    pub fn set_position(&mut self, position: i32) {
        self.position = Some(position.clamp(0, 100));
    }

    fn copy_layout_information_from(&mut self, source: &RelationshipView) {
        self.vertices = source.vertices.clone();
        self.routing = source.routing;
        if let Some(position) = source.position {
            self.set_position(position);
        }
    }
}

/// Hints for an external automatic layout engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutomaticLayout {
    rank_direction: RankDirection,
    rank_separation: i32,
    node_separation: i32,
    edge_separation: i32,
    vertices: bool,
}

impl AutomaticLayout {
    /// Creates layout hints.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] if any separation is negative.
    pub fn new(
        rank_direction: RankDirection,
        rank_separation: i32,
        node_separation: i32,
        edge_separation: i32,
        vertices: bool,
    ) -> Result<Self> {
        for (value, what) in [
            (rank_separation, "rank"),
            (node_separation, "node"),
            (edge_separation, "edge"),
        ] {
            if value < 0 {
                return Err(ModelError::invalid(format!(
                    "The {what} separation must be zero or a positive integer."
                )));
            }
        }
        Ok(Self {
            rank_direction,
            rank_separation,
            node_separation,
            edge_separation,
            vertices,
        })
    }

    pub fn rank_direction(&self) -> RankDirection {
        self.rank_direction
    }

    pub fn rank_separation(&self) -> i32 {
        self.rank_separation
    }

    pub fn node_separation(&self) -> i32 {
        self.node_separation
    }

    pub fn edge_separation(&self) -> i32 {
        self.edge_separation
    }

    pub fn vertices(&self) -> bool {
        self.vertices
    }
}

impl Default for AutomaticLayout {
    fn default() -> Self {
        Self {
            rank_direction: RankDirection::TopBottom,
            rank_separation: 300,
            node_separation: 600,
            edge_separation: 200,
            vertices: false,
        }
    }
}

/// One step of a view animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Animation {
    order: usize,
    elements: IndexSet<ElementId>,
    #[serde(default)]
    relationships: IndexSet<RelationshipId>,
}

impl Animation {
    /// Step number, starting at 1.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Elements that appear at this step.
    pub fn elements(&self) -> &IndexSet<ElementId> {
        &self.elements
    }

    /// Relationships that appear at this step.
    pub fn relationships(&self) -> &IndexSet<RelationshipId> {
        &self.relationships
    }
}

/// The content and presentation settings every view has.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCore {
    key: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paper_size: Option<PaperSize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    automatic_layout: Option<AutomaticLayout>,
    #[serde(default)]
    elements: IndexMap<ElementId, ElementView>,
    #[serde(default)]
    relationships: Vec<RelationshipView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    animations: Vec<Animation>,
}

impl ViewCore {
    pub(crate) fn new(key: &str, description: &str) -> Result<Self> {
        require(key, "A key must be specified.")?;
        Ok(Self {
            key: key.trim().to_string(),
            description: description.to_string(),
            ..Self::default()
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = description.to_string();
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string()).filter(|t| !t.trim().is_empty());
    }

    pub fn paper_size(&self) -> Option<PaperSize> {
        self.paper_size
    }

    pub fn set_paper_size(&mut self, paper_size: PaperSize) {
        self.paper_size = Some(paper_size);
    }

    pub fn automatic_layout(&self) -> Option<&AutomaticLayout> {
        self.automatic_layout.as_ref()
    }

    pub fn enable_automatic_layout(&mut self, layout: AutomaticLayout) {
        self.automatic_layout = Some(layout);
    }

    pub fn disable_automatic_layout(&mut self) {
        self.automatic_layout = None;
    }

    pub fn elements(&self) -> impl Iterator<Item = &ElementView> {
        self.elements.values()
    }

    pub fn element_view(&self, id: &ElementId) -> Option<&ElementView> {
        self.elements.get(id)
    }

    /// Mutable access to an element view's coordinates.
    pub fn element_view_mut(&mut self, id: &ElementId) -> Option<&mut ElementView> {
        self.elements.get_mut(id)
    }

    pub fn is_element_in_view(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    /// Returns `true` if any element view has coordinates.
    pub fn has_coordinates(&self) -> bool {
        self.elements
            .values()
            .any(|view| view.x.is_some() || view.y.is_some())
    }

    pub fn relationships(&self) -> &[RelationshipView] {
        &self.relationships
    }

    /// Mutable access to relationship views for routing and ordering.
    pub fn relationships_mut(&mut self) -> &mut [RelationshipView] {
        &mut self.relationships
    }

    pub fn is_relationship_in_view(&self, id: &RelationshipId) -> bool {
        self.relationships.iter().any(|view| view.id == *id)
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn remove_relationship(&mut self, id: &RelationshipId) {
        self.relationships.retain(|view| view.id != *id);
    }

    /// Inserts an element view. Elements outside `model` are ignored.
    ///
    /// With `add_relationships`, every relationship between the element and
    /// an element already in the view is added too.
    pub(crate) fn insert_element(
        &mut self,
        model: &Model,
        id: &ElementId,
        add_relationships: bool,
    ) -> bool {
        if !model.contains(id) {
            debug!(view = self.key.as_str(), element = id.as_str(); "Ignoring element outside the model");
            return false;
        }
        if !self.elements.contains_key(id) {
            trace!(view = self.key.as_str(), element = id.as_str(); "Element view added");
            self.elements
                .insert(id.clone(), ElementView::new(id.clone()));
        }
        if add_relationships {
            let touching: Vec<RelationshipId> = model
                .relationships_touching(id)
                .filter(|relationship| {
                    relationship
                        .other_end(id)
                        .is_some_and(|other| self.elements.contains_key(other))
                })
                .map(|relationship| relationship.id().clone())
                .collect();
            for relationship_id in touching {
                self.insert_relationship(relationship_id);
            }
        }
        true
    }

    /// Adds a relationship view unless one exists already.
    pub(crate) fn insert_relationship(&mut self, id: RelationshipId) -> &mut RelationshipView {
        let index = match self.relationships.iter().position(|view| view.id == id) {
            Some(index) => index,
            None => {
                self.relationships.push(RelationshipView::new(id));
                self.relationships.len() - 1
            }
        };
        &mut self.relationships[index]
    }

    /// Adds a relationship view at `order` unless that pair exists already.
    pub(crate) fn insert_ordered_relationship(
        &mut self,
        id: RelationshipId,
        order: String,
    ) -> &mut RelationshipView {
        let existing = self
            .relationships
            .iter()
            .position(|view| view.id == id && view.order.as_deref() == Some(order.as_str()));
        let index = match existing {
            Some(index) => index,
            None => {
                let mut view = RelationshipView::new(id);
                view.order = Some(order);
                self.relationships.push(view);
                self.relationships.len() - 1
            }
        };
        &mut self.relationships[index]
    }

    /// Adds a relationship whose ends are both on the view.
    pub(crate) fn add_relationship(&mut self, model: &Model, id: &RelationshipId) -> Result<bool> {
        let relationship = model.relationship(id).ok_or_else(|| {
            ModelError::not_found(format!(
                "The relationship with ID {id} does not exist in this model."
            ))
        })?;
        if self.is_element_in_view(relationship.source_id())
            && self.is_element_in_view(relationship.destination_id())
        {
            self.insert_relationship(id.clone());
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Removes an element, everything it owns, and every relationship
    /// touching any of them.
    pub(crate) fn remove_element(&mut self, model: &Model, id: &ElementId) {
        let doomed: HashSet<ElementId> = self
            .elements
            .keys()
            .filter(|candidate| *candidate == id || model.is_ancestor_of(id, candidate))
            .cloned()
            .collect();
        if doomed.is_empty() {
            return;
        }
        self.elements.retain(|element_id, _| !doomed.contains(element_id));
        self.relationships.retain(|view| {
            model.relationship(&view.id).is_none_or(|relationship| {
                !doomed.contains(relationship.source_id())
                    && !doomed.contains(relationship.destination_id())
            })
        });
        debug!(view = self.key.as_str(), element = id.as_str(), removed = doomed.len(); "Elements removed from view");
    }

    /// Ids of elements of `element_type` that share a relationship with `id`.
    pub(crate) fn neighbours_of_type(
        model: &Model,
        id: &ElementId,
        element_type: ElementType,
    ) -> Vec<ElementId> {
        let mut neighbours: Vec<ElementId> = Vec::new();
        for relationship in model.relationships_touching(id) {
            let Some(other) = relationship.other_end(id) else {
                continue;
            };
            let matches = model
                .element(other)
                .is_some_and(|element| element.element_type() == element_type);
            if matches && !neighbours.contains(other) {
                neighbours.push(other.clone());
            }
        }
        neighbours
    }

    /// Appends an animation step for elements already known to be on the view.
    pub(crate) fn push_animation(
        &mut self,
        model: &Model,
        elements: IndexSet<ElementId>,
    ) -> &Animation {
        let earlier: HashSet<&ElementId> = self
            .animations
            .iter()
            .flat_map(|animation| animation.elements.iter())
            .collect();
        let relationships: IndexSet<RelationshipId> = self
            .relationships
            .iter()
            .filter_map(|view| model.relationship(&view.id))
            .filter(|relationship| {
                let source = relationship.source_id();
                let destination = relationship.destination_id();
                let source_now = elements.contains(source);
                let destination_now = elements.contains(destination);
                (source_now && (destination_now || earlier.contains(destination)))
                    || (earlier.contains(source) && destination_now)
            })
            .map(|relationship| relationship.id().clone())
            .collect();

        let order = self.animations.len() + 1;
        trace!(view = self.key.as_str(), order; "Animation step added");
        self.animations.push(Animation {
            order,
            elements,
            relationships,
        });
        &self.animations[order - 1]
    }

    /// Ids of elements shown by any earlier animation step.
    pub(crate) fn animated_elements(&self) -> HashSet<ElementId> {
        self.animations
            .iter()
            .flat_map(|animation| animation.elements.iter().cloned())
            .collect()
    }

    /// Copies coordinates, routing and paper size from a view with the same key.
    ///
    /// Relationship views are matched by relationship id and, when
    /// `match_order` is set, by order as well.
    pub(crate) fn copy_layout_information_from(&mut self, source: &ViewCore, match_order: bool) {
        if self.paper_size.is_none() {
            self.paper_size = source.paper_size;
        }
        for (id, element_view) in &mut self.elements {
            if let Some(source_view) = source.elements.get(id) {
                element_view.copy_layout_information_from(source_view);
            }
        }
        for relationship_view in &mut self.relationships {
            let counterpart = source.relationships.iter().find(|candidate| {
                candidate.id == relationship_view.id
                    && (!match_order || candidate.order == relationship_view.order)
            });
            if let Some(source_view) = counterpart {
                relationship_view.copy_layout_information_from(source_view);
            }
        }
    }

    /// Checks every reference of this view against `model`.
    /// Checks a deserialized view against `model`.
    ///
    /// With `ordered`, a relationship may appear once per order. Otherwise it
    /// may appear once.
    pub(crate) fn hydrate(&self, model: &Model, ordered: bool) -> Result<()> {
        for (id, view) in &self.elements {
            if &view.id != id {
                return Err(ModelError::violation(format!(
                    "The view {} stores element {} under ID {id}.",
                    self.key, view.id
                )));
            }
            if !model.contains(id) {
                return Err(ModelError::not_found(format!(
                    "The view {} refers to missing element {id}.",
                    self.key
                )));
            }
        }
        let mut seen = HashSet::new();
        for view in &self.relationships {
            let order = if ordered { view.order.as_deref() } else { None };
            if !seen.insert((&view.id, order)) {
                return Err(ModelError::violation(format!(
                    "The view {} shows relationship {} more than once.",
                    self.key, view.id
                )));
            }
        }
        for view in &self.relationships {
            let Some(relationship) = model.relationship(&view.id) else {
                return Err(ModelError::not_found(format!(
                    "The view {} refers to missing relationship {}.",
                    self.key, view.id
                )));
            };
            if !self.is_element_in_view(relationship.source_id())
                || !self.is_element_in_view(relationship.destination_id())
            {
                return Err(ModelError::violation(format!(
                    "The view {} shows relationship {} without both of its elements.",
                    self.key, view.id
                )));
            }
        }
        Ok(())
    }
}
