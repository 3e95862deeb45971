//! Dynamic views: numbered interactions between elements.

use log::debug;
use serde::{Deserialize, Serialize};

use archmodel_core::identifier::{ElementId, RelationshipId};

use super::{RelationshipView, Sequencer, View, ViewCore, element_name, reject_scope};
use crate::{
    error::{ModelError, Result},
    model::{Element, ElementType, Model, Relationship},
};

/// What a dynamic view zooms into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "elementId", rename_all = "camelCase")]
pub enum DynamicScope {
    /// People and software systems of the whole model.
    #[default]
    Model,
    /// Containers of one software system.
    SoftwareSystem(ElementId),
    /// Components of one container.
    Container(ElementId),
}

impl DynamicScope {
    pub fn element_id(&self) -> Option<&ElementId> {
        match self {
            Self::Model => None,
            Self::SoftwareSystem(id) | Self::Container(id) => Some(id),
        }
    }
}

/// A sequence of interactions, each shown as a numbered relationship.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DynamicView {
    #[serde(flatten)]
    core: ViewCore,
    #[serde(default)]
    scope: DynamicScope,
    #[serde(skip)]
    sequencer: Sequencer,
}

impl DynamicView {
    pub(crate) fn new(scope: DynamicScope, key: &str, description: &str) -> Result<Self> {
        Ok(Self {
            core: ViewCore::new(key, description)?,
            scope,
            sequencer: Sequencer::default(),
        })
    }

    pub fn scope(&self) -> &DynamicScope {
        &self.scope
    }

    /// Adds the next interaction from `source_id` to `destination_id`.
    ///
    /// A relationship whose description matches `description` is preferred.
    /// Otherwise any relationship between the two is used, shown with
    /// `description` instead of its own.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] if either element cannot appear
    /// in this view and [`ModelError::NotFound`] if no relationship connects
    /// them.
    pub fn add(
        &mut self,
        model: &Model,
        source_id: &ElementId,
        destination_id: &ElementId,
        description: Option<&str>,
    ) -> Result<&mut RelationshipView> {
        let source = require_member(model, source_id)?;
        let destination = require_member(model, destination_id)?;
        self.check_element_can_be_added(model, source)?;
        self.check_element_can_be_added(model, destination)?;

        let description = description.filter(|d| !d.trim().is_empty());
        let mut candidates = model
            .relationships_from(source_id)
            .filter(|relationship| relationship.destination_id() == destination_id);
        let relationship = match description {
            Some(description) => {
                let all: Vec<&Relationship> = candidates.collect();
                all.iter()
                    .find(|relationship| relationship.description() == description)
                    .or_else(|| all.first())
                    .copied()
            }
            None => candidates.next(),
        };
        let Some(relationship) = relationship else {
            return Err(ModelError::not_found(format!(
                "A relationship between {} and {} does not exist in model.",
                source.name(),
                destination.name()
            )));
        };
        let relationship_id = relationship.id().clone();
        Ok(self.insert(model, relationship_id, description))
    }

    /// Adds the next interaction along an existing relationship.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] for an unknown relationship and
    /// [`ModelError::InvalidArgument`] if either end cannot appear in this view.
    pub fn add_relationship(
        &mut self,
        model: &Model,
        id: &RelationshipId,
        description: Option<&str>,
    ) -> Result<&mut RelationshipView> {
        let relationship = model.relationship(id).ok_or_else(|| {
            ModelError::not_found(format!(
                "The relationship with ID {id} does not exist in this model."
            ))
        })?;
        for end in [relationship.source_id(), relationship.destination_id()] {
            let element = require_member(model, end)?;
            self.check_element_can_be_added(model, element)?;
        }
        let description = description.filter(|d| !d.trim().is_empty());
        Ok(self.insert(model, id.clone(), description))
    }

    fn insert(
        &mut self,
        model: &Model,
        id: RelationshipId,
        description: Option<&str>,
    ) -> &mut RelationshipView {
        if let Some(relationship) = model.relationship(&id) {
            self.core
                .insert_element(model, relationship.source_id(), false);
            self.core
                .insert_element(model, relationship.destination_id(), false);
        }
        let order = self.sequencer.next_order();
        debug!(view = self.core.key(), relationship = id.as_str(), order = order.as_str(); "Interaction added");
        let view = self.core.insert_ordered_relationship(id, order);
        if let Some(description) = description {
            view.set_description(description);
        }
        view
    }

    /// Continues numbering after the highest step already on the view.
    ///
    /// The leading number of each order counts, so `"3.2"` is step 3. Orders
    /// without one are ignored.
    pub(crate) fn resume_sequence(&mut self) {
        let last = self
            .core
            .relationships()
            .iter()
            .filter_map(|view| view.order())
            .filter_map(|order| order.split('.').next()?.trim().parse::<u32>().ok())
            .max();
        if let Some(last) = last {
            debug!(view = self.core.key(), last; "Resuming sequence");
            self.sequencer.resume(last);
        }
    }

    /// Opens a parallel branch. Interactions inside it share a step number.
    pub fn start_parallel_sequence(&mut self) {
        self.sequencer.start_parallel_sequence();
    }

    /// Closes the innermost parallel branch.
    ///
    /// With `merge`, the main sequence continues after the branch's last step;
    /// otherwise it resumes where the branch started.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] when no branch is open.
    pub fn end_parallel_sequence(&mut self, merge: bool) -> Result<()> {
        self.sequencer.end_parallel_sequence(merge)
    }

    /// Software system in scope, directly or through the scoped container.
    fn scope_software_system<'a>(&'a self, model: &'a Model) -> Option<&'a ElementId> {
        match &self.scope {
            DynamicScope::Model => None,
            DynamicScope::SoftwareSystem(id) => Some(id),
            DynamicScope::Container(id) => model.element(id).and_then(Element::parent_id),
        }
    }

    fn check_element_can_be_added(&self, model: &Model, element: &Element) -> Result<()> {
        let element_type = element.element_type();
        match &self.scope {
            DynamicScope::Model => match element_type {
                ElementType::Person | ElementType::SoftwareSystem => Ok(()),
                _ => Err(ModelError::invalid(
                    "Only people and software systems can be added to this dynamic view.",
                )),
            },
            DynamicScope::SoftwareSystem(system_id) => match element_type {
                ElementType::Person => Ok(()),
                ElementType::SoftwareSystem => reject_scope(element, system_id),
                ElementType::Container => check_container(model, element, system_id),
                ElementType::Component => Err(ModelError::invalid(
                    "Components can't be added to a dynamic view when the scope is a software system.",
                )),
                _ => Err(kind_rejected(element)),
            },
            DynamicScope::Container(container_id) => {
                reject_scope(element, container_id)?;
                let system_id = self.scope_software_system(model);
                match element_type {
                    ElementType::Person => Ok(()),
                    ElementType::SoftwareSystem => match system_id {
                        Some(system_id) => reject_scope(element, system_id),
                        None => Ok(()),
                    },
                    ElementType::Container => match system_id {
                        Some(system_id) => check_container(model, element, system_id),
                        None => Ok(()),
                    },
                    ElementType::Component if element.parent_id() == Some(container_id) => Ok(()),
                    ElementType::Component => Err(ModelError::invalid(format!(
                        "Only components that reside inside {} can be added to this view.",
                        element_name(model, container_id)
                    ))),
                    _ => Err(kind_rejected(element)),
                }
            }
        }
    }

}

impl View for DynamicView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn name(&self, model: &Model) -> String {
        match &self.scope {
            DynamicScope::Model => "Dynamic".to_string(),
            DynamicScope::SoftwareSystem(id) => format!("{} - Dynamic", element_name(model, id)),
            DynamicScope::Container(id) => {
                let system_name = self
                    .scope_software_system(model)
                    .map(|system_id| element_name(model, system_id))
                    .unwrap_or_default();
                format!("{system_name} - {} - Dynamic", element_name(model, id))
            }
        }
    }
}

fn require_member<'a>(model: &'a Model, id: &ElementId) -> Result<&'a Element> {
    model.element(id).ok_or_else(|| {
        ModelError::not_found(format!(
            "The element with ID {id} does not exist in this model."
        ))
    })
}

fn check_container(model: &Model, element: &Element, system_id: &ElementId) -> Result<()> {
    if element.parent_id() == Some(system_id) {
        Ok(())
    } else {
        Err(ModelError::invalid(format!(
            "Only containers that reside inside {} can be added to this view.",
            element_name(model, system_id)
        )))
    }
}

fn kind_rejected(element: &Element) -> ModelError {
    ModelError::invalid(format!(
        "A {} cannot be added to this view.",
        element.element_type().label()
    ))
}
