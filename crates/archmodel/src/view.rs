//! Views project a subset of the model onto one diagram.
//!
//! Every view kind wraps a [`ViewCore`] holding its element and relationship
//! views, and implements [`View`]. The four static kinds (landscape, context,
//! container, component) also implement [`StaticView`], which carries the
//! inclusion, nearest-neighbour, and animation operations they share.
//!
//! Views never own model data. Operations that need to resolve elements or
//! relationships take the [`Model`] as an argument.
//!
//! # Overview
//!
//! - [`SystemLandscapeView`], [`SystemContextView`], [`ContainerView`],
//!   [`ComponentView`] - Static views.
//! - [`DynamicView`] - Ordered interactions, numbered by a [`Sequencer`].
//! - [`DeploymentView`] - Deployment nodes and container instances of one
//!   environment.
//! - [`FilteredView`] - A tag filter over a static view.
//! - [`ViewSet`] - Owns every view and enforces unique keys.

mod base;
mod configuration;
mod container;
mod deployment;
mod dynamic;
mod filtered;
mod sequence;
mod system;
mod view_set;

pub use base::{Animation, AutomaticLayout, ElementView, RelationshipView, ViewCore};
pub use configuration::{ElementStyle, RelationshipStyle, Styles, Terminology, ViewConfiguration};
pub use container::{ComponentView, ContainerView};
pub use deployment::DeploymentView;
pub use dynamic::{DynamicScope, DynamicView};
pub use filtered::{FilterMode, FilteredView};
pub use sequence::Sequencer;
pub use system::{SystemContextView, SystemLandscapeView};
pub use view_set::ViewSet;

use indexmap::IndexSet;
use log::debug;

use archmodel_core::identifier::{ElementId, RelationshipId};

use crate::{
    error::{ModelError, Result},
    model::{Element, ElementType, Model},
};

/// Behaviour shared by every kind of view.
pub trait View {
    fn core(&self) -> &ViewCore;

    fn core_mut(&mut self) -> &mut ViewCore;

    /// Generated name of the view, such as `Internet Banking - Containers`.
    fn name(&self, model: &Model) -> String;

    fn key(&self) -> &str {
        self.core().key()
    }

    fn is_element_in_view(&self, id: &ElementId) -> bool {
        self.core().is_element_in_view(id)
    }

    fn remove_relationship(&mut self, id: &RelationshipId) {
        self.core_mut().remove_relationship(id);
    }

    /// Enables automatic layout with the given hints.
    fn enable_automatic_layout(&mut self, layout: AutomaticLayout) {
        self.core_mut().enable_automatic_layout(layout);
    }

    fn disable_automatic_layout(&mut self) {
        self.core_mut().disable_automatic_layout();
    }
}

/// Operations shared by the static view kinds.
pub trait StaticView: View {
    /// Kinds of neighbour pulled in by [`StaticView::add_nearest_neighbours`].
    fn neighbour_types(&self) -> &'static [ElementType];

    /// Checks whether `element` may appear on this view.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for kinds the view does not
    /// show and for the element the view is scoped to.
    fn check_element_can_be_added(&self, model: &Model, element: &Element) -> Result<()>;

    /// Adds every element this kind of view can show.
    fn add_all_elements(&mut self, model: &Model);

    /// Adds an element together with its relationships to elements already
    /// on the view. Elements outside the model are ignored.
    fn add_element(&mut self, model: &Model, id: &ElementId) -> Result<()> {
        let Some(element) = model.element(id) else {
            debug!(view = self.key(), element = id.as_str(); "Ignoring element outside the model");
            return Ok(());
        };
        self.check_element_can_be_added(model, element)?;
        self.core_mut().insert_element(model, id, true);
        Ok(())
    }

    fn add_person(&mut self, model: &Model, id: &ElementId) -> Result<()> {
        expect_type(model, id, ElementType::Person)?;
        self.add_element(model, id)
    }

    fn add_software_system(&mut self, model: &Model, id: &ElementId) -> Result<()> {
        expect_type(model, id, ElementType::SoftwareSystem)?;
        self.add_element(model, id)
    }

    fn add_all_people(&mut self, model: &Model) {
        let ids: Vec<ElementId> = model.people().map(|e| e.id().clone()).collect();
        self.add_permitted(model, &ids);
    }

    fn add_all_software_systems(&mut self, model: &Model) {
        let ids: Vec<ElementId> = model.software_systems().map(|e| e.id().clone()).collect();
        self.add_permitted(model, &ids);
    }

    /// Adds each element that the view permits, skipping the rest.
    fn add_permitted(&mut self, model: &Model, ids: &[ElementId]) {
        for id in ids {
            let permitted = model
                .element(id)
                .is_some_and(|element| self.check_element_can_be_added(model, element).is_ok());
            if permitted {
                self.core_mut().insert_element(model, id, true);
            }
        }
    }

    /// Adds an element and every directly related element of the kinds in
    /// [`StaticView::neighbour_types`].
    fn add_nearest_neighbours(&mut self, model: &Model, id: &ElementId) -> Result<()> {
        self.add_element(model, id)?;
        for element_type in self.neighbour_types() {
            let neighbours = ViewCore::neighbours_of_type(model, id, *element_type);
            self.add_permitted(model, &neighbours);
        }
        Ok(())
    }

    /// Removes an element, its descendants, and their relationships.
    fn remove_element(&mut self, model: &Model, id: &ElementId) {
        self.core_mut().remove_element(model, id);
    }

    /// Adds an animation step showing `element_ids`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for an empty list and
    /// [`ModelError::EmptySelection`] when none of the elements is on the view.
    fn add_animation(&mut self, model: &Model, element_ids: &[ElementId]) -> Result<&Animation> {
        if element_ids.is_empty() {
            return Err(ModelError::invalid("One or more elements must be specified."));
        }
        let in_view: IndexSet<ElementId> = element_ids
            .iter()
            .filter(|id| self.is_element_in_view(id))
            .cloned()
            .collect();
        if in_view.is_empty() {
            return Err(ModelError::EmptySelection(
                "None of the specified elements exist in this view.".to_string(),
            ));
        }
        Ok(self.core_mut().push_animation(model, in_view))
    }
}

fn expect_type(model: &Model, id: &ElementId, expected: ElementType) -> Result<()> {
    match model.element(id) {
        Some(element) if element.element_type() != expected => Err(ModelError::invalid(format!(
            "A {} must be specified.",
            expected.label()
        ))),
        _ => Ok(()),
    }
}

/// Rejects the element a view is scoped to.
pub(crate) fn reject_scope(element: &Element, scope: &ElementId) -> Result<()> {
    if element.id() == scope {
        Err(ModelError::invalid(format!(
            "{} is already the scope of this view and cannot be added to it.",
            element.name()
        )))
    } else {
        Ok(())
    }
}

/// Rejects element kinds outside `permitted`.
pub(crate) fn permit_types(element: &Element, permitted: &[ElementType]) -> Result<()> {
    if permitted.contains(&element.element_type()) {
        Ok(())
    } else {
        Err(ModelError::invalid(format!(
            "A {} cannot be added to this view.",
            element.element_type().label()
        )))
    }
}

/// Name of an element, or an empty string when it is missing.
pub(crate) fn element_name(model: &Model, id: &ElementId) -> String {
    model
        .element(id)
        .map(|element| element.name().to_string())
        .unwrap_or_default()
}

pub(crate) fn default_true() -> bool {
    true
}
