//! Container and component views.

use serde::{Deserialize, Serialize};

use archmodel_core::identifier::ElementId;

use super::{StaticView, View, ViewCore, element_name, permit_types, reject_scope};
use crate::{
    error::{ModelError, Result},
    model::{Element, ElementType, Model},
};

const CONTAINER_VIEW_TYPES: &[ElementType] = &[
    ElementType::Person,
    ElementType::SoftwareSystem,
    ElementType::Container,
];

const COMPONENT_VIEW_TYPES: &[ElementType] = &[
    ElementType::Person,
    ElementType::SoftwareSystem,
    ElementType::Container,
    ElementType::Component,
];

/// The containers of one software system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerView {
    #[serde(flatten)]
    core: ViewCore,
    software_system_id: ElementId,
    #[serde(default = "crate::view::default_true")]
    external_software_system_boundaries_visible: bool,
}

impl ContainerView {
    pub(crate) fn new(software_system_id: &ElementId, key: &str, description: &str) -> Result<Self> {
        Ok(Self {
            core: ViewCore::new(key, description)?,
            software_system_id: software_system_id.clone(),
            external_software_system_boundaries_visible: true,
        })
    }

    pub fn software_system_id(&self) -> &ElementId {
        &self.software_system_id
    }

    pub fn external_software_system_boundaries_visible(&self) -> bool {
        self.external_software_system_boundaries_visible
    }

    pub fn set_external_software_system_boundaries_visible(&mut self, visible: bool) {
        self.external_software_system_boundaries_visible = visible;
    }

    pub fn add_container(&mut self, model: &Model, id: &ElementId) -> Result<()> {
        expect_container(model, id)?;
        self.add_element(model, id)
    }

    /// Adds every container of the view's software system.
    pub fn add_all_containers(&mut self, model: &Model) {
        let ids: Vec<ElementId> = model
            .containers_of(&self.software_system_id)
            .map(|e| e.id().clone())
            .collect();
        self.add_permitted(model, &ids);
    }
}

impl View for ContainerView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn name(&self, model: &Model) -> String {
        format!("{} - Containers", element_name(model, &self.software_system_id))
    }
}

impl StaticView for ContainerView {
    fn neighbour_types(&self) -> &'static [ElementType] {
        CONTAINER_VIEW_TYPES
    }

    fn check_element_can_be_added(&self, _model: &Model, element: &Element) -> Result<()> {
        permit_types(element, CONTAINER_VIEW_TYPES)?;
        reject_scope(element, &self.software_system_id)
    }

    fn add_all_elements(&mut self, model: &Model) {
        self.add_all_software_systems(model);
        self.add_all_people(model);
        self.add_all_containers(model);
    }
}

/// The components of one container.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentView {
    #[serde(flatten)]
    core: ViewCore,
    container_id: ElementId,
    #[serde(default = "crate::view::default_true")]
    external_container_boundaries_visible: bool,
}

impl ComponentView {
    pub(crate) fn new(container_id: &ElementId, key: &str, description: &str) -> Result<Self> {
        Ok(Self {
            core: ViewCore::new(key, description)?,
            container_id: container_id.clone(),
            external_container_boundaries_visible: true,
        })
    }

    pub fn container_id(&self) -> &ElementId {
        &self.container_id
    }

    /// The software system that owns the view's container.
    pub fn software_system_id<'a>(&self, model: &'a Model) -> Option<&'a ElementId> {
        model.element(&self.container_id).and_then(Element::parent_id)
    }

    pub fn external_container_boundaries_visible(&self) -> bool {
        self.external_container_boundaries_visible
    }

    pub fn set_external_container_boundaries_visible(&mut self, visible: bool) {
        self.external_container_boundaries_visible = visible;
    }

    pub fn add_container(&mut self, model: &Model, id: &ElementId) -> Result<()> {
        expect_container(model, id)?;
        self.add_element(model, id)
    }

    pub fn add_component(&mut self, model: &Model, id: &ElementId) -> Result<()> {
        if model
            .element(id)
            .is_some_and(|element| element.element_type() != ElementType::Component)
        {
            return Err(ModelError::invalid("A component must be specified."));
        }
        self.add_element(model, id)
    }

    /// Adds the other containers of the view's software system.
    pub fn add_all_containers(&mut self, model: &Model) {
        let Some(system_id) = self.software_system_id(model) else {
            return;
        };
        let ids: Vec<ElementId> = model
            .containers_of(system_id)
            .map(|e| e.id().clone())
            .collect();
        self.add_permitted(model, &ids);
    }

    /// Adds every component of the view's container.
    pub fn add_all_components(&mut self, model: &Model) {
        let ids: Vec<ElementId> = model
            .components_of(&self.container_id)
            .map(|e| e.id().clone())
            .collect();
        self.add_permitted(model, &ids);
    }
}

impl View for ComponentView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn name(&self, model: &Model) -> String {
        let system_name = self
            .software_system_id(model)
            .map(|id| element_name(model, id))
            .unwrap_or_default();
        format!(
            "{system_name} - {} - Components",
            element_name(model, &self.container_id)
        )
    }
}

impl StaticView for ComponentView {
    fn neighbour_types(&self) -> &'static [ElementType] {
        COMPONENT_VIEW_TYPES
    }

    fn check_element_can_be_added(&self, model: &Model, element: &Element) -> Result<()> {
        permit_types(element, COMPONENT_VIEW_TYPES)?;
        reject_scope(element, &self.container_id)?;
        match self.software_system_id(model) {
            Some(system_id) => reject_scope(element, system_id),
            None => Ok(()),
        }
    }

    fn add_all_elements(&mut self, model: &Model) {
        self.add_all_software_systems(model);
        self.add_all_people(model);
        self.add_all_containers(model);
        self.add_all_components(model);
    }
}

fn expect_container(model: &Model, id: &ElementId) -> Result<()> {
    match model.element(id) {
        Some(element) if element.element_type() != ElementType::Container => {
            Err(ModelError::invalid("A container must be specified."))
        }
        _ => Ok(()),
    }
}
