//! System landscape and system context views.

use serde::{Deserialize, Serialize};

use archmodel_core::identifier::ElementId;

use super::{StaticView, View, ViewCore, element_name, permit_types};
use crate::{
    error::Result,
    model::{Element, ElementType, Model},
};

const SYSTEM_TYPES: &[ElementType] = &[ElementType::Person, ElementType::SoftwareSystem];

/// The people and software systems of the whole model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemLandscapeView {
    #[serde(flatten)]
    core: ViewCore,
    #[serde(default = "crate::view::default_true")]
    enterprise_boundary_visible: bool,
}

impl SystemLandscapeView {
    pub(crate) fn new(key: &str, description: &str) -> Result<Self> {
        Ok(Self {
            core: ViewCore::new(key, description)?,
            enterprise_boundary_visible: true,
        })
    }

    pub fn enterprise_boundary_visible(&self) -> bool {
        self.enterprise_boundary_visible
    }

    pub fn set_enterprise_boundary_visible(&mut self, visible: bool) {
        self.enterprise_boundary_visible = visible;
    }
}

impl View for SystemLandscapeView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn name(&self, model: &Model) -> String {
        match model.enterprise() {
            Some(enterprise) => format!("System Landscape for {}", enterprise.name()),
            None => "System Landscape".to_string(),
        }
    }
}

impl StaticView for SystemLandscapeView {
    fn neighbour_types(&self) -> &'static [ElementType] {
        SYSTEM_TYPES
    }

    fn check_element_can_be_added(&self, _model: &Model, element: &Element) -> Result<()> {
        permit_types(element, SYSTEM_TYPES)
    }

    fn add_all_elements(&mut self, model: &Model) {
        self.add_all_software_systems(model);
        self.add_all_people(model);
    }
}

/// One software system with the people and systems around it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemContextView {
    #[serde(flatten)]
    core: ViewCore,
    software_system_id: ElementId,
    #[serde(default = "crate::view::default_true")]
    enterprise_boundary_visible: bool,
}

impl SystemContextView {
    /// Creates the view with its software system already on it.
    pub(crate) fn new(
        model: &Model,
        software_system_id: &ElementId,
        key: &str,
        description: &str,
    ) -> Result<Self> {
        let mut view = Self {
            core: ViewCore::new(key, description)?,
            software_system_id: software_system_id.clone(),
            enterprise_boundary_visible: true,
        };
        view.core.insert_element(model, software_system_id, true);
        Ok(view)
    }

    pub fn software_system_id(&self) -> &ElementId {
        &self.software_system_id
    }

    pub fn enterprise_boundary_visible(&self) -> bool {
        self.enterprise_boundary_visible
    }

    pub fn set_enterprise_boundary_visible(&mut self, visible: bool) {
        self.enterprise_boundary_visible = visible;
    }
}

impl View for SystemContextView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn name(&self, model: &Model) -> String {
        format!(
            "{} - System Context",
            element_name(model, &self.software_system_id)
        )
    }
}

impl StaticView for SystemContextView {
    fn neighbour_types(&self) -> &'static [ElementType] {
        SYSTEM_TYPES
    }

    fn check_element_can_be_added(&self, _model: &Model, element: &Element) -> Result<()> {
        permit_types(element, SYSTEM_TYPES)
    }

    fn add_all_elements(&mut self, model: &Model) {
        self.add_all_software_systems(model);
        self.add_all_people(model);
    }
}
