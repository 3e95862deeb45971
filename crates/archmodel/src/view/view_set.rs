//! The collection of every view in a workspace.

use indexmap::IndexSet;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use archmodel_core::identifier::ElementId;

use super::{
    ComponentView, ContainerView, DeploymentView, DynamicScope, DynamicView, FilterMode,
    FilteredView, StaticView, SystemContextView, SystemLandscapeView, View, ViewConfiguration,
};
use crate::{
    error::{ModelError, Result, require},
    model::{ElementType, Model},
};

/// Owns every view and guarantees that view keys are unique.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSet {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    system_landscape_views: Vec<SystemLandscapeView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    system_context_views: Vec<SystemContextView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    container_views: Vec<ContainerView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    component_views: Vec<ComponentView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    dynamic_views: Vec<DynamicView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    deployment_views: Vec<DeploymentView>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    filtered_views: Vec<FilteredView>,
    #[serde(default)]
    configuration: ViewConfiguration,
}

macro_rules! view_accessors {
    ($($all:ident, $get:ident, $get_mut:ident => $ty:ty;)+) => {
        $(
            pub fn $all(&self) -> &[$ty] {
                &self.$all
            }

            pub fn $get(&self, key: &str) -> Option<&$ty> {
                self.$all.iter().find(|view| view.key() == key)
            }

            pub fn $get_mut(&mut self, key: &str) -> Option<&mut $ty> {
                self.$all.iter_mut().find(|view| view.key() == key)
            }
        )+
    };
}

impl ViewSet {
    pub fn new() -> Self {
        Self::default()
    }

    // ====================================================================
    // Factories
    // ====================================================================

    /// Creates a view of every person and software system.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for a blank key and
    /// [`ModelError::InvariantViolation`] if the key is taken.
    pub fn create_system_landscape_view(
        &mut self,
        key: &str,
        description: &str,
    ) -> Result<&mut SystemLandscapeView> {
        self.check_key_is_unique(key)?;
        let view = SystemLandscapeView::new(key, description)?;
        debug!(key; "System landscape view created");
        self.system_landscape_views.push(view);
        Ok(last(&mut self.system_landscape_views))
    }

    pub fn create_system_context_view(
        &mut self,
        model: &Model,
        software_system_id: &ElementId,
        key: &str,
        description: &str,
    ) -> Result<&mut SystemContextView> {
        require_kind(model, software_system_id, ElementType::SoftwareSystem)?;
        self.check_key_is_unique(key)?;
        let view = SystemContextView::new(model, software_system_id, key, description)?;
        debug!(key, software_system = software_system_id.as_str(); "System context view created");
        self.system_context_views.push(view);
        Ok(last(&mut self.system_context_views))
    }

    pub fn create_container_view(
        &mut self,
        model: &Model,
        software_system_id: &ElementId,
        key: &str,
        description: &str,
    ) -> Result<&mut ContainerView> {
        require_kind(model, software_system_id, ElementType::SoftwareSystem)?;
        self.check_key_is_unique(key)?;
        let view = ContainerView::new(software_system_id, key, description)?;
        debug!(key, software_system = software_system_id.as_str(); "Container view created");
        self.container_views.push(view);
        Ok(last(&mut self.container_views))
    }

    pub fn create_component_view(
        &mut self,
        model: &Model,
        container_id: &ElementId,
        key: &str,
        description: &str,
    ) -> Result<&mut ComponentView> {
        require_kind(model, container_id, ElementType::Container)?;
        self.check_key_is_unique(key)?;
        let view = ComponentView::new(container_id, key, description)?;
        debug!(key, container = container_id.as_str(); "Component view created");
        self.component_views.push(view);
        Ok(last(&mut self.component_views))
    }

    /// Creates a dynamic view. A software-system or container scope must
    /// name an element of that kind.
    pub fn create_dynamic_view(
        &mut self,
        model: &Model,
        scope: DynamicScope,
        key: &str,
        description: &str,
    ) -> Result<&mut DynamicView> {
        match &scope {
            DynamicScope::Model => {}
            DynamicScope::SoftwareSystem(id) => {
                require_kind(model, id, ElementType::SoftwareSystem)?;
            }
            DynamicScope::Container(id) => require_kind(model, id, ElementType::Container)?,
        }
        self.check_key_is_unique(key)?;
        let view = DynamicView::new(scope, key, description)?;
        debug!(key; "Dynamic view created");
        self.dynamic_views.push(view);
        Ok(last(&mut self.dynamic_views))
    }

    /// Creates a deployment view of the default environment, optionally
    /// restricted to one software system.
    pub fn create_deployment_view(
        &mut self,
        model: &Model,
        software_system_id: Option<&ElementId>,
        key: &str,
        description: &str,
    ) -> Result<&mut DeploymentView> {
        if let Some(id) = software_system_id {
            require_kind(model, id, ElementType::SoftwareSystem)?;
        }
        self.check_key_is_unique(key)?;
        let view = DeploymentView::new(software_system_id, key, description)?;
        debug!(key; "Deployment view created");
        self.deployment_views.push(view);
        Ok(last(&mut self.deployment_views))
    }

    /// Creates a tag filter over an existing static view.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if `base_view_key` names no static
    /// view and [`ModelError::EmptySelection`] if every tag is blank.
    pub fn create_filtered_view(
        &mut self,
        base_view_key: &str,
        key: &str,
        description: &str,
        mode: FilterMode,
        tags: &[&str],
    ) -> Result<&FilteredView> {
        self.check_key_is_unique(key)?;
        if self.static_view_with_key(base_view_key).is_none() {
            return Err(ModelError::not_found(format!(
                "A static view with the key {base_view_key} does not exist."
            )));
        }
        let tags: IndexSet<String> = tags
            .iter()
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect();
        if tags.is_empty() {
            return Err(ModelError::EmptySelection(
                "One or more tags must be specified.".to_string(),
            ));
        }
        debug!(key, base_view_key, mode:?; "Filtered view created");
        self.filtered_views
            .push(FilteredView::new(base_view_key, key, description, mode, tags));
        Ok(&self.filtered_views[self.filtered_views.len() - 1])
    }

    fn check_key_is_unique(&self, key: &str) -> Result<()> {
        require(key, "A key must be specified.")?;
        let key = key.trim();
        let taken = self.views().any(|view| view.key() == key)
            || self.filtered_views.iter().any(|view| view.key() == key);
        if taken {
            Err(ModelError::violation(format!(
                "A view with the key {key} already exists."
            )))
        } else {
            Ok(())
        }
    }

    // ====================================================================
    // Lookup
    // ====================================================================

    view_accessors! {
        system_landscape_views, system_landscape_view, system_landscape_view_mut => SystemLandscapeView;
        system_context_views, system_context_view, system_context_view_mut => SystemContextView;
        container_views, container_view, container_view_mut => ContainerView;
        component_views, component_view, component_view_mut => ComponentView;
        dynamic_views, dynamic_view, dynamic_view_mut => DynamicView;
        deployment_views, deployment_view, deployment_view_mut => DeploymentView;
    }

    pub fn filtered_views(&self) -> &[FilteredView] {
        &self.filtered_views
    }

    pub fn filtered_view_with_key(&self, key: &str) -> Option<&FilteredView> {
        self.filtered_views.iter().find(|view| view.key() == key)
    }

    /// Every view except filtered views, grouped by kind.
    pub fn views(&self) -> impl Iterator<Item = &dyn View> {
        self.system_landscape_views
            .iter()
            .map(|view| view as &dyn View)
            .chain(self.system_context_views.iter().map(|view| view as &dyn View))
            .chain(self.container_views.iter().map(|view| view as &dyn View))
            .chain(self.component_views.iter().map(|view| view as &dyn View))
            .chain(self.dynamic_views.iter().map(|view| view as &dyn View))
            .chain(self.deployment_views.iter().map(|view| view as &dyn View))
    }

    pub fn views_mut(&mut self) -> impl Iterator<Item = &mut dyn View> {
        self.system_landscape_views
            .iter_mut()
            .map(|view| view as &mut dyn View)
            .chain(self.system_context_views.iter_mut().map(|view| view as &mut dyn View))
            .chain(self.container_views.iter_mut().map(|view| view as &mut dyn View))
            .chain(self.component_views.iter_mut().map(|view| view as &mut dyn View))
            .chain(self.dynamic_views.iter_mut().map(|view| view as &mut dyn View))
            .chain(self.deployment_views.iter_mut().map(|view| view as &mut dyn View))
    }

    pub fn static_views(&self) -> impl Iterator<Item = &dyn StaticView> {
        self.system_landscape_views
            .iter()
            .map(|view| view as &dyn StaticView)
            .chain(self.system_context_views.iter().map(|view| view as &dyn StaticView))
            .chain(self.container_views.iter().map(|view| view as &dyn StaticView))
            .chain(self.component_views.iter().map(|view| view as &dyn StaticView))
    }

    pub fn view_with_key(&self, key: &str) -> Option<&dyn View> {
        self.views().find(|view| view.key() == key)
    }

    pub fn static_view_with_key(&self, key: &str) -> Option<&dyn StaticView> {
        self.static_views().find(|view| view.key() == key)
    }

    /// Number of views, filtered views included.
    pub fn len(&self) -> usize {
        self.views().count() + self.filtered_views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn configuration(&self) -> &ViewConfiguration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut ViewConfiguration {
        &mut self.configuration
    }

    // ====================================================================
    // Hydration and layout
    // ====================================================================

    /// Checks every view of a freshly deserialized set against `model`, and
    /// lets dynamic views continue numbering after their last step.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] when a view refers to an element or
    /// relationship that the model lacks, or a filtered view to a missing
    /// base view. Returns [`ModelError::InvariantViolation`] when a view shows
    /// a relationship twice (twice at one order for dynamic views) or stores
    /// an element under another element's id.
    pub fn hydrate(&mut self, model: &Model) -> Result<()> {
        for view in &self.system_context_views {
            check_scope(model, view.key(), view.software_system_id(), ElementType::SoftwareSystem)?;
        }
        for view in &self.container_views {
            check_scope(model, view.key(), view.software_system_id(), ElementType::SoftwareSystem)?;
        }
        for view in &self.component_views {
            check_scope(model, view.key(), view.container_id(), ElementType::Container)?;
        }
        for view in &self.dynamic_views {
            match view.scope() {
                DynamicScope::Model => {}
                DynamicScope::SoftwareSystem(id) => {
                    check_scope(model, view.key(), id, ElementType::SoftwareSystem)?;
                }
                DynamicScope::Container(id) => {
                    check_scope(model, view.key(), id, ElementType::Container)?;
                }
            }
        }
        for view in &self.deployment_views {
            if let Some(id) = view.software_system_id() {
                check_scope(model, view.key(), id, ElementType::SoftwareSystem)?;
            }
        }
        let unordered = self
            .system_landscape_views
            .iter()
            .map(View::core)
            .chain(self.system_context_views.iter().map(View::core))
            .chain(self.container_views.iter().map(View::core))
            .chain(self.component_views.iter().map(View::core))
            .chain(self.deployment_views.iter().map(View::core));
        for core in unordered {
            core.hydrate(model, false)?;
        }
        for view in &self.dynamic_views {
            view.core().hydrate(model, true)?;
        }
        for filtered in &self.filtered_views {
            if self.static_view_with_key(filtered.base_view_key()).is_none() {
                return Err(ModelError::not_found(format!(
                    "The filtered view {} refers to missing view {}.",
                    filtered.key(),
                    filtered.base_view_key()
                )));
            }
        }
        for view in &mut self.dynamic_views {
            view.resume_sequence();
        }
        Ok(())
    }

    /// Copies positions and routing from the views with the same keys in
    /// `source`. Views without a counterpart are left alone.
    pub fn copy_layout_information_from(&mut self, source: &ViewSet) {
        let mut copied = 0;
        copied += copy_layouts(&mut self.system_landscape_views, &source.system_landscape_views, false);
        copied += copy_layouts(&mut self.system_context_views, &source.system_context_views, false);
        copied += copy_layouts(&mut self.container_views, &source.container_views, false);
        copied += copy_layouts(&mut self.component_views, &source.component_views, false);
        copied += copy_layouts(&mut self.dynamic_views, &source.dynamic_views, true);
        copied += copy_layouts(&mut self.deployment_views, &source.deployment_views, false);
        info!(copied; "Layout information copied");
    }
}

fn last<T>(views: &mut [T]) -> &mut T {
    let index = views.len() - 1;
    &mut views[index]
}

fn copy_layouts<V: View>(destination: &mut [V], source: &[V], match_order: bool) -> usize {
    let mut copied = 0;
    for view in destination {
        let Some(counterpart) = source.iter().find(|candidate| candidate.key() == view.key()) else {
            continue;
        };
        view.core_mut()
            .copy_layout_information_from(counterpart.core(), match_order);
        copied += 1;
    }
    copied
}

fn require_kind(model: &Model, id: &ElementId, expected: ElementType) -> Result<()> {
    match model.element(id) {
        Some(element) if element.element_type() == expected => Ok(()),
        _ => Err(ModelError::invalid(format!(
            "A {} must be specified.",
            expected.label()
        ))),
    }
}

fn check_scope(model: &Model, key: &str, id: &ElementId, expected: ElementType) -> Result<()> {
    match model.element(id) {
        None => Err(ModelError::not_found(format!(
            "The view {key} is scoped to missing element {id}."
        ))),
        Some(element) if element.element_type() != expected => {
            Err(ModelError::violation(format!(
                "The view {key} must be scoped to a {}.",
                expected.label()
            )))
        }
        Some(_) => Ok(()),
    }
}
