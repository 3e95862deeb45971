//! Deployment views: nodes and container instances of one environment.

use indexmap::IndexSet;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use archmodel_core::identifier::{ElementId, RelationshipId};

use super::{Animation, View, ViewCore, element_name};
use crate::{
    error::{ModelError, Result},
    model::{DEFAULT_ENVIRONMENT, Element, ElementType, Model},
};

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

/// Deployment nodes, infrastructure nodes and container instances of one
/// environment, optionally restricted to one software system.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentView {
    #[serde(flatten)]
    core: ViewCore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    software_system_id: Option<ElementId>,
    #[serde(default = "default_environment")]
    environment: String,
}

impl DeploymentView {
    pub(crate) fn new(
        software_system_id: Option<&ElementId>,
        key: &str,
        description: &str,
    ) -> Result<Self> {
        Ok(Self {
            core: ViewCore::new(key, description)?,
            software_system_id: software_system_id.cloned(),
            environment: default_environment(),
        })
    }

    pub fn software_system_id(&self) -> Option<&ElementId> {
        self.software_system_id.as_ref()
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Sets the environment shown. A blank value selects the default one.
    pub fn set_environment(&mut self, environment: &str) {
        let environment = environment.trim();
        self.environment = if environment.is_empty() {
            default_environment()
        } else {
            environment.to_string()
        };
    }

    /// Adds every top-level deployment node of the view's environment that
    /// hosts something in scope.
    pub fn add_all_deployment_nodes(&mut self, model: &Model) {
        let ids: Vec<ElementId> = model
            .deployment_nodes()
            .filter(|node| node.environment() == Some(self.environment.as_str()))
            .map(|node| node.id().clone())
            .collect();
        for id in ids {
            self.add_subtree(model, &id);
        }
    }

    /// Adds a deployment node with its hosted content and its parent chain.
    ///
    /// Nothing is added when the node hosts nothing in scope. Returns whether
    /// anything was added.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] if `id` is not a deployment node.
    pub fn add_deployment_node(&mut self, model: &Model, id: &ElementId) -> Result<bool> {
        let Some(node) = model.element(id) else {
            debug!(view = self.key(), element = id.as_str(); "Ignoring element outside the model");
            return Ok(false);
        };
        if node.element_type() != ElementType::DeploymentNode {
            return Err(ModelError::invalid("A deployment node must be specified."));
        }
        if !self.add_subtree(model, id) {
            return Ok(false);
        }
        for ancestor in model.ancestors(id) {
            self.core.insert_element(model, &ancestor, true);
        }
        Ok(true)
    }

    fn add_subtree(&mut self, model: &Model, node_id: &ElementId) -> bool {
        let children: Vec<&Element> = model.children(node_id).collect();
        let mut has_content = false;
        for child in children {
            let add = match child.element_type() {
                ElementType::ContainerInstance => self.in_scope(model, child),
                ElementType::InfrastructureNode => true,
                ElementType::DeploymentNode => {
                    has_content |= self.add_subtree(model, child.id());
                    false
                }
                _ => false,
            };
            if add {
                self.core.insert_element(model, child.id(), true);
                has_content = true;
            }
        }
        if has_content {
            self.core.insert_element(model, node_id, true);
        }
        has_content
    }

    fn in_scope(&self, model: &Model, instance: &Element) -> bool {
        let Some(system_id) = &self.software_system_id else {
            return true;
        };
        instance
            .as_container_instance()
            .and_then(|instance| model.element(instance.container_id()))
            .and_then(Element::parent_id)
            .is_some_and(|parent| parent == system_id)
    }

    /// Adds a relationship whose ends are both on the view.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotFound`] if the relationship is not in the model.
    pub fn add_relationship(&mut self, model: &Model, id: &RelationshipId) -> Result<bool> {
        self.core.add_relationship(model, id)
    }

    /// Removes an element with everything hosted under it.
    pub fn remove_element(&mut self, model: &Model, id: &ElementId) {
        self.core.remove_element(model, id);
    }

    /// Adds an animation step showing container instances and
    /// infrastructure nodes.
    ///
    /// The deployment nodes hosting them join the same step unless an
    /// earlier step already shows them.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidArgument`] for an empty list and
    /// [`ModelError::EmptySelection`] when none of them is on the view.
    pub fn add_animation(&mut self, model: &Model, element_ids: &[ElementId]) -> Result<&Animation> {
        if element_ids.is_empty() {
            return Err(ModelError::invalid(
                "One or more container instances/infrastructure nodes must be specified.",
            ));
        }
        let earlier = self.core.animated_elements();
        let mut step: IndexSet<ElementId> = IndexSet::new();
        for id in element_ids {
            let hosted = model.element(id).is_some_and(|element| {
                matches!(
                    element.element_type(),
                    ElementType::ContainerInstance | ElementType::InfrastructureNode
                )
            });
            if !hosted || !self.is_element_in_view(id) {
                trace!(view = self.key(), element = id.as_str(); "Skipping element outside the view");
                continue;
            }
            step.insert(id.clone());
            for ancestor in model.ancestors(id) {
                if self.is_element_in_view(&ancestor) && !earlier.contains(&ancestor) {
                    step.insert(ancestor);
                }
            }
        }
        if step.is_empty() {
            return Err(ModelError::EmptySelection(
                "None of the specified container instances exist in this view.".to_string(),
            ));
        }
        Ok(self.core.push_animation(model, step))
    }
}

impl View for DeploymentView {
    fn core(&self) -> &ViewCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ViewCore {
        &mut self.core
    }

    fn name(&self, model: &Model) -> String {
        let mut name = match &self.software_system_id {
            Some(id) => format!("{} - Deployment", element_name(model, id)),
            None => "Deployment".to_string(),
        };
        if self.environment != DEFAULT_ENVIRONMENT {
            name.push_str(" - ");
            name.push_str(&self.environment);
        }
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nested {
        model: Model,
        system: ElementId,
        parent: ElementId,
        child: ElementId,
        infrastructure: ElementId,
        instance: ElementId,
    }

    fn nested() -> Nested {
        let mut model = Model::new();
        let system = model.add_software_system("Software System", "").unwrap();
        let container = model.add_container(&system, "Container", "", "").unwrap();
        let parent = model
            .add_deployment_node("", "Deployment Node", "", "", 1)
            .unwrap();
        let child = model
            .add_child_deployment_node(&parent, "Deployment Node", "", "", 1)
            .unwrap();
        let infrastructure = model
            .add_infrastructure_node(&child, "Infrastructure Node", "", "")
            .unwrap();
        let instance = model.add_container_instance(&child, &container).unwrap();
        Nested {
            model,
            system,
            parent,
            child,
            infrastructure,
            instance,
        }
    }

    #[test]
    fn test_names() {
        let mut model = Model::new();
        let system = model.add_software_system("Software System", "").unwrap();

        let mut view = DeploymentView::new(None, "deployment", "").unwrap();
        assert_eq!(view.name(&model), "Deployment");
        view.set_environment("Live");
        assert_eq!(view.name(&model), "Deployment - Live");

        let mut view = DeploymentView::new(Some(&system), "deployment", "").unwrap();
        assert_eq!(view.name(&model), "Software System - Deployment");
        view.set_environment("Live");
        assert_eq!(view.name(&model), "Software System - Deployment - Live");
        view.set_environment(" ");
        assert_eq!(view.environment(), DEFAULT_ENVIRONMENT);
    }

    #[test]
    fn test_add_all_deployment_nodes_skips_empty_nodes() {
        let mut model = Model::new();
        model
            .add_deployment_node("", "Deployment Node", "", "", 1)
            .unwrap();
        let mut view = DeploymentView::new(None, "deployment", "").unwrap();
        view.add_all_deployment_nodes(&model);
        assert_eq!(view.core().elements().count(), 0);
    }

    #[test]
    fn test_add_all_deployment_nodes_filters_environment() {
        let f = nested();
        let mut view = DeploymentView::new(Some(&f.system), "deployment", "").unwrap();
        view.set_environment("Live");
        view.add_all_deployment_nodes(&f.model);
        assert_eq!(view.core().elements().count(), 0);
    }

    #[test]
    fn test_add_all_deployment_nodes_adds_nested_content() {
        let f = nested();
        let mut view = DeploymentView::new(Some(&f.system), "deployment", "").unwrap();
        view.add_all_deployment_nodes(&f.model);
        assert_eq!(view.core().elements().count(), 4);
        for id in [&f.parent, &f.child, &f.infrastructure, &f.instance] {
            assert!(view.is_element_in_view(id));
        }
    }

    #[test]
    fn test_add_all_deployment_nodes_respects_software_system_scope() {
        let mut model = Model::new();
        let system_1 = model.add_software_system("Software System 1", "").unwrap();
        let container_1 = model.add_container(&system_1, "Container 1", "", "").unwrap();
        let node_1 = model.add_deployment_node("", "Deployment Node 1", "", "", 1).unwrap();
        let instance_1 = model.add_container_instance(&node_1, &container_1).unwrap();

        let system_2 = model.add_software_system("Software System 2", "").unwrap();
        let container_2 = model.add_container(&system_2, "Container 2", "", "").unwrap();
        let node_2 = model.add_deployment_node("", "Deployment Node 2", "", "", 1).unwrap();
        model.add_container_instance(&node_2, &container_2).unwrap();
        model.add_container_instance(&node_1, &container_2).unwrap();

        let mut view = DeploymentView::new(Some(&system_1), "deployment", "").unwrap();
        view.add_all_deployment_nodes(&model);
        assert_eq!(view.core().elements().count(), 2);
        assert!(view.is_element_in_view(&node_1));
        assert!(view.is_element_in_view(&instance_1));
    }

    #[test]
    fn test_add_deployment_node_adds_parent_chain() {
        let f = nested();
        let mut view = DeploymentView::new(Some(&f.system), "deployment", "").unwrap();
        assert!(view.add_deployment_node(&f.model, &f.child).unwrap());
        assert!(view.is_element_in_view(&f.parent));
        assert!(view.is_element_in_view(&f.instance));
        assert_eq!(view.core().elements().count(), 4);
    }

    #[test]
    fn test_add_deployment_node_rejects_other_kinds() {
        let f = nested();
        let mut view = DeploymentView::new(None, "deployment", "").unwrap();
        let err = view.add_deployment_node(&f.model, &f.instance).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidArgument("A deployment node must be specified.".into())
        );
    }

    #[test]
    fn test_remove_hosted_elements() {
        let f = nested();
        let mut view = DeploymentView::new(Some(&f.system), "deployment", "").unwrap();
        view.add_all_deployment_nodes(&f.model);

        let mut without_infrastructure = view.clone();
        without_infrastructure.remove_element(&f.model, &f.infrastructure);
        assert_eq!(without_infrastructure.core().elements().count(), 3);
        assert!(without_infrastructure.is_element_in_view(&f.instance));

        let mut without_instance = view.clone();
        without_instance.remove_element(&f.model, &f.instance);
        assert_eq!(without_instance.core().elements().count(), 3);
        assert!(without_instance.is_element_in_view(&f.infrastructure));

        let mut without_child = view.clone();
        without_child.remove_element(&f.model, &f.child);
        assert_eq!(without_child.core().elements().count(), 1);
        assert!(without_child.is_element_in_view(&f.parent));

        view.remove_element(&f.model, &f.parent);
        assert_eq!(view.core().elements().count(), 0);
    }

    struct Laptop {
        model: Model,
        view: DeploymentView,
        laptop: ElementId,
        tomcat: ElementId,
        oracle: ElementId,
        web_instance: ElementId,
        database_instance: ElementId,
    }

    fn laptop() -> Laptop {
        let mut model = Model::new();
        let system = model.add_software_system("Software System", "").unwrap();
        let web = model.add_container(&system, "Web Application", "", "").unwrap();
        let database = model.add_container(&system, "Database", "", "").unwrap();
        model
            .add_relationship(&web, &database, "Reads from and writes to", Some("JDBC"), None)
            .unwrap();

        let laptop = model.add_deployment_node("", "Developer Laptop", "", "", 1).unwrap();
        let tomcat = model
            .add_child_deployment_node(&laptop, "Apache Tomcat", "", "", 1)
            .unwrap();
        let oracle = model
            .add_child_deployment_node(&laptop, "Oracle", "", "", 1)
            .unwrap();
        let web_instance = model.add_container_instance(&tomcat, &web).unwrap();
        let database_instance = model.add_container_instance(&oracle, &database).unwrap();
        let view = DeploymentView::new(Some(&system), "deployment", "").unwrap();
        Laptop {
            model,
            view,
            laptop,
            tomcat,
            oracle,
            web_instance,
            database_instance,
        }
    }

    #[test]
    fn test_animation_includes_hosting_nodes_once() {
        let mut f = laptop();
        f.view.add_deployment_node(&f.model, &f.laptop).unwrap();
        assert_eq!(f.view.core().relationships().len(), 1);

        let step = f
            .view
            .add_animation(&f.model, &[f.web_instance.clone()])
            .unwrap();
        assert_eq!(step.elements().len(), 3);
        assert!(step.elements().contains(&f.laptop));
        assert!(step.elements().contains(&f.tomcat));
        assert!(step.relationships().is_empty());

        let step = f
            .view
            .add_animation(&f.model, &[f.database_instance.clone()])
            .unwrap();
        assert_eq!(step.order(), 2);
        assert_eq!(step.elements().len(), 2);
        assert!(step.elements().contains(&f.oracle));
        assert!(!step.elements().contains(&f.laptop));
        assert_eq!(step.relationships().len(), 1);
    }

    #[test]
    fn test_animation_ignores_instances_outside_the_view() {
        let mut f = laptop();
        f.view.add_deployment_node(&f.model, &f.tomcat).unwrap();
        let step = f
            .view
            .add_animation(
                &f.model,
                &[f.web_instance.clone(), f.database_instance.clone()],
            )
            .unwrap();
        assert_eq!(step.elements().len(), 3);
        assert!(step.relationships().is_empty());
    }

    #[test]
    fn test_animation_errors() {
        let mut f = laptop();
        assert!(matches!(
            f.view.add_animation(&f.model, &[]),
            Err(ModelError::InvalidArgument(_))
        ));
        let err = f
            .view
            .add_animation(&f.model, &[f.web_instance.clone()])
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::EmptySelection(
                "None of the specified container instances exist in this view.".into()
            )
        );
    }
}
