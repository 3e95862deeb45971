//! The workspace: a model, its views, and their configuration.

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::{Result, require},
    model::Model,
    view::ViewSet,
};

/// Access level of a workspace user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    ReadWrite,
    #[default]
    ReadOnly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    username: String,
    role: Role,
}

impl User {
    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }
}

/// Settings that belong to the workspace rather than to its views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfiguration {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    users: Vec<User>,
}

impl WorkspaceConfiguration {
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Grants `role` to a user, replacing any role they already had.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModelError::InvalidArgument`] for a blank username.
    pub fn add_user(&mut self, username: &str, role: Role) -> Result<()> {
        require(username, "A username must be specified.")?;
        let username = username.trim();
        match self.users.iter_mut().find(|user| user.username == username) {
            Some(user) => user.role = role,
            None => self.users.push(User {
                username: username.to_string(),
                role,
            }),
        }
        Ok(())
    }
}

/// A model together with the views projected from it.
///
/// A workspace read from a serialized document must be [hydrated](Workspace::hydrate)
/// before use.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    model: Model,
    #[serde(default)]
    views: ViewSet,
    #[serde(default)]
    configuration: WorkspaceConfiguration,
}

impl Workspace {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut Model {
        &mut self.model
    }

    pub fn views(&self) -> &ViewSet {
        &self.views
    }

    pub fn views_mut(&mut self) -> &mut ViewSet {
        &mut self.views
    }

    /// Borrows the model and the views at once, for populating views.
    pub fn model_and_views_mut(&mut self) -> (&Model, &mut ViewSet) {
        (&self.model, &mut self.views)
    }

    pub fn configuration(&self) -> &WorkspaceConfiguration {
        &self.configuration
    }

    pub fn configuration_mut(&mut self) -> &mut WorkspaceConfiguration {
        &mut self.configuration
    }

    /// Rebuilds derived state after deserialization and checks every
    /// reference.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModelError::NotFound`] when the model or a view refers
    /// to something that does not exist.
    pub fn hydrate(&mut self) -> Result<()> {
        self.model.hydrate()?;
        self.views.hydrate(&self.model)?;
        info!(
            workspace = self.name.as_str(),
            elements = self.model.elements().count(),
            views = self.views.len();
            "Workspace hydrated"
        );
        Ok(())
    }

    /// Applies `config` before publication.
    ///
    /// Adds implicit relationships when enabled, and gives automatic layout to
    /// every view that has neither a layout nor positioned elements.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ModelError::InvalidArgument`] if the configured layout
    /// is invalid. The workspace is unchanged in that case.
    pub fn prepare(&mut self, config: &AppConfig) -> Result<()> {
        let layout = config.layout().automatic_layout()?;

        let implied = if config.model().implied_relationships() {
            self.model.add_implicit_relationships().len()
        } else {
            0
        };

        let mut laid_out = 0;
        for view in self.views.views_mut() {
            let core = view.core();
            if core.automatic_layout().is_none() && !core.has_coordinates() {
                debug!(view = view.key(); "Enabling automatic layout");
                view.enable_automatic_layout(layout);
                laid_out += 1;
            }
        }
        info!(implied, laid_out; "Workspace prepared");
        Ok(())
    }

    /// Carries layout and editor state over from a previously published
    /// version of this workspace.
    pub fn copy_layout_information_from(&mut self, source: &Workspace) {
        self.views.copy_layout_information_from(&source.views);
        self.views
            .configuration_mut()
            .copy_configuration_from(source.views.configuration());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{LayoutConfig, ModelConfig},
        error::ModelError,
        view::View,
    };

    #[test]
    fn test_add_user() {
        let mut configuration = WorkspaceConfiguration::default();
        configuration.add_user("alice", Role::ReadWrite).unwrap();
        configuration.add_user(" alice ", Role::ReadOnly).unwrap();
        assert_eq!(configuration.users().len(), 1);
        assert_eq!(configuration.users()[0].role(), Role::ReadOnly);
        assert_eq!(
            configuration.add_user("", Role::ReadOnly),
            Err(ModelError::InvalidArgument(
                "A username must be specified.".into()
            ))
        );
    }

    fn populated() -> Workspace {
        let mut workspace = Workspace::new("Banking", "");
        let model = workspace.model_mut();
        let user = model.add_person("User", "").unwrap();
        let system = model.add_software_system("System", "").unwrap();
        let web = model.add_container(&system, "Web", "", "").unwrap();
        model.uses(&user, &web, "Uses").unwrap();

        let (model, views) = workspace.model_and_views_mut();
        views
            .create_system_landscape_view("landscape", "")
            .unwrap();
        let positioned = views.create_system_context_view(model, &system, "context", "").unwrap();
        positioned
            .core_mut()
            .element_view_mut(&system)
            .unwrap()
            .set_position(1, 1);
        workspace
    }

    #[test]
    fn test_prepare_adds_implied_relationships_and_layout() {
        let mut workspace = populated();
        workspace.prepare(&AppConfig::default()).unwrap();

        let model = workspace.model();
        let user = model.person_with_name("User").unwrap().id();
        let system = model.software_system_with_name("System").unwrap().id();
        assert!(model.has_efferent_relationship_with(user, system));

        let views = workspace.views();
        assert!(
            views
                .view_with_key("landscape")
                .and_then(|view| view.core().automatic_layout())
                .is_some()
        );
        assert!(
            views
                .view_with_key("context")
                .and_then(|view| view.core().automatic_layout())
                .is_none()
        );
    }

    #[test]
    fn test_prepare_respects_model_switch() {
        let mut workspace = populated();
        let config = AppConfig::new(LayoutConfig::default(), ModelConfig::new(false));
        workspace.prepare(&config).unwrap();
        assert_eq!(workspace.model().relationships().count(), 1);
    }

    #[test]
    fn test_copy_layout_information_copies_last_saved_view() {
        let mut published = populated();
        published
            .views_mut()
            .configuration_mut()
            .set_last_saved_view("context");
        let mut current = populated();
        current.copy_layout_information_from(&published);
        assert_eq!(
            current.views().configuration().last_saved_view(),
            Some("context")
        );
    }
}
