//! Command-line front end for archmodel workspaces.
//!
//! Workspaces are read from and written to JSON. Every command hydrates the
//! workspaces it reads, so dangling references are reported before anything
//! is written.

pub mod args;
pub mod config;
pub mod error_adapter;

mod error;

use std::{fs, path::Path};

use log::{debug, info};

use archmodel::{Workspace, model::ElementType};

pub use args::{Args, Command};
pub use error::CliError;

/// Element, relationship and view counts of a workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub elements: Vec<(ElementType, usize)>,
    pub relationships: usize,
    pub views: usize,
    pub filtered_views: usize,
}

/// Run the command selected by `args`.
///
/// # Errors
///
/// Returns [`CliError`] if a file cannot be read, written or parsed, if the
/// configuration is invalid, or if a workspace fails to hydrate.
pub fn run(args: &Args) -> Result<(), CliError> {
    match &args.command {
        Command::MergeLayout {
            source,
            current,
            output,
        } => {
            info!(source = source.as_str(), current = current.as_str(); "Merging layout");
            let published = read_workspace(source)?;
            let mut workspace = read_workspace(current)?;
            workspace.copy_layout_information_from(&published);
            write_workspace(output, &workspace)?;
            info!(output = output.as_str(); "Merged workspace written");
        }
        Command::Prepare { input, output } => {
            let app_config = config::load_config(args.config.as_deref())?;
            debug!(config:? = app_config; "Configuration loaded");

            let mut workspace = read_workspace(input)?;
            workspace.prepare(&app_config)?;
            write_workspace(output, &workspace)?;
            info!(output = output.as_str(); "Prepared workspace written");
        }
        Command::Summary { input } => {
            let workspace = read_workspace(input)?;
            let summary = summarize(&workspace);
            for (element_type, count) in &summary.elements {
                info!(kind = element_type.label(), count; "Elements");
            }
            info!(
                workspace = workspace.name(),
                relationships = summary.relationships,
                views = summary.views,
                filtered_views = summary.filtered_views;
                "Workspace summary"
            );
        }
    }
    Ok(())
}

/// Count the contents of `workspace`.
///
/// Element kinds that do not occur are left out.
pub fn summarize(workspace: &Workspace) -> Summary {
    let model = workspace.model();
    let elements = [
        ElementType::Person,
        ElementType::SoftwareSystem,
        ElementType::Container,
        ElementType::Component,
        ElementType::DeploymentNode,
        ElementType::InfrastructureNode,
        ElementType::ContainerInstance,
    ]
    .into_iter()
    .map(|element_type| (element_type, model.elements_of_type(element_type).count()))
    .filter(|(_, count)| *count > 0)
    .collect();

    Summary {
        elements,
        relationships: model.relationships().count(),
        views: workspace.views().views().count(),
        filtered_views: workspace.views().filtered_views().len(),
    }
}

fn read_workspace(path: impl AsRef<Path>) -> Result<Workspace, CliError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut workspace: Workspace =
        serde_json::from_str(&content).map_err(|source| CliError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    workspace.hydrate()?;
    debug!(path = path.display().to_string(); "Workspace read");
    Ok(workspace)
}

fn write_workspace(path: impl AsRef<Path>, workspace: &Workspace) -> Result<(), CliError> {
    let path = path.as_ref();
    let content = serde_json::to_string_pretty(workspace).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, content).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
