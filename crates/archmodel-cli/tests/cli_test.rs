//! End-to-end tests for the CLI commands
//!
//! Each test writes workspaces built through the library API to a temporary
//! directory, runs a command through [`archmodel_cli::run`], and reads the
//! result back.

use std::{fs, path::Path};

use tempfile::TempDir;

use archmodel::{
    ModelError, Workspace,
    identifier::ElementId,
    model::ElementType,
    view::{StaticView, View},
};
use archmodel_cli::{Args, CliError, Command, config::ConfigError, run, summarize};

fn build() -> (Workspace, ElementId, ElementId) {
    let mut workspace = Workspace::new("Shop", "Online shop");
    let model = workspace.model_mut();
    let customer = model.add_person("Customer", "").unwrap();
    let shop = model.add_software_system("Shop", "").unwrap();
    let payments = model.add_software_system("Payments", "").unwrap();
    let web = model.add_container(&shop, "Web", "", "Rust").unwrap();
    model.uses(&customer, &web, "Browses").unwrap();
    model.uses(&web, &payments, "Charges cards using").unwrap();

    let (model, views) = workspace.model_and_views_mut();
    views
        .create_system_context_view(model, &shop, "context", "")
        .unwrap()
        .add_all_elements(model);
    views
        .create_container_view(model, &shop, "containers", "")
        .unwrap()
        .add_all_elements(model);

    (workspace, customer, shop)
}

fn write(dir: &TempDir, name: &str, workspace: &Workspace) -> String {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string(workspace).unwrap()).unwrap();
    path.display().to_string()
}

fn read(path: impl AsRef<Path>) -> Workspace {
    let mut workspace: Workspace =
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
    workspace.hydrate().unwrap();
    workspace
}

fn args(command: Command, config: Option<String>) -> Args {
    Args {
        command,
        config,
        log_level: "off".to_string(),
    }
}

#[test]
fn test_prepare_adds_implied_relationships_and_layout() {
    let dir = TempDir::new().unwrap();
    let (workspace, customer, shop) = build();
    let input = write(&dir, "input.json", &workspace);
    let output = dir.path().join("output.json");

    let config = dir.path().join("config.toml");
    fs::write(&config, "[layout]\nnode_separation = 120\n").unwrap();

    run(&args(
        Command::Prepare {
            input,
            output: output.display().to_string(),
        },
        Some(config.display().to_string()),
    ))
    .unwrap();

    let prepared = read(&output);
    assert!(
        prepared
            .model()
            .relationships_from(&customer)
            .any(|relationship| relationship.destination_id() == &shop)
    );
    for view in prepared.views().views() {
        let layout = view.core().automatic_layout().unwrap();
        assert_eq!(layout.node_separation(), 120);
    }
}

#[test]
fn test_prepare_honours_disabled_implied_relationships() {
    let dir = TempDir::new().unwrap();
    let (workspace, customer, shop) = build();
    let input = write(&dir, "input.json", &workspace);
    let output = dir.path().join("output.json");

    let config = dir.path().join("config.toml");
    fs::write(&config, "[model]\nimplied_relationships = false\n").unwrap();

    run(&args(
        Command::Prepare {
            input,
            output: output.display().to_string(),
        },
        Some(config.display().to_string()),
    ))
    .unwrap();

    let prepared = read(&output);
    assert!(
        !prepared
            .model()
            .relationships_from(&customer)
            .any(|relationship| relationship.destination_id() == &shop)
    );
}

#[test]
fn test_merge_layout_copies_positions() {
    let dir = TempDir::new().unwrap();

    let (mut published, customer, _) = build();
    published
        .views_mut()
        .system_context_view_mut("context")
        .unwrap()
        .core_mut()
        .element_view_mut(&customer)
        .unwrap()
        .set_position(10, 20);
    let source = write(&dir, "published.json", &published);

    let (current, _, _) = build();
    let current = write(&dir, "current.json", &current);
    let output = dir.path().join("merged.json");

    run(&args(
        Command::MergeLayout {
            source,
            current,
            output: output.display().to_string(),
        },
        None,
    ))
    .unwrap();

    let merged = read(&output);
    let context = merged.views().system_context_view("context").unwrap();
    let view = context.core().element_view(&customer).unwrap();
    assert_eq!((view.x(), view.y()), (Some(10), Some(20)));
}

#[test]
fn test_summary_counts() {
    let dir = TempDir::new().unwrap();
    let (workspace, _, _) = build();
    let input = write(&dir, "input.json", &workspace);

    run(&args(Command::Summary { input }, None)).unwrap();

    let summary = summarize(&workspace);
    assert_eq!(
        summary.elements,
        vec![
            (ElementType::Person, 1),
            (ElementType::SoftwareSystem, 2),
            (ElementType::Container, 1),
        ]
    );
    assert_eq!(summary.relationships, 2);
    assert_eq!(summary.views, 2);
    assert_eq!(summary.filtered_views, 0);
}

#[test]
fn test_missing_input_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("missing.json").display().to_string();

    let err = run(&args(Command::Summary { input }, None)).unwrap_err();
    assert!(matches!(err, CliError::Io { .. }));
}

#[test]
fn test_invalid_json_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = run(&args(
        Command::Summary {
            input: path.display().to_string(),
        },
        None,
    ))
    .unwrap_err();
    assert!(matches!(err, CliError::Json { .. }));
}

#[test]
fn test_dangling_reference_is_a_model_error() {
    let dir = TempDir::new().unwrap();
    let (workspace, _, _) = build();
    let mut json: serde_json::Value = serde_json::to_value(&workspace).unwrap();
    json["model"]["relationships"] = serde_json::json!({});
    let path = dir.path().join("dangling.json");
    fs::write(&path, json.to_string()).unwrap();

    let err = run(&args(
        Command::Summary {
            input: path.display().to_string(),
        },
        None,
    ))
    .unwrap_err();
    assert!(matches!(err, CliError::Model(ModelError::NotFound(_))));
}

#[test]
fn test_missing_explicit_config_fails_prepare() {
    let dir = TempDir::new().unwrap();
    let (workspace, _, _) = build();
    let input = write(&dir, "input.json", &workspace);

    let err = run(&args(
        Command::Prepare {
            input,
            output: dir.path().join("out.json").display().to_string(),
        },
        Some(dir.path().join("absent.toml").display().to_string()),
    ))
    .unwrap_err();
    assert!(matches!(
        err,
        CliError::Config(ConfigError::MissingFile(_))
    ));
    assert!(!dir.path().join("out.json").exists());
}
