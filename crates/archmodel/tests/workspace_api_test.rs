//! Integration tests for the Workspace API
//!
//! These tests build a small banking workspace through the public API, then
//! check serialization, hydration and layout merging end to end.

use archmodel::{
    ModelError, Workspace,
    identifier::ElementId,
    layout::{PaperSize, Routing},
    model::InteractionStyle,
    view::{DynamicScope, FilterMode, StaticView, View},
};

struct Ids {
    customer: ElementId,
    banking: ElementId,
    mainframe: ElementId,
    web: ElementId,
    api: ElementId,
    database: ElementId,
    controller: ElementId,
    live_node: ElementId,
}

fn build() -> (Workspace, Ids) {
    let mut workspace = Workspace::new("Big Bank plc", "Banking system");
    let model = workspace.model_mut();
    model.set_enterprise("Big Bank plc").unwrap();

    let customer = model.add_person("Personal Banking Customer", "").unwrap();
    let banking = model.add_software_system("Internet Banking System", "").unwrap();
    let mainframe = model.add_software_system("Mainframe Banking System", "").unwrap();
    let web = model
        .add_container(&banking, "Web Application", "", "Java and Spring MVC")
        .unwrap();
    let api = model
        .add_container(&banking, "API Application", "", "Java and Spring MVC")
        .unwrap();
    let database = model
        .add_container(&banking, "Database", "", "Oracle Database Schema")
        .unwrap();
    let controller = model
        .add_component(&api, "Sign In Controller", "", "Spring MVC Rest Controller")
        .unwrap();

    model.uses(&customer, &web, "Visits").unwrap();
    model.uses(&web, &controller, "Makes API calls to").unwrap();
    model
        .add_relationship(&controller, &database, "Reads from", Some("JDBC"), None)
        .unwrap();
    model
        .add_relationship(
            &api,
            &mainframe,
            "Makes API calls to",
            Some("XML/HTTPS"),
            Some(InteractionStyle::Asynchronous),
        )
        .unwrap();

    let live_node = model
        .add_deployment_node("Live", "Big Bank plc", "", "Data center", 1)
        .unwrap();
    let web_server = model
        .add_child_deployment_node(&live_node, "bigbank-web***", "", "Ubuntu", 4)
        .unwrap();
    let db_server = model
        .add_child_deployment_node(&live_node, "bigbank-db01", "", "Ubuntu", 1)
        .unwrap();
    model.add_container_instance(&web_server, &api).unwrap();
    model.add_container_instance(&db_server, &database).unwrap();
    model
        .add_infrastructure_node(&live_node, "Load Balancer", "", "nginx")
        .unwrap();

    model.add_implicit_relationships();

    let ids = Ids {
        customer,
        banking,
        mainframe,
        web,
        api,
        database,
        controller,
        live_node,
    };

    let (model, views) = workspace.model_and_views_mut();
    views
        .create_system_landscape_view("landscape", "")
        .unwrap()
        .add_all_elements(model);
    views
        .create_system_context_view(model, &ids.banking, "context", "")
        .unwrap()
        .add_nearest_neighbours(model, &ids.banking)
        .unwrap();
    views
        .create_container_view(model, &ids.banking, "containers", "")
        .unwrap()
        .add_all_elements(model);
    views
        .create_component_view(model, &ids.api, "components", "")
        .unwrap()
        .add_all_elements(model);
    let dynamic = views
        .create_dynamic_view(model, DynamicScope::SoftwareSystem(ids.banking.clone()), "sign-in", "")
        .unwrap();
    dynamic.add(model, &ids.customer, &ids.web, None).unwrap();
    dynamic.add(model, &ids.web, &ids.api, None).unwrap();
    dynamic.add(model, &ids.api, &ids.database, None).unwrap();
    let deployment = views
        .create_deployment_view(model, Some(&ids.banking), "live", "")
        .unwrap();
    deployment.set_environment("Live");
    deployment.add_all_deployment_nodes(model);
    views
        .create_filtered_view("landscape", "external", "", FilterMode::Exclude, &["Internal"])
        .unwrap();

    (workspace, ids)
}

#[test]
fn test_view_names() {
    let (workspace, _) = build();
    let model = workspace.model();
    let names: Vec<String> = workspace
        .views()
        .views()
        .map(|view| view.name(model))
        .collect();
    assert_eq!(
        names,
        [
            "System Landscape for Big Bank plc",
            "Internet Banking System - System Context",
            "Internet Banking System - Containers",
            "Internet Banking System - API Application - Components",
            "Internet Banking System - Dynamic",
            "Internet Banking System - Deployment - Live",
        ]
    );
}

#[test]
fn test_canonical_names() {
    let (workspace, ids) = build();
    let model = workspace.model();
    let controller = model
        .get_element_with_canonical_name(
            "Internet Banking System/API Application/Sign In Controller",
        )
        .unwrap();
    assert_eq!(controller.id(), &ids.controller);
    assert_eq!(
        model
            .element(&ids.live_node)
            .map(|element| element.canonical_name()),
        Some("/Deployment/Live/Big Bank plc")
    );
    assert!(matches!(
        model.get_element_with_canonical_name("/Nope"),
        Err(ModelError::NotFound(_))
    ));
}

#[test]
fn test_implicit_relationships_reach_the_systems() {
    let (workspace, ids) = build();
    let model = workspace.model();
    assert!(model.has_efferent_relationship_with(&ids.customer, &ids.banking));
    let to_mainframe = model
        .efferent_relationship_with(&ids.banking, &ids.mainframe)
        .unwrap();
    assert_eq!(to_mainframe.technology(), "XML/HTTPS");
    assert_eq!(
        to_mainframe.interaction_style(),
        InteractionStyle::Asynchronous
    );
    assert!(to_mainframe.linked_relationship_id().is_some());
}

#[test]
fn test_static_views_contain_expected_elements() {
    let (workspace, ids) = build();
    let views = workspace.views();

    let context = views.system_context_view("context").unwrap();
    assert!(context.is_element_in_view(&ids.customer));
    assert!(context.is_element_in_view(&ids.mainframe));
    assert_eq!(context.core().relationships().len(), 2);

    let containers = views.container_view("containers").unwrap();
    assert!(!containers.is_element_in_view(&ids.banking));
    assert!(containers.is_element_in_view(&ids.database));
    assert!(!containers.is_element_in_view(&ids.controller));

    let components = views.component_view("components").unwrap();
    assert!(components.is_element_in_view(&ids.controller));
    assert!(components.is_element_in_view(&ids.web));
    assert!(!components.is_element_in_view(&ids.api));

    let dynamic = views.dynamic_view("sign-in").unwrap();
    let orders: Vec<&str> = dynamic
        .core()
        .relationships()
        .iter()
        .filter_map(|view| view.order())
        .collect();
    assert_eq!(orders, ["1", "2", "3"]);

    let deployment = views.deployment_view("live").unwrap();
    assert_eq!(deployment.core().elements().count(), 6);
}

#[test]
fn test_json_round_trip_and_hydrate() {
    let (workspace, ids) = build();
    let json = serde_json::to_string_pretty(&workspace).unwrap();

    let mut restored: Workspace = serde_json::from_str(&json).unwrap();
    restored.hydrate().unwrap();

    let model = restored.model();
    assert_eq!(
        model.elements().count(),
        workspace.model().elements().count()
    );
    let api = model.element(&ids.api).unwrap();
    assert_eq!(
        api.canonical_name(),
        "/Internet Banking System/API Application"
    );
    assert_eq!(
        model.relationships_from(&ids.api).count(),
        workspace.model().relationships_from(&ids.api).count()
    );
    assert_eq!(restored.views().len(), workspace.views().len());
    assert!(restored.views().filtered_view_with_key("external").is_some());

    // New ids continue after the restored ones.
    let added = restored
        .model_mut()
        .add_person("Back Office Staff", "")
        .unwrap();
    assert!(workspace.model().element(&added).is_none());
}

#[test]
fn test_dynamic_view_keeps_numbering_after_reload() {
    let (workspace, ids) = build();
    let json = serde_json::to_string(&workspace).unwrap();
    let mut restored: Workspace = serde_json::from_str(&json).unwrap();
    restored.hydrate().unwrap();

    let (model, views) = restored.model_and_views_mut();
    let dynamic = views.dynamic_view_mut("sign-in").unwrap();
    let order = dynamic
        .add(model, &ids.customer, &ids.web, None)
        .unwrap()
        .order()
        .map(str::to_string);
    assert_eq!(order.as_deref(), Some("4"));
    assert_eq!(dynamic.core().relationships().len(), 4);
}

#[test]
fn test_hydrate_rejects_edited_documents() {
    let (workspace, ids) = build();
    let original = serde_json::to_value(&workspace).unwrap();

    // A component moved directly under a software system.
    let mut json = original.clone();
    json["model"]["elements"][ids.controller.as_str()]["parentId"] = ids.banking.as_str().into();
    let mut restored: Workspace = serde_json::from_value(json).unwrap();
    assert!(matches!(
        restored.hydrate(),
        Err(ModelError::InvariantViolation(_))
    ));

    // Two software systems with one name.
    let mut json = original.clone();
    json["model"]["elements"][ids.mainframe.as_str()]["name"] = "Internet Banking System".into();
    let mut restored: Workspace = serde_json::from_value(json).unwrap();
    assert!(matches!(
        restored.hydrate(),
        Err(ModelError::InvariantViolation(_))
    ));

    // The same step shown twice in a dynamic view.
    let mut json = original;
    let steps = json["views"]["dynamicViews"][0]["relationships"]
        .as_array_mut()
        .unwrap();
    steps.push(steps[0].clone());
    let mut restored: Workspace = serde_json::from_value(json).unwrap();
    assert!(matches!(
        restored.hydrate(),
        Err(ModelError::InvariantViolation(_))
    ));
}

#[test]
fn test_hydrate_rejects_dangling_references() {
    let (workspace, _) = build();
    let mut json = serde_json::to_value(&workspace).unwrap();
    json["model"]["relationships"]
        .as_object_mut()
        .unwrap()
        .clear();
    let mut restored: Workspace = serde_json::from_value(json).unwrap();
    assert!(matches!(restored.hydrate(), Err(ModelError::NotFound(_))));
}

#[test]
fn test_merge_layout_from_published_version() {
    let (mut published, ids) = build();
    {
        let views = published.views_mut();
        let context = views.system_context_view_mut("context").unwrap();
        context.core_mut().set_paper_size(PaperSize::A3Landscape);
        context
            .core_mut()
            .element_view_mut(&ids.customer)
            .unwrap()
            .set_position(100, 200);
        for relationship in context.core_mut().relationships_mut() {
            relationship.set_routing(Routing::Orthogonal);
            relationship.set_position(40);
        }
        views.configuration_mut().set_last_saved_view("context");
    }

    let (mut current, _) = build();
    current.copy_layout_information_from(&published);

    let context = current.views().system_context_view("context").unwrap();
    assert_eq!(context.core().paper_size(), Some(PaperSize::A3Landscape));
    let customer = context.core().element_view(&ids.customer).unwrap();
    assert_eq!((customer.x(), customer.y()), (Some(100), Some(200)));
    assert!(
        context
            .core()
            .relationships()
            .iter()
            .all(|view| view.routing() == Some(Routing::Orthogonal) && view.position() == Some(40))
    );
    assert_eq!(
        current.views().configuration().last_saved_view(),
        Some("context")
    );
    assert!(
        !current
            .views()
            .container_view("containers")
            .unwrap()
            .core()
            .has_coordinates()
    );
}
