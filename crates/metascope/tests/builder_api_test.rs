//! Integration tests for the MetamodelBuilder API

use metascope::{
    MetamodelBuilder, MetascopeError,
    config::{AppConfig, ExportConfig, GraphConfig},
    export::{ExportDocument, MetamodelExporter},
    graph::{ObjectGraphFactory, RelationKind},
};
use metascope_core::{identifier::Id, provider::TypeProvider};

const SALES_UNIVERSE: &str = r#"
[[types]]
class = "com.acme.sales.Customer"
logical_type = "sales.Customer"
sort = "entity"

[[types.properties]]
id = "name"
element_type = "java.lang.String"

[[types.properties]]
id = "account"
element_type = "com.acme.sales.Account"

[[types]]
class = "com.acme.sales.Account"
logical_type = "sales.Account"
sort = "entity"

[[types]]
class = "com.acme.sales.PersonValueType"
logical_type = "sales.PersonValueType"
sort = "value"

[[on_demand]]
class = "java.lang.String"
logical_type = "java.lang.String"
sort = "value"
flags = { builtin = true }
"#;

fn sales_builder() -> MetamodelBuilder {
    let export = ExportConfig::default()
        .with_namespace_prefixes(["sales"])
        .with_ignore_builtin_value_types(false);
    MetamodelBuilder::new(AppConfig::new(export, GraphConfig::default()))
}

fn record_ids(document: &ExportDocument) -> Vec<String> {
    document
        .domain_classes()
        .iter()
        .map(|record| record.id().to_string())
        .collect()
}

#[test]
fn test_example_export() {
    let builder = sales_builder();
    let universe = builder
        .load_universe(SALES_UNIVERSE)
        .expect("Failed to load universe");

    let document = builder.export(&universe).expect("Failed to export");

    assert_eq!(
        record_ids(&document),
        vec!["sales.Account", "sales.Customer", "sales.PersonValueType"]
    );

    let customer = document
        .domain_class("sales.Customer")
        .expect("Customer exported");
    let properties: Vec<&str> = customer
        .properties()
        .iter()
        .map(|property| property.id())
        .collect();
    assert_eq!(properties, vec!["account", "name"]);
    assert_eq!(customer.properties()[0].element_type(), "sales.Account");
    assert_eq!(customer.properties()[1].element_type(), "java.lang.String");
}

#[test]
fn test_example_graph() {
    let builder = sales_builder();
    let universe = builder
        .load_universe(SALES_UNIVERSE)
        .expect("Failed to load universe");

    let selection = vec![
        universe
            .type_by_class(Id::new("com.acme.sales.Customer"))
            .expect("Customer registered"),
        universe
            .type_by_class(Id::new("com.acme.sales.Account"))
            .expect("Account registered"),
    ];
    let graph = ObjectGraphFactory::new(&universe, selection).create();

    assert_eq!(graph.objects().len(), 2);
    let associations: Vec<_> = graph.relations_of_kind(RelationKind::OneToOne).collect();
    assert_eq!(associations.len(), 1);
    assert_eq!(associations[0].label(), Some("account"));

    let source = graph.object(associations[0].source()).expect("source node");
    let target = graph.object(associations[0].target()).expect("target node");
    assert_eq!(source.name(), "Customer");
    assert_eq!(target.name(), "Account");

    assert_eq!(graph.relations_of_kind(RelationKind::Inheritance).count(), 0);
}

#[test]
fn test_builder_graph_matches_factory() {
    let builder = sales_builder();
    let universe = builder
        .load_universe(SALES_UNIVERSE)
        .expect("Failed to load universe");

    let graph = builder.object_graph(&universe);

    let names: Vec<&str> = graph.objects().iter().map(|node| node.name()).collect();
    assert_eq!(names, vec!["Customer", "Account"]);
    assert_eq!(graph.relations().len(), 1);
}

#[test]
fn test_tiny_domain_matches_full_pipeline() {
    let builder = sales_builder();
    let universe = builder
        .load_universe(SALES_UNIVERSE)
        .expect("Failed to load universe");

    let tiny_config = ExportConfig::default()
        .with_namespace_prefixes(["sales.Customer", "sales.Account"])
        .with_ignore_builtin_value_types(false);
    let tiny = MetamodelExporter::new(&universe, &tiny_config)
        .export()
        .expect("Failed to export tiny domain");
    assert_eq!(record_ids(&tiny), vec!["sales.Account", "sales.Customer"]);

    let full = builder.export(&universe).expect("Failed to export");
    for record in tiny.domain_classes() {
        let counterpart = full
            .domain_class(&record.id().to_string())
            .expect("Record present in full export");
        assert_eq!(record, counterpart);
    }
}

#[test]
fn test_duplicate_logical_types_are_reported() {
    let source = r#"
[[types]]
class = "com.acme.sales.Customer"
logical_type = "sales.Customer"
sort = "entity"

[[types]]
class = "com.acme.legacy.Customer"
logical_type = "sales.Customer"
sort = "entity"
"#;

    let builder = MetamodelBuilder::default();
    let universe = builder.load_universe(source).expect("Failed to load universe");

    let Err(MetascopeError::DuplicateLogicalTypes(err)) = builder.export(&universe) else {
        panic!("Expected a duplicate logical type error");
    };
    assert_eq!(err.mappings().len(), 1);
    let message = err.to_string();
    assert!(message.contains("com.acme.sales.Customer"));
    assert!(message.contains("com.acme.legacy.Customer"));
}

#[test]
fn test_document_serializes_to_json() {
    let builder = sales_builder();
    let universe = builder
        .load_universe(SALES_UNIVERSE)
        .expect("Failed to load universe");
    let document = builder.export(&universe).expect("Failed to export");

    let json = serde_json::to_value(&document).expect("Failed to serialize");

    let classes = json["domain_classes"].as_array().expect("array of records");
    assert_eq!(classes.len(), 3);
    assert_eq!(classes[1]["id"], "sales.Customer");
    assert_eq!(classes[1]["properties"][0]["id"], "account");
    assert_eq!(classes[1]["properties"][0]["element_type"], "sales.Account");
}

#[test]
fn test_graph_serializes_to_json() {
    let builder = sales_builder();
    let universe = builder
        .load_universe(SALES_UNIVERSE)
        .expect("Failed to load universe");
    let graph = builder.object_graph(&universe);

    let json = serde_json::to_value(&graph).expect("Failed to serialize");

    assert_eq!(json["objects"][0]["id"], "o0");
    assert_eq!(json["relations"][0]["kind"], "ONE_TO_ONE");
    assert_eq!(json["relations"][0]["label"], "account");
    assert!(json["relations"][0].get("note").is_none());
}

#[test]
fn test_builder_reusability() {
    let builder = sales_builder();
    let universe = builder
        .load_universe(SALES_UNIVERSE)
        .expect("Failed to load universe");

    let first = builder.export(&universe).expect("Failed to export");
    let second = builder.export(&universe).expect("Failed to export");
    assert_eq!(first, second);

    assert_eq!(builder.object_graph(&universe), builder.object_graph(&universe));
}
