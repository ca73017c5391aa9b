//! Integration tests for the DiagramBuilder API
//!
//! These tests verify that the public API works end to end on realistic payloads.

use draftboard::{
    DiagramBuilder, DraftboardError,
    config::AppConfig,
    geometry::Bounds,
    graph::{DiagramVariant, SemanticType},
    payload::RawGraph,
};

const ARCHITECTURE: &str = r#"{
    "nodes": [
        { "id": "client_app", "type": "frontend", "data": { "label": "Web Client" } },
        { "id": "api_gateway", "type": "backend", "data": { "label": "API Gateway" } },
        { "id": "auth_service", "type": "service", "data": { "label": "Auth" } },
        { "id": "validate_creds", "type": "logic", "data": { "label": "Validate" } },
        { "id": "main_db", "type": "database", "data": { "label": "Postgres" } }
    ],
    "edges": [
        { "id": "e1", "source": "client_app", "target": "api_gateway", "label": "HTTPS" },
        { "id": "e2", "source": "api_gateway", "target": "auth_service" },
        { "id": "e3", "source": "auth_service", "target": "validate_creds" },
        { "id": "e4", "source": "api_gateway", "target": "main_db" },
        { "id": "e5", "source": "validate_creds", "target": "main_db" }
    ]
}"#;

const BLUEPRINT: &str = r#"{
    "logicFlow": {
        "nodes": [{ "id": "client_app", "type": "frontend", "data": { "label": "Client" } }],
        "edges": []
    },
    "databaseSchema": {
        "nodes": [
            {
                "id": "users",
                "type": "databaseSchema",
                "data": {
                    "label": "users",
                    "columns": [
                        { "name": "id", "type": "uuid", "isPrimary": true },
                        { "name": "email", "type": "varchar" }
                    ]
                }
            },
            {
                "id": "orders",
                "type": "databaseSchema",
                "data": {
                    "label": "orders",
                    "columns": [{ "name": "user_id", "type": "uuid" }]
                }
            }
        ],
        "edges": [{ "id": "fk", "source": "users", "target": "orders" }]
    }
}"#;

#[test]
fn test_builder_api_exists() {
    let _builder = DiagramBuilder::default();
}

#[test]
fn test_render_architecture() {
    let builder = DiagramBuilder::new(AppConfig::default());
    let raw = builder
        .parse(ARCHITECTURE, DiagramVariant::Flow)
        .expect("Failed to parse payload");
    let publication = builder.render(raw, DiagramVariant::Flow);

    let snapshot = &publication.snapshot;
    assert_eq!(snapshot.len(), 5);
    assert_eq!(snapshot.edges().len(), 5);
    assert!(publication.dropped_edges.is_empty());

    let bounds: Vec<Bounds> = snapshot
        .nodes()
        .map(|node| {
            let style = node.style().expect("node should be styled");
            Bounds::new_from_top_left(node.position().expect("node should be placed"), style.size())
        })
        .collect();
    for (i, a) in bounds.iter().enumerate() {
        for b in &bounds[i + 1..] {
            assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
        }
    }

    for edge in snapshot.edges() {
        assert!(edge.source_handle().is_some());
        assert!(edge.target_handle().is_some());
        let waypoints = edge.waypoints();
        assert!(waypoints.len() >= 4);
        assert!(
            waypoints
                .windows(2)
                .all(|pair| pair[0].x() == pair[1].x() || pair[0].y() == pair[1].y())
        );
        assert!(edge.style().is_some());
    }

    let db = snapshot.node("main_db").unwrap();
    assert_eq!(db.tags().original(), Some(SemanticType::Database));
    assert!(db.style().unwrap().is_hub());
}

#[test]
fn test_blueprint_envelope_selects_variant() {
    let builder = DiagramBuilder::default();

    let flow = builder.parse(BLUEPRINT, DiagramVariant::Flow).unwrap();
    assert_eq!(flow.nodes.len(), 1);

    let schema = builder.parse(BLUEPRINT, DiagramVariant::Schema).unwrap();
    let publication = builder.render(schema, DiagramVariant::Schema);
    let users = publication.snapshot.node("users").unwrap();
    let orders = publication.snapshot.node("orders").unwrap();

    assert_eq!(users.columns().len(), 2);
    assert!(users.columns()[0].is_primary_key);
    // Schema diagrams run left to right.
    assert!(orders.position().unwrap().x() > users.position().unwrap().x());
    let edge = &publication.snapshot.edges()[0];
    assert_eq!(edge.source_handle().unwrap().to_string(), "right");
    assert_eq!(edge.target_handle().unwrap().to_string(), "left-target");
}

#[test]
fn test_snapshot_serialization_shape() {
    let builder = DiagramBuilder::default();
    let raw = builder.parse(BLUEPRINT, DiagramVariant::Schema).unwrap();
    let publication = builder.render(raw, DiagramVariant::Schema);

    let json = serde_json::to_value(&publication.snapshot).unwrap();
    let node = &json["nodes"][0];
    assert_eq!(node["type"], "databaseSchema");
    assert!(node["position"]["x"].is_number());
    assert_eq!(node["data"]["label"], "users");
    assert_eq!(node["data"]["columns"][0]["isPrimary"], true);

    let edge = &json["edges"][0];
    assert_eq!(edge["sourceHandle"], "right");
    assert_eq!(edge["targetHandle"], "left-target");
}

#[test]
fn test_empty_payload_renders_empty_snapshot() {
    let builder = DiagramBuilder::default();
    let raw = builder.parse(r#"{ "nodes": [], "edges": [] }"#, DiagramVariant::Flow).unwrap();
    let publication = builder.render(raw, DiagramVariant::Flow);
    assert!(publication.snapshot.is_empty());
}

#[test]
fn test_malformed_payload_keeps_source() {
    let builder = DiagramBuilder::default();
    let source = "{ \"nodes\": [ { \"id\": 42 } ] }";
    match builder.parse(source, DiagramVariant::Flow) {
        Err(DraftboardError::Payload { src, .. }) => assert_eq!(src, source),
        other => panic!("expected a payload error, got {other:?}"),
    }

    let truncated = "{ \"nodes\": [";
    let err = builder.parse(truncated, DiagramVariant::Flow).unwrap_err();
    assert!(err.to_string().starts_with("Malformed graph payload"));

    // Payloads the core decoder rejects surface the same way.
    let missing_id = r#"{ "nodes": [ { "type": "frontend" } ] }"#;
    assert!(RawGraph::from_json(missing_id).is_err());
    assert!(matches!(
        builder.parse(missing_id, DiagramVariant::Flow),
        Err(DraftboardError::Payload { .. })
    ));
}
