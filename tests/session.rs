//! Tests for editing sessions against the supplied stores.
mod common;
use common::*;
use flowgraph::converter;
use flowgraph::prelude::*;

fn seeded_store() -> InMemoryStore {
    let definition = converter::to_definition(&scenario_graph()).unwrap();
    let mut flow = Flow::new("welcome", "Welcome", "A").with_account("ig_123");
    flow.flow_definition = definition;
    InMemoryStore::new().with_flow(flow)
}

fn sequential() -> FlowConfig {
    FlowConfig::default().with_id_strategy(IdStrategy::Sequential)
}

#[test]
fn test_open_loads_the_graph() {
    let mut store = seeded_store();
    let session = EditSession::open(&mut store, "welcome", sequential()).unwrap();
    assert_eq!(session.flow_id(), "welcome");
    assert_eq!(session.status(), FlowStatus::Draft);
    assert_eq!(edge_triples(session.graph()), edge_triples(&scenario_graph()));
    assert!(!session.is_dirty());
}

#[test]
fn test_open_unknown_flow() {
    let mut store = InMemoryStore::new();
    match EditSession::open(&mut store, "missing", sequential()) {
        Err(SessionError::Store(StoreError::FlowNotFound(id))) => assert_eq!(id, "missing"),
        Err(other) => panic!("Expected FlowNotFound, got {:?}", other),
        Ok(_) => panic!("Expected FlowNotFound"),
    }
}

#[test]
fn test_new_flow_then_save() {
    let mut store = InMemoryStore::new();
    let flow = Flow::new("fresh", "Fresh", "start");
    let mut session = EditSession::new_flow(&mut store, flow, sequential()).unwrap();

    let graph = session.graph_mut();
    let hello = graph.add_node(NodeType::Message, Some(message("Hello"))).unwrap();
    graph.add_edge("start", &hello, None, None).unwrap();
    assert!(session.is_dirty());

    let report = session.save().unwrap();
    assert!(report.is_ok());
    assert!(!session.is_dirty());
    drop(session);

    assert_eq!(store.definition_saves(), 1);
    let stored = store.load_definition("fresh").unwrap();
    assert_eq!(stored.start_node_id, "start");
    assert_eq!(stored.node("start").unwrap().connections[0].target_node_id, hello);
}

#[test]
fn test_new_flow_rejects_taken_id() {
    let mut store = seeded_store();
    let flow = Flow::new("welcome", "Again", "start");
    assert!(matches!(
        EditSession::new_flow(&mut store, flow, sequential()),
        Err(SessionError::Store(StoreError::FlowExists(_)))
    ));
}

#[test]
fn test_rejected_save_does_not_touch_storage() {
    let mut store = seeded_store();
    let mut session = EditSession::open(&mut store, "welcome", sequential()).unwrap();
    session.graph_mut().remove_node("A").unwrap();

    match session.save() {
        Err(SessionError::SaveRejected(report)) => {
            assert!(report.has_error(IssueKind::MissingStartNode));
        }
        other => panic!("Expected SaveRejected, got {:?}", other),
    }
    assert!(session.is_dirty());
    drop(session);
    assert_eq!(store.definition_saves(), 0);
}

#[test]
fn test_activation_gating() {
    let mut store = seeded_store();
    let mut session = EditSession::open(&mut store, "welcome", sequential()).unwrap();

    session
        .graph_mut()
        .update_payload("D", NodePayload::TagContact { tag_name: None })
        .unwrap();
    session.save().unwrap();

    let outcome = session.request_activation().unwrap();
    assert!(!outcome.is_activated());
    assert!(outcome.report().has_error(IssueKind::OrphanPayload));
    assert_eq!(session.status(), FlowStatus::Draft);

    session
        .graph_mut()
        .update_payload("D", tag("customer"))
        .unwrap();
    session.save().unwrap();
    let outcome = session.request_activation().unwrap();
    assert!(outcome.is_activated());
    assert_eq!(session.status(), FlowStatus::Active);
    drop(session);

    assert_eq!(store.status_updates(), 1);
    assert_eq!(store.load_flow("welcome").unwrap().status, FlowStatus::Active);
}

#[test]
fn test_activation_requires_saved_edits() {
    let mut store = seeded_store();
    let mut session = EditSession::open(&mut store, "welcome", sequential()).unwrap();
    session.graph_mut().rename_node("B", "Greeting").unwrap();

    assert!(matches!(
        session.request_activation(),
        Err(SessionError::UnsavedChanges)
    ));
    drop(session);
    assert_eq!(store.status_updates(), 0);
}

#[test]
fn test_active_flow_saves_run_activation_checks() {
    let mut store = seeded_store();
    let mut session = EditSession::open(&mut store, "welcome", sequential()).unwrap();
    assert!(session.request_activation().unwrap().is_activated());

    session
        .graph_mut()
        .update_payload("E", NodePayload::TagContact { tag_name: None })
        .unwrap();
    assert!(matches!(
        session.save(),
        Err(SessionError::SaveRejected(report)) if report.has_error(IssueKind::OrphanPayload)
    ));
}

#[test]
fn test_status_transitions() {
    let mut store = seeded_store();
    let mut session = EditSession::open(&mut store, "welcome", sequential()).unwrap();

    match session.deactivate() {
        Err(SessionError::InvalidStatusTransition { from, to }) => {
            assert_eq!(from, FlowStatus::Draft);
            assert_eq!(to, FlowStatus::Inactive);
        }
        other => panic!("Expected InvalidStatusTransition, got {:?}", other),
    }

    assert!(session.request_activation().unwrap().is_activated());
    session.deactivate().unwrap();
    assert_eq!(session.status(), FlowStatus::Inactive);
    assert!(session.request_activation().unwrap().is_activated());
}

#[test]
fn test_discard_restores_stored_graph() {
    let mut store = seeded_store();
    let mut session = EditSession::open(&mut store, "welcome", sequential()).unwrap();
    session.graph_mut().remove_node("C").unwrap();
    assert_eq!(session.graph().nodes().len(), 4);

    session.discard().unwrap();
    assert!(!session.is_dirty());
    assert_eq!(session.graph().nodes().len(), 5);
    assert_eq!(edge_triples(session.graph()), edge_triples(&scenario_graph()));
}

#[test]
fn test_backend_errors_surface_unchanged() {
    let mut store = seeded_store();
    store.fail_writes("disk on fire");
    let mut session = EditSession::open(&mut store, "welcome", sequential()).unwrap();

    match session.request_activation() {
        Err(SessionError::Store(StoreError::Backend(e))) => {
            assert_eq!(e.to_string(), "disk on fire")
        }
        other => panic!("Expected a backend error, got {:?}", other),
    }
    assert_eq!(session.status(), FlowStatus::Draft);
}

#[test]
fn test_json_file_store_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = JsonFileStore::open(dir.path()).unwrap();
    let flow = Flow::new("promo", "Promo", "start").with_description("Spring promo");

    {
        let mut session = EditSession::new_flow(&mut store, flow, sequential()).unwrap();
        let graph = session.graph_mut();
        let check = graph
            .add_node(NodeType::Condition, Some(attribute_check("vip", "true")))
            .unwrap();
        let yes = graph.add_node(NodeType::TagContact, Some(tag("vip"))).unwrap();
        let no = graph.add_node(NodeType::HumanTakeover, None).unwrap();
        graph.add_edge("start", &check, None, None).unwrap();
        graph.add_edge(&check, &yes, Some(Port::True), None).unwrap();
        graph.add_edge(&check, &no, Some(Port::False), None).unwrap();
        session.save().unwrap();
        assert!(session.request_activation().unwrap().is_activated());
    }

    assert!(dir.path().join("promo.json").exists());
    // Three writes (create, save, activate) leave no temporary files behind.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    assert_eq!(store.flow_ids().unwrap(), vec![FlowId::from("promo")]);

    let reopened = JsonFileStore::open(dir.path()).unwrap();
    let flow = reopened.load_flow("promo").unwrap();
    assert_eq!(flow.status, FlowStatus::Active);
    assert_eq!(flow.description.as_deref(), Some("Spring promo"));
    assert_eq!(flow.flow_definition.nodes.len(), 4);
    assert!(is_activatable(&flow.flow_definition));

    assert!(matches!(
        reopened.load_flow("nope"),
        Err(StoreError::FlowNotFound(_))
    ));
    assert!(matches!(
        reopened.load_flow("../etc/passwd"),
        Err(StoreError::Backend(_))
    ));
}
