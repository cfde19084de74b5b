//! Tests for the save and activation gates.
mod common;
use common::*;
use flowgraph::prelude::*;

fn kinds(report: &ValidationReport) -> Vec<IssueKind> {
    report.issues.iter().map(|i| i.kind).collect()
}

#[test]
fn test_scenario_is_activatable() {
    let graph = scenario_graph();
    assert!(is_valid(&graph));
    assert!(is_activatable(&graph));

    let report = validate(&graph, ValidationMode::Activation);
    assert!(report.issues.is_empty(), "unexpected issues:\n{}", report);
}

#[test]
fn test_definition_and_graph_agree() {
    let definition = FlowDefinition::from_value(scenario_definition_json()).unwrap();
    assert!(is_activatable(&definition));

    let mut graph = scenario_graph();
    graph.add_node(NodeType::Wait, None).unwrap();
    let definition = Converter::default().to_definition(&graph).unwrap();
    assert_eq!(
        kinds(&validate(&graph, ValidationMode::Activation)),
        kinds(&validate(&definition, ValidationMode::Activation))
    );
}

#[test]
fn test_incomplete_payload_blocks_activation_only() {
    let mut graph = scenario_graph();
    graph
        .update_payload(
            "B",
            NodePayload::Message {
                content: MessageContent::default(),
            },
        )
        .unwrap();

    assert!(is_valid(&graph));
    assert!(!is_activatable(&graph));

    let report = validate(&graph, ValidationMode::Activation);
    let issue = report.errors().next().expect("one error");
    assert_eq!(issue.kind, IssueKind::OrphanPayload);
    assert_eq!(issue.node_id, Some(NodeId::from("B")));
    assert!(issue.message.contains("content.text"));
}

#[test]
fn test_wait_without_duration_is_valid_but_not_activatable() {
    let mut graph = linear_graph();
    graph
        .insert_node(node(
            "pause",
            NodePayload::Wait {
                duration_seconds: None,
            },
        ))
        .unwrap();
    graph.add_edge("hello", "pause", None, None).unwrap();

    assert!(is_valid(&graph));
    assert!(!is_activatable(&graph));
    assert!(
        validate(&graph, ValidationMode::Activation).has_error(IssueKind::OrphanPayload)
    );
}

#[test]
fn test_missing_and_multiple_start_nodes() {
    let mut graph = scenario_graph();
    graph.remove_node("A").unwrap();
    let report = validate(&graph, ValidationMode::Save);
    assert!(report.has_error(IssueKind::MissingStartNode));
    assert!(!is_valid(&graph));

    let mut graph = scenario_graph();
    graph.add_node(NodeType::Start, None).unwrap();
    let report = validate(&graph, ValidationMode::Save);
    assert_eq!(
        report
            .errors()
            .filter(|i| i.kind == IssueKind::MultipleStartNodes)
            .count(),
        2
    );
}

#[test]
fn test_unreachable_node_is_a_warning_when_saving() {
    let mut graph = scenario_graph();
    graph.insert_node(node("island", tag("orphan"))).unwrap();

    let save = validate(&graph, ValidationMode::Save);
    assert!(save.is_ok());
    let warning = save.warnings().next().expect("unreachable warning");
    assert_eq!(warning.kind, IssueKind::UnreachableNode);
    assert_eq!(warning.node_id, Some(NodeId::from("island")));

    let activation = validate(&graph, ValidationMode::Activation);
    assert!(activation.has_error(IssueKind::UnreachableNode));
    assert!(!is_activatable(&graph));
}

#[test]
fn test_isolated_cycle_is_unreachable() {
    let mut graph = scenario_graph();
    graph.insert_node(node("X", tag("x"))).unwrap();
    graph.insert_node(node("Y", tag("y"))).unwrap();
    graph.add_edge("X", "Y", None, None).unwrap();
    graph.add_edge("Y", "X", None, None).unwrap();

    let report = validate(&graph, ValidationMode::Activation);
    let unreachable: Vec<_> = report
        .errors()
        .filter(|i| i.kind == IssueKind::UnreachableNode)
        .map(|i| i.node_id.clone().unwrap())
        .collect();
    assert_eq!(unreachable, vec![NodeId::from("X"), NodeId::from("Y")]);
}

#[test]
fn test_dangling_edge_blocks_saving() {
    let graph = scenario_graph();
    let mut edges = graph.edges().to_vec();
    edges[1].target = NodeId::from("nowhere");
    let broken = FlowGraph::from_parts(graph.nodes().to_vec(), edges, IdStrategy::Sequential);

    let report = validate(&broken, ValidationMode::Save);
    assert!(report.has_error(IssueKind::DanglingEdge));
    assert!(!is_valid(&broken));
}

#[test]
fn test_duplicate_ids_and_start_mismatch_in_definitions() {
    let mut json = scenario_definition_json();
    json["startNodeId"] = serde_json::json!("B");
    json["nodes"][4]["id"] = serde_json::json!("D");
    let definition = FlowDefinition::from_value(json).unwrap();

    let report = validate(&definition, ValidationMode::Save);
    assert!(report.has_error(IssueKind::StartNodeMismatch));
    assert!(report.has_error(IssueKind::DuplicateNodeId));
    assert_eq!(
        report
            .issues
            .iter()
            .filter(|i| i.kind == IssueKind::DuplicateNodeId)
            .count(),
        1
    );
}

#[test]
fn test_port_rules_apply_at_activation() {
    let mut graph = scenario_graph();
    graph.insert_node(node("F", tag("f"))).unwrap();
    graph.add_edge("C", "F", None, None).unwrap();

    assert!(is_valid(&graph));
    let report = validate(&graph, ValidationMode::Activation);
    let invalid = report
        .errors()
        .find(|i| i.kind == IssueKind::InvalidPort)
        .expect("portless branch");
    assert_eq!(invalid.node_id, Some(NodeId::from("C")));
    assert!(invalid.edge.is_some());
}

#[test]
fn test_branch_without_port_or_descriptor_in_definition() {
    let mut json = scenario_definition_json();
    json["nodes"][2]["connections"][1] = serde_json::json!({ "targetNodeId": "E" });
    let definition = FlowDefinition::from_value(json).unwrap();

    let report = validate(&definition, ValidationMode::Activation);
    let invalid = report
        .errors()
        .find(|i| i.kind == IssueKind::InvalidPort)
        .expect("unnamed branch");
    assert_eq!(invalid.edge.as_deref(), Some("C#1"));
    assert!(!is_activatable(&definition));
}

#[test]
fn test_port_on_single_output_node_in_definition() {
    let mut json = scenario_definition_json();
    json["nodes"][1]["connections"][0]["port"] = serde_json::json!("true");
    let definition = FlowDefinition::from_value(json).unwrap();

    assert!(is_valid(&definition));
    let report = validate(&definition, ValidationMode::Activation);
    let invalid = report
        .errors()
        .find(|i| i.kind == IssueKind::InvalidPort)
        .expect("port on message node");
    assert_eq!(invalid.edge.as_deref(), Some("B#0"));
}

#[test]
fn test_incomplete_branch_is_only_a_warning() {
    let mut graph = scenario_graph();
    let to_e = graph
        .edges()
        .iter()
        .find(|e| e.target == "E")
        .unwrap()
        .id
        .clone();
    graph.remove_edge(&to_e).unwrap();
    graph.remove_node("E").unwrap();

    let report = validate(&graph, ValidationMode::Activation);
    assert!(report.is_ok());
    let warning = report.warnings().next().expect("missing false branch");
    assert_eq!(warning.kind, IssueKind::IncompleteBranch);
    assert!(warning.message.contains("'false'"));
}

#[test]
fn test_condition_dead_end_is_allowed() {
    let mut graph = scenario_graph();
    graph.remove_node("D").unwrap();
    graph.remove_node("E").unwrap();

    let report = validate(&graph, ValidationMode::Activation);
    assert!(report.is_ok());
    assert_eq!(kinds(&report), vec![IssueKind::IncompleteBranch]);
    assert!(report.issues[0].message.contains("no outgoing branches"));
}

#[test]
fn test_every_issue_is_reported() {
    let mut graph = FlowGraph::with_id_strategy(IdStrategy::Sequential);
    graph
        .insert_node(node(
            "w",
            NodePayload::Wait {
                duration_seconds: None,
            },
        ))
        .unwrap();
    graph.insert_node(node("t", NodePayload::TagContact { tag_name: None })).unwrap();

    let report = validate(&graph, ValidationMode::Activation);
    assert!(report.has_error(IssueKind::MissingStartNode));
    assert_eq!(
        report
            .errors()
            .filter(|i| i.kind == IssueKind::UnreachableNode)
            .count(),
        2
    );
    assert_eq!(
        report
            .errors()
            .filter(|i| i.kind == IssueKind::OrphanPayload)
            .count(),
        2
    );
}
