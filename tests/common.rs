//! Common test utilities for building flow graphs and definitions.
use flowgraph::prelude::*;

#[allow(dead_code)]
pub fn message(text: &str) -> NodePayload {
    NodePayload::Message {
        content: MessageContent {
            text: Some(text.to_string()),
            media_url: None,
            buttons: Vec::new(),
        },
    }
}

#[allow(dead_code)]
pub fn tag(name: &str) -> NodePayload {
    NodePayload::TagContact {
        tag_name: Some(name.to_string()),
    }
}

#[allow(dead_code)]
pub fn attribute_check(attribute: &str, value: &str) -> NodePayload {
    NodePayload::Condition {
        condition: ConditionRule::attribute_equals(attribute, value),
    }
}

#[allow(dead_code)]
pub fn node(id: &str, payload: NodePayload) -> Node {
    Node::new(id, id.to_lowercase(), payload)
}

/// Builds the reference scenario:
///
/// `start(A) -> message(B) -> condition(C)`, with `C -> tag(D)` on `true` and
/// `C -> tag(E)` on `false`. Every payload is complete.
#[allow(dead_code)]
pub fn scenario_graph() -> FlowGraph {
    let mut graph = FlowGraph::with_id_strategy(IdStrategy::Sequential);
    graph.insert_node(node("A", NodePayload::Start)).unwrap();
    graph.insert_node(node("B", message("Hi! Are you a customer?"))).unwrap();
    graph.insert_node(node("C", attribute_check("customer", "yes"))).unwrap();
    graph.insert_node(node("D", tag("customer"))).unwrap();
    graph.insert_node(node("E", tag("lead"))).unwrap();

    graph.add_edge("A", "B", None, None).unwrap();
    graph.add_edge("B", "C", None, None).unwrap();
    graph.add_edge("C", "D", Some(Port::True), None).unwrap();
    graph.add_edge("C", "E", Some(Port::False), None).unwrap();
    graph
}

/// A start node followed by a single message.
#[allow(dead_code)]
pub fn linear_graph() -> FlowGraph {
    let mut graph = FlowGraph::with_id_strategy(IdStrategy::Sequential);
    graph.insert_node(node("start", NodePayload::Start)).unwrap();
    graph.insert_node(node("hello", message("Hello"))).unwrap();
    graph.add_edge("start", "hello", None, None).unwrap();
    graph
}

/// The scenario in its persisted form, as an older consumer writes it: no `port` fields,
/// branches told apart by the polarity of their condition.
#[allow(dead_code)]
pub fn scenario_definition_json() -> serde_json::Value {
    serde_json::json!({
        "startNodeId": "A",
        "nodes": [
            { "id": "A", "type": "start", "name": "a",
              "connections": [{ "targetNodeId": "B" }] },
            { "id": "B", "type": "message", "name": "b",
              "content": { "text": "Hi! Are you a customer?", "buttons": [] },
              "connections": [{ "targetNodeId": "C" }] },
            { "id": "C", "type": "condition", "name": "c",
              "condition": { "type": "attribute_equals", "attribute": "customer", "value": "yes" },
              "connections": [
                  { "targetNodeId": "D", "condition": { "type": "attribute_equals", "value": true } },
                  { "targetNodeId": "E", "condition": { "type": "attribute_equals", "value": false } }
              ] },
            { "id": "D", "type": "tag_contact", "name": "d", "tagName": "customer", "connections": [] },
            { "id": "E", "type": "tag_contact", "name": "e", "tagName": "lead", "connections": [] }
        ]
    })
}

/// Edges as `(source, target, port)` triples, sorted, for order-insensitive comparison.
#[allow(dead_code)]
pub fn edge_triples(graph: &FlowGraph) -> Vec<(String, String, Option<Port>)> {
    let mut triples: Vec<_> = graph
        .edges()
        .iter()
        .map(|e| (e.source.to_string(), e.target.to_string(), e.port))
        .collect();
    triples.sort();
    triples
}
