//! Unit tests for wire shapes, configuration and error messages.
mod common;
use common::*;
use flowgraph::converter;
use flowgraph::prelude::*;
use serde_json::json;

#[test]
fn test_definition_wire_shape() {
    let definition = converter::to_definition(&scenario_graph()).unwrap();
    let value = serde_json::to_value(&definition).unwrap();

    assert_eq!(value["startNodeId"], "A");
    let b = &value["nodes"][1];
    assert_eq!(b["type"], "message");
    assert_eq!(b["content"]["text"], "Hi! Are you a customer?");
    assert_eq!(b["connections"][0], json!({ "targetNodeId": "C" }));

    let c = &value["nodes"][2];
    assert_eq!(
        c["condition"],
        json!({ "type": "attribute_equals", "attribute": "customer", "value": "yes" })
    );
    assert_eq!(
        c["connections"][1],
        json!({
            "targetNodeId": "E",
            "condition": { "type": "attribute_equals", "value": false },
            "port": "false"
        })
    );

    let d = &value["nodes"][3];
    assert_eq!(d["tagName"], "customer");
    assert!(d.get("tag_name").is_none());
}

#[test]
fn test_definition_json_round_trip() {
    let definition = converter::to_definition(&scenario_graph()).unwrap();
    let json = definition.to_json_pretty().unwrap();
    assert_eq!(FlowDefinition::from_json(&json).unwrap(), definition);
}

#[test]
fn test_payload_fields_by_wire_name() {
    let payload = NodePayload::GetInput {
        input_type: Some(InputType::Email),
        prompt: Some("Your email?".to_string()),
        save_to_attribute: None,
    };
    assert_eq!(payload.field("inputType"), Some(json!("email")));
    assert_eq!(payload.field("saveToAttribute"), None);
    assert_eq!(message("hi").field("content.text"), Some(json!("hi")));
}

#[test]
fn test_message_buttons_wire_shape() {
    let payload = NodePayload::Message {
        content: MessageContent {
            text: Some("Pick one".to_string()),
            media_url: Some("https://example.com/a.png".to_string()),
            buttons: vec![MessageButton::quick_reply("Yes", "YES")],
        },
    };
    assert_eq!(
        payload.to_json_value().unwrap(),
        json!({
            "type": "message",
            "content": {
                "text": "Pick one",
                "mediaUrl": "https://example.com/a.png",
                "buttons": [{ "type": "quick_reply", "text": "Yes", "payload": "YES" }]
            }
        })
    );
}

#[test]
fn test_flow_wire_shape() {
    let flow = Flow::new("f1", "Flow", "start").with_account("ig_1");
    let value = serde_json::to_value(&flow).unwrap();
    assert_eq!(value["instagramAccountId"], "ig_1");
    assert_eq!(value["status"], "draft");
    assert_eq!(value["flowDefinition"]["startNodeId"], "start");
    assert!(value.get("description").is_none());

    let back: Flow = serde_json::from_value(value).unwrap();
    assert_eq!(back, flow);
}

#[test]
fn test_status_transition_table() {
    use FlowStatus::*;
    assert!(Draft.can_transition_to(Active));
    assert!(Inactive.can_transition_to(Active));
    assert!(Active.can_transition_to(Active));
    assert!(Active.can_transition_to(Inactive));
    assert!(!Draft.can_transition_to(Inactive));
    assert!(!Inactive.can_transition_to(Draft));
    assert!(!Active.can_transition_to(Draft));
}

#[test]
fn test_config_from_json() {
    let config = FlowConfig::from_json(r#"{ "portEncoding": "inferred" }"#).unwrap();
    assert_eq!(config.port_encoding, PortEncoding::Inferred);
    assert_eq!(config.id_strategy, IdStrategy::Uuid);

    let config = FlowConfig::from_json("{}").unwrap();
    assert_eq!(config, FlowConfig::default());

    assert!(matches!(
        FlowConfig::from_json(r#"{ "portEncoding": "sometimes" }"#),
        Err(SchemaError::Json(_))
    ));
}

#[test]
fn test_error_messages() {
    let err = ConvertError::MultipleStartNodes {
        node_ids: vec![NodeId::from("a"), NodeId::from("b")],
    };
    assert_eq!(err.to_string(), "The flow has more than one start node: a, b");

    let err = ConvertError::InvalidPort {
        node_id: NodeId::from("c"),
        target_node_id: NodeId::from("d"),
        port: None,
    };
    assert!(err.to_string().contains("must name a 'true' or 'false' port"));

    let err = SchemaError::UnknownNodeType {
        node_id: None,
        type_name: "fax".to_string(),
    }
    .at(&NodeId::from("n1"));
    assert_eq!(err.to_string(), "Unknown node type 'fax' on node 'n1'");

    let err = SessionError::InvalidStatusTransition {
        from: FlowStatus::Draft,
        to: FlowStatus::Inactive,
    };
    assert_eq!(err.to_string(), "Cannot move flow from 'draft' to 'inactive'");
}

#[test]
fn test_report_display() {
    let mut graph = linear_graph();
    graph.insert_node(node("lost", tag("x"))).unwrap();
    let report = validate(&graph, ValidationMode::Save);
    assert_eq!(
        report.to_string(),
        "[warning] UnreachableNode: Node 'lost' has no incoming connection"
    );

    let clean = validate(&linear_graph(), ValidationMode::Save);
    assert_eq!(clean.to_string(), "no issues");
}
