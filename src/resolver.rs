//! Editing support: which fields a node type needs, and what they start out as.

use crate::model::{ConditionKind, ConditionRule, InputType, MessageContent, NodePayload, Port};
use crate::registry::{DefaultValue, FieldSpec, NodeType, Requirement};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// The fields of a node type split the way the configuration panel presents them.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeConfig {
    pub node_type: NodeType,
    /// Always required before activation.
    pub required: Vec<&'static FieldSpec>,
    /// Optional, or required only in combination with another field's value.
    pub optional: Vec<&'static FieldSpec>,
    pub ports: &'static [Port],
}

pub fn resolve_config(node_type: NodeType) -> NodeConfig {
    let (required, optional): (Vec<&'static FieldSpec>, Vec<&'static FieldSpec>) = node_type
        .payload_schema()
        .iter()
        .partition(|f| f.requirement == Requirement::Required);
    NodeConfig {
        node_type,
        required,
        optional,
        ports: node_type.output_ports(),
    }
}

/// Display name given to freshly added nodes.
pub fn default_name(node_type: NodeType) -> String {
    format!("New {} node", node_type.as_str())
}

/// A payload of the given type with every field at its registry default.
pub fn default_payload(node_type: NodeType) -> NodePayload {
    apply_defaults(NodePayload::empty(node_type))
}

/// Fills every unset field of `payload` with its registry default. Set fields are kept.
pub fn apply_defaults(payload: NodePayload) -> NodePayload {
    let node_type = payload.node_type();
    match payload {
        NodePayload::Message { content } => NodePayload::Message {
            content: MessageContent {
                text: content.text.or_else(|| text_default(node_type, "content.text")),
                media_url: content
                    .media_url
                    .or_else(|| text_default(node_type, "content.mediaUrl")),
                buttons: content.buttons,
            },
        },
        NodePayload::TagContact { tag_name } => NodePayload::TagContact {
            tag_name: tag_name.or_else(|| text_default(node_type, "tagName")),
        },
        NodePayload::Wait { duration_seconds } => NodePayload::Wait {
            duration_seconds: duration_seconds
                .or_else(|| integer_default(node_type, "durationSeconds")),
        },
        NodePayload::GetInput {
            input_type,
            prompt,
            save_to_attribute,
        } => NodePayload::GetInput {
            input_type: input_type.or_else(|| choice_default::<InputType>(node_type, "inputType")),
            prompt: prompt.or_else(|| text_default(node_type, "prompt")),
            save_to_attribute: save_to_attribute
                .or_else(|| text_default(node_type, "saveToAttribute")),
        },
        NodePayload::Condition { condition } => {
            let kind = condition
                .kind
                .or_else(|| choice_default::<ConditionKind>(node_type, "condition.type"));
            // The attribute only means something for attribute comparisons.
            let attribute = match kind {
                Some(ConditionKind::AttributeEquals) => condition
                    .attribute
                    .or_else(|| text_default(node_type, "condition.attribute")),
                _ => condition.attribute,
            };
            NodePayload::Condition {
                condition: ConditionRule {
                    kind,
                    attribute,
                    value: condition
                        .value
                        .or_else(|| text_default(node_type, "condition.value").map(Value::String)),
                },
            }
        }
        other @ (NodePayload::Start | NodePayload::HumanTakeover) => other,
    }
}

/// Wire names of the fields that must be filled in before the node can run but are unset
/// or blank.
pub fn missing_required(payload: &NodePayload) -> Vec<&'static str> {
    let lookup = |name: &str| payload.field(name);
    payload
        .node_type()
        .payload_schema()
        .iter()
        .filter(|spec| spec.is_required(lookup))
        .filter(|spec| lookup(spec.name).is_none_or(|value| is_blank(&value)))
        .map(|spec| spec.name)
        .collect()
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

fn text_default(node_type: NodeType, field: &str) -> Option<String> {
    match node_type.field(field).map(|f| &f.default) {
        Some(DefaultValue::Text(text)) => Some((*text).to_string()),
        _ => None,
    }
}

fn integer_default(node_type: NodeType, field: &str) -> Option<u64> {
    match node_type.field(field).map(|f| &f.default) {
        Some(DefaultValue::Integer(n)) => Some(*n),
        _ => None,
    }
}

fn choice_default<T: DeserializeOwned>(node_type: NodeType, field: &str) -> Option<T> {
    text_default(node_type, field).and_then(|s| serde_json::from_value(Value::String(s)).ok())
}
