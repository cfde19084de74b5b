use crate::registry::NodeType;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// The type-specific data of a node, tagged by the node's `type`.
///
/// Fields are optional so that drafts can be saved half-configured. Which fields an
/// activatable flow needs is decided by the registry, not by this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum NodePayload {
    Start,
    Message {
        #[serde(default)]
        content: MessageContent,
    },
    TagContact {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        tag_name: Option<String>,
    },
    HumanTakeover,
    Wait {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_seconds: Option<u64>,
    },
    GetInput {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input_type: Option<InputType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        save_to_attribute: Option<String>,
    },
    Condition {
        #[serde(default)]
        condition: ConditionRule,
    },
}

impl NodePayload {
    /// A payload of the given type with every field left unset.
    pub fn empty(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Start => NodePayload::Start,
            NodeType::Message => NodePayload::Message {
                content: MessageContent::default(),
            },
            NodeType::TagContact => NodePayload::TagContact { tag_name: None },
            NodeType::HumanTakeover => NodePayload::HumanTakeover,
            NodeType::Wait => NodePayload::Wait {
                duration_seconds: None,
            },
            NodeType::GetInput => NodePayload::GetInput {
                input_type: None,
                prompt: None,
                save_to_attribute: None,
            },
            NodeType::Condition => NodePayload::Condition {
                condition: ConditionRule::default(),
            },
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self {
            NodePayload::Start => NodeType::Start,
            NodePayload::Message { .. } => NodeType::Message,
            NodePayload::TagContact { .. } => NodeType::TagContact,
            NodePayload::HumanTakeover => NodeType::HumanTakeover,
            NodePayload::Wait { .. } => NodeType::Wait,
            NodePayload::GetInput { .. } => NodeType::GetInput,
            NodePayload::Condition { .. } => NodeType::Condition,
        }
    }

    /// The payload as a JSON object keyed by wire field names, including `type`.
    pub fn to_json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Looks up a field by its registry name, e.g. `"content.text"` or `"durationSeconds"`.
    /// Unset fields and explicit `null`s both yield `None`.
    pub fn field(&self, path: &str) -> Option<Value> {
        let pointer = format!("/{}", path.replace('.', "/"));
        let mut value = self.json_object();
        match value.pointer_mut(&pointer) {
            None | Some(Value::Null) => None,
            Some(field) => Some(field.take()),
        }
    }

    /// Serializing a payload cannot fail: every map in it has string keys and every leaf
    /// is plain data or an already parsed [`Value`].
    fn json_object(&self) -> Value {
        match self.to_json_value() {
            Ok(value) => value,
            Err(e) => unreachable!("node payload failed to serialize: {e}"),
        }
    }
}

/// Content of a `message` node. Nested under `content` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default)]
    pub buttons: Vec<MessageButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageButton {
    #[serde(rename = "type")]
    pub kind: ButtonKind,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl MessageButton {
    pub fn quick_reply(text: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind: ButtonKind::QuickReply,
            text: text.into(),
            payload: Some(payload.into()),
            url: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonKind {
    QuickReply,
    Url,
}

/// What a `get_input` node expects the contact to type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    Text,
    Email,
    Phone,
}

/// The test a `condition` node performs. Nested under `condition` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionRule {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ConditionKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ConditionRule {
    pub fn new(kind: ConditionKind, value: impl Into<Value>) -> Self {
        Self {
            kind: Some(kind),
            attribute: None,
            value: Some(value.into()),
        }
    }

    pub fn attribute_equals(attribute: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            kind: Some(ConditionKind::AttributeEquals),
            attribute: Some(attribute.into()),
            value: Some(value.into()),
        }
    }
}

/// Kinds of tests, shared by condition nodes and by the descriptors on their branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    #[default]
    AttributeEquals,
    Keyword,
    ButtonPayload,
    InputValid,
}

impl ConditionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionKind::AttributeEquals => "attribute_equals",
            ConditionKind::Keyword => "keyword",
            ConditionKind::ButtonPayload => "button_payload",
            ConditionKind::InputValid => "input_valid",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
