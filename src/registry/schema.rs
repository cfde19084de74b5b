use serde::Serialize;

/// Describes one editable field of a node payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    /// Wire name, dotted for nested fields (`content.text`).
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub requirement: Requirement,
    pub default: DefaultValue,
}

impl FieldSpec {
    /// Whether the field must be filled in, given the payload's other fields.
    pub fn is_required(&self, lookup: impl Fn(&str) -> Option<serde_json::Value>) -> bool {
        match self.requirement {
            Requirement::Required => true,
            Requirement::Optional => false,
            Requirement::RequiredWhen { field, equals } => {
                lookup(field).is_some_and(|v| v.as_str() == Some(equals))
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum FieldKind {
    Text,
    Url,
    Integer { min: u64 },
    Choice { options: &'static [&'static str] },
    Buttons,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "when")]
pub enum Requirement {
    Required,
    Optional,
    /// Required only while another field holds a given value.
    RequiredWhen {
        field: &'static str,
        equals: &'static str,
    },
}

/// Value the editor starts a field with.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum DefaultValue {
    Unset,
    Text(&'static str),
    Integer(u64),
    EmptyList,
}

pub(super) const INPUT_TYPES: &[&str] = &["text", "email", "phone"];
pub(super) const CONDITION_TYPES: &[&str] =
    &["attribute_equals", "keyword", "button_payload", "input_valid"];

pub(super) const NO_FIELDS: &[FieldSpec] = &[];

pub(super) const MESSAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "content.text",
        label: "Message Text",
        kind: FieldKind::Text,
        requirement: Requirement::Required,
        default: DefaultValue::Text(""),
    },
    FieldSpec {
        name: "content.mediaUrl",
        label: "Media URL",
        kind: FieldKind::Url,
        requirement: Requirement::Optional,
        default: DefaultValue::Unset,
    },
    FieldSpec {
        name: "content.buttons",
        label: "Quick Reply Buttons",
        kind: FieldKind::Buttons,
        requirement: Requirement::Optional,
        default: DefaultValue::EmptyList,
    },
];

pub(super) const TAG_CONTACT_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "tagName",
    label: "Tag",
    kind: FieldKind::Text,
    requirement: Requirement::Required,
    default: DefaultValue::Text(""),
}];

pub(super) const WAIT_FIELDS: &[FieldSpec] = &[FieldSpec {
    name: "durationSeconds",
    label: "Duration (seconds)",
    kind: FieldKind::Integer { min: 0 },
    requirement: Requirement::Required,
    default: DefaultValue::Integer(3600),
}];

pub(super) const GET_INPUT_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "inputType",
        label: "Input Type",
        kind: FieldKind::Choice {
            options: INPUT_TYPES,
        },
        requirement: Requirement::Required,
        default: DefaultValue::Text("text"),
    },
    FieldSpec {
        name: "prompt",
        label: "Prompt",
        kind: FieldKind::Text,
        requirement: Requirement::Required,
        default: DefaultValue::Text(""),
    },
    FieldSpec {
        name: "saveToAttribute",
        label: "Save To Attribute",
        kind: FieldKind::Text,
        requirement: Requirement::Required,
        default: DefaultValue::Text(""),
    },
];

pub(super) const CONDITION_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        name: "condition.type",
        label: "Condition Type",
        kind: FieldKind::Choice {
            options: CONDITION_TYPES,
        },
        requirement: Requirement::Required,
        default: DefaultValue::Text("attribute_equals"),
    },
    FieldSpec {
        name: "condition.attribute",
        label: "Attribute",
        kind: FieldKind::Text,
        requirement: Requirement::RequiredWhen {
            field: "condition.type",
            equals: "attribute_equals",
        },
        default: DefaultValue::Text(""),
    },
    FieldSpec {
        name: "condition.value",
        label: "Value",
        kind: FieldKind::Json,
        requirement: Requirement::Required,
        default: DefaultValue::Text(""),
    },
];
