use super::ids::{EdgeId, NodeId};
use super::payload::ConditionKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A named output slot. Only `condition` nodes declare any; every other node has a
/// single unnamed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Port {
    True,
    False,
}

impl Port {
    pub fn from_bool(outcome: bool) -> Self {
        if outcome { Port::True } else { Port::False }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, Port::True)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Port::True => "true",
            Port::False => "false",
        }
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `{type, value}` descriptor a connection may carry to gate traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchCondition {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    #[serde(default)]
    pub value: Value,
}

impl BranchCondition {
    pub fn new(kind: ConditionKind, value: impl Into<Value>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }

    /// The descriptor implied by a condition node's branch when none was given:
    /// the node's condition kind, valued with the branch outcome.
    pub fn for_branch(kind: ConditionKind, port: Port) -> Self {
        Self::new(kind, port.as_bool())
    }

    /// Which branch this descriptor stands for. Only a literal `false` value selects the
    /// `false` branch.
    pub fn polarity(&self) -> Port {
        match self.value {
            Value::Bool(false) => Port::False,
            _ => Port::True,
        }
    }
}

/// A directed connection of the editable graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<BranchCondition>,
}

impl Edge {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}
