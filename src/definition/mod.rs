//! The persisted form of a flow: nodes with their outgoing connections embedded.
//!
//! ```json
//! {
//!   "startNodeId": "A",
//!   "nodes": [
//!     { "id": "A", "type": "start", "name": "Start",
//!       "connections": [{ "targetNodeId": "B" }] },
//!     { "id": "B", "type": "tag_contact", "name": "Tag lead", "tagName": "lead",
//!       "connections": [] }
//!   ]
//! }
//! ```

use crate::error::SchemaError;
use crate::model::{BranchCondition, Node, NodeId, NodePayload, Port};
use crate::registry::NodeType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The definition of a flow as stored and exchanged with other consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDefinition {
    pub start_node_id: NodeId,
    #[serde(default)]
    pub nodes: Vec<DefinitionNode>,
}

/// A node of the persisted definition, carrying its own outgoing connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinitionNode {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub payload: NodePayload,
    #[serde(default)]
    pub connections: Vec<Connection>,
}

/// An outgoing link of a persisted node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    pub target_node_id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<BranchCondition>,
    /// Written only under explicit port encoding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
}

impl FlowDefinition {
    /// A definition holding nothing but a start node.
    pub fn with_start_node(id: impl Into<NodeId>) -> Self {
        let id = id.into();
        Self {
            start_node_id: id.clone(),
            nodes: vec![DefinitionNode {
                id,
                name: "Start".to_string(),
                payload: NodePayload::Start,
                connections: Vec::new(),
            }],
        }
    }

    pub fn node(&self, id: &str) -> Option<&DefinitionNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn start_nodes(&self) -> Vec<&DefinitionNode> {
        self.nodes
            .iter()
            .filter(|n| n.payload.node_type() == NodeType::Start)
            .collect()
    }

    /// Number of connections over all nodes.
    pub fn connection_count(&self) -> usize {
        self.nodes.iter().map(|n| n.connections.len()).sum()
    }

    /// Parses the wire form.
    ///
    /// Unknown node types are reported as [`SchemaError::UnknownNodeType`] naming the node;
    /// payloads of the wrong shape as [`SchemaError::PayloadMismatch`].
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let value: Value = serde_json::from_str(json).map_err(|e| SchemaError::Json(e.to_string()))?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, SchemaError> {
        let Value::Object(mut root) = value else {
            return Err(SchemaError::MalformedDefinition(
                "expected a JSON object".to_string(),
            ));
        };
        let start_node_id = match root.remove("startNodeId") {
            Some(Value::String(id)) => NodeId::from(id),
            _ => {
                return Err(SchemaError::MalformedDefinition(
                    "`startNodeId` must be a string".to_string(),
                ));
            }
        };
        let raw_nodes = match root.remove("nodes") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(nodes)) => nodes,
            Some(_) => {
                return Err(SchemaError::MalformedDefinition(
                    "`nodes` must be an array".to_string(),
                ));
            }
        };

        let nodes = raw_nodes
            .into_iter()
            .enumerate()
            .map(|(index, raw)| DefinitionNode::from_value(raw, index))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            start_node_id,
            nodes,
        })
    }

    pub fn to_json(&self) -> Result<String, SchemaError> {
        serde_json::to_string(self).map_err(|e| SchemaError::Json(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        serde_json::to_string_pretty(self).map_err(|e| SchemaError::Json(e.to_string()))
    }
}

impl DefinitionNode {
    fn from_value(raw: Value, index: usize) -> Result<Self, SchemaError> {
        let id = raw
            .get("id")
            .and_then(Value::as_str)
            .map(NodeId::from)
            .ok_or_else(|| {
                SchemaError::MalformedDefinition(format!("node #{} has no string `id`", index))
            })?;
        let type_name = raw.get("type").and_then(Value::as_str).ok_or_else(|| {
            SchemaError::PayloadMismatch {
                node_id: id.clone(),
                message: "missing `type`".to_string(),
            }
        })?;
        type_name.parse::<NodeType>().map_err(|e| e.at(&id))?;

        serde_json::from_value(raw).map_err(|e| SchemaError::PayloadMismatch {
            node_id: id,
            message: e.to_string(),
        })
    }

    /// The node without its connections.
    pub fn to_node(&self) -> Node {
        Node::new(self.id.clone(), self.name.clone(), self.payload.clone())
    }
}
