use crate::model::{EdgeId, FlowId, NodeId, Port};
use crate::flow::FlowStatus;
use crate::registry::NodeType;
use crate::validator::ValidationReport;
use itertools::Itertools;
use thiserror::Error;

/// Errors raised while reading node types and payloads against the registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("Unknown node type '{type_name}'{}", at_node(.node_id))]
    UnknownNodeType {
        node_id: Option<NodeId>,
        type_name: String,
    },

    #[error("Payload of node '{node_id}' does not match its type: {message}")]
    PayloadMismatch { node_id: NodeId, message: String },

    #[error("Malformed flow definition: {0}")]
    MalformedDefinition(String),

    #[error("Failed to parse JSON: {0}")]
    Json(String),
}

impl SchemaError {
    /// Attaches the offending node to an `UnknownNodeType` raised without one.
    pub fn at(self, node: &NodeId) -> Self {
        match self {
            SchemaError::UnknownNodeType {
                node_id: None,
                type_name,
            } => SchemaError::UnknownNodeType {
                node_id: Some(node.clone()),
                type_name,
            },
            other => other,
        }
    }
}

/// Errors raised by mutations of the editable graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Node '{0}' not found in the graph")]
    UnknownNode(NodeId),

    #[error("Edge '{0}' not found in the graph")]
    UnknownEdge(EdgeId),

    #[error("A node with id '{0}' already exists in the graph")]
    DuplicateNode(NodeId),

    #[error("Node '{node_id}' of type '{node_type}' has no output port '{port}'")]
    InvalidPort {
        node_id: NodeId,
        node_type: NodeType,
        port: Port,
    },

    #[error("Payload of type '{found}' cannot be used for a '{expected}' node")]
    PayloadTypeMismatch { expected: NodeType, found: NodeType },
}

/// Errors raised while converting between the editable graph and the persisted definition.
///
/// The converter fails closed: it never repairs a graph it cannot round-trip.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("The flow has no start node")]
    MissingStartNode,

    #[error("The flow has more than one start node: {}", .node_ids.iter().join(", "))]
    MultipleStartNodes { node_ids: Vec<NodeId> },

    #[error("startNodeId '{declared}' does not match the start node '{actual}'")]
    StartNodeMismatch { declared: NodeId, actual: NodeId },

    #[error("Node id '{0}' is used more than once")]
    DuplicateNodeId(NodeId),

    #[error("Connection from '{source_node_id}' points at missing node '{target_node_id}'")]
    DanglingEdge {
        source_node_id: NodeId,
        target_node_id: NodeId,
    },

    #[error(
        "Connection from '{node_id}' to '{target_node_id}' has an invalid port: {}",
        describe_port(.port)
    )]
    InvalidPort {
        node_id: NodeId,
        target_node_id: NodeId,
        port: Option<Port>,
    },

    #[error(
        "Connection from '{node_id}' to '{target_node_id}' is on port '{port}' but its condition selects the other branch"
    )]
    PortPolarityMismatch {
        node_id: NodeId,
        target_node_id: NodeId,
        port: Port,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Errors reported by a [`crate::store::FlowStore`]. Surfaced to callers unchanged.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Flow '{0}' not found")]
    FlowNotFound(FlowId),

    #[error("Flow '{0}' already exists")]
    FlowExists(FlowId),

    #[error("Storage backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored flow could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised by an [`crate::session::EditSession`].
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Save rejected: {} structural error(s)", .0.errors().count())]
    SaveRejected(ValidationReport),

    #[error("Cannot move flow from '{from}' to '{to}'")]
    InvalidStatusTransition { from: FlowStatus, to: FlowStatus },

    #[error("The flow has unsaved changes; save before changing its status")]
    UnsavedChanges,
}

fn at_node(node_id: &Option<NodeId>) -> String {
    node_id
        .as_ref()
        .map(|id| format!(" on node '{}'", id))
        .unwrap_or_default()
}

fn describe_port(port: &Option<Port>) -> String {
    match port {
        Some(port) => format!("'{}' is not declared by the source node", port),
        None => "condition branches must name a 'true' or 'false' port".to_string(),
    }
}
