//! Value types shared by the graph, the persisted definition and the validator.

pub mod edge;
pub mod ids;
pub mod payload;

pub use edge::*;
pub use ids::*;
pub use payload::*;

use crate::registry::NodeType;
use serde::{Deserialize, Serialize};

/// A single step of a flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    #[serde(default)]
    pub name: String,
    #[serde(flatten)]
    pub payload: NodePayload,
}

impl Node {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>, payload: NodePayload) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            payload,
        }
    }

    pub fn node_type(&self) -> NodeType {
        self.payload.node_type()
    }

    pub fn is_start(&self) -> bool {
        self.node_type() == NodeType::Start
    }
}
