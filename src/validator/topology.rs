use crate::definition::FlowDefinition;
use crate::graph::FlowGraph;
use crate::model::{NodeId, NodePayload, Port};
use crate::registry::NodeType;

/// Anything the validator can inspect: the editable graph or the persisted definition.
pub trait Validatable {
    fn topology(&self) -> Topology<'_>;
}

/// A borrowed, representation-neutral view of nodes and edges.
pub struct Topology<'a> {
    pub(super) nodes: Vec<TopologyNode<'a>>,
    pub(super) edges: Vec<TopologyEdge<'a>>,
    /// `startNodeId` of a definition. Graphs do not declare one.
    pub(super) declared_start: Option<&'a NodeId>,
}

pub(super) struct TopologyNode<'a> {
    pub(super) id: &'a NodeId,
    pub(super) payload: &'a NodePayload,
}

pub(super) struct TopologyEdge<'a> {
    pub(super) label: String,
    pub(super) source: &'a NodeId,
    pub(super) target: &'a NodeId,
    pub(super) port: Option<Port>,
}

impl Validatable for FlowGraph {
    fn topology(&self) -> Topology<'_> {
        Topology {
            nodes: self
                .nodes()
                .iter()
                .map(|n| TopologyNode {
                    id: &n.id,
                    payload: &n.payload,
                })
                .collect(),
            edges: self
                .edges()
                .iter()
                .map(|e| TopologyEdge {
                    label: e.id.to_string(),
                    source: &e.source,
                    target: &e.target,
                    port: e.port,
                })
                .collect(),
            declared_start: None,
        }
    }
}

impl Validatable for FlowDefinition {
    fn topology(&self) -> Topology<'_> {
        let mut edges = Vec::with_capacity(self.connection_count());
        for node in &self.nodes {
            let branching = node.payload.node_type() == NodeType::Condition;
            for (index, connection) in node.connections.iter().enumerate() {
                // Ports of older definitions live only in the descriptor's polarity.
                let port = connection.port.or_else(|| {
                    branching
                        .then(|| connection.condition.as_ref().map(|c| c.polarity()))
                        .flatten()
                });
                edges.push(TopologyEdge {
                    label: format!("{}#{}", node.id, index),
                    source: &node.id,
                    target: &connection.target_node_id,
                    port,
                });
            }
        }
        Topology {
            nodes: self
                .nodes
                .iter()
                .map(|n| TopologyNode {
                    id: &n.id,
                    payload: &n.payload,
                })
                .collect(),
            edges,
            declared_start: Some(&self.start_node_id),
        }
    }
}
