//! The editable form of a flow: a flat node list and a flat edge list.

use crate::config::IdStrategy;
use crate::error::GraphError;
use crate::model::{BranchCondition, Edge, EdgeId, Node, NodeId, NodePayload, Port};
use crate::registry::NodeType;
use crate::resolver;
use crate::TRACING_TARGET_GRAPH;
use serde::{Deserialize, Serialize};
use tracing::debug;

mod minter;

use minter::IdMinter;

/// The graph a flow is authored in.
///
/// Node order and edge order are insertion order and are preserved by every operation;
/// the converter relies on both. Mutations never leave an edge pointing at a missing node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    #[serde(skip)]
    ids: IdMinter,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_strategy(strategy: IdStrategy) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            ids: IdMinter::new(strategy),
        }
    }

    /// Switches how ids are minted from now on. Existing ids are untouched.
    pub fn set_id_strategy(&mut self, strategy: IdStrategy) {
        if self.ids.strategy() != strategy {
            self.ids = IdMinter::new(strategy);
        }
    }

    /// Assembles a graph without checking it. Used by the converter after its own checks,
    /// and by callers that want the validator to report on arbitrary input.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>, strategy: IdStrategy) -> Self {
        Self {
            nodes,
            edges,
            ids: IdMinter::new(strategy),
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Edges leaving `id`, in insertion order.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.source == id)
    }

    /// Edges entering `id`, in insertion order.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Edge> + 'a {
        self.edges.iter().filter(move |e| e.target == id)
    }

    pub fn start_nodes(&self) -> Vec<&Node> {
        self.nodes.iter().filter(|n| n.is_start()).collect()
    }

    /// Adds a node of `node_type` and returns its freshly minted id.
    ///
    /// Fields left unset in `initial` (or all fields, when `initial` is `None`) take their
    /// registry defaults.
    pub fn add_node(
        &mut self,
        node_type: NodeType,
        initial: Option<NodePayload>,
    ) -> Result<NodeId, GraphError> {
        self.add_node_named(node_type, resolver::default_name(node_type), initial)
    }

    pub fn add_node_named(
        &mut self,
        node_type: NodeType,
        name: impl Into<String>,
        initial: Option<NodePayload>,
    ) -> Result<NodeId, GraphError> {
        let payload = match initial {
            Some(payload) if payload.node_type() != node_type => {
                return Err(GraphError::PayloadTypeMismatch {
                    expected: node_type,
                    found: payload.node_type(),
                });
            }
            Some(payload) => resolver::apply_defaults(payload),
            None => resolver::default_payload(node_type),
        };

        let nodes = &self.nodes;
        let id = self
            .ids
            .node_id(|candidate| nodes.iter().any(|n| n.id == candidate));
        debug!(target: TRACING_TARGET_GRAPH, node_id = %id, node_type = %node_type, "added node");
        self.nodes.push(Node::new(id.clone(), name, payload));
        Ok(id)
    }

    /// Adds a fully specified node, keeping its id.
    pub fn insert_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.contains_node(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        debug!(target: TRACING_TARGET_GRAPH, node_id = %node.id, node_type = %node.node_type(), "inserted node");
        self.nodes.push(node);
        Ok(())
    }

    /// Removes a node together with every edge that starts or ends at it.
    pub fn remove_node(&mut self, id: &str) -> Result<Node, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| GraphError::UnknownNode(NodeId::from(id)))?;
        let node = self.nodes.remove(index);

        let before = self.edges.len();
        self.edges.retain(|e| !e.touches(id));
        debug!(
            target: TRACING_TARGET_GRAPH,
            node_id = %id,
            removed_edges = before - self.edges.len(),
            "removed node"
        );
        Ok(node)
    }

    /// Connects `source` to `target` and returns the new edge's id.
    ///
    /// Parallel edges are allowed. A descriptor that merely restates a condition branch
    /// (see [`implied_condition`]) is dropped, since the converter derives it anyway.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        port: Option<Port>,
        condition: Option<BranchCondition>,
    ) -> Result<EdgeId, GraphError> {
        let source_node = self
            .node(source)
            .ok_or_else(|| GraphError::UnknownNode(NodeId::from(source)))?;
        if !self.contains_node(target) {
            return Err(GraphError::UnknownNode(NodeId::from(target)));
        }
        let node_type = source_node.node_type();
        if let Some(port) = port.filter(|p| !node_type.accepts_port(Some(*p))) {
            return Err(GraphError::InvalidPort {
                node_id: source_node.id.clone(),
                node_type,
                port,
            });
        }
        let condition = canonical_condition(&source_node.payload, port, condition);

        let edges = &self.edges;
        let id = self
            .ids
            .edge_id(|candidate| edges.iter().any(|e| e.id == candidate));
        debug!(target: TRACING_TARGET_GRAPH, edge_id = %id, source, target, "added edge");
        self.edges.push(Edge {
            id: id.clone(),
            source: NodeId::from(source),
            target: NodeId::from(target),
            port,
            condition,
        });
        Ok(id)
    }

    /// Removes a single edge. Nodes are never touched.
    pub fn remove_edge(&mut self, id: &str) -> Result<Edge, GraphError> {
        let index = self
            .edges
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| GraphError::UnknownEdge(EdgeId::from(id)))?;
        debug!(target: TRACING_TARGET_GRAPH, edge_id = %id, "removed edge");
        Ok(self.edges.remove(index))
    }

    /// Replaces a node's payload. The node keeps its type.
    ///
    /// Descriptors on the node's outgoing edges that the new payload now implies are
    /// dropped, as [`FlowGraph::add_edge`] would have.
    pub fn update_payload(&mut self, id: &str, payload: NodePayload) -> Result<(), GraphError> {
        let node = self.node_mut(id)?;
        if node.node_type() != payload.node_type() {
            return Err(GraphError::PayloadTypeMismatch {
                expected: node.node_type(),
                found: payload.node_type(),
            });
        }
        node.payload = payload;

        let Some(node) = self.nodes.iter().find(|n| n.id == id) else {
            return Ok(());
        };
        for edge in self.edges.iter_mut().filter(|e| e.source == id) {
            edge.condition = canonical_condition(&node.payload, edge.port, edge.condition.take());
        }
        Ok(())
    }

    pub fn rename_node(&mut self, id: &str, name: impl Into<String>) -> Result<(), GraphError> {
        self.node_mut(id)?.name = name.into();
        Ok(())
    }

    fn node_mut(&mut self, id: &str) -> Result<&mut Node, GraphError> {
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| GraphError::UnknownNode(NodeId::from(id)))
    }
}

/// The descriptor a condition node's branch stands for when none is given explicitly.
/// `None` for nodes that do not branch.
pub fn implied_condition(payload: &NodePayload, port: Port) -> Option<BranchCondition> {
    match payload {
        NodePayload::Condition { condition } => Some(BranchCondition::for_branch(
            condition.kind.unwrap_or_default(),
            port,
        )),
        _ => None,
    }
}

/// Drops a descriptor that is identical to the one implied by the edge's branch.
pub(crate) fn canonical_condition(
    payload: &NodePayload,
    port: Option<Port>,
    condition: Option<BranchCondition>,
) -> Option<BranchCondition> {
    let implied = port.and_then(|p| implied_condition(payload, p));
    match (condition, implied) {
        (Some(given), Some(implied)) if given == implied => None,
        (given, _) => given,
    }
}
