//! Bidirectional mapping between the editable [`FlowGraph`] and the persisted
//! [`FlowDefinition`].

use crate::config::{FlowConfig, IdStrategy, PortEncoding};
use crate::definition::{Connection, DefinitionNode, FlowDefinition};
use crate::error::ConvertError;
use crate::graph::{FlowGraph, canonical_condition, implied_condition};
use crate::model::{Edge, EdgeId, Node, Port};
use crate::registry::NodeType;
use crate::TRACING_TARGET_CONVERTER;
use ahash::{AHashMap, AHashSet};
use tracing::debug;

mod start;

use start::locate_start;

/// Converts flows between their two representations.
///
/// Both directions are deterministic and preserve node order and per-node connection
/// order. Graphs that could not survive a round trip are rejected rather than repaired.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    port_encoding: PortEncoding,
    id_strategy: IdStrategy,
}

pub struct ConverterBuilder {
    port_encoding: PortEncoding,
    id_strategy: IdStrategy,
}

impl ConverterBuilder {
    pub fn new() -> Self {
        Self {
            port_encoding: PortEncoding::default(),
            id_strategy: IdStrategy::default(),
        }
    }

    pub fn with_port_encoding(mut self, port_encoding: PortEncoding) -> Self {
        self.port_encoding = port_encoding;
        self
    }

    /// Id strategy of the graphs produced by [`Converter::to_graph`].
    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    pub fn build(self) -> Converter {
        Converter {
            port_encoding: self.port_encoding,
            id_strategy: self.id_strategy,
        }
    }
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    pub fn builder() -> ConverterBuilder {
        ConverterBuilder::new()
    }

    pub fn from_config(config: &FlowConfig) -> Self {
        Self::builder()
            .with_port_encoding(config.port_encoding)
            .with_id_strategy(config.id_strategy)
            .build()
    }

    pub fn port_encoding(&self) -> PortEncoding {
        self.port_encoding
    }

    /// Embeds every edge under its source node and records the start node.
    pub fn to_definition(&self, graph: &FlowGraph) -> Result<FlowDefinition, ConvertError> {
        let start_id = locate_start(graph.nodes().iter().map(|n| (&n.id, n.node_type())))?;

        let mut by_id: AHashMap<&str, &Node> = AHashMap::with_capacity(graph.nodes().len());
        for node in graph.nodes() {
            if by_id.insert(node.id.as_str(), node).is_some() {
                return Err(ConvertError::DuplicateNodeId(node.id.clone()));
            }
        }

        let mut connections: AHashMap<&str, Vec<Connection>> = AHashMap::new();
        for edge in graph.edges() {
            let (Some(source), true) = (
                by_id.get(edge.source.as_str()),
                by_id.contains_key(edge.target.as_str()),
            ) else {
                return Err(ConvertError::DanglingEdge {
                    source_node_id: edge.source.clone(),
                    target_node_id: edge.target.clone(),
                });
            };
            let connection = self.render_connection(source, edge)?;
            connections
                .entry(edge.source.as_str())
                .or_default()
                .push(connection);
        }

        let nodes: Vec<DefinitionNode> = graph
            .nodes()
            .iter()
            .map(|node| DefinitionNode {
                id: node.id.clone(),
                name: node.name.clone(),
                payload: node.payload.clone(),
                connections: connections.remove(node.id.as_str()).unwrap_or_default(),
            })
            .collect();

        debug!(
            target: TRACING_TARGET_CONVERTER,
            nodes = nodes.len(),
            edges = graph.edges().len(),
            start_node_id = %start_id,
            "converted graph to definition"
        );

        Ok(FlowDefinition {
            start_node_id: start_id.clone(),
            nodes,
        })
    }

    /// Externalizes every embedded connection as an edge.
    ///
    /// Edge ids are synthesized as `<source>-<target>-<index>`. Node ids may contain `-`,
    /// so an id already handed out gets a `~<n>` suffix.
    pub fn to_graph(&self, definition: &FlowDefinition) -> Result<FlowGraph, ConvertError> {
        let mut ids: AHashSet<&str> = AHashSet::with_capacity(definition.nodes.len());
        for node in &definition.nodes {
            if !ids.insert(node.id.as_str()) {
                return Err(ConvertError::DuplicateNodeId(node.id.clone()));
            }
        }

        let start_id = locate_start(
            definition
                .nodes
                .iter()
                .map(|n| (&n.id, n.payload.node_type())),
        )?;
        if definition.start_node_id != *start_id {
            return Err(ConvertError::StartNodeMismatch {
                declared: definition.start_node_id.clone(),
                actual: start_id.clone(),
            });
        }

        let nodes: Vec<Node> = definition.nodes.iter().map(DefinitionNode::to_node).collect();
        let mut edges = Vec::with_capacity(definition.connection_count());
        let mut edge_ids = AHashSet::with_capacity(definition.connection_count());
        for node in &definition.nodes {
            for (index, connection) in node.connections.iter().enumerate() {
                if !ids.contains(connection.target_node_id.as_str()) {
                    return Err(ConvertError::DanglingEdge {
                        source_node_id: node.id.clone(),
                        target_node_id: connection.target_node_id.clone(),
                    });
                }
                let port = Self::resolve_port(node, connection)?;
                edges.push(Edge {
                    id: unique_edge_id(
                        &mut edge_ids,
                        format!("{}-{}-{}", node.id, connection.target_node_id, index),
                    ),
                    source: node.id.clone(),
                    target: connection.target_node_id.clone(),
                    port,
                    condition: canonical_condition(&node.payload, port, connection.condition.clone()),
                });
            }
        }

        debug!(
            target: TRACING_TARGET_CONVERTER,
            nodes = nodes.len(),
            edges = edges.len(),
            "converted definition to graph"
        );
        Ok(FlowGraph::from_parts(nodes, edges, self.id_strategy))
    }

    /// Renders one edge as a persisted connection, synthesizing branch descriptors for
    /// condition nodes so that both branches stay distinguishable without a port.
    fn render_connection(&self, source: &Node, edge: &Edge) -> Result<Connection, ConvertError> {
        let node_type = source.node_type();
        let invalid_port = || ConvertError::InvalidPort {
            node_id: source.id.clone(),
            target_node_id: edge.target.clone(),
            port: edge.port,
        };
        if !node_type.accepts_port(edge.port) {
            return Err(invalid_port());
        }

        let condition = match (node_type.is_branching(), edge.port) {
            (true, None) => return Err(invalid_port()),
            (true, Some(port)) => match &edge.condition {
                Some(given)
                    if self.port_encoding == PortEncoding::Inferred
                        && given.polarity() != port =>
                {
                    return Err(ConvertError::PortPolarityMismatch {
                        node_id: source.id.clone(),
                        target_node_id: edge.target.clone(),
                        port,
                    });
                }
                Some(given) => Some(given.clone()),
                None => implied_condition(&source.payload, port),
            },
            (false, _) => edge.condition.clone(),
        };

        Ok(Connection {
            target_node_id: edge.target.clone(),
            condition,
            port: match self.port_encoding {
                PortEncoding::Explicit => edge.port,
                PortEncoding::Inferred => None,
            },
        })
    }

    /// Recovers the port of a persisted connection. An explicit `port` wins; on condition
    /// nodes without one, the descriptor's polarity decides.
    fn resolve_port(
        node: &DefinitionNode,
        connection: &Connection,
    ) -> Result<Option<Port>, ConvertError> {
        let node_type = node.payload.node_type();
        let invalid_port = || ConvertError::InvalidPort {
            node_id: node.id.clone(),
            target_node_id: connection.target_node_id.clone(),
            port: connection.port,
        };
        if !node_type.accepts_port(connection.port) {
            return Err(invalid_port());
        }
        match (node_type, connection.port, &connection.condition) {
            (NodeType::Condition, Some(port), _) => Ok(Some(port)),
            (NodeType::Condition, None, Some(condition)) => Ok(Some(condition.polarity())),
            (NodeType::Condition, None, None) => Err(invalid_port()),
            _ => Ok(None),
        }
    }
}

fn unique_edge_id(taken: &mut AHashSet<String>, base: String) -> EdgeId {
    let mut candidate = base.clone();
    let mut suffix = 1;
    while !taken.insert(candidate.clone()) {
        candidate = format!("{}~{}", base, suffix);
        suffix += 1;
    }
    EdgeId::new(candidate)
}

/// Converts with default settings.
pub fn to_definition(graph: &FlowGraph) -> Result<FlowDefinition, ConvertError> {
    Converter::default().to_definition(graph)
}

/// Converts with default settings.
pub fn to_graph(definition: &FlowDefinition) -> Result<FlowGraph, ConvertError> {
    Converter::default().to_graph(definition)
}
