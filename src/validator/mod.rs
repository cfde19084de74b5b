//! Structural validation of flows.
//!
//! Two gates share one set of checks. The save gate only rejects flows that cannot be
//! stored faithfully; the activation gate additionally requires every branch to be wired
//! through a declared port and every node to carry its required fields.

mod report;
mod topology;

pub use report::{IssueKind, Severity, ValidationIssue, ValidationMode, ValidationReport};
pub use topology::{Topology, Validatable};

use crate::TRACING_TARGET_VALIDATOR;
use crate::model::{NodeId, Port};
use crate::registry::NodeType;
use crate::resolver;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use std::collections::VecDeque;
use topology::TopologyEdge;
use tracing::debug;

/// Runs every check the mode calls for and collects all issues found.
pub fn validate<T: Validatable + ?Sized>(subject: &T, mode: ValidationMode) -> ValidationReport {
    let topology = subject.topology();
    let mut report = ValidationReport::new(mode);

    let known = check_node_ids(&topology, &mut report);
    let start = check_start(&topology, &mut report);
    check_dangling(&topology, &known, &mut report);
    check_reachability(&topology, &known, start, mode, &mut report);

    if mode == ValidationMode::Activation {
        check_ports(&topology, &known, &mut report);
        check_branches(&topology, &known, &mut report);
        check_payloads(&topology, &mut report);
    }

    debug!(
        target: TRACING_TARGET_VALIDATOR,
        mode = ?mode,
        nodes = topology.nodes.len(),
        edges = topology.edges.len(),
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "validated flow"
    );
    report
}

/// The save gate: no structural error. Unreachable nodes are only warned about.
pub fn is_valid<T: Validatable + ?Sized>(subject: &T) -> bool {
    validate(subject, ValidationMode::Save).is_ok()
}

/// The activation gate: no error among all checks.
pub fn is_activatable<T: Validatable + ?Sized>(subject: &T) -> bool {
    validate(subject, ValidationMode::Activation).is_ok()
}

/// Reports repeated ids and returns the type of every known node, first occurrence winning.
fn check_node_ids<'a>(
    topology: &Topology<'a>,
    report: &mut ValidationReport,
) -> AHashMap<&'a str, NodeType> {
    let mut known = AHashMap::with_capacity(topology.nodes.len());
    let mut reported = AHashSet::new();
    for node in &topology.nodes {
        if known.contains_key(node.id.as_str()) {
            if reported.insert(node.id.as_str()) {
                report.push(
                    IssueKind::DuplicateNodeId,
                    Severity::Error,
                    Some(node.id),
                    None,
                    format!("Node id '{}' is used more than once", node.id),
                );
            }
            continue;
        }
        known.insert(node.id.as_str(), node.payload.node_type());
    }
    known
}

/// Returns the start node when there is exactly one.
fn check_start<'a>(topology: &Topology<'a>, report: &mut ValidationReport) -> Option<&'a NodeId> {
    let starts = topology
        .nodes
        .iter()
        .filter(|n| n.payload.node_type() == NodeType::Start)
        .map(|n| n.id)
        .collect_vec();

    let start = match starts.as_slice() {
        [] => {
            report.push(
                IssueKind::MissingStartNode,
                Severity::Error,
                None,
                None,
                "The flow has no start node".to_string(),
            );
            None
        }
        [only] => Some(*only),
        many => {
            for id in many {
                report.push(
                    IssueKind::MultipleStartNodes,
                    Severity::Error,
                    Some(*id),
                    None,
                    format!(
                        "The flow has more than one start node: {}",
                        many.iter().join(", ")
                    ),
                );
            }
            None
        }
    };

    if let (Some(declared), Some(actual)) = (topology.declared_start, start) {
        if declared != actual {
            report.push(
                IssueKind::StartNodeMismatch,
                Severity::Error,
                Some(declared),
                None,
                format!(
                    "startNodeId '{}' does not match the start node '{}'",
                    declared, actual
                ),
            );
        }
    }
    start
}

fn check_dangling(
    topology: &Topology<'_>,
    known: &AHashMap<&str, NodeType>,
    report: &mut ValidationReport,
) {
    for edge in &topology.edges {
        for (end, id) in [("source", edge.source), ("target", edge.target)] {
            if !known.contains_key(id.as_str()) {
                report.push(
                    IssueKind::DanglingEdge,
                    Severity::Error,
                    Some(edge.source),
                    Some(edge.label.as_str()),
                    format!(
                        "Connection '{}' has a missing {} node '{}'",
                        edge.label, end, id
                    ),
                );
            }
        }
    }
}

fn check_reachability(
    topology: &Topology<'_>,
    known: &AHashMap<&str, NodeType>,
    start: Option<&NodeId>,
    mode: ValidationMode,
    report: &mut ValidationReport,
) {
    let severity = match mode {
        ValidationMode::Save => Severity::Warning,
        ValidationMode::Activation => Severity::Error,
    };

    let wired = topology
        .edges
        .iter()
        .filter(|e| known.contains_key(e.source.as_str()) && known.contains_key(e.target.as_str()))
        .collect_vec();
    let with_incoming: AHashSet<&str> = wired.iter().map(|e| e.target.as_str()).collect();
    let reached = start.map(|start| reachable_from(start.as_str(), &wired));

    let mut seen = AHashSet::new();
    for node in &topology.nodes {
        if node.payload.node_type() == NodeType::Start || !seen.insert(node.id.as_str()) {
            continue;
        }
        let message = if !with_incoming.contains(node.id.as_str()) {
            format!("Node '{}' has no incoming connection", node.id)
        } else if reached
            .as_ref()
            .is_some_and(|reached| !reached.contains(node.id.as_str()))
        {
            format!("Node '{}' cannot be reached from the start node", node.id)
        } else {
            continue;
        };
        report.push(IssueKind::UnreachableNode, severity, Some(node.id), None, message);
    }
}

fn reachable_from<'a>(start: &'a str, edges: &[&TopologyEdge<'a>]) -> AHashSet<&'a str> {
    let mut adjacency: AHashMap<&str, Vec<&str>> = AHashMap::new();
    for edge in edges {
        adjacency
            .entry(edge.source.as_str())
            .or_default()
            .push(edge.target.as_str());
    }

    let mut reached = AHashSet::from_iter([start]);
    let mut queue = VecDeque::from([start]);
    while let Some(current) = queue.pop_front() {
        for next in adjacency.get(current).into_iter().flatten() {
            if reached.insert(*next) {
                queue.push_back(*next);
            }
        }
    }
    reached
}

fn check_ports(
    topology: &Topology<'_>,
    known: &AHashMap<&str, NodeType>,
    report: &mut ValidationReport,
) {
    for edge in &topology.edges {
        let Some(node_type) = known.get(edge.source.as_str()) else {
            continue;
        };
        let unnamed_branch = edge.port.is_none() && node_type.is_branching();
        if node_type.accepts_port(edge.port) && !unnamed_branch {
            continue;
        }
        let message = match edge.port {
            Some(port) => format!(
                "Connection '{}' leaves '{}' node '{}' on port '{}', which it does not declare",
                edge.label, node_type, edge.source, port
            ),
            None => format!(
                "Connection '{}' leaves condition node '{}' without a 'true' or 'false' port",
                edge.label, edge.source
            ),
        };
        report.push(
            IssueKind::InvalidPort,
            Severity::Error,
            Some(edge.source),
            Some(edge.label.as_str()),
            message,
        );
    }
}

fn check_branches(
    topology: &Topology<'_>,
    known: &AHashMap<&str, NodeType>,
    report: &mut ValidationReport,
) {
    let mut seen = AHashSet::new();
    for node in &topology.nodes {
        let id = node.id.as_str();
        if !node.payload.node_type().is_branching() || !seen.insert(id) {
            continue;
        }
        let wired: AHashSet<Port> = topology
            .edges
            .iter()
            .filter(|e| e.source.as_str() == id && known.contains_key(e.target.as_str()))
            .filter_map(|e| e.port)
            .collect();
        let missing = node
            .payload
            .node_type()
            .output_ports()
            .iter()
            .filter(|port| !wired.contains(*port))
            .collect_vec();

        let message = match missing.as_slice() {
            [] => continue,
            [port] => format!("Condition node '{}' has no '{}' branch", id, port),
            _ => format!("Condition node '{}' has no outgoing branches", id),
        };
        report.push(
            IssueKind::IncompleteBranch,
            Severity::Warning,
            Some(node.id),
            None,
            message,
        );
    }
}

fn check_payloads(topology: &Topology<'_>, report: &mut ValidationReport) {
    for node in &topology.nodes {
        let missing = resolver::missing_required(node.payload);
        if missing.is_empty() {
            continue;
        }
        report.push(
            IssueKind::OrphanPayload,
            Severity::Error,
            Some(node.id),
            None,
            format!(
                "Node '{}' is missing required field(s): {}",
                node.id,
                missing.iter().join(", ")
            ),
        );
    }
}
