//! # flowgraph - Typed model of messaging automation flows
//!
//! **flowgraph** models the automation flows an Instagram inbox runs: a start node, messages,
//! waits, input prompts, tagging, human takeover and two-way conditions, wired into a
//! directed graph. It keeps two representations of a flow in step:
//!
//! 1.  **The editable graph** ([`graph::FlowGraph`]): a flat node list and a flat edge list,
//!     the shape a canvas editor works with.
//! 2.  **The persisted definition** ([`definition::FlowDefinition`]): nodes with their outgoing
//!     connections embedded, the shape stored and exchanged with other consumers.
//!
//! The [`converter`] moves between the two without losing information, the [`validator`]
//! decides whether a flow may be saved or activated, and an [`session::EditSession`] ties
//! both to a [`store::FlowStore`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use flowgraph::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = InMemoryStore::new();
//!     let flow = Flow::new("welcome", "Welcome flow", "start");
//!     let mut session = EditSession::new_flow(&mut store, flow, FlowConfig::default())?;
//!
//!     let graph = session.graph_mut();
//!     let check = graph.add_node(NodeType::Condition, Some(NodePayload::Condition {
//!         condition: ConditionRule::attribute_equals("plan", "pro"),
//!     }))?;
//!     let pro = graph.add_node(NodeType::TagContact, Some(NodePayload::TagContact {
//!         tag_name: Some("pro".to_string()),
//!     }))?;
//!     let human = graph.add_node(NodeType::HumanTakeover, None)?;
//!     graph.add_edge("start", &check, None, None)?;
//!     graph.add_edge(&check, &pro, Some(Port::True), None)?;
//!     graph.add_edge(&check, &human, Some(Port::False), None)?;
//!
//!     session.save()?;
//!     match session.request_activation()? {
//!         ActivationOutcome::Activated(_) => println!("flow is live"),
//!         ActivationOutcome::Rejected(report) => println!("not activated:\n{}", report),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod converter;
pub mod definition;
pub mod error;
pub mod flow;
pub mod graph;
pub mod model;
pub mod prelude;
pub mod registry;
pub mod resolver;
pub mod session;
pub mod store;
pub mod validator;

/// Tracing target for graph mutations.
pub const TRACING_TARGET_GRAPH: &str = "flowgraph::graph";

/// Tracing target for graph/definition conversion.
pub const TRACING_TARGET_CONVERTER: &str = "flowgraph::converter";

/// Tracing target for validation runs.
pub const TRACING_TARGET_VALIDATOR: &str = "flowgraph::validator";

/// Tracing target for editing sessions.
pub const TRACING_TARGET_SESSION: &str = "flowgraph::session";

/// Tracing target for storage backends.
pub const TRACING_TARGET_STORE: &str = "flowgraph::store";
