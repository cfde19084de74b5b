//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the flowgraph crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use flowgraph::prelude::*;
//!
//! # fn run_example() -> Result<(), Box<dyn std::error::Error>> {
//! let json = std::fs::read_to_string("path/to/definition.json")?;
//! let definition = FlowDefinition::from_json(&json)?;
//!
//! let report = validate(&definition, ValidationMode::Activation);
//! println!("{}", report);
//!
//! let graph = Converter::builder().build().to_graph(&definition)?;
//! println!("{} nodes, {} edges", graph.nodes().len(), graph.edges().len());
//! # Ok(())
//! # }
//! ```

// Configuration
pub use crate::config::{FlowConfig, IdStrategy, PortEncoding};

// The two representations and the conversion between them
pub use crate::converter::Converter;
pub use crate::definition::{Connection, DefinitionNode, FlowDefinition};
pub use crate::graph::FlowGraph;

// Nodes, edges and payloads
pub use crate::model::{
    BranchCondition, ConditionKind, ConditionRule, Edge, EdgeId, FlowId, InputType,
    MessageButton, MessageContent, Node, NodeId, NodePayload, Port,
};
pub use crate::registry::NodeType;

// Validation
pub use crate::validator::{
    IssueKind, Severity, Validatable, ValidationMode, ValidationReport, is_activatable, is_valid,
    validate,
};

// Flows, storage and editing
pub use crate::flow::{Flow, FlowStatus};
pub use crate::session::{ActivationOutcome, EditSession};
pub use crate::store::{FlowStore, InMemoryStore, JsonFileStore};

// Error types
pub use crate::error::{ConvertError, GraphError, SchemaError, SessionError, StoreError};
