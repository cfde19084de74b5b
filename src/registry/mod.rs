//! The fixed set of node types, their payload schemas and their output ports.
//!
//! This module is the single schema authority: the converter, the configuration
//! resolver and the validator all read node shapes from here.

use crate::error::SchemaError;
use crate::model::Port;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

mod schema;

pub use schema::{DefaultValue, FieldKind, FieldSpec, Requirement};
use schema::*;

const SINGLE_OUTPUT: &[Port] = &[];
const BRANCH_OUTPUTS: &[Port] = &[Port::True, Port::False];

/// Defines the node type enumeration together with its name, ports and schema lookups.
macro_rules! define_node_types {
    ( $( ($variant:ident, $name:literal, $ports:expr, $fields:expr) ),* $(,)? ) => {
        /// The kind of step a node performs.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum NodeType {
            $( #[serde(rename = $name)] $variant, )*
        }

        impl NodeType {
            /// Every node type, in registry order.
            pub const ALL: &'static [NodeType] = &[ $( NodeType::$variant, )* ];

            /// The wire name of the type.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( NodeType::$variant => $name, )*
                }
            }

            /// Named output ports. An empty slice means a single unnamed output.
            pub fn output_ports(&self) -> &'static [Port] {
                match self {
                    $( NodeType::$variant => $ports, )*
                }
            }

            /// The editable payload fields of this type.
            pub fn payload_schema(&self) -> &'static [FieldSpec] {
                match self {
                    $( NodeType::$variant => $fields, )*
                }
            }
        }

        impl FromStr for NodeType {
            type Err = SchemaError;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                match name {
                    $( $name => Ok(NodeType::$variant), )*
                    other => Err(SchemaError::UnknownNodeType {
                        node_id: None,
                        type_name: other.to_string(),
                    }),
                }
            }
        }
    };
}

define_node_types! {
    (Start, "start", SINGLE_OUTPUT, NO_FIELDS),
    (Message, "message", SINGLE_OUTPUT, MESSAGE_FIELDS),
    (TagContact, "tag_contact", SINGLE_OUTPUT, TAG_CONTACT_FIELDS),
    (HumanTakeover, "human_takeover", SINGLE_OUTPUT, NO_FIELDS),
    (Wait, "wait", SINGLE_OUTPUT, WAIT_FIELDS),
    (GetInput, "get_input", SINGLE_OUTPUT, GET_INPUT_FIELDS),
    (Condition, "condition", BRANCH_OUTPUTS, CONDITION_FIELDS),
}

impl NodeType {
    /// Whether an edge leaving a node of this type may carry `port`.
    /// `None` always refers to the default output and is accepted here; whether a
    /// branching node may leave it unnamed is the validator's concern.
    pub fn accepts_port(&self, port: Option<Port>) -> bool {
        match port {
            None => true,
            Some(port) => self.output_ports().contains(&port),
        }
    }

    pub fn is_branching(&self) -> bool {
        !self.output_ports().is_empty()
    }

    /// Looks up a field of this type's schema by wire name.
    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.payload_schema().iter().find(|f| f.name == name)
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns the payload schema of a node type. Total over [`NodeType`].
pub fn resolve_payload_schema(node_type: NodeType) -> &'static [FieldSpec] {
    node_type.payload_schema()
}

/// Returns the payload schema of a node type given by wire name.
///
/// Fails with [`SchemaError::UnknownNodeType`] for names outside the registry.
pub fn resolve_payload_schema_by_name(name: &str) -> Result<&'static [FieldSpec], SchemaError> {
    name.parse::<NodeType>().map(resolve_payload_schema)
}
