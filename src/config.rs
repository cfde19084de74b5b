use crate::error::SchemaError;
use serde::{Deserialize, Serialize};

/// How the `true`/`false` port of a condition branch is written into a persisted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortEncoding {
    /// Connections leaving a condition node carry an explicit `port` field.
    /// On read the field wins over the descriptor's polarity.
    #[default]
    Explicit,
    /// No `port` field is written; readers recover the port from the polarity of the
    /// branch condition. Matches the shape older consumers emit.
    Inferred,
}

/// How fresh node and edge ids are minted while editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdStrategy {
    /// Random v4 UUIDs.
    #[default]
    Uuid,
    /// `node_1`, `node_2`, ... and `edge_1`, ... skipping ids already in use.
    Sequential,
}

/// Settings shared by the converter, the graph model and editing sessions.
///
/// There is no process-wide configuration: every session is handed its own `FlowConfig`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FlowConfig {
    pub port_encoding: PortEncoding,
    pub id_strategy: IdStrategy,
}

impl FlowConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_port_encoding(mut self, port_encoding: PortEncoding) -> Self {
        self.port_encoding = port_encoding;
        self
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    /// Parses a configuration document. Missing keys fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(json).map_err(|e| SchemaError::Json(e.to_string()))
    }
}
