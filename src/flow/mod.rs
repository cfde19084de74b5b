//! The persisted flow aggregate and its lifecycle status.

use crate::definition::FlowDefinition;
use crate::model::FlowId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowStatus {
    #[default]
    Draft,
    Active,
    Inactive,
}

impl FlowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStatus::Draft => "draft",
            FlowStatus::Active => "active",
            FlowStatus::Inactive => "inactive",
        }
    }

    /// Allowed moves: `draft`/`inactive` to `active`, `active` to `inactive`.
    /// Re-activating an active flow is allowed so a changed definition can be re-checked.
    pub fn can_transition_to(&self, next: FlowStatus) -> bool {
        matches!(
            (self, next),
            (FlowStatus::Draft | FlowStatus::Inactive | FlowStatus::Active, FlowStatus::Active)
                | (FlowStatus::Active, FlowStatus::Inactive)
        )
    }
}

impl fmt::Display for FlowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored automation flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    pub id: FlowId,
    /// The Instagram account the flow answers for.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram_account_id: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: FlowStatus,
    pub flow_definition: FlowDefinition,
}

impl Flow {
    /// A new draft holding only a start node with the given id.
    pub fn new(id: impl Into<FlowId>, name: impl Into<String>, start_node_id: &str) -> Self {
        Self {
            id: id.into(),
            instagram_account_id: None,
            name: name.into(),
            description: None,
            status: FlowStatus::Draft,
            flow_definition: FlowDefinition::with_start_node(start_node_id),
        }
    }

    pub fn with_account(mut self, instagram_account_id: impl Into<String>) -> Self {
        self.instagram_account_id = Some(instagram_account_id.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == FlowStatus::Active
    }
}
