//! Editing one flow against a store.
//!
//! A session owns the editable graph of a single flow. Edits stay in memory until
//! [`EditSession::save`]; dropping the session (or [`EditSession::discard`]) throws them
//! away. Status changes never carry unsaved edits with them.

use crate::TRACING_TARGET_SESSION;
use crate::config::FlowConfig;
use crate::converter::Converter;
use crate::definition::FlowDefinition;
use crate::error::SessionError;
use crate::flow::{Flow, FlowStatus};
use crate::graph::FlowGraph;
use crate::model::FlowId;
use crate::store::FlowStore;
use crate::validator::{self, ValidationMode, ValidationReport};
use tracing::{debug, info, warn};

/// Result of [`EditSession::request_activation`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActivationOutcome {
    /// Storage now records the flow as active. Warnings, if any, are kept.
    Activated(ValidationReport),
    /// The flow failed the activation checks; storage was not contacted.
    Rejected(ValidationReport),
}

impl ActivationOutcome {
    pub fn is_activated(&self) -> bool {
        matches!(self, ActivationOutcome::Activated(_))
    }

    pub fn report(&self) -> &ValidationReport {
        match self {
            ActivationOutcome::Activated(report) | ActivationOutcome::Rejected(report) => report,
        }
    }
}

pub struct EditSession<'s, S: FlowStore> {
    store: &'s mut S,
    converter: Converter,
    flow_id: FlowId,
    status: FlowStatus,
    graph: FlowGraph,
    dirty: bool,
}

impl<'s, S: FlowStore> EditSession<'s, S> {
    /// Loads a stored flow and opens its graph for editing.
    pub fn open(store: &'s mut S, flow_id: &str, config: FlowConfig) -> Result<Self, SessionError> {
        let flow = store.load_flow(flow_id)?;
        Self::from_flow(store, flow, config)
    }

    /// Stores `flow` as a new flow and opens it for editing.
    pub fn new_flow(store: &'s mut S, flow: Flow, config: FlowConfig) -> Result<Self, SessionError> {
        store.create_flow(flow.clone())?;
        info!(target: TRACING_TARGET_SESSION, flow_id = %flow.id, "created flow");
        Self::from_flow(store, flow, config)
    }

    fn from_flow(store: &'s mut S, flow: Flow, config: FlowConfig) -> Result<Self, SessionError> {
        let converter = Converter::from_config(&config);
        let graph = converter.to_graph(&flow.flow_definition)?;
        debug!(
            target: TRACING_TARGET_SESSION,
            flow_id = %flow.id,
            status = %flow.status,
            nodes = graph.nodes().len(),
            "opened flow"
        );
        Ok(Self {
            store,
            converter,
            flow_id: flow.id,
            status: flow.status,
            graph,
            dirty: false,
        })
    }

    pub fn flow_id(&self) -> &FlowId {
        &self.flow_id
    }

    pub fn status(&self) -> FlowStatus {
        self.status
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// Mutable access to the graph. Marks the session as having unsaved changes.
    pub fn graph_mut(&mut self) -> &mut FlowGraph {
        self.dirty = true;
        &mut self.graph
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Converts, validates and stores the graph.
    ///
    /// Drafts and inactive flows pass the save gate; an active flow must keep passing the
    /// activation gate, since it is live. Rejections carry every issue found. Warnings of
    /// an accepted save are returned.
    pub fn save(&mut self) -> Result<ValidationReport, SessionError> {
        let mode = match self.status {
            FlowStatus::Active => ValidationMode::Activation,
            FlowStatus::Draft | FlowStatus::Inactive => ValidationMode::Save,
        };
        let report = validator::validate(&self.graph, mode);
        if !report.is_ok() {
            warn!(
                target: TRACING_TARGET_SESSION,
                flow_id = %self.flow_id,
                errors = report.errors().count(),
                "save rejected"
            );
            return Err(SessionError::SaveRejected(report));
        }

        let definition = self.converter.to_definition(&self.graph)?;
        self.store.save_definition(&self.flow_id, &definition)?;
        self.dirty = false;
        debug!(
            target: TRACING_TARGET_SESSION,
            flow_id = %self.flow_id,
            nodes = definition.nodes.len(),
            connections = definition.connection_count(),
            "saved flow"
        );
        Ok(report)
    }

    /// Activates the stored flow if its definition passes every activation check.
    ///
    /// Unsaved edits must be saved first, so the graph checked is the one in storage.
    pub fn request_activation(&mut self) -> Result<ActivationOutcome, SessionError> {
        self.check_transition(FlowStatus::Active)?;
        let report = validator::validate(&self.graph, ValidationMode::Activation);
        if !report.is_ok() {
            warn!(
                target: TRACING_TARGET_SESSION,
                flow_id = %self.flow_id,
                errors = report.errors().count(),
                "activation rejected"
            );
            return Ok(ActivationOutcome::Rejected(report));
        }

        self.store.update_status(&self.flow_id, FlowStatus::Active)?;
        self.status = FlowStatus::Active;
        info!(target: TRACING_TARGET_SESSION, flow_id = %self.flow_id, "flow activated");
        Ok(ActivationOutcome::Activated(report))
    }

    pub fn deactivate(&mut self) -> Result<(), SessionError> {
        self.check_transition(FlowStatus::Inactive)?;
        self.store.update_status(&self.flow_id, FlowStatus::Inactive)?;
        self.status = FlowStatus::Inactive;
        info!(target: TRACING_TARGET_SESSION, flow_id = %self.flow_id, "flow deactivated");
        Ok(())
    }

    /// Drops unsaved edits by reloading the stored definition.
    pub fn discard(&mut self) -> Result<(), SessionError> {
        let definition: FlowDefinition = self.store.load_definition(&self.flow_id)?;
        self.graph = self.converter.to_graph(&definition)?;
        self.dirty = false;
        debug!(target: TRACING_TARGET_SESSION, flow_id = %self.flow_id, "discarded edits");
        Ok(())
    }

    fn check_transition(&self, to: FlowStatus) -> Result<(), SessionError> {
        if !self.status.can_transition_to(to) {
            return Err(SessionError::InvalidStatusTransition {
                from: self.status,
                to,
            });
        }
        if self.dirty {
            return Err(SessionError::UnsavedChanges);
        }
        Ok(())
    }
}
