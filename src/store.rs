//! The persistence boundary.
//!
//! The [`FlowStore`] trait defines what an editing session needs from storage:
//! - Loading a flow and its definition
//! - Replacing the stored definition
//! - Changing the lifecycle status
//!
//! Backends report their own failures as [`StoreError::Backend`]; callers get them unchanged.

use crate::TRACING_TARGET_STORE;
use crate::definition::FlowDefinition;
use crate::error::StoreError;
use crate::flow::{Flow, FlowStatus};
use crate::model::FlowId;
use ahash::AHashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Storage for flows. Synchronous; the core never performs I/O on its own.
pub trait FlowStore {
    /// Get a flow by id.
    fn load_flow(&self, flow_id: &str) -> Result<Flow, StoreError>;

    /// Get only the definition of a flow.
    fn load_definition(&self, flow_id: &str) -> Result<FlowDefinition, StoreError> {
        Ok(self.load_flow(flow_id)?.flow_definition)
    }

    /// Store a new flow. Fails with [`StoreError::FlowExists`] if the id is taken.
    fn create_flow(&mut self, flow: Flow) -> Result<(), StoreError>;

    /// Replace the definition of an existing flow.
    fn save_definition(&mut self, flow_id: &str, definition: &FlowDefinition) -> Result<(), StoreError>;

    /// Change the status of an existing flow.
    fn update_status(&mut self, flow_id: &str, status: FlowStatus) -> Result<(), StoreError>;
}

/// A map-backed store for tests and tools.
///
/// Counts writes so callers can check that rejected operations never reached storage, and
/// can be told to fail every write with a backend error.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    flows: AHashMap<FlowId, Flow>,
    failure: Option<String>,
    definition_saves: usize,
    status_updates: usize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flows.insert(flow.id.clone(), flow);
        self
    }

    /// Makes every following write fail with [`StoreError::Backend`] carrying `message`.
    pub fn fail_writes(&mut self, message: impl Into<String>) {
        self.failure = Some(message.into());
    }

    pub fn recover(&mut self) {
        self.failure = None;
    }

    pub fn definition_saves(&self) -> usize {
        self.definition_saves
    }

    pub fn status_updates(&self) -> usize {
        self.status_updates
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    fn check_failure(&self) -> Result<(), StoreError> {
        match &self.failure {
            Some(message) => Err(StoreError::Backend(message.clone().into())),
            None => Ok(()),
        }
    }

    fn flow_mut(&mut self, flow_id: &str) -> Result<&mut Flow, StoreError> {
        self.flows
            .get_mut(flow_id)
            .ok_or_else(|| StoreError::FlowNotFound(FlowId::from(flow_id)))
    }
}

impl FlowStore for InMemoryStore {
    fn load_flow(&self, flow_id: &str) -> Result<Flow, StoreError> {
        self.flows
            .get(flow_id)
            .cloned()
            .ok_or_else(|| StoreError::FlowNotFound(FlowId::from(flow_id)))
    }

    fn create_flow(&mut self, flow: Flow) -> Result<(), StoreError> {
        self.check_failure()?;
        if self.flows.contains_key(flow.id.as_str()) {
            return Err(StoreError::FlowExists(flow.id));
        }
        debug!(target: TRACING_TARGET_STORE, flow_id = %flow.id, "created flow");
        self.flows.insert(flow.id.clone(), flow);
        Ok(())
    }

    fn save_definition(&mut self, flow_id: &str, definition: &FlowDefinition) -> Result<(), StoreError> {
        self.check_failure()?;
        self.flow_mut(flow_id)?.flow_definition = definition.clone();
        self.definition_saves += 1;
        debug!(target: TRACING_TARGET_STORE, flow_id, "saved definition");
        Ok(())
    }

    fn update_status(&mut self, flow_id: &str, status: FlowStatus) -> Result<(), StoreError> {
        self.check_failure()?;
        self.flow_mut(flow_id)?.status = status;
        self.status_updates += 1;
        debug!(target: TRACING_TARGET_STORE, flow_id, status = %status, "updated status");
        Ok(())
    }
}

/// Stores each flow as `<root>/<flow_id>.json`.
///
/// Writes go to a temporary file in the same directory and are persisted into place, so a
/// crash never leaves a half-written flow behind. A failed write removes its temporary file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Opens (and creates if needed) the directory holding the flows.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Ids of every stored flow, sorted.
    pub fn flow_ids(&self) -> Result<Vec<FlowId>, StoreError> {
        let mut ids = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(FlowId::from(stem));
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn path_of(&self, flow_id: &str) -> Result<PathBuf, StoreError> {
        let usable = !flow_id.is_empty()
            && !flow_id.contains(['/', '\\'])
            && !flow_id.contains("..");
        if !usable {
            return Err(StoreError::Backend(
                format!("'{}' cannot be used as a file name", flow_id).into(),
            ));
        }
        Ok(self.root.join(format!("{}.json", flow_id)))
    }

    fn read(&self, flow_id: &str) -> Result<Flow, StoreError> {
        let path = self.path_of(flow_id)?;
        let json = fs::read_to_string(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::FlowNotFound(FlowId::from(flow_id)),
            _ => StoreError::Io(e),
        })?;
        Ok(serde_json::from_str(&json)?)
    }

    fn write(&self, flow: &Flow) -> Result<(), StoreError> {
        let path = self.path_of(flow.id.as_str())?;
        let mut tmp = NamedTempFile::new_in(&self.root)?;
        serde_json::to_writer_pretty(&mut tmp, flow)?;
        tmp.persist(&path).map_err(|e| e.error)?;
        debug!(target: TRACING_TARGET_STORE, path = %path.display(), "wrote flow");
        Ok(())
    }
}

impl FlowStore for JsonFileStore {
    fn load_flow(&self, flow_id: &str) -> Result<Flow, StoreError> {
        self.read(flow_id)
    }

    fn create_flow(&mut self, flow: Flow) -> Result<(), StoreError> {
        if self.path_of(flow.id.as_str())?.exists() {
            return Err(StoreError::FlowExists(flow.id));
        }
        self.write(&flow)
    }

    fn save_definition(&mut self, flow_id: &str, definition: &FlowDefinition) -> Result<(), StoreError> {
        let mut flow = self.read(flow_id)?;
        flow.flow_definition = definition.clone();
        self.write(&flow)
    }

    fn update_status(&mut self, flow_id: &str, status: FlowStatus) -> Result<(), StoreError> {
        let mut flow = self.read(flow_id)?;
        flow.status = status;
        self.write(&flow)
    }
}
