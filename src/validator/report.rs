use crate::model::NodeId;
use serde::Serialize;
use std::fmt;

/// Which gate a validation run answers for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Cheap checks run before a draft is persisted.
    Save,
    /// Every check, run before a flow may become `active`.
    Activation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

/// The distinct failures the validator can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingStartNode,
    MultipleStartNodes,
    StartNodeMismatch,
    DuplicateNodeId,
    DanglingEdge,
    UnreachableNode,
    InvalidPort,
    IncompleteBranch,
    OrphanPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    /// Edge id for graphs, `<source>#<index>` for definitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edge: Option<String>,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "[{}] {:?}: {}", severity, self.kind, self.message)
    }
}

/// Every issue found by one validation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub mode: ValidationMode,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            mode,
            issues: Vec::new(),
        }
    }

    /// `true` when no issue is an error. Warnings do not block.
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
    }

    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    pub fn has_error(&self, kind: IssueKind) -> bool {
        self.errors().any(|i| i.kind == kind)
    }

    pub(super) fn push(
        &mut self,
        kind: IssueKind,
        severity: Severity,
        node_id: Option<&NodeId>,
        edge: Option<&str>,
        message: String,
    ) {
        self.issues.push(ValidationIssue {
            kind,
            severity,
            node_id: node_id.cloned(),
            edge: edge.map(str::to_string),
            message,
        });
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return write!(f, "no issues");
        }
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", issue)?;
        }
        Ok(())
    }
}
