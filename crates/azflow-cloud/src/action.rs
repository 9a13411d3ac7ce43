//! Record of what a reconciliation run did

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of resource an action touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    ResourceGroup,
    StorageAccount,
    DocumentDbAccount,
    DocumentDatabase,
    DocumentCollection,
    SignalR,
    FunctionApp,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::ResourceGroup => write!(f, "resource-group"),
            ResourceKind::StorageAccount => write!(f, "storage-account"),
            ResourceKind::DocumentDbAccount => write!(f, "document-db-account"),
            ResourceKind::DocumentDatabase => write!(f, "document-database"),
            ResourceKind::DocumentCollection => write!(f, "document-collection"),
            ResourceKind::SignalR => write!(f, "signalr"),
            ResourceKind::FunctionApp => write!(f, "function-app"),
        }
    }
}

/// Type of action performed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Resource was absent and has been created
    Create,
    /// Resource existed and differing fields were applied
    Update,
    /// Resource existed and has been deleted
    Delete,
    /// Observed state already matched
    NoOp,
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub resource_kind: ResourceKind,
    pub name: String,
    pub action_type: ActionType,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.action_type, self.resource_kind, self.name)
    }
}

/// Ordered actions of one `apply` or `teardown` run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    pub actions: Vec<Action>,

    /// Total execution time in milliseconds
    pub duration_ms: u64,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(
        &mut self,
        resource_kind: ResourceKind,
        name: impl Into<String>,
        action_type: ActionType,
    ) {
        self.actions.push(Action {
            resource_kind,
            name: name.into(),
            action_type,
        });
    }

    pub fn actions_by_type(&self, action_type: ActionType) -> Vec<&Action> {
        self.actions
            .iter()
            .filter(|a| a.action_type == action_type)
            .collect()
    }

    pub fn has_changes(&self) -> bool {
        self.actions.iter().any(|a| a.action_type != ActionType::NoOp)
    }

    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            created: self.actions_by_type(ActionType::Create).len(),
            updated: self.actions_by_type(ActionType::Update).len(),
            deleted: self.actions_by_type(ActionType::Delete).len(),
            unchanged: self.actions_by_type(ActionType::NoOp).len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub unchanged: usize,
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} created, {} updated, {} deleted, {} unchanged",
            self.created, self.updated, self.deleted, self.unchanged
        )
    }
}
