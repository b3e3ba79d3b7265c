//! Mock backend error types
//!
//! Every mock operation reports failure through `MockError`, including the
//! simulated connection test failure.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resource families served by the mock backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    DataSource,
    Dashboard,
    DataMart,
    Pipeline,
    PipelineRun,
    User,
    Organization,
    Role,
    Scheduler,
}

impl ResourceKind {
    pub fn label(&self) -> &'static str {
        match self {
            ResourceKind::DataSource => "Data source",
            ResourceKind::Dashboard => "Dashboard",
            ResourceKind::DataMart => "Data mart",
            ResourceKind::Pipeline => "Pipeline",
            ResourceKind::PipelineRun => "Pipeline run",
            ResourceKind::User => "User",
            ResourceKind::Organization => "Organization",
            ResourceKind::Role => "Role",
            ResourceKind::Scheduler => "Scheduler",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Mock backend operation errors
#[derive(Error, Debug)]
pub enum MockError {
    /// No record with that id in the backing collection
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: String },

    /// Synthetic random failure on a flaky read path
    #[error("Transient failure while listing {0}s, please retry")]
    Transient(ResourceKind),

    /// Synthetic connection test failure
    #[error("Connection to data source {id} failed: {reason}")]
    ConnectionFailed { id: String, reason: String },

    /// Patch body was not an object or produced an invalid record
    #[error("Invalid update for {kind} {id}: {reason}")]
    InvalidPatch {
        kind: ResourceKind,
        id: String,
        reason: String,
    },
}

impl MockError {
    pub fn not_found(kind: ResourceKind, id: impl Into<String>) -> Self {
        MockError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Check if this is a not found error (404)
    pub fn is_not_found(&self) -> bool {
        matches!(self, MockError::NotFound { .. })
    }

    /// Check if retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MockError::Transient(_) | MockError::ConnectionFailed { .. }
        )
    }

    /// Check if this is a client error (400-series)
    pub fn is_client_error(&self) -> bool {
        matches!(self, MockError::InvalidPatch { .. })
    }

    /// Get error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            MockError::NotFound { .. } => "NOT_FOUND",
            MockError::Transient(_) => "SERVICE_UNAVAILABLE",
            MockError::ConnectionFailed { .. } => "CONNECTION_FAILED",
            MockError::InvalidPatch { .. } => "VALIDATION_FAILED",
        }
    }
}
