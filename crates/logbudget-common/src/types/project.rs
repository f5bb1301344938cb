//! Cloud projects and their lifecycle state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state reported by the resource manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifecycleState {
    /// Normal operation
    Active,
    /// Marked for deletion by the owner
    DeleteRequested,
    /// Deletion in progress
    DeleteInProgress,
    /// Unspecified or unrecognized state
    #[default]
    #[serde(other)]
    LifecycleStateUnspecified,
}

impl LifecycleState {
    pub fn is_active(self) -> bool {
        self == LifecycleState::Active
    }

    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Active => "ACTIVE",
            LifecycleState::DeleteRequested => "DELETE_REQUESTED",
            LifecycleState::DeleteInProgress => "DELETE_IN_PROGRESS",
            LifecycleState::LifecycleStateUnspecified => "LIFECYCLE_STATE_UNSPECIFIED",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project that may ingest logs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub project_id: String,
    pub lifecycle_state: LifecycleState,
}

impl Project {
    pub fn new(project_id: impl Into<String>, lifecycle_state: LifecycleState) -> Self {
        Self {
            project_id: project_id.into(),
            lifecycle_state,
        }
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle_state.is_active()
    }
}
