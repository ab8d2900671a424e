//! Stage controller contract and the runtime registry over it.
//!
//! Each stage's UI owns a controller and publishes it into the
//! [`ControllerRegistry`] when it mounts, removing it on unmount. The
//! orchestrator only ever looks controllers up; it never owns stage UI
//! state. An absent controller means "no constraint", not "blocked".

mod registry;

pub use registry::ControllerRegistry;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Result of a stage's final submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResult {
    /// Whether the stage persisted its data successfully.
    pub success: bool,
    /// Failure message for the user, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmitResult {
    /// A successful submission.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// A failed submission with a user-facing message.
    #[must_use]
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }

    /// Returns true if the submission succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }
}

/// Capability object a stage's UI exposes to the orchestrator.
///
/// Stages that need no validation rely on the defaulted methods; the engine
/// never probes for optional capabilities at runtime.
#[async_trait]
pub trait StageController: Send + Sync {
    /// Whether forward navigation away from the current sub-step is allowed.
    ///
    /// When this returns false the engine rejects the transition silently;
    /// surfacing why (inline field errors etc.) is the stage UI's job.
    fn can_advance(&self) -> bool {
        true
    }

    /// Whether backward navigation is allowed. Consulted for UI button state
    /// only; `request_back` itself has no validation gate.
    fn can_retreat(&self) -> bool {
        true
    }

    /// Whether the stage is positioned on its final sub-step, i.e. the next
    /// forward request should submit rather than advance.
    fn is_final_sub_step(&self) -> bool;

    /// Performs the stage's submission, including its own persistence
    /// against the external store.
    async fn submit(&self) -> SubmitResult;
}

/// Controller for stages that declare no validation and no completion hook.
///
/// Forward requests on such a stage are always plain advances.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoValidationController;

#[async_trait]
impl StageController for NoValidationController {
    fn is_final_sub_step(&self) -> bool {
        false
    }

    async fn submit(&self) -> SubmitResult {
        SubmitResult::ok()
    }
}
