//! Error types for the onboardflow orchestrator.
//!
//! Navigation rejections and collaborator failures are not errors: they are
//! modeled as outcome enums on the engine and notices from the coordinator
//! (see [`crate::engine`]). The types here cover configuration problems and
//! progress store I/O only.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type FlowResult<T> = Result<T, FlowError>;

/// The main error type for onboardflow operations.
#[derive(Debug, Clone, Error)]
pub enum FlowError {
    /// The stage table handed to the engine is not usable.
    #[error("Invalid stage table: {0}")]
    InvalidTable(String),

    /// The progress store could not load or save the flow position.
    ///
    /// Recoverable: the engine logs it and continues from the position it
    /// already holds.
    #[error("Progress store error: {0}")]
    Progress(String),
}
