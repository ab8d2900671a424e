//! # Onboardflow
//!
//! A navigation and completion orchestrator for guided multi-stage
//! onboarding flows.
//!
//! An onboarding flow is a sequence of independent mini-wizards (stages),
//! each broken into one or more sub-steps. Onboardflow provides the single
//! controller that drives the whole sequence:
//!
//! - **Typed stage registry**: each stage's UI registers a [`controller::StageController`]
//!   on mount and unregisters it on unmount
//! - **Navigation state machine**: `(stage, sub-step)` position with clamped
//!   transitions and derived overall progress
//! - **Completion sequencing**: persist, then reward, then celebrate, then
//!   advance, with at-most-once reward issuance per stage
//! - **Celebration gating**: navigation is suspended while the completion
//!   interstitial is showing and resumes only on explicit dismissal
//! - **Event-driven observability**: typed flow events for monitoring
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use onboardflow::prelude::*;
//!
//! let engine = EngineBuilder::new()
//!     .with_notifier(Arc::new(TracingNotifier))
//!     .with_user_id("user-123")
//!     .build();
//!
//! engine.registry().register(StageId::Product, Arc::new(my_product_controller));
//! match engine.request_next().await {
//!     NextOutcome::Advanced(step) => { /* render next sub-step */ }
//!     NextOutcome::StageCompleted { .. } => { /* celebration is showing */ }
//!     other => { /* blocked or failed */ }
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod celebration;
pub mod completion;
pub mod controller;
pub mod engine;
pub mod errors;
pub mod events;
pub mod navigation;
pub mod observability;
pub mod ports;
pub mod stages;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::celebration::{Celebration, CelebrationPhase, CelebrationStateMachine};
    pub use crate::completion::{
        CompletionCoordinator, CompletionLog, CompletionOutcome, CompletionRecord, RewardLedger,
    };
    pub use crate::controller::{
        ControllerRegistry, NoValidationController, StageController, SubmitResult,
    };
    pub use crate::engine::{
        BackOutcome, BlockReason, EngineBuilder, NavigationAvailability, NextOutcome,
        SkipOutcome, TransitionEngine,
    };
    pub use crate::errors::{FlowError, FlowResult};
    pub use crate::events::{
        CollectingEventSink, FlowEvent, FlowEventSink, NoOpEventSink, TracingEventSink,
    };
    pub use crate::navigation::{FlowProgress, GlobalStep, NavigationState};
    pub use crate::ports::{
        GrantDefaultRewards, NoOpNotifier, Notice, NoticeVariant, Notifier, PersistResult,
        PersistenceService, ProgressStore, RewardResponse, RewardService, TracingNotifier,
    };
    pub use crate::stages::{StageDefinition, StageId, StageTable};
}
