//! Test doubles and fixtures for flows.
//!
//! This module provides:
//! - Mock stage controllers and collaborators with call tracking
//! - In-memory progress and persistence stores
//! - A wired flow fixture for end-to-end tests

mod fixtures;
mod mocks;

pub use fixtures::TestFlow;
pub use mocks::{
    CollectingNotifier, InMemoryPersistence, InMemoryProgressStore, MockController,
    MockRewardService,
};
