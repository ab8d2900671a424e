//! Collaborator ports consumed, but not implemented, by the orchestrator.
//!
//! Each port is a typed capability injected at construction time. The core
//! depends on the contracts only; production implementations live with the
//! host application.

use crate::errors::FlowResult;
use crate::navigation::GlobalStep;
use crate::stages::StageId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Response from the reward collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardResponse {
    /// Whether the reward was granted.
    pub success: bool,
    /// Points actually awarded; when absent the stage's default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_awarded: Option<u32>,
    /// Failure message, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RewardResponse {
    /// A granted reward using the stage's default points.
    #[must_use]
    pub fn granted() -> Self {
        Self {
            success: true,
            reward_awarded: None,
            error: None,
        }
    }

    /// A granted reward with an explicit amount.
    #[must_use]
    pub fn granted_points(points: u32) -> Self {
        Self {
            success: true,
            reward_awarded: Some(points),
            error: None,
        }
    }

    /// A failed reward request.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            reward_awarded: None,
            error: Some(error.into()),
        }
    }
}

/// Reward collaborator: called at most once per stage by the completion
/// coordinator.
#[async_trait]
pub trait RewardService: Send + Sync {
    /// Records a stage completion for a user and returns the awarded points.
    async fn complete_stage(&self, user_id: &str, stage_id: StageId) -> RewardResponse;
}

/// Reward service that grants every request with the stage's default points.
///
/// The builder's fallback when no real collaborator is wired; useful for
/// local flows that track points purely in memory. Stages without a
/// [`StageId::reward_action`] grant zero points; every other stage defers
/// to its definition's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct GrantDefaultRewards;

#[async_trait]
impl RewardService for GrantDefaultRewards {
    async fn complete_stage(&self, user_id: &str, stage_id: StageId) -> RewardResponse {
        // Stages with no reward schedule action carry nothing to grant.
        match stage_id.reward_action() {
            Some(action) => {
                tracing::debug!(user = user_id, stage = %stage_id, action, "granting default reward");
                RewardResponse::granted()
            }
            None => RewardResponse::granted_points(0),
        }
    }
}

/// Result of an entity create-or-update call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistResult {
    /// Whether the entity was stored.
    pub success: bool,
    /// The stored entity as returned by the collaborator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Failure message, when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PersistResult {
    /// A successful persistence with the stored entity.
    #[must_use]
    pub fn ok(data: serde_json::Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A failed persistence.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

/// Persistence collaborator used inside a stage's `submit()` implementation.
///
/// Opaque to the orchestrator itself; re-exported here so stage controllers
/// share one contract.
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Creates or updates a domain entity of the given kind.
    async fn create_or_update(&self, entity_kind: &str, payload: serde_json::Value)
        -> PersistResult;
}

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeVariant {
    /// Positive confirmation.
    Success,
    /// Neutral information.
    Info,
    /// Non-blocking warning.
    Warning,
    /// Error requiring user attention.
    Destructive,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Short heading.
    pub title: String,
    /// Body text.
    pub description: String,
    /// Visual weight.
    pub variant: NoticeVariant,
}

impl Notice {
    fn new(title: impl Into<String>, description: impl Into<String>, variant: NoticeVariant) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant,
        }
    }

    /// An informational notice.
    #[must_use]
    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, NoticeVariant::Info)
    }

    /// A success notice.
    #[must_use]
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, NoticeVariant::Success)
    }

    /// A warning notice.
    #[must_use]
    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, NoticeVariant::Warning)
    }

    /// An error notice.
    #[must_use]
    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(title, description, NoticeVariant::Destructive)
    }
}

/// Fire-and-forget notification collaborator.
///
/// The orchestrator calls this for persistence and reward failures and for
/// skip confirmations; it never blocks on delivery or manages the
/// notifier's lifecycle.
pub trait Notifier: Send + Sync {
    /// Delivers a notification to the user.
    fn notify(&self, notice: Notice);
}

/// Notifier that discards all notices.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn notify(&self, _notice: Notice) {}
}

/// Notifier that logs notices through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.variant {
            NoticeVariant::Destructive => {
                tracing::error!(title = %notice.title, "{}", notice.description);
            }
            NoticeVariant::Warning => {
                tracing::warn!(title = %notice.title, "{}", notice.description);
            }
            NoticeVariant::Success | NoticeVariant::Info => {
                tracing::info!(title = %notice.title, "{}", notice.description);
            }
        }
    }
}

/// Durable store for the flow position, so a user can leave and resume.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Loads the last saved position, if any.
    async fn load(&self) -> FlowResult<Option<GlobalStep>>;

    /// Saves the current position.
    async fn save(&self, step: GlobalStep) -> FlowResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_response_ctors() {
        assert!(RewardResponse::granted().success);
        assert_eq!(RewardResponse::granted_points(75).reward_awarded, Some(75));
        let failed = RewardResponse::failed("down");
        assert!(!failed.success);
        assert_eq!(failed.error.as_deref(), Some("down"));
    }

    #[test]
    fn test_notice_variants() {
        assert_eq!(Notice::info("a", "b").variant, NoticeVariant::Info);
        assert_eq!(
            Notice::destructive("a", "b").variant,
            NoticeVariant::Destructive
        );
    }

    #[tokio::test]
    async fn test_grant_default_rewards() {
        let service = GrantDefaultRewards;
        let response = service.complete_stage("user", StageId::Product).await;
        assert!(response.success);
        // Absent points mean the stage default applies.
        assert_eq!(response.reward_awarded, None);
    }

    #[tokio::test]
    async fn test_grant_default_rewards_without_reward_action() {
        let service = GrantDefaultRewards;
        for stage_id in [StageId::Introduction, StageId::Completion] {
            assert!(stage_id.reward_action().is_none());
            let response = service.complete_stage("user", stage_id).await;
            assert!(response.success);
            assert_eq!(response.reward_awarded, Some(0));
        }
    }

    #[test]
    fn test_persist_result_serde_skips_absent_fields() {
        let failed = PersistResult::failed("nope");
        let json = serde_json::to_string(&failed).unwrap();
        assert_eq!(json, "{\"success\":false,\"error\":\"nope\"}");
    }
}
