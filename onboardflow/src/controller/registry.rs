//! Typed registry mapping stage identity to the mounted controller.

use super::StageController;
use crate::stages::StageId;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Runtime-populated map from stage identity to its controller.
///
/// Registration is last-writer-wins and is not synchronized against UI
/// transitions: a stage registers on mount, before it becomes interactive,
/// so a navigation request can never observe a half-registered stage.
/// Unregistering on unmount is mandatory; a stale controller would otherwise
/// keep answering queries for a UI that no longer exists.
///
/// The registry is an explicit, injected service shared by the stage UIs and
/// the engine. There is no ambient global instance.
#[derive(Default)]
pub struct ControllerRegistry {
    controllers: RwLock<HashMap<StageId, Arc<dyn StageController>>>,
}

impl ControllerRegistry {
    /// Creates a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller for a stage, replacing any existing one.
    pub fn register(&self, stage_id: StageId, controller: Arc<dyn StageController>) {
        self.controllers.write().insert(stage_id, controller);
    }

    /// Removes the controller for a stage. Must be called when the owning
    /// UI unmounts.
    pub fn unregister(&self, stage_id: StageId) {
        self.controllers.write().remove(&stage_id);
    }

    /// Looks up the controller for a stage, if one is mounted.
    #[must_use]
    pub fn lookup(&self, stage_id: StageId) -> Option<Arc<dyn StageController>> {
        self.controllers.read().get(&stage_id).cloned()
    }

    /// Returns true if a controller is mounted for the stage.
    #[must_use]
    pub fn is_registered(&self, stage_id: StageId) -> bool {
        self.controllers.read().contains_key(&stage_id)
    }

    /// Number of mounted controllers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.controllers.read().len()
    }

    /// Returns true if no controllers are mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.controllers.read().is_empty()
    }

    /// Removes all controllers. Used when the flow session ends.
    pub fn clear(&self) {
        self.controllers.write().clear();
    }
}

impl std::fmt::Debug for ControllerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerRegistry")
            .field("mounted", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::NoValidationController;

    #[test]
    fn test_register_and_lookup() {
        let registry = ControllerRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.lookup(StageId::Product).is_none());

        registry.register(StageId::Product, Arc::new(NoValidationController));
        assert!(registry.is_registered(StageId::Product));
        assert!(registry.lookup(StageId::Product).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unregister_removes() {
        let registry = ControllerRegistry::new();
        registry.register(StageId::Notes, Arc::new(NoValidationController));
        registry.unregister(StageId::Notes);
        assert!(registry.lookup(StageId::Notes).is_none());
    }

    #[test]
    fn test_last_writer_wins() {
        let registry = ControllerRegistry::new();
        let first: Arc<dyn StageController> = Arc::new(NoValidationController);
        let second: Arc<dyn StageController> = Arc::new(NoValidationController);

        registry.register(StageId::Rules, Arc::clone(&first));
        registry.register(StageId::Rules, Arc::clone(&second));

        let looked_up = registry.lookup(StageId::Rules).unwrap();
        assert!(Arc::ptr_eq(&looked_up, &second));
        assert_eq!(registry.len(), 1);
    }
}
