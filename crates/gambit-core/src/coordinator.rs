//! The operations surface the transport adapter binds to.

use std::sync::Arc;

use gambit_rules::RulesEngine;
use gambit_shared::constants::DEFAULT_MAX_ACTIVE_GAMES;
use gambit_store::RecordStore;

use crate::entities::Entities;

/// Tunables for the coordination engine.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Ceiling on concurrently active (waiting + ongoing) games.  Matchmaking
    /// reports `Full` above it; existing games are never touched.
    pub max_active_games: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            max_active_games: DEFAULT_MAX_ACTIVE_GAMES,
        }
    }
}

/// Coordination engine: every client-visible operation is a method on this
/// type, grouped by component in the sibling modules (`players`, `games`,
/// `matchmaking`, `identity`, `party`, `history`).
#[derive(Clone)]
pub struct Coordinator {
    pub(crate) entities: Entities,
    pub(crate) rules: Arc<dyn RulesEngine>,
    pub(crate) config: CoordinatorConfig,
}

impl Coordinator {
    pub fn new(store: RecordStore, rules: Arc<dyn RulesEngine>, config: CoordinatorConfig) -> Self {
        Self {
            entities: Entities::new(store),
            rules,
            config,
        }
    }

    /// Direct access to the entity layer, used by the lock-purge background
    /// task and by tests.
    pub fn entities(&self) -> &Entities {
        &self.entities
    }
}
