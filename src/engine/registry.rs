//! Engine lookup by identifier.

use super::error::{EngineError, EngineResult};
use super::Engine;
use dashmap::DashMap;
use log::info;
use std::sync::Arc;

/// Identifier to engine map shared by every coordinator built from it.
///
/// This is the in-process stand-in for loading engines from libraries: hosts
/// register engines up front and pipelines name them by identifier.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: Arc<DashMap<String, Arc<dyn Engine>>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `engine` under `id`, replacing any previous registration.
    pub fn register(&self, id: impl Into<String>, engine: Arc<dyn Engine>) {
        let id = id.into();
        info!("registering engine {}", id);
        self.engines.insert(id, engine);
    }

    pub fn unregister(&self, id: &str) -> Option<Arc<dyn Engine>> {
        self.engines.remove(id).map(|(_, engine)| engine)
    }

    pub fn resolve(&self, id: &str) -> EngineResult<Arc<dyn Engine>> {
        self.engines
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| EngineError::UnknownEngine(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.engines.contains_key(id)
    }

    /// Registered identifiers, sorted.
    pub fn identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.engines.iter().map(|entry| entry.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.identifiers())
            .finish()
    }
}
