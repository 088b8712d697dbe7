use std::collections::HashMap;
use std::sync::Arc;

use crate::ports::PluginExecutor;

/// Executors indexed by plugin id
#[derive(Default, Clone)]
pub struct PluginRegistry {
    executors: HashMap<String, Arc<dyn PluginExecutor>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an executor, replacing any previous one with the same plugin id
    pub fn register(&mut self, executor: Arc<dyn PluginExecutor>) {
        self.executors.insert(executor.plugin_id().to_string(), executor);
    }

    pub fn with(mut self, executor: Arc<dyn PluginExecutor>) -> Self {
        self.register(executor);
        self
    }

    pub fn get(&self, plugin_id: &str) -> Option<Arc<dyn PluginExecutor>> {
        self.executors.get(plugin_id).cloned()
    }
}
