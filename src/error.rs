use std::collections::BTreeSet;

use thiserror::Error;

use crate::domain::ActionId;

#[derive(Debug, Error)]
pub enum ActionError {
    #[error("action not found: {0}")]
    NotFound(String),

    #[error("an action named '{0}' already exists")]
    DuplicateName(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("action '{name}' cannot be executed: {}", join(.invalids))]
    InvalidAction {
        name: String,
        invalids: BTreeSet<String>,
    },

    #[error("no executor registered for plugin '{0}'")]
    PluginNotFound(String),

    #[error("missing values for bindings: {}", join(.0))]
    UnresolvedBindings(BTreeSet<String>),

    #[error("storage error: {0}")]
    Storage(String),
}

fn join(items: &BTreeSet<String>) -> String {
    items.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}

impl ActionError {
    pub fn not_found_id(id: &ActionId) -> Self {
        Self::NotFound(format!("id {}", id))
    }
}

pub type ActionResult<T> = Result<T, ActionError>;
