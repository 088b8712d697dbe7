use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::{Action, ActionId};
use crate::error::ActionResult;

/// Port for persisting actions
#[async_trait]
pub trait ActionRepository: Send + Sync {
    async fn find_by_id(&self, id: &ActionId) -> ActionResult<Option<Action>>;

    async fn find_by_name(&self, name: &str) -> ActionResult<Option<Action>>;

    /// Actions whose name is in `names`, ordered by name
    async fn find_by_names(&self, names: &HashSet<String>) -> ActionResult<Vec<Action>>;

    /// All actions, ordered by name
    async fn find_all(&self) -> ActionResult<Vec<Action>>;

    /// Insert or replace by id. The action must already carry an id.
    async fn save(&self, action: Action) -> ActionResult<Action>;

    /// Remove and return the action, if present
    async fn delete(&self, id: &ActionId) -> ActionResult<Option<Action>>;
}
