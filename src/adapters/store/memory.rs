use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::{Action, ActionId};
use crate::error::{ActionError, ActionResult};
use crate::ports::ActionRepository;

/// In-memory action store keyed by id
#[derive(Default)]
pub struct MemoryActionRepository {
    actions: RwLock<HashMap<ActionId, Action>>,
}

impl MemoryActionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn sorted_by_name<'a>(actions: impl Iterator<Item = &'a Action>) -> Vec<Action> {
        let mut out: Vec<Action> = actions.cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        out
    }
}

#[async_trait]
impl ActionRepository for MemoryActionRepository {
    async fn find_by_id(&self, id: &ActionId) -> ActionResult<Option<Action>> {
        Ok(self.actions.read().await.get(id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> ActionResult<Option<Action>> {
        let actions = self.actions.read().await;
        Ok(actions.values().find(|a| a.name == name).cloned())
    }

    async fn find_by_names(&self, names: &HashSet<String>) -> ActionResult<Vec<Action>> {
        let actions = self.actions.read().await;
        Ok(Self::sorted_by_name(
            actions.values().filter(|a| names.contains(&a.name)),
        ))
    }

    async fn find_all(&self) -> ActionResult<Vec<Action>> {
        let actions = self.actions.read().await;
        Ok(Self::sorted_by_name(actions.values()))
    }

    async fn save(&self, action: Action) -> ActionResult<Action> {
        let id = action
            .id
            .clone()
            .ok_or_else(|| ActionError::Storage("cannot store an action without an id".to_string()))?;

        self.actions.write().await.insert(id, action.clone());
        Ok(action)
    }

    async fn delete(&self, id: &ActionId) -> ActionResult<Option<Action>> {
        Ok(self.actions.write().await.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(id: &str, name: &str) -> Action {
        Action::new(name, "restapi-plugin").with_id(ActionId::from(id))
    }

    #[tokio::test]
    async fn test_save_and_find() {
        let repo = MemoryActionRepository::new();
        repo.save(stored("1", "getUsers")).await.unwrap();

        let by_id = repo.find_by_id(&ActionId::from("1")).await.unwrap();
        assert_eq!(by_id.unwrap().name, "getUsers");

        let by_name = repo.find_by_name("getUsers").await.unwrap();
        assert_eq!(by_name.unwrap().id, Some(ActionId::from("1")));

        assert!(repo.find_by_name("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_without_id_fails() {
        let repo = MemoryActionRepository::new();
        let err = repo.save(Action::new("x", "restapi-plugin")).await.unwrap_err();
        assert!(matches!(err, ActionError::Storage(_)));
        assert!(repo.find_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_names_is_sorted_and_filtered() {
        let repo = MemoryActionRepository::new();
        for (id, name) in [("1", "zeta"), ("2", "alpha"), ("3", "mid")] {
            repo.save(stored(id, name)).await.unwrap();
        }

        let names: HashSet<String> = ["zeta", "alpha", "nope"].iter().map(|s| s.to_string()).collect();
        let found: Vec<String> = repo
            .find_by_names(&names)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.name)
            .collect();

        assert_eq!(found, vec!["alpha", "zeta"]);
    }

    #[tokio::test]
    async fn test_delete_returns_removed() {
        let repo = MemoryActionRepository::new();
        repo.save(stored("1", "a")).await.unwrap();

        let removed = repo.delete(&ActionId::from("1")).await.unwrap();
        assert_eq!(removed.map(|a| a.name), Some("a".to_string()));
        assert!(repo.delete(&ActionId::from("1")).await.unwrap().is_none());
    }
}
