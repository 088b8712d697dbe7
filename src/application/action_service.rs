use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{binding, Action, ActionConfiguration, ActionExecutionResult, ActionId, ExecuteActionDto, Property};
use crate::error::{ActionError, ActionResult};
use crate::ports::{ActionRepository, PluginError};

use super::{CrudService, PluginRegistry};

/// Operations on stored actions, on top of plain CRUD
#[async_trait]
pub trait ActionService: CrudService<Action, ActionId, Error = ActionError> {
    /// Run an action with the given params and report what happened.
    ///
    /// Problems found before dispatch (unknown action, invalid action,
    /// missing binding values) are errors. Failures while talking to the
    /// datasource come back as a result with `is_execution_success == false`.
    async fn execute_action(&self, request: ExecuteActionDto) -> ActionResult<ActionExecutionResult>;

    /// Create or update an action
    async fn save(&self, action: Action) -> ActionResult<Action>;

    async fn find_by_name(&self, name: &str) -> ActionResult<Option<Action>>;

    /// Stream the distinct actions whose name is in `names`, ordered by name
    fn find_distinct_actions_by_name_in(&self, names: HashSet<String>) -> BoxStream<'static, ActionResult<Action>>;

    /// Save actions one by one in order. The stream ends after the first error.
    fn save_all(&self, actions: Vec<Action>) -> BoxStream<'static, ActionResult<Action>>;
}

/// Action service backed by a repository and a set of plugin executors
#[derive(Clone)]
pub struct DefaultActionService {
    repository: Arc<dyn ActionRepository>,
    plugins: Arc<PluginRegistry>,
    default_timeout: Duration,
    // Serializes writes so the name uniqueness check and the insert cannot interleave
    write_lock: Arc<Mutex<()>>,
}

impl DefaultActionService {
    pub fn new(repository: Arc<dyn ActionRepository>, plugins: PluginRegistry, default_timeout: Duration) -> Self {
        Self {
            repository,
            plugins: Arc::new(plugins),
            default_timeout,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Upsert under the write lock. With `require_existing` the id must
    /// already be stored when the lock is taken.
    async fn persist(&self, mut action: Action, require_existing: bool) -> ActionResult<Action> {
        if action.name.trim().is_empty() {
            return Err(ActionError::InvalidParameter("action name must not be empty".to_string()));
        }

        let _guard = self.write_lock.lock().await;

        let existing = match &action.id {
            Some(id) => self.repository.find_by_id(id).await?,
            None => None,
        };
        if require_existing && existing.is_none() {
            return Err(match &action.id {
                Some(id) => ActionError::not_found_id(id),
                None => ActionError::InvalidParameter("an update needs an id".to_string()),
            });
        }

        if let Some(other) = self.repository.find_by_name(&action.name).await? {
            if other.id != action.id {
                return Err(ActionError::DuplicateName(action.name));
            }
        }

        let now = Utc::now();
        match existing {
            Some(previous) => action.created_at = previous.created_at,
            None => {
                if action.id.is_none() {
                    action.id = Some(ActionId::generate());
                }
                action.created_at = Some(now);
            }
        }
        action.updated_at = Some(now);
        action.refresh_derived();

        if !action.is_valid {
            debug!("Saving invalid action '{}': {:?}", action.name, action.invalids);
        }

        let saved = self.repository.save(action).await?;
        info!(
            "Saved action '{}' ({})",
            saved.name,
            saved.id.as_ref().map(ActionId::as_str).unwrap_or_default()
        );
        Ok(saved)
    }

    async fn resolve(&self, request: ExecuteActionDto) -> ActionResult<Action> {
        match (request.action_id, request.action) {
            (Some(id), None) => self
                .repository
                .find_by_id(&id)
                .await?
                .ok_or_else(|| ActionError::not_found_id(&id)),
            (None, Some(mut action)) => {
                action.refresh_derived();
                Ok(action)
            }
            (Some(_), Some(_)) => Err(ActionError::InvalidParameter(
                "provide either action_id or action, not both".to_string(),
            )),
            (None, None) => Err(ActionError::InvalidParameter(
                "action_id or action is required".to_string(),
            )),
        }
    }

    fn timeout_for(&self, configuration: &ActionConfiguration) -> Duration {
        configuration
            .timeout_ms
            .map(Duration::from_millis)
            .unwrap_or(self.default_timeout)
    }
}

/// Copy of `configuration` with every binding replaced by its param value
fn render_configuration(
    configuration: &ActionConfiguration,
    values: &HashMap<String, String>,
) -> ActionResult<ActionConfiguration> {
    let mut missing = BTreeSet::new();
    let mut render = |template: &str| -> String {
        binding::render(template, values).unwrap_or_else(|keys| {
            missing.extend(keys);
            String::new()
        })
    };

    let rendered = ActionConfiguration {
        http_method: configuration.http_method.clone(),
        path: render(&configuration.path),
        headers: configuration
            .headers
            .iter()
            .map(|p| Property::new(p.key.clone(), render(&p.value)))
            .collect(),
        query_parameters: configuration
            .query_parameters
            .iter()
            .map(|p| Property::new(p.key.clone(), render(&p.value)))
            .collect(),
        body: configuration.body.as_deref().map(&mut render),
        timeout_ms: configuration.timeout_ms,
    };

    if missing.is_empty() {
        Ok(rendered)
    } else {
        Err(ActionError::UnresolvedBindings(missing))
    }
}

#[async_trait]
impl CrudService<Action, ActionId> for DefaultActionService {
    type Error = ActionError;

    async fn create(&self, action: Action) -> ActionResult<Action> {
        if action.id.is_some() {
            return Err(ActionError::InvalidParameter(
                "a new action must not carry an id".to_string(),
            ));
        }
        self.persist(action, false).await
    }

    async fn update(&self, id: &ActionId, mut action: Action) -> ActionResult<Action> {
        action.id = Some(id.clone());
        self.persist(action, true).await
    }

    async fn get_by_id(&self, id: &ActionId) -> ActionResult<Action> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ActionError::not_found_id(id))
    }

    async fn get_all(&self) -> ActionResult<Vec<Action>> {
        self.repository.find_all().await
    }

    async fn delete(&self, id: &ActionId) -> ActionResult<Action> {
        let _guard = self.write_lock.lock().await;
        let removed = self
            .repository
            .delete(id)
            .await?
            .ok_or_else(|| ActionError::not_found_id(id))?;
        info!("Deleted action '{}' ({})", removed.name, id);
        Ok(removed)
    }
}

#[async_trait]
impl ActionService for DefaultActionService {
    async fn execute_action(&self, request: ExecuteActionDto) -> ActionResult<ActionExecutionResult> {
        let started = Instant::now();
        let values = request.param_values();
        let action = self.resolve(request).await?;

        let invalid = || ActionError::InvalidAction {
            name: action.name.clone(),
            invalids: action.invalids.clone(),
        };
        if !action.is_valid {
            return Err(invalid());
        }
        let datasource = action.datasource.as_ref().ok_or_else(invalid)?;

        let executor = self
            .plugins
            .get(&action.plugin_id)
            .ok_or_else(|| ActionError::PluginNotFound(action.plugin_id.clone()))?;

        let configuration = render_configuration(&action.action_configuration, &values)?;
        let timeout = self.timeout_for(&configuration);

        debug!("Executing action '{}' with plugin {}", action.name, action.plugin_id);
        let result = match tokio::time::timeout(timeout, executor.execute(datasource, &configuration)).await {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                warn!("Action '{}' failed: {}", action.name, err);
                ActionExecutionResult::failure(err.code(), err.to_string())
            }
            Err(_) => {
                let err = PluginError::Timeout(timeout.as_millis() as u64);
                warn!("Action '{}' failed: {}", action.name, err);
                ActionExecutionResult::failure(err.code(), err.to_string())
            }
        };

        let duration_ms = started.elapsed().as_millis() as u64;
        info!(
            "Executed action '{}' in {} ms (status {})",
            action.name, duration_ms, result.status_code
        );
        Ok(result.with_duration_ms(duration_ms))
    }

    async fn save(&self, action: Action) -> ActionResult<Action> {
        self.persist(action, false).await
    }

    async fn find_by_name(&self, name: &str) -> ActionResult<Option<Action>> {
        self.repository.find_by_name(name).await
    }

    fn find_distinct_actions_by_name_in(&self, names: HashSet<String>) -> BoxStream<'static, ActionResult<Action>> {
        let repository = Arc::clone(&self.repository);

        stream::once(async move {
            let mut seen = HashSet::new();
            let actions = repository.find_by_names(&names).await?;
            Ok::<_, ActionError>(
                actions
                    .into_iter()
                    .filter(|a| names.contains(&a.name) && seen.insert(a.id.clone()))
                    .collect::<Vec<_>>(),
            )
        })
        .flat_map(|found| match found {
            Ok(actions) => stream::iter(actions.into_iter().map(Ok::<Action, ActionError>)).left_stream(),
            Err(err) => stream::once(future::ready(Err(err))).right_stream(),
        })
        .boxed()
    }

    fn save_all(&self, actions: Vec<Action>) -> BoxStream<'static, ActionResult<Action>> {
        let state = (self.clone(), actions.into_iter(), false);

        stream::unfold(state, |(service, mut remaining, failed)| async move {
            if failed {
                return None;
            }
            let action = remaining.next()?;
            let result = service.persist(action, false).await;
            let failed = result.is_err();
            Some((result, (service, remaining, failed)))
        })
        .boxed()
    }
}
