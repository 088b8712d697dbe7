use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{Action, ActionId, Property};

/// A single runtime value for a `{{ key }}` binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub key: String,
    pub value: String,
}

impl Param {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Everything needed to run one action
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecuteActionDto {
    /// Id of a stored action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<ActionId>,
    /// Unsaved action to run as-is
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<Action>,
    #[serde(default)]
    pub params: Vec<Param>,
}

impl ExecuteActionDto {
    pub fn for_id(action_id: ActionId) -> Self {
        Self {
            action_id: Some(action_id),
            ..Default::default()
        }
    }

    pub fn for_action(action: Action) -> Self {
        Self {
            action: Some(action),
            ..Default::default()
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push(Param::new(key, value));
        self
    }

    /// Params as a lookup table. Later entries override earlier ones.
    pub fn param_values(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|p| (p.key.clone(), p.value.clone()))
            .collect()
    }
}

/// The request a plugin actually sent, after bindings were rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionExecutionRequest {
    pub http_method: String,
    pub url: String,
    pub headers: Vec<Property>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

/// Outcome of running an action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionExecutionResult {
    pub status_code: String,
    pub headers: serde_json::Value,
    pub body: serde_json::Value,
    pub is_execution_success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<ActionExecutionRequest>,
    pub duration_ms: u64,
}

impl ActionExecutionResult {
    pub fn success(status_code: impl Into<String>, headers: serde_json::Value, body: serde_json::Value) -> Self {
        Self {
            status_code: status_code.into(),
            headers,
            body,
            is_execution_success: true,
            request: None,
            duration_ms: 0,
        }
    }

    /// A failed execution carrying an error code and message
    pub fn failure(status_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status_code: status_code.into(),
            headers: serde_json::Value::Null,
            body: serde_json::Value::String(message.into()),
            is_execution_success: false,
            request: None,
            duration_ms: 0,
        }
    }

    pub fn with_request(mut self, request: ActionExecutionRequest) -> Self {
        self.request = Some(request);
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }
}
