use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::binding;

/// Unique identifier for a stored action
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionId(String);

impl ActionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ActionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ActionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A key/value pair used for headers and query parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Property {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl Property {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Where an action sends its request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Datasource {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<Property>,
}

impl Datasource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Property::new(key, value));
        self
    }
}

/// Request template of an action. String fields may contain `{{ key }}` bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionConfiguration {
    #[serde(default = "default_http_method")]
    pub http_method: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub headers: Vec<Property>,
    #[serde(default)]
    pub query_parameters: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

fn default_http_method() -> String {
    "GET".to_string()
}

impl Default for ActionConfiguration {
    fn default() -> Self {
        Self {
            http_method: default_http_method(),
            path: String::new(),
            headers: Vec::new(),
            query_parameters: Vec::new(),
            body: None,
            timeout_ms: None,
        }
    }
}

impl ActionConfiguration {
    pub fn new(http_method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            http_method: http_method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Property::new(key, value));
        self
    }

    pub fn with_query_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_parameters.push(Property::new(key, value));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// All templated strings, in the order they are rendered
    fn templates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.path.as_str())
            .chain(self.headers.iter().map(|p| p.value.as_str()))
            .chain(self.query_parameters.iter().map(|p| p.value.as_str()))
            .chain(self.body.as_deref())
    }

    /// Mustache keys referenced anywhere in the configuration
    pub fn binding_keys(&self) -> BTreeSet<String> {
        self.templates().flat_map(binding::extract_keys).collect()
    }
}

/// A named, executable request definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ActionId>,
    pub name: String,
    pub plugin_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource: Option<Datasource>,
    #[serde(default)]
    pub action_configuration: ActionConfiguration,
    #[serde(default)]
    pub json_path_keys: BTreeSet<String>,
    #[serde(default = "default_true")]
    pub is_valid: bool,
    #[serde(default)]
    pub invalids: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Action {
    pub fn new(name: impl Into<String>, plugin_id: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            plugin_id: plugin_id.into(),
            datasource: None,
            action_configuration: ActionConfiguration::default(),
            json_path_keys: BTreeSet::new(),
            is_valid: true,
            invalids: BTreeSet::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_id(mut self, id: ActionId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_datasource(mut self, datasource: Datasource) -> Self {
        self.datasource = Some(datasource);
        self
    }

    pub fn with_configuration(mut self, configuration: ActionConfiguration) -> Self {
        self.action_configuration = configuration;
        self
    }

    /// Recompute binding keys and validity from the current configuration.
    pub fn refresh_derived(&mut self) {
        self.json_path_keys = self.action_configuration.binding_keys();

        let mut invalids = BTreeSet::new();
        if self.plugin_id.trim().is_empty() {
            invalids.insert("Missing plugin id".to_string());
        }
        match &self.datasource {
            None => {
                invalids.insert("Missing datasource".to_string());
            }
            Some(ds) if ds.url.trim().is_empty() => {
                invalids.insert("Missing datasource url".to_string());
            }
            Some(_) => {}
        }
        if self.action_configuration.http_method.trim().is_empty() {
            invalids.insert("Missing HTTP method".to_string());
        }

        self.is_valid = invalids.is_empty();
        self.invalids = invalids;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_keys_cover_all_fields() {
        let config = ActionConfiguration::new("POST", "/users/{{ Table1.selectedRow.id }}")
            .with_header("Authorization", "Bearer {{token}}")
            .with_query_parameter("page", "{{Table1.pageNo}}")
            .with_body(r#"{"name": "{{Input1.text}}"}"#);

        let keys: Vec<_> = config.binding_keys().into_iter().collect();
        assert_eq!(
            keys,
            vec!["Input1.text", "Table1.pageNo", "Table1.selectedRow.id", "token"]
        );
    }

    #[test]
    fn test_refresh_derived_flags_missing_datasource() {
        let mut action = Action::new("getUsers", "restapi-plugin");
        action.refresh_derived();

        assert!(!action.is_valid);
        assert!(action.invalids.contains("Missing datasource"));
    }

    #[test]
    fn test_refresh_derived_valid_action() {
        let mut action = Action::new("getUsers", "restapi-plugin")
            .with_datasource(Datasource::new("users", "http://localhost:8080"))
            .with_configuration(ActionConfiguration::new("GET", "/users?q={{q}}"));
        action.is_valid = false;
        action.invalids.insert("stale".to_string());

        action.refresh_derived();

        assert!(action.is_valid);
        assert!(action.invalids.is_empty());
        assert!(action.json_path_keys.contains("q"));
    }

    #[test]
    fn test_deserialize_minimal_action() {
        let json = r#"{"name": "ping", "plugin_id": "restapi-plugin"}"#;
        let action: Action = serde_json::from_str(json).unwrap();

        assert_eq!(action.name, "ping");
        assert_eq!(action.action_configuration.http_method, "GET");
        assert!(action.id.is_none());
        assert!(action.is_valid);
    }
}
