use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::domain::Action;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot read catalogue {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid catalogue: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Actions declared in a TOML file as `[[actions]]` tables
#[derive(Debug, Default, Deserialize)]
pub struct ActionCatalog {
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl ActionCatalog {
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        Ok(toml::from_str(content)?)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r#"
[[actions]]
name = "listUsers"
plugin_id = "restapi-plugin"

[actions.datasource]
name = "users-api"
url = "https://api.example.com"
headers = [{ key = "X-Env", value = "prod" }]

[actions.action_configuration]
path = "/users"
headers = [{ key = "Authorization", value = "Bearer {{token}}" }]
query_parameters = [{ key = "page", value = "{{page}}" }]

[[actions]]
name = "createUser"
plugin_id = "restapi-plugin"

[actions.action_configuration]
http_method = "POST"
path = "/users"
body = '{"name": "{{name}}"}'
timeout_ms = 2500
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = ActionCatalog::from_toml_str(CATALOG).unwrap();
        assert_eq!(catalog.actions.len(), 2);

        let list = &catalog.actions[0];
        assert_eq!(list.name, "listUsers");
        assert_eq!(list.action_configuration.http_method, "GET");
        assert_eq!(list.datasource.as_ref().unwrap().headers.len(), 1);
        let keys = list.action_configuration.binding_keys();
        assert!(keys.contains("token"));
        assert!(keys.contains("page"));

        let create = &catalog.actions[1];
        assert!(create.datasource.is_none());
        assert_eq!(create.action_configuration.timeout_ms, Some(2500));
        assert_eq!(create.action_configuration.body.as_deref(), Some(r#"{"name": "{{name}}"}"#));
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ActionCatalog::from_toml_str("").unwrap();
        assert!(catalog.actions.is_empty());
    }

    #[test]
    fn test_invalid_catalog() {
        let err = ActionCatalog::from_toml_str("[[actions]]\nplugin_id = 3").unwrap_err();
        assert!(matches!(err, CatalogError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("actions.toml");
        std::fs::write(&path, CATALOG).unwrap();

        let catalog = ActionCatalog::load(&path).unwrap();
        assert_eq!(catalog.actions[1].name, "createUser");

        let err = ActionCatalog::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, CatalogError::Io { .. }));
    }
}
