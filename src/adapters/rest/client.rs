use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde_json::Value;

use crate::domain::{ActionConfiguration, ActionExecutionRequest, ActionExecutionResult, Datasource, Property};
use crate::ports::{PluginError, PluginExecutor};

pub const PLUGIN_ID: &str = "restapi-plugin";

/// REST API plugin using reqwest
pub struct RestApiExecutor {
    client: Client,
}

impl RestApiExecutor {
    pub fn new() -> Result<Self, PluginError> {
        let client = Client::builder()
            .user_agent(concat!("actionhub/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PluginError::Configuration(e.to_string()))?;
        Ok(Self { client })
    }

    fn build_url(base: &str, path: &str, query: &[Property]) -> Result<Url, PluginError> {
        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
        };

        let mut url = Url::parse(&joined)
            .map_err(|e| PluginError::Configuration(format!("invalid url '{}': {}", joined, e)))?;

        let params: Vec<&Property> = query.iter().filter(|p| !p.key.trim().is_empty()).collect();
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for param in params {
                pairs.append_pair(&param.key, &param.value);
            }
        }

        Ok(url)
    }

    /// Datasource headers first; action headers replace them by case-insensitive key
    fn merge_headers(base: &[Property], overrides: &[Property]) -> Vec<Property> {
        let mut merged: Vec<Property> = Vec::new();

        for header in base.iter().chain(overrides) {
            if header.key.trim().is_empty() {
                continue;
            }
            match merged.iter_mut().find(|h| h.key.eq_ignore_ascii_case(&header.key)) {
                Some(existing) => *existing = header.clone(),
                None => merged.push(header.clone()),
            }
        }

        merged
    }

    fn parse_method(method: &str) -> Result<Method, PluginError> {
        Method::from_bytes(method.trim().to_ascii_uppercase().as_bytes())
            .map_err(|_| PluginError::Configuration(format!("invalid HTTP method '{}'", method)))
    }

    fn headers_to_json(headers: &HeaderMap) -> Value {
        let mut map = serde_json::Map::new();
        for (name, value) in headers {
            let value = Value::String(String::from_utf8_lossy(value.as_bytes()).into_owned());
            match map
                .entry(name.as_str().to_string())
                .or_insert_with(|| Value::Array(Vec::new()))
            {
                Value::Array(values) => values.push(value),
                other => *other = value,
            }
        }
        Value::Object(map)
    }

    fn parse_body(bytes: &[u8], is_json: bool) -> Value {
        if is_json {
            if let Ok(value) = serde_json::from_slice(bytes) {
                return value;
            }
        }
        Value::String(String::from_utf8_lossy(bytes).into_owned())
    }

    fn map_send_error(err: reqwest::Error) -> PluginError {
        if err.is_builder() {
            PluginError::Configuration(err.to_string())
        } else {
            PluginError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl PluginExecutor for RestApiExecutor {
    fn plugin_id(&self) -> &str {
        PLUGIN_ID
    }

    async fn execute(
        &self,
        datasource: &Datasource,
        configuration: &ActionConfiguration,
    ) -> Result<ActionExecutionResult, PluginError> {
        let method = Self::parse_method(&configuration.http_method)?;
        let url = Self::build_url(&datasource.url, &configuration.path, &configuration.query_parameters)?;
        let headers = Self::merge_headers(&datasource.headers, &configuration.headers);
        let body = configuration.body.clone().filter(|b| !b.is_empty());

        let mut request = self.client.request(method.clone(), url.clone());
        for header in &headers {
            request = request.header(header.key.as_str(), header.value.as_str());
        }
        if let Some(body) = &body {
            request = request.body(body.clone());
        }

        tracing::debug!("{} {}", method, url);
        let response = request.send().await.map_err(Self::map_send_error)?;

        let status = response.status();
        let response_headers = Self::headers_to_json(response.headers());
        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("json"));
        let bytes = response
            .bytes()
            .await
            .map_err(|e| PluginError::Response(e.to_string()))?;

        let mut result = ActionExecutionResult::success(
            status.as_u16().to_string(),
            response_headers,
            Self::parse_body(&bytes, is_json),
        )
        .with_request(ActionExecutionRequest {
            http_method: method.to_string(),
            url: url.to_string(),
            headers,
            body,
        });
        result.is_execution_success = status.is_success();

        Ok(result)
    }
}
