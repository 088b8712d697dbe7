use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{ActionConfiguration, ActionExecutionResult, Datasource};

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("execution timed out after {0} ms")]
    Timeout(u64),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("unreadable response: {0}")]
    Response(String),
}

impl PluginError {
    /// Status code reported on a failed execution result
    pub fn code(&self) -> &'static str {
        match self {
            Self::Timeout(_) => "PE-TIMEOUT",
            Self::Connection(_) => "PE-CONNECTION",
            Self::Configuration(_) => "PE-CONFIG",
            Self::Response(_) => "PE-RESPONSE",
        }
    }
}

/// Port for running a rendered action against its datasource
#[async_trait]
pub trait PluginExecutor: Send + Sync {
    /// Plugin id that actions use to select this executor
    fn plugin_id(&self) -> &str;

    /// Execute a configuration whose bindings have already been rendered
    async fn execute(
        &self,
        datasource: &Datasource,
        configuration: &ActionConfiguration,
    ) -> Result<ActionExecutionResult, PluginError>;
}
