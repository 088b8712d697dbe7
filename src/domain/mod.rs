pub mod action;
pub mod binding;
pub mod execution;

pub use action::{Action, ActionConfiguration, ActionId, Datasource, Property};
pub use execution::{ActionExecutionRequest, ActionExecutionResult, ExecuteActionDto, Param};
