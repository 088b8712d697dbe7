pub mod action_repository;
pub mod plugin_executor;

pub use action_repository::ActionRepository;
pub use plugin_executor::{PluginError, PluginExecutor};
