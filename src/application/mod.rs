pub mod action_service;
pub mod crud;
pub mod plugins;

pub use action_service::{ActionService, DefaultActionService};
pub use crud::CrudService;
pub use plugins::PluginRegistry;
