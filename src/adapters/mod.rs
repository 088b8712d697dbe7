pub mod catalog;
pub mod rest;
pub mod store;

pub use catalog::ActionCatalog;
pub use rest::RestApiExecutor;
pub use store::MemoryActionRepository;
