mod file;

pub use file::{ActionCatalog, CatalogError};
