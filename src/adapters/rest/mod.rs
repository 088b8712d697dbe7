mod client;

pub use client::{RestApiExecutor, PLUGIN_ID};
