//! Stored API actions: persistence, `{{ key }}` parameter binding and execution
//! through pluggable executors.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod ports;
