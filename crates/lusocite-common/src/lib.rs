//! lusocite-common: Shared types, errors, and storage used across all Lusocite crates.

pub mod error;
pub mod relation;
pub mod resolver;
pub mod sandbox;
pub mod store;

// Re-export commonly used types
pub use error::{LusociteError, Result};
pub use relation::Relation;
pub use resolver::{Subject, UnknownResolver};
pub use store::Cache;
