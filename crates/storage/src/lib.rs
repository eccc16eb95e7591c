#![forbid(unsafe_code)]

pub mod keys;
pub mod repository;
pub mod sqlite;

pub use keys::{KeySpace, SCHEMA_VERSION};
pub use repository::{InMemoryStore, ProgressStore, Storage, StorageError};
