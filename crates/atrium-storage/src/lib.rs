//! Storage abstraction for atrium.
//!
//! Backend crates (e.g. atrium-store-sqlite) implement the [`Store`] trait so
//! the server doesn't depend on any specific database engine or schema
//! details.

mod store;
pub mod types;

#[cfg(feature = "test-support")]
pub use store::MockStore;
pub use store::Store;
pub use types::*;

use thiserror::Error;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    #[error("conflict")]
    Conflict,
    #[error("backend error: {0}")]
    Backend(String),
}
