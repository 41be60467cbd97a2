//! Backing object store abstraction.
//!
//! The router only needs two capabilities from its store: enumerate every
//! object key, and point-read one key. Providers implement those behind the
//! [`ObjectStore`] trait so the request pipeline stays independent of where
//! the content actually lives (GCS bucket, local directory, test fixture).

use async_trait::async_trait;
use bytes::Bytes;

pub mod fs;
pub mod gcs;
pub mod memory;

pub use fs::FilesystemStore;
pub use gcs::GcsStore;
pub use memory::MemoryStore;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("http transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("store returned status {status} for {context}")]
    UnexpectedStatus { status: u16, context: String },

    #[error("invalid store endpoint: {0}")]
    Endpoint(#[from] url::ParseError),

    #[error("store endpoint cannot carry a path: {0}")]
    OpaqueEndpoint(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Read-only handle to a bucket-like object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Enumerate every object key in the store, in the store's stable
    /// listing order. Providers paginate internally; callers always see the
    /// complete set.
    async fn list(&self) -> Result<Vec<String>, StoreError>;

    /// Point-read an exact key. A missing object is `Ok(None)`, never an
    /// error; errors mean the store itself could not answer.
    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError>;
}
