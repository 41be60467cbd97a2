//! In-memory provider for tests.
//!
//! Keys keep their insertion order in `list`, so tests control the
//! first-seen ordering the router derives from a listing.

use crate::{ObjectStore, StoreError};
use async_trait::async_trait;
use bytes::Bytes;

#[derive(Default)]
pub struct MemoryStore {
    objects: Vec<(String, Bytes)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; replaces the body if the key already exists.
    pub fn with(mut self, key: impl Into<String>, body: impl Into<Bytes>) -> Self {
        let key = key.into();
        let body = body.into();
        match self.objects.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = body,
            None => self.objects.push((key, body)),
        }
        self
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.objects.iter().map(|(k, _)| k.clone()).collect())
    }

    async fn get(&self, key: &str) -> Result<Option<Bytes>, StoreError> {
        Ok(self
            .objects
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, body)| body.clone()))
    }
}
