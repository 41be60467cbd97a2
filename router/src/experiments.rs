//! Experiment discovery.
//!
//! Each experiment is a top-level prefix in the backing store, holding one
//! complete build of the site. The set is re-derived from a fresh listing on
//! every request, so publishing or deleting a prefix takes effect without a
//! restart.

use indexmap::IndexSet;
use store::{ObjectStore, StoreError};

/// Ordered set of experiment names, in first-seen listing order.
///
/// Selection indexes into this order, so it must be stable for a given
/// listing; `IndexSet` preserves insertion order and drops duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExperimentSet {
    names: IndexSet<String>,
}

impl ExperimentSet {
    /// Derive the set from a full key listing. A key reveals an experiment
    /// only when it has exactly two `/`-separated segments (`<experiment>/<leaf>`);
    /// deeper or slash-free keys are skipped.
    pub fn from_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names = IndexSet::new();
        for key in keys {
            let mut segments = key.as_ref().split('/');
            if let (Some(prefix), Some(_), None) =
                (segments.next(), segments.next(), segments.next())
            {
                // Re-inserting an existing name keeps its original position.
                names.insert(prefix.to_string());
            }
        }
        Self { names }
    }

    /// One listing call against the store, reduced to the experiment set.
    pub async fn discover(store: &dyn ObjectStore) -> Result<Self, StoreError> {
        Ok(Self::from_keys(store.list().await?))
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get_index(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}
