//! Per-artifact signature deduplication.

use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;
use uncased::Uncased;

/// Tracks rendered signatures emitted into each artifact.
///
/// Comparison is case-insensitive on the full signature text. The first
/// registration wins; later duplicates are rejected without a diagnostic.
/// Check-and-insert happens under one lock, so synthesizers running on
/// different threads may share a registry.
#[derive(Debug, Default)]
pub struct NamingRegistry {
    scopes: Mutex<HashMap<String, HashSet<Uncased<'static>>>>,
}

impl NamingRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `signature` for `artifact`.
    ///
    /// Returns `true` if the signature was new and should be emitted.
    #[must_use]
    pub fn try_register(&self, artifact: &str, signature: &str) -> bool {
        let mut scopes = self.scopes.lock();
        let scope = scopes.entry(artifact.to_owned()).or_default();
        let inserted = scope.insert(Uncased::new(signature.to_owned()));
        if !inserted {
            tracing::trace!(artifact, signature, "dropping duplicate signature");
        }
        inserted
    }

    /// Number of signatures recorded for `artifact`.
    #[must_use]
    pub fn registered(&self, artifact: &str) -> usize {
        self.scopes.lock().get(artifact).map_or(0, HashSet::len)
    }
}
