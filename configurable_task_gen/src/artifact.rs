//! Named text artifacts produced by a generation pass.

use std::collections::{BTreeMap, HashMap};

use sha2::{Digest, Sha256};

/// Suffix of wrapper artifact names (`SomeArgs_AwaitableTask`).
pub const WRAPPER_ARTIFACT_SUFFIX: &str = "_AwaitableTask";

/// Suffix of host overload artifact names (`SomeService_ConfigurableTaskWrap`).
pub const HOST_ARTIFACT_SUFFIX: &str = "_ConfigurableTaskWrap";

/// Name of the marker definitions artifact.
pub const MARKER_ARTIFACT_NAME: &str = "CreateConfigurableTaskAttribute";

/// File extension appended to artifact names to form hint names.
pub const HINT_EXTENSION: &str = ".g.cs";

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Artifact name, unique within a pass.
    pub name: String,
    /// Generated source text.
    pub text: String,
}

impl GeneratedArtifact {
    /// Creates an artifact.
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// File name the toolchain should register the text under.
    #[must_use]
    pub fn hint_name(&self) -> String {
        format!("{}{HINT_EXTENSION}", self.name)
    }

    /// Hex SHA-256 of the name and text, stable across runs.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.name.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// All artifacts of one pass, keyed and ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationOutput {
    artifacts: BTreeMap<String, GeneratedArtifact>,
}

impl GenerationOutput {
    /// Creates an empty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an artifact, replacing any previous one with the same name.
    pub fn insert(&mut self, artifact: GeneratedArtifact) {
        self.artifacts.insert(artifact.name.clone(), artifact);
    }

    /// Looks up an artifact by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&GeneratedArtifact> {
        self.artifacts.get(name)
    }

    /// Returns the generated text of an artifact.
    #[must_use]
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).map(|artifact| artifact.text.as_str())
    }

    /// Artifact names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.artifacts.keys().map(String::as_str)
    }

    /// Artifacts in name order.
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedArtifact> {
        self.artifacts.values()
    }

    /// Number of artifacts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether the pass produced nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Hash over every artifact, for cheap whole-output comparisons.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for artifact in self.artifacts.values() {
            hasher.update(artifact.content_hash().as_bytes());
        }
        format!("{:x}", hasher.finalize())
    }

    /// Converts into the name-to-text mapping handed back to the toolchain.
    #[must_use]
    pub fn into_texts(self) -> BTreeMap<String, String> {
        self.artifacts
            .into_iter()
            .map(|(name, artifact)| (name, artifact.text))
            .collect()
    }
}

/// Derives artifact names for `(name, namespace, generic arity)` entries.
///
/// Names are `<name><suffix>`. When several entries share a simple name, all
/// of them are qualified with their namespace, and generic ones also carry
/// their arity (`Demo.Entry`1_AwaitableTask`), so no artifact is lost and the
/// result does not depend on input order. Entries are expected to be
/// distinct; partial declarations are merged before naming.
pub(crate) fn artifact_names<'a, I>(types: I, suffix: &str) -> Vec<String>
where
    I: IntoIterator<Item = (&'a str, &'a str, usize)>,
{
    let entries = types.into_iter().collect::<Vec<_>>();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for (name, _, _) in &entries {
        *counts.entry(*name).or_default() += 1;
    }
    entries
        .into_iter()
        .map(|(name, namespace, arity)| {
            if counts.get(name).copied().unwrap_or_default() <= 1 {
                return format!("{name}{suffix}");
            }
            let qualified = crate::model::qualify(namespace, name);
            if arity == 0 {
                format!("{qualified}{suffix}")
            } else {
                format!("{qualified}`{arity}{suffix}")
            }
        })
        .collect()
}
