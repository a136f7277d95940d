//! Opt-in and opt-out marker attributes.
//!
//! Markers are matched by name, case-insensitively, in bare (`CreateConfigurableTask`)
//! or suffixed (`CreateConfigurableTaskAttribute`) form, optionally qualified with
//! the marker namespace or `global::`. Definitions are keyed by fully qualified
//! name: a marker already present in the compilation is never redefined, and
//! any number of requests for a missing one yields a single definition.

use std::collections::{BTreeMap, HashSet};

use parking_lot::Mutex;
use uncased::UncasedStr;

use crate::artifact::{GeneratedArtifact, MARKER_ARTIFACT_NAME};
use crate::render::{RenderOptions, SourceWriter};

/// Lowest language version accepting `global using` directives.
const GLOBAL_USING_MIN_LANGUAGE_VERSION: u16 = 10;

const ATTRIBUTE_SUFFIX: &str = "Attribute";

/// The two marker attributes understood by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Marker {
    /// Opts a data type into wrapper generation.
    CreateConfigurableTask,
    /// Suppresses setter wrappers for a type or a single property.
    SkipSetterGeneration,
}

impl Marker {
    /// Every marker, in definition order.
    pub const ALL: [Self; 2] = [Self::CreateConfigurableTask, Self::SkipSetterGeneration];

    /// Attribute name without the `Attribute` suffix.
    #[must_use]
    pub const fn bare_name(self) -> &'static str {
        match self {
            Self::CreateConfigurableTask => "CreateConfigurableTask",
            Self::SkipSetterGeneration => "SkipSetterGeneration",
        }
    }

    /// Declared class name of the attribute.
    #[must_use]
    pub fn type_name(self) -> String {
        format!("{}{ATTRIBUTE_SUFFIX}", self.bare_name())
    }

    const fn usage(self) -> &'static str {
        match self {
            Self::CreateConfigurableTask => "AttributeTargets.Class",
            Self::SkipSetterGeneration => "AttributeTargets.Class | AttributeTargets.Property",
        }
    }
}

/// Resolves marker attributes and collects the definitions a pass must emit.
#[derive(Debug)]
pub struct MarkerRegistry {
    namespace: String,
    known_symbols: HashSet<String>,
    pending: Mutex<BTreeMap<String, Marker>>,
}

impl MarkerRegistry {
    /// Creates a registry for markers living in `namespace`.
    ///
    /// `known_symbols` lists fully qualified type names already defined in the
    /// compilation; markers found there are never redefined.
    pub fn new<I, S>(namespace: impl Into<String>, known_symbols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            namespace: namespace.into(),
            known_symbols: known_symbols.into_iter().map(Into::into).collect(),
            pending: Mutex::new(BTreeMap::new()),
        }
    }

    /// Fully qualified name of `marker`'s attribute class.
    #[must_use]
    pub fn qualified_name(&self, marker: Marker) -> String {
        crate::model::qualify(&self.namespace, &marker.type_name())
    }

    /// Maps attribute text as written in source to a marker.
    #[must_use]
    pub fn resolve(&self, attribute: &str) -> Option<Marker> {
        let name = UncasedStr::new(normalise_attribute(attribute));
        Marker::ALL
            .into_iter()
            .find(|marker| self.spellings(*marker).iter().any(|s| name == s.as_str()))
    }

    /// Whether any of `attributes` resolves to `marker`.
    #[must_use]
    pub fn is_marked<S: AsRef<str>>(&self, attributes: &[S], marker: Marker) -> bool {
        attributes
            .iter()
            .any(|attribute| self.resolve(attribute.as_ref()) == Some(marker))
    }

    /// Whether the compilation already defines `marker`.
    #[must_use]
    pub fn is_known(&self, marker: Marker) -> bool {
        self.known_symbols.contains(&self.qualified_name(marker))
    }

    /// Asks for `marker` to be defined.
    ///
    /// Returns `true` only for the request that scheduled the definition;
    /// repeated requests, and requests for markers the compilation already
    /// defines, return `false`.
    #[must_use]
    pub fn request(&self, marker: Marker) -> bool {
        if self.is_known(marker) {
            return false;
        }
        let key = self.qualified_name(marker);
        let mut pending = self.pending.lock();
        if pending.contains_key(&key) {
            return false;
        }
        pending.insert(key, marker);
        true
    }

    /// Markers scheduled for definition, ordered by qualified name.
    #[must_use]
    pub fn pending(&self) -> Vec<Marker> {
        self.pending.lock().values().copied().collect()
    }

    /// Renders the definitions artifact, or `None` if nothing was scheduled.
    #[must_use]
    pub fn render(
        &self,
        options: RenderOptions,
        language_version: Option<u16>,
    ) -> Option<GeneratedArtifact> {
        let pending = self.pending();
        if pending.is_empty() {
            return None;
        }

        let mut writer = SourceWriter::new(options);
        if language_version.is_some_and(|v| v >= GLOBAL_USING_MIN_LANGUAGE_VERSION) {
            writer.line(&format!("global using {};", self.namespace));
        }
        writer.line("using System;");
        writer.blank();
        let in_namespace = !self.namespace.is_empty();
        if in_namespace {
            writer.open(&format!("namespace {}", self.namespace));
        }
        for (index, marker) in pending.iter().enumerate() {
            if index > 0 {
                writer.blank();
            }
            writer.line(&format!("[AttributeUsage({})]", marker.usage()));
            writer.open(&format!("public class {} : Attribute", marker.type_name()));
            writer.close();
        }
        if in_namespace {
            writer.close();
        }
        Some(GeneratedArtifact::new(MARKER_ARTIFACT_NAME, writer.finish()))
    }

    fn spellings(&self, marker: Marker) -> [String; 4] {
        let bare = marker.bare_name();
        let full = marker.type_name();
        [
            bare.to_owned(),
            crate::model::qualify(&self.namespace, bare),
            crate::model::qualify(&self.namespace, &full),
            full,
        ]
    }
}

/// Strips `global::`, an argument list and surrounding whitespace.
fn normalise_attribute(attribute: &str) -> &str {
    let trimmed = attribute.trim();
    let unrooted = trimmed.strip_prefix("global::").unwrap_or(trimmed);
    unrooted
        .split_once('(')
        .map_or(unrooted, |(name, _)| name)
        .trim()
}
