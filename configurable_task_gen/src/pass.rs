//! One generation pass: snapshot in, named artifacts out.
//!
//! Annotated and host types are synthesized independently, optionally on
//! the rayon pool. Shared state is limited to the naming and marker
//! registries, both internally locked, and results are collected into a
//! name-ordered map, so the output does not depend on scheduling or on the
//! order of types in the snapshot.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::artifact::{
    GeneratedArtifact, GenerationOutput, HOST_ARTIFACT_SUFFIX, WRAPPER_ARTIFACT_SUFFIX,
    artifact_names,
};
use crate::config::GeneratorConfig;
use crate::extract::extract;
use crate::host::HostOverloadSynthesizer;
use crate::model::{AnnotatedType, HostType, Snapshot};
use crate::model::source::SourceModel;
use crate::registry::{Marker, MarkerRegistry, NamingRegistry};
use crate::render::RenderOptions;
use crate::wrapper::WrapperSynthesizer;

/// Runs a pass over an already typed snapshot.
#[must_use]
pub fn generate(snapshot: &Snapshot, config: &GeneratorConfig) -> GenerationOutput {
    let markers = MarkerRegistry::new(
        config.marker_namespace.clone(),
        snapshot.known_symbols.iter().cloned(),
    );
    run_pass(snapshot, config, &markers)
}

/// Extracts a snapshot from `model` and runs a pass over it.
#[must_use]
pub fn generate_from_source(model: &SourceModel, config: &GeneratorConfig) -> GenerationOutput {
    let markers = MarkerRegistry::new(
        config.marker_namespace.clone(),
        model.known_symbols.iter().cloned(),
    );
    let snapshot = extract(model, &markers);
    run_pass(&snapshot, config, &markers)
}

fn run_pass(
    snapshot: &Snapshot,
    config: &GeneratorConfig,
    markers: &MarkerRegistry,
) -> GenerationOutput {
    tracing::debug!(
        annotated = snapshot.annotated_types.len(),
        hosts = snapshot.host_types.len(),
        parallel = config.parallel,
        "starting generation pass"
    );
    let options = RenderOptions::from(config);
    let naming = NamingRegistry::new();

    let annotated = coalesce(&snapshot.annotated_types);
    let host_types = coalesce(&snapshot.host_types);

    let wrapper_jobs = annotated
        .iter()
        .zip(artifact_names(
            annotated.iter().map(Declaration::identity),
            WRAPPER_ARTIFACT_SUFFIX,
        ))
        .collect::<Vec<_>>();
    let host_jobs = host_types
        .iter()
        .zip(artifact_names(
            host_types.iter().map(Declaration::identity),
            HOST_ARTIFACT_SUFFIX,
        ))
        .collect::<Vec<_>>();

    let wrappers = WrapperSynthesizer::new(&naming, options);
    let hosts = HostOverloadSynthesizer::new(&annotated, &naming, options);

    let mut output = GenerationOutput::new();
    for artifact in run_jobs(&wrapper_jobs, config.parallel, |(ty, name)| {
        Some(wrappers.synthesize(ty, name))
    }) {
        output.insert(artifact);
    }
    for artifact in run_jobs(&host_jobs, config.parallel, |(ty, name)| {
        hosts.synthesize(ty, name)
    }) {
        output.insert(artifact);
    }

    if config.emit_marker_definitions {
        let scheduled = Marker::ALL
            .into_iter()
            .filter(|marker| markers.request(*marker))
            .count();
        tracing::debug!(scheduled, "requested marker definitions");
        if let Some(artifact) = markers.render(options, snapshot.language_version) {
            output.insert(artifact);
        }
    }

    tracing::debug!(artifacts = output.len(), "finished generation pass");
    output
}

/// A type declaration that may be split across `partial` declarations.
trait Declaration: Clone {
    /// Name, namespace and generic arity.
    fn identity(&self) -> (&str, &str, usize);

    /// Folds another declaration of the same type into this one.
    fn absorb(&mut self, other: &Self);
}

impl Declaration for AnnotatedType {
    fn identity(&self) -> (&str, &str, usize) {
        (
            self.name.as_str(),
            self.namespace.as_str(),
            self.generic_parameters.len(),
        )
    }

    fn absorb(&mut self, other: &Self) {
        self.members.extend(other.members.iter().cloned());
        self.skip_setters |= other.skip_setters;
        if self.doc.is_none() {
            self.doc.clone_from(&other.doc);
        }
    }
}

impl Declaration for HostType {
    fn identity(&self) -> (&str, &str, usize) {
        (
            self.name.as_str(),
            self.namespace.as_str(),
            self.generic_parameters.len(),
        )
    }

    fn absorb(&mut self, other: &Self) {
        self.methods.extend(other.methods.iter().cloned());
        self.extensible |= other.extensible;
    }
}

/// Merges declarations sharing name, namespace and generic arity.
///
/// Front-ends may report each `partial` declaration of a type on its own.
/// Members are concatenated in declaration order and the merged type keeps
/// the position of its first declaration.
fn coalesce<T: Declaration>(declarations: &[T]) -> Vec<T> {
    let mut merged: Vec<T> = Vec::with_capacity(declarations.len());
    let mut positions: HashMap<(&str, &str, usize), usize> = HashMap::new();
    for declaration in declarations {
        let identity = declaration.identity();
        if let Some(existing) = positions
            .get(&identity)
            .copied()
            .and_then(|index| merged.get_mut(index))
        {
            tracing::trace!(
                name = identity.0,
                namespace = identity.1,
                "merging partial declaration"
            );
            existing.absorb(declaration);
            continue;
        }
        positions.insert(identity, merged.len());
        merged.push(declaration.clone());
    }
    merged
}

fn run_jobs<J, F>(jobs: &[J], parallel: bool, job: F) -> Vec<GeneratedArtifact>
where
    J: Sync,
    F: Fn(&J) -> Option<GeneratedArtifact> + Sync + Send,
{
    if parallel {
        jobs.par_iter().filter_map(&job).collect()
    } else {
        jobs.iter().filter_map(&job).collect()
    }
}
