//! Step definitions for the generation scenarios.

use crate::fixtures::GenerationState;
use anyhow::{Result, anyhow, ensure};
use configurable_task_gen::model::{
    AnnotatedType, HostMethod, HostType, MemberDescriptor, MethodMember, Parameter, PropertyMember,
    ReturnKind, TypeRef,
};
use configurable_task_gen::{GeneratorConfig, Snapshot, generate};
use rstest_bdd_macros::{given, then, when};
use test_helpers::text::{count_occurrences, unquote};

const NAMESPACE: &str = "Demo";

fn update_last_annotated(
    generation_state: &GenerationState,
    update: impl FnOnce(&mut AnnotatedType),
) -> Result<()> {
    let mut annotated = generation_state.annotated.take().unwrap_or_default();
    let last = annotated
        .last_mut()
        .ok_or_else(|| anyhow!("no annotated type declared yet"))?;
    update(last);
    generation_state.annotated.set(annotated);
    Ok(())
}

#[given("an annotated type {name} with settable properties {first} and {second}")]
fn annotated_type(generation_state: &GenerationState, name: String, first: String, second: String) {
    let declared = AnnotatedType::new(unquote(&name), NAMESPACE)
        .with_property(PropertyMember::settable(unquote(&first), TypeRef::named("string")))
        .with_property(PropertyMember::settable(unquote(&second), TypeRef::named("string")));
    let mut annotated = generation_state.annotated.take().unwrap_or_default();
    annotated.push(declared);
    generation_state.annotated.set(annotated);
}

#[given("the annotated type declares a method {method} taking a string {param}")]
fn annotated_method(generation_state: &GenerationState, method: String, param: String) -> Result<()> {
    let member = MethodMember::new(unquote(&method), ReturnKind::OrdinarySync)
        .with_parameter(Parameter::new(unquote(&param), TypeRef::named("string")));
    update_last_annotated(generation_state, |ty| ty.members.push(MemberDescriptor::Method(member)))
}

#[given("the annotated type opts out of setter generation")]
fn annotated_opt_out(generation_state: &GenerationState) -> Result<()> {
    update_last_annotated(generation_state, |ty| ty.skip_setters = true)
}

#[given("a {kind} host {host} whose method {method} takes {param_type} and returns {result}")]
fn host_type(
    generation_state: &GenerationState,
    kind: String,
    host: String,
    method: String,
    param_type: String,
    result: String,
) -> Result<()> {
    let extensible = match kind.as_str() {
        "partial" => true,
        "sealed" => false,
        other => return Err(anyhow!("unexpected host kind '{other}'")),
    };
    let mut declared = HostType::new(unquote(&host), NAMESPACE).with_method(
        HostMethod::new(unquote(&method), TypeRef::named(unquote(&result)))
            .with_parameter(Parameter::new("data", TypeRef::named(unquote(&param_type)))),
    );
    declared.extensible = extensible;
    let mut hosts = generation_state.hosts.take().unwrap_or_default();
    hosts.push(declared);
    generation_state.hosts.set(hosts);
    Ok(())
}

#[when("the generator runs")]
fn run_generator(generation_state: &GenerationState) {
    let snapshot = Snapshot {
        annotated_types: generation_state.annotated.take().unwrap_or_default(),
        host_types: generation_state.hosts.take().unwrap_or_default(),
        ..Snapshot::default()
    };
    generation_state
        .output
        .set(generate(&snapshot, &GeneratorConfig::default()));
}

fn artifact_text(generation_state: &GenerationState, artifact: &str) -> Result<String> {
    generation_state
        .output
        .with_ref(|output| output.text(artifact).map(str::to_owned))
        .ok_or_else(|| anyhow!("the generator has not run"))?
        .ok_or_else(|| anyhow!("artifact {artifact} was not produced"))
}

#[then("the artifact {artifact} contains {needle} {count:usize} times")]
fn artifact_count(
    generation_state: &GenerationState,
    artifact: String,
    needle: String,
    count: usize,
) -> Result<()> {
    let text = artifact_text(generation_state, unquote(&artifact))?;
    let actual = count_occurrences(&text, unquote(&needle));
    ensure!(
        actual == count,
        "expected {needle} {count} times in {artifact}, found {actual}"
    );
    Ok(())
}

#[then("the artifact {artifact} includes {needle}")]
fn artifact_includes(generation_state: &GenerationState, artifact: String, needle: String) -> Result<()> {
    let text = artifact_text(generation_state, unquote(&artifact))?;
    ensure!(
        text.contains(unquote(&needle)),
        "{artifact} does not include {needle}:\n{text}"
    );
    Ok(())
}

#[then("no artifact named {artifact} is produced")]
fn artifact_absent(generation_state: &GenerationState, artifact: String) -> Result<()> {
    let present = generation_state
        .output
        .with_ref(|output| output.get(unquote(&artifact)).is_some())
        .ok_or_else(|| anyhow!("the generator has not run"))?;
    ensure!(!present, "{artifact} was produced");
    Ok(())
}
