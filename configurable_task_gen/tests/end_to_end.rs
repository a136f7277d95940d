//! End-to-end generation passes over source models and snapshots.

use anyhow::{Result, anyhow, ensure};
use configurable_task_gen::model::{
    AnnotatedType, GenericParameter, HostMethod, HostType, Parameter, PropertyMember, TypeRef,
};
use configurable_task_gen::{
    GenerationOutput, GeneratorConfig, LineEnding, Snapshot, SourceModel, generate,
    generate_from_source,
};
use rstest::{fixture, rstest};
use test_helpers::text::{count_occurrences, normalize_newlines};

const SOURCE: &str = r#"{
    "language_version": 12,
    "types": [
        {
            "name": "SomeArgs",
            "namespace": "Demo",
            "attributes": ["CreateConfigurableTask"],
            "members": [
                {"member": "property", "name": "SomeStuff",
                 "ty": {"display": "string", "name": "String"}, "setter": "public"},
                {"member": "property", "name": "SomeStuff1",
                 "ty": {"display": "string", "name": "String"}, "setter": "public"},
                {"member": "method", "name": "WithSomeStuff",
                 "parameters": [{"name": "someStuff", "ty": {"display": "string", "name": "String"}}],
                 "return_type": {"display": "SomeArgs", "name": "SomeArgs"}},
                {"member": "method", "name": "LoadAsync", "is_async": true,
                 "return_type": {"display": "Task<SomeArgs>", "name": "Task",
                     "type_arguments": [{"display": "SomeArgs", "name": "SomeArgs"}]}},
                {"member": "method", "name": "Equals",
                 "parameters": [{"name": "other", "ty": {"display": "object", "name": "Object"}}],
                 "return_type": {"display": "bool", "name": "Boolean"}},
                {"member": "unresolved", "text": "public void Broken("}
            ]
        },
        {
            "name": "ArgsUser",
            "namespace": "Demo",
            "is_partial": true,
            "members": [
                {"member": "method", "name": "DoSomething", "accessibility": "private",
                 "parameters": [{"name": "data", "ty": {"display": "SomeArgs", "name": "SomeArgs"}}],
                 "return_type": {"display": "Task<string>", "name": "Task",
                     "type_arguments": [{"display": "string", "name": "String"}]}},
                {"member": "method", "name": "Fire",
                 "parameters": [{"name": "data", "ty": {"display": "SomeArgs", "name": "SomeArgs"}}],
                 "return_type": {"display": "Task", "name": "Task"}}
            ]
        },
        {
            "name": "Sealed",
            "namespace": "Demo",
            "members": [
                {"member": "method", "name": "DoSomething",
                 "parameters": [{"name": "data", "ty": {"display": "SomeArgs", "name": "SomeArgs"}}],
                 "return_type": {"display": "Task<string>", "name": "Task",
                     "type_arguments": [{"display": "string", "name": "String"}]}}
            ]
        }
    ]
}"#;

#[fixture]
fn model() -> SourceModel {
    SourceModel::from_json(SOURCE).expect("source model fixture is valid")
}

fn sequential() -> GeneratorConfig {
    GeneratorConfig {
        parallel: false,
        ..GeneratorConfig::default()
    }
}

fn text<'a>(output: &'a GenerationOutput, name: &str) -> Result<&'a str> {
    output
        .text(name)
        .ok_or_else(|| anyhow!("missing artifact {name}"))
}

#[rstest]
fn produces_every_artifact(model: SourceModel) {
    let output = generate_from_source(&model, &GeneratorConfig::default());
    assert_eq!(
        output.names().collect::<Vec<_>>(),
        vec![
            "ArgsUser_ConfigurableTaskWrap",
            "CreateConfigurableTaskAttribute",
            "SomeArgs_AwaitableTask",
        ]
    );
}

#[rstest]
fn some_args_scenario(model: SourceModel) -> Result<()> {
    let output = generate_from_source(&model, &GeneratorConfig::default());

    let wrapper = text(&output, "SomeArgs_AwaitableTask")?;
    ensure!(wrapper.contains("public class SomeArgsAwaiter<T>"), "wrapper type");
    ensure!(count_occurrences(wrapper, "SomeArgsAwaiter<T> WithSomeStuff(") == 1, "one WithSomeStuff");
    ensure!(count_occurrences(wrapper, "SomeArgsAwaiter<T> WithSomeStuff1(") == 1, "one WithSomeStuff1");
    ensure!(
        wrapper.contains("async () => await _args.LoadAsync();"),
        "LoadAsync is queued"
    );
    ensure!(!wrapper.contains("Equals("), "reserved names are never proxied");
    ensure!(!wrapper.contains("Broken"), "unresolved members are skipped");

    let host = text(&output, "ArgsUser_ConfigurableTaskWrap")?;
    ensure!(
        host.contains("public SomeArgsAwaiter<string> DoSomething()"),
        "private host method gains a public overload"
    );
    ensure!(
        host.contains("_someArgsFactory(this), args => DoSomething(args)"),
        "overload calls the original with the wrapper instance"
    );
    ensure!(!host.contains("Fire("), "bare Task methods carry no result");

    let markers = text(&output, "CreateConfigurableTaskAttribute")?;
    ensure!(
        markers.starts_with("global using ConfigurableTask;"),
        "language 12 gets a global using"
    );
    Ok(())
}

#[rstest]
fn non_partial_hosts_are_skipped(model: SourceModel) {
    let output = generate_from_source(&model, &GeneratorConfig::default());
    assert!(output.names().all(|name| !name.starts_with("Sealed")));
}

#[rstest]
fn parallel_and_sequential_passes_agree(model: SourceModel) {
    let parallel = generate_from_source(&model, &GeneratorConfig::default());
    let serial = generate_from_source(&model, &sequential());
    assert_eq!(parallel, serial);
    assert_eq!(parallel.fingerprint(), serial.fingerprint());
}

#[rstest]
fn output_is_independent_of_type_order(mut model: SourceModel) {
    let forward = generate_from_source(&model, &sequential());
    model.types.reverse();
    let reversed = generate_from_source(&model, &GeneratorConfig::default());
    assert_eq!(forward, reversed);
}

#[rstest]
fn repeated_passes_are_stable(model: SourceModel) {
    let first = generate_from_source(&model, &GeneratorConfig::default());
    let second = generate_from_source(&model, &GeneratorConfig::default());
    assert_eq!(first.fingerprint(), second.fingerprint());
}

#[rstest]
fn known_markers_are_not_redefined(mut model: SourceModel) {
    model.known_symbols = vec![
        "ConfigurableTask.CreateConfigurableTaskAttribute".to_owned(),
        "ConfigurableTask.SkipSetterGenerationAttribute".to_owned(),
    ];
    let output = generate_from_source(&model, &GeneratorConfig::default());
    assert!(output.get("CreateConfigurableTaskAttribute").is_none());
    assert!(output.get("SomeArgs_AwaitableTask").is_some());
}

#[rstest]
fn marker_emission_can_be_disabled(model: SourceModel) {
    let config = GeneratorConfig {
        emit_marker_definitions: false,
        ..GeneratorConfig::default()
    };
    let output = generate_from_source(&model, &config);
    assert!(output.get("CreateConfigurableTaskAttribute").is_none());
}

#[rstest]
fn custom_marker_namespace_is_matched(mut model: SourceModel) -> Result<()> {
    for ty in &mut model.types {
        for attribute in &mut ty.attributes {
            *attribute = format!("Acme.Tasks.{attribute}");
        }
    }
    let config = GeneratorConfig {
        marker_namespace: "Acme.Tasks".to_owned(),
        ..GeneratorConfig::default()
    };
    let output = generate_from_source(&model, &config);
    ensure!(output.get("SomeArgs_AwaitableTask").is_some(), "opt-in resolved");
    let markers = text(&output, "CreateConfigurableTaskAttribute")?;
    ensure!(markers.contains("namespace Acme.Tasks"), "markers live in the configured namespace");
    Ok(())
}

#[rstest]
fn crlf_output_only_changes_line_endings(model: SourceModel) -> Result<()> {
    let lf = generate_from_source(&model, &sequential());
    let crlf = generate_from_source(
        &model,
        &GeneratorConfig {
            line_ending: LineEnding::Crlf,
            ..sequential()
        },
    );
    for name in lf.names() {
        let windows = text(&crlf, name)?;
        ensure!(windows.contains("\r\n"), "{name} uses CRLF");
        ensure!(normalize_newlines(windows) == text(&lf, name)?, "{name} differs");
    }
    Ok(())
}

#[rstest]
fn clashing_simple_names_are_qualified() {
    let snapshot = Snapshot {
        annotated_types: vec![
            AnnotatedType::new("Options", "Billing")
                .with_property(PropertyMember::settable("Plan", TypeRef::named("string"))),
            AnnotatedType::new("Options", "Shipping")
                .with_property(PropertyMember::settable("Carrier", TypeRef::named("string"))),
        ],
        host_types: vec![HostType::new("Checkout", "Shop").with_method(
            HostMethod::new("Pay", TypeRef::named("bool"))
                .with_parameter(Parameter::new("options", TypeRef::named("Options"))),
        )],
        ..Snapshot::default()
    };
    let output = generate(&snapshot, &GeneratorConfig::default());
    assert!(output.get("Billing.Options_AwaitableTask").is_some());
    assert!(output.get("Shipping.Options_AwaitableTask").is_some());
    let host = output
        .text("Checkout_ConfigurableTaskWrap")
        .expect("host overload emitted");
    assert!(host.contains("using Billing;"), "lowest qualified name wins");
    assert!(!host.contains("using Shipping;"));

    let mut reversed = snapshot.clone();
    reversed.annotated_types.reverse();
    assert_eq!(generate(&reversed, &GeneratorConfig::default()), output);
}

#[rstest]
fn generic_and_plain_types_with_one_name_both_emit() -> Result<()> {
    let mut keyed = AnnotatedType::new("Entry", "Demo")
        .with_property(PropertyMember::settable("Key", TypeRef::named("TKey")));
    keyed.generic_parameters = vec![GenericParameter::new("TKey")];
    let plain = AnnotatedType::new("Entry", "Demo")
        .with_property(PropertyMember::settable("Value", TypeRef::named("string")));
    let snapshot = Snapshot {
        annotated_types: vec![plain, keyed],
        ..Snapshot::default()
    };
    let output = generate(&snapshot, &sequential());

    let plain_wrapper = text(&output, "Demo.Entry_AwaitableTask")?;
    ensure!(plain_wrapper.contains("public class EntryAwaiter<T>\n"), "plain wrapper");
    ensure!(plain_wrapper.contains("WithValue(string value)"), "plain members");
    let keyed_wrapper = text(&output, "Demo.Entry`1_AwaitableTask")?;
    ensure!(keyed_wrapper.contains("public class EntryAwaiter<TKey, T>\n"), "generic wrapper");
    ensure!(keyed_wrapper.contains("WithKey(TKey key)"), "generic members");

    let mut reversed = snapshot.clone();
    reversed.annotated_types.reverse();
    ensure!(generate(&reversed, &sequential()) == output, "order independent");
    Ok(())
}

#[rstest]
fn partial_host_declarations_share_one_artifact() -> Result<()> {
    let pay = HostMethod::new("Pay", TypeRef::named("bool"))
        .with_parameter(Parameter::new("options", TypeRef::named("Options")));
    let refund = HostMethod::new("Refund", TypeRef::named("int"))
        .with_parameter(Parameter::new("options", TypeRef::named("Options")));
    let snapshot = Snapshot {
        annotated_types: vec![AnnotatedType::new("Options", "Shop")
            .with_property(PropertyMember::settable("Plan", TypeRef::named("string")))],
        host_types: vec![
            HostType::new("Checkout", "Shop").with_method(pay),
            HostType::new("Checkout", "Shop").with_method(refund),
        ],
        ..Snapshot::default()
    };
    let output = generate(&snapshot, &sequential());
    ensure!(
        output.names().filter(|name| name.contains("Checkout")).count() == 1,
        "one host artifact: {:?}",
        output.names().collect::<Vec<_>>()
    );
    let host = text(&output, "Checkout_ConfigurableTaskWrap")?;
    ensure!(host.contains("public OptionsAwaiter<bool> Pay()"), "first part");
    ensure!(host.contains("public OptionsAwaiter<int> Refund()"), "second part");
    ensure!(count_occurrences(host, "public partial class Checkout") == 1, "one class body");
    ensure!(
        generate(&snapshot, &GeneratorConfig::default()) == output,
        "parallel pass agrees"
    );
    Ok(())
}

#[rstest]
fn snapshot_json_round_trips_through_generate(model: SourceModel) -> Result<()> {
    let markers_namespace = GeneratorConfig::default().marker_namespace;
    let registry = configurable_task_gen::registry::MarkerRegistry::new(
        markers_namespace,
        model.known_symbols.clone(),
    );
    let snapshot = configurable_task_gen::extract::extract(&model, &registry);
    let payload = serde_json::to_string(&snapshot)?;
    let decoded = Snapshot::from_json(&payload)?;
    ensure!(decoded == snapshot, "snapshot survives JSON");
    ensure!(
        generate(&decoded, &sequential()) == generate_from_source(&model, &sequential()),
        "typed and source passes agree"
    );
    Ok(())
}
