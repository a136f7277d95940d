//! Wrapper synthesis: one fluent deferred-invocation type per annotated type.
//!
//! A wrapper `<Name>Awaiter<T>` holds one instance of the annotated type, an
//! ordered queue of zero-argument thunks and a final factory producing the
//! `Task<T>` result. Awaiting it drains the queue in order and then calls the
//! factory with the (possibly mutated) instance.
//!
//! Members are emitted in a fixed order so output is stable:
//!
//! 1. infrastructure (fields, constructors, `AwaitAsync`, `GetAwaiter`);
//! 2. method proxies in declaration order;
//! 3. `With<Property>` setters in declaration order;
//! 4. the implicit conversion from `Task<T>`.
//!
//! Every proxy and setter signature passes through the [`NamingRegistry`], so
//! an explicit `WithXYZ(string xYZ)` method shadows the generated setter.

use crate::artifact::GeneratedArtifact;
use crate::model::{AnnotatedType, MethodMember, PropertyMember};
use crate::registry::NamingRegistry;
use crate::render::csharp::{
    argument_list, constraint_clauses, escape_identifier, first_char_to_lower, parameter_list,
    parameter_names, type_parameter_list,
};
use crate::render::{RenderOptions, SourceWriter};

const USINGS: [&str; 5] = [
    "System",
    "System.Collections.Generic",
    "System.ComponentModel",
    "System.Runtime.CompilerServices",
    "System.Threading.Tasks",
];

const RESULT_PARAMETER: &str = "T";
const RESULT_PARAMETER_FALLBACK: &str = "TResult";

/// Name of the wrapper type generated for `annotated`, without type arguments.
#[must_use]
pub fn awaiter_name(annotated: &AnnotatedType) -> String {
    format!("{}Awaiter", annotated.name)
}

/// Name of the wrapper's result type parameter.
///
/// `T` unless the annotated type, or one of its methods, already declares a
/// `T`; a method-level `T` would hide the wrapper's own in the proxy
/// signature.
#[must_use]
pub fn result_parameter(annotated: &AnnotatedType) -> String {
    let taken = |candidate: &str| {
        annotated
            .generic_parameters
            .iter()
            .chain(
                annotated
                    .methods()
                    .flat_map(|method| method.generic_parameters.iter()),
            )
            .any(|param| param.name == candidate)
    };
    if !taken(RESULT_PARAMETER) {
        return RESULT_PARAMETER.to_owned();
    }
    let mut candidate = RESULT_PARAMETER_FALLBACK.to_owned();
    let mut suffix = 1;
    while taken(&candidate) {
        candidate = format!("{RESULT_PARAMETER_FALLBACK}{suffix}");
        suffix += 1;
    }
    candidate
}

/// Derived shape of one wrapper, discarded after rendering.
struct WrapperSpec {
    /// `SomeArgsAwaiter`
    awaiter: String,
    /// `SomeArgsAwaiter<T>`
    wrapper_type: String,
    /// `SomeArgs`, or `Entry<TKey>` for generic annotated types.
    data_type: String,
    result: String,
}

impl WrapperSpec {
    fn new(data: &AnnotatedType) -> Self {
        let awaiter = awaiter_name(data);
        let result = result_parameter(data);
        let mut type_params = data
            .generic_parameters
            .iter()
            .map(|param| param.name.clone())
            .collect::<Vec<_>>();
        let data_type = if type_params.is_empty() {
            data.name.clone()
        } else {
            format!("{}<{}>", data.name, type_params.join(", "))
        };
        type_params.push(result.clone());
        let wrapper_type = format!("{awaiter}<{}>", type_params.join(", "));
        Self {
            awaiter,
            wrapper_type,
            data_type,
            result,
        }
    }

    fn factory_type(&self) -> String {
        format!("Func<{}, Task<{}>>", self.data_type, self.result)
    }
}

/// Renders wrapper artifacts.
#[derive(Debug, Clone, Copy)]
pub struct WrapperSynthesizer<'a> {
    naming: &'a NamingRegistry,
    options: RenderOptions,
}

impl<'a> WrapperSynthesizer<'a> {
    /// Creates a synthesizer recording signatures in `naming`.
    #[must_use]
    pub const fn new(naming: &'a NamingRegistry, options: RenderOptions) -> Self {
        Self { naming, options }
    }

    /// Renders the wrapper for `annotated` as `artifact_name`.
    #[must_use]
    pub fn synthesize(&self, annotated: &AnnotatedType, artifact_name: &str) -> GeneratedArtifact {
        let spec = WrapperSpec::new(annotated);
        let mut writer = SourceWriter::new(self.options);
        for using in USINGS {
            writer.line(&format!("using {using};"));
        }
        writer.blank();

        let in_namespace = !annotated.namespace.is_empty();
        if in_namespace {
            writer.open(&format!("namespace {}", annotated.namespace));
        }
        writer.doc(annotated.doc.as_deref());
        writer.open_with(
            &format!("public class {}", spec.wrapper_type),
            &constraint_clauses(&annotated.generic_parameters),
        );

        write_infrastructure(&mut writer, &spec);
        let mut emitted = 0_usize;
        for method in annotated.methods() {
            if !method.accessibility.is_visible_to_siblings() {
                tracing::trace!(
                    owner = %annotated.name,
                    method = %method.name,
                    "skipping method not visible to the wrapper"
                );
                continue;
            }
            if self.write_method(&mut writer, &spec, method, artifact_name) {
                emitted += 1;
            }
        }
        if !annotated.skip_setters {
            for property in annotated.properties() {
                if self.write_setter(&mut writer, &spec, property, artifact_name) {
                    emitted += 1;
                }
            }
        }
        write_conversion(&mut writer, &spec);

        writer.close();
        if in_namespace {
            writer.close();
        }
        tracing::debug!(artifact = artifact_name, members = emitted, "rendered wrapper");
        GeneratedArtifact::new(artifact_name, writer.finish())
    }

    fn write_method(
        &self,
        writer: &mut SourceWriter,
        spec: &WrapperSpec,
        method: &MethodMember,
        artifact_name: &str,
    ) -> bool {
        let type_params = type_parameter_list(&method.generic_parameters);
        let signature = format!(
            "public {} {}{type_params}({})",
            spec.wrapper_type,
            method.name,
            parameter_list(&method.parameters)
        );
        if !self.naming.try_register(artifact_name, &signature) {
            return false;
        }
        let call = format!(
            "_args.{}{type_params}({})",
            method.name,
            argument_list(parameter_names(&method.parameters))
        );

        writer.blank();
        writer.doc(method.doc.as_deref());
        writer.open_with(&signature, &constraint_clauses(&method.generic_parameters));
        if method.return_kind.is_deferred() {
            writer.line(&format!("Func<Task> taskFactory = async () => await {call};"));
            writer.line("_taskGenerators.Add(taskFactory);");
        } else {
            writer.line(&format!("{call};"));
        }
        writer.line("return this;");
        writer.close();
        true
    }

    fn write_setter(
        &self,
        writer: &mut SourceWriter,
        spec: &WrapperSpec,
        property: &PropertyMember,
        artifact_name: &str,
    ) -> bool {
        if !property.has_public_setter || property.skip_setter {
            return false;
        }
        let lowered = first_char_to_lower(&property.name);
        let param = escape_identifier(&lowered);
        let signature = format!(
            "public {} With{}({} {param})",
            spec.wrapper_type, property.name, property.declared_type.display
        );
        if !self.naming.try_register(artifact_name, &signature) {
            return false;
        }

        writer.blank();
        writer.doc(property.doc.as_deref());
        writer.open(&signature);
        writer.line(&format!("_args.{} = {param};", property.name));
        writer.line("return this;");
        writer.close();
        true
    }
}

fn write_infrastructure(writer: &mut SourceWriter, spec: &WrapperSpec) {
    let data = &spec.data_type;
    let factory = spec.factory_type();
    let result = &spec.result;

    writer.line(&format!("private readonly {data} _args;"));
    writer.line(&format!("private readonly {factory} _taskFactory;"));
    writer.line("private readonly List<Func<Task>> _taskGenerators = new List<Func<Task>>();");
    writer.blank();

    writer.open_with(
        &format!("public {}({factory} taskFactory)", spec.awaiter),
        &[format!(": this(new {data}(), taskFactory)")],
    );
    writer.close();
    writer.blank();

    writer.open(&format!("public {}({data} args, {factory} taskFactory)", spec.awaiter));
    writer.line("_args = args;");
    writer.line("_taskFactory = taskFactory;");
    writer.close();
    writer.blank();

    writer.open(&format!("private async Task<{result}> AwaitAsync()"));
    writer.open("foreach (var taskGenerator in _taskGenerators)");
    writer.line("await taskGenerator();");
    writer.close();
    writer.line("return await _taskFactory(_args);");
    writer.close();
    writer.blank();

    writer.line("[EditorBrowsable(EditorBrowsableState.Never)]");
    writer.open(&format!("public TaskAwaiter<{result}> GetAwaiter()"));
    writer.line("return AwaitAsync().GetAwaiter();");
    writer.close();
}

fn write_conversion(writer: &mut SourceWriter, spec: &WrapperSpec) {
    writer.blank();
    writer.open(&format!(
        "public static implicit operator {}(Task<{}> task)",
        spec.wrapper_type, spec.result
    ));
    writer.line(&format!(
        "return new {}(new {}(), _ => task);",
        spec.wrapper_type, spec.data_type
    ));
    writer.close();
}
