//! Host overload synthesis.
//!
//! For every host method taking an annotated type, a companion overload is
//! emitted without that parameter. It returns the annotated type's wrapper,
//! parameterized by the method's result type, whose factory calls the
//! original method with the wrapper's instance in the removed position.
//!
//! Host types that are neither `public` nor `internal`, or that are not
//! `partial`, receive nothing. Within an accepted host each method is judged
//! on its own, and the original may have any accessibility: the overload is
//! always `public`.

use std::borrow::Cow;
use std::collections::BTreeSet;

use crate::artifact::GeneratedArtifact;
use crate::model::{
    AnnotatedType, DeferredFlavor, HostMethod, HostType, Parameter, TypeRef, find_annotated,
};
use crate::registry::NamingRegistry;
use crate::render::csharp::{
    argument_list, constraint_clauses, escape_identifier, first_char_to_lower, parameter_list,
    type_parameter_list,
};
use crate::render::{RenderOptions, SourceWriter};
use crate::wrapper::awaiter_name;

const LAMBDA_PARAMETER: &str = "args";

/// A default-construction factory field shared by overloads of one host.
#[derive(Debug)]
struct FactoryField {
    /// Closed annotated type as written (`SomeArgs`, `Entry<int>`).
    data_type: String,
    name: String,
}

/// Factory fields in first-use order.
#[derive(Debug, Default)]
struct Factories {
    fields: Vec<FactoryField>,
}

impl Factories {
    /// Returns the field constructing `ty`, declaring it on first use.
    fn field_for(&mut self, annotated: &AnnotatedType, ty: &TypeRef) -> String {
        if let Some(existing) = self.fields.iter().find(|field| field.data_type == ty.display) {
            return existing.name.clone();
        }
        let base = format!("_{}Factory", first_char_to_lower(&annotated.name));
        let mut name = base.clone();
        let mut suffix = 2;
        while self.fields.iter().any(|field| field.name == name) {
            name = format!("{base}{suffix}");
            suffix += 1;
        }
        self.fields.push(FactoryField {
            data_type: ty.display.clone(),
            name: name.clone(),
        });
        name
    }
}

/// One planned overload, rendered once the factory fields are known.
#[derive(Debug)]
struct Overload<'m> {
    method: &'m HostMethod,
    /// Namespace of the wrapper the overload returns.
    namespace: String,
    signature: String,
    body: String,
}

/// Renders host overload artifacts.
#[derive(Debug, Clone, Copy)]
pub struct HostOverloadSynthesizer<'a> {
    annotated: &'a [AnnotatedType],
    naming: &'a NamingRegistry,
    options: RenderOptions,
}

impl<'a> HostOverloadSynthesizer<'a> {
    /// Creates a synthesizer matching parameters against `annotated`.
    #[must_use]
    pub const fn new(
        annotated: &'a [AnnotatedType],
        naming: &'a NamingRegistry,
        options: RenderOptions,
    ) -> Self {
        Self {
            annotated,
            naming,
            options,
        }
    }

    /// Renders the overloads for `host` as `artifact_name`.
    ///
    /// Returns `None` when the host is not eligible or none of its methods
    /// take an annotated type.
    #[must_use]
    pub fn synthesize(&self, host: &HostType, artifact_name: &str) -> Option<GeneratedArtifact> {
        if let Some(reason) = suppression_reason(host) {
            tracing::debug!(host = %host.qualified_name(), reason, "suppressing host overloads");
            return None;
        }

        let host_type = format!("{}{}", host.name, type_parameter_list(&host.generic_parameters));
        let mut factories = Factories::default();
        let overloads = host
            .methods
            .iter()
            .filter_map(|method| self.plan(method, host, &mut factories, artifact_name))
            .collect::<Vec<_>>();
        if overloads.is_empty() {
            tracing::debug!(host = %host.qualified_name(), "no qualifying host methods");
            return None;
        }

        let mut writer = SourceWriter::new(self.options);
        writer.line("using System;");
        writer.line("using System.Threading.Tasks;");
        let imports = overloads
            .iter()
            .map(|overload| overload.namespace.as_str())
            .filter(|namespace| !namespace.is_empty() && *namespace != host.namespace)
            .collect::<BTreeSet<_>>();
        for namespace in imports {
            writer.line(&format!("using {namespace};"));
        }
        writer.blank();

        let in_namespace = !host.namespace.is_empty();
        if in_namespace {
            writer.open(&format!("namespace {}", host.namespace));
        }
        writer.open(&format!(
            "{} partial class {host_type}",
            host.accessibility.keyword()
        ));
        for field in &factories.fields {
            writer.line(&format!(
                "private Func<{host_type}, {data}> {name} = _ => new {data}();",
                data = field.data_type,
                name = field.name
            ));
        }
        for overload in &overloads {
            writer.blank();
            writer.doc(overload.method.doc.as_deref());
            writer.open_with(
                &overload.signature,
                &constraint_clauses(&overload.method.generic_parameters),
            );
            writer.line(&overload.body);
            writer.close();
        }
        writer.close();
        if in_namespace {
            writer.close();
        }

        tracing::debug!(
            artifact = artifact_name,
            overloads = overloads.len(),
            factories = factories.fields.len(),
            "rendered host overloads"
        );
        Some(GeneratedArtifact::new(artifact_name, writer.finish()))
    }

    fn plan<'m>(
        &self,
        method: &'m HostMethod,
        host: &HostType,
        factories: &mut Factories,
        artifact_name: &str,
    ) -> Option<Overload<'m>> {
        let (position, bound, annotated) = self.bind(method, &host.namespace)?;
        let remaining = method
            .parameters
            .iter()
            .enumerate()
            .filter(|(index, _)| *index != position)
            .map(|(_, param)| param);

        let wrapper = wrapper_type(annotated, &bound.ty, &method.result);
        let type_params = type_parameter_list(&method.generic_parameters);
        let signature = format!(
            "public {wrapper} {}{type_params}({})",
            method.name,
            parameter_list(remaining)
        );
        if !self.naming.try_register(artifact_name, &signature) {
            return None;
        }

        let factory = factories.field_for(annotated, &bound.ty);
        tracing::trace!(
            host = %host.name,
            method = %method.name,
            factory = %factory,
            "planned overload"
        );
        let lambda = lambda_parameter(&method.parameters);
        let arguments = method
            .parameters
            .iter()
            .enumerate()
            .map(|(index, param)| {
                if index == position {
                    Cow::Borrowed(lambda.as_str())
                } else {
                    escape_identifier(&param.name)
                }
            });
        let mut call = format!("{}{type_params}({})", method.name, argument_list(arguments));
        if method.flavor == DeferredFlavor::ValueTask {
            call.push_str(".AsTask()");
        }

        Some(Overload {
            method,
            namespace: annotated.namespace.clone(),
            body: format!("return new {wrapper}({factory}(this), {lambda} => {call});"),
            signature,
        })
    }

    /// First parameter, in declaration order, whose type is annotated.
    fn bind<'m>(
        &self,
        method: &'m HostMethod,
        namespace: &str,
    ) -> Option<(usize, &'m Parameter, &'a AnnotatedType)> {
        method
            .parameters
            .iter()
            .enumerate()
            .find_map(|(index, param)| {
                find_annotated(self.annotated, &param.ty, namespace)
                    .map(|annotated| (index, param, annotated))
            })
    }
}

fn suppression_reason(host: &HostType) -> Option<&'static str> {
    if !host.accessibility.admits_host_overloads() {
        Some("host is neither public nor internal")
    } else if !host.extensible {
        Some("host is not partial")
    } else {
        None
    }
}

/// `SomeArgsAwaiter<string>`, or `EntryAwaiter<int, string>` for a generic
/// annotated type bound as `Entry<int>`.
fn wrapper_type(annotated: &AnnotatedType, bound: &TypeRef, result: &TypeRef) -> String {
    let arguments = bound
        .type_arguments
        .iter()
        .chain(std::iter::once(result))
        .map(|arg| arg.display.as_str());
    format!("{}<{}>", awaiter_name(annotated), argument_list(arguments))
}

/// `args`, or the first free `argsN` if a parameter already uses the name.
fn lambda_parameter(parameters: &[Parameter]) -> String {
    let taken = |candidate: &str| parameters.iter().any(|param| param.name == candidate);
    if !taken(LAMBDA_PARAMETER) {
        return LAMBDA_PARAMETER.to_owned();
    }
    (1_u32..)
        .map(|suffix| format!("{LAMBDA_PARAMETER}{suffix}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or_default()
}
