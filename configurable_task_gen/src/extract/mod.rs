//! Model extraction: [`SourceModel`] to typed [`Snapshot`].
//!
//! Everything that depends on attribute text or declared return types is
//! decided here, once per member:
//!
//! - types carrying the opt-in marker become [`AnnotatedType`]s, every other
//!   type becomes a [`HostType`] candidate;
//! - the skip-setter marker becomes a flag on the type or property;
//! - reserved and non-ordinary methods are dropped;
//! - return types are classified into [`ReturnKind`]s, or into a
//!   [`DeferredFlavor`] and result type for host methods.
//!
//! Members that do not fit are dropped without a diagnostic.

mod reserved;

use crate::model::source::{MethodKind, SourceMember, SourceMethod, SourceModel, SourceType};
use crate::model::{
    Accessibility, AnnotatedType, DeferredFlavor, HostMethod, HostType, MemberDescriptor,
    MethodMember, PropertyMember, ReturnKind, Snapshot, TypeRef,
};
use crate::registry::{Marker, MarkerRegistry};

pub(crate) use reserved::is_reserved;

const TASK: &str = "Task";
const VALUE_TASK: &str = "ValueTask";
const VOID: &str = "void";

/// Builds the typed snapshot for one pass.
#[must_use]
pub fn extract(model: &SourceModel, markers: &MarkerRegistry) -> Snapshot {
    let mut snapshot = Snapshot {
        known_symbols: model.known_symbols.clone(),
        language_version: model.language_version,
        ..Snapshot::default()
    };
    for ty in &model.types {
        if markers.is_marked(&ty.attributes, Marker::CreateConfigurableTask) {
            snapshot.annotated_types.push(annotated_type(ty, markers));
        } else {
            snapshot.host_types.push(host_type(ty));
        }
    }
    snapshot
}

fn annotated_type(ty: &SourceType, markers: &MarkerRegistry) -> AnnotatedType {
    let members = ty
        .members
        .iter()
        .filter_map(|member| annotated_member(ty, member, markers))
        .collect();
    AnnotatedType {
        name: ty.name.clone(),
        namespace: ty.namespace.clone(),
        members,
        skip_setters: markers.is_marked(&ty.attributes, Marker::SkipSetterGeneration),
        generic_parameters: ty.generic_parameters.clone(),
        doc: ty.doc.clone(),
    }
}

fn annotated_member(
    owner: &SourceType,
    member: &SourceMember,
    markers: &MarkerRegistry,
) -> Option<MemberDescriptor> {
    match member {
        SourceMember::Property(property) => Some(MemberDescriptor::Property(PropertyMember {
            name: property.name.clone(),
            declared_type: property.ty.clone(),
            has_public_setter: property.setter == Some(Accessibility::Public),
            skip_setter: markers.is_marked(&property.attributes, Marker::SkipSetterGeneration),
            doc: property.doc.clone(),
        })),
        SourceMember::Method(method) => proxy_method(owner, method).map(MemberDescriptor::Method),
        SourceMember::Unresolved { text } => {
            tracing::trace!(owner = %owner.name, candidate = %text, "skipping unresolved member");
            None
        }
    }
}

fn proxy_method(owner: &SourceType, method: &SourceMethod) -> Option<MethodMember> {
    if method.kind != MethodKind::Ordinary {
        return None;
    }
    if is_reserved(&method.name) {
        tracing::trace!(owner = %owner.name, method = %method.name, "skipping reserved member");
        return None;
    }
    let Some(return_kind) = classify_return(&owner.name, method) else {
        tracing::trace!(
            owner = %owner.name,
            method = %method.name,
            "skipping method with unsupported return type"
        );
        return None;
    };
    Some(MethodMember {
        name: method.name.clone(),
        accessibility: method.accessibility,
        parameters: method.parameters.clone(),
        return_kind,
        generic_parameters: method.generic_parameters.clone(),
        doc: method.doc.clone(),
    })
}

/// Classifies a data-type method's return.
///
/// `async void` and deferred results of other types have no queue semantics
/// and yield `None`.
fn classify_return(owner: &str, method: &SourceMethod) -> Option<ReturnKind> {
    let returned = match method.return_type.as_ref() {
        Some(ty) if ty.name != VOID => ty,
        _ if method.is_async => return None,
        _ => return Some(ReturnKind::Void),
    };
    if deferred_flavor(returned).is_none() {
        return Some(ReturnKind::OrdinarySync);
    }
    match returned.type_arguments.as_slice() {
        [] => Some(ReturnKind::AsyncVoidLike),
        [produced] if produced.name == owner => Some(ReturnKind::AsyncOfSelf),
        _ => None,
    }
}

fn deferred_flavor(ty: &TypeRef) -> Option<DeferredFlavor> {
    match ty.name.as_str() {
        TASK => Some(DeferredFlavor::Task),
        VALUE_TASK => Some(DeferredFlavor::ValueTask),
        _ => None,
    }
}

fn host_type(ty: &SourceType) -> HostType {
    HostType {
        name: ty.name.clone(),
        namespace: ty.namespace.clone(),
        accessibility: ty.accessibility,
        extensible: ty.is_partial,
        generic_parameters: ty.generic_parameters.clone(),
        methods: ty.members.iter().filter_map(host_method).collect(),
    }
}

/// Keeps ordinary methods returning a value-producing deferred (`Task<T>`,
/// `ValueTask<T>`). Bare `Task` methods have no result for a wrapper to carry.
fn host_method(member: &SourceMember) -> Option<HostMethod> {
    let SourceMember::Method(method) = member else {
        return None;
    };
    if method.kind != MethodKind::Ordinary {
        return None;
    }
    let returned = method.return_type.as_ref()?;
    let flavor = deferred_flavor(returned)?;
    let result = returned.single_argument()?.clone();
    Some(HostMethod {
        name: method.name.clone(),
        accessibility: method.accessibility,
        parameters: method.parameters.clone(),
        result,
        flavor,
        generic_parameters: method.generic_parameters.clone(),
        doc: method.doc.clone(),
    })
}
