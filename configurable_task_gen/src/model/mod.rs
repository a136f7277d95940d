//! Typed type-model snapshot consumed by the synthesizers.
//!
//! A [`Snapshot`] is a read-only view over one build pass. Marker attributes,
//! reserved names and return kinds have already been resolved (see
//! [`crate::extract`]), so the synthesizers never inspect attribute text or
//! query a live type system.
//!
//! The constructors on these types double as a small builder API so front-ends
//! and tests can assemble snapshots without spelling out every field.

pub mod source;

use serde::{Deserialize, Serialize};

use crate::error::GenerationResult;

/// Declared accessibility of a type or member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// `public`
    #[default]
    Public,
    /// `internal`
    Internal,
    /// `protected internal`
    ProtectedInternal,
    /// `protected`
    Protected,
    /// `private protected`
    PrivateProtected,
    /// `private`
    Private,
}

impl Accessibility {
    /// Returns the C# modifier text.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::ProtectedInternal => "protected internal",
            Self::Protected => "protected",
            Self::PrivateProtected => "private protected",
            Self::Private => "private",
        }
    }

    /// Whether a sibling type in the same assembly can call the member.
    ///
    /// Wrapper types live next to the annotated type, so only members passing
    /// this check can be proxied.
    #[must_use]
    pub const fn is_visible_to_siblings(self) -> bool {
        matches!(self, Self::Public | Self::Internal | Self::ProtectedInternal)
    }

    /// Whether a host type with this accessibility may receive overloads.
    #[must_use]
    pub const fn admits_host_overloads(self) -> bool {
        matches!(self, Self::Public | Self::Internal)
    }
}

/// Reference to a type as it appears in a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Text used when the type is written into generated source.
    pub display: String,
    /// Simple (unqualified, non-generic) name used for matching.
    pub name: String,
    /// Type arguments, in order, for constructed generic types.
    #[serde(default)]
    pub type_arguments: Vec<TypeRef>,
}

impl TypeRef {
    /// A non-generic type whose display text equals its name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let simple: String = name.into();
        Self {
            display: simple.clone(),
            name: simple,
            type_arguments: Vec::new(),
        }
    }

    /// A non-generic type written with a qualified display name.
    #[must_use]
    pub fn qualified(namespace: &str, name: impl Into<String>) -> Self {
        let simple: String = name.into();
        Self {
            display: qualify(namespace, &simple),
            name: simple,
            type_arguments: Vec::new(),
        }
    }

    /// A constructed generic type such as `Task<string>`.
    #[must_use]
    pub fn generic(name: impl Into<String>, type_arguments: Vec<Self>) -> Self {
        let simple: String = name.into();
        let args = type_arguments
            .iter()
            .map(|arg| arg.display.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            display: format!("{simple}<{args}>"),
            name: simple,
            type_arguments,
        }
    }

    /// Returns the single type argument of a one-parameter generic.
    #[must_use]
    pub fn single_argument(&self) -> Option<&Self> {
        match self.type_arguments.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }
}

/// A named, typed parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name as declared.
    pub name: String,
    /// Declared parameter type.
    pub ty: TypeRef,
}

impl Parameter {
    /// Creates a parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// One constraint on a generic type parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericConstraint {
    /// `class`
    ReferenceType,
    /// `struct`
    ValueType,
    /// A base class or interface constraint, written as given.
    Type(String),
    /// `new()`
    Constructor,
}

impl GenericConstraint {
    /// Returns the constraint text as it appears after `where T :`.
    #[must_use]
    pub fn as_source(&self) -> &str {
        match self {
            Self::ReferenceType => "class",
            Self::ValueType => "struct",
            Self::Type(name) => name,
            Self::Constructor => "new()",
        }
    }
}

/// A generic type parameter with its pre-resolved constraint list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericParameter {
    /// Parameter name, for example `TEntity`.
    pub name: String,
    /// Constraints in source order.
    #[serde(default)]
    pub constraints: Vec<GenericConstraint>,
}

impl GenericParameter {
    /// An unconstrained type parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraints: Vec::new(),
        }
    }

    /// Appends a constraint.
    #[must_use]
    pub fn with_constraint(mut self, constraint: GenericConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }
}

/// How a data-type method completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnKind {
    /// Returns nothing.
    Void,
    /// Returns synchronously with any non-deferred value.
    OrdinarySync,
    /// Asynchronously produces an instance of the owning type.
    AsyncOfSelf,
    /// Asynchronously completes without a meaningful payload.
    AsyncVoidLike,
}

impl ReturnKind {
    /// Whether calls must be queued rather than run immediately.
    #[must_use]
    pub const fn is_deferred(self) -> bool {
        matches!(self, Self::AsyncOfSelf | Self::AsyncVoidLike)
    }
}

/// A property of an annotated type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMember {
    /// Property name.
    pub name: String,
    /// Declared property type.
    pub declared_type: TypeRef,
    /// Whether the setter exists and is public.
    pub has_public_setter: bool,
    /// Property-level opt-out of setter wrappers.
    #[serde(default)]
    pub skip_setter: bool,
    /// Documentation text, copied onto the setter wrapper.
    #[serde(default)]
    pub doc: Option<String>,
}

impl PropertyMember {
    /// A property with a public getter and setter.
    #[must_use]
    pub fn settable(name: impl Into<String>, declared_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            declared_type,
            has_public_setter: true,
            skip_setter: false,
            doc: None,
        }
    }
}

/// A method of an annotated type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodMember {
    /// Method name.
    pub name: String,
    /// Declared accessibility.
    pub accessibility: Accessibility,
    /// Parameters in declaration order.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Completion behaviour.
    pub return_kind: ReturnKind,
    /// Method-level generic parameters.
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    /// Documentation text.
    #[serde(default)]
    pub doc: Option<String>,
}

impl MethodMember {
    /// A public, non-generic method.
    #[must_use]
    pub fn new(name: impl Into<String>, return_kind: ReturnKind) -> Self {
        Self {
            name: name.into(),
            accessibility: Accessibility::Public,
            parameters: Vec::new(),
            return_kind,
            generic_parameters: Vec::new(),
            doc: None,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// A member of an annotated type eligible for proxying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum MemberDescriptor {
    /// A property.
    Property(PropertyMember),
    /// An ordinary method.
    Method(MethodMember),
}

/// A data type opted into wrapper generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedType {
    /// Simple type name.
    pub name: String,
    /// Containing namespace; empty for the global namespace.
    #[serde(default)]
    pub namespace: String,
    /// Members in declaration order.
    #[serde(default)]
    pub members: Vec<MemberDescriptor>,
    /// Type-level opt-out of setter wrappers.
    #[serde(default)]
    pub skip_setters: bool,
    /// Type-level generic parameters.
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    /// Documentation text.
    #[serde(default)]
    pub doc: Option<String>,
}

impl AnnotatedType {
    /// An annotated type with no members.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            members: Vec::new(),
            skip_setters: false,
            generic_parameters: Vec::new(),
            doc: None,
        }
    }

    /// Returns the namespace-qualified name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    /// Appends a property.
    #[must_use]
    pub fn with_property(mut self, property: PropertyMember) -> Self {
        self.members.push(MemberDescriptor::Property(property));
        self
    }

    /// Appends a method.
    #[must_use]
    pub fn with_method(mut self, method: MethodMember) -> Self {
        self.members.push(MemberDescriptor::Method(method));
        self
    }

    /// Iterates over the methods in declaration order.
    pub fn methods(&self) -> impl Iterator<Item = &MethodMember> {
        self.members.iter().filter_map(|member| match member {
            MemberDescriptor::Method(method) => Some(method),
            MemberDescriptor::Property(_) => None,
        })
    }

    /// Iterates over the properties in declaration order.
    pub fn properties(&self) -> impl Iterator<Item = &PropertyMember> {
        self.members.iter().filter_map(|member| match member {
            MemberDescriptor::Property(property) => Some(property),
            MemberDescriptor::Method(_) => None,
        })
    }
}

/// The deferred type a host method returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeferredFlavor {
    /// `Task<T>`
    #[default]
    Task,
    /// `ValueTask<T>`; converted with `AsTask()` when handed to a wrapper.
    ValueTask,
}

/// A host method returning a value-producing deferred result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostMethod {
    /// Method name.
    pub name: String,
    /// Declared accessibility of the original method.
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Parameters in declaration order.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// The `T` of the method's `Deferred<T>` return type.
    pub result: TypeRef,
    /// Which deferred type wraps the result.
    #[serde(default)]
    pub flavor: DeferredFlavor,
    /// Method-level generic parameters.
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    /// Documentation text.
    #[serde(default)]
    pub doc: Option<String>,
}

impl HostMethod {
    /// A public method returning `Task<result>`.
    #[must_use]
    pub fn new(name: impl Into<String>, result: TypeRef) -> Self {
        Self {
            name: name.into(),
            accessibility: Accessibility::Public,
            parameters: Vec::new(),
            result,
            flavor: DeferredFlavor::Task,
            generic_parameters: Vec::new(),
            doc: None,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }
}

/// A type whose methods are candidates for overload synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostType {
    /// Simple type name.
    pub name: String,
    /// Containing namespace; empty for the global namespace.
    #[serde(default)]
    pub namespace: String,
    /// Declared accessibility.
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Whether the type is open for augmentation (`partial`).
    pub extensible: bool,
    /// Type-level generic parameters.
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    /// Candidate methods in declaration order.
    #[serde(default)]
    pub methods: Vec<HostMethod>,
}

impl HostType {
    /// A public, extensible host type with no methods.
    #[must_use]
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            accessibility: Accessibility::Public,
            extensible: true,
            generic_parameters: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Returns the namespace-qualified name.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        qualify(&self.namespace, &self.name)
    }

    /// Appends a method.
    #[must_use]
    pub fn with_method(mut self, method: HostMethod) -> Self {
        self.methods.push(method);
        self
    }
}

/// Everything one generation pass consumes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Annotated types in snapshot order.
    #[serde(default)]
    pub annotated_types: Vec<AnnotatedType>,
    /// Host types in snapshot order.
    #[serde(default)]
    pub host_types: Vec<HostType>,
    /// Fully qualified names of types already defined in the compilation.
    #[serde(default)]
    pub known_symbols: Vec<String>,
    /// Target language version, when the front-end reports one.
    #[serde(default)]
    pub language_version: Option<u16>,
}

impl Snapshot {
    /// Decodes a snapshot from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenerationError::Snapshot`] when the payload is not a
    /// valid snapshot.
    pub fn from_json(payload: &str) -> GenerationResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Finds the annotated type `ty` refers to, as seen from `namespace`.
    ///
    /// Same-named candidates are ranked by the qualified name written in
    /// `ty`, then by `namespace`, then by lowest qualified name.
    #[must_use]
    pub fn annotated_for(&self, ty: &TypeRef, namespace: &str) -> Option<&AnnotatedType> {
        find_annotated(&self.annotated_types, ty, namespace)
    }
}

/// Resolves `ty`, written inside `namespace`, to an annotated type.
///
/// Candidates must match the simple name and the generic arity. Among them a
/// candidate whose qualified name is spelled out in `ty` wins, then one
/// declared in `namespace`, then the lowest qualified name, so the choice
/// never depends on snapshot order.
pub(crate) fn find_annotated<'a>(
    annotated: &'a [AnnotatedType],
    ty: &TypeRef,
    namespace: &str,
) -> Option<&'a AnnotatedType> {
    let written = written_name(ty);
    annotated
        .iter()
        .filter(|candidate| {
            candidate.name == ty.name
                && candidate.generic_parameters.len() == ty.type_arguments.len()
        })
        .min_by_key(|candidate| {
            let qualified = candidate.qualified_name();
            (
                qualified != written,
                candidate.namespace != namespace,
                qualified,
            )
        })
}

/// `ty` as written, without `global::` or type arguments.
fn written_name(ty: &TypeRef) -> &str {
    let unrooted = ty.display.strip_prefix("global::").unwrap_or(&ty.display);
    unrooted
        .split_once('<')
        .map_or(unrooted, |(name, _)| name)
        .trim()
}

pub(crate) fn qualify(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_owned()
    } else {
        format!("{namespace}.{name}")
    }
}
