//! Raw declarations as reported by the source front-end.
//!
//! These mirror what a syntax/semantic front-end can see without any knowledge
//! of this generator: attribute text, method kinds, declared return types.
//! [`crate::extract`] turns a [`SourceModel`] into a typed
//! [`Snapshot`](super::Snapshot).

use serde::{Deserialize, Serialize};

use super::{Accessibility, GenericParameter, Parameter, TypeRef};
use crate::error::GenerationResult;

/// Kind of a method symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MethodKind {
    /// A plain named method.
    #[default]
    Ordinary,
    /// An instance or static constructor.
    Constructor,
    /// A finalizer.
    Destructor,
    /// A user-defined operator.
    Operator,
    /// A user-defined conversion.
    Conversion,
    /// A property getter or setter.
    PropertyAccessor,
    /// An event adder or remover.
    EventAccessor,
}

/// A property declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProperty {
    /// Property name.
    pub name: String,
    /// Declared type.
    pub ty: TypeRef,
    /// Accessibility of the setter, `None` when there is no setter.
    #[serde(default)]
    pub setter: Option<Accessibility>,
    /// Attribute names as written.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Documentation text.
    #[serde(default)]
    pub doc: Option<String>,
}

/// A method declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMethod {
    /// Method name.
    pub name: String,
    /// Method kind.
    #[serde(default)]
    pub kind: MethodKind,
    /// Declared accessibility.
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Whether the method carries the `async` modifier.
    #[serde(default)]
    pub is_async: bool,
    /// Parameters in declaration order.
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Declared return type; `None` for `void`.
    #[serde(default)]
    pub return_type: Option<TypeRef>,
    /// Method-level generic parameters.
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    /// Documentation text.
    #[serde(default)]
    pub doc: Option<String>,
}

/// A member as the front-end saw it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "member", rename_all = "snake_case")]
pub enum SourceMember {
    /// A property.
    Property(SourceProperty),
    /// A method of any kind.
    Method(SourceMethod),
    /// A syntactic candidate the front-end could not resolve.
    Unresolved {
        /// Source text of the candidate, kept for tracing.
        text: String,
    },
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceType {
    /// Simple type name.
    pub name: String,
    /// Containing namespace; empty for the global namespace.
    #[serde(default)]
    pub namespace: String,
    /// Declared accessibility.
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Whether the declaration carries the `partial` modifier.
    #[serde(default)]
    pub is_partial: bool,
    /// Attribute names as written on the type.
    #[serde(default)]
    pub attributes: Vec<String>,
    /// Type-level generic parameters.
    #[serde(default)]
    pub generic_parameters: Vec<GenericParameter>,
    /// Members in declaration order.
    #[serde(default)]
    pub members: Vec<SourceMember>,
    /// Documentation text.
    #[serde(default)]
    pub doc: Option<String>,
}

/// The whole front-end model for one compilation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceModel {
    /// Class declarations in source order.
    #[serde(default)]
    pub types: Vec<SourceType>,
    /// Fully qualified names of types already defined in the compilation.
    #[serde(default)]
    pub known_symbols: Vec<String>,
    /// Target language version, when known.
    #[serde(default)]
    pub language_version: Option<u16>,
}

impl SourceModel {
    /// Decodes a source model from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenerationError::Snapshot`] when the payload is not a
    /// valid source model.
    pub fn from_json(payload: &str) -> GenerationResult<Self> {
        Ok(serde_json::from_str(payload)?)
    }
}
