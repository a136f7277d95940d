//! C# fragment helpers: identifiers, parameter lists and generic clauses.

use std::borrow::Cow;

use crate::model::{GenericParameter, Parameter};

/// Reserved words that cannot be used as bare identifiers.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "base", "bool", "break", "byte", "case", "catch", "char", "checked",
    "class", "const", "continue", "decimal", "default", "delegate", "do", "double", "else",
    "enum", "event", "explicit", "extern", "false", "finally", "fixed", "float", "for",
    "foreach", "goto", "if", "implicit", "in", "int", "interface", "internal", "is", "lock",
    "long", "namespace", "new", "null", "object", "operator", "out", "override", "params",
    "private", "protected", "public", "readonly", "ref", "return", "sbyte", "sealed", "short",
    "sizeof", "stackalloc", "static", "string", "struct", "switch", "this", "throw", "true",
    "try", "typeof", "uint", "ulong", "unchecked", "unsafe", "ushort", "using", "virtual",
    "void", "volatile", "while",
];

/// Lowercases the first character only, so `XYZ` becomes `xYZ`.
#[must_use]
pub fn first_char_to_lower(input: &str) -> String {
    let mut chars = input.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Prefixes `@` when `name` is a reserved word.
#[must_use]
pub fn escape_identifier(name: &str) -> Cow<'_, str> {
    if KEYWORDS.contains(&name) {
        Cow::Owned(format!("@{name}"))
    } else {
        Cow::Borrowed(name)
    }
}

/// Renders `Type name, Type name` for a declaration.
#[must_use]
pub fn parameter_list<'a>(parameters: impl IntoIterator<Item = &'a Parameter>) -> String {
    parameters
        .into_iter()
        .map(|param| format!("{} {}", param.ty.display, escape_identifier(&param.name)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parameter names as call arguments, escaped.
#[must_use]
pub fn parameter_names<'a>(
    parameters: impl IntoIterator<Item = &'a Parameter>,
) -> Vec<Cow<'a, str>> {
    parameters
        .into_iter()
        .map(|param| escape_identifier(&param.name))
        .collect()
}

/// Joins call arguments with `, `.
#[must_use]
pub fn argument_list<I, S>(arguments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    arguments
        .into_iter()
        .map(|arg| arg.as_ref().to_owned())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Renders `<T, U>`, or nothing for a non-generic declaration.
#[must_use]
pub fn type_parameter_list(generics: &[GenericParameter]) -> String {
    if generics.is_empty() {
        return String::new();
    }
    let names = generics
        .iter()
        .map(|param| param.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!("<{names}>")
}

/// Renders one `where T : ...` clause per constrained parameter, in order.
#[must_use]
pub fn constraint_clauses(generics: &[GenericParameter]) -> Vec<String> {
    generics
        .iter()
        .filter(|param| !param.constraints.is_empty())
        .map(|param| {
            let constraints = param
                .constraints
                .iter()
                .map(crate::model::GenericConstraint::as_source)
                .collect::<Vec<_>>()
                .join(", ");
            format!("where {} : {constraints}", param.name)
        })
        .collect()
}
