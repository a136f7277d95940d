//! Build-time synthesis of configurable-task wrappers and host overloads.
//!
//! The generator consumes a type-model snapshot of one compilation and
//! produces C# source artifacts:
//!
//! - for every data type carrying `[CreateConfigurableTask]`, a fluent
//!   `<Name>Awaiter<T>` wrapper that queues asynchronous mutators and only
//!   runs them when awaited ([`wrapper`]);
//! - for every `partial`, `public` or `internal` host type, overloads of its
//!   `Task<T>` methods with the data-type parameter removed, returning that
//!   wrapper ([`host`]);
//! - the marker attribute definitions, unless the compilation already has
//!   them ([`registry`]).
//!
//! ```
//! use configurable_task_gen::model::{AnnotatedType, HostMethod, HostType, Parameter, PropertyMember, TypeRef};
//! use configurable_task_gen::{GeneratorConfig, Snapshot, generate};
//!
//! let snapshot = Snapshot {
//!     annotated_types: vec![AnnotatedType::new("SomeArgs", "Demo")
//!         .with_property(PropertyMember::settable("SomeStuff", TypeRef::named("string")))],
//!     host_types: vec![HostType::new("ArgsUser", "Demo").with_method(
//!         HostMethod::new("DoSomething", TypeRef::named("string"))
//!             .with_parameter(Parameter::new("data", TypeRef::named("SomeArgs"))),
//!     )],
//!     ..Snapshot::default()
//! };
//! let output = generate(&snapshot, &GeneratorConfig::default());
//! assert!(output.text("SomeArgs_AwaitableTask").is_some_and(|t| t.contains("WithSomeStuff(string someStuff)")));
//! assert!(output.text("ArgsUser_ConfigurableTaskWrap").is_some());
//! ```
//!
//! The pass never fails. Unsupported members and ineligible host types are
//! skipped; errors only come from loading configuration or decoding input.

pub mod artifact;
pub mod config;
pub mod error;
pub mod extract;
pub mod host;
pub mod model;
pub mod pass;
pub mod registry;
pub mod render;
pub mod wrapper;

pub use artifact::{GeneratedArtifact, GenerationOutput};
pub use config::{GeneratorConfig, LineEnding};
pub use error::{GenerationError, GenerationResult};
pub use model::Snapshot;
pub use model::source::SourceModel;
pub use pass::{generate, generate_from_source};
