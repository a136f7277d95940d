//! Registries shared across one generation pass.
//!
//! - [`NamingRegistry`] drops duplicate member signatures per artifact.
//! - [`MarkerRegistry`] resolves marker attributes and schedules their
//!   definitions exactly once.

mod markers;
mod naming;

pub use markers::{Marker, MarkerRegistry};
pub use naming::NamingRegistry;
