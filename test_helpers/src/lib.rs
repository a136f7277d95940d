//! Test helpers shared across the workspace.
//!
//! - [`text`] inspects generated source text.
//! - [`figment`] runs configuration tests inside an isolated `figment::Jail`.

pub mod figment;
pub mod text;
