//! Error types for the generator.
//!
//! The generation pass itself cannot fail: unsupported members and ineligible
//! host types are skipped. Errors only arise at the edges, when loading the
//! generator configuration or decoding a snapshot handed over as JSON.

use thiserror::Error;

/// Errors surfaced outside the generation pass.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationError {
    /// Configuration layers could not be merged or extracted.
    #[error("failed to load generator configuration: {0}")]
    Config(Box<figment::Error>),

    /// A snapshot or source model payload could not be decoded.
    #[error("failed to decode type-model snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl From<figment::Error> for GenerationError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl From<GenerationError> for figment::Error {
    /// Lets tests running inside a `figment::Jail` use `?` on generator results.
    fn from(err: GenerationError) -> Self {
        match err {
            GenerationError::Config(inner) => *inner,
            other @ GenerationError::Snapshot(_) => Self::from(other.to_string()),
        }
    }
}

/// Convenience alias for results carrying a [`GenerationError`].
pub type GenerationResult<T> = Result<T, GenerationError>;
