//! Generator configuration.
//!
//! Configuration is layered with `figment`: built-in defaults, then an
//! optional TOML file, then `CONFIGURABLE_TASK_*` environment variables.
//! Loading happens before a pass; the pass itself only reads the resolved
//! [`GeneratorConfig`].

use camino::Utf8Path;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use crate::error::GenerationResult;

/// Prefix for environment variables overriding configuration keys.
pub const ENV_PREFIX: &str = "CONFIGURABLE_TASK_";

/// Namespace holding the marker attribute definitions by default.
pub const DEFAULT_MARKER_NAMESPACE: &str = "ConfigurableTask";

/// Line terminator written into generated artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    /// `\n`
    #[default]
    Lf,
    /// `\r\n`
    Crlf,
}

impl LineEnding {
    /// Returns the terminator text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::Crlf => "\r\n",
        }
    }
}

/// Options controlling a generation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Namespace in which marker attributes are defined and matched.
    pub marker_namespace: String,
    /// Line terminator for generated text.
    pub line_ending: LineEnding,
    /// Spaces per indentation level.
    pub indent_width: usize,
    /// Run per-type synthesis on the rayon thread pool.
    pub parallel: bool,
    /// Emit marker attribute definitions when the compilation lacks them.
    pub emit_marker_definitions: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            marker_namespace: DEFAULT_MARKER_NAMESPACE.to_owned(),
            line_ending: LineEnding::Lf,
            indent_width: 4,
            parallel: true,
            emit_marker_definitions: true,
        }
    }
}

impl GeneratorConfig {
    /// Builds the layered figment without extracting it.
    ///
    /// A missing `file` contributes nothing; environment variables win over
    /// file values, which win over defaults.
    #[must_use]
    pub fn figment(file: Option<&Utf8Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads the configuration from defaults, `file` and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`crate::GenerationError::Config`] if a layer cannot be parsed
    /// or a value has the wrong type.
    pub fn load(file: Option<&Utf8Path>) -> GenerationResult<Self> {
        Ok(Self::figment(file).extract()?)
    }
}
