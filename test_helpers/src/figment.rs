//! Isolated configuration environments built on `figment::Jail`.
//!
//! [`ConfigJail`] collects the files and environment variables a test needs,
//! then runs the test body inside a fresh jail. The jail changes into a
//! temporary directory and restores the process environment afterwards, so
//! tests touching `CONFIGURABLE_TASK_*` variables do not leak into each other.

use anyhow::{Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};

/// Files and environment variables to install in a jail.
#[derive(Debug, Default)]
pub struct ConfigJail {
    files: Vec<(Utf8PathBuf, String)>,
    env: Vec<(String, String)>,
}

impl ConfigJail {
    /// An empty jail.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file, relative to the jail directory.
    #[must_use]
    pub fn file(mut self, path: impl Into<Utf8PathBuf>, contents: impl Into<String>) -> Self {
        self.files.push((path.into(), contents.into()));
        self
    }

    /// Adds an environment variable.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Runs `body` inside the jail, passing the jail directory.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be created, the jail directory is
    /// not UTF-8, or `body` fails.
    pub fn run<F, T>(self, body: F) -> Result<T>
    where
        F: FnOnce(&Utf8Path) -> Result<T>,
    {
        let mut output = None;
        figment::Jail::try_with(|jail| {
            for (path, contents) in &self.files {
                jail.create_file(path, contents)?;
            }
            for (key, value) in &self.env {
                jail.set_env(key, value);
            }
            let directory = Utf8Path::from_path(jail.directory())
                .ok_or_else(|| figment::Error::from("jail directory is not UTF-8".to_owned()))?;
            output = Some(body(directory).map_err(|err| figment::Error::from(err.to_string()))?);
            Ok(())
        })
        .map_err(|err| anyhow!(err.to_string()))?;
        output.ok_or_else(|| anyhow!("jail body did not return a value"))
    }
}
