//! Reading config documents and their environment overlays from disk.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::format::Format;
use super::value::ConfigValue;
use super::ConfigError;

/// A config document on disk.
///
/// Required files that don't exist cause an error; optional files that
/// don't exist are silently skipped.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    required: bool,
}

impl FileSource {
    /// Creates a new file source.
    ///
    /// If `required` is true, loading fails if the file doesn't exist.
    pub fn new(path: impl AsRef<Path>, required: bool) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            required,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The optional sibling source for environment `env`
    /// (`config.yaml` → `config.prod.yaml`).
    pub fn overlay(&self, env: &str) -> Self {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        Self::new(self.path.with_file_name(env_file_name(&name, env)), false)
    }

    /// Reads and parses the file using `format`.
    ///
    /// Returns `Ok(None)` if the file doesn't exist and is not required.
    pub fn load(&self, format: Format) -> Result<Option<ConfigValue>, ConfigError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return if self.required {
                    Err(ConfigError::FileNotFound(self.path.clone()))
                } else {
                    Ok(None)
                };
            }
            Err(e) => {
                return Err(ConfigError::ReadError {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        debug!(path = %self.path.display(), %format, "parsing config file");
        let value = format.parse(&contents).map_err(|e| ConfigError::ParseError {
            path: self.path.clone(),
            source: e,
        })?;
        Ok(Some(value))
    }

    /// Format implied by the file extension.
    pub fn format(&self) -> Result<Format, ConfigError> {
        Format::from_path(&self.path).ok_or_else(|| {
            ConfigError::UnsupportedFormat(
                self.path
                    .extension()
                    .map(|ext| ext.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            )
        })
    }
}

/// Name of the overlay file for `env` next to a file called `file_name`.
///
/// The environment is inserted after the part of the name before the first
/// dot: `bar.yml` → `bar.prod.yml`, `bar.baz.yml` → `bar.prod.baz.yml`.
/// Names without a dot, or starting with one, get the environment appended:
/// `.baz` → `.baz.prod`.
pub fn env_file_name(file_name: &str, env: &str) -> String {
    match file_name.find('.') {
        Some(dot) if dot > 0 => {
            let (stem, rest) = file_name.split_at(dot);
            format!("{stem}.{env}{rest}")
        }
        _ => format!("{file_name}.{env}"),
    }
}
