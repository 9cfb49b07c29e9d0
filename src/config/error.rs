use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use super::bind::BindError;
use super::directive::DirectiveError;
use super::format::FormatError;
use super::merge::MergeShapeError;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("required config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("no parser registered for format '{0}'")]
    UnsupportedFormat(String),

    #[error("failed to parse config file '{path}': {source}")]
    ParseError {
        path: PathBuf,
        source: FormatError,
    },

    #[error("malformed directive in '{key}' (value {value:?}): {source}")]
    MalformedDirective {
        key: KeyPath,
        value: String,
        source: DirectiveError,
    },

    #[error("environment variable '{name}' required by '{key}' (value {value:?}) is not set and no default was specified")]
    MissingVariable {
        key: KeyPath,
        value: String,
        name: String,
    },

    #[error(transparent)]
    MergeShape(#[from] MergeShapeError),

    #[error("failed to deserialize config: {0}")]
    DeserializeError(#[from] BindError),
}

/// Location of a value inside a config tree, rendered as `server.hosts[1]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyPath(Vec<KeySegment>);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySegment {
    Key(String),
    Index(usize),
}

impl KeyPath {
    pub fn segments(&self) -> &[KeySegment] {
        &self.0
    }

    pub(crate) fn push(&mut self, segment: KeySegment) {
        self.0.push(segment);
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                KeySegment::Key(key) if i == 0 => f.write_str(key)?,
                KeySegment::Key(key) => write!(f, ".{key}")?,
                KeySegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}
