//! Document formats that can be read into a [`ConfigValue`] tree.

use std::fmt;
use std::path::Path;

use thiserror::Error;

use super::value::{ConfigValue, Map};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Toml,
    Json,
    Yaml,
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FormatError {
    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("unsupported mapping key: only scalar keys are allowed")]
    NonScalarKey,

    /// Failure reported by a caller-supplied [`Parser`].
    #[error(transparent)]
    Custom(Box<dyn std::error::Error + Send + Sync>),
}

impl FormatError {
    pub fn custom(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        FormatError::Custom(err.into())
    }
}

/// Turns raw document text into a [`ConfigValue`] tree.
///
/// [`Format`] covers TOML, JSON and YAML. Implement this for any other
/// document syntax and hand it to
/// [`Config::with_parser`](crate::Config::with_parser).
pub trait Parser {
    fn parse(&self, raw: &str) -> Result<ConfigValue, FormatError>;
}

impl<F> Parser for F
where
    F: Fn(&str) -> Result<ConfigValue, FormatError>,
{
    fn parse(&self, raw: &str) -> Result<ConfigValue, FormatError> {
        self(raw)
    }
}

impl Format {
    /// Maps a file extension (without the dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "toml" => Some(Format::Toml),
            "json" => Some(Format::Json),
            "yaml" | "yml" => Some(Format::Yaml),
            _ => None,
        }
    }

    /// Picks the format from the last extension of `path`.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn parse(&self, raw: &str) -> Result<ConfigValue, FormatError> {
        match self {
            Format::Toml => {
                let table: toml::Table = toml::from_str(raw)?;
                Ok(toml::Value::Table(table).into())
            }
            Format::Json => Ok(serde_json::from_str::<serde_json::Value>(raw)?.into()),
            Format::Yaml => {
                let mut value: serde_yaml::Value = serde_yaml::from_str(raw)?;
                // Expand `<<: *anchor` merge keys
                value.apply_merge()?;
                from_yaml(value)
            }
        }
    }
}

impl Parser for Format {
    fn parse(&self, raw: &str) -> Result<ConfigValue, FormatError> {
        Format::parse(self, raw)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Toml => write!(f, "toml"),
            Format::Json => write!(f, "json"),
            Format::Yaml => write!(f, "yaml"),
        }
    }
}

impl From<toml::Value> for ConfigValue {
    fn from(value: toml::Value) -> Self {
        match value {
            toml::Value::String(s) => ConfigValue::Scalar(s),
            toml::Value::Integer(i) => ConfigValue::Scalar(i.to_string()),
            toml::Value::Float(f) => ConfigValue::Scalar(float_text(f)),
            toml::Value::Boolean(b) => ConfigValue::Scalar(b.to_string()),
            toml::Value::Datetime(dt) => ConfigValue::Scalar(dt.to_string()),
            toml::Value::Array(arr) => ConfigValue::List(arr.into_iter().map(Into::into).collect()),
            toml::Value::Table(table) => {
                ConfigValue::Map(table.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => ConfigValue::Null,
            Value::Bool(b) => ConfigValue::Scalar(b.to_string()),
            Value::Number(n) => ConfigValue::Scalar(n.to_string()),
            Value::String(s) => ConfigValue::Scalar(s),
            Value::Array(arr) => ConfigValue::List(arr.into_iter().map(Into::into).collect()),
            Value::Object(obj) => {
                ConfigValue::Map(obj.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// `1.0` stays `"1.0"`, as JSON and YAML render it.
fn float_text(f: f64) -> String {
    if f.fract() == 0.0 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn from_yaml(value: serde_yaml::Value) -> Result<ConfigValue, FormatError> {
    use serde_yaml::Value;
    Ok(match value {
        Value::Null => ConfigValue::Null,
        Value::Bool(b) => ConfigValue::Scalar(b.to_string()),
        Value::Number(n) => ConfigValue::Scalar(n.to_string()),
        Value::String(s) => ConfigValue::Scalar(s),
        Value::Sequence(seq) => {
            ConfigValue::List(seq.into_iter().map(from_yaml).collect::<Result<_, _>>()?)
        }
        Value::Mapping(mapping) => {
            let mut map = Map::with_capacity(mapping.len());
            for (k, v) in mapping {
                map.insert(yaml_key(k)?, from_yaml(v)?);
            }
            ConfigValue::Map(map)
        }
        Value::Tagged(tagged) => from_yaml(tagged.value)?,
    })
}

fn yaml_key(key: serde_yaml::Value) -> Result<String, FormatError> {
    use serde_yaml::Value;
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Tagged(tagged) => yaml_key(tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => Err(FormatError::NonScalarKey),
    }
}
