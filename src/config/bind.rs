//! Deserializing a resolved [`ConfigValue`] tree into typed structs.
//!
//! Scalars are stored as text, so primitive targets are parsed on demand:
//! `"8080"` binds to a `u16`, `"TRUE"` to a `bool`.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::value::{MapAccessDeserializer, MapDeserializer, SeqDeserializer};
use serde::de::{self, DeserializeOwned, IntoDeserializer, Visitor};
use serde::forward_to_deserialize_any;
use thiserror::Error;

use super::value::ConfigValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BindError(String);

impl de::Error for BindError {
    fn custom<T: Display>(msg: T) -> Self {
        BindError(msg.to_string())
    }
}

/// Deserializes `value` into `T`.
pub fn bind<T: DeserializeOwned>(value: ConfigValue) -> Result<T, BindError> {
    T::deserialize(value)
}

fn parse_scalar<T>(value: ConfigValue, expected: &'static str) -> Result<T, BindError>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        ConfigValue::Scalar(s) => s
            .trim()
            .parse()
            .map_err(|e| BindError(format!("invalid {expected} {s:?}: {e}"))),
        other => Err(BindError(format!("expected {expected}, found {}", other.kind()))),
    }
}

macro_rules! deserialize_parsed {
    ($($method:ident => $visit:ident : $ty:ty),* $(,)?) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
                visitor.$visit(parse_scalar::<$ty>(self, stringify!($ty))?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for ConfigValue {
    type Error = BindError;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            ConfigValue::Scalar(s) => visitor.visit_string(s),
            ConfigValue::Null => visitor.visit_unit(),
            ConfigValue::List(items) => {
                let mut seq: SeqDeserializer<_, BindError> = SeqDeserializer::new(items.into_iter());
                let value = visitor.visit_seq(&mut seq)?;
                seq.end()?;
                Ok(value)
            }
            ConfigValue::Map(map) => {
                let mut access: MapDeserializer<'de, _, BindError> = MapDeserializer::new(map.into_iter());
                let value = visitor.visit_map(&mut access)?;
                access.end()?;
                Ok(value)
            }
        }
    }

    deserialize_parsed! {
        deserialize_i8 => visit_i8: i8,
        deserialize_i16 => visit_i16: i16,
        deserialize_i32 => visit_i32: i32,
        deserialize_i64 => visit_i64: i64,
        deserialize_i128 => visit_i128: i128,
        deserialize_u8 => visit_u8: u8,
        deserialize_u16 => visit_u16: u16,
        deserialize_u32 => visit_u32: u32,
        deserialize_u64 => visit_u64: u64,
        deserialize_u128 => visit_u128: u128,
        deserialize_f32 => visit_f32: f32,
        deserialize_f64 => visit_f64: f64,
        deserialize_char => visit_char: char,
    }

    fn deserialize_bool<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match &self {
            ConfigValue::Scalar(s) if s.trim().eq_ignore_ascii_case("true") => visitor.visit_bool(true),
            ConfigValue::Scalar(s) if s.trim().eq_ignore_ascii_case("false") => {
                visitor.visit_bool(false)
            }
            ConfigValue::Scalar(s) => Err(BindError(format!("invalid bool {s:?}"))),
            other => Err(BindError(format!("expected bool, found {}", other.kind()))),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        match self {
            ConfigValue::Null => visitor.visit_none(),
            other => visitor.visit_some(other),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error> {
        match self {
            ConfigValue::Scalar(s) => visitor.visit_enum(s.into_deserializer()),
            ConfigValue::Map(map) if map.len() == 1 => {
                visitor.visit_enum(MapAccessDeserializer::new(MapDeserializer::new(map.into_iter())))
            }
            other => Err(BindError(format!(
                "expected enum variant name or single-key map, found {}",
                other.kind()
            ))),
        }
    }

    fn deserialize_ignored_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value, Self::Error> {
        visitor.visit_unit()
    }

    forward_to_deserialize_any! {
        str string bytes byte_buf unit unit_struct seq tuple tuple_struct map struct identifier
    }
}

impl<'de> IntoDeserializer<'de, BindError> for ConfigValue {
    type Deserializer = Self;

    fn into_deserializer(self) -> Self {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::HashMap;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Database {
        url: String,
        port: u16,
        pool: Option<u32>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Level {
        Debug,
        Info,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct AppConfig {
        name: String,
        debug: bool,
        ratio: f64,
        level: Level,
        handlers: Vec<String>,
        database: Database,
        #[serde(default)]
        labels: HashMap<String, String>,
    }

    fn s(v: &str) -> ConfigValue {
        ConfigValue::from(v)
    }

    #[test]
    fn test_bind_struct_parses_scalars() {
        let tree: ConfigValue = [
            ("name", s("app")),
            ("debug", s("True")),
            ("ratio", s("0.25")),
            ("level", s("info")),
            ("handlers", ConfigValue::List(vec![s("console"), s("file")])),
            (
                "database",
                [("url", s("postgres://db")), ("port", s("5432")), ("pool", ConfigValue::Null)]
                    .into_iter()
                    .collect(),
            ),
        ]
        .into_iter()
        .collect();

        let config: AppConfig = bind(tree).unwrap();
        assert_eq!(
            config,
            AppConfig {
                name: "app".into(),
                debug: true,
                ratio: 0.25,
                level: Level::Info,
                handlers: vec!["console".into(), "file".into()],
                database: Database {
                    url: "postgres://db".into(),
                    port: 5432,
                    pool: None,
                },
                labels: HashMap::new(),
            }
        );
    }

    #[test]
    fn test_bind_string_keeps_leading_zeros() {
        #[derive(Deserialize)]
        struct Code {
            code: String,
        }
        let tree: ConfigValue = [("code", "007")].into_iter().collect();
        assert_eq!(bind::<Code>(tree).unwrap().code, "007");
    }

    #[test]
    fn test_bind_invalid_number() {
        let tree: ConfigValue = [("url", "x"), ("port", "http")].into_iter().collect();
        let err = bind::<Database>(tree).unwrap_err();
        assert!(err.to_string().contains("invalid u16"), "{err}");
    }

    #[test]
    fn test_bind_missing_field() {
        let tree: ConfigValue = [("url", "x")].into_iter().collect();
        let err = bind::<Database>(tree).unwrap_err();
        assert!(err.to_string().contains("port"), "{err}");
    }

    #[test]
    fn test_bind_enum_from_single_key_map() {
        #[derive(Debug, Deserialize, PartialEq)]
        enum Store {
            File { path: String },
        }
        let tree: ConfigValue = [("File", [("path", "/tmp/x")].into_iter().collect::<ConfigValue>())]
            .into_iter()
            .collect();
        assert_eq!(
            bind::<Store>(tree).unwrap(),
            Store::File {
                path: "/tmp/x".into()
            }
        );
    }
}
