//! The generic configuration tree.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Ordered map type used by [`ConfigValue::Map`]. Keys keep document order.
pub type Map = IndexMap<String, ConfigValue>;

/// A node in a configuration tree.
///
/// Every document format is reduced to this shape before merging and
/// interpolation. Non-string scalars (numbers, booleans, datetimes) are kept
/// in their textual form; typed interpretation happens when the tree is
/// deserialized into a target type.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigValue {
    Scalar(String),
    List(Vec<ConfigValue>),
    Map(Map),
    #[default]
    Null,
}

impl ConfigValue {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Scalar(_) => "scalar",
            ConfigValue::List(_) => "list",
            ConfigValue::Map(_) => "map",
            ConfigValue::Null => "null",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[ConfigValue]> {
        match self {
            ConfigValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Looks up a dotted path such as `database.host`.
    ///
    /// Only map keys are traversed; list elements are not addressable.
    pub fn get(&self, path: &str) -> Option<&ConfigValue> {
        path.split('.').try_fold(self, |current, part| match current {
            ConfigValue::Map(map) => map.get(part),
            _ => None,
        })
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::Scalar(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::Scalar(s)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(items: Vec<ConfigValue>) -> Self {
        ConfigValue::List(items)
    }
}

impl From<Map> for ConfigValue {
    fn from(map: Map) -> Self {
        ConfigValue::Map(map)
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ConfigValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        ConfigValue::Map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ConfigValue::Scalar(s) => serializer.serialize_str(s),
            ConfigValue::Null => serializer.serialize_unit(),
            ConfigValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            ConfigValue::Map(map) => {
                let mut out = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    out.serialize_entry(key, value)?;
                }
                out.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_nested_path() {
        let inner: ConfigValue = [("host", "localhost")].into_iter().collect();
        let root: ConfigValue = [("database", inner)].into_iter().collect();

        assert_eq!(
            root.get("database.host").and_then(ConfigValue::as_str),
            Some("localhost")
        );
        assert!(root.get("database.port").is_none());
        assert!(root.get("database.host.deeper").is_none());
    }

    #[test]
    fn test_map_preserves_insertion_order() {
        let root: ConfigValue = [("b", "1"), ("a", "2"), ("c", "3")].into_iter().collect();
        let keys: Vec<&str> = root.as_map().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a", "c"]);
    }

    #[test]
    fn test_serialize_to_json() {
        let root: ConfigValue = [
            ("name", ConfigValue::from("app")),
            ("tags", ConfigValue::List(vec!["a".into(), "b".into()])),
            ("extra", ConfigValue::Null),
        ]
        .into_iter()
        .collect();

        let json = serde_json::to_string(&root).unwrap();
        assert_eq!(json, r#"{"name":"app","tags":["a","b"],"extra":null}"#);
    }
}
