//! Deep merge of a base tree with an environment overlay.
//!
//! Nested maps are merged recursively; any other value (including lists) in
//! the overlay replaces the base value entirely. Merging happens on raw
//! trees, before any directive is resolved.

use thiserror::Error;

use super::value::{ConfigValue, Map};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot merge overlay: expected map roots, base is a {base} and overlay is a {overlay}")]
pub struct MergeShapeError {
    pub base: &'static str,
    pub overlay: &'static str,
}

/// Merges `overlay` on top of `base`. Both roots must be maps.
pub fn merge(base: ConfigValue, overlay: ConfigValue) -> Result<ConfigValue, MergeShapeError> {
    match (base, overlay) {
        (ConfigValue::Map(base), ConfigValue::Map(overlay)) => {
            Ok(ConfigValue::Map(deep_merge(base, overlay)))
        }
        (base, overlay) => Err(MergeShapeError {
            base: base.kind(),
            overlay: overlay.kind(),
        }),
    }
}

fn deep_merge(mut base: Map, overlay: Map) -> Map {
    for (key, value) in overlay {
        let merged = match (base.get_mut(&key), value) {
            (Some(ConfigValue::Map(base_map)), ConfigValue::Map(overlay_map)) => {
                ConfigValue::Map(deep_merge(std::mem::take(base_map), overlay_map))
            }
            (_, value) => value,
        };
        base.insert(key, merged);
    }
    base
}
