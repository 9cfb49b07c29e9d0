//! String interpolation and the tree walker that applies it to every leaf.

use thiserror::Error;

use super::directive::{tokenize, DirectiveError, Segment};
use super::env::EnvLookup;
use super::error::{ConfigError, KeyPath, KeySegment};
use super::resolve::{resolve, resolve_embedded, MissingVariable};
use super::value::{ConfigValue, Map};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterpolateError {
    #[error(transparent)]
    Malformed(#[from] DirectiveError),

    #[error(transparent)]
    Missing(#[from] MissingVariable),
}

/// Substitutes every directive in `source`.
///
/// A directive that is the whole string yields the resolver's value as-is,
/// which is the only way to get a list or null out of a string. Anything
/// else is concatenated into a scalar. The string is fully tokenized before
/// the first lookup, so grammar errors never trigger environment reads.
pub fn interpolate(source: &str, lookup: &dyn EnvLookup) -> Result<ConfigValue, InterpolateError> {
    let segments = tokenize(source).collect::<Result<Vec<_>, _>>()?;

    if let [Segment::Directive { directive, .. }] = segments.as_slice() {
        if directive.whole_string {
            return Ok(resolve(directive, lookup)?);
        }
    }

    let mut out = String::with_capacity(source.len());
    for segment in &segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Directive { directive, .. } => {
                out.push_str(&resolve_embedded(directive, lookup)?);
            }
        }
    }
    Ok(ConfigValue::Scalar(out))
}

/// Resolves every string leaf of `tree`, returning a new tree.
///
/// Directives cannot reference each other, so visiting order does not
/// matter. The first failure aborts the walk and reports the key path of
/// the offending leaf.
pub fn resolve_tree(tree: ConfigValue, lookup: &dyn EnvLookup) -> Result<ConfigValue, ConfigError> {
    let mut path = KeyPath::default();
    walk(tree, lookup, &mut path)
}

fn walk(value: ConfigValue, lookup: &dyn EnvLookup, path: &mut KeyPath) -> Result<ConfigValue, ConfigError> {
    match value {
        ConfigValue::Scalar(s) => match interpolate(&s, lookup) {
            Ok(resolved) => Ok(resolved),
            Err(InterpolateError::Malformed(source)) => Err(ConfigError::MalformedDirective {
                key: path.clone(),
                value: s,
                source,
            }),
            Err(InterpolateError::Missing(MissingVariable(name))) => Err(ConfigError::MissingVariable {
                key: path.clone(),
                value: s,
                name,
            }),
        },
        ConfigValue::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                path.push(KeySegment::Index(i));
                let resolved = walk(item, lookup, path);
                path.pop();
                resolved
            })
            .collect::<Result<Vec<_>, _>>()
            .map(ConfigValue::List),
        ConfigValue::Map(map) => map
            .into_iter()
            .map(|(key, item)| {
                path.push(KeySegment::Key(key.clone()));
                let resolved = walk(item, lookup, path);
                path.pop();
                resolved.map(|v| (key, v))
            })
            .collect::<Result<Map, _>>()
            .map(ConfigValue::Map),
        ConfigValue::Null => Ok(ConfigValue::Null),
    }
}
