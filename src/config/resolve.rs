//! Resolution of a single parsed directive against an environment lookup.

use thiserror::Error;
use tracing::trace;

use super::directive::Directive;
use super::env::EnvLookup;
use super::value::ConfigValue;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("environment variable '{0}' is not set and no default was specified")]
pub struct MissingVariable(pub String);

/// Resolves `directive` to a scalar, a list (when a delimiter is set) or
/// null (when the none-flag applies).
///
/// The lookup is queried exactly once per call.
pub fn resolve(directive: &Directive, lookup: &dyn EnvLookup) -> Result<ConfigValue, MissingVariable> {
    let Some(raw) = raw_value(directive, lookup)? else {
        return Ok(ConfigValue::Null);
    };

    Ok(match &directive.delimiter {
        Some(delim) => ConfigValue::List(
            raw.split(delim.as_str())
                .map(|part| ConfigValue::Scalar(finish(directive, part)))
                .collect(),
        ),
        None => ConfigValue::Scalar(finish(directive, &raw)),
    })
}

/// Resolves a directive embedded in surrounding text to its string form.
///
/// Embedded directives never carry a delimiter or the none-flag (the
/// tokenizer rejects those), so only the default and strip apply.
pub fn resolve_embedded(directive: &Directive, lookup: &dyn EnvLookup) -> Result<String, MissingVariable> {
    match raw_value(directive, lookup)? {
        Some(raw) => Ok(finish(directive, &raw)),
        None => Err(MissingVariable(directive.name.clone())),
    }
}

/// `Ok(None)` means the none-flag applies.
fn raw_value(directive: &Directive, lookup: &dyn EnvLookup) -> Result<Option<String>, MissingVariable> {
    if let Some(value) = lookup.get(&directive.name) {
        trace!(name = %directive.name, source = "environment", "resolved directive");
        return Ok(Some(value));
    }
    if let Some(default) = &directive.default {
        trace!(name = %directive.name, source = "default", "resolved directive");
        return Ok(Some(default.clone()));
    }
    if directive.none_flag {
        trace!(name = %directive.name, source = "none-flag", "resolved directive");
        return Ok(None);
    }
    Err(MissingVariable(directive.name.clone()))
}

fn finish(directive: &Directive, s: &str) -> String {
    if directive.strip {
        s.trim().to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn directive(name: &str) -> Directive {
        Directive {
            name: name.to_string(),
            whole_string: true,
            ..Directive::default()
        }
    }

    fn list(items: &[&str]) -> ConfigValue {
        ConfigValue::List(items.iter().map(|s| ConfigValue::from(*s)).collect())
    }

    #[test]
    fn test_present_value_is_returned_verbatim() {
        let env = vars(&[("FOO", "  bar  ")]);
        let d = Directive {
            default: Some("ignored".into()),
            ..directive("FOO")
        };
        assert_eq!(resolve(&d, &env).unwrap(), ConfigValue::from("  bar  "));
    }

    #[test]
    fn test_default_used_when_unset() {
        let d = Directive {
            default: Some(String::new()),
            ..directive("FOO")
        };
        assert_eq!(resolve(&d, &vars(&[])).unwrap(), ConfigValue::from(""));
    }

    #[test]
    fn test_missing_without_default_fails() {
        let err = resolve(&directive("FOO"), &vars(&[])).unwrap_err();
        assert_eq!(err, MissingVariable("FOO".into()));
    }

    #[test]
    fn test_none_flag() {
        let d = Directive {
            none_flag: true,
            strip: true,
            ..directive("FOO")
        };
        assert_eq!(resolve(&d, &vars(&[])).unwrap(), ConfigValue::Null);
        assert_eq!(
            resolve(&d, &vars(&[("FOO", " x ")])).unwrap(),
            ConfigValue::from("x")
        );
    }

    #[test]
    fn test_strip() {
        let d = Directive {
            strip: true,
            ..directive("FOO")
        };
        let env = vars(&[("FOO", "\t bar \n")]);
        assert_eq!(resolve(&d, &env).unwrap(), ConfigValue::from("bar"));
    }

    #[test]
    fn test_list_expansion_from_default() {
        let d = Directive {
            delimiter: Some(",".into()),
            default: Some("a,b,c".into()),
            ..directive("FOO")
        };
        assert_eq!(resolve(&d, &vars(&[])).unwrap(), list(&["a", "b", "c"]));
    }

    #[test]
    fn test_list_expansion_strips_each_element() {
        let d = Directive {
            delimiter: Some(",".into()),
            strip: true,
            ..directive("FOO")
        };
        let env = vars(&[("FOO", "  bar   ,     baz ,bork   ")]);
        assert_eq!(resolve(&d, &env).unwrap(), list(&["bar", "baz", "bork"]));
    }

    #[test]
    fn test_delimiter_is_literal_not_pattern() {
        let d = Directive {
            delimiter: Some(".*".into()),
            ..directive("FOO")
        };
        let env = vars(&[("FOO", "a.*b.c")]);
        assert_eq!(resolve(&d, &env).unwrap(), list(&["a", "b.c"]));
    }

    #[test]
    fn test_embedded_applies_default_and_strip() {
        let d = Directive {
            strip: true,
            default: Some(" local ".into()),
            whole_string: false,
            ..directive("HOST")
        };
        assert_eq!(resolve_embedded(&d, &vars(&[])).unwrap(), "local");
        assert_eq!(
            resolve_embedded(&directive("HOST"), &vars(&[])).unwrap_err(),
            MissingVariable("HOST".into())
        );
    }

    #[test]
    fn test_empty_value_splits_to_single_empty_element() {
        let d = Directive {
            delimiter: Some(",".into()),
            default: Some("x,y".into()),
            ..directive("FOO")
        };
        let env = vars(&[("FOO", "")]);
        assert_eq!(resolve(&d, &env).unwrap(), list(&[""]));
    }
}
