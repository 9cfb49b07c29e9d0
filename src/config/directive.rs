//! Tokenizer for `${...}` environment directives.
//!
//! ```text
//! directive     := "${" name delimPart? stripPart? defaultOrNone? "}"
//! name          := one or more chars except } : ~ ? [
//! delimPart     := "[" delim "]"        (delim: one or more chars except ] })
//! stripPart     := "~"
//! defaultOrNone := ":" defaultValue | "?" (defaultValue: any chars except })
//! ```
//!
//! `$${...}` escapes a well-formed directive and produces its text with one
//! `$` removed. A `$${` that does not start a valid directive is kept as is.

use std::ops::Range;

use thiserror::Error;

const NAME_STOP: [char; 5] = ['}', ':', '~', '?', '['];

/// A parsed `${...}` directive.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Directive {
    pub name: String,
    /// Literal separator for list expansion (`${VAR[,]}`).
    pub delimiter: Option<String>,
    /// Trim surrounding whitespace after resolution (`${VAR~}`).
    pub strip: bool,
    /// Fallback used when the variable is unset (`${VAR:fallback}`).
    pub default: Option<String>,
    /// Resolve to null when the variable is unset (`${VAR?}`).
    pub none_flag: bool,
    /// Whether the directive spans its entire source string.
    pub whole_string: bool,
}

impl Directive {
    /// List expansion and the none-flag produce values that cannot be
    /// concatenated into surrounding text.
    pub fn requires_whole_string(&self) -> bool {
        self.delimiter.is_some() || self.none_flag
    }
}

/// A piece of a tokenized string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Directive {
        span: Range<usize>,
        directive: Directive,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} (at byte {offset})")]
pub struct DirectiveError {
    /// Byte offset of the `${` that starts the bad directive.
    pub offset: usize,
    pub kind: DirectiveErrorKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DirectiveErrorKind {
    #[error("unterminated directive (missing '}}')")]
    Unterminated,

    #[error("directive has an empty variable name")]
    EmptyName,

    #[error("list delimiter is empty")]
    EmptyDelimiter,

    #[error("list delimiter is not closed with ']'")]
    UnclosedDelimiter,

    #[error("unexpected '{0}' in directive")]
    Unexpected(char),

    #[error("list expansion and '?' require the directive to be the whole string")]
    RequiresWholeString,
}

/// Splits `source` into literal runs and directives.
///
/// The iterator is lazy and stops after the first error.
pub fn tokenize(source: &str) -> Tokens<'_> {
    Tokens {
        source,
        pos: 0,
        failed: false,
    }
}

/// Iterator returned by [`tokenize`].
#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    source: &'a str,
    pos: usize,
    failed: bool,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Result<Segment<'a>, DirectiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.pos >= self.source.len() {
            return None;
        }

        let source = self.source;
        let start = self.pos;
        let rest = &source[start..];

        if rest.starts_with("$${") {
            // Only a well-formed directive can be escaped
            return match parse_directive(source, start + 1) {
                Ok((_, end)) => {
                    self.pos = end;
                    Some(Ok(Segment::Literal(&source[start + 1..end])))
                }
                Err(_) => {
                    self.pos += 2;
                    Some(Ok(Segment::Literal(&source[start..start + 2])))
                }
            };
        }

        if rest.starts_with("${") {
            let parsed = parse_directive(source, start).and_then(|(directive, end)| {
                if directive.requires_whole_string() && !directive.whole_string {
                    Err(DirectiveError {
                        offset: start,
                        kind: DirectiveErrorKind::RequiresWholeString,
                    })
                } else {
                    Ok((directive, end))
                }
            });
            return match parsed {
                Ok((directive, end)) => {
                    self.pos = end;
                    Some(Ok(Segment::Directive {
                        span: start..end,
                        directive,
                    }))
                }
                Err(e) => {
                    self.failed = true;
                    Some(Err(e))
                }
            };
        }

        let end = rest
            .match_indices('$')
            .map(|(i, _)| i)
            .find(|&i| i > 0 && is_marker(&rest[i..]))
            .map_or(source.len(), |i| start + i);
        self.pos = end;
        Some(Ok(Segment::Literal(&source[start..end])))
    }
}

fn is_marker(s: &str) -> bool {
    s.starts_with("${") || s.starts_with("$${")
}

/// Parses the directive starting at `start` (which points at `${`).
/// Returns the directive and the byte offset just past its closing `}`.
/// The whole-string rule is left to the caller.
fn parse_directive(source: &str, start: usize) -> Result<(Directive, usize), DirectiveError> {
    let err = |kind| DirectiveError {
        offset: start,
        kind,
    };

    let mut rest = &source[start + 2..];

    let stop = rest
        .find(NAME_STOP)
        .ok_or_else(|| err(DirectiveErrorKind::Unterminated))?;
    if stop == 0 {
        return Err(err(DirectiveErrorKind::EmptyName));
    }
    let name = rest[..stop].to_string();
    rest = &rest[stop..];

    let mut delimiter = None;
    if let Some(after) = rest.strip_prefix('[') {
        let close = after
            .find([']', '}'])
            .ok_or_else(|| err(DirectiveErrorKind::Unterminated))?;
        if after[close..].starts_with('}') {
            return Err(err(DirectiveErrorKind::UnclosedDelimiter));
        }
        if close == 0 {
            return Err(err(DirectiveErrorKind::EmptyDelimiter));
        }
        delimiter = Some(after[..close].to_string());
        rest = &after[close + 1..];
    }

    let strip = match rest.strip_prefix('~') {
        Some(after) => {
            rest = after;
            true
        }
        None => false,
    };

    let mut default = None;
    let mut none_flag = false;
    if let Some(after) = rest.strip_prefix(':') {
        let close = after
            .find('}')
            .ok_or_else(|| err(DirectiveErrorKind::Unterminated))?;
        default = Some(after[..close].to_string());
        rest = &after[close..];
    } else if let Some(after) = rest.strip_prefix('?') {
        none_flag = true;
        rest = after;
    }

    match rest.chars().next() {
        Some('}') => {}
        Some(c) => return Err(err(DirectiveErrorKind::Unexpected(c))),
        None => return Err(err(DirectiveErrorKind::Unterminated)),
    }

    let end = source.len() - rest.len() + 1;
    let directive = Directive {
        name,
        delimiter,
        strip,
        default,
        none_flag,
        whole_string: start == 0 && end == source.len(),
    };
    Ok((directive, end))
}
