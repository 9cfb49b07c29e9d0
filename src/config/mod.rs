//! Configuration loading with environment directives.

mod bind;
mod builder;
mod directive;
mod env;
mod error;
mod file;
mod format;
mod interpolate;
mod merge;
mod resolve;
mod value;

pub use bind::{bind, BindError};
pub use builder::{load, load_as, loads, Config};
pub use directive::{tokenize, Directive, DirectiveError, DirectiveErrorKind, Segment, Tokens};
pub use env::{select_env, EnvLookup, ProcessEnv, ENV_SELECTOR_VAR};
pub use error::{ConfigError, KeyPath, KeySegment};
pub use file::{env_file_name, FileSource};
pub use format::{Format, FormatError, Parser};
pub use interpolate::{interpolate, resolve_tree, InterpolateError};
pub use merge::{merge, MergeShapeError};
pub use resolve::{resolve, resolve_embedded, MissingVariable};
pub use value::{ConfigValue, Map};
