use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;

/// Name of the variable that selects the environment overlay when no
/// environment is passed explicitly.
pub const ENV_SELECTOR_VAR: &str = "CONFSPEC_ENV";

/// Read access to environment variables.
///
/// Directives resolve through this trait instead of reading the process
/// environment directly, so tests can substitute an in-memory map.
pub trait EnvLookup {
    fn get(&self, name: &str) -> Option<String>;
}

/// Looks variables up in the real process environment.
///
/// Values that are not valid unicode are treated as unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvLookup for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl<S: BuildHasher> EnvLookup for HashMap<String, String, S> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        BTreeMap::get(self, name).cloned()
    }
}

impl<T: EnvLookup + ?Sized> EnvLookup for &T {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}

/// Picks the environment name: the explicit value if given, else
/// `CONFSPEC_ENV` from `lookup`. Blank values count as unset.
pub fn select_env(explicit: Option<&str>, lookup: &dyn EnvLookup) -> Option<String> {
    let raw = match explicit {
        Some(env) => env.to_string(),
        None => lookup.get(ENV_SELECTOR_VAR)?,
    };
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
