pub mod config;

pub use config::{
    load, load_as, loads, Config, ConfigError, ConfigValue, EnvLookup, Format, Parser, ProcessEnv,
};
