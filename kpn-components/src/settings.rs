extern crate config;
extern crate serde;

use config::{Config, ConfigError, Environment, File, FileFormat};
use kpn_core::director::DirectorConfig;
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// This is the top-level settings object. Every field has a default, so an empty
/// configuration is a valid one.
#[derive(Debug, SmartDefault, Deserialize)]
#[serde(default)]
pub struct Settings {
    #[default = "info"]
    pub log_level: String,
    pub director: DirectorSettings,
    pub drivers: Drivers,
}

/// The director tunables, anything missing falls back to the DirectorConfig default.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct DirectorSettings {
    pub initial_queue_capacity: Option<usize>,
    pub maximum_queue_capacity: Option<usize>,
    pub timed: Option<bool>,
}
impl DirectorSettings {
    /// Build a DirectorConfig with the given name.
    pub fn config(&self, name: &str) -> DirectorConfig {
        let mut config = DirectorConfig {
            name: name.to_string(),
            ..DirectorConfig::default()
        };
        if let Some(c) = self.initial_queue_capacity {
            config.initial_queue_capacity = c;
        }
        if let Some(c) = self.maximum_queue_capacity {
            config.maximum_queue_capacity = c;
        }
        config
    }

    // networks are timed unless told otherwise
    pub fn is_timed(&self) -> bool { self.timed.unwrap_or(true) }
}

/// These are the fields of the driver tables, and the names of the drivers.
#[derive(Debug, Deserialize, Copy, Clone, Eq, PartialEq, Hash)]
#[allow(non_camel_case_types)]
pub enum Field {
    daisy_chain,
    fanout_fanin,
    timed_clocks,
    processes,
    tokens,
    iterations,
    capacity,
    fanout,
    clocks,
    period,
    stop_time,
}
/// a more general solution would be to use a variant rather than usize
pub type FieldMap = HashMap<Field, usize>;

/// Which drivers to run, in order, with a default field map and per-driver overrides.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct Drivers {
    pub run: Vec<Field>,
    pub default: FieldMap,
    pub daisy_chain: Option<FieldMap>,
    pub fanout_fanin: Option<FieldMap>,
    pub timed_clocks: Option<FieldMap>,
}
impl Drivers {
    /// The default map, overridden by anything the driver sets itself.
    pub fn fields_for(&self, driver: Field) -> FieldMap {
        let overrides = match driver {
            Field::daisy_chain => self.daisy_chain.as_ref(),
            Field::fanout_fanin => self.fanout_fanin.as_ref(),
            Field::timed_clocks => self.timed_clocks.as_ref(),
            _ => None,
        };
        let mut map = self.default.clone();
        if let Some(o) = overrides {
            map.extend(o.iter().map(|(k, v)| (*k, *v)));
        }
        map
    }
}

/// We assemble the settings from all the different sources and freeze it.
impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let mut s = Config::new();

        // Start off by merging in the "default" configuration file
        s.merge(File::with_name("config/default").required(false))?;

        // Add in the current environment file
        // Default to 'development' env
        // Note that this file is _optional_
        let env = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
        s.merge(File::with_name(&format!("config/{}", env)).required(false))?;

        // Add in a local configuration file
        // This file shouldn't be checked in to git
        s.merge(File::with_name("config/local").required(false))?;

        // Add in settings from the environment (with a prefix of KPN)
        // Eg.. `KPN_LOG_LEVEL=debug ./target/kpn-test-server` would set the `log_level` key
        s.merge(Environment::with_prefix("kpn"))?;

        s.try_into()
    }

    /// Settings from a toml string, without files or environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let mut s = Config::new();
        s.merge(File::from_str(toml, FileFormat::Toml))?;
        s.try_into()
    }

    /// The log level, anything unrecognized is treated as info.
    pub fn level_filter(&self) -> log::LevelFilter {
        log::LevelFilter::from_str(&self.log_level).unwrap_or_else(|_| {
            log::warn!("unrecognized log_level {}, using info", self.log_level);
            log::LevelFilter::Info
        })
    }
}
