//! Host definition files
//!
//! A TOML description of an object graph the in-memory host can be loaded
//! from. The console binary reads one of these so the whole surface can be
//! exercised without a full home-automation deployment.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use hearth_core::config::load_config;
use hearth_core::error::ConfigError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostDefinition {
    /// Product version reported in the console greeting
    pub version: Option<String>,
    pub items: Vec<ItemDef>,
    pub logics: Vec<LogicDef>,
    pub tasks: Vec<TaskDef>,
    /// Named in-memory logs beyond the default one
    pub logs: Vec<String>,
    /// Thread names the host reports as live
    pub threads: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemDef {
    pub path: String,
    /// `bool`, `num` or `str`; absent for structural items
    #[serde(rename = "type")]
    pub item_type: Option<String>,
    /// Initial value as raw text; falls back to the type's zero value
    pub value: Option<String>,
    #[serde(default)]
    pub config: BTreeMap<String, String>,
    #[serde(default)]
    pub logic_triggers: Vec<String>,
    #[serde(default)]
    pub method_triggers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogicDef {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// When set, the logic gets a scheduler task due this many seconds
    /// from host start
    pub schedule_secs: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TaskDef {
    pub name: String,
    /// Next run, seconds from host start; absent means no planned run
    pub next_secs: Option<u64>,
    #[serde(default)]
    pub detail: BTreeMap<String, String>,
}

fn default_true() -> bool {
    true
}

impl HostDefinition {
    /// Load a definition from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// A small demonstration graph, used when the binary is started
    /// without a definition file
    pub fn sample() -> Self {
        let def = r#"
            version = "1.3.0"
            logs = ["env"]
            threads = ["Main", "Scheduler", "Connections"]

            [[items]]
            path = "env"

            [[items]]
            path = "env.core"

            [[items]]
            path = "env.core.temperature"
            type = "num"
            value = "21.5"
            config = { unit = "celsius" }

            [[items]]
            path = "kitchen"

            [[items]]
            path = "kitchen.light"
            type = "bool"
            value = "false"
            config = { knx_group = "1/2/3" }
            logic_triggers = ["night_scene"]
            method_triggers = ["knx.update"]

            [[items]]
            path = "kitchen.temperature"
            type = "num"
            value = "19.5"
            config = { unit = "celsius" }

            [[logics]]
            name = "night_scene"
            schedule_secs = 300

            [[logics]]
            name = "morning_scene"
            enabled = false

            [[logics]]
            name = "watchdog"
            schedule_secs = 60

            [[tasks]]
            name = "series_cleanup"
            next_secs = 120
            detail = { cycle = "300" }

            [[tasks]]
            name = "item_watch"
            next_secs = 3600
            detail = { cron = "0 * * * *" }
        "#;
        toml::from_str(def).expect("sample definition must parse")
    }
}
