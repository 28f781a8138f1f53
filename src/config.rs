//! Layered configuration
//!
//! Sources, highest priority first:
//! 1. Environment variables (`MOOD_DASHBOARD_*`, `__` separates sections)
//! 2. `mood-dashboard.toml` in the working directory (or an explicit path)
//! 3. Built-in defaults
//!
//! `MOOD_DASHBOARD_DB_PATH=/tmp/x.db` sets `db_path`;
//! `MOOD_DASHBOARD_SERVE__PORT=8080` sets `serve.port`.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "mood-dashboard.toml";
pub const ENV_PREFIX: &str = "MOOD_DASHBOARD_";

fn default_tables() -> Vec<String> {
    ["dayEntries", "customMoods", "tags", "goals", "goal_entries"]
        .into_iter()
        .map(String::from)
        .collect()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServeConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

const fn default_port() -> u16 {
    3001
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self { port: default_port() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DashboardConfig {
    /// Directory that relative input paths resolve against
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    /// Decoded Daylio backup: table name → records
    pub daylio_json: PathBuf,
    /// Column schema registry
    pub table_info: PathBuf,
    /// Static mood group reference rows
    pub mood_groups: PathBuf,
    /// Saved Fitbit sleep feed
    pub sleep_json: PathBuf,
    /// SQL scripts defining dashboard views
    pub scripts_dir: PathBuf,
    /// Daylio tables to normalize, in order
    pub tables: Vec<String>,
    #[serde(default)]
    pub serve: ServeConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            db_path: PathBuf::from(crate::db::DEFAULT_DB_PATH),
            daylio_json: PathBuf::from("daylio.json"),
            table_info: PathBuf::from("table_info.json"),
            mood_groups: PathBuf::from("mood_groups.json"),
            sleep_json: PathBuf::from("fitbit_sleep_data.json"),
            scripts_dir: PathBuf::from("sql"),
            tables: default_tables(),
            serve: ServeConfig::default(),
        }
    }
}

impl DashboardConfig {
    /// Load from defaults, the config file and the environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, figment::Error> {
        Self::figment(config_file).extract()
    }

    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        match config_file {
            // an explicitly named file must exist
            Some(file) => figment = figment.merge(Toml::file_exact(file)),
            None if Path::new(CONFIG_FILE).exists() => figment = figment.merge(Toml::file(CONFIG_FILE)),
            None => {}
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Input file path: absolute paths as given, others under `data_dir`
    pub fn input(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.data_dir.join(path)
        }
    }

    pub fn daylio_json_path(&self) -> PathBuf {
        self.input(&self.daylio_json)
    }

    pub fn table_info_path(&self) -> PathBuf {
        self.input(&self.table_info)
    }

    pub fn mood_groups_path(&self) -> PathBuf {
        self.input(&self.mood_groups)
    }

    pub fn sleep_json_path(&self) -> PathBuf {
        self.input(&self.sleep_json)
    }
}
