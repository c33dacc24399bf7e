use cadence_core::recurrence::WeekendPolicy;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// SQLite database file, created on first use.
    pub database_path: PathBuf,
    /// Occurrences shown by `recur preview` without `--count`.
    pub preview_count: usize,
    /// Weekend policy for new rules that don't pass `--on-weekend`.
    pub default_on_weekend: WeekendPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("cadence.db"),
            preview_count: 5,
            default_on_weekend: WeekendPolicy::NoChange,
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("cadence.toml"))
                .merge(Env::prefixed("CADENCE_")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }
}
