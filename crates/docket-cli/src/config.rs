use docket_core::models::{MaterializationConfig, TodayGuard};
use figment::{Figment, providers::{Format, Toml, Env}};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database_path: String,
    /// User to act as when `--user` is not given
    pub user: Option<String>,
    /// Forecast horizon in days
    pub upcoming_days: u32,
    /// Which of today's tasks count as "today already materialized"
    pub today_guard: TodayGuard,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: "docket.db".to_string(),
            user: None,
            upcoming_days: 7,
            today_guard: TodayGuard::default(),
        }
    }
}

impl Config {
    pub fn new() -> Result<Self, figment::Error> {
        Self::from_figment(
            Figment::new()
                .merge(Toml::file("docket.toml"))
                .merge(Env::prefixed("DOCKET_")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        figment.extract()
    }

    pub fn materialization(&self) -> MaterializationConfig {
        MaterializationConfig {
            upcoming_days: self.upcoming_days,
            today_guard: self.today_guard,
        }
    }
}
