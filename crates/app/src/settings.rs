//! Handles settings for the application.
//!
//! Values come from an optional `settings.toml` in the working directory and
//! from `BUDGET__`-prefixed environment variables, the latter winning:
//!
//! ```toml
//! [app]
//! level = "debug"
//!
//! [server]
//! bind = "0.0.0.0"
//! port = 3001
//! database = { sqlite = "budget.db" }
//! ```
//!
//! `BUDGET__SERVER__PORT=8080` overrides `server.port`.
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    /// In-memory when unset.
    pub database: Option<Database>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("BUDGET").separator("__"))
            .build()?
            .try_deserialize()
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.level", "info")?
            .set_default("server.port", 3001)
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(toml: &str) -> Settings {
        Settings::builder()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn defaults_serve_from_memory() {
        let settings = parse("");
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.server.port, 3001);
        assert!(settings.server.bind.is_none());
        assert!(settings.server.database.is_none());
    }

    #[test]
    fn sqlite_path_is_read() {
        let settings = parse(
            r#"
            [server]
            port = 8080
            database = { sqlite = "budget.db" }
            "#,
        );
        assert_eq!(settings.server.port, 8080);
        assert!(matches!(
            settings.server.database,
            Some(Database::Sqlite(ref path)) if path == "budget.db"
        ));
    }
}
