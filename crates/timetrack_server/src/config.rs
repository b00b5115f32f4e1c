//! Server configuration.
//!
//! Settings come from built-in defaults overlaid with environment variables
//! prefixed `TIMETRACK`, using `__` between path segments, e.g.
//! `TIMETRACK__SERVER__PORT=8080` or `TIMETRACK__PEOPLE_API__URL=http://...`.

use config::{Config, ConfigError, Environment, Map};
use serde::Deserialize;

const ENV_PREFIX: &str = "TIMETRACK";
const ENV_SEPARATOR: &str = "__";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub logging: LoggingSettings,
    #[serde(default)]
    pub people_api: PeopleApiSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite database file.
    pub path: String,
    pub pool_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    pub dir: String,
}

/// External people-info lookup. Registration skips enrichment when `url` is unset.
#[derive(Debug, Clone, Deserialize)]
pub struct PeopleApiSettings {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PeopleApiSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    10
}

impl Settings {
    /// Loads settings from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR))
    }

    /// Loads settings from an explicit variable map instead of the process
    /// environment.
    pub fn from_vars(vars: Map<String, String>) -> Result<Self, ConfigError> {
        Self::build(
            Environment::with_prefix(ENV_PREFIX)
                .separator(ENV_SEPARATOR)
                .source(Some(vars)),
        )
    }

    fn build(environment: Environment) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("database.path", "timetrack.db")?
            .set_default("database.pool_size", 8)?
            .set_default("logging.level", timetrack_core::default_log_level())?
            .set_default("logging.dir", "logs")?
            .add_source(environment)
            .build()?;

        let mut settings: Self = settings.try_deserialize()?;
        settings.people_api.url = settings
            .people_api
            .url
            .take()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        Ok(settings)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use config::Map;

    fn vars(pairs: &[(&str, &str)]) -> Map<String, String> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_without_variables() {
        let settings = Settings::from_vars(Map::new()).unwrap();
        assert_eq!(settings.bind_address(), "127.0.0.1:8080");
        assert_eq!(settings.database.path, "timetrack.db");
        assert_eq!(settings.database.pool_size, 8);
        assert_eq!(settings.logging.dir, "logs");
        assert_eq!(settings.people_api.url, None);
        assert_eq!(settings.people_api.timeout_secs, 10);
    }

    #[test]
    fn environment_overrides_defaults() {
        let settings = Settings::from_vars(vars(&[
            ("TIMETRACK__SERVER__HOST", "0.0.0.0"),
            ("TIMETRACK__SERVER__PORT", "9000"),
            ("TIMETRACK__DATABASE__PATH", "/var/lib/timetrack/db.sqlite"),
            ("TIMETRACK__PEOPLE_API__URL", "http://people.local/"),
        ]))
        .unwrap();

        assert_eq!(settings.bind_address(), "0.0.0.0:9000");
        assert_eq!(settings.database.path, "/var/lib/timetrack/db.sqlite");
        assert_eq!(settings.people_api.url.as_deref(), Some("http://people.local"));
    }

    #[test]
    fn blank_people_api_url_disables_lookup() {
        let settings =
            Settings::from_vars(vars(&[("TIMETRACK__PEOPLE_API__URL", "  ")])).unwrap();
        assert_eq!(settings.people_api.url, None);
    }

    #[test]
    fn invalid_port_is_rejected() {
        assert!(Settings::from_vars(vars(&[("TIMETRACK__SERVER__PORT", "not-a-port")])).is_err());
    }
}
