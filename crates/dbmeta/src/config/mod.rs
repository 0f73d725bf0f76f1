//! Configuration loading and validation.
//!
//! Values come from an optional YAML file, then the environment, then the
//! command line. The library never reads the process environment itself:
//! [`Config::from_lookup`] takes the lookup function.

mod types;
mod validation;

pub use types::*;
pub use validation::{validate_connection, validate_new_database};

use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::{MetaError, Result};

/// Connection string for export-scripts and update-db.
pub const ENV_CONNECTION_STRING: &str = "CONNECTION_STRING";
/// Owner of databases created by build-db.
pub const ENV_NEW_DB_USER: &str = "FB_NEW_DB_USER";
/// Owner password for databases created by build-db.
pub const ENV_NEW_DB_PASSWORD: &str = "FB_NEW_DB_PASSWORD";
/// Server host for build-db.
pub const ENV_NEW_DB_HOST: &str = "FB_NEW_DB_HOST";
/// Server port for build-db.
pub const ENV_NEW_DB_PORT: &str = "FB_NEW_DB_PORT";
/// Page size for build-db.
pub const ENV_NEW_DB_PAGE_SIZE: &str = "FB_NEW_DB_PAGE_SIZE";

impl Config {
    /// Load configuration from a YAML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Configuration built from environment-style variables only.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::default().with_overrides(lookup)
    }

    /// Override fields with non-blank values returned by `lookup`.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(conn) = get(ENV_CONNECTION_STRING) {
            self.connection_string = Some(conn);
        }

        let db = &mut self.new_database;
        if let Some(user) = get(ENV_NEW_DB_USER) {
            db.user = user;
        }
        if let Some(password) = get(ENV_NEW_DB_PASSWORD) {
            db.password = password;
        }
        if let Some(host) = get(ENV_NEW_DB_HOST) {
            db.host = host;
        }
        if let Some(port) = get(ENV_NEW_DB_PORT) {
            db.port = parse_number(ENV_NEW_DB_PORT, &port)?;
        }
        if let Some(size) = get(ENV_NEW_DB_PAGE_SIZE) {
            db.page_size = Some(parse_number(ENV_NEW_DB_PAGE_SIZE, &size)?);
        }

        Ok(self)
    }

    /// Pick the connection string: explicit flag first, then configuration.
    pub fn resolve_connection_string(&self, flag: Option<&str>) -> Result<String> {
        flag.filter(|v| !v.trim().is_empty())
            .map(str::to_string)
            .or_else(|| self.connection_string.clone())
            .ok_or_else(|| {
                MetaError::Usage(format!(
                    "missing --connection-string and no {} configured",
                    ENV_CONNECTION_STRING
                ))
            })
    }
}

impl FromStr for ConnectionConfig {
    type Err = MetaError;

    /// Parse an ADO-style `Key=Value;...` connection string.
    ///
    /// Keys are case-insensitive; unknown keys (`ServerType`, `Pooling`, ...)
    /// are ignored.
    fn from_str(s: &str) -> Result<Self> {
        let mut config = ConnectionConfig {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            database: String::new(),
            user: String::new(),
            password: String::new(),
            dialect: DEFAULT_DIALECT,
        };

        for part in s.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                MetaError::Config(format!("invalid connection string entry '{}'", part))
            })?;
            let value = value.trim().to_string();

            match normalize_key(key).as_str() {
                "user" | "userid" | "username" | "uid" => config.user = value,
                "password" | "pwd" => config.password = value,
                "database" | "initialcatalog" | "db" => config.database = value,
                "datasource" | "server" | "host" => config.host = value,
                "port" => config.port = parse_number("Port", &value)?,
                "dialect" => config.dialect = parse_number("Dialect", &value)?,
                other => debug!("Ignoring connection string key '{}'", other),
            }
        }

        validate_connection(&config)?;
        Ok(config)
    }
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| !c.is_whitespace() && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_number<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| MetaError::Config(format!("{} must be a number, got '{}'", name, value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_parse_connection_string() {
        let config: ConnectionConfig =
            "User=SYSDBA;Password=masterkey;Database=/data/app.fdb;DataSource=db.local;Port=3051;Dialect=3"
                .parse()
                .unwrap();
        assert_eq!(config.user, "SYSDBA");
        assert_eq!(config.password, "masterkey");
        assert_eq!(config.database, "/data/app.fdb");
        assert_eq!(config.host, "db.local");
        assert_eq!(config.port, 3051);
        assert_eq!(config.dialect, 3);
    }

    #[test]
    fn test_parse_connection_string_aliases_and_defaults() {
        let config: ConnectionConfig =
            "user id=admin; pwd=x; Initial Catalog=C:\\db\\app.fdb; ServerType=0;"
                .parse()
                .unwrap();
        assert_eq!(config.user, "admin");
        assert_eq!(config.database, "C:\\db\\app.fdb");
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.port, DEFAULT_PORT);
    }

    #[test]
    fn test_parse_connection_string_errors() {
        assert!("Database=/a.fdb;User=SYSDBA;Port=abc"
            .parse::<ConnectionConfig>()
            .is_err());
        assert!("garbage".parse::<ConnectionConfig>().is_err());
        assert!("User=SYSDBA".parse::<ConnectionConfig>().is_err());
    }

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            (ENV_CONNECTION_STRING, "Database=/a.fdb;User=SYSDBA"),
            (ENV_NEW_DB_USER, "SYSDBA"),
            (ENV_NEW_DB_PASSWORD, "masterkey"),
            (ENV_NEW_DB_PORT, "3052"),
        ]))
        .unwrap();
        assert_eq!(
            config.connection_string.as_deref(),
            Some("Database=/a.fdb;User=SYSDBA")
        );
        assert_eq!(config.new_database.user, "SYSDBA");
        assert_eq!(config.new_database.port, 3052);
        assert_eq!(config.new_database.host, DEFAULT_HOST);
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let config = Config::from_lookup(lookup(&[(ENV_CONNECTION_STRING, "   ")])).unwrap();
        assert!(config.connection_string.is_none());
    }

    #[test]
    fn test_resolve_connection_string_precedence() {
        let config = Config {
            connection_string: Some("from-env".into()),
            ..Config::default()
        };
        assert_eq!(
            config.resolve_connection_string(Some("from-flag")).unwrap(),
            "from-flag"
        );
        assert_eq!(config.resolve_connection_string(None).unwrap(), "from-env");

        let err = Config::default().resolve_connection_string(None).unwrap_err();
        assert!(matches!(err, MetaError::Usage(_)));
    }

    #[test]
    fn test_yaml_then_env_overrides() {
        let yaml = "connection_string: \"Database=/y.fdb;User=A\"\n\
                    new_database:\n  host: fbhost\n  user: OWNER\n  page_size: 8192\n";
        let config = Config::from_yaml(yaml)
            .unwrap()
            .with_overrides(lookup(&[(ENV_NEW_DB_USER, "OTHER")]))
            .unwrap();
        assert_eq!(config.new_database.host, "fbhost");
        assert_eq!(config.new_database.user, "OTHER");
        assert_eq!(config.new_database.page_size, Some(8192));
        assert_eq!(config.new_database.port, DEFAULT_PORT);
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            Config::from_yaml("new_database: [").unwrap_err(),
            MetaError::Yaml(_)
        ));
    }
}
