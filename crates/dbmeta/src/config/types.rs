//! Configuration type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default Firebird server host.
pub const DEFAULT_HOST: &str = "localhost";
/// Default Firebird server port.
pub const DEFAULT_PORT: u16 = 3050;
/// Default SQL dialect.
pub const DEFAULT_DIALECT: u8 = 3;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Connection string for export/update when no flag is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,

    /// Settings used when build-db creates a new database.
    #[serde(default)]
    pub new_database: NewDatabaseConfig,
}

/// Connection to an existing database, parsed from a connection string.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Server host.
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 3050).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database path or alias on the server.
    pub database: String,

    /// Username.
    pub user: String,

    /// Password.
    pub password: String,

    /// SQL dialect (default: 3).
    #[serde(default = "default_dialect")]
    pub dialect: u8,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("dialect", &self.dialect)
            .finish()
    }
}

/// Settings for creating a fresh database file.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDatabaseConfig {
    /// Server host (default: "localhost").
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port (default: 3050).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Owner of the new database.
    #[serde(default)]
    pub user: String,

    /// Password of the owner.
    #[serde(default)]
    pub password: String,

    /// SQL dialect (default: 3).
    #[serde(default = "default_dialect")]
    pub dialect: u8,

    /// Page size in bytes (default: 8192).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl Default for NewDatabaseConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            user: String::new(),
            password: String::new(),
            dialect: default_dialect(),
            page_size: None,
        }
    }
}

impl fmt::Debug for NewDatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewDatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("dialect", &self.dialect)
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl NewDatabaseConfig {
    /// Connection settings for a database file created with these settings.
    pub fn connection_for(&self, database: impl Into<String>) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            database: database.into(),
            user: self.user.clone(),
            password: self.password.clone(),
            dialect: self.dialect,
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_dialect() -> u8 {
    DEFAULT_DIALECT
}
