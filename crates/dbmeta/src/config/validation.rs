//! Configuration validation.

use super::{ConnectionConfig, NewDatabaseConfig};
use crate::error::{MetaError, Result};

const PAGE_SIZES: [u32; 4] = [4096, 8192, 16384, 32768];

/// Validate settings for an existing database.
pub fn validate_connection(config: &ConnectionConfig) -> Result<()> {
    if config.database.is_empty() {
        return Err(MetaError::Config("connection string has no Database".into()));
    }
    if config.user.is_empty() {
        return Err(MetaError::Config("connection string has no User".into()));
    }
    validate_common(&config.host, config.dialect)
}

/// Validate settings for a new database.
pub fn validate_new_database(config: &NewDatabaseConfig) -> Result<()> {
    if config.user.is_empty() {
        return Err(MetaError::Config(
            "new database user is required (FB_NEW_DB_USER)".into(),
        ));
    }
    if let Some(size) = config.page_size {
        if !PAGE_SIZES.contains(&size) {
            return Err(MetaError::Config(format!(
                "page size must be one of {:?}, got {}",
                PAGE_SIZES, size
            )));
        }
    }
    validate_common(&config.host, config.dialect)
}

fn validate_common(host: &str, dialect: u8) -> Result<()> {
    if host.is_empty() {
        return Err(MetaError::Config("host is required".into()));
    }
    if !(1..=3).contains(&dialect) {
        return Err(MetaError::Config(format!(
            "dialect must be 1, 2 or 3, got {}",
            dialect
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_connection() -> ConnectionConfig {
        ConnectionConfig {
            host: "localhost".to_string(),
            port: 3050,
            database: "/data/app.fdb".to_string(),
            user: "SYSDBA".to_string(),
            password: "masterkey".to_string(),
            dialect: 3,
        }
    }

    fn valid_new_database() -> NewDatabaseConfig {
        NewDatabaseConfig {
            user: "SYSDBA".to_string(),
            password: "masterkey".to_string(),
            ..NewDatabaseConfig::default()
        }
    }

    #[test]
    fn test_valid_connection() {
        assert!(validate_connection(&valid_connection()).is_ok());
    }

    #[test]
    fn test_missing_database() {
        let mut config = valid_connection();
        config.database.clear();
        assert!(validate_connection(&config).is_err());
    }

    #[test]
    fn test_bad_dialect() {
        let mut config = valid_connection();
        config.dialect = 4;
        assert!(validate_connection(&config).is_err());
    }

    #[test]
    fn test_new_database_requires_user() {
        let mut config = valid_new_database();
        assert!(validate_new_database(&config).is_ok());
        config.user.clear();
        let err = validate_new_database(&config).unwrap_err();
        assert!(err.to_string().contains("FB_NEW_DB_USER"));
    }

    #[test]
    fn test_new_database_page_size() {
        let mut config = valid_new_database();
        config.page_size = Some(16384);
        assert!(validate_new_database(&config).is_ok());
        config.page_size = Some(1000);
        assert!(validate_new_database(&config).is_err());
    }

    #[test]
    fn test_connection_debug_redacts_password() {
        let mut config = valid_connection();
        config.password = "super_secret_password_123".to_string();
        let debug_output = format!("{:?}", config);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password_123"));
    }

    #[test]
    fn test_new_database_debug_redacts_password() {
        let mut config = valid_new_database();
        config.password = "super_secret_password_456".to_string();
        let debug_output = format!("{:?}", config);
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_password_456"));
    }
}
