//! Error types for the schema tool.

use thiserror::Error;

/// Main error type for dbmeta operations.
#[derive(Error, Debug)]
pub enum MetaError {
    /// Missing required argument or unresolved connection string
    #[error("Usage error: {0}")]
    Usage(String),

    /// Configuration error (bad connection string, failed validation)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Opening or creating the database failed
    #[error("Connection error: {message}\n  Context: {context}")]
    Connection { message: String, context: String },

    /// A catalog query failed
    #[error("Catalog query failed: {0}")]
    Catalog(String),

    /// The database rejected a statement
    #[error("Statement failed: {0}")]
    Statement(String),

    /// A definition file could not be executed
    #[error("Script {file} failed: {message}")]
    ScriptExecution { file: String, message: String },

    /// A definition file could not be read
    #[error("Cannot read script {file}: {source}")]
    ScriptRead {
        file: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Process exit code for bad usage: missing flag, unknown command, no
/// connection string.
pub const EXIT_USAGE_ERROR: u8 = 1;
/// Process exit code when the database cannot be opened or created.
pub const EXIT_CONNECTION_ERROR: u8 = 2;
/// Process exit code when a definition file fails.
pub const EXIT_SCRIPT_ERROR: u8 = 3;
/// Process exit code when reading the catalog fails.
pub const EXIT_CATALOG_ERROR: u8 = 4;
/// Process exit code for filesystem errors.
pub const EXIT_IO_ERROR: u8 = 5;
/// Process exit code for result serialization errors.
pub const EXIT_OUTPUT_ERROR: u8 = 6;
/// Process exit code for invalid configuration values or files.
pub const EXIT_CONFIG_ERROR: u8 = 7;

impl MetaError {
    /// Create a Connection error with context about where it occurred
    pub fn connection(message: impl Into<String>, context: impl Into<String>) -> Self {
        MetaError::Connection {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Create a ScriptExecution error
    pub fn script(file: impl Into<String>, message: impl Into<String>) -> Self {
        MetaError::ScriptExecution {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Exit code the CLI reports for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            MetaError::Usage(_) => EXIT_USAGE_ERROR,
            MetaError::Config(_) | MetaError::Yaml(_) => EXIT_CONFIG_ERROR,
            MetaError::Connection { .. } => EXIT_CONNECTION_ERROR,
            MetaError::Statement(_) | MetaError::ScriptExecution { .. } => EXIT_SCRIPT_ERROR,
            MetaError::Catalog(_) => EXIT_CATALOG_ERROR,
            MetaError::ScriptRead { .. } | MetaError::Io(_) => EXIT_IO_ERROR,
            MetaError::Json(_) => EXIT_OUTPUT_ERROR,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for dbmeta operations.
pub type Result<T> = std::result::Result<T, MetaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_exit_with_one() {
        assert_eq!(MetaError::Usage("missing --db-dir".into()).exit_code(), 1);
    }

    #[test]
    fn test_config_errors_have_own_exit_code() {
        assert_eq!(
            MetaError::Config("bad dialect".into()).exit_code(),
            EXIT_CONFIG_ERROR
        );
        let yaml = serde_yaml::from_str::<Vec<String>>("[").unwrap_err();
        assert_eq!(MetaError::Yaml(yaml).exit_code(), EXIT_CONFIG_ERROR);
    }

    #[test]
    fn test_runtime_errors_never_exit_with_one() {
        let errors = [
            MetaError::connection("refused", "opening database"),
            MetaError::script("T.sql", "token unknown"),
            MetaError::Catalog("no permission".into()),
            MetaError::Config("Port must be a number".into()),
            MetaError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone")),
        ];
        for err in errors {
            assert_ne!(err.exit_code(), 0);
            assert_ne!(err.exit_code(), EXIT_USAGE_ERROR);
        }
    }

    #[test]
    fn test_script_error_names_file() {
        let err = MetaError::script("CUSTOMERS.sql", "Table unknown");
        let text = err.format_detailed();
        assert!(text.contains("CUSTOMERS.sql"));
        assert!(text.contains("Table unknown"));
    }
}
