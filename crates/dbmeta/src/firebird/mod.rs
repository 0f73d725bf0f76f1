//! Firebird backend.
//!
//! Wraps a single `rsfbclient` connection and implements both
//! [`CatalogReader`] and [`ScriptExecutor`] on it. Every call is a blocking
//! round trip; statements run in the client's implicit transaction and are
//! committed one by one.

use rsfbclient::prelude::*;
use rsfbclient::{Connection, Dialect, FbError};
use rsfbclient_core::FirebirdClient;
use tracing::{debug, info};

use crate::catalog::{queries, CatalogReader, ColumnRow, DomainRow, ParameterRow, ProcedureRow};
use crate::config::{validate_connection, validate_new_database, ConnectionConfig, NewDatabaseConfig};
use crate::error::{MetaError, Result};
use crate::scripts::ScriptExecutor;
use crate::typemap::FieldDescriptor;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 8192;

/// Raw field columns shared by the domain, column and parameter queries:
/// type, length, scale, precision, character length, subtype.
type FieldColumns = (i16, i16, i16, Option<i16>, Option<i16>, Option<i16>);

/// Open connection to a Firebird database.
pub struct FirebirdConnection<C: FirebirdClient> {
    conn: Connection<C>,
    database: String,
}

/// Connect to an existing database.
pub fn connect(config: &ConnectionConfig) -> Result<FirebirdConnection<impl FirebirdClient>> {
    validate_connection(config)?;

    let conn = rsfbclient::builder_pure_rust()
        .host(config.host.as_str())
        .port(config.port)
        .db_name(config.database.as_str())
        .user(config.user.as_str())
        .pass(config.password.as_str())
        .dialect(dialect(config.dialect))
        .connect()
        .map_err(|e| {
            MetaError::connection(
                e.to_string(),
                format!("opening {}:{}/{}", config.host, config.port, config.database),
            )
        })?;

    info!(
        "Connected to Firebird: {}:{}/{}",
        config.host, config.port, config.database
    );

    Ok(FirebirdConnection {
        conn,
        database: config.database.clone(),
    })
}

/// Create a new, empty database file and return a connection to it.
pub fn create_database(
    config: &NewDatabaseConfig,
    database: &str,
) -> Result<FirebirdConnection<impl FirebirdClient>> {
    validate_new_database(config)?;

    let conn = rsfbclient::builder_pure_rust()
        .host(config.host.as_str())
        .port(config.port)
        .db_name(database)
        .user(config.user.as_str())
        .pass(config.password.as_str())
        .dialect(dialect(config.dialect))
        .page_size(config.page_size.unwrap_or(DEFAULT_PAGE_SIZE))
        .create_database()
        .map_err(|e| {
            MetaError::connection(
                e.to_string(),
                format!("creating {}:{}/{}", config.host, config.port, database),
            )
        })?;

    info!("Created empty database: {}", database);

    Ok(FirebirdConnection {
        conn,
        database: database.to_string(),
    })
}

impl<C: FirebirdClient> FirebirdConnection<C> {
    /// Database path or alias this connection is attached to.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Detach from the database. Dropping the connection also detaches, but
    /// without reporting errors.
    pub fn close(self) -> Result<()> {
        let database = self.database;
        self.conn
            .close()
            .map_err(|e| MetaError::connection(e.to_string(), format!("closing {}", database)))?;
        debug!("Closed connection to {}", database);
        Ok(())
    }
}

impl<C: FirebirdClient> CatalogReader for FirebirdConnection<C> {
    fn domain_rows(&mut self) -> Result<Vec<DomainRow>> {
        let rows: Vec<(String, i16, i16, i16, Option<i16>, Option<i16>, Option<i16>)> = self
            .conn
            .query(queries::DOMAINS, ())
            .map_err(|e| catalog_error("domains", e))?;

        Ok(rows
            .into_iter()
            .map(|(name, ty, len, scale, precision, char_len, sub_type)| DomainRow {
                name,
                descriptor: descriptor((ty, len, scale, precision, char_len, sub_type)),
            })
            .collect())
    }

    fn table_names(&mut self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = self
            .conn
            .query(queries::TABLES, ())
            .map_err(|e| catalog_error("tables", e))?;

        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    fn column_rows(&mut self, table: &str) -> Result<Vec<ColumnRow>> {
        #[allow(clippy::type_complexity)]
        let rows: Vec<(
            String,
            Option<i16>,
            String,
            i16,
            i16,
            i16,
            Option<i16>,
            Option<i16>,
            Option<i16>,
            Option<i16>,
        )> = self
            .conn
            .query(queries::TABLE_COLUMNS, (table.to_string(),))
            .map_err(|e| catalog_error(&format!("columns of {}", table), e))?;

        Ok(rows
            .into_iter()
            .map(
                |(name, position, source, ty, len, scale, precision, char_len, sub_type, null_flag)| {
                    ColumnRow {
                        name,
                        position,
                        field_source: source,
                        descriptor: descriptor((ty, len, scale, precision, char_len, sub_type)),
                        null_flag,
                    }
                },
            )
            .collect())
    }

    fn procedure_rows(&mut self) -> Result<Vec<ProcedureRow>> {
        let rows: Vec<(String, Option<String>)> = self
            .conn
            .query(queries::PROCEDURES, ())
            .map_err(|e| catalog_error("procedures", e))?;

        Ok(rows
            .into_iter()
            .map(|(name, source)| ProcedureRow { name, source })
            .collect())
    }

    fn parameter_rows(&mut self, procedure: &str) -> Result<Vec<ParameterRow>> {
        #[allow(clippy::type_complexity)]
        let rows: Vec<(
            String,
            i16,
            Option<i16>,
            String,
            i16,
            i16,
            i16,
            Option<i16>,
            Option<i16>,
            Option<i16>,
        )> = self
            .conn
            .query(queries::PROCEDURE_PARAMETERS, (procedure.to_string(),))
            .map_err(|e| catalog_error(&format!("parameters of {}", procedure), e))?;

        Ok(rows
            .into_iter()
            .map(
                |(name, direction, number, source, ty, len, scale, precision, char_len, sub_type)| {
                    ParameterRow {
                        name,
                        parameter_type: direction,
                        number,
                        field_source: source,
                        descriptor: descriptor((ty, len, scale, precision, char_len, sub_type)),
                    }
                },
            )
            .collect())
    }
}

impl<C: FirebirdClient> ScriptExecutor for FirebirdConnection<C> {
    fn execute_script(&mut self, sql: &str) -> Result<()> {
        let statement = prepare_statement(sql);
        debug!("Executing: {}", statement);
        self.conn
            .execute(statement, ())
            .map_err(|e| MetaError::Statement(e.to_string()))?;
        Ok(())
    }
}

/// DSQL takes one statement without a terminator; drop surrounding
/// whitespace and a single trailing `;`.
pub fn prepare_statement(sql: &str) -> &str {
    let trimmed = sql.trim();
    trimmed
        .strip_suffix(';')
        .map(str::trim_end)
        .unwrap_or(trimmed)
}

fn dialect(value: u8) -> Dialect {
    match value {
        1 => Dialect::D1,
        2 => Dialect::D2,
        _ => Dialect::D3,
    }
}

fn descriptor(fields: FieldColumns) -> FieldDescriptor {
    let (ty, len, scale, precision, char_len, sub_type) = fields;
    FieldDescriptor {
        type_code: i32::from(ty),
        storage_length: i32::from(len),
        scale,
        precision,
        character_length: char_len.map(i32::from),
        subtype: sub_type,
    }
}

fn catalog_error(what: &str, err: FbError) -> MetaError {
    MetaError::Catalog(format!("reading {}: {}", what, err))
}
