//! DDL generation for domains, tables and stored procedures.
//!
//! Output is plain Firebird DDL, one statement per object, suitable for the
//! script files consumed by [`crate::scripts::apply_scripts`].

use tracing::warn;

use crate::schema::{
    ColumnDefinition, DomainDefinition, ProcedureDefinition, ProcedureParameter,
    TableDefinition, TypeSource,
};

const INDENT: &str = "  ";

/// `CREATE DOMAIN <name> AS <type>;`
pub fn domain_ddl(domain: &DomainDefinition) -> String {
    warn_on_fallback(&domain.name, &TypeSource::Inline(domain.descriptor));
    format!("CREATE DOMAIN {} AS {};", domain.name, domain.sql_type())
}

/// `CREATE TABLE` with one column per line in declared order.
pub fn table_ddl(table: &TableDefinition) -> String {
    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|col| column_line(&table.name, col))
        .collect();

    let mut ddl = format!("CREATE TABLE {} (\n", table.name);
    ddl.push_str(&columns.join(",\n"));
    ddl.push_str("\n);");
    ddl
}

fn column_line(table: &str, col: &ColumnDefinition) -> String {
    warn_on_fallback(&format!("{}.{}", table, col.name), &col.type_source);

    let not_null = if col.nullable { "" } else { " NOT NULL" };
    format!("{}{} {}{}", INDENT, col.name, col.type_source.to_sql(), not_null)
}

/// `CREATE OR ALTER PROCEDURE`, so the script works whether or not the
/// procedure already exists.
///
/// The input block is omitted without input parameters and the `RETURNS`
/// block without output parameters. An empty body becomes `BEGIN`/`END`.
pub fn procedure_ddl(proc: &ProcedureDefinition) -> String {
    let mut ddl = format!("CREATE OR ALTER PROCEDURE {}\n", proc.name);

    if !proc.input_params.is_empty() {
        ddl.push_str("(\n");
        ddl.push_str(&parameter_block(&proc.name, &proc.input_params));
        ddl.push_str("\n)\n");
    }

    if !proc.output_params.is_empty() {
        ddl.push_str("RETURNS (\n");
        ddl.push_str(&parameter_block(&proc.name, &proc.output_params));
        ddl.push_str("\n)\n");
    }

    ddl.push_str("\nAS\n");

    match procedure_body(&proc.body_source) {
        Some(body) => {
            ddl.push_str(body);
            if !body.ends_with('\n') {
                ddl.push('\n');
            }
        }
        None => ddl.push_str("BEGIN\nEND\n"),
    }

    ddl
}

fn parameter_block(proc: &str, params: &[ProcedureParameter]) -> String {
    params
        .iter()
        .map(|p| {
            warn_on_fallback(&format!("{}.{}", proc, p.name), &p.type_source);
            format!("{}{} {}", INDENT, p.name, p.type_source.to_sql())
        })
        .collect::<Vec<_>>()
        .join(",\n")
}

/// Body text following `AS`, or `None` when the stored source is blank.
///
/// `RDB$PROCEDURE_SOURCE` may or may not start with the `AS` keyword
/// depending on the tool that created the procedure; it is dropped here so it
/// is not emitted twice.
fn procedure_body(source: &str) -> Option<&str> {
    let text = source.trim_start();
    let body = match strip_as_keyword(text) {
        Some(rest) => rest.trim_start(),
        None => text,
    };
    (!body.trim().is_empty()).then_some(body)
}

fn strip_as_keyword(text: &str) -> Option<&str> {
    let head = text.get(..2)?;
    if !head.eq_ignore_ascii_case("AS") {
        return None;
    }
    let rest = &text[2..];
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_whitespace() => Some(rest),
        Some(_) => None,
    }
}

fn warn_on_fallback(object: &str, source: &TypeSource) {
    if let TypeSource::Inline(desc) = source {
        if !desc.is_recognized() {
            warn!(
                "{}: field type {} is not mapped, emitting {}",
                object,
                desc.type_code,
                desc.sql_type()
            );
        }
    }
}
