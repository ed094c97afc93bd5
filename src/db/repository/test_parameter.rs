use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{not_found, now_timestamp, parse_timestamp, DatabaseError};
use crate::models::*;

const PARAMETER_COLUMNS: &str =
    "id, test_type_id, name, code, unit, description, is_active, created_at";

/// Insert a parameter under an existing test type.
/// An unknown `test_type_id` fails with `ReferentialIntegrity`.
pub fn insert_test_parameter(
    conn: &Connection,
    create: &TestParameterCreate,
) -> Result<TestParameter, DatabaseError> {
    create.validate()?;
    conn.execute(
        "INSERT INTO test_parameters
         (test_type_id, name, code, unit, description, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6)",
        params![
            create.test_type_id,
            create.name,
            create.code,
            create.unit,
            create.description,
            now_timestamp(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    tracing::info!(parameter_id = id, code = %create.code, "Test parameter created");
    get_test_parameter(conn, id)?.ok_or_else(|| not_found("test_parameter", id))
}

pub fn get_test_parameter(
    conn: &Connection,
    id: i64,
) -> Result<Option<TestParameter>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {PARAMETER_COLUMNS} FROM test_parameters WHERE id = ?1"),
            params![id],
            parameter_row_from_rusqlite,
        )
        .optional()?;
    row.map(parameter_from_row).transpose()
}

pub fn list_test_parameters(
    conn: &Connection,
    test_type_id: i64,
    active_only: bool,
) -> Result<Vec<TestParameter>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {PARAMETER_COLUMNS} FROM test_parameters
         WHERE test_type_id = ?1 AND (?2 = 0 OR is_active = 1) ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![test_type_id, active_only], parameter_row_from_rusqlite)?;

    let mut parameters = Vec::new();
    for row in rows {
        parameters.push(parameter_from_row(row?)?);
    }
    Ok(parameters)
}

/// Soft-deactivate. Historical results referencing the parameter are kept.
pub fn deactivate_test_parameter(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE test_parameters SET is_active = 0 WHERE id = ?1",
        params![id],
    )?;
    if rows == 0 {
        return Err(not_found("test_parameter", id));
    }
    tracing::info!(parameter_id = id, "Test parameter deactivated");
    Ok(())
}

struct ParameterRow {
    id: i64,
    test_type_id: i64,
    name: String,
    code: String,
    unit: String,
    description: String,
    is_active: bool,
    created_at: String,
}

fn parameter_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ParameterRow, rusqlite::Error> {
    Ok(ParameterRow {
        id: row.get(0)?,
        test_type_id: row.get(1)?,
        name: row.get(2)?,
        code: row.get(3)?,
        unit: row.get(4)?,
        description: row.get(5)?,
        is_active: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn parameter_from_row(row: ParameterRow) -> Result<TestParameter, DatabaseError> {
    Ok(TestParameter {
        id: row.id,
        test_type_id: row.test_type_id,
        name: row.name,
        code: row.code,
        unit: row.unit,
        description: row.description,
        is_active: row.is_active,
        created_at: parse_timestamp("created_at", &row.created_at)?,
    })
}
