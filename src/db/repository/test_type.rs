use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{not_found, now_timestamp, parse_timestamp, unique_or, DatabaseError};
use crate::models::*;

const TEST_TYPE_COLUMNS: &str = "id, name, description, category, is_active, created_at";

/// Names are unique across all test types, active or not.
pub fn insert_test_type(
    conn: &Connection,
    create: &TestTypeCreate,
) -> Result<TestType, DatabaseError> {
    create.validate()?;
    conn.execute(
        "INSERT INTO test_types (name, description, category, is_active, created_at)
         VALUES (?1, ?2, ?3, 1, ?4)",
        params![create.name, create.description, create.category, now_timestamp()],
    )
    .map_err(|e| unique_or(e, "test_type", "name", &create.name))?;

    let id = conn.last_insert_rowid();
    tracing::info!(test_type_id = id, name = %create.name, "Test type created");
    get_test_type(conn, id)?.ok_or_else(|| not_found("test_type", id))
}

pub fn get_test_type(conn: &Connection, id: i64) -> Result<Option<TestType>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {TEST_TYPE_COLUMNS} FROM test_types WHERE id = ?1"),
            params![id],
            test_type_row_from_rusqlite,
        )
        .optional()?;
    row.map(test_type_from_row).transpose()
}

pub fn get_test_type_by_name(
    conn: &Connection,
    name: &str,
) -> Result<Option<TestType>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {TEST_TYPE_COLUMNS} FROM test_types WHERE name = ?1"),
            params![name],
            test_type_row_from_rusqlite,
        )
        .optional()?;
    row.map(test_type_from_row).transpose()
}

pub fn list_test_types(
    conn: &Connection,
    active_only: bool,
) -> Result<Vec<TestType>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TEST_TYPE_COLUMNS} FROM test_types
         WHERE (?1 = 0 OR is_active = 1) ORDER BY category, name"
    ))?;
    let rows = stmt.query_map(params![active_only], test_type_row_from_rusqlite)?;

    let mut types = Vec::new();
    for row in rows {
        types.push(test_type_from_row(row?)?);
    }
    Ok(types)
}

pub fn deactivate_test_type(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let rows = conn.execute("UPDATE test_types SET is_active = 0 WHERE id = ?1", params![id])?;
    if rows == 0 {
        return Err(not_found("test_type", id));
    }
    tracing::info!(test_type_id = id, "Test type deactivated");
    Ok(())
}

struct TestTypeRow {
    id: i64,
    name: String,
    description: String,
    category: String,
    is_active: bool,
    created_at: String,
}

fn test_type_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<TestTypeRow, rusqlite::Error> {
    Ok(TestTypeRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        is_active: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn test_type_from_row(row: TestTypeRow) -> Result<TestType, DatabaseError> {
    Ok(TestType {
        id: row.id,
        name: row.name,
        description: row.description,
        category: row.category,
        is_active: row.is_active,
        created_at: parse_timestamp("created_at", &row.created_at)?,
    })
}
