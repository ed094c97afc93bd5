use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{not_found, now_timestamp, parse_enum, parse_timestamp, DatabaseError};
use crate::models::*;

const RANGE_COLUMNS: &str = "id, test_parameter_id, gender, age_group, min_age, max_age,
    min_value, max_value, optimal_min, optimal_max, notes, is_active, created_at";

pub fn insert_reference_range(
    conn: &Connection,
    create: &ReferenceRangeCreate,
) -> Result<ReferenceRange, DatabaseError> {
    create.validate()?;
    conn.execute(
        "INSERT INTO reference_ranges (test_parameter_id, gender, age_group, min_age, max_age,
         min_value, max_value, optimal_min, optimal_max, notes, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1, ?11)",
        params![
            create.test_parameter_id,
            create.gender.map(|g| g.as_str()),
            create.age_group.map(|a| a.as_str()),
            create.min_age,
            create.max_age,
            create.min_value.map(Decimal3::thousandths),
            create.max_value.map(Decimal3::thousandths),
            create.optimal_min.map(Decimal3::thousandths),
            create.optimal_max.map(Decimal3::thousandths),
            create.notes,
            now_timestamp(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    tracing::info!(
        range_id = id,
        parameter_id = create.test_parameter_id,
        "Reference range created"
    );
    get_reference_range(conn, id)?.ok_or_else(|| not_found("reference_range", id))
}

pub fn get_reference_range(
    conn: &Connection,
    id: i64,
) -> Result<Option<ReferenceRange>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {RANGE_COLUMNS} FROM reference_ranges WHERE id = ?1"),
            params![id],
            range_row_from_rusqlite,
        )
        .optional()?;
    row.map(range_from_row).transpose()
}

/// Ranges of one parameter ordered by id, so selection ties resolve stably.
pub fn list_reference_ranges(
    conn: &Connection,
    test_parameter_id: i64,
    active_only: bool,
) -> Result<Vec<ReferenceRange>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RANGE_COLUMNS} FROM reference_ranges
         WHERE test_parameter_id = ?1 AND (?2 = 0 OR is_active = 1) ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![test_parameter_id, active_only], range_row_from_rusqlite)?;

    let mut ranges = Vec::new();
    for row in rows {
        ranges.push(range_from_row(row?)?);
    }
    Ok(ranges)
}

pub fn deactivate_reference_range(conn: &Connection, id: i64) -> Result<(), DatabaseError> {
    let rows = conn.execute(
        "UPDATE reference_ranges SET is_active = 0 WHERE id = ?1",
        params![id],
    )?;
    if rows == 0 {
        return Err(not_found("reference_range", id));
    }
    tracing::info!(range_id = id, "Reference range deactivated");
    Ok(())
}

struct RangeRow {
    id: i64,
    test_parameter_id: i64,
    gender: Option<String>,
    age_group: Option<String>,
    min_age: Option<i32>,
    max_age: Option<i32>,
    min_value: Option<i64>,
    max_value: Option<i64>,
    optimal_min: Option<i64>,
    optimal_max: Option<i64>,
    notes: String,
    is_active: bool,
    created_at: String,
}

fn range_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<RangeRow, rusqlite::Error> {
    Ok(RangeRow {
        id: row.get(0)?,
        test_parameter_id: row.get(1)?,
        gender: row.get(2)?,
        age_group: row.get(3)?,
        min_age: row.get(4)?,
        max_age: row.get(5)?,
        min_value: row.get(6)?,
        max_value: row.get(7)?,
        optimal_min: row.get(8)?,
        optimal_max: row.get(9)?,
        notes: row.get(10)?,
        is_active: row.get(11)?,
        created_at: row.get(12)?,
    })
}

fn range_from_row(row: RangeRow) -> Result<ReferenceRange, DatabaseError> {
    Ok(ReferenceRange {
        id: row.id,
        test_parameter_id: row.test_parameter_id,
        gender: row
            .gender
            .as_deref()
            .map(|g| parse_enum::<Gender>("gender", g))
            .transpose()?,
        age_group: row
            .age_group
            .as_deref()
            .map(|a| parse_enum::<AgeGroup>("age_group", a))
            .transpose()?,
        min_age: row.min_age,
        max_age: row.max_age,
        min_value: row.min_value.map(Decimal3::from_thousandths),
        max_value: row.max_value.map(Decimal3::from_thousandths),
        optimal_min: row.optimal_min.map(Decimal3::from_thousandths),
        optimal_max: row.optimal_max.map(Decimal3::from_thousandths),
        notes: row.notes,
        is_active: row.is_active,
        created_at: parse_timestamp("created_at", &row.created_at)?,
    })
}
