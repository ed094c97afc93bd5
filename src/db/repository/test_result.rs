use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{not_found, now_timestamp, parse_timestamp, DatabaseError};
use crate::models::*;

const RESULT_COLUMNS: &str = "id, test_report_id, test_parameter_id, value, is_abnormal,
    abnormal_flag, notes, created_at";

/// Insert a result after checking that its parameter belongs to the same
/// test type as its report.
pub fn insert_test_result(
    conn: &Connection,
    create: &TestResultCreate,
) -> Result<TestResult, DatabaseError> {
    create.validate()?;
    ensure_parameter_matches_report(conn, create.test_parameter_id, create.test_report_id)?;

    conn.execute(
        "INSERT INTO test_results (test_report_id, test_parameter_id, value, is_abnormal,
         abnormal_flag, notes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            create.test_report_id,
            create.test_parameter_id,
            create.value.thousandths(),
            create.is_abnormal,
            create.abnormal_flag,
            create.notes,
            now_timestamp(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    tracing::debug!(result_id = id, report_id = create.test_report_id, "Test result recorded");
    get_test_result(conn, id)?.ok_or_else(|| not_found("test_result", id))
}

fn ensure_parameter_matches_report(
    conn: &Connection,
    parameter_id: i64,
    report_id: i64,
) -> Result<(), DatabaseError> {
    let report_type: Option<i64> = conn
        .query_row(
            "SELECT test_type_id FROM test_reports WHERE id = ?1",
            params![report_id],
            |row| row.get(0),
        )
        .optional()?;
    let parameter_type: Option<i64> = conn
        .query_row(
            "SELECT test_type_id FROM test_parameters WHERE id = ?1",
            params![parameter_id],
            |row| row.get(0),
        )
        .optional()?;

    match (report_type, parameter_type) {
        (None, _) => Err(DatabaseError::ReferentialIntegrity(format!(
            "test_report {report_id} does not exist"
        ))),
        (_, None) => Err(DatabaseError::ReferentialIntegrity(format!(
            "test_parameter {parameter_id} does not exist"
        ))),
        (Some(r), Some(p)) if r != p => {
            tracing::warn!(
                parameter_id,
                report_id,
                "Rejected result for parameter of another test type"
            );
            Err(DatabaseError::ParameterTypeMismatch {
                parameter_id,
                report_id,
            })
        }
        _ => Ok(()),
    }
}

pub fn get_test_result(conn: &Connection, id: i64) -> Result<Option<TestResult>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {RESULT_COLUMNS} FROM test_results WHERE id = ?1"),
            params![id],
            result_row_from_rusqlite,
        )
        .optional()?;
    row.map(result_from_row).transpose()
}

pub fn list_results_for_report(
    conn: &Connection,
    test_report_id: i64,
) -> Result<Vec<TestResult>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESULT_COLUMNS} FROM test_results WHERE test_report_id = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![test_report_id], result_row_from_rusqlite)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(result_from_row(row?)?);
    }
    Ok(results)
}

/// Every result recorded against a parameter, active or not.
pub fn list_results_for_parameter(
    conn: &Connection,
    test_parameter_id: i64,
) -> Result<Vec<TestResult>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {RESULT_COLUMNS} FROM test_results WHERE test_parameter_id = ?1 ORDER BY id"
    ))?;
    let rows = stmt.query_map(params![test_parameter_id], result_row_from_rusqlite)?;

    let mut results = Vec::new();
    for row in rows {
        results.push(result_from_row(row?)?);
    }
    Ok(results)
}

/// Apply a patch; empty or no-op patches perform no write.
pub fn update_test_result(
    conn: &Connection,
    id: i64,
    update: &TestResultUpdate,
) -> Result<TestResult, DatabaseError> {
    update.validate()?;
    let mut result = get_test_result(conn, id)?.ok_or_else(|| not_found("test_result", id))?;
    if update.is_empty() || !update.apply_to(&mut result) {
        return Ok(result);
    }

    conn.execute(
        "UPDATE test_results SET value = ?2, is_abnormal = ?3, abnormal_flag = ?4, notes = ?5
         WHERE id = ?1",
        params![
            id,
            result.value.thousandths(),
            result.is_abnormal,
            result.abnormal_flag,
            result.notes,
        ],
    )?;

    tracing::debug!(result_id = id, "Test result updated");
    Ok(result)
}

struct ResultRow {
    id: i64,
    test_report_id: i64,
    test_parameter_id: i64,
    value: i64,
    is_abnormal: bool,
    abnormal_flag: Option<String>,
    notes: String,
    created_at: String,
}

fn result_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ResultRow, rusqlite::Error> {
    Ok(ResultRow {
        id: row.get(0)?,
        test_report_id: row.get(1)?,
        test_parameter_id: row.get(2)?,
        value: row.get(3)?,
        is_abnormal: row.get(4)?,
        abnormal_flag: row.get(5)?,
        notes: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn result_from_row(row: ResultRow) -> Result<TestResult, DatabaseError> {
    Ok(TestResult {
        id: row.id,
        test_report_id: row.test_report_id,
        test_parameter_id: row.test_parameter_id,
        value: Decimal3::from_thousandths(row.value),
        is_abnormal: row.is_abnormal,
        abnormal_flag: row.abnormal_flag,
        notes: row.notes,
        created_at: parse_timestamp("created_at", &row.created_at)?,
    })
}
