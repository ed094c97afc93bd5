use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{
    format_timestamp, not_found, now_timestamp, parse_enum, parse_timestamp, DatabaseError,
};
use crate::models::*;

const REPORT_COLUMNS: &str = "id, user_id, test_type_id, report_name, test_date, lab_name,
    doctor_name, status, notes, file_path, file_name, extra_metadata, created_at, updated_at";

/// Insert a report with status `pending` and empty metadata.
/// Unknown user or test type fails with `ReferentialIntegrity`.
pub fn insert_test_report(
    conn: &Connection,
    create: &TestReportCreate,
) -> Result<TestReport, DatabaseError> {
    create.validate()?;
    conn.execute(
        "INSERT INTO test_reports (user_id, test_type_id, report_name, test_date, lab_name,
         doctor_name, status, notes, extra_metadata, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, '{}', ?9)",
        params![
            create.user_id,
            create.test_type_id,
            create.report_name,
            format_timestamp(&create.test_date),
            create.lab_name,
            create.doctor_name,
            TestStatus::default().as_str(),
            create.notes,
            now_timestamp(),
        ],
    )?;

    let id = conn.last_insert_rowid();
    tracing::info!(report_id = id, user_id = create.user_id, "Test report created");
    get_test_report(conn, id)?.ok_or_else(|| not_found("test_report", id))
}

pub fn get_test_report(conn: &Connection, id: i64) -> Result<Option<TestReport>, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {REPORT_COLUMNS} FROM test_reports WHERE id = ?1"),
            params![id],
            report_row_from_rusqlite,
        )
        .optional()?;
    row.map(report_from_row).transpose()
}

/// Reports matching every set filter, newest test date first.
pub fn list_test_reports(
    conn: &Connection,
    filter: &ReportFilter,
) -> Result<Vec<TestReport>, DatabaseError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {REPORT_COLUMNS} FROM test_reports
         WHERE (?1 IS NULL OR user_id = ?1)
           AND (?2 IS NULL OR test_type_id = ?2)
           AND (?3 IS NULL OR status = ?3)
           AND (?4 IS NULL OR test_date >= ?4)
           AND (?5 IS NULL OR test_date <= ?5)
         ORDER BY test_date DESC, id DESC"
    ))?;
    let rows = stmt.query_map(
        params![
            filter.user_id,
            filter.test_type_id,
            filter.status.map(|s| s.as_str()),
            filter.date_from.as_ref().map(format_timestamp),
            filter.date_to.as_ref().map(format_timestamp),
        ],
        report_row_from_rusqlite,
    )?;

    let mut reports = Vec::new();
    for row in rows {
        reports.push(report_from_row(row?)?);
    }
    Ok(reports)
}

/// Apply a patch; empty or no-op patches perform no write.
pub fn update_test_report(
    conn: &Connection,
    id: i64,
    update: &TestReportUpdate,
) -> Result<TestReport, DatabaseError> {
    update.validate()?;
    let mut report = get_test_report(conn, id)?.ok_or_else(|| not_found("test_report", id))?;
    if update.is_empty() || !update.apply_to(&mut report) {
        return Ok(report);
    }

    conn.execute(
        "UPDATE test_reports SET report_name = ?2, lab_name = ?3, doctor_name = ?4,
         status = ?5, notes = ?6, updated_at = ?7 WHERE id = ?1",
        params![
            id,
            report.report_name,
            report.lab_name,
            report.doctor_name,
            report.status.as_str(),
            report.notes,
            now_timestamp(),
        ],
    )?;

    tracing::info!(report_id = id, status = %report.status, "Test report updated");
    get_test_report(conn, id)?.ok_or_else(|| not_found("test_report", id))
}

/// Record where the uploaded document for a report lives.
pub fn attach_report_file(
    conn: &Connection,
    id: i64,
    attachment: &ReportAttachment,
) -> Result<TestReport, DatabaseError> {
    attachment.validate()?;
    let mut report = get_test_report(conn, id)?.ok_or_else(|| not_found("test_report", id))?;
    if !attachment.apply_to(&mut report) {
        return Ok(report);
    }

    conn.execute(
        "UPDATE test_reports SET file_path = ?2, file_name = ?3, updated_at = ?4 WHERE id = ?1",
        params![id, attachment.file_path, attachment.file_name, now_timestamp()],
    )?;

    tracing::info!(report_id = id, "Report file attached");
    get_test_report(conn, id)?.ok_or_else(|| not_found("test_report", id))
}

/// Replace the report's metadata map wholesale. An identical map is not
/// written.
pub fn set_report_metadata(
    conn: &Connection,
    id: i64,
    metadata: &ExtraMetadata,
) -> Result<TestReport, DatabaseError> {
    let report = get_test_report(conn, id)?.ok_or_else(|| not_found("test_report", id))?;
    if report.extra_metadata == *metadata {
        return Ok(report);
    }

    let encoded = serde_json::to_string(metadata)?;
    conn.execute(
        "UPDATE test_reports SET extra_metadata = ?2, updated_at = ?3 WHERE id = ?1",
        params![id, encoded, now_timestamp()],
    )?;

    tracing::debug!(report_id = id, keys = metadata.len(), "Report metadata replaced");
    get_test_report(conn, id)?.ok_or_else(|| not_found("test_report", id))
}

struct ReportRow {
    id: i64,
    user_id: i64,
    test_type_id: i64,
    report_name: String,
    test_date: String,
    lab_name: String,
    doctor_name: String,
    status: String,
    notes: String,
    file_path: Option<String>,
    file_name: Option<String>,
    extra_metadata: String,
    created_at: String,
    updated_at: Option<String>,
}

fn report_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ReportRow, rusqlite::Error> {
    Ok(ReportRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        test_type_id: row.get(2)?,
        report_name: row.get(3)?,
        test_date: row.get(4)?,
        lab_name: row.get(5)?,
        doctor_name: row.get(6)?,
        status: row.get(7)?,
        notes: row.get(8)?,
        file_path: row.get(9)?,
        file_name: row.get(10)?,
        extra_metadata: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn report_from_row(row: ReportRow) -> Result<TestReport, DatabaseError> {
    Ok(TestReport {
        id: row.id,
        user_id: row.user_id,
        test_type_id: row.test_type_id,
        report_name: row.report_name,
        test_date: parse_timestamp("test_date", &row.test_date)?,
        lab_name: row.lab_name,
        doctor_name: row.doctor_name,
        status: parse_enum("status", &row.status)?,
        notes: row.notes,
        file_path: row.file_path,
        file_name: row.file_name,
        extra_metadata: serde_json::from_str(&row.extra_metadata)?,
        created_at: parse_timestamp("created_at", &row.created_at)?,
        updated_at: row
            .updated_at
            .map(|s| parse_timestamp("updated_at", &s))
            .transpose()?,
    })
}
