//! Read views joining results with the reference range that applies to the
//! report owner at test time.

use std::collections::HashMap;

use rusqlite::{params, Connection};

use crate::db::{parse_timestamp, DatabaseError};
use crate::interpret::{
    build_trend, result_with_range, select_reference_range, summarize_report, Demographics,
};
use crate::models::*;

use super::reference_range::list_reference_ranges;
use super::test_parameter::get_test_parameter;
use super::test_report::get_test_report;
use super::test_result::{get_test_result, list_results_for_report};
use super::test_type::get_test_type;
use super::user::get_user;

/// One result with its applicable range and derived status.
pub fn get_result_with_range(
    conn: &Connection,
    result_id: i64,
) -> Result<Option<TestResultWithRange>, DatabaseError> {
    let Some(result) = get_test_result(conn, result_id)? else {
        return Ok(None);
    };
    let report = require(
        get_test_report(conn, result.test_report_id)?,
        "test_report",
        result.test_report_id,
    )?;
    let who = demographics_for(conn, &report)?;
    let parameter = require(
        get_test_parameter(conn, result.test_parameter_id)?,
        "test_parameter",
        result.test_parameter_id,
    )?;
    let ranges = list_reference_ranges(conn, parameter.id, true)?;
    let range = select_reference_range(&ranges, &who);
    Ok(Some(result_with_range(&result, &parameter, range)))
}

/// Counts and per-result detail for one report.
pub fn get_report_summary(
    conn: &Connection,
    report_id: i64,
) -> Result<Option<TestReportSummary>, DatabaseError> {
    let Some(report) = get_test_report(conn, report_id)? else {
        return Ok(None);
    };
    let test_type = require(
        get_test_type(conn, report.test_type_id)?,
        "test_type",
        report.test_type_id,
    )?;
    let who = demographics_for(conn, &report)?;

    let mut lookups: HashMap<i64, (TestParameter, Vec<ReferenceRange>)> = HashMap::new();
    let mut joined = Vec::new();
    for result in list_results_for_report(conn, report_id)? {
        let pid = result.test_parameter_id;
        if !lookups.contains_key(&pid) {
            let parameter = require(get_test_parameter(conn, pid)?, "test_parameter", pid)?;
            let ranges = list_reference_ranges(conn, pid, true)?;
            lookups.insert(pid, (parameter, ranges));
        }
        let (parameter, ranges) = &lookups[&pid];
        let range = select_reference_range(ranges, &who);
        joined.push(result_with_range(&result, parameter, range));
    }

    let summary = summarize_report(&report, &test_type.name, joined);
    tracing::debug!(
        report_id,
        total = summary.total_parameters,
        abnormal = summary.abnormal_count,
        "Report summary assembled"
    );
    Ok(Some(summary))
}

/// A parameter's values across all of a user's reports, oldest first.
///
/// Bounds come from the range applicable at the most recent point, or at
/// the current date when the user has no results yet.
pub fn get_parameter_trend(
    conn: &Connection,
    user_id: i64,
    test_parameter_id: i64,
) -> Result<Option<TrendData>, DatabaseError> {
    let Some(parameter) = get_test_parameter(conn, test_parameter_id)? else {
        return Ok(None);
    };
    let Some(user) = get_user(conn, user_id)? else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT p.test_date, r.value, r.is_abnormal
         FROM test_results r
         JOIN test_reports p ON p.id = r.test_report_id
         WHERE p.user_id = ?1 AND r.test_parameter_id = ?2
         ORDER BY p.test_date ASC, r.id ASC",
    )?;
    let rows = stmt.query_map(params![user_id, test_parameter_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, i64>(1)?,
            row.get::<_, bool>(2)?,
        ))
    })?;

    let mut points = Vec::new();
    for row in rows {
        let (date, value, is_abnormal) = row?;
        points.push(TrendPoint {
            date: parse_timestamp("test_date", &date)?,
            value: Decimal3::from_thousandths(value),
            is_abnormal,
        });
    }

    let as_of = points
        .last()
        .map(|p| p.date)
        .unwrap_or_else(|| chrono::Utc::now().naive_utc());
    let ranges = list_reference_ranges(conn, test_parameter_id, true)?;
    let range = select_reference_range(&ranges, &Demographics::of(&user, as_of));

    Ok(Some(build_trend(&parameter, points, range)))
}

fn demographics_for(conn: &Connection, report: &TestReport) -> Result<Demographics, DatabaseError> {
    let user = require(get_user(conn, report.user_id)?, "user", report.user_id)?;
    Ok(Demographics::of(&user, report.test_date))
}

fn require<T>(value: Option<T>, entity_type: &str, id: i64) -> Result<T, DatabaseError> {
    value.ok_or_else(|| crate::db::not_found(entity_type, id))
}
