pub mod sqlite;
pub mod repository;

pub use sqlite::*;
pub use repository::*;

use std::str::FromStr;

use chrono::{NaiveDateTime, SubsecRound, Utc};
use rusqlite::ErrorCode;
use thiserror::Error;

use crate::models::ValidationError;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid enum value for {field}: {value}")]
    InvalidEnum { field: String, value: String },

    #[error("Migration failed at version {version}: {reason}")]
    MigrationFailed { version: i64, reason: String },

    #[error("Constraint violated: {0}")]
    ConstraintViolation(String),

    #[error("Stored {field} is not a valid timestamp: {value}")]
    InvalidTimestamp { field: String, value: String },

    #[error("Duplicate {entity} {field}: {value}")]
    UniquenessViolation {
        entity: String,
        field: String,
        value: String,
    },

    #[error("Referential integrity: {0}")]
    ReferentialIntegrity(String),

    #[error("Parameter {parameter_id} does not belong to the test type of report {report_id}")]
    ParameterTypeMismatch { parameter_id: i64, report_id: i64 },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Metadata encoding error: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(f, msg)
                if f.code == ErrorCode::ConstraintViolation
                    && f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY =>
            {
                Self::ReferentialIntegrity(
                    msg.clone().unwrap_or_else(|| "FOREIGN KEY constraint failed".into()),
                )
            }
            rusqlite::Error::SqliteFailure(f, msg)
                if f.code == ErrorCode::ConstraintViolation
                    && f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_CHECK =>
            {
                Self::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| "CHECK constraint failed".into()),
                )
            }
            _ => Self::Sqlite(err),
        }
    }
}

/// Turn a UNIQUE failure on `entity.field` into `UniquenessViolation`.
pub(crate) fn unique_or(
    err: rusqlite::Error,
    entity: &str,
    field: &str,
    value: &str,
) -> DatabaseError {
    if let rusqlite::Error::SqliteFailure(f, _) = &err {
        if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
            return DatabaseError::UniquenessViolation {
                entity: entity.into(),
                field: field.into(),
                value: value.into(),
            };
        }
    }
    DatabaseError::from(err)
}

/// Fraction digits appear only when non-zero (3, 6 or 9 of them), so
/// stored values still compare correctly as text.
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(field: &str, raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|_| DatabaseError::InvalidTimestamp {
            field: field.into(),
            value: raw.into(),
        })
}

/// Current UTC time truncated to whole seconds.
pub(crate) fn now_timestamp() -> String {
    format_timestamp(&Utc::now().naive_utc().trunc_subsecs(0))
}

/// Decode a stored enum string; bad data surfaces as `InvalidEnum`.
pub(crate) fn parse_enum<T: FromStr>(field: &str, raw: &str) -> Result<T, DatabaseError> {
    raw.parse().map_err(|_| DatabaseError::InvalidEnum {
        field: field.into(),
        value: raw.into(),
    })
}

pub(crate) fn not_found(entity_type: &str, id: i64) -> DatabaseError {
    DatabaseError::NotFound {
        entity_type: entity_type.into(),
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, milli: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_milli_opt(h, m, s, milli)
            .unwrap()
    }

    #[test]
    fn timestamps_keep_subseconds() {
        let ts = at(8, 30, 0, 750);
        assert_eq!(format_timestamp(&ts), "2024-03-05 08:30:00.750");
        assert_eq!(parse_timestamp("test_date", "2024-03-05 08:30:00.750").unwrap(), ts);
    }

    #[test]
    fn whole_second_timestamps_have_no_fraction() {
        let ts = at(8, 30, 0, 0);
        assert_eq!(format_timestamp(&ts), "2024-03-05 08:30:00");
        assert_eq!(parse_timestamp("created_at", "2024-03-05 08:30:00").unwrap(), ts);
        assert!(!now_timestamp().contains('.'));
    }

    #[test]
    fn stored_text_sorts_chronologically() {
        let stamps = [at(8, 30, 0, 0), at(8, 30, 0, 5), at(8, 30, 0, 750), at(8, 30, 1, 0)];
        let text: Vec<String> = stamps.iter().map(format_timestamp).collect();
        let mut sorted = text.clone();
        sorted.sort();
        assert_eq!(sorted, text);
    }

    #[test]
    fn malformed_timestamp_is_reported_with_field() {
        let err = parse_timestamp("created_at", "yesterday").unwrap_err();
        assert!(matches!(
            err,
            DatabaseError::InvalidTimestamp { ref field, ref value }
                if field == "created_at" && value == "yesterday"
        ));
    }

    #[test]
    fn check_failure_is_constraint_violation() {
        let conn = sqlite::open_memory_database().unwrap();
        let err = conn
            .execute(
                "INSERT INTO users (name, email, gender, created_at)
                 VALUES ('Sam', 'sam@example.com', 'robot', '2024-01-01 00:00:00')",
                [],
            )
            .unwrap_err();
        assert!(matches!(DatabaseError::from(err), DatabaseError::ConstraintViolation(_)));
    }
}
