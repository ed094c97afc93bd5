use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::TestStatus;
use super::user::{patch, patch_opt};
use super::validation::*;

/// Open-ended key/value data attached to a report.
pub type ExtraMetadata = serde_json::Map<String, serde_json::Value>;

/// One lab report: a sample taken on `test_date` for one user and test type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReport {
    pub id: i64,
    pub user_id: i64,
    pub test_type_id: i64,
    pub report_name: String,
    /// When the sample was taken, distinct from `created_at`.
    pub test_date: NaiveDateTime,
    pub lab_name: String,
    pub doctor_name: String,
    pub status: TestStatus,
    pub notes: String,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    pub extra_metadata: ExtraMetadata,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestReportCreate {
    pub user_id: i64,
    pub test_type_id: i64,
    pub report_name: String,
    pub test_date: NaiveDateTime,
    #[serde(default)]
    pub lab_name: String,
    #[serde(default)]
    pub doctor_name: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestReportUpdate {
    #[serde(default)]
    pub report_name: Option<String>,
    #[serde(default)]
    pub lab_name: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub status: Option<TestStatus>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Uploaded document reference. Handling of the file itself happens elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportAttachment {
    pub file_path: String,
    pub file_name: String,
}

impl Validate for TestReportCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks.max_len("report_name", &self.report_name, MAX_REPORT_NAME);
        checks.max_len("lab_name", &self.lab_name, MAX_LAB_NAME);
        checks.max_len("doctor_name", &self.doctor_name, MAX_DOCTOR_NAME);
        checks.max_len("notes", &self.notes, MAX_REPORT_NOTES);
        checks.finish()
    }
}

impl Validate for TestReportUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks.optional_max_len("report_name", self.report_name.as_deref(), MAX_REPORT_NAME);
        checks.optional_max_len("lab_name", self.lab_name.as_deref(), MAX_LAB_NAME);
        checks.optional_max_len("doctor_name", self.doctor_name.as_deref(), MAX_DOCTOR_NAME);
        checks.optional_max_len("notes", self.notes.as_deref(), MAX_REPORT_NOTES);
        checks.finish()
    }
}

impl Validate for ReportAttachment {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks.max_len("file_path", &self.file_path, MAX_FILE_PATH);
        checks.max_len("file_name", &self.file_name, MAX_FILE_NAME);
        checks.finish()
    }
}

impl TestReportUpdate {
    pub fn is_empty(&self) -> bool {
        self.report_name.is_none()
            && self.lab_name.is_none()
            && self.doctor_name.is_none()
            && self.status.is_none()
            && self.notes.is_none()
    }

    pub fn apply_to(&self, report: &mut TestReport) -> bool {
        let mut changed = false;
        changed |= patch(&mut report.report_name, &self.report_name);
        changed |= patch(&mut report.lab_name, &self.lab_name);
        changed |= patch(&mut report.doctor_name, &self.doctor_name);
        changed |= patch(&mut report.status, &self.status);
        changed |= patch(&mut report.notes, &self.notes);
        changed
    }
}

impl ReportAttachment {
    pub fn apply_to(&self, report: &mut TestReport) -> bool {
        let mut changed = false;
        changed |= patch_opt(&mut report.file_path, &Some(self.file_path.clone()));
        changed |= patch_opt(&mut report.file_name, &Some(self.file_name.clone()));
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_parses_with_defaults() {
        let create: TestReportCreate = parse_request(
            r#"{"user_id": 1, "test_type_id": 2, "report_name": "Annual panel",
                "test_date": "2024-03-05T08:30:00"}"#,
        )
        .unwrap();
        assert_eq!(create.lab_name, "");
        assert_eq!(create.doctor_name, "");
        assert_eq!(create.notes, "");
    }

    #[test]
    fn create_cannot_set_status() {
        let err = parse_request::<TestReportCreate>(
            r#"{"user_id": 1, "test_type_id": 2, "report_name": "x",
                "test_date": "2024-03-05T08:30:00", "status": "reviewed"}"#,
        )
        .unwrap_err();
        assert!(err.has_field("body"));
    }

    #[test]
    fn notes_limit_is_inclusive() {
        let mut update = TestReportUpdate {
            notes: Some("n".repeat(MAX_REPORT_NOTES)),
            ..Default::default()
        };
        assert!(update.validate().is_ok());
        update.notes = Some("n".repeat(MAX_REPORT_NOTES + 1));
        assert!(update.validate().unwrap_err().has_field("notes"));
    }

    #[test]
    fn update_rejects_unknown_status() {
        let err = parse_request::<TestReportUpdate>(r#"{"status": "archived"}"#).unwrap_err();
        assert!(err.to_string().contains("archived"));
    }

    #[test]
    fn attachment_limits() {
        let a = ReportAttachment {
            file_path: "p".repeat(MAX_FILE_PATH + 1),
            file_name: "f".repeat(MAX_FILE_NAME),
        };
        assert_eq!(a.validate().unwrap_err().fields(), vec!["file_path"]);
    }
}
