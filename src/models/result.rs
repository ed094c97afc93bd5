use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::decimal::Decimal3;
use super::user::{patch, patch_opt};
use super::validation::*;

/// One measured value of a parameter within a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub id: i64,
    pub test_report_id: i64,
    pub test_parameter_id: i64,
    pub value: Decimal3,
    /// Lab-provided; never derived here.
    pub is_abnormal: bool,
    /// Lab shorthand such as "H" or "LL".
    pub abnormal_flag: Option<String>,
    pub notes: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestResultCreate {
    pub test_report_id: i64,
    pub test_parameter_id: i64,
    pub value: Decimal3,
    #[serde(default)]
    pub is_abnormal: bool,
    #[serde(default)]
    pub abnormal_flag: Option<String>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestResultUpdate {
    #[serde(default)]
    pub value: Option<Decimal3>,
    #[serde(default)]
    pub is_abnormal: Option<bool>,
    #[serde(default)]
    pub abnormal_flag: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Validate for TestResultCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks.optional_max_len("abnormal_flag", self.abnormal_flag.as_deref(), MAX_ABNORMAL_FLAG);
        checks.max_len("notes", &self.notes, MAX_RESULT_NOTES);
        checks.finish()
    }
}

impl Validate for TestResultUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks.optional_max_len("abnormal_flag", self.abnormal_flag.as_deref(), MAX_ABNORMAL_FLAG);
        checks.optional_max_len("notes", self.notes.as_deref(), MAX_RESULT_NOTES);
        checks.finish()
    }
}

impl TestResultUpdate {
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.is_abnormal.is_none()
            && self.abnormal_flag.is_none()
            && self.notes.is_none()
    }

    pub fn apply_to(&self, result: &mut TestResult) -> bool {
        let mut changed = false;
        changed |= patch(&mut result.value, &self.value);
        changed |= patch(&mut result.is_abnormal, &self.is_abnormal);
        changed |= patch_opt(&mut result.abnormal_flag, &self.abnormal_flag);
        changed |= patch(&mut result.notes, &self.notes);
        changed
    }
}
