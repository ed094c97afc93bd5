//! Computed read views. Never persisted.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::decimal::Decimal3;
use super::enums::{ResultStatus, TestStatus};

/// One result joined with the reference range applicable to the report owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResultWithRange {
    pub result_id: i64,
    pub parameter_name: String,
    pub parameter_code: String,
    pub unit: String,
    pub value: Decimal3,
    pub is_abnormal: bool,
    pub abnormal_flag: Option<String>,
    pub reference_min: Option<Decimal3>,
    pub reference_max: Option<Decimal3>,
    pub optimal_min: Option<Decimal3>,
    pub optimal_max: Option<Decimal3>,
    pub status: ResultStatus,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestReportSummary {
    pub report_id: i64,
    pub report_name: String,
    pub test_type_name: String,
    pub test_date: NaiveDateTime,
    pub lab_name: String,
    pub status: TestStatus,
    pub total_parameters: usize,
    pub abnormal_count: usize,
    pub normal_count: usize,
    pub results: Vec<TestResultWithRange>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDateTime,
    pub value: Decimal3,
    pub is_abnormal: bool,
}

/// Values of one parameter across a user's reports, oldest first, with the
/// bounds needed to draw reference and optimal bands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendData {
    pub parameter_name: String,
    pub parameter_code: String,
    pub unit: String,
    pub data_points: Vec<TrendPoint>,
    pub reference_min: Option<Decimal3>,
    pub reference_max: Option<Decimal3>,
    pub optimal_min: Option<Decimal3>,
    pub optimal_max: Option<Decimal3>,
}
