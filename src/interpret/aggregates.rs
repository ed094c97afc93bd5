use crate::models::{
    ReferenceRange, TestParameter, TestReport, TestReportSummary, TestResult, TestResultWithRange,
    TrendData, TrendPoint,
};

use super::status::{derive_status, Bounds};

/// Join one result with its parameter and the selected range.
pub fn result_with_range(
    result: &TestResult,
    parameter: &TestParameter,
    range: Option<&ReferenceRange>,
) -> TestResultWithRange {
    let bounds = Bounds::of(range);
    TestResultWithRange {
        result_id: result.id,
        parameter_name: parameter.name.clone(),
        parameter_code: parameter.code.clone(),
        unit: parameter.unit.clone(),
        value: result.value,
        is_abnormal: result.is_abnormal,
        abnormal_flag: result.abnormal_flag.clone(),
        reference_min: bounds.reference_min,
        reference_max: bounds.reference_max,
        optimal_min: bounds.optimal_min,
        optimal_max: bounds.optimal_max,
        status: derive_status(result.value, &bounds),
        notes: result.notes.clone(),
    }
}

/// Flagged by the lab, or outside the reference interval.
pub fn counts_as_abnormal(result: &TestResultWithRange) -> bool {
    result.is_abnormal || result.status.is_out_of_range()
}

pub fn summarize_report(
    report: &TestReport,
    test_type_name: &str,
    results: Vec<TestResultWithRange>,
) -> TestReportSummary {
    let abnormal_count = results.iter().filter(|r| counts_as_abnormal(r)).count();
    TestReportSummary {
        report_id: report.id,
        report_name: report.report_name.clone(),
        test_type_name: test_type_name.to_string(),
        test_date: report.test_date,
        lab_name: report.lab_name.clone(),
        status: report.status,
        total_parameters: results.len(),
        abnormal_count,
        normal_count: results.len() - abnormal_count,
        results,
    }
}

/// Points are sorted oldest first; equal dates keep their input order.
pub fn build_trend(
    parameter: &TestParameter,
    mut data_points: Vec<TrendPoint>,
    range: Option<&ReferenceRange>,
) -> TrendData {
    data_points.sort_by_key(|p| p.date);
    let bounds = Bounds::of(range);
    TrendData {
        parameter_name: parameter.name.clone(),
        parameter_code: parameter.code.clone(),
        unit: parameter.unit.clone(),
        data_points,
        reference_min: bounds.reference_min,
        reference_max: bounds.reference_max,
        optimal_min: bounds.optimal_min,
        optimal_max: bounds.optimal_max,
    }
}
