use chrono::NaiveDateTime;

use super::enums::TestStatus;

#[derive(Debug, Default)]
pub struct ReportFilter {
    pub user_id: Option<i64>,
    pub test_type_id: Option<i64>,
    pub status: Option<TestStatus>,
    pub date_from: Option<NaiveDateTime>,
    pub date_to: Option<NaiveDateTime>,
}
