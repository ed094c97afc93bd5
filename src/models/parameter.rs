use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::validation::*;

/// A measurable quantity within a test type, e.g. Testosterone in ng/dL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestParameter {
    pub id: i64,
    pub test_type_id: i64,
    pub name: String,
    pub code: String,
    pub unit: String,
    pub description: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestParameterCreate {
    pub test_type_id: i64,
    pub name: String,
    pub code: String,
    pub unit: String,
    #[serde(default)]
    pub description: String,
}

impl Validate for TestParameterCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks.max_len("name", &self.name, MAX_PARAMETER_NAME);
        checks.max_len("code", &self.code, MAX_PARAMETER_CODE);
        checks.max_len("unit", &self.unit, MAX_UNIT);
        checks.max_len("description", &self.description, MAX_PARAMETER_DESCRIPTION);
        checks.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create() -> TestParameterCreate {
        TestParameterCreate {
            test_type_id: 1,
            name: "Hemoglobin".into(),
            code: "HGB".into(),
            unit: "g/dL".into(),
            description: String::new(),
        }
    }

    #[test]
    fn code_and_unit_at_limit_pass() {
        let mut p = create();
        p.code = "C".repeat(MAX_PARAMETER_CODE);
        p.unit = "u".repeat(MAX_UNIT);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn every_oversized_field_is_reported() {
        let mut p = create();
        p.code = "C".repeat(MAX_PARAMETER_CODE + 1);
        p.unit = "u".repeat(MAX_UNIT + 1);
        p.description = "d".repeat(MAX_PARAMETER_DESCRIPTION + 1);
        assert_eq!(
            p.validate().unwrap_err().fields(),
            vec!["code", "unit", "description"]
        );
    }
}
