use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::decimal::Decimal3;
use super::enums::{AgeGroup, Gender};
use super::validation::*;

/// Normal interval for a parameter, optionally narrowed by demographics.
///
/// `gender` / `age_group` of `None` mean the range applies to everyone.
/// Several ranges per parameter may coexist; see
/// [`crate::interpret::select_reference_range`] for how one is chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub id: i64,
    pub test_parameter_id: i64,
    pub gender: Option<Gender>,
    pub age_group: Option<AgeGroup>,
    pub min_age: Option<i32>,
    pub max_age: Option<i32>,
    pub min_value: Option<Decimal3>,
    pub max_value: Option<Decimal3>,
    pub optimal_min: Option<Decimal3>,
    pub optimal_max: Option<Decimal3>,
    pub notes: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReferenceRangeCreate {
    pub test_parameter_id: i64,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub age_group: Option<AgeGroup>,
    #[serde(default)]
    pub min_age: Option<i32>,
    #[serde(default)]
    pub max_age: Option<i32>,
    #[serde(default)]
    pub min_value: Option<Decimal3>,
    #[serde(default)]
    pub max_value: Option<Decimal3>,
    #[serde(default)]
    pub optimal_min: Option<Decimal3>,
    #[serde(default)]
    pub optimal_max: Option<Decimal3>,
    #[serde(default)]
    pub notes: String,
}

impl ReferenceRangeCreate {
    /// A range with no demographic filter and the given bounds.
    pub fn universal(test_parameter_id: i64, min: Option<Decimal3>, max: Option<Decimal3>) -> Self {
        Self {
            test_parameter_id,
            gender: None,
            age_group: None,
            min_age: None,
            max_age: None,
            min_value: min,
            max_value: max,
            optimal_min: None,
            optimal_max: None,
            notes: String::new(),
        }
    }
}

impl Validate for ReferenceRangeCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks.non_negative("min_age", self.min_age);
        checks.non_negative("max_age", self.max_age);
        checks.ordered("min_age", self.min_age, "max_age", self.max_age);
        checks.ordered("min_value", self.min_value, "max_value", self.max_value);
        checks.ordered("optimal_min", self.optimal_min, "optimal_max", self.optimal_max);
        checks.within(
            "optimal_min",
            self.optimal_min,
            "min_value",
            self.min_value,
            "max_value",
            self.max_value,
        );
        checks.within(
            "optimal_max",
            self.optimal_max,
            "min_value",
            self.min_value,
            "max_value",
            self.max_value,
        );
        checks.max_len("notes", &self.notes, MAX_RANGE_NOTES);
        checks.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Option<Decimal3> {
        Some(s.parse().unwrap())
    }

    #[test]
    fn universal_range_is_valid() {
        assert!(ReferenceRangeCreate::universal(1, d("300"), d("1000")).validate().is_ok());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut r = ReferenceRangeCreate::universal(1, d("10"), d("5"));
        r.min_age = Some(-1);
        let err = r.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["min_age", "max_value"]);

        let mut r = ReferenceRangeCreate::universal(1, d("0"), d("100"));
        r.optimal_min = d("8");
        r.optimal_max = d("7");
        assert_eq!(r.validate().unwrap_err().fields(), vec!["optimal_max"]);
    }

    #[test]
    fn optimal_band_must_sit_inside_reference_range() {
        let mut r = ReferenceRangeCreate::universal(1, d("300"), d("1000"));
        r.optimal_min = d("250");
        r.optimal_max = d("1200");
        let err = r.validate().unwrap_err();
        assert_eq!(err.fields(), vec!["optimal_min", "optimal_max"]);

        r.optimal_min = d("300");
        r.optimal_max = d("1000");
        assert!(r.validate().is_ok());

        r.min_value = None;
        r.optimal_min = d("10");
        assert!(r.validate().is_ok());
    }

    #[test]
    fn parses_decimal_bounds_from_json() {
        let r: ReferenceRangeCreate = parse_request(
            r#"{"test_parameter_id": 3, "gender": "male", "age_group": "adult",
                "min_value": 264, "max_value": "916.5", "notes": "fasting"}"#,
        )
        .unwrap();
        assert_eq!(r.gender, Some(Gender::Male));
        assert_eq!(r.age_group, Some(AgeGroup::Adult));
        assert_eq!(r.max_value.unwrap().to_string(), "916.500");
    }

    #[test]
    fn unknown_age_group_is_rejected() {
        let err = parse_request::<ReferenceRangeCreate>(
            r#"{"test_parameter_id": 3, "age_group": "infant"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("infant"));
    }
}
