use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::validation::*;

/// A kind of lab test, e.g. "Blood Test" or "Hormone Panel".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestType {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub category: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestTypeCreate {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
}

impl Validate for TestTypeCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks.max_len("name", &self.name, MAX_TEST_TYPE_NAME);
        checks.max_len("description", &self.description, MAX_TEST_TYPE_DESCRIPTION);
        checks.max_len("category", &self.category, MAX_CATEGORY);
        checks.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_defaults_to_empty() {
        let create: TestTypeCreate =
            parse_request(r#"{"name": "Hormone Panel", "category": "Hormone"}"#).unwrap();
        assert_eq!(create.description, "");
    }

    #[test]
    fn category_limits() {
        let mut create = TestTypeCreate {
            name: "Lipids".into(),
            description: String::new(),
            category: "c".repeat(MAX_CATEGORY),
        };
        assert!(create.validate().is_ok());
        create.category.push('c');
        assert_eq!(create.validate().unwrap_err().fields(), vec!["category"]);
    }

    #[test]
    fn missing_category_is_rejected() {
        assert!(parse_request::<TestTypeCreate>(r#"{"name": "Lipids"}"#).is_err());
    }
}
