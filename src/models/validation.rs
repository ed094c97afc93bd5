//! Structural validation for entity and transfer schemas.
//!
//! Every `*Create` / `*Update` schema implements [`Validate`]. Checks collect
//! all offending fields before failing so the caller sees the full list in
//! one [`ValidationError`].

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

pub const MAX_USER_NAME: usize = 100;
pub const MAX_EMAIL: usize = 255;
pub const MAX_TEST_TYPE_NAME: usize = 100;
pub const MAX_TEST_TYPE_DESCRIPTION: usize = 500;
pub const MAX_CATEGORY: usize = 50;
pub const MAX_PARAMETER_NAME: usize = 100;
pub const MAX_PARAMETER_CODE: usize = 20;
pub const MAX_UNIT: usize = 20;
pub const MAX_PARAMETER_DESCRIPTION: usize = 300;
pub const MAX_RANGE_NOTES: usize = 300;
pub const MAX_REPORT_NAME: usize = 200;
pub const MAX_LAB_NAME: usize = 100;
pub const MAX_DOCTOR_NAME: usize = 100;
pub const MAX_REPORT_NOTES: usize = 1000;
pub const MAX_FILE_PATH: usize = 500;
pub const MAX_FILE_NAME: usize = 255;
pub const MAX_ABNORMAL_FLAG: usize = 10;
pub const MAX_RESULT_NOTES: usize = 300;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+$").expect("email pattern compiles")
});

/// One offending field and what is wrong with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// Schema validation failure listing every offending field.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Schema validation failed: {}", DisplayFields(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

struct DisplayFields<'a>(&'a [FieldError]);

impl fmt::Display for DisplayFields<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl ValidationError {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn invalid_enum(field: &str, value: &str, allowed: &[&str]) -> Self {
        Self::single(
            field,
            format!("invalid value '{value}', expected one of: {}", allowed.join(", ")),
        )
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }
}

/// Structural validation of a schema instance. Never touches storage.
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Deserialize a request body and validate it.
///
/// Malformed JSON, unknown fields and out-of-set enum values are reported
/// against the pseudo-field `body`, since serde does not name the field.
pub fn parse_request<T>(json: &str) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let value: T =
        serde_json::from_str(json).map_err(|e| ValidationError::single("body", e.to_string()))?;
    value.validate()?;
    Ok(value)
}

/// Accumulates field errors for one schema.
#[derive(Debug, Default)]
pub struct FieldChecks {
    errors: Vec<FieldError>,
}

impl FieldChecks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// At most `max` characters. Presence is enforced by deserialization.
    pub fn max_len(&mut self, field: &str, value: &str, max: usize) {
        let len = value.chars().count();
        if len > max {
            self.fail(field, format!("length {len} exceeds maximum of {max}"));
        }
    }

    pub fn optional_max_len(&mut self, field: &str, value: Option<&str>, max: usize) {
        if let Some(v) = value {
            self.max_len(field, v, max);
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        let len = value.chars().count();
        if len > MAX_EMAIL {
            self.fail(field, format!("length {len} exceeds maximum of {MAX_EMAIL}"));
        } else if !EMAIL_PATTERN.is_match(value) {
            self.fail(field, "not a valid email address");
        }
    }

    pub fn non_negative(&mut self, field: &str, value: Option<i32>) {
        if let Some(v) = value {
            if v < 0 {
                self.fail(field, format!("must not be negative, got {v}"));
            }
        }
    }

    /// Both bounds present implies `low <= high`. Reported against `high_field`.
    pub fn ordered<T>(&mut self, low_field: &str, low: Option<T>, high_field: &str, high: Option<T>)
    where
        T: PartialOrd + fmt::Display,
    {
        if let (Some(lo), Some(hi)) = (low, high) {
            if lo > hi {
                self.fail(
                    high_field,
                    format!("{high_field} ({hi}) is below {low_field} ({lo})"),
                );
            }
        }
    }

    /// `value` must lie inside whichever of `low`/`high` are present.
    /// Reported against `field`.
    pub fn within<T>(
        &mut self,
        field: &str,
        value: Option<T>,
        low_field: &str,
        low: Option<T>,
        high_field: &str,
        high: Option<T>,
    ) where
        T: PartialOrd + fmt::Display,
    {
        let Some(v) = value else {
            return;
        };
        if let Some(lo) = low.filter(|lo| v < *lo) {
            self.fail(field, format!("{field} ({v}) is below {low_field} ({lo})"));
        } else if let Some(hi) = high.filter(|hi| v > *hi) {
            self.fail(field, format!("{field} ({v}) is above {high_field} ({hi})"));
        }
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                errors: self.errors,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_pattern_accepts_common_addresses() {
        for ok in ["a@b.co", "first.last+tag@example-mail.org", "x_y@sub.domain.io"] {
            let mut checks = FieldChecks::new();
            checks.email("email", ok);
            assert!(checks.finish().is_ok(), "{ok} should pass");
        }
    }

    #[test]
    fn email_pattern_rejects_malformed() {
        for bad in ["", "plain", "no-at.example.com", "a@b", "a b@c.com", "a@@b.com"] {
            let mut checks = FieldChecks::new();
            checks.email("email", bad);
            let err = checks.finish().unwrap_err();
            assert!(err.has_field("email"), "{bad} should fail");
        }
    }

    #[test]
    fn max_len_counts_characters_not_bytes() {
        let mut checks = FieldChecks::new();
        checks.max_len("unit", "µg/dL", 5);
        assert!(checks.finish().is_ok());
    }

    #[test]
    fn whitespace_at_max_length_passes() {
        let mut checks = FieldChecks::new();
        checks.max_len("name", &" ".repeat(10), 10);
        checks.max_len("code", "", 10);
        assert!(checks.finish().is_ok());
    }

    #[test]
    fn within_reports_the_inner_field() {
        let mut checks = FieldChecks::new();
        checks.within("optimal_min", Some(2), "min_value", Some(3), "max_value", Some(9));
        checks.within("optimal_max", Some(12), "min_value", Some(3), "max_value", Some(9));
        checks.within("optimal_max", Some(9), "min_value", Some(3), "max_value", Some(9));
        checks.within("optimal_min", Some(1), "min_value", None, "max_value", Some(9));
        checks.within("optimal_min", None, "min_value", Some(3), "max_value", Some(9));
        let err = checks.finish().unwrap_err();
        assert_eq!(err.fields(), vec!["optimal_min", "optimal_max"]);
        assert!(err.to_string().contains("optimal_max (12) is above max_value (9)"));
    }

    #[test]
    fn errors_accumulate_across_fields() {
        let mut checks = FieldChecks::new();
        checks.email("email", "nope");
        checks.max_len("notes", &"x".repeat(11), 10);
        checks.ordered("min_age", Some(40), "max_age", Some(20));
        let err = checks.finish().unwrap_err();
        assert_eq!(err.fields(), vec!["email", "notes", "max_age"]);
        let text = err.to_string();
        assert!(text.contains("email: not a valid email address"));
        assert!(text.contains("notes: length 11 exceeds maximum of 10"));
    }

    #[test]
    fn ordered_ignores_missing_bound() {
        let mut checks = FieldChecks::new();
        checks.ordered("min_age", None, "max_age", Some(3));
        checks.ordered("min_age", Some(3), "max_age", None);
        assert!(checks.finish().is_ok());
    }
}
