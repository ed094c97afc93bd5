use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::Gender;
use super::validation::*;

/// A person whose lab reports are tracked. Owns many `TestReport`s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub date_of_birth: Option<NaiveDateTime>,
    pub gender: Option<Gender>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDateTime>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

/// Patch for a `User`. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDateTime>,
    #[serde(default)]
    pub gender: Option<Gender>,
}

impl Validate for UserCreate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks.max_len("name", &self.name, MAX_USER_NAME);
        checks.email("email", &self.email);
        checks.finish()
    }
}

impl Validate for UserUpdate {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut checks = FieldChecks::new();
        checks.optional_max_len("name", self.name.as_deref(), MAX_USER_NAME);
        if let Some(email) = &self.email {
            checks.email("email", email);
        }
        checks.finish()
    }
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.date_of_birth.is_none()
            && self.gender.is_none()
    }

    /// Apply set fields to `user`. Returns whether any value changed.
    pub fn apply_to(&self, user: &mut User) -> bool {
        let mut changed = false;
        changed |= patch(&mut user.name, &self.name);
        changed |= patch(&mut user.email, &self.email);
        changed |= patch_opt(&mut user.date_of_birth, &self.date_of_birth);
        changed |= patch_opt(&mut user.gender, &self.gender);
        changed
    }
}

pub(crate) fn patch<T: PartialEq + Clone>(target: &mut T, value: &Option<T>) -> bool {
    match value {
        Some(v) if v != target => {
            *target = v.clone();
            true
        }
        _ => false,
    }
}

pub(crate) fn patch_opt<T: PartialEq + Clone>(target: &mut Option<T>, value: &Option<T>) -> bool {
    match value {
        Some(v) if target.as_ref() != Some(v) => {
            *target = Some(v.clone());
            true
        }
        _ => false,
    }
}
