use std::fmt;

use serde::{Deserialize, Serialize};

use super::validation::ValidationError;

/// Macro to generate a closed string enum with as_str + std::str::FromStr.
///
/// `$field` names the schema field used in validation errors.
macro_rules! str_enum {
    ($name:ident as $field:literal { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ValidationError::invalid_enum($field, s, &[$($s),+])),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

str_enum!(Gender as "gender" {
    Male => "male",
    Female => "female",
    Other => "other",
});

str_enum!(AgeGroup as "age_group" {
    Child => "child",
    Teen => "teen",
    Adult => "adult",
    Senior => "senior",
});

str_enum!(TestStatus as "status" {
    Pending => "pending",
    Completed => "completed",
    Reviewed => "reviewed",
});

str_enum!(ResultStatus as "status" {
    Normal => "normal",
    Low => "low",
    High => "high",
    Optimal => "optimal",
});

impl Default for TestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl AgeGroup {
    /// Inclusive age bounds in years; seniors have no upper bound.
    pub fn bounds(self) -> (u32, Option<u32>) {
        match self {
            Self::Child => (0, Some(12)),
            Self::Teen => (13, Some(19)),
            Self::Adult => (20, Some(64)),
            Self::Senior => (65, None),
        }
    }

    pub fn from_age(years: u32) -> Self {
        match years {
            0..=12 => Self::Child,
            13..=19 => Self::Teen,
            20..=64 => Self::Adult,
            _ => Self::Senior,
        }
    }

    pub fn contains(self, years: u32) -> bool {
        let (lo, hi) = self.bounds();
        years >= lo && hi.map_or(true, |h| years <= h)
    }
}

impl ResultStatus {
    /// Outside the reference interval.
    pub fn is_out_of_range(self) -> bool {
        matches!(self, Self::Low | Self::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn gender_round_trip() {
        for (variant, s) in [
            (Gender::Male, "male"),
            (Gender::Female, "female"),
            (Gender::Other, "other"),
        ] {
            assert_eq!(variant.as_str(), s);
            assert_eq!(Gender::from_str(s).unwrap(), variant);
        }
    }

    #[test]
    fn every_listed_value_parses() {
        for g in Gender::ALL {
            assert_eq!(Gender::from_str(g.as_str()).unwrap(), *g);
        }
        for a in AgeGroup::ALL {
            assert_eq!(AgeGroup::from_str(a.as_str()).unwrap(), *a);
        }
        for t in TestStatus::ALL {
            assert_eq!(TestStatus::from_str(t.as_str()).unwrap(), *t);
        }
        for r in ResultStatus::ALL {
            assert_eq!(ResultStatus::from_str(r.as_str()).unwrap(), *r);
        }
    }

    #[test]
    fn invalid_enum_returns_field_error() {
        let err = Gender::from_str("unknown").unwrap_err();
        assert!(err.has_field("gender"));
        assert!(err.to_string().contains("male, female, other"));

        assert!(AgeGroup::from_str("toddler").unwrap_err().has_field("age_group"));
        assert!(TestStatus::from_str("Pending").unwrap_err().has_field("status"));
        assert!(TestStatus::from_str("").is_err());
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&TestStatus::Reviewed).unwrap(), "\"reviewed\"");
        let g: Gender = serde_json::from_str("\"female\"").unwrap();
        assert_eq!(g, Gender::Female);
        assert!(serde_json::from_str::<Gender>("\"FEMALE\"").is_err());
    }

    #[test]
    fn status_defaults_to_pending() {
        assert_eq!(TestStatus::default(), TestStatus::Pending);
    }

    #[test]
    fn age_group_boundaries() {
        assert_eq!(AgeGroup::from_age(0), AgeGroup::Child);
        assert_eq!(AgeGroup::from_age(12), AgeGroup::Child);
        assert_eq!(AgeGroup::from_age(13), AgeGroup::Teen);
        assert_eq!(AgeGroup::from_age(19), AgeGroup::Teen);
        assert_eq!(AgeGroup::from_age(20), AgeGroup::Adult);
        assert_eq!(AgeGroup::from_age(64), AgeGroup::Adult);
        assert_eq!(AgeGroup::from_age(65), AgeGroup::Senior);
        assert_eq!(AgeGroup::from_age(104), AgeGroup::Senior);
        for age in 0..120 {
            assert!(AgeGroup::from_age(age).contains(age));
        }
    }
}
