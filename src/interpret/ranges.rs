use chrono::{Datelike, NaiveDate, NaiveDateTime};

use crate::models::{AgeGroup, Gender, ReferenceRange, User};

/// Who a result belongs to, as of the test date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Demographics {
    pub gender: Option<Gender>,
    pub age: Option<u32>,
}

impl Demographics {
    pub fn of(user: &User, on: NaiveDateTime) -> Self {
        Self {
            gender: user.gender,
            age: user
                .date_of_birth
                .and_then(|dob| age_on(dob.date(), on.date())),
        }
    }
}

/// Completed years between `dob` and `on`. `None` if `on` precedes birth.
pub fn age_on(dob: NaiveDate, on: NaiveDate) -> Option<u32> {
    if on < dob {
        return None;
    }
    let mut years = on.year() - dob.year();
    if (on.month(), on.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Whether every demographic filter on `range` accepts `who`.
///
/// A filter the caller cannot satisfy (unknown gender or age) rejects the
/// range; only unfiltered dimensions apply to unknown demographics.
pub fn range_applies(range: &ReferenceRange, who: &Demographics) -> bool {
    if !range.is_active {
        return false;
    }
    if let Some(g) = range.gender {
        if who.gender != Some(g) {
            return false;
        }
    }
    if let Some(group) = range.age_group {
        match who.age {
            Some(age) if group.contains(age) => {}
            _ => return false,
        }
    }
    if range.min_age.is_some() || range.max_age.is_some() {
        let Some(age) = who.age else {
            return false;
        };
        let age = i64::from(age);
        if range.min_age.is_some_and(|min| age < i64::from(min)) {
            return false;
        }
        if range.max_age.is_some_and(|max| age > i64::from(max)) {
            return false;
        }
    }
    true
}

/// Gender outweighs age group; explicit ages refine either.
pub fn specificity(range: &ReferenceRange) -> u8 {
    let mut score = 0;
    if range.gender.is_some() {
        score += 2;
    }
    if range.age_group.is_some() {
        score += 1;
    }
    if range.min_age.is_some() || range.max_age.is_some() {
        score += 1;
    }
    score
}

/// Pick the most specific applicable range; ties go to the oldest (lowest id).
pub fn select_reference_range<'a>(
    ranges: &'a [ReferenceRange],
    who: &Demographics,
) -> Option<&'a ReferenceRange> {
    ranges
        .iter()
        .filter(|r| range_applies(r, who))
        .min_by_key(|r| (std::cmp::Reverse(specificity(r)), r.id))
}

/// Age group for an age, convenience for callers building filters.
pub fn age_group_of(who: &Demographics) -> Option<AgeGroup> {
    who.age.map(AgeGroup::from_age)
}
