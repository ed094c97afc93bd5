use crate::models::{Decimal3, ReferenceRange, ResultStatus};

/// Reference and optimal bounds; a missing bound is open on that side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds {
    pub reference_min: Option<Decimal3>,
    pub reference_max: Option<Decimal3>,
    pub optimal_min: Option<Decimal3>,
    pub optimal_max: Option<Decimal3>,
}

impl Bounds {
    pub fn of(range: Option<&ReferenceRange>) -> Self {
        range.map_or_else(Self::default, |r| Self {
            reference_min: r.min_value,
            reference_max: r.max_value,
            optimal_min: r.optimal_min,
            optimal_max: r.optimal_max,
        })
    }

    fn has_optimal(&self) -> bool {
        self.optimal_min.is_some() || self.optimal_max.is_some()
    }
}

/// below min → low, above max → high, inside the optimal band → optimal,
/// anything else → normal.
pub fn derive_status(value: Decimal3, bounds: &Bounds) -> ResultStatus {
    if bounds.reference_min.is_some_and(|min| value < min) {
        return ResultStatus::Low;
    }
    if bounds.reference_max.is_some_and(|max| value > max) {
        return ResultStatus::High;
    }
    if bounds.has_optimal()
        && bounds.optimal_min.map_or(true, |lo| value >= lo)
        && bounds.optimal_max.map_or(true, |hi| value <= hi)
    {
        return ResultStatus::Optimal;
    }
    ResultStatus::Normal
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal3 {
        s.parse().unwrap()
    }

    fn bounds(min: &str, max: &str, opt: Option<(&str, &str)>) -> Bounds {
        Bounds {
            reference_min: Some(d(min)),
            reference_max: Some(d(max)),
            optimal_min: opt.map(|(lo, _)| d(lo)),
            optimal_max: opt.map(|(_, hi)| d(hi)),
        }
    }

    #[test]
    fn testosterone_below_range_is_low() {
        let b = bounds("300", "1000", None);
        assert_eq!(derive_status(d("150.000"), &b), ResultStatus::Low);
    }

    #[test]
    fn above_max_is_high() {
        let b = bounds("300", "1000", Some(("500", "900")));
        assert_eq!(derive_status(d("1000.001"), &b), ResultStatus::High);
    }

    #[test]
    fn bounds_are_inclusive() {
        let b = bounds("300", "1000", None);
        assert_eq!(derive_status(d("300"), &b), ResultStatus::Normal);
        assert_eq!(derive_status(d("1000"), &b), ResultStatus::Normal);
    }

    #[test]
    fn optimal_band_wins_over_normal() {
        let b = bounds("300", "1000", Some(("500", "900")));
        assert_eq!(derive_status(d("500"), &b), ResultStatus::Optimal);
        assert_eq!(derive_status(d("900"), &b), ResultStatus::Optimal);
        assert_eq!(derive_status(d("499.999"), &b), ResultStatus::Normal);
    }

    #[test]
    fn half_open_optimal_band() {
        let b = Bounds {
            reference_min: Some(d("40")),
            reference_max: None,
            optimal_min: Some(d("60")),
            optimal_max: None,
        };
        assert_eq!(derive_status(d("75"), &b), ResultStatus::Optimal);
        assert_eq!(derive_status(d("50"), &b), ResultStatus::Normal);
        assert_eq!(derive_status(d("39"), &b), ResultStatus::Low);
    }

    #[test]
    fn no_range_is_normal() {
        assert_eq!(derive_status(d("-5"), &Bounds::of(None)), ResultStatus::Normal);
    }
}
