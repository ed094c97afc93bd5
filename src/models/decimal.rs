//! Fixed-point decimal with exactly three fractional digits.
//!
//! Stored as an integer count of thousandths so lab values never drift the
//! way binary floats do. Serialises as a string (`"5.100"`) and accepts
//! strings or JSON numbers on input.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

pub const DECIMAL_PLACES: u32 = 3;
const SCALE: i64 = 1000;
/// Significant decimal digits an `f64` carries exactly.
const MAX_FLOAT_DIGITS: usize = 15;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecimalError {
    #[error("empty decimal")]
    Empty,

    #[error("invalid decimal '{0}'")]
    Invalid(String),

    #[error("decimal '{0}' has more than 3 fractional digits")]
    TooPrecise(String),

    #[error("decimal '{0}' is out of range")]
    Overflow(String),

    #[error("decimal '{0}' has more than 15 significant digits; send it as a string")]
    Inexact(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Decimal3(i64);

impl Decimal3 {
    pub const ZERO: Self = Self(0);

    pub const fn from_thousandths(thousandths: i64) -> Self {
        Self(thousandths)
    }

    pub const fn thousandths(self) -> i64 {
        self.0
    }

    pub fn from_int(value: i64) -> Option<Self> {
        value.checked_mul(SCALE).map(Self)
    }
}

impl FromStr for Decimal3 {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(DecimalError::Empty);
        }

        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((i, f)) => (i, f),
            None => (unsigned, ""),
        };

        let all_digits = |p: &str| p.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(DecimalError::Invalid(s.into()));
        }

        // Trailing zeros beyond the third place carry no precision.
        let frac_trimmed = if frac_part.len() > DECIMAL_PLACES as usize {
            let (kept, rest) = frac_part.split_at(DECIMAL_PLACES as usize);
            if rest.bytes().any(|b| b != b'0') {
                return Err(DecimalError::TooPrecise(s.into()));
            }
            kept
        } else {
            frac_part
        };

        let overflow = || DecimalError::Overflow(s.into());

        let whole: i64 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| overflow())?
        };

        let mut frac: i64 = 0;
        for (i, b) in frac_trimmed.bytes().enumerate() {
            frac += i64::from(b - b'0') * 10_i64.pow(DECIMAL_PLACES - 1 - i as u32);
        }

        let magnitude = whole
            .checked_mul(SCALE)
            .and_then(|w| w.checked_add(frac))
            .ok_or_else(overflow)?;

        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl fmt::Display for Decimal3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let scale = SCALE.unsigned_abs();
        write!(f, "{sign}{}.{:03}", abs / scale, abs % scale)
    }
}

impl Serialize for Decimal3 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal3 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(Decimal3Visitor)
    }
}

struct Decimal3Visitor;

impl Visitor<'_> for Decimal3Visitor {
    type Value = Decimal3;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number with at most 3 fractional digits")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Decimal3::from_int(v).ok_or_else(|| E::custom(DecimalError::Overflow(v.to_string())))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .ok()
            .and_then(Decimal3::from_int)
            .ok_or_else(|| E::custom(DecimalError::Overflow(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        if !v.is_finite() {
            return Err(E::custom(DecimalError::Invalid(v.to_string())));
        }
        // Display yields the shortest representation that round-trips, so 5.1 stays "5.1".
        let text = v.to_string();
        if significant_digits(&text) > MAX_FLOAT_DIGITS {
            return Err(E::custom(DecimalError::Inexact(text)));
        }
        text.parse().map_err(E::custom)
    }
}

fn significant_digits(text: &str) -> usize {
    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').trim_end_matches('0').len()
}
