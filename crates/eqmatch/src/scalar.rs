//! Ordered scalar domain for bounds and tolerance checks.
//!
//! Numbers, dates and datetimes are the values a bounds check can order.
//! [`Scalar`] wraps them, [`Delta`] is the distance between two of them.
//! Comparing across domains (a number with a date, a naive datetime with an
//! aware one) is a [`Mismatch`], never a panic.

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, Utc};

use crate::error::Mismatch;
use crate::value::{Kind, Number, Value};

/// The domain a scalar belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Integers and floats.
    Number,
    /// Calendar dates.
    Date,
    /// Naive or aware datetimes.
    DateTime,
}

impl Family {
    /// Returns the display name of this family.
    pub fn as_str(self) -> &'static str {
        match self {
            Family::Number => "number",
            Family::Date => "date",
            Family::DateTime => "datetime",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An orderable value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    /// Integer or float.
    Number(Number),
    /// Calendar date.
    Date(NaiveDate),
    /// Datetime without offset.
    Naive(NaiveDateTime),
    /// Datetime with a fixed offset.
    Aware(DateTime<FixedOffset>),
}

impl Scalar {
    /// Extracts a scalar from a value. Booleans are not scalars.
    pub fn from_value(value: &Value) -> Option<Scalar> {
        match value {
            Value::Int(n) => Some(Scalar::Number(Number::Int(*n))),
            Value::Float(n) => Some(Scalar::Number(Number::Float(*n))),
            Value::Date(d) => Some(Scalar::Date(*d)),
            Value::NaiveDateTime(dt) => Some(Scalar::Naive(*dt)),
            Value::DateTime(dt) => Some(Scalar::Aware(*dt)),
            _ => None,
        }
    }

    /// Converts back into a value.
    pub fn to_value(self) -> Value {
        match self {
            Scalar::Number(n) => Value::from(n),
            Scalar::Date(d) => Value::Date(d),
            Scalar::Naive(dt) => Value::NaiveDateTime(dt),
            Scalar::Aware(dt) => Value::DateTime(dt),
        }
    }

    /// The domain of this scalar.
    pub fn family(&self) -> Family {
        match self {
            Scalar::Number(_) => Family::Number,
            Scalar::Date(_) => Family::Date,
            Scalar::Naive(_) | Scalar::Aware(_) => Family::DateTime,
        }
    }

    /// The runtime kind of the wrapped value.
    pub fn kind(&self) -> Kind {
        match self {
            Scalar::Number(Number::Int(_)) => Kind::Int,
            Scalar::Number(Number::Float(_)) => Kind::Float,
            Scalar::Date(_) => Kind::Date,
            Scalar::Naive(_) | Scalar::Aware(_) => Kind::DateTime,
        }
    }

    /// Returns `true` for dates and datetimes.
    pub fn is_temporal(&self) -> bool {
        !matches!(self, Scalar::Number(_))
    }

    /// Orders `self` relative to `other`.
    ///
    /// # Errors
    ///
    /// A [`Mismatch`] when the two are not comparable: different domains,
    /// naive against aware datetimes, or a NaN.
    pub fn compare(&self, other: &Scalar) -> Result<Ordering, Mismatch> {
        match (self, other) {
            (Scalar::Number(a), Scalar::Number(b)) => a
                .compare(*b)
                .ok_or_else(|| Mismatch::value("NaN cannot be ordered")),
            (Scalar::Date(a), Scalar::Date(b)) => Ok(a.cmp(b)),
            (Scalar::Naive(a), Scalar::Naive(b)) => Ok(a.cmp(b)),
            (Scalar::Aware(a), Scalar::Aware(b)) => Ok(a.cmp(b)),
            _ => Err(self.incompatible(other)),
        }
    }

    /// Absolute distance between `self` and `other`.
    ///
    /// # Errors
    ///
    /// The same [`Mismatch`] cases as [`compare`](Scalar::compare).
    pub fn distance(&self, other: &Scalar) -> Result<Delta, Mismatch> {
        let duration = match (self, other) {
            (Scalar::Number(Number::Int(a)), Scalar::Number(Number::Int(b))) => {
                let diff = (*a as i128 - *b as i128).abs();
                return Ok(match i64::try_from(diff) {
                    Ok(diff) => Delta::Number(Number::Int(diff)),
                    Err(_) => Delta::Number(Number::Float(diff as f64)),
                });
            }
            (Scalar::Number(a), Scalar::Number(b)) => {
                return Ok(Delta::Number(Number::Float((a.to_f64() - b.to_f64()).abs())));
            }
            (Scalar::Date(a), Scalar::Date(b)) => a.signed_duration_since(*b),
            (Scalar::Naive(a), Scalar::Naive(b)) => a.signed_duration_since(*b),
            (Scalar::Aware(a), Scalar::Aware(b)) => a.signed_duration_since(*b),
            _ => return Err(self.incompatible(other)),
        };
        Ok(Delta::Duration(if duration < Duration::zero() {
            -duration
        } else {
            duration
        }))
    }

    fn incompatible(&self, other: &Scalar) -> Mismatch {
        match (self, other) {
            (Scalar::Naive(_), Scalar::Aware(_)) | (Scalar::Aware(_), Scalar::Naive(_)) => {
                Mismatch::value("can't compare offset-naive and offset-aware datetimes")
            }
            _ => Mismatch::Type {
                expected: other.kind().to_string(),
                actual: self.kind(),
            },
        }
    }
}

macro_rules! number_scalars {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Scalar {
            fn from(n: $ty) -> Self {
                Scalar::Number(Number::from(n))
            }
        }
    )*};
}

number_scalars!(i8, i16, i32, i64, u8, u16, u32, f32, f64);

impl From<Number> for Scalar {
    fn from(n: Number) -> Self {
        Scalar::Number(n)
    }
}

impl From<NaiveDate> for Scalar {
    fn from(d: NaiveDate) -> Self {
        Scalar::Date(d)
    }
}

impl From<NaiveDateTime> for Scalar {
    fn from(dt: NaiveDateTime) -> Self {
        Scalar::Naive(dt)
    }
}

impl From<DateTime<FixedOffset>> for Scalar {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Scalar::Aware(dt)
    }
}

impl From<DateTime<Utc>> for Scalar {
    fn from(dt: DateTime<Utc>) -> Self {
        Scalar::Aware(dt.fixed_offset())
    }
}

/// Allowed distance in approximate comparisons.
///
/// Temporal scalars measure distance as a [`Duration`]; a numeric delta is
/// read as seconds by the date and datetime matchers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Delta {
    /// Numeric distance.
    Number(Number),
    /// Temporal distance.
    Duration(Duration),
}

impl Delta {
    /// Tolerance used when none is configured: one second for temporal
    /// values, 1% of the candidate's magnitude for numbers.
    pub fn default_for(candidate: &Scalar) -> Delta {
        match candidate {
            Scalar::Number(n) => Delta::Number(Number::Float(n.to_f64().abs() / 100.0)),
            _ => Delta::Duration(Duration::seconds(1)),
        }
    }

    /// Reads a numeric delta as seconds; durations pass through.
    pub fn into_duration(self) -> Delta {
        match self {
            Delta::Number(n) => {
                Delta::Duration(Duration::microseconds((n.to_f64() * 1e6).round() as i64))
            }
            duration => duration,
        }
    }

    /// Returns `true` for a temporal delta.
    pub fn is_duration(&self) -> bool {
        matches!(self, Delta::Duration(_))
    }

    /// Returns whether `distance` is within this tolerance.
    pub(crate) fn allows(&self, distance: Delta) -> Result<bool, Mismatch> {
        match (self, distance) {
            (Delta::Number(tolerance), Delta::Number(distance)) => Ok(matches!(
                distance.compare(*tolerance),
                Some(Ordering::Less | Ordering::Equal)
            )),
            (Delta::Duration(tolerance), Delta::Duration(distance)) => Ok(distance <= *tolerance),
            _ => Err(Mismatch::value("delta and value are in different domains")),
        }
    }

    /// Converts into a value for rendering.
    pub(crate) fn to_arg(self) -> crate::repr::Arg {
        match self {
            Delta::Number(n) => crate::repr::Arg::Value(Value::from(n)),
            Delta::Duration(d) => crate::repr::Arg::Plain(d.to_string()),
        }
    }
}

impl From<i32> for Delta {
    fn from(n: i32) -> Self {
        Delta::Number(Number::Int(n as i64))
    }
}

impl From<i64> for Delta {
    fn from(n: i64) -> Self {
        Delta::Number(Number::Int(n))
    }
}

impl From<f64> for Delta {
    fn from(n: f64) -> Self {
        Delta::Number(Number::Float(n))
    }
}

impl From<Duration> for Delta {
    fn from(d: Duration) -> Self {
        Delta::Duration(d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn booleans_are_not_scalars() {
        assert_eq!(Scalar::from_value(&Value::from(true)), None);
        assert_eq!(Scalar::from_value(&Value::from("1")), None);
        assert_eq!(
            Scalar::from_value(&Value::from(3)),
            Some(Scalar::Number(Number::Int(3)))
        );
    }

    #[test]
    fn mixed_numbers_compare() {
        let a = Scalar::from(1);
        let b = Scalar::from(1.5);
        assert_eq!(a.compare(&b), Ok(Ordering::Less));
        assert!(Scalar::from(f64::NAN).compare(&a).is_err());
    }

    #[test]
    fn cross_domain_is_a_mismatch() {
        let n = Scalar::from(1);
        let d = Scalar::from(date(2000, 1, 1));
        assert_eq!(
            n.compare(&d),
            Err(Mismatch::Type {
                expected: "date".into(),
                actual: Kind::Int
            })
        );
        let naive = Scalar::from(date(2000, 1, 1).and_hms_opt(0, 0, 0).unwrap());
        let aware = Scalar::from(date(2000, 1, 1).and_hms_opt(0, 0, 0).unwrap().and_utc());
        assert!(matches!(naive.compare(&aware), Err(Mismatch::Value(_))));
    }

    #[test]
    fn distances() {
        assert_eq!(
            Scalar::from(3).distance(&Scalar::from(10)),
            Ok(Delta::Number(Number::Int(7)))
        );
        assert_eq!(
            Scalar::from(date(2000, 1, 2)).distance(&Scalar::from(date(2000, 1, 1))),
            Ok(Delta::Duration(Duration::days(1)))
        );
        assert_eq!(
            Scalar::from(date(2000, 1, 1)).distance(&Scalar::from(date(2000, 1, 2))),
            Ok(Delta::Duration(Duration::days(1)))
        );
    }

    #[test]
    fn default_tolerances() {
        assert_eq!(
            Delta::default_for(&Scalar::from(-200)),
            Delta::Number(Number::Float(2.0))
        );
        assert_eq!(
            Delta::default_for(&Scalar::from(date(2000, 1, 1))),
            Delta::Duration(Duration::seconds(1))
        );
    }

    #[test]
    fn numeric_delta_as_seconds() {
        assert_eq!(
            Delta::from(10).into_duration(),
            Delta::Duration(Duration::seconds(10))
        );
        assert_eq!(
            Delta::from(0.5).into_duration(),
            Delta::Duration(Duration::milliseconds(500))
        );
    }

    #[test]
    fn tolerance_is_inclusive() {
        let tolerance = Delta::from(2);
        assert_eq!(tolerance.allows(Delta::from(2)), Ok(true));
        assert_eq!(tolerance.allows(Delta::from(2.5)), Ok(false));
        assert!(tolerance.allows(Delta::Duration(Duration::seconds(1))).is_err());
    }
}
