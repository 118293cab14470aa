//! Expected entries of container matchers.
//!
//! Dict and sequence matchers hold [`Expected`] values: either a literal
//! [`Value`] compared with plain equality, or a nested matcher compared
//! through its equality entry point so its diagnostic state is recorded.

use std::fmt;
use std::rc::Rc;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::matcher::{Matcher, MatcherRef};
use crate::value::{Dict, Value};

/// A literal value or a nested matcher.
#[derive(Clone)]
pub enum Expected {
    /// Compared with [`Value`] equality.
    Value(Value),
    /// Compared with [`Matcher::matches`].
    Matcher(MatcherRef),
}

impl Expected {
    /// Compares `candidate` against this entry.
    pub fn matches(&self, candidate: &Value) -> bool {
        match self {
            Expected::Value(v) => v == candidate,
            Expected::Matcher(m) => m.matches(candidate),
        }
    }

    /// Compares without recording anything on a nested matcher.
    pub fn check(&self, candidate: &Value) -> bool {
        match self {
            Expected::Value(v) => v == candidate,
            Expected::Matcher(m) => m.check(candidate),
        }
    }

    /// Returns `true` for a nested matcher.
    pub fn is_matcher(&self) -> bool {
        matches!(self, Expected::Matcher(_))
    }

    /// The literal value, if this is not a matcher.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Expected::Value(v) => Some(v),
            Expected::Matcher(_) => None,
        }
    }
}

impl fmt::Debug for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Value(v) => write!(f, "{:?}", v),
            Expected::Matcher(m) => write!(f, "{:?}", m),
        }
    }
}

impl PartialEq<Value> for Expected {
    fn eq(&self, other: &Value) -> bool {
        self.matches(other)
    }
}

impl From<MatcherRef> for Expected {
    fn from(m: MatcherRef) -> Self {
        Expected::Matcher(m)
    }
}

macro_rules! literal_conversions {
    ($($ty:ty),* $(,)?) => {$(
        impl From<$ty> for Expected {
            fn from(v: $ty) -> Self {
                Expected::Value(Value::from(v))
            }
        }
    )*};
}

literal_conversions!(
    Value,
    (),
    bool,
    i8,
    i16,
    i32,
    i64,
    u8,
    u16,
    u32,
    f32,
    f64,
    &str,
    String,
    NaiveDate,
    NaiveDateTime,
    DateTime<FixedOffset>,
    DateTime<Utc>,
    Uuid,
    Dict,
);

impl<V: Into<Value>> From<Vec<V>> for Expected {
    fn from(items: Vec<V>) -> Self {
        Expected::Value(Value::list(items))
    }
}

impl<V: Into<Value>> From<Option<V>> for Expected {
    fn from(v: Option<V>) -> Self {
        Expected::Value(Value::from(v))
    }
}

impl<M: Matcher + 'static> From<Rc<M>> for Expected {
    fn from(m: Rc<M>) -> Self {
        Expected::Matcher(m)
    }
}

/// Builds a `Vec<Expected>` from literals and matchers.
///
/// ```
/// use eqmatch::{expected, IsInt};
///
/// let items = expected![1, "two", IsInt::new()];
/// assert_eq!(items.len(), 3);
/// assert!(items[2].is_matcher());
/// ```
#[macro_export]
macro_rules! expected {
    ($($item:expr),* $(,)?) => {
        vec![$($crate::Expected::from($item)),*]
    };
}

/// Builds the ordered `(key, Expected)` pairs a dict matcher is built from.
///
/// ```
/// use eqmatch::{dict, IsDict, IsStr, Value};
///
/// let m = IsDict::new(dict! { "id" => 1, "name" => IsStr::new() });
/// assert_eq!(Value::dict([("id", Value::from(1)), ("name", Value::from("x"))]), m);
/// ```
#[macro_export]
macro_rules! dict {
    ($($key:expr => $value:expr),* $(,)?) => {
        vec![$(($crate::Value::from($key), $crate::Expected::from($value))),*]
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numeric::IsInt;

    #[test]
    fn literal_uses_value_equality() {
        let e = Expected::from(1);
        assert!(e.matches(&Value::from(1.0)));
        assert!(!e.matches(&Value::from(true)));
        assert!(!e.is_matcher());
    }

    #[test]
    fn nested_matcher_records_state() {
        let m = Rc::new(IsInt::new());
        let e = Expected::from(m.clone());
        assert!(e.matches(&Value::from(5)));
        assert_eq!(m.state().last_result(), Some(true));
        assert_eq!(format!("{:?}", e), "5");
    }

    #[test]
    fn macros_build_entries() {
        let items = expected![1, "a", IsInt::default()];
        assert_eq!(format!("{:?}", items), "[1, \"a\", IsInt]");
        let entries = dict! { "a" => 1, 2 => IsInt::new() };
        assert_eq!(entries[1].0, Value::from(2));
        assert!(entries[1].1.is_matcher());
    }
}
