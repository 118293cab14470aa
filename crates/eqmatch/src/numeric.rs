//! Numeric matchers.
//!
//! [`IsNumeric`] is the engine: a type check followed by the bounds-check
//! routine of [`Bounds`]. The other matchers here are presets over it that
//! narrow the accepted types or fix the bounds.
//!
//! Booleans never match. `true` is an `int` in the [`Kind`] hierarchy, but a
//! boolean passed where a number is expected is almost always a bug in the
//! code under test.
//!
//! ```
//! use eqmatch::{Bounds, IsApprox, IsFloat, IsInt, IsPositive, Value};
//!
//! assert_eq!(Value::from(1), IsInt::new());
//! assert_ne!(Value::from(true), IsInt::new());
//! assert_ne!(Value::from(1.0), IsInt::new());
//! assert_eq!(Value::from(0.5), IsFloat::bounded(Bounds::new().lt(1)).unwrap());
//! assert_eq!(Value::from(100), IsApprox::new(99));
//! assert_ne!(Value::from(0), IsPositive::new());
//! ```

use crate::bounds::Bounds;
use crate::error::{Mismatch, Result};
use crate::matcher::{delegate_matcher, matcher_impls, matcher_ops, MatchState, Matcher};
use crate::repr::Args;
use crate::scalar::{Delta, Family, Scalar};
use crate::value::{Kind, Number, Value};

/// Types accepted by a numeric matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Domain {
    /// Numbers, dates and datetimes.
    Numeric,
    /// Integers and floats.
    Number,
    Int,
    Float,
}

impl Domain {
    fn accepts(self, kind: Kind) -> bool {
        match self {
            Domain::Numeric => matches!(kind, Kind::Int | Kind::Float | Kind::Date | Kind::DateTime),
            Domain::Number => matches!(kind, Kind::Int | Kind::Float),
            Domain::Int => kind == Kind::Int,
            Domain::Float => kind == Kind::Float,
        }
    }

    fn families(self) -> &'static [Family] {
        match self {
            Domain::Numeric => &[Family::Number, Family::Date, Family::DateTime],
            _ => &[Family::Number],
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Domain::Numeric => "int, float, date or datetime",
            Domain::Number => "int or float",
            Domain::Int => "int",
            Domain::Float => "float",
        }
    }
}

/// Bounds-checked matcher over numbers, dates and datetimes.
///
/// With empty [`Bounds`] this is a type check alone.
#[derive(Clone)]
pub struct IsNumeric {
    name: &'static str,
    domain: Domain,
    bounds: Bounds,
    show_bounds: bool,
    state: MatchState,
}

impl IsNumeric {
    /// Matches any int, float, date or datetime.
    pub fn new() -> Self {
        IsNumeric::preset("IsNumeric", Domain::Numeric, Bounds::new(), MatchState::new())
    }

    /// Matches ints, floats, dates or datetimes within `bounds`.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`](crate::MatchError::InvalidConfig) if
    /// `approx` is combined with a limit, or the delta does not fit the
    /// target.
    pub fn bounded(bounds: Bounds) -> Result<Self> {
        IsNumeric::build("IsNumeric", Domain::Numeric, bounds)
    }

    fn build(name: &'static str, domain: Domain, bounds: Bounds) -> Result<Self> {
        bounds.validate(name, domain.families())?;
        Ok(IsNumeric::preset(name, domain, bounds, MatchState::new()))
    }

    fn preset(name: &'static str, domain: Domain, bounds: Bounds, state: MatchState) -> Self {
        IsNumeric {
            name,
            domain,
            bounds,
            show_bounds: true,
            state,
        }
    }

    fn fixed(name: &'static str, domain: Domain, bounds: Bounds, state: MatchState) -> Self {
        IsNumeric {
            show_bounds: false,
            ..IsNumeric::preset(name, domain, bounds, state)
        }
    }

    /// The configured bounds.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    fn prepare(&self, candidate: &Value) -> std::result::Result<Scalar, Mismatch> {
        if matches!(candidate, Value::Bool(_)) {
            return Err(Mismatch::value("booleans are not numbers"));
        }
        if !self.domain.accepts(candidate.kind()) {
            return Err(Mismatch::kind(self.domain.expected(), candidate));
        }
        Scalar::from_value(candidate).ok_or_else(|| Mismatch::kind(self.domain.expected(), candidate))
    }
}

impl Default for IsNumeric {
    fn default() -> Self {
        IsNumeric::preset("IsNumeric", Domain::Numeric, Bounds::new(), MatchState::bare())
    }
}

impl Matcher for IsNumeric {
    fn name(&self) -> &str {
        self.name
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        let scalar = self.prepare(candidate)?;
        if self.bounds.is_empty() {
            return Ok(true);
        }
        self.bounds.check(&scalar)
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        if self.show_bounds {
            self.bounds.render_into(Args::new())
        } else {
            Args::new()
        }
    }
}

macro_rules! bounded_preset {
    ($(#[$doc:meta])* $ty:ident, $domain:expr) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $ty(IsNumeric);

        impl $ty {
            /// Type check only.
            pub fn new() -> Self {
                $ty(IsNumeric::preset(stringify!($ty), $domain, Bounds::new(), MatchState::new()))
            }

            /// Type check plus `bounds`.
            ///
            /// # Errors
            ///
            /// [`MatchError::InvalidConfig`](crate::MatchError::InvalidConfig)
            /// for conflicting settings or non-numeric limits.
            pub fn bounded(bounds: Bounds) -> Result<Self> {
                IsNumeric::build(stringify!($ty), $domain, bounds).map($ty)
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                $ty(IsNumeric::preset(stringify!($ty), $domain, Bounds::new(), MatchState::bare()))
            }
        }

        delegate_matcher!($ty);
    };
}

macro_rules! fixed_preset {
    ($(#[$doc:meta])* $ty:ident, $domain:expr, $bounds:expr) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $ty(IsNumeric);

        impl $ty {
            pub fn new() -> Self {
                $ty(IsNumeric::fixed(stringify!($ty), $domain, $bounds, MatchState::new()))
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                $ty(IsNumeric::fixed(stringify!($ty), $domain, $bounds, MatchState::bare()))
            }
        }

        delegate_matcher!($ty);
    };
}

matcher_impls!(IsNumeric);
matcher_ops!(IsNumeric);

bounded_preset!(
    /// Matches ints and floats.
    IsNumber,
    Domain::Number
);
bounded_preset!(
    /// Matches ints.
    IsInt,
    Domain::Int
);
bounded_preset!(
    /// Matches floats.
    IsFloat,
    Domain::Float
);

fixed_preset!(
    /// Matches numbers greater than zero.
    IsPositive,
    Domain::Number,
    Bounds::new().gt(0)
);
fixed_preset!(
    /// Matches numbers less than zero.
    IsNegative,
    Domain::Number,
    Bounds::new().lt(0)
);
fixed_preset!(
    /// Matches numbers less than or equal to zero.
    IsNonPositive,
    Domain::Number,
    Bounds::new().le(0)
);
fixed_preset!(
    /// Matches numbers greater than or equal to zero.
    IsNonNegative,
    Domain::Number,
    Bounds::new().ge(0)
);
fixed_preset!(
    /// Matches ints greater than zero.
    IsPositiveInt,
    Domain::Int,
    Bounds::new().gt(0)
);
fixed_preset!(
    /// Matches ints less than zero.
    IsNegativeInt,
    Domain::Int,
    Bounds::new().lt(0)
);
fixed_preset!(
    /// Matches floats greater than zero.
    IsPositiveFloat,
    Domain::Float,
    Bounds::new().gt(0)
);
fixed_preset!(
    /// Matches floats less than zero.
    IsNegativeFloat,
    Domain::Float,
    Bounds::new().lt(0)
);

/// Matches numbers close to a target.
///
/// Without an explicit delta the tolerance is 1% of the candidate.
#[derive(Clone)]
pub struct IsApprox(IsNumeric);

impl IsApprox {
    /// Approximately `approx`, within 1% of the candidate.
    pub fn new(approx: impl Into<Number>) -> Self {
        IsApprox::from_bounds(Bounds::new().approx(approx.into()))
    }

    /// Approximately `approx`, within `delta`.
    pub fn with_delta(approx: impl Into<Number>, delta: impl Into<Number>) -> Self {
        IsApprox::from_bounds(Bounds::new().approx(approx.into()).delta(Delta::Number(delta.into())))
    }

    fn from_bounds(bounds: Bounds) -> Self {
        IsApprox(IsNumeric::preset("IsApprox", Domain::Number, bounds, MatchState::new()))
    }
}

delegate_matcher!(IsApprox);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchError;
    use chrono::NaiveDate;

    #[test]
    fn booleans_never_match() {
        for m in [IsNumeric::new(), IsNumber::new().0, IsInt::new().0] {
            assert!(!m.matches(&Value::from(true)));
            assert!(!m.matches(&Value::from(false)));
        }
        assert!(!IsNonNegative::new().matches(&Value::from(true)));
    }

    #[test]
    fn domains() {
        let day = Value::from(NaiveDate::from_ymd_opt(2000, 1, 1).unwrap());
        assert!(IsNumeric::new().matches(&day));
        assert!(!IsNumber::new().matches(&day));
        assert!(IsInt::new().matches(&Value::from(3)));
        assert!(!IsInt::new().matches(&Value::from(3.0)));
        assert!(IsFloat::new().matches(&Value::from(3.0)));
        assert!(!IsFloat::new().matches(&Value::from(3)));
        assert!(!IsNumber::new().matches(&Value::from("3")));
    }

    #[test]
    fn approx_default_tolerance() {
        assert!(IsApprox::new(99).matches(&Value::from(100)));
        assert!(!IsApprox::new(99).matches(&Value::from(110)));
        assert!(IsApprox::with_delta(99, 11).matches(&Value::from(110)));
        assert!(IsApprox::new(1.0).matches(&Value::from(1.005)));
    }

    #[test]
    fn presets() {
        assert!(IsPositive::new().matches(&Value::from(0.1)));
        assert!(!IsPositive::new().matches(&Value::from(0)));
        assert!(IsNegative::new().matches(&Value::from(-1)));
        assert!(IsNonPositive::new().matches(&Value::from(0)));
        assert!(IsNonNegative::new().matches(&Value::from(0)));
        assert!(IsPositiveInt::new().matches(&Value::from(1)));
        assert!(!IsPositiveInt::new().matches(&Value::from(1.5)));
        assert!(IsNegativeInt::new().matches(&Value::from(-1)));
        assert!(IsPositiveFloat::new().matches(&Value::from(1.5)));
        assert!(!IsNegativeFloat::new().matches(&Value::from(-1)));
        assert!(IsNegativeFloat::new().matches(&Value::from(-1.0)));
    }

    #[test]
    fn bounds_are_validated_up_front() {
        let day = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert!(matches!(
            IsInt::bounded(Bounds::new().gt(day)),
            Err(MatchError::InvalidConfig { matcher: "IsInt", .. })
        ));
        assert!(IsNumeric::bounded(Bounds::new().gt(day)).is_ok());
        assert!(IsNumber::bounded(Bounds::new().approx(1).ge(0)).is_err());
    }

    #[test]
    fn delta_alone_accepts_any_number() {
        let m = IsNumber::bounded(Bounds::new().delta(1)).unwrap();
        assert!(m.matches(&Value::from(1e6)));
    }

    #[test]
    fn rendering() {
        assert_eq!(format!("{:?}", IsInt::default()), "IsInt");
        assert_eq!(format!("{:?}", IsInt::new()), "IsInt()");
        assert_eq!(
            format!("{:?}", IsInt::bounded(Bounds::new().gt(1).lt(4)).unwrap()),
            "IsInt(gt=1, lt=4)"
        );
        assert_eq!(format!("{:?}", IsPositive::new()), "IsPositive()");
        assert_eq!(format!("{:?}", IsPositive::default()), "IsPositive");
        assert_eq!(format!("{:?}", IsApprox::with_delta(1, 2)), "IsApprox(approx=1, delta=2)");
    }
}
