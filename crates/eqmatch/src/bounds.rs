//! Bounds and approximate-equality configuration.
//!
//! [`Bounds`] is the configuration shared by the numeric, date and datetime
//! matchers. It runs in one of two modes:
//!
//! - **approx**: the candidate must lie within a tolerance of a target value.
//! - **bounds**: each configured `gt`/`lt`/`ge`/`le` limit must hold.
//!
//! The two modes are exclusive; combining them is rejected when the owning
//! matcher is built. An empty configuration accepts every candidate.

use std::cmp::Ordering;

use crate::error::{MatchError, Mismatch, Result};
use crate::repr::{Arg, Args};
use crate::scalar::{Delta, Family, Scalar};

/// Comparison operator of a single limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// Greater than.
    Gt,
    /// Less than.
    Lt,
    /// Greater than or equal.
    Ge,
    /// Less than or equal.
    Le,
}

impl Bound {
    /// Evaluates the ordering of candidate relative to the limit.
    pub fn eval_ordering(self, ordering: Ordering) -> bool {
        match self {
            Bound::Gt => ordering == Ordering::Greater,
            Bound::Lt => ordering == Ordering::Less,
            Bound::Ge => ordering != Ordering::Less,
            Bound::Le => ordering != Ordering::Greater,
        }
    }

    /// Returns the keyword name of this bound.
    pub fn as_str(self) -> &'static str {
        match self {
            Bound::Gt => "gt",
            Bound::Lt => "lt",
            Bound::Ge => "ge",
            Bound::Le => "le",
        }
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Bounds and tolerance configuration.
///
/// # Example
///
/// ```
/// use eqmatch::{Bounds, IsInt, Value};
///
/// let m = IsInt::bounded(Bounds::new().ge(1).lt(10)).unwrap();
/// assert_eq!(Value::from(1), m);
/// assert_ne!(Value::from(10), m);
///
/// assert!(IsInt::bounded(Bounds::new().approx(5).gt(1)).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bounds {
    approx: Option<Scalar>,
    delta: Option<Delta>,
    gt: Option<Scalar>,
    lt: Option<Scalar>,
    ge: Option<Scalar>,
    le: Option<Scalar>,
}

impl Bounds {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Bounds::default()
    }

    /// Sets the approximate target.
    pub fn approx(mut self, value: impl Into<Scalar>) -> Self {
        self.approx = Some(value.into());
        self
    }

    /// Sets the tolerance used with [`approx`](Bounds::approx).
    pub fn delta(mut self, delta: impl Into<Delta>) -> Self {
        self.delta = Some(delta.into());
        self
    }

    /// Requires candidates greater than `value`.
    pub fn gt(mut self, value: impl Into<Scalar>) -> Self {
        self.gt = Some(value.into());
        self
    }

    /// Requires candidates less than `value`.
    pub fn lt(mut self, value: impl Into<Scalar>) -> Self {
        self.lt = Some(value.into());
        self
    }

    /// Requires candidates greater than or equal to `value`.
    pub fn ge(mut self, value: impl Into<Scalar>) -> Self {
        self.ge = Some(value.into());
        self
    }

    /// Requires candidates less than or equal to `value`.
    pub fn le(mut self, value: impl Into<Scalar>) -> Self {
        self.le = Some(value.into());
        self
    }

    /// The approximate target, if set.
    pub fn approx_value(&self) -> Option<&Scalar> {
        self.approx.as_ref()
    }

    /// The tolerance, if set.
    pub fn delta_value(&self) -> Option<Delta> {
        self.delta
    }

    /// The configured limits, in `gt`, `lt`, `ge`, `le` order.
    pub fn limits(&self) -> impl Iterator<Item = (Bound, &Scalar)> {
        [
            (Bound::Gt, &self.gt),
            (Bound::Lt, &self.lt),
            (Bound::Ge, &self.ge),
            (Bound::Le, &self.le),
        ]
        .into_iter()
        .filter_map(|(bound, limit)| limit.as_ref().map(|l| (bound, l)))
    }

    /// Returns `true` if nothing is configured.
    pub fn is_empty(&self) -> bool {
        self.approx.is_none() && self.delta.is_none() && self.limits().next().is_none()
    }

    /// Reads a numeric tolerance as seconds.
    pub(crate) fn delta_in_seconds(mut self) -> Self {
        self.delta = self.delta.map(Delta::into_duration);
        self
    }

    pub(crate) fn or_delta(mut self, delta: Delta) -> Self {
        if self.delta.is_none() {
            self.delta = Some(delta);
        }
        self
    }

    /// Rejects conflicting settings and values outside `families`.
    pub(crate) fn validate(&self, matcher: &'static str, families: &[Family]) -> Result<()> {
        if self.approx.is_some() && self.limits().next().is_some() {
            return Err(MatchError::config(
                matcher,
                "\"approx\" cannot be combined with \"gt\", \"lt\", \"ge\", or \"le\"",
            ));
        }
        let named = self
            .approx
            .iter()
            .map(|v| ("approx", v))
            .chain(self.limits().map(|(bound, v)| (bound.as_str(), v)));
        for (name, value) in named {
            if !families.contains(&value.family()) {
                return Err(MatchError::config(
                    matcher,
                    format!(
                        "\"{}\" must be a {}, got {}",
                        name,
                        join_families(families),
                        value.family()
                    ),
                ));
            }
        }
        if let (Some(approx), Some(delta)) = (&self.approx, &self.delta) {
            if approx.is_temporal() != delta.is_duration() {
                return Err(MatchError::config(
                    matcher,
                    format!("\"delta\" does not fit a {} target", approx.family()),
                ));
            }
        }
        Ok(())
    }

    /// The bounds-check routine.
    ///
    /// In approx mode the candidate must be within the tolerance of the
    /// target. Otherwise every configured limit must hold.
    pub fn check(&self, candidate: &Scalar) -> std::result::Result<bool, Mismatch> {
        if let Some(approx) = &self.approx {
            let tolerance = self
                .delta
                .unwrap_or_else(|| Delta::default_for(candidate));
            return tolerance.allows(approx.distance(candidate)?);
        }
        for (bound, limit) in self.limits() {
            if !bound.eval_ordering(candidate.compare(limit)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Appends the configured fields as keyword arguments.
    pub(crate) fn render_into(&self, args: Args) -> Args {
        let scalar = |v: &Option<Scalar>| v.as_ref().map_or(Arg::Omit, |s| Arg::Value(s.to_value()));
        args.kwarg("approx", scalar(&self.approx))
            .kwarg("delta", self.delta.map_or(Arg::Omit, Delta::to_arg))
            .kwarg("gt", scalar(&self.gt))
            .kwarg("lt", scalar(&self.lt))
            .kwarg("ge", scalar(&self.ge))
            .kwarg("le", scalar(&self.le))
    }
}

fn join_families(families: &[Family]) -> String {
    let names: Vec<&str> = families.iter().map(|f| f.as_str()).collect();
    names.join(" or ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn bound_eval_ordering() {
        assert!(Bound::Gt.eval_ordering(Ordering::Greater));
        assert!(!Bound::Gt.eval_ordering(Ordering::Equal));
        assert!(Bound::Ge.eval_ordering(Ordering::Equal));
        assert!(!Bound::Ge.eval_ordering(Ordering::Less));
        assert!(Bound::Lt.eval_ordering(Ordering::Less));
        assert!(!Bound::Lt.eval_ordering(Ordering::Equal));
        assert!(Bound::Le.eval_ordering(Ordering::Equal));
        assert!(!Bound::Le.eval_ordering(Ordering::Greater));
    }

    #[test]
    fn empty_accepts_everything() {
        let bounds = Bounds::new();
        assert!(bounds.is_empty());
        assert_eq!(bounds.check(&Scalar::from(-1e9)), Ok(true));
    }

    #[test]
    fn every_limit_must_hold() {
        let bounds = Bounds::new().gt(0).le(10);
        assert_eq!(bounds.check(&Scalar::from(10)), Ok(true));
        assert_eq!(bounds.check(&Scalar::from(0)), Ok(false));
        assert_eq!(bounds.check(&Scalar::from(11)), Ok(false));
    }

    #[test]
    fn approx_uses_one_percent_of_candidate() {
        let bounds = Bounds::new().approx(99);
        assert_eq!(bounds.check(&Scalar::from(100)), Ok(true));
        assert_eq!(bounds.check(&Scalar::from(110)), Ok(false));
        let bounds = Bounds::new().approx(99).delta(11);
        assert_eq!(bounds.check(&Scalar::from(110)), Ok(true));
    }

    #[test]
    fn approx_conflicts_with_limits() {
        let err = Bounds::new()
            .approx(1)
            .lt(3)
            .validate("IsNumber", &[Family::Number])
            .unwrap_err();
        assert!(err.to_string().starts_with("IsNumber: \"approx\" cannot be combined"));
    }

    #[test]
    fn values_must_fit_the_family() {
        let day = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
        assert!(Bounds::new().gt(day).validate("IsInt", &[Family::Number]).is_err());
        assert!(Bounds::new().gt(day).validate("IsDate", &[Family::Date]).is_ok());
        assert!(Bounds::new()
            .approx(day)
            .delta(5)
            .validate("IsDate", &[Family::Date])
            .is_err());
        assert!(Bounds::new()
            .approx(day)
            .delta(5)
            .delta_in_seconds()
            .validate("IsDate", &[Family::Date])
            .is_ok());
    }

    #[test]
    fn rendering_skips_unset_fields() {
        let args = Bounds::new().gt(1).le(5.5).render_into(Args::new());
        assert_eq!(args.to_string(), "gt=1, le=5.5");
    }
}
