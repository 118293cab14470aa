//! Runtime type membership.

use crate::error::Mismatch;
use crate::matcher::{matcher_impls, matcher_ops, MatchState, Matcher};
use crate::repr::{plain_repr, Arg, Args};
use crate::value::{Kind, Value};

/// Matches values whose [`Kind`] is one of the expected kinds.
///
/// By default sub-kinds count (`true` is an `int`); with
/// [`only_direct_instance`](IsInstance::only_direct_instance) the kind must
/// be exactly one of the expected kinds.
///
/// ```
/// use eqmatch::{IsInstance, Kind, Value};
///
/// assert_eq!(Value::from(true), IsInstance::of(Kind::Int));
/// assert_ne!(Value::from(true), IsInstance::of(Kind::Int).only_direct_instance());
/// assert_eq!(Value::from("x"), IsInstance::of_any([Kind::Int, Kind::Str]));
/// ```
#[derive(Clone)]
pub struct IsInstance {
    kinds: Vec<Kind>,
    direct: bool,
    state: MatchState,
}

impl IsInstance {
    /// Matches instances of `kind`.
    pub fn of(kind: Kind) -> Self {
        IsInstance::of_any([kind])
    }

    /// Matches instances of any of `kinds`.
    pub fn of_any(kinds: impl IntoIterator<Item = Kind>) -> Self {
        IsInstance {
            kinds: kinds.into_iter().collect(),
            direct: false,
            state: MatchState::new(),
        }
    }

    /// Requires the exact kind, ignoring the sub-kind hierarchy.
    pub fn only_direct_instance(mut self) -> Self {
        self.direct = true;
        self
    }

    /// The expected kinds.
    pub fn kinds(&self) -> &[Kind] {
        &self.kinds
    }
}

impl From<Kind> for IsInstance {
    fn from(kind: Kind) -> Self {
        IsInstance::of(kind)
    }
}

impl Matcher for IsInstance {
    fn name(&self) -> &str {
        "IsInstance"
    }

    fn equals(&self, candidate: &Value) -> Result<bool, Mismatch> {
        let actual = candidate.kind();
        Ok(self.kinds.iter().any(|&expected| {
            if self.direct {
                actual == expected
            } else {
                actual.is_subkind_of(expected)
            }
        }))
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        let names: Vec<&str> = self.kinds.iter().map(|k| k.as_str()).collect();
        let kinds = match names.as_slice() {
            [single] => single.to_string(),
            many => format!("({})", many.join(", ")),
        };
        Args::new()
            .arg(plain_repr(kinds))
            .kwarg("only_direct_instance", Arg::flag(self.direct))
    }
}

matcher_impls!(IsInstance);
matcher_ops!(IsInstance);

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn subkinds_match_by_default() {
        let m = IsInstance::of(Kind::Date);
        let dt = NaiveDate::from_ymd_opt(2000, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert!(m.matches(&Value::from(dt)));
        assert!(!m.clone().only_direct_instance().matches(&Value::from(dt)));
    }

    #[test]
    fn any_of_several_kinds() {
        let m = IsInstance::of_any([Kind::Int, Kind::Str]);
        assert!(m.matches(&Value::from(1)));
        assert!(m.matches(&Value::from("a")));
        assert!(!m.matches(&Value::from(1.5)));
    }

    #[test]
    fn rendering() {
        assert_eq!(format!("{:?}", IsInstance::from(Kind::Int)), "IsInstance(int)");
        assert_eq!(
            format!("{:?}", IsInstance::of_any([Kind::Int, Kind::Str]).only_direct_instance()),
            "IsInstance((int, str), only_direct_instance=true)"
        );
    }
}
