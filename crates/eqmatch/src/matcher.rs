//! The matcher contract.
//!
//! Every matcher implements [`Matcher`]. Implementors supply a predicate,
//! [`Matcher::equals`], plus a name and a [`MatchState`]; the trait provides
//! the equality entry points and diagnostic rendering on top.
//!
//! # Equality entry points
//!
//! - [`Matcher::matches`] records the candidate and the outcome, then answers.
//!   This is what `==` calls.
//! - [`Matcher::differs`] answers the negation without touching recorded
//!   state. This is what `!=` calls, so an `assert_ne!` evaluated while a
//!   failure is being reported cannot overwrite the state being rendered.
//!
//! A [`Mismatch`] returned by the predicate never escapes either entry
//! point; it is logged at `trace` level and counted as "no match".
//!
//! # Rendering
//!
//! After a successful comparison a matcher renders as the value it matched,
//! so assertion diffs line up with real data. Otherwise it renders as its
//! name and arguments: `IsInt(gt=1)`. The zero-argument instance returned by
//! `Default` renders as the bare name, `IsInt`.
//!
//! ```
//! use eqmatch::{IsInt, Matcher, Value};
//!
//! let m = IsInt::new();
//! assert_eq!(format!("{:?}", m), "IsInt()");
//! assert_eq!(Value::from(3), m);
//! assert_eq!(format!("{:?}", m), "3");
//! assert_eq!(m.value().unwrap(), Value::from(3));
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::error::{MatchError, Mismatch, Result};
use crate::repr::Args;
use crate::value::Value;

/// Shared handle to a type-erased matcher, used by combinators and
/// containers.
pub type MatcherRef = Rc<dyn Matcher>;

/// Binding strength of a matcher's rendered form, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    /// `a | b`
    Or,
    /// `a & b`
    And,
    /// `~a`
    Unary,
    /// Leaf matchers and matched values.
    Atom,
}

/// Diagnostic state of one matcher instance.
///
/// Holds the last operand and the outcome of the last recorded comparison.
/// Interior mutability keeps the equality entry points on `&self`; it also
/// makes matchers `!Sync`, so one instance cannot be shared across threads.
///
/// Cloning yields fresh state: a clone has not compared anything yet.
pub struct MatchState {
    bare: bool,
    operand: RefCell<Option<Value>>,
    result: Cell<Option<bool>>,
}

impl MatchState {
    /// State for an explicitly constructed matcher, rendered with parentheses.
    pub fn new() -> Self {
        MatchState {
            bare: false,
            operand: RefCell::new(None),
            result: Cell::new(None),
        }
    }

    /// State for the zero-argument default instance, rendered as a bare name.
    pub fn bare() -> Self {
        MatchState {
            bare: true,
            ..MatchState::new()
        }
    }

    /// Returns `true` for the bare default instance.
    pub fn is_bare(&self) -> bool {
        self.bare
    }

    /// Outcome of the last recorded comparison, `None` before any.
    pub fn last_result(&self) -> Option<bool> {
        self.result.get()
    }

    /// Operand of the last recorded comparison.
    pub fn last_operand(&self) -> Option<Value> {
        self.operand.borrow().clone()
    }

    /// Returns `true` if the last recorded comparison matched.
    pub fn has_matched(&self) -> bool {
        self.result.get() == Some(true)
    }

    /// The operand of the last comparison, if it matched.
    pub fn matched_value(&self) -> Option<Value> {
        if self.has_matched() {
            self.last_operand()
        } else {
            None
        }
    }

    fn record(&self, operand: &Value, result: bool) {
        *self.operand.borrow_mut() = Some(operand.clone());
        self.result.set(Some(result));
    }
}

impl Default for MatchState {
    fn default() -> Self {
        MatchState::new()
    }
}

impl Clone for MatchState {
    fn clone(&self) -> Self {
        MatchState {
            bare: self.bare,
            ..MatchState::new()
        }
    }
}

impl fmt::Debug for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchState")
            .field("bare", &self.bare)
            .field("operand", &self.operand.borrow())
            .field("result", &self.result.get())
            .finish()
    }
}

/// A value that compares equal to candidates satisfying a predicate.
pub trait Matcher: fmt::Debug {
    /// Name used when rendering, e.g. `"IsInt"`.
    fn name(&self) -> &str;

    /// The predicate.
    ///
    /// Returns `Ok(false)` for a compatible candidate with the wrong value
    /// and `Err` when the candidate's shape rules out a match.
    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch>;

    /// Diagnostic state of this instance.
    fn state(&self) -> &MatchState;

    /// Constructor arguments to show when rendering.
    fn repr_args(&self) -> Args {
        Args::new()
    }

    /// Binding strength of the unmatched rendering.
    fn precedence(&self) -> Precedence {
        Precedence::Atom
    }

    /// Equality entry point: evaluates the predicate and records the operand
    /// and the outcome.
    fn matches(&self, candidate: &Value) -> bool {
        let result = self.check(candidate);
        self.state().record(candidate, result);
        result
    }

    /// Evaluates the predicate without recording anything.
    fn check(&self, candidate: &Value) -> bool {
        match self.equals(candidate) {
            Ok(result) => result,
            Err(mismatch) => {
                tracing::trace!(matcher = self.name(), %mismatch, "candidate rejected");
                false
            }
        }
    }

    /// Inverse equality entry point. Leaves recorded state untouched.
    fn differs(&self, candidate: &Value) -> bool {
        !self.check(candidate)
    }

    /// The value matched by the last comparison.
    ///
    /// # Errors
    ///
    /// [`MatchError::ValueUnavailable`] if no comparison has happened yet or
    /// the last one did not match.
    fn value(&self) -> Result<Value> {
        self.state()
            .matched_value()
            .ok_or(MatchError::ValueUnavailable)
    }

    /// Writes the diagnostic form: the matched value if the last comparison
    /// matched, the expected form otherwise.
    fn render(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.state().matched_value() {
            Some(value) => write!(f, "{:?}", value),
            None => self.render_expected(f),
        }
    }

    /// Writes `Name(args)`, or `Name` for a bare instance without arguments.
    fn render_expected(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.repr_args();
        if self.state().is_bare() && args.is_empty() {
            f.write_str(self.name())
        } else {
            write!(f, "{}({})", self.name(), args)
        }
    }
}

impl PartialEq<MatcherRef> for Value {
    fn eq(&self, other: &MatcherRef) -> bool {
        other.matches(self)
    }

    #[allow(clippy::partialeq_ne_impl)]
    fn ne(&self, other: &MatcherRef) -> bool {
        other.differs(self)
    }
}

/// Implements the equality protocol, `Debug` and the conversions into
/// [`MatcherRef`] and [`Expected`](crate::Expected) for matcher types.
macro_rules! matcher_impls {
    ($($ty:ty),* $(,)?) => {$(
        impl ::std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                $crate::matcher::Matcher::render(self, f)
            }
        }

        impl PartialEq<$crate::value::Value> for $ty {
            fn eq(&self, other: &$crate::value::Value) -> bool {
                $crate::matcher::Matcher::matches(self, other)
            }

            #[allow(clippy::partialeq_ne_impl)]
            fn ne(&self, other: &$crate::value::Value) -> bool {
                $crate::matcher::Matcher::differs(self, other)
            }
        }

        impl PartialEq<$ty> for $crate::value::Value {
            fn eq(&self, other: &$ty) -> bool {
                $crate::matcher::Matcher::matches(other, self)
            }

            #[allow(clippy::partialeq_ne_impl)]
            fn ne(&self, other: &$ty) -> bool {
                $crate::matcher::Matcher::differs(other, self)
            }
        }

        impl From<$ty> for $crate::matcher::MatcherRef {
            fn from(m: $ty) -> Self {
                ::std::rc::Rc::new(m)
            }
        }

        impl From<$ty> for $crate::entry::Expected {
            fn from(m: $ty) -> Self {
                $crate::entry::Expected::Matcher(::std::rc::Rc::new(m))
            }
        }
    )*};
}

/// Implements `|`, `&` and `!` for leaf matcher types.
macro_rules! matcher_ops {
    ($($ty:ty),* $(,)?) => {$(
        impl<R: Into<$crate::matcher::MatcherRef>> ::std::ops::BitOr<R> for $ty {
            type Output = $crate::combinator::AnyOf;

            fn bitor(self, rhs: R) -> Self::Output {
                $crate::combinator::AnyOf::new(vec![self.into(), rhs.into()])
            }
        }

        impl<R: Into<$crate::matcher::MatcherRef>> ::std::ops::BitAnd<R> for $ty {
            type Output = $crate::combinator::AllOf;

            fn bitand(self, rhs: R) -> Self::Output {
                $crate::combinator::AllOf::new(vec![self.into(), rhs.into()])
            }
        }

        impl ::std::ops::Not for $ty {
            type Output = $crate::combinator::Inverted;

            fn not(self) -> Self::Output {
                $crate::combinator::Inverted::new(self)
            }
        }
    )*};
}

/// Implements [`Matcher`] plus the equality and operator impls for a
/// single-field newtype by forwarding to the wrapped matcher.
macro_rules! delegate_matcher {
    ($($ty:ident),* $(,)?) => {$(
        impl $crate::matcher::Matcher for $ty {
            fn name(&self) -> &str {
                $crate::matcher::Matcher::name(&self.0)
            }

            fn equals(
                &self,
                candidate: &$crate::value::Value,
            ) -> ::std::result::Result<bool, $crate::error::Mismatch> {
                $crate::matcher::Matcher::equals(&self.0, candidate)
            }

            fn state(&self) -> &$crate::matcher::MatchState {
                $crate::matcher::Matcher::state(&self.0)
            }

            fn repr_args(&self) -> $crate::repr::Args {
                $crate::matcher::Matcher::repr_args(&self.0)
            }

            fn render_expected(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                $crate::matcher::Matcher::render_expected(&self.0, f)
            }
        }

        $crate::matcher::matcher_impls!($ty);
        $crate::matcher::matcher_ops!($ty);
    )*};
}

pub(crate) use delegate_matcher;
pub(crate) use matcher_impls;
pub(crate) use matcher_ops;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct IsEven {
        state: MatchState,
    }

    impl Matcher for IsEven {
        fn name(&self) -> &str {
            "IsEven"
        }

        fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
            match candidate {
                Value::Int(n) => Ok(n % 2 == 0),
                other => Err(Mismatch::kind("int", other)),
            }
        }

        fn state(&self) -> &MatchState {
            &self.state
        }
    }

    matcher_impls!(IsEven);
    matcher_ops!(IsEven);

    fn even() -> IsEven {
        IsEven {
            state: MatchState::new(),
        }
    }

    #[test]
    fn matches_records_operand_and_result() {
        let m = even();
        assert_eq!(m.state().last_result(), None);
        assert!(m.matches(&Value::from(4)));
        assert_eq!(m.state().last_result(), Some(true));
        assert_eq!(m.state().last_operand(), Some(Value::from(4)));
        assert!(!m.matches(&Value::from(3)));
        assert_eq!(m.state().last_result(), Some(false));
    }

    #[test]
    fn mismatch_is_absorbed() {
        let m = even();
        assert!(!m.matches(&Value::from("four")));
        assert_eq!(m.state().last_result(), Some(false));
    }

    #[test]
    fn differs_leaves_state_alone() {
        let m = even();
        assert!(m.matches(&Value::from(2)));
        assert!(m.differs(&Value::from(3)));
        assert_eq!(m.state().last_result(), Some(true));
        assert_eq!(format!("{:?}", m), "2");
    }

    #[test]
    fn value_before_match_is_an_error() {
        let m = even();
        assert!(matches!(m.value(), Err(MatchError::ValueUnavailable)));
        assert!(!m.matches(&Value::from(1)));
        assert!(matches!(m.value(), Err(MatchError::ValueUnavailable)));
        assert!(m.matches(&Value::from(0)));
        assert_eq!(m.value().unwrap(), Value::from(0));
    }

    #[test]
    fn renders_name_until_matched() {
        let m = even();
        assert_eq!(format!("{:?}", m), "IsEven()");
        let bare = IsEven {
            state: MatchState::bare(),
        };
        assert_eq!(format!("{:?}", bare), "IsEven");
    }

    #[test]
    fn equality_works_in_both_directions() {
        assert_eq!(Value::from(2), even());
        assert_eq!(even(), Value::from(2));
        assert_ne!(Value::from(3), even());
        let shared: MatcherRef = even().into();
        assert!(Value::from(6) == shared);
    }

    #[test]
    fn clone_starts_fresh() {
        let m = even();
        assert!(m.matches(&Value::from(2)));
        let copy = m.clone();
        assert_eq!(copy.state().last_result(), None);
    }
}
