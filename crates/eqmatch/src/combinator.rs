//! Logical combinators over matchers.
//!
//! [`AnyOf`], [`AllOf`] and [`Inverted`] are usually built with the `|`, `&`
//! and `!` operators:
//!
//! ```
//! use eqmatch::{IsInt, IsPositive, IsStr, Value};
//!
//! let m = IsStr::default() | IsInt::default();
//! assert_eq!(format!("{:?}", m), "IsStr | IsInt");
//! assert_eq!(Value::from(1), m);
//!
//! let m = IsInt::new() & IsPositive::default();
//! assert_eq!(format!("{:?}", m), "IsInt() & IsPositive");
//! assert_ne!(Value::from(-1), m);
//!
//! let m = !IsInt::default();
//! assert_eq!(format!("{:?}", m), "~IsInt");
//! assert_eq!(Value::from("x"), m);
//! ```
//!
//! `AnyOf` and `AllOf` evaluate every child, left to right, through the
//! child's equality entry point, so each child's diagnostic state reflects
//! the same candidate. `Inverted` negates a fresh evaluation of its child
//! and leaves the child's state alone.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::error::Mismatch;
use crate::matcher::{matcher_impls, MatchState, Matcher, MatcherRef, Precedence};
use crate::value::Value;

// =============================================================================
// Rendering helpers
// =============================================================================

fn write_child(f: &mut fmt::Formatter<'_>, child: &MatcherRef, parent: Precedence) -> fmt::Result {
    if child.state().has_matched() || child.precedence() >= parent {
        write!(f, "{:?}", child)
    } else {
        write!(f, "({:?})", child)
    }
}

fn write_joined(
    f: &mut fmt::Formatter<'_>,
    children: &[MatcherRef],
    separator: &str,
    parent: Precedence,
) -> fmt::Result {
    for (i, child) in children.iter().enumerate() {
        if i > 0 {
            f.write_str(separator)?;
        }
        write_child(f, child, parent)?;
    }
    Ok(())
}

// =============================================================================
// AnyOf
// =============================================================================

/// Matches if any child matches.
pub struct AnyOf {
    children: Vec<MatcherRef>,
    state: MatchState,
}

impl AnyOf {
    /// Creates a disjunction of `children`.
    pub fn new(children: Vec<MatcherRef>) -> Self {
        AnyOf {
            children,
            state: MatchState::new(),
        }
    }

    /// The children, in evaluation order.
    pub fn children(&self) -> &[MatcherRef] {
        &self.children
    }
}

impl Matcher for AnyOf {
    fn name(&self) -> &str {
        "AnyOf"
    }

    fn equals(&self, candidate: &Value) -> Result<bool, Mismatch> {
        let mut any = false;
        for child in &self.children {
            any |= child.matches(candidate);
        }
        Ok(any)
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn precedence(&self) -> Precedence {
        Precedence::Or
    }

    fn render_expected(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.children, " | ", Precedence::Or)
    }
}

// =============================================================================
// AllOf
// =============================================================================

/// Matches if every child matches.
pub struct AllOf {
    children: Vec<MatcherRef>,
    state: MatchState,
}

impl AllOf {
    /// Creates a conjunction of `children`.
    pub fn new(children: Vec<MatcherRef>) -> Self {
        AllOf {
            children,
            state: MatchState::new(),
        }
    }

    /// The children, in evaluation order.
    pub fn children(&self) -> &[MatcherRef] {
        &self.children
    }
}

impl Matcher for AllOf {
    fn name(&self) -> &str {
        "AllOf"
    }

    fn equals(&self, candidate: &Value) -> Result<bool, Mismatch> {
        let mut all = true;
        for child in &self.children {
            all &= child.matches(candidate);
        }
        Ok(all)
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn precedence(&self) -> Precedence {
        Precedence::And
    }

    fn render_expected(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_joined(f, &self.children, " & ", Precedence::And)
    }
}

// =============================================================================
// Inverted
// =============================================================================

/// Matches if the child does not.
pub struct Inverted {
    child: MatcherRef,
    state: MatchState,
}

impl Inverted {
    /// Negates `child`.
    pub fn new(child: impl Into<MatcherRef>) -> Self {
        Inverted {
            child: child.into(),
            state: MatchState::new(),
        }
    }

    /// The negated matcher.
    pub fn child(&self) -> &MatcherRef {
        &self.child
    }
}

impl Matcher for Inverted {
    fn name(&self) -> &str {
        "Inverted"
    }

    fn equals(&self, candidate: &Value) -> Result<bool, Mismatch> {
        Ok(!self.child.check(candidate))
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn precedence(&self) -> Precedence {
        Precedence::Unary
    }

    fn render_expected(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("~")?;
        write_child(f, &self.child, Precedence::Unary)
    }
}

matcher_impls!(AnyOf, AllOf, Inverted);

// =============================================================================
// Operators
// =============================================================================

impl<R: Into<MatcherRef>> BitOr<R> for AnyOf {
    type Output = AnyOf;

    fn bitor(self, rhs: R) -> AnyOf {
        let mut children = self.children;
        children.push(rhs.into());
        AnyOf::new(children)
    }
}

impl<R: Into<MatcherRef>> BitAnd<R> for AnyOf {
    type Output = AllOf;

    fn bitand(self, rhs: R) -> AllOf {
        AllOf::new(vec![self.into(), rhs.into()])
    }
}

impl<R: Into<MatcherRef>> BitOr<R> for AllOf {
    type Output = AnyOf;

    fn bitor(self, rhs: R) -> AnyOf {
        AnyOf::new(vec![self.into(), rhs.into()])
    }
}

impl<R: Into<MatcherRef>> BitAnd<R> for AllOf {
    type Output = AllOf;

    fn bitand(self, rhs: R) -> AllOf {
        let mut children = self.children;
        children.push(rhs.into());
        AllOf::new(children)
    }
}

impl<R: Into<MatcherRef>> BitOr<R> for Inverted {
    type Output = AnyOf;

    fn bitor(self, rhs: R) -> AnyOf {
        AnyOf::new(vec![self.into(), rhs.into()])
    }
}

impl<R: Into<MatcherRef>> BitAnd<R> for Inverted {
    type Output = AllOf;

    fn bitand(self, rhs: R) -> AllOf {
        AllOf::new(vec![self.into(), rhs.into()])
    }
}

impl Not for AnyOf {
    type Output = Inverted;

    fn not(self) -> Inverted {
        Inverted::new(self)
    }
}

impl Not for AllOf {
    type Output = Inverted;

    fn not(self) -> Inverted {
        Inverted::new(self)
    }
}

impl Not for Inverted {
    type Output = Inverted;

    fn not(self) -> Inverted {
        Inverted::new(self)
    }
}
