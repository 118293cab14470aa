//! List and tuple matchers.
//!
//! [`IsListOrTuple`] checks the container kind, an optional [`Length`]
//! constraint and then the members, in one of three modes:
//!
//! - **ordered items** (the default): items must equal the candidate's
//!   leading elements. Without a length constraint they must cover the whole
//!   candidate; with one, trailing elements are left unchecked.
//! - **unordered items**: every item must claim one equal element of the
//!   candidate. Duplicates count, and elements need only support equality.
//! - **positions**: selected indices (negative counts from the end) must
//!   hold the expected values.
//!
//! [`IsList`] and [`IsTuple`] narrow the accepted container kind. [`HasLen`]
//! checks length alone and [`Contains`] checks membership.
//!
//! ```
//! use eqmatch::{expected, IsList, IsListOrTuple, Length, SequenceBuilder, Value};
//!
//! assert_eq!(Value::list([1, 2, 3]), IsList::new(expected![1, 2, 3]));
//! assert_eq!(Value::tuple([3, 1, 2]), IsListOrTuple::unordered(expected![1, 2, 3]));
//!
//! let prefix = SequenceBuilder::new()
//!     .items(expected![1, 2, 3])
//!     .length(Length::at_least(4))
//!     .list()
//!     .unwrap();
//! assert_eq!(Value::list([1, 2, 3, 4, 5]), prefix);
//! ```

use std::fmt;

use crate::error::{MatchError, Mismatch, Result};
use crate::entry::Expected;
use crate::matcher::{delegate_matcher, matcher_impls, matcher_ops, MatchState, Matcher};
use crate::repr::{plain_repr, Arg, Args};
use crate::value::Value;

// =============================================================================
// Length
// =============================================================================

/// Length constraint on a sized value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Length {
    /// Exactly this many elements.
    Exact(usize),
    /// At least `min` elements and, if `max` is set, at most `max`.
    Range { min: usize, max: Option<usize> },
}

impl Length {
    /// Exactly `len` elements.
    pub fn exact(len: usize) -> Self {
        Length::Exact(len)
    }

    /// `min` or more elements.
    pub fn at_least(min: usize) -> Self {
        Length::Range { min, max: None }
    }

    /// Between `min` and `max` elements, inclusive.
    pub fn between(min: usize, max: usize) -> Self {
        Length::Range {
            min,
            max: Some(max),
        }
    }

    /// Returns `true` if `len` satisfies the constraint.
    pub fn admits(&self, len: usize) -> bool {
        match *self {
            Length::Exact(expected) => len == expected,
            Length::Range { min, max } => len >= min && max.map_or(true, |max| len <= max),
        }
    }

    pub(crate) fn validate(&self, matcher: &'static str) -> Result<()> {
        match *self {
            Length::Range {
                min,
                max: Some(max),
            } if min > max => Err(MatchError::config(
                matcher,
                format!("length minimum {} exceeds maximum {}", min, max),
            )),
            _ => Ok(()),
        }
    }

    /// `3`, `(3, 5)` or `(3, ...)`.
    fn to_arg(self) -> Arg {
        match self {
            Length::Exact(len) => Arg::from(len),
            Length::Range { min, max: Some(max) } => Arg::Plain(format!("({}, {})", min, max)),
            Length::Range { min, max: None } => Arg::Plain(format!("({}, ...)", min)),
        }
    }
}

fn length_of(candidate: &Value) -> std::result::Result<usize, Mismatch> {
    candidate
        .len()
        .ok_or_else(|| Mismatch::kind("str, bytes, list, tuple or dict", candidate))
}

// =============================================================================
// HasLen
// =============================================================================

/// Matches strings, bytes, lists, tuples and dicts by length.
///
/// ```
/// use eqmatch::{HasLen, Length, Value};
///
/// assert_eq!(Value::list([1, 2, 3]), HasLen::exact(3));
/// assert_eq!(Value::from("123"), HasLen::new(Length::at_least(3)).unwrap());
/// assert_ne!(Value::from(123), HasLen::exact(3));
/// ```
#[derive(Clone)]
pub struct HasLen {
    length: Length,
    state: MatchState,
}

impl HasLen {
    /// Matches lengths admitted by `length`.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`] if the range minimum exceeds the maximum.
    pub fn new(length: Length) -> Result<Self> {
        length.validate("HasLen")?;
        Ok(HasLen {
            length,
            state: MatchState::new(),
        })
    }

    /// Matches exactly `len`.
    pub fn exact(len: usize) -> Self {
        HasLen {
            length: Length::Exact(len),
            state: MatchState::new(),
        }
    }

    pub fn length(&self) -> Length {
        self.length
    }
}

impl Matcher for HasLen {
    fn name(&self) -> &str {
        "HasLen"
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        Ok(self.length.admits(length_of(candidate)?))
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        match self.length {
            Length::Exact(len) => Args::new().arg(len),
            Length::Range { min, max } => Args::new().arg(min).arg(match max {
                Some(max) => Arg::from(max),
                None => Arg::from(plain_repr("...")),
            }),
        }
    }
}

// =============================================================================
// IsListOrTuple
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeqKind {
    List,
    Tuple,
    Either,
}

impl SeqKind {
    fn name(self) -> &'static str {
        match self {
            SeqKind::List => "IsList",
            SeqKind::Tuple => "IsTuple",
            SeqKind::Either => "IsListOrTuple",
        }
    }

    fn items(self, candidate: &Value) -> std::result::Result<&[Value], Mismatch> {
        match (self, candidate) {
            (SeqKind::List | SeqKind::Either, Value::List(items)) => Ok(items.as_slice()),
            (SeqKind::Tuple | SeqKind::Either, Value::Tuple(items)) => Ok(items.as_slice()),
            (SeqKind::List, other) => Err(Mismatch::kind("list", other)),
            (SeqKind::Tuple, other) => Err(Mismatch::kind("tuple", other)),
            (SeqKind::Either, other) => Err(Mismatch::kind("list or tuple", other)),
        }
    }
}

#[derive(Clone)]
enum Members {
    Items(Vec<Expected>),
    Positions(Vec<(isize, Expected)>),
}

/// Configuration for the list and tuple matchers.
///
/// Finish with [`list`](SequenceBuilder::list),
/// [`tuple`](SequenceBuilder::tuple) or
/// [`list_or_tuple`](SequenceBuilder::list_or_tuple), which reject
/// conflicting settings.
#[derive(Clone)]
pub struct SequenceBuilder {
    items: Vec<Expected>,
    positions: Option<Vec<(isize, Expected)>>,
    check_order: bool,
    length: Option<Length>,
}

impl SequenceBuilder {
    /// Ordered, with no items and no length constraint.
    pub fn new() -> Self {
        SequenceBuilder {
            items: Vec::new(),
            positions: None,
            check_order: true,
            length: None,
        }
    }

    /// Expected members, starting from index zero.
    pub fn items(mut self, items: impl IntoIterator<Item = Expected>) -> Self {
        self.items = items.into_iter().collect();
        self
    }

    /// Expected values at selected indices, instead of items.
    pub fn positions(mut self, positions: impl IntoIterator<Item = (isize, Expected)>) -> Self {
        self.positions = Some(positions.into_iter().collect());
        self
    }

    /// Whether items must appear in order. Defaults to `true`.
    pub fn check_order(mut self, check_order: bool) -> Self {
        self.check_order = check_order;
        self
    }

    /// Length constraint on the candidate.
    pub fn length(mut self, length: Length) -> Self {
        self.length = Some(length);
        self
    }

    /// Builds a list-only matcher.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`] if positions are combined with items or
    /// with `check_order(false)`, or the length range is inverted.
    pub fn list(self) -> Result<IsList> {
        self.build(SeqKind::List).map(IsList)
    }

    /// Builds a tuple-only matcher. Errors as for [`list`](Self::list).
    pub fn tuple(self) -> Result<IsTuple> {
        self.build(SeqKind::Tuple).map(IsTuple)
    }

    /// Builds a matcher accepting either. Errors as for [`list`](Self::list).
    pub fn list_or_tuple(self) -> Result<IsListOrTuple> {
        self.build(SeqKind::Either)
    }

    fn build(self, kind: SeqKind) -> Result<IsListOrTuple> {
        let name = kind.name();
        if let Some(length) = &self.length {
            length.validate(name)?;
        }
        let members = match self.positions {
            Some(_) if !self.items.is_empty() => {
                return Err(MatchError::config(
                    name,
                    "requires either items or positions, not both",
                ));
            }
            Some(_) if !self.check_order => {
                return Err(MatchError::config(
                    name,
                    "check_order=false is not compatible with positions",
                ));
            }
            Some(positions) => Members::Positions(positions),
            None => Members::Items(self.items),
        };
        Ok(IsListOrTuple {
            kind,
            members,
            check_order: self.check_order,
            length: self.length,
            state: MatchState::new(),
        })
    }
}

impl Default for SequenceBuilder {
    fn default() -> Self {
        SequenceBuilder::new()
    }
}

impl fmt::Debug for SequenceBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceBuilder")
            .field("items", &self.items)
            .field("positions", &self.positions)
            .field("check_order", &self.check_order)
            .field("length", &self.length)
            .finish()
    }
}

/// Matches lists and tuples by their members.
#[derive(Clone)]
pub struct IsListOrTuple {
    kind: SeqKind,
    members: Members,
    check_order: bool,
    length: Option<Length>,
    state: MatchState,
}

impl IsListOrTuple {
    /// Matches a list or tuple holding exactly `items`, in order.
    pub fn new(items: impl IntoIterator<Item = Expected>) -> Self {
        IsListOrTuple::with_kind(SeqKind::Either, items, true)
    }

    /// Matches a list or tuple holding exactly `items`, in any order.
    pub fn unordered(items: impl IntoIterator<Item = Expected>) -> Self {
        IsListOrTuple::with_kind(SeqKind::Either, items, false)
    }

    /// Starts a configuration with positions or a length constraint.
    pub fn builder() -> SequenceBuilder {
        SequenceBuilder::new()
    }

    fn with_kind(kind: SeqKind, items: impl IntoIterator<Item = Expected>, check_order: bool) -> Self {
        IsListOrTuple {
            kind,
            members: Members::Items(items.into_iter().collect()),
            check_order,
            length: None,
            state: MatchState::new(),
        }
    }

    fn bare(kind: SeqKind) -> Self {
        IsListOrTuple {
            state: MatchState::bare(),
            ..IsListOrTuple::with_kind(kind, Vec::new(), true)
        }
    }

    fn ordered(&self, items: &[Expected], candidate: &[Value]) -> bool {
        let compared = match self.length {
            Some(_) => &candidate[..items.len().min(candidate.len())],
            None => candidate,
        };
        if compared.len() != items.len() {
            return false;
        }
        let mut all = true;
        for (expected, actual) in items.iter().zip(compared) {
            all &= expected.matches(actual);
        }
        all
    }

    fn unordered_match(&self, items: &[Expected], candidate: &[Value]) -> bool {
        if self.length.is_none() && candidate.len() != items.len() {
            return false;
        }
        let mut remaining: Vec<&Value> = candidate.iter().collect();
        for expected in items {
            match remaining.iter().position(|actual| expected.check(actual)) {
                Some(index) => {
                    expected.matches(remaining.remove(index));
                }
                None => return false,
            }
        }
        true
    }
}

fn resolve_index(index: isize, len: usize) -> Option<usize> {
    if index < 0 {
        len.checked_sub(index.unsigned_abs())
    } else {
        let index = index as usize;
        (index < len).then_some(index)
    }
}

impl Matcher for IsListOrTuple {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        let actual = self.kind.items(candidate)?;
        if let Some(length) = &self.length {
            if !length.admits(actual.len()) {
                return Ok(false);
            }
        }
        match &self.members {
            Members::Positions(positions) => {
                let mut all = true;
                for (index, expected) in positions {
                    let Some(resolved) = resolve_index(*index, actual.len()) else {
                        return Err(Mismatch::value(format!(
                            "index {} out of range for length {}",
                            index,
                            actual.len()
                        )));
                    };
                    all &= expected.matches(&actual[resolved]);
                }
                Ok(all)
            }
            Members::Items(items) if self.check_order => Ok(self.ordered(items, actual)),
            Members::Items(items) => Ok(self.unordered_match(items, actual)),
        }
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        let mut args = Args::new();
        let positions = match &self.members {
            Members::Items(items) => {
                for item in items {
                    args = args.arg(item.clone());
                }
                Arg::Omit
            }
            Members::Positions(positions) => {
                let entries: Vec<String> = positions
                    .iter()
                    .map(|(index, expected)| format!("{}: {:?}", index, expected))
                    .collect();
                Arg::Plain(format!("{{{}}}", entries.join(", ")))
            }
        };
        args.kwarg("positions", positions)
            .kwarg("length", self.length.map_or(Arg::Omit, Length::to_arg))
            .kwarg(
                "check_order",
                if self.check_order { Arg::Omit } else { Arg::from(false) },
            )
    }
}

impl Default for IsListOrTuple {
    fn default() -> Self {
        IsListOrTuple::bare(SeqKind::Either)
    }
}

matcher_impls!(IsListOrTuple, HasLen);
matcher_ops!(IsListOrTuple, HasLen);

macro_rules! sequence_variant {
    ($(#[$doc:meta])* $ty:ident, $kind:expr) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $ty(IsListOrTuple);

        impl $ty {
            /// Exactly `items`, in order.
            pub fn new(items: impl IntoIterator<Item = Expected>) -> Self {
                $ty(IsListOrTuple::with_kind($kind, items, true))
            }

            /// Exactly `items`, in any order.
            pub fn unordered(items: impl IntoIterator<Item = Expected>) -> Self {
                $ty(IsListOrTuple::with_kind($kind, items, false))
            }

            pub fn builder() -> SequenceBuilder {
                SequenceBuilder::new()
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                $ty(IsListOrTuple::bare($kind))
            }
        }

        delegate_matcher!($ty);
    };
}

sequence_variant!(
    /// Like [`IsListOrTuple`], but only lists match.
    ///
    /// ```
    /// use eqmatch::{expected, IsList, Value};
    ///
    /// assert_ne!(Value::tuple([1, 2, 3]), IsList::new(expected![1, 2, 3]));
    /// ```
    IsList,
    SeqKind::List
);
sequence_variant!(
    /// Like [`IsListOrTuple`], but only tuples match.
    IsTuple,
    SeqKind::Tuple
);

// =============================================================================
// Contains
// =============================================================================

/// Matches containers holding every expected value.
///
/// Strings and bytes are searched for substrings, lists and tuples for an
/// equal element, dicts for an equal key.
#[derive(Clone)]
pub struct Contains {
    needles: Vec<Expected>,
    state: MatchState,
}

impl Contains {
    pub fn new(needles: impl IntoIterator<Item = Expected>) -> Self {
        Contains {
            needles: needles.into_iter().collect(),
            state: MatchState::new(),
        }
    }

    fn contains(haystack: &Value, needle: &Expected) -> std::result::Result<bool, Mismatch> {
        match (haystack, needle) {
            (Value::Str(text), Expected::Value(Value::Str(part))) => Ok(text.contains(part.as_str())),
            (Value::Bytes(data), Expected::Value(Value::Bytes(part))) => {
                Ok(part.is_empty() || data.windows(part.len()).any(|w| w == part.as_slice()))
            }
            (Value::Str(_) | Value::Bytes(_), other) => Err(Mismatch::value(format!(
                "cannot search {} for {:?}",
                haystack.kind(),
                other
            ))),
            (Value::List(items) | Value::Tuple(items), needle) => {
                Ok(match items.iter().find(|item| needle.check(item)) {
                    Some(item) => needle.matches(item),
                    None => false,
                })
            }
            (Value::Dict(dict), needle) => Ok(match dict.keys().find(|key| needle.check(key)) {
                Some(key) => needle.matches(key),
                None => false,
            }),
            (other, _) => Err(Mismatch::kind("str, bytes, list, tuple or dict", other)),
        }
    }
}

impl Matcher for Contains {
    fn name(&self) -> &str {
        "Contains"
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        for needle in &self.needles {
            if !Contains::contains(candidate, needle)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        self.needles
            .iter()
            .fold(Args::new(), |args, needle| args.arg(needle.clone()))
    }
}

matcher_impls!(Contains);
matcher_ops!(Contains);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expected;
    use crate::numeric::{IsInt, IsPositive};
    use std::rc::Rc;

    #[test]
    fn length_constraints() {
        assert!(Length::exact(3).admits(3));
        assert!(!Length::exact(3).admits(4));
        assert!(Length::at_least(3).admits(300));
        assert!(!Length::at_least(3).admits(2));
        assert!(Length::between(3, 5).admits(5));
        assert!(!Length::between(3, 5).admits(6));
        assert!(HasLen::new(Length::between(5, 3)).is_err());
    }

    #[test]
    fn has_len_over_sized_values() {
        assert!(HasLen::exact(3).matches(&Value::list([1, 2, 3])));
        assert!(HasLen::exact(3).matches(&Value::from("héé")));
        assert!(HasLen::exact(1).matches(&Value::dict([("a", 1)])));
        assert!(HasLen::new(Length::at_least(0)).unwrap().matches(&Value::tuple([1, 2, 3])));
        assert!(!HasLen::exact(3).matches(&Value::from(3)));
    }

    #[test]
    fn ordered_items() {
        let m = IsListOrTuple::new(expected![1, 2, 3]);
        assert!(m.matches(&Value::list([1, 2, 3])));
        assert!(m.matches(&Value::tuple([1, 2, 3])));
        assert!(!m.matches(&Value::list([1, 3, 2])));
        assert!(!m.matches(&Value::list([1, 2, 3, 4])));
        assert!(!m.matches(&Value::from("123")));
    }

    #[test]
    fn kind_is_enforced() {
        assert!(!IsList::new(expected![1]).matches(&Value::tuple([1])));
        assert!(!IsTuple::new(expected![1]).matches(&Value::list([1])));
        assert!(IsTuple::new(expected![1]).matches(&Value::tuple([1])));
        assert!(IsList::default().matches(&Value::list(Vec::<Value>::new())));
    }

    #[test]
    fn prefix_with_length() {
        let open = SequenceBuilder::new()
            .items(expected![1, 2, 3])
            .length(Length::at_least(4))
            .list_or_tuple()
            .unwrap();
        assert!(open.matches(&Value::list([1, 2, 3, 4, 5])));
        assert!(!open.matches(&Value::list([1, 2, 3])));
        let exact = SequenceBuilder::new()
            .items(expected![1, 2, 3])
            .length(Length::exact(3))
            .list_or_tuple()
            .unwrap();
        assert!(!exact.matches(&Value::list([1, 2, 3, 4, 5])));
        let short = SequenceBuilder::new()
            .items(expected![1, 2, 3])
            .length(Length::at_least(0))
            .list_or_tuple()
            .unwrap();
        assert!(!short.matches(&Value::list([1, 2])));
    }

    #[test]
    fn unordered_counts_duplicates() {
        let candidate = Value::list([1, 2, 2]);
        assert!(IsListOrTuple::unordered(expected![2, 2, 1]).matches(&candidate));
        assert!(!IsListOrTuple::unordered(expected![1, 2, 3]).matches(&candidate));
        assert!(!IsListOrTuple::unordered(expected![1, 1, 2]).matches(&candidate));
        assert!(!IsListOrTuple::unordered(expected![1, 2]).matches(&candidate));
    }

    #[test]
    fn unordered_with_length_checks_membership() {
        let m = SequenceBuilder::new()
            .items(expected![3])
            .check_order(false)
            .length(Length::at_least(0))
            .list()
            .unwrap();
        assert!(m.matches(&Value::list([1, 2, 3, 4])));
        assert!(!m.matches(&Value::list([1, 2, 4])));
    }

    #[test]
    fn unordered_nested_matcher_records_the_claimed_element() {
        let positive = Rc::new(IsPositive::new());
        let m = IsList::unordered(vec![Expected::from(1), Expected::from(positive.clone())]);
        assert!(!m.matches(&Value::list([-1, 1])));
        assert!(m.matches(&Value::list([7, 1])));
        assert_eq!(positive.value().unwrap(), Value::from(7));
    }

    #[test]
    fn positions() {
        let m = SequenceBuilder::new()
            .positions([(2, Expected::from("c")), (-1, Expected::from("d"))])
            .list()
            .unwrap();
        assert!(m.matches(&Value::list(["a", "b", "c", "d"])));
        assert!(!m.matches(&Value::list(["a", "b", "c", "e"])));
        assert!(!m.matches(&Value::list(["a"])));
        let sized = SequenceBuilder::new()
            .positions([(0, Expected::from(IsInt::new()))])
            .length(Length::exact(2))
            .tuple()
            .unwrap();
        assert!(sized.matches(&Value::tuple([1, 2])));
        assert!(!sized.matches(&Value::tuple([1, 2, 3])));
    }

    #[test]
    fn conflicting_configuration() {
        let both = SequenceBuilder::new()
            .items(expected![1])
            .positions([(0, Expected::from(1))])
            .list();
        assert_eq!(
            both.unwrap_err().to_string(),
            "IsList: requires either items or positions, not both"
        );
        let unordered = SequenceBuilder::new()
            .positions([(0, Expected::from(1))])
            .check_order(false)
            .tuple();
        assert!(unordered.is_err());
        let inverted = SequenceBuilder::new().length(Length::between(4, 2)).list_or_tuple();
        assert!(inverted.is_err());
    }

    #[test]
    fn contains() {
        assert!(Contains::new(expected!["ell"]).matches(&Value::from("hello")));
        assert!(!Contains::new(expected!["xyz"]).matches(&Value::from("hello")));
        assert!(!Contains::new(expected![1]).matches(&Value::from("hello")));
        assert!(Contains::new(expected![Value::bytes(*b"el")]).matches(&Value::bytes(*b"hello")));
        assert!(Contains::new(expected![2, IsInt::new()]).matches(&Value::tuple([1, 2])));
        assert!(!Contains::new(expected![3]).matches(&Value::list([1, 2])));
        assert!(Contains::new(expected!["a"]).matches(&Value::dict([("a", 1)])));
        assert!(!Contains::new(expected![1]).matches(&Value::dict([("a", 1)])));
        assert!(!Contains::new(expected![1]).matches(&Value::from(1)));
    }

    #[test]
    fn rendering() {
        assert_eq!(format!("{:?}", IsList::default()), "IsList");
        assert_eq!(format!("{:?}", IsList::new(expected![1, "a"])), "IsList(1, \"a\")");
        assert_eq!(
            format!("{:?}", IsListOrTuple::unordered(expected![1])),
            "IsListOrTuple(1, check_order=false)"
        );
        let m = SequenceBuilder::new()
            .positions([(2, Expected::from("c"))])
            .length(Length::at_least(4))
            .tuple()
            .unwrap();
        assert_eq!(format!("{:?}", m), "IsTuple(positions={2: \"c\"}, length=(4, ...))");
        let m = SequenceBuilder::new()
            .items(expected![1])
            .length(Length::between(1, 3))
            .list()
            .unwrap();
        assert_eq!(format!("{:?}", m), "IsList(1, length=(1, 3))");
        assert_eq!(format!("{:?}", HasLen::exact(3)), "HasLen(3)");
        assert_eq!(
            format!("{:?}", HasLen::new(Length::at_least(3)).unwrap()),
            "HasLen(3, ...)"
        );
        assert_eq!(format!("{:?}", Contains::new(expected!["a", 1])), "Contains(\"a\", 1)");
    }
}
