//! Dictionary matcher.
//!
//! [`IsDict`] compares a dict candidate against expected entries, where each
//! expected value may be a literal or a nested matcher. Three independent
//! settings shape the comparison:
//!
//! - **partial**: candidate keys absent from the expected entries are
//!   dropped before comparing. Expected keys missing from the candidate
//!   still fail.
//! - **ignore**: entries whose value is ignorable are dropped from both
//!   sides. A nested matcher is never ignorable.
//! - **strict**: after the entries match, the candidate's key order must
//!   equal the expected key order.
//!
//! `partial` and `ignore` are mutually exclusive. [`IsDict::settings`]
//! returns a new matcher and leaves the receiver untouched, so one base
//! matcher can seed several variants.
//!
//! ```
//! use eqmatch::{dict, DictSettings, Ignore, IsDict, Value};
//!
//! let payload = Value::dict([("a", Value::from(1)), ("b", Value::from(2)), ("c", Value::None)]);
//! let base = IsDict::new(dict! { "a" => 1, "b" => 2 });
//! assert_ne!(payload, base);
//!
//! let loose = base.settings(DictSettings::new().ignore(Ignore::none())).unwrap();
//! assert_eq!(payload, loose);
//! assert_eq!(payload, IsDict::partial(dict! { "a" => 1 }));
//! ```

use std::fmt;
use std::rc::Rc;

use crate::error::{MatchError, Mismatch, Result};
use crate::entry::Expected;
use crate::matcher::{matcher_impls, matcher_ops, MatchState, Matcher};
use crate::value::{Dict, Value};

// =============================================================================
// Ignore
// =============================================================================

/// Values to leave out of a dict comparison.
#[derive(Clone)]
pub enum Ignore {
    /// Entries whose value equals one of these are dropped. An empty list
    /// drops nothing.
    Values(Vec<Value>),
    /// Entries whose value satisfies the predicate are dropped.
    Predicate {
        /// Name shown in diagnostics.
        name: String,
        /// The test.
        test: Rc<dyn Fn(&Value) -> bool>,
    },
}

impl Ignore {
    /// Ignores `None` values.
    pub fn none() -> Self {
        Ignore::Values(vec![Value::None])
    }

    /// Ignores any of `values`.
    pub fn values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Ignore::Values(values.into_iter().map(Into::into).collect())
    }

    /// Ignores values for which `test` returns `true`.
    pub fn predicate(name: impl Into<String>, test: impl Fn(&Value) -> bool + 'static) -> Self {
        Ignore::Predicate {
            name: name.into(),
            test: Rc::new(test),
        }
    }

    /// Returns `true` if this setting can drop anything.
    pub fn is_active(&self) -> bool {
        match self {
            Ignore::Values(values) => !values.is_empty(),
            Ignore::Predicate { .. } => true,
        }
    }

    /// Returns `true` if a candidate value is ignorable.
    pub fn ignores(&self, value: &Value) -> bool {
        match self {
            Ignore::Values(values) => values.contains(value),
            Ignore::Predicate { test, .. } => test(value),
        }
    }

    fn ignores_expected(&self, expected: &Expected) -> bool {
        match expected {
            Expected::Matcher(_) => false,
            Expected::Value(value) => self.ignores(value),
        }
    }

    fn is_none_only(&self) -> bool {
        matches!(self, Ignore::Values(values) if values.as_slice() == [Value::None])
    }
}

impl fmt::Debug for Ignore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ignore::Values(values) => {
                f.write_str("{")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}", v)?;
                }
                f.write_str("}")
            }
            Ignore::Predicate { name, .. } => f.write_str(name),
        }
    }
}

// =============================================================================
// Settings
// =============================================================================

/// Changes applied by [`IsDict::settings`].
///
/// Each field is left alone unless named, so `.settings(...)` only changes
/// what it mentions.
#[derive(Clone, Default)]
pub struct DictSettings {
    strict: Option<bool>,
    partial: Option<bool>,
    ignore: Option<Option<Ignore>>,
}

impl DictSettings {
    /// Changes nothing.
    pub fn new() -> Self {
        DictSettings::default()
    }

    /// Sets key-order enforcement.
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }

    /// Sets partial matching.
    pub fn partial(mut self, partial: bool) -> Self {
        self.partial = Some(partial);
        self
    }

    /// Sets the values to ignore.
    pub fn ignore(mut self, ignore: Ignore) -> Self {
        self.ignore = Some(Some(ignore));
        self
    }

    /// Clears any ignore setting.
    pub fn no_ignore(mut self) -> Self {
        self.ignore = Some(None);
        self
    }
}

// =============================================================================
// IsDict
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavour {
    Plain,
    Partial,
    Strict,
    IgnoreNone,
}

impl Flavour {
    fn name(self) -> &'static str {
        match self {
            Flavour::Plain => "IsDict",
            Flavour::Partial => "IsPartialDict",
            Flavour::Strict => "IsStrictDict",
            Flavour::IgnoreNone => "IsIgnoreDict",
        }
    }
}

/// Structural dict matcher.
///
/// Build it from `(key, expected)` pairs, usually with the
/// [`dict!`](crate::dict) macro. The flavoured constructors preset one
/// setting and render under their own name: [`IsDict::partial`] as
/// `IsPartialDict`, [`IsDict::strict`] as `IsStrictDict` and
/// [`IsDict::ignoring_none`] as `IsIgnoreDict`.
#[derive(Clone)]
pub struct IsDict {
    flavour: Flavour,
    expected: Vec<(Value, Expected)>,
    strict: bool,
    partial: bool,
    ignore: Option<Ignore>,
    state: MatchState,
}

impl IsDict {
    /// Exact comparison of the entries, in any order.
    pub fn new(expected: impl IntoIterator<Item = (Value, Expected)>) -> Self {
        IsDict::flavoured(Flavour::Plain, expected, MatchState::new())
    }

    /// Compares only the expected keys.
    pub fn partial(expected: impl IntoIterator<Item = (Value, Expected)>) -> Self {
        IsDict::flavoured(Flavour::Partial, expected, MatchState::new())
    }

    /// Requires the candidate's keys in the expected order.
    pub fn strict(expected: impl IntoIterator<Item = (Value, Expected)>) -> Self {
        IsDict::flavoured(Flavour::Strict, expected, MatchState::new())
    }

    /// Drops `None` values from both sides.
    pub fn ignoring_none(expected: impl IntoIterator<Item = (Value, Expected)>) -> Self {
        IsDict::flavoured(Flavour::IgnoreNone, expected, MatchState::new())
    }

    /// Exact comparison against a literal dict.
    pub fn from_dict(expected: &Dict) -> Self {
        IsDict::new(
            expected
                .iter()
                .map(|(k, v)| (k.clone(), Expected::Value(v.clone()))),
        )
    }

    fn flavoured(
        flavour: Flavour,
        expected: impl IntoIterator<Item = (Value, Expected)>,
        state: MatchState,
    ) -> Self {
        let mut entries: Vec<(Value, Expected)> = Vec::new();
        for (key, value) in expected {
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(slot) => slot.1 = value,
                None => entries.push((key, value)),
            }
        }
        IsDict {
            flavour,
            expected: entries,
            strict: flavour == Flavour::Strict,
            partial: flavour == Flavour::Partial,
            ignore: (flavour == Flavour::IgnoreNone).then(Ignore::none),
            state,
        }
    }

    /// Returns a reconfigured copy; the receiver is not modified.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`] if the result would combine `partial`
    /// with an active `ignore`.
    pub fn settings(&self, settings: DictSettings) -> Result<IsDict> {
        let mut next = IsDict {
            state: MatchState::new(),
            ..self.clone()
        };
        if let Some(strict) = settings.strict {
            next.strict = strict;
        }
        if let Some(partial) = settings.partial {
            next.partial = partial;
        }
        if let Some(ignore) = settings.ignore {
            next.ignore = ignore;
        }
        if next.partial && next.active_ignore().is_some() {
            return Err(MatchError::config(
                self.flavour.name(),
                "partial and ignore cannot be used together",
            ));
        }
        Ok(next)
    }

    /// The expected entries, in order.
    pub fn expected(&self) -> &[(Value, Expected)] {
        &self.expected
    }

    /// Returns `true` if key order is enforced.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Returns `true` if extra candidate keys are dropped.
    pub fn is_partial(&self) -> bool {
        self.partial
    }

    fn active_ignore(&self) -> Option<&Ignore> {
        self.ignore.as_ref().filter(|ignore| ignore.is_active())
    }

    fn is_expected_key(&self, key: &Value) -> bool {
        self.expected.iter().any(|(k, _)| k == key)
    }

    fn modifiers(&self) -> Vec<String> {
        let mut modifiers = Vec::new();
        if self.partial != (self.flavour == Flavour::Partial) {
            modifiers.push(format!("partial={}", self.partial));
        }
        let ignore_default = self.flavour == Flavour::IgnoreNone;
        let show_ignore = match &self.ignore {
            None => ignore_default,
            Some(ignore) if ignore.is_none_only() => !ignore_default,
            Some(_) => true,
        };
        if show_ignore {
            match &self.ignore {
                Some(ignore) => modifiers.push(format!("ignore={:?}", ignore)),
                None => modifiers.push("ignore=None".to_string()),
            }
        }
        if self.strict != (self.flavour == Flavour::Strict) {
            modifiers.push(format!("strict={}", self.strict));
        }
        modifiers
    }
}

impl Default for IsDict {
    fn default() -> Self {
        IsDict::flavoured(Flavour::Plain, Vec::new(), MatchState::bare())
    }
}

impl Matcher for IsDict {
    fn name(&self) -> &str {
        self.flavour.name()
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        let Some(actual) = candidate.as_dict() else {
            return Ok(false);
        };
        let ignore = self.active_ignore();
        let expected: Vec<&(Value, Expected)> = self
            .expected
            .iter()
            .filter(|(_, value)| !ignore.is_some_and(|i| i.ignores_expected(value)))
            .collect();
        let actual: Vec<(&Value, &Value)> = actual
            .iter()
            .filter(|(key, _)| !self.partial || self.is_expected_key(key))
            .filter(|(_, value)| !ignore.is_some_and(|i| i.ignores(value)))
            .collect();

        if actual.len() != expected.len() {
            return Ok(false);
        }
        let mut all = true;
        for (key, value) in &expected {
            match actual.iter().find(|(k, _)| *k == key) {
                Some((_, candidate)) => all &= value.matches(candidate),
                None => all = false,
            }
        }
        if !all {
            return Ok(false);
        }
        if self.strict {
            let order_matches = actual
                .iter()
                .map(|(k, _)| *k)
                .eq(expected.iter().map(|(k, _)| k));
            return Ok(order_matches);
        }
        Ok(true)
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn render_expected(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modifiers = self.modifiers();
        if self.state.is_bare() && modifiers.is_empty() && self.expected.is_empty() {
            return f.write_str(self.name());
        }
        f.write_str(self.name())?;
        if !modifiers.is_empty() {
            write!(f, "[{}]", modifiers.join(", "))?;
        }
        let named = self.expected.iter().all(|(k, _)| matches!(k, Value::Str(_)));
        let entries: Vec<String> = self
            .expected
            .iter()
            .map(|(k, v)| match k {
                Value::Str(name) if named => format!("{}={:?}", name, v),
                _ => format!("{:?}: {:?}", k, v),
            })
            .collect();
        if named {
            write!(f, "({})", entries.join(", "))
        } else {
            write!(f, "({{{}}})", entries.join(", "))
        }
    }
}

matcher_impls!(IsDict);
matcher_ops!(IsDict);
