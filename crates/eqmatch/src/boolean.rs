//! Truthiness matchers.

use crate::error::{MatchError, Mismatch, Result};
use crate::matcher::{matcher_impls, matcher_ops, MatchState, Matcher};
use crate::repr::{Arg, Args};
use crate::value::Value;

/// Matches truthy values: anything except `None`, `false`, zero and empty
/// strings, bytes or containers.
///
/// ```
/// use eqmatch::{IsTrueLike, Value};
///
/// assert_eq!(Value::from(1), IsTrueLike::new());
/// assert_eq!(Value::list([0]), IsTrueLike::new());
/// assert_ne!(Value::from(""), IsTrueLike::new());
/// ```
#[derive(Clone)]
pub struct IsTrueLike {
    state: MatchState,
}

impl IsTrueLike {
    pub fn new() -> Self {
        IsTrueLike {
            state: MatchState::new(),
        }
    }
}

impl Default for IsTrueLike {
    fn default() -> Self {
        IsTrueLike {
            state: MatchState::bare(),
        }
    }
}

impl Matcher for IsTrueLike {
    fn name(&self) -> &str {
        "IsTrueLike"
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        Ok(candidate.is_truthy())
    }

    fn state(&self) -> &MatchState {
        &self.state
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FalseMode {
    Plain,
    Numeric,
    String,
}

/// Matches "false-like" values.
///
/// By default that is `false`, `None`, zero and empty lists, tuples and
/// dicts. Numeric mode accepts only `0`, `0.0` and `false`; string mode
/// accepts only `"0"`, `"0.0"` and `"False"`. Bytes, dates and UUIDs are
/// never false-like.
///
/// ```
/// use eqmatch::{IsFalseLike, Value};
///
/// assert_eq!(Value::from(false), IsFalseLike::new());
/// assert_eq!(Value::None, IsFalseLike::new());
/// assert_ne!(Value::list([1]), IsFalseLike::new());
/// assert_eq!(Value::from("0"), IsFalseLike::with_modes(false, true).unwrap());
/// ```
#[derive(Clone)]
pub struct IsFalseLike {
    mode: FalseMode,
    state: MatchState,
}

impl IsFalseLike {
    pub fn new() -> Self {
        IsFalseLike {
            mode: FalseMode::Plain,
            state: MatchState::new(),
        }
    }

    /// Accepts only `0`, `0.0` and `false`.
    pub fn numeric() -> Self {
        IsFalseLike {
            mode: FalseMode::Numeric,
            state: MatchState::new(),
        }
    }

    /// Accepts only `"0"`, `"0.0"` and `"False"`.
    pub fn string() -> Self {
        IsFalseLike {
            mode: FalseMode::String,
            state: MatchState::new(),
        }
    }

    /// Picks the mode from two flags.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`] if both flags are set.
    pub fn with_modes(numeric: bool, string: bool) -> Result<Self> {
        match (numeric, string) {
            (true, true) => Err(MatchError::config(
                "IsFalseLike",
                "\"numeric\" and \"string\" cannot be combined",
            )),
            (true, false) => Ok(IsFalseLike::numeric()),
            (false, true) => Ok(IsFalseLike::string()),
            (false, false) => Ok(IsFalseLike::new()),
        }
    }
}

impl Default for IsFalseLike {
    fn default() -> Self {
        IsFalseLike {
            mode: FalseMode::Plain,
            state: MatchState::bare(),
        }
    }
}

fn is_zero(candidate: &Value) -> bool {
    match candidate {
        Value::Bool(b) => !b,
        Value::Int(n) => *n == 0,
        Value::Float(n) => *n == 0.0,
        _ => false,
    }
}

impl Matcher for IsFalseLike {
    fn name(&self) -> &str {
        "IsFalseLike"
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        match candidate {
            Value::Bytes(_) | Value::Date(_) | Value::NaiveDateTime(_) | Value::DateTime(_) | Value::Uuid(_) => {
                return Err(Mismatch::kind(
                    "int, bool, str, float, list, tuple, dict or None",
                    candidate,
                ));
            }
            _ => {}
        }
        Ok(match self.mode {
            FalseMode::Numeric => is_zero(candidate),
            FalseMode::String => matches!(candidate.as_str(), Some("0" | "0.0" | "False")),
            FalseMode::Plain => match candidate {
                Value::None => true,
                Value::List(items) | Value::Tuple(items) => items.is_empty(),
                Value::Dict(dict) => dict.is_empty(),
                other => is_zero(other),
            },
        })
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        Args::new()
            .kwarg("numeric", Arg::flag(self.mode == FalseMode::Numeric))
            .kwarg("string", Arg::flag(self.mode == FalseMode::String))
    }
}

matcher_impls!(IsTrueLike, IsFalseLike);
matcher_ops!(IsTrueLike, IsFalseLike);
