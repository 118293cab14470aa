//! Diagnostic argument lists.
//!
//! A matcher that has not matched renders as its name followed by the
//! arguments it was built with, e.g. `IsInt(gt=1)`. [`Args`] collects those
//! arguments. Two helpers shape the output: [`Omit`] drops an argument that
//! still has its default value, and [`PlainRepr`] inserts text verbatim
//! instead of quoting it as a string.

use std::fmt;

use crate::entry::Expected;
use crate::matcher::MatcherRef;
use crate::value::Value;

/// Marker for an argument that should not appear in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Omit;

/// Text rendered as-is, without string quoting.
///
/// ```
/// use eqmatch::{plain_repr, Args};
///
/// let args = Args::new().arg(plain_repr("int")).kwarg("name", "int");
/// assert_eq!(args.to_string(), "int, name=\"int\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainRepr(pub String);

/// Wraps `text` so it renders unquoted.
pub fn plain_repr(text: impl Into<String>) -> PlainRepr {
    PlainRepr(text.into())
}

/// One rendered argument.
#[derive(Clone)]
pub enum Arg {
    /// A value, rendered in literal form.
    Value(Value),
    /// Verbatim text.
    Plain(String),
    /// A nested literal or matcher.
    Expected(Expected),
    /// Left out of the output.
    Omit,
}

impl Arg {
    /// Returns `true` if this argument is left out of the output.
    pub fn is_omitted(&self) -> bool {
        matches!(self, Arg::Omit)
    }

    /// `Some(value)` renders the value, `None` is omitted.
    pub fn or_omit<T: Into<Value>>(value: Option<T>) -> Arg {
        value.map_or(Arg::Omit, |v| Arg::Value(v.into()))
    }

    /// Renders `true` only when the flag differs from its default `false`.
    pub fn flag(enabled: bool) -> Arg {
        if enabled {
            Arg::Value(Value::Bool(true))
        } else {
            Arg::Omit
        }
    }
}

impl fmt::Debug for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(v) => write!(f, "{:?}", v),
            Arg::Plain(text) => f.write_str(text),
            Arg::Expected(e) => write!(f, "{:?}", e),
            Arg::Omit => Ok(()),
        }
    }
}

impl From<Value> for Arg {
    fn from(v: Value) -> Self {
        Arg::Value(v)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::Value(Value::from(s))
    }
}

impl From<bool> for Arg {
    fn from(b: bool) -> Self {
        Arg::Value(Value::Bool(b))
    }
}

impl From<usize> for Arg {
    fn from(n: usize) -> Self {
        Arg::Value(Value::Int(n as i64))
    }
}

impl From<PlainRepr> for Arg {
    fn from(p: PlainRepr) -> Self {
        Arg::Plain(p.0)
    }
}

impl From<Omit> for Arg {
    fn from(_: Omit) -> Self {
        Arg::Omit
    }
}

impl From<Expected> for Arg {
    fn from(e: Expected) -> Self {
        Arg::Expected(e)
    }
}

impl From<MatcherRef> for Arg {
    fn from(m: MatcherRef) -> Self {
        Arg::Expected(Expected::Matcher(m))
    }
}

/// Positional and keyword arguments captured for rendering.
#[derive(Clone, Default)]
pub struct Args {
    positional: Vec<Arg>,
    keyword: Vec<(&'static str, Arg)>,
}

impl Args {
    /// Creates an empty argument list.
    pub fn new() -> Self {
        Args::default()
    }

    /// Appends a positional argument.
    pub fn arg(mut self, arg: impl Into<Arg>) -> Self {
        self.positional.push(arg.into());
        self
    }

    /// Appends a keyword argument.
    pub fn kwarg(mut self, name: &'static str, arg: impl Into<Arg>) -> Self {
        self.keyword.push((name, arg.into()));
        self
    }

    /// Returns `true` if nothing would be rendered.
    pub fn is_empty(&self) -> bool {
        self.positional.iter().all(Arg::is_omitted)
            && self.keyword.iter().all(|(_, arg)| arg.is_omitted())
    }
}

impl fmt::Display for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let positional = self
            .positional
            .iter()
            .filter(|arg| !arg.is_omitted())
            .map(|arg| format!("{:?}", arg));
        let keyword = self
            .keyword
            .iter()
            .filter(|(_, arg)| !arg.is_omitted())
            .map(|(name, arg)| format!("{}={:?}", name, arg));
        let parts: Vec<String> = positional.chain(keyword).collect();
        f.write_str(&parts.join(", "))
    }
}

impl fmt::Debug for Args {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Args({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn omitted_arguments_are_skipped() {
        let args = Args::new()
            .arg(Value::from(1))
            .arg(Omit)
            .kwarg("gt", Arg::or_omit(None::<i64>))
            .kwarg("lt", Arg::or_omit(Some(5)));
        assert_eq!(args.to_string(), "1, lt=5");
    }

    #[test]
    fn only_omitted_is_empty() {
        assert!(Args::new().is_empty());
        assert!(Args::new().kwarg("strict", Arg::flag(false)).is_empty());
        assert!(!Args::new().kwarg("strict", Arg::flag(true)).is_empty());
    }

    #[test]
    fn plain_text_is_not_quoted() {
        let args = Args::new().arg(plain_repr("*")).arg("*");
        assert_eq!(args.to_string(), "*, \"*\"");
    }
}
