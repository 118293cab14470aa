//! String and bytes matchers.
//!
//! Regular expressions must match the whole candidate, and `.` matches a
//! newline. String lengths are counted in characters, bytes lengths in
//! bytes.
//!
//! ```
//! use eqmatch::{Case, IsBytes, IsStr, Value};
//!
//! assert_eq!(Value::from("foo"), IsStr::new());
//! assert_eq!(Value::from("foo"), IsStr::new().regex("fo+").unwrap());
//! assert_ne!(Value::from("food"), IsStr::new().regex("fo+").unwrap());
//! assert_eq!(Value::from("FOO"), IsStr::new().case(Case::Upper));
//! assert_ne!(Value::from("foo"), IsBytes::new());
//! ```

use regex::bytes::Regex as BytesRegex;
use regex::bytes::RegexBuilder as BytesRegexBuilder;
use regex::{Regex, RegexBuilder};

use crate::error::{Mismatch, Result};
use crate::matcher::{delegate_matcher, MatchState, Matcher};
use crate::repr::{Arg, Args};
use crate::value::Value;

/// Required letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    Upper,
    Lower,
}

impl Case {
    fn as_str(self) -> &'static str {
        match self {
            Case::Upper => "upper",
            Case::Lower => "lower",
        }
    }

    fn holds_for_str(self, s: &str) -> bool {
        match self {
            Case::Upper => s == s.to_uppercase(),
            Case::Lower => s == s.to_lowercase(),
        }
    }

    fn holds_for_bytes(self, b: &[u8]) -> bool {
        match self {
            Case::Upper => b == b.to_ascii_uppercase().as_slice(),
            Case::Lower => b == b.to_ascii_lowercase().as_slice(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Str,
    Bytes,
    Any,
}

impl Target {
    fn name(self) -> &'static str {
        match self {
            Target::Str => "IsStr",
            Target::Bytes => "IsBytes",
            Target::Any => "IsAnyStr",
        }
    }
}

#[derive(Clone)]
enum Pattern {
    Text(Regex),
    Bytes(BytesRegex),
}

fn anchored(pattern: &str) -> String {
    format!("^(?:{})$", pattern)
}

/// Shared engine of [`IsStr`], [`IsBytes`] and [`IsAnyStr`].
#[derive(Clone)]
struct TextMatcher {
    target: Target,
    source: Option<String>,
    pattern: Option<Pattern>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    case: Option<Case>,
    state: MatchState,
}

impl TextMatcher {
    fn new(target: Target, state: MatchState) -> Self {
        TextMatcher {
            target,
            source: None,
            pattern: None,
            min_length: None,
            max_length: None,
            case: None,
            state,
        }
    }

    fn regex(mut self, source: &str) -> Result<Self> {
        let full = anchored(source);
        let pattern = match self.target {
            Target::Str => Pattern::Text(RegexBuilder::new(&full).dot_matches_new_line(true).build()?),
            Target::Bytes | Target::Any => {
                Pattern::Bytes(BytesRegexBuilder::new(&full).dot_matches_new_line(true).build()?)
            }
        };
        self.source = Some(source.to_string());
        self.pattern = Some(pattern);
        Ok(self)
    }

    fn length_ok(&self, len: usize) -> bool {
        self.min_length.map_or(true, |min| len >= min) && self.max_length.map_or(true, |max| len <= max)
    }

    fn check_str(&self, s: &str) -> bool {
        let pattern_ok = match &self.pattern {
            None => true,
            Some(Pattern::Text(re)) => re.is_match(s),
            Some(Pattern::Bytes(re)) => re.is_match(s.as_bytes()),
        };
        pattern_ok
            && self.length_ok(s.chars().count())
            && self.case.map_or(true, |case| case.holds_for_str(s))
    }

    fn check_bytes(&self, b: &[u8]) -> bool {
        let pattern_ok = match &self.pattern {
            None => true,
            Some(Pattern::Bytes(re)) => re.is_match(b),
            Some(Pattern::Text(re)) => std::str::from_utf8(b).is_ok_and(|s| re.is_match(s)),
        };
        pattern_ok && self.length_ok(b.len()) && self.case.map_or(true, |case| case.holds_for_bytes(b))
    }
}

impl Matcher for TextMatcher {
    fn name(&self) -> &str {
        self.target.name()
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        match (self.target, candidate) {
            (Target::Str | Target::Any, Value::Str(s)) => Ok(self.check_str(s)),
            (Target::Bytes | Target::Any, Value::Bytes(b)) => Ok(self.check_bytes(b)),
            (Target::Str, other) => Err(Mismatch::kind("str", other)),
            (Target::Bytes, other) => Err(Mismatch::kind("bytes", other)),
            (Target::Any, other) => Err(Mismatch::kind("str or bytes", other)),
        }
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        let regex = match (&self.source, self.target) {
            (None, _) => Arg::Omit,
            (Some(source), Target::Bytes) => Arg::Value(Value::bytes(source.as_bytes())),
            (Some(source), _) => Arg::from(source.as_str()),
        };
        Args::new()
            .kwarg("regex", regex)
            .kwarg("min_length", self.min_length.map_or(Arg::Omit, Arg::from))
            .kwarg("max_length", self.max_length.map_or(Arg::Omit, Arg::from))
            .kwarg("case", self.case.map_or(Arg::Omit, |case| Arg::from(case.as_str())))
    }
}

impl std::fmt::Debug for TextMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.render(f)
    }
}

macro_rules! text_matcher {
    ($(#[$doc:meta])* $ty:ident, $target:expr) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $ty(TextMatcher);

        impl $ty {
            pub fn new() -> Self {
                $ty(TextMatcher::new($target, MatchState::new()))
            }

            /// Requires a full match of `pattern`.
            ///
            /// # Errors
            ///
            /// [`MatchError::InvalidRegex`](crate::MatchError::InvalidRegex)
            /// if the pattern does not compile.
            pub fn regex(self, pattern: &str) -> Result<Self> {
                self.0.regex(pattern).map($ty)
            }

            /// Requires at least `len` characters (bytes for bytes values).
            pub fn min_length(mut self, len: usize) -> Self {
                self.0.min_length = Some(len);
                self
            }

            /// Requires at most `len` characters (bytes for bytes values).
            pub fn max_length(mut self, len: usize) -> Self {
                self.0.max_length = Some(len);
                self
            }

            /// Requires every cased character in `case`.
            pub fn case(mut self, case: Case) -> Self {
                self.0.case = Some(case);
                self
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                $ty(TextMatcher::new($target, MatchState::bare()))
            }
        }

        delegate_matcher!($ty);
    };
}

text_matcher!(
    /// Matches `str` values.
    IsStr,
    Target::Str
);
text_matcher!(
    /// Matches `bytes` values.
    IsBytes,
    Target::Bytes
);
text_matcher!(
    /// Matches `str` or `bytes` values. A regex is applied to the UTF-8
    /// encoding of a string.
    IsAnyStr,
    Target::Any
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_check() {
        assert!(IsStr::new().matches(&Value::from("x")));
        assert!(!IsStr::new().matches(&Value::bytes(*b"x")));
        assert!(IsBytes::new().matches(&Value::bytes(*b"x")));
        assert!(!IsBytes::new().matches(&Value::from("x")));
        assert!(IsAnyStr::new().matches(&Value::from("x")));
        assert!(IsAnyStr::new().matches(&Value::bytes(*b"x")));
        assert!(!IsAnyStr::new().matches(&Value::from(1)));
    }

    #[test]
    fn regex_is_a_full_match() {
        let m = IsStr::new().regex(r"\d+").unwrap();
        assert!(m.matches(&Value::from("123")));
        assert!(!m.matches(&Value::from("123a")));
        assert!(!m.matches(&Value::from("a123")));
        let alternation = IsStr::new().regex("a|b").unwrap();
        assert!(!alternation.matches(&Value::from("ab")));
    }

    #[test]
    fn dot_matches_newline() {
        let m = IsStr::new().regex("a.b").unwrap();
        assert!(m.matches(&Value::from("a\nb")));
        let m = IsBytes::new().regex("a.b").unwrap();
        assert!(m.matches(&Value::bytes(*b"a\nb")));
    }

    #[test]
    fn any_str_regex_covers_both() {
        let m = IsAnyStr::new().regex("fo+").unwrap();
        assert!(m.matches(&Value::from("foo")));
        assert!(m.matches(&Value::bytes(*b"foo")));
        assert!(!m.matches(&Value::from("bar")));
    }

    #[test]
    fn invalid_regex_is_an_error() {
        assert!(matches!(
            IsStr::new().regex("("),
            Err(crate::MatchError::InvalidRegex(_))
        ));
    }

    #[test]
    fn length_and_case() {
        let m = IsStr::new().min_length(2).max_length(3);
        assert!(!m.matches(&Value::from("a")));
        assert!(m.matches(&Value::from("éé")));
        assert!(!m.matches(&Value::from("abcd")));
        assert!(IsStr::new().case(Case::Lower).matches(&Value::from("abc 1")));
        assert!(!IsStr::new().case(Case::Lower).matches(&Value::from("aBc")));
        assert!(IsBytes::new().case(Case::Upper).matches(&Value::bytes(*b"ABC")));
    }

    #[test]
    fn rendering() {
        assert_eq!(format!("{:?}", IsStr::default()), "IsStr");
        assert_eq!(format!("{:?}", IsStr::new()), "IsStr()");
        let m = IsStr::new().regex("a+").unwrap().max_length(3).case(Case::Upper);
        assert_eq!(format!("{:?}", m), "IsStr(regex=\"a+\", max_length=3, case=\"upper\")");
        let m = IsBytes::new().regex("a+").unwrap();
        assert_eq!(format!("{:?}", m), "IsBytes(regex=b\"a+\")");
    }
}
