//! Error types for the eqmatch crate.
//!
//! Two families live here. [`MatchError`] is raised while a matcher is being
//! built and always reaches the caller. [`Mismatch`] is raised while a
//! candidate is being compared and never leaves the equality entry point:
//! [`Matcher::matches`](crate::Matcher::matches) turns it into `false`.

use thiserror::Error;

use crate::value::{Kind, Value};

/// Errors raised while constructing or inspecting matchers.
#[derive(Debug, Error)]
pub enum MatchError {
    /// Conflicting or malformed constructor arguments.
    #[error("{matcher}: {reason}")]
    InvalidConfig {
        matcher: &'static str,
        reason: String,
    },

    /// Invalid regular expression pattern.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// Timezone name not found in the IANA database.
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),

    /// The matched value was read before a successful comparison.
    #[error("value is not available until a comparison has matched")]
    ValueUnavailable,
}

impl MatchError {
    pub(crate) fn config(matcher: &'static str, reason: impl Into<String>) -> Self {
        let err = MatchError::InvalidConfig {
            matcher,
            reason: reason.into(),
        };
        tracing::debug!(matcher, error = %err, "rejected matcher configuration");
        err
    }
}

/// Result type for matcher construction.
pub type Result<T> = std::result::Result<T, MatchError>;

/// A candidate that definitely does not match.
///
/// Predicates return this instead of `Ok(false)` when the candidate has an
/// incompatible shape. Callers of the equality entry point never see it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Mismatch {
    /// The candidate has the wrong runtime type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    Type { expected: String, actual: Kind },

    /// The candidate has the right type but an unusable value.
    #[error("invalid value: {0}")]
    Value(String),
}

impl Mismatch {
    pub(crate) fn kind(expected: impl Into<String>, actual: &Value) -> Self {
        Mismatch::Type {
            expected: expected.into(),
            actual: actual.kind(),
        }
    }

    pub(crate) fn value(reason: impl Into<String>) -> Self {
        Mismatch::Value(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_the_matcher() {
        let err = MatchError::config("IsInt", "\"approx\" cannot be combined with bounds");
        assert_eq!(
            err.to_string(),
            "IsInt: \"approx\" cannot be combined with bounds"
        );
    }

    #[test]
    fn type_mismatch_message() {
        let err = Mismatch::kind("int", &Value::from("x"));
        assert_eq!(err.to_string(), "type mismatch: expected int, got str");
    }

    #[test]
    fn regex_errors_convert() {
        let err: MatchError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, MatchError::InvalidRegex(_)));
    }
}
