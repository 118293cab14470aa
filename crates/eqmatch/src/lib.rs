//! Eqmatch - Composable equality matchers for test assertions.
//!
//! A matcher is a value that compares equal to whole classes of values. Put
//! one on either side of `assert_eq!` and the assertion passes when the
//! candidate satisfies the matcher's predicate:
//!
//! ```rust
//! use eqmatch::{dict, IsDict, IsInt, IsNow, IsStr, Value};
//!
//! let user = Value::dict([
//!     ("id", Value::from(42)),
//!     ("name", Value::from("ada")),
//!     ("created", Value::from(chrono::Local::now().naive_local())),
//! ]);
//!
//! assert_eq!(
//!     user,
//!     IsDict::new(dict! {
//!         "id" => IsInt::new(),
//!         "name" => IsStr::new(),
//!         "created" => IsNow::new(),
//!     })
//! );
//! ```
//!
//! Candidates are [`Value`]s, a dynamic model of the data a test inspects:
//! scalars, strings, bytes, lists, tuples, ordered dicts, dates and UUIDs.
//! `Value` converts from Rust primitives, `chrono` and `uuid` types, and
//! `serde_json::Value`.
//!
//! # Composition
//!
//! Matchers combine with `|`, `&` and `!`:
//!
//! ```rust
//! use eqmatch::{IsInt, IsNegative, IsStr, Value};
//!
//! let m = IsStr::new() | IsInt::new();
//! assert_eq!(Value::from("x"), m);
//! assert_ne!(Value::from(1.5), m);
//! assert_eq!(Value::from(3), !IsNegative::new());
//! ```
//!
//! # Diagnostics
//!
//! Each matcher remembers the last value it was compared with. After a match
//! it renders as that value, so a failing assertion on an enclosing structure
//! only highlights the parts that really differ. Until then it renders as
//! its name and arguments, e.g. `IsInt(gt=1)`.
//!
//! Matchers are single-threaded: the recorded state lives in `Cell`s, and a
//! fresh instance per assertion is the intended usage.
//!
//! # Matchers
//!
//! | Module | Matchers |
//! |--------|----------|
//! | core | [`AnyOf`], [`AllOf`], [`Inverted`], [`IsInstance`] |
//! | numbers | [`IsNumeric`], [`IsNumber`], [`IsInt`], [`IsFloat`], [`IsApprox`], [`IsPositive`], ... |
//! | dates | [`IsDatetime`], [`IsNow`], [`IsDate`], [`IsToday`] |
//! | containers | [`IsDict`], [`IsList`], [`IsTuple`], [`IsListOrTuple`], [`HasLen`], [`Contains`] |
//! | strings | [`IsStr`], [`IsBytes`], [`IsAnyStr`] |
//! | booleans | [`IsTrueLike`], [`IsFalseLike`] |
//! | other | [`AnyThing`], [`IsOneOf`], [`FunctionCheck`], [`IsJson`], [`IsUuid`], [`IsHash`], [`IsIp`] |

mod boolean;
mod bounds;
mod combinator;
mod datetime;
mod entry;
mod error;
mod instance;
mod mapping;
mod matcher;
mod numeric;
mod other;
mod repr;
mod scalar;
mod sequence;
mod strings;
mod value;

// Re-export public API
pub use boolean::{IsFalseLike, IsTrueLike};
pub use bounds::{Bound, Bounds};
pub use combinator::{AllOf, AnyOf, Inverted};
pub use datetime::{IsDate, IsDatetime, IsNow, IsToday, Zone};
pub use entry::Expected;
pub use error::{MatchError, Mismatch, Result};
pub use instance::IsInstance;
pub use mapping::{DictSettings, Ignore, IsDict};
pub use matcher::{MatchState, Matcher, MatcherRef, Precedence};
pub use numeric::{
    IsApprox, IsFloat, IsInt, IsNegative, IsNegativeFloat, IsNegativeInt, IsNonNegative,
    IsNonPositive, IsNumber, IsNumeric, IsPositive, IsPositiveFloat, IsPositiveInt,
};
pub use other::{AnyThing, FunctionCheck, HashType, IpVersion, IsHash, IsIp, IsJson, IsOneOf, IsUuid};
pub use repr::{plain_repr, Arg, Args, Omit, PlainRepr};
pub use scalar::{Delta, Family, Scalar};
pub use sequence::{Contains, HasLen, IsList, IsListOrTuple, IsTuple, Length, SequenceBuilder};
pub use strings::{Case, IsAnyStr, IsBytes, IsStr};
pub use value::{Dict, Kind, Number, Value};
