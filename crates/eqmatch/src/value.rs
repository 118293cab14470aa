//! Runtime value model for candidates.
//!
//! The [`Value`] enum is what every matcher compares against. It covers the
//! shapes test payloads are made of: scalars, strings, bytes, ordered and
//! unordered containers, dates, datetimes and UUIDs. [`Kind`] names the
//! runtime type of a value and carries the small subtype hierarchy matchers
//! rely on (`bool` is an `int`, `datetime` is a `date`).

use std::cmp::Ordering;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

/// Runtime value of a candidate.
///
/// Values are owned so a matcher can keep the last operand it saw for
/// diagnostics.
///
/// # Example
///
/// ```
/// use eqmatch::Value;
///
/// let payload = Value::from(serde_json::json!({"id": 7, "tags": ["a", "b"]}));
/// assert!(payload.is_dict());
/// assert_eq!(payload.len(), Some(2));
/// ```
#[derive(Clone)]
pub enum Value {
    /// Absent value.
    None,
    /// Boolean value.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Floating point number.
    Float(f64),
    /// UTF-8 string.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Mutable-style ordered sequence.
    List(Vec<Value>),
    /// Fixed ordered sequence. Never equal to a list with the same items.
    Tuple(Vec<Value>),
    /// Insertion-ordered mapping.
    Dict(Dict),
    /// Calendar date.
    Date(NaiveDate),
    /// Datetime without an offset.
    NaiveDateTime(NaiveDateTime),
    /// Datetime with a fixed UTC offset.
    DateTime(DateTime<FixedOffset>),
    /// UUID.
    Uuid(Uuid),
}

impl Value {
    /// Builds a list value.
    pub fn list<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a tuple value.
    pub fn tuple<I, V>(items: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Tuple(items.into_iter().map(Into::into).collect())
    }

    /// Builds a dict value, keeping the order of `entries`.
    pub fn dict<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Value>,
        V: Into<Value>,
    {
        Value::Dict(entries.into_iter().collect())
    }

    /// Builds a bytes value.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(bytes.into())
    }

    /// Returns the runtime kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::None => Kind::None,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Bytes(_) => Kind::Bytes,
            Value::List(_) => Kind::List,
            Value::Tuple(_) => Kind::Tuple,
            Value::Dict(_) => Kind::Dict,
            Value::Date(_) => Kind::Date,
            Value::NaiveDateTime(_) | Value::DateTime(_) => Kind::DateTime,
            Value::Uuid(_) => Kind::Uuid,
        }
    }

    /// Returns `true` if this is `None`.
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    /// Returns `true` if this is a dict.
    pub fn is_dict(&self) -> bool {
        matches!(self, Value::Dict(_))
    }

    /// Extracts the string, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts a number. Booleans are not numbers.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(n) => Some(Number::Float(*n)),
            _ => None,
        }
    }

    /// Extracts the items of a list or tuple.
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) | Value::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// Extracts the dict, if present.
    pub fn as_dict(&self) -> Option<&Dict> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    /// Length of sized values: characters of a string, bytes, items, entries.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(s) => Some(s.chars().count()),
            Value::Bytes(b) => Some(b.len()),
            Value::List(items) | Value::Tuple(items) => Some(items.len()),
            Value::Dict(d) => Some(d.len()),
            _ => None,
        }
    }

    /// Truthiness: empty containers, zero, `false` and `None` are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(items) | Value::Tuple(items) => !items.is_empty(),
            Value::Dict(d) => !d.is_empty(),
            Value::Date(_) | Value::NaiveDateTime(_) | Value::DateTime(_) | Value::Uuid(_) => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                match (self.as_number(), other.as_number()) {
                    (Some(a), Some(b)) => a.compare(b) == Some(Ordering::Equal),
                    _ => false,
                }
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Dict(a), Value::Dict(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::NaiveDateTime(a), Value::NaiveDateTime(b)) => a == b,
            // Same instant, regardless of offset.
            (Value::DateTime(a), Value::DateTime(b)) => a == b,
            (Value::Uuid(a), Value::Uuid(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => f.write_str("None"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{:?}", n),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Bytes(bytes) => {
                f.write_str("b\"")?;
                for &byte in bytes {
                    match byte {
                        b'"' => f.write_str("\\\"")?,
                        b'\\' => f.write_str("\\\\")?,
                        0x20..=0x7e => write!(f, "{}", byte as char)?,
                        _ => write!(f, "\\x{:02x}", byte)?,
                    }
                }
                f.write_str("\"")
            }
            Value::List(items) => write_items(f, "[", "]", items),
            Value::Tuple(items) if items.len() == 1 => write!(f, "({:?},)", items[0]),
            Value::Tuple(items) => write_items(f, "(", ")", items),
            Value::Dict(d) => write!(f, "{:?}", d),
            Value::Date(d) => write!(f, "{}", d),
            Value::NaiveDateTime(dt) => write!(f, "{:?}", dt),
            Value::DateTime(dt) => write!(f, "{:?}", dt),
            Value::Uuid(u) => write!(f, "{}", u),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, open: &str, close: &str, items: &[Value]) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{:?}", item)?;
    }
    f.write_str(close)
}

/// Runtime type of a [`Value`].
///
/// Kinds form a shallow hierarchy: [`Kind::Bool`] is a sub-kind of
/// [`Kind::Int`] and [`Kind::DateTime`] a sub-kind of [`Kind::Date`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    None,
    Bool,
    Int,
    Float,
    Str,
    Bytes,
    List,
    Tuple,
    Dict,
    Date,
    DateTime,
    Uuid,
}

impl Kind {
    /// Returns the direct parent kind, if any.
    pub fn parent(self) -> Option<Kind> {
        match self {
            Kind::Bool => Some(Kind::Int),
            Kind::DateTime => Some(Kind::Date),
            _ => None,
        }
    }

    /// Returns `true` if `self` is `other` or one of its sub-kinds.
    pub fn is_subkind_of(self, other: Kind) -> bool {
        let mut current = Some(self);
        while let Some(kind) = current {
            if kind == other {
                return true;
            }
            current = kind.parent();
        }
        false
    }

    /// Returns the display name of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Kind::None => "none",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::Str => "str",
            Kind::Bytes => "bytes",
            Kind::List => "list",
            Kind::Tuple => "tuple",
            Kind::Dict => "dict",
            Kind::Date => "date",
            Kind::DateTime => "datetime",
            Kind::Uuid => "uuid",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Numeric value, integer or floating point.
///
/// Comparisons between the two variants are handled by converting to `f64`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    /// Signed 64-bit integer.
    Int(i64),
    /// 64-bit floating point.
    Float(f64),
}

impl Number {
    /// Converts the number to f64 for comparison.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int(n) => n as f64,
            Number::Float(n) => n,
        }
    }

    /// Compares two numbers, handling mixed types.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::Int(a), Number::Int(b)) => Some(a.cmp(&b)),
            (Number::Float(a), Number::Float(b)) => a.partial_cmp(&b),
            _ => self.to_f64().partial_cmp(&other.to_f64()),
        }
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(n) => write!(f, "{}", n),
            Number::Float(n) => write!(f, "{:?}", n),
        }
    }
}

macro_rules! int_conversions {
    ($($ty:ty),*) => {$(
        impl From<$ty> for Number {
            fn from(n: $ty) -> Self {
                Number::Int(n as i64)
            }
        }

        impl From<$ty> for Value {
            fn from(n: $ty) -> Self {
                Value::Int(n as i64)
            }
        }
    )*};
}

int_conversions!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Number {
    fn from(n: f32) -> Self {
        Number::Float(n as f64)
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Float(n)
    }
}

impl From<f32> for Value {
    fn from(n: f32) -> Self {
        Value::Float(n as f64)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        match n {
            Number::Int(n) => Value::Int(n),
            Number::Float(n) => Value::Float(n),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::None
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::NaiveDateTime(dt)
    }
}

impl From<DateTime<FixedOffset>> for Value {
    fn from(dt: DateTime<FixedOffset>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt.fixed_offset())
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Uuid(u)
    }
}

impl From<Dict> for Value {
    fn from(d: Dict) -> Self {
        Value::Dict(d)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(items: Vec<V>) -> Self {
        Value::list(items)
    }
}

impl<V: Into<Value>> From<Option<V>> for Value {
    fn from(v: Option<V>) -> Self {
        v.map_or(Value::None, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::None,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else {
                    Value::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::list(items),
            serde_json::Value::Object(map) => Value::dict(map),
        }
    }
}

/// Insertion-ordered mapping from values to values.
///
/// Equality ignores order, like a hash map; iteration keeps insertion order
/// so strict matchers can check it.
#[derive(Clone, Default)]
pub struct Dict {
    entries: Vec<(Value, Value)>,
}

impl Dict {
    /// Creates an empty dict.
    pub fn new() -> Self {
        Dict::default()
    }

    /// Inserts an entry. An existing key keeps its position and gets the new
    /// value; the old value is returned.
    pub fn insert(&mut self, key: impl Into<Value>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Looks up the value for `key`.
    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &Value) -> bool {
        self.get(key).is_some()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl PartialEq for Dict {
    fn eq(&self, other: &Dict) -> bool {
        self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl fmt::Debug for Dict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{:?}: {:?}", k, v)?;
        }
        f.write_str("}")
    }
}

impl<K: Into<Value>, V: Into<Value>> FromIterator<(K, V)> for Dict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = Dict::new();
        for (k, v) in iter {
            dict.insert(k, v);
        }
        dict
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn value_kinds() {
        assert_eq!(Value::None.kind(), Kind::None);
        assert_eq!(Value::from(true).kind(), Kind::Bool);
        assert_eq!(Value::from(1).kind(), Kind::Int);
        assert_eq!(Value::from(1.5).kind(), Kind::Float);
        assert_eq!(Value::from("x").kind(), Kind::Str);
        assert_eq!(Value::bytes(b"x".to_vec()).kind(), Kind::Bytes);
        assert_eq!(Value::list([1, 2]).kind(), Kind::List);
        assert_eq!(Value::tuple([1, 2]).kind(), Kind::Tuple);
        let dt = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        assert_eq!(Value::from(dt).kind(), Kind::DateTime);
        assert_eq!(Value::from(dt.and_utc()).kind(), Kind::DateTime);
    }

    #[test]
    fn kind_hierarchy() {
        assert!(Kind::Bool.is_subkind_of(Kind::Int));
        assert!(Kind::Int.is_subkind_of(Kind::Int));
        assert!(!Kind::Int.is_subkind_of(Kind::Bool));
        assert!(Kind::DateTime.is_subkind_of(Kind::Date));
        assert!(!Kind::Float.is_subkind_of(Kind::Int));
    }

    #[test]
    fn numbers_compare_across_variants() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from(1.5));
        assert_eq!(Number::Int(5).compare(Number::Float(5.5)), Some(Ordering::Less));
        assert_eq!(Number::Float(f64::NAN).compare(Number::Int(1)), None);
    }

    #[test]
    fn booleans_are_not_numbers() {
        assert_ne!(Value::from(true), Value::from(1));
        assert_eq!(Value::from(true).as_number(), None);
    }

    #[test]
    fn list_and_tuple_differ() {
        assert_ne!(Value::list([1, 2]), Value::tuple([1, 2]));
        assert_eq!(Value::list([1, 2]), Value::list([1, 2]));
    }

    #[test]
    fn dict_equality_ignores_order() {
        let a = Value::dict([("a", 1), ("b", 2)]);
        let b = Value::dict([("b", 2), ("a", 1)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::dict([("a", 1)]));
    }

    #[test]
    fn dict_insert_keeps_position() {
        let mut d = Dict::new();
        d.insert("a", 1);
        d.insert("b", 2);
        assert_eq!(d.insert("a", 3), Some(Value::from(1)));
        let keys: Vec<_> = d.keys().cloned().collect();
        assert_eq!(keys, vec![Value::from("a"), Value::from("b")]);
        assert_eq!(d.get(&Value::from("a")), Some(&Value::from(3)));
    }

    #[test]
    fn aware_datetimes_compare_by_instant() {
        let utc = DateTime::parse_from_rfc3339("2000-01-01T12:00:00+00:00").unwrap();
        let plus_one = DateTime::parse_from_rfc3339("2000-01-01T13:00:00+01:00").unwrap();
        assert_eq!(Value::from(utc), Value::from(plus_one));
        assert_ne!(Value::from(utc), Value::from(utc.naive_utc()));
    }

    #[test]
    fn json_conversion_keeps_key_order() {
        let value = Value::from(json!({"b": 1, "a": [true, null, 1.5, "x"]}));
        let dict = value.as_dict().unwrap();
        let keys: Vec<_> = dict.keys().cloned().collect();
        assert_eq!(keys, vec![Value::from("b"), Value::from("a")]);
        assert_eq!(
            dict.get(&Value::from("a")),
            Some(&Value::List(vec![
                Value::Bool(true),
                Value::None,
                Value::Float(1.5),
                Value::from("x"),
            ]))
        );
    }

    #[test]
    fn lengths() {
        assert_eq!(Value::from("héllo").len(), Some(5));
        assert_eq!(Value::list([1, 2, 3]).len(), Some(3));
        assert_eq!(Value::from(3).len(), None);
    }

    #[test]
    fn truthiness() {
        assert!(!Value::None.is_truthy());
        assert!(!Value::from(0).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::list(Vec::<i32>::new()).is_truthy());
        assert!(Value::from("0").is_truthy());
        assert!(Value::from(-1.5).is_truthy());
    }

    #[test]
    fn debug_rendering() {
        assert_eq!(format!("{:?}", Value::from("foo")), "\"foo\"");
        assert_eq!(format!("{:?}", Value::list([1, 2])), "[1, 2]");
        assert_eq!(format!("{:?}", Value::tuple([1])), "(1,)");
        assert_eq!(format!("{:?}", Value::tuple([1, 2])), "(1, 2)");
        assert_eq!(format!("{:?}", Value::dict([("a", 1)])), "{\"a\": 1}");
        assert_eq!(format!("{:?}", Value::bytes(b"a\x00".to_vec())), "b\"a\\x00\"");
        assert_eq!(format!("{:?}", Value::Float(1.0)), "1.0");
        assert_eq!(format!("{:?}", Value::None), "None");
    }
}
