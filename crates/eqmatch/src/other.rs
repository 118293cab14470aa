//! Assorted leaf matchers: wildcards, choices, custom predicates and
//! format checks for JSON, UUIDs, hex digests and IP addresses.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::rc::Rc;

use uuid::Uuid;

use crate::error::{MatchError, Mismatch, Result};
use crate::entry::Expected;
use crate::matcher::{matcher_impls, matcher_ops, MatchState, Matcher};
use crate::repr::{plain_repr, Arg, Args};
use crate::value::Value;

// =============================================================================
// AnyThing, IsOneOf, FunctionCheck
// =============================================================================

/// Matches every value.
#[derive(Clone)]
pub struct AnyThing {
    state: MatchState,
}

impl AnyThing {
    pub fn new() -> Self {
        AnyThing {
            state: MatchState::new(),
        }
    }
}

impl Default for AnyThing {
    fn default() -> Self {
        AnyThing {
            state: MatchState::bare(),
        }
    }
}

impl Matcher for AnyThing {
    fn name(&self) -> &str {
        "AnyThing"
    }

    fn equals(&self, _candidate: &Value) -> std::result::Result<bool, Mismatch> {
        Ok(true)
    }

    fn state(&self) -> &MatchState {
        &self.state
    }
}

/// Matches a value equal to any of the choices.
///
/// ```
/// use eqmatch::{expected, IsInt, IsOneOf, Value};
///
/// let m = IsOneOf::new(expected!["a", "b", IsInt::new()]);
/// assert_eq!(Value::from("b"), m);
/// assert_eq!(Value::from(7), m);
/// assert_ne!(Value::from("c"), m);
/// ```
#[derive(Clone)]
pub struct IsOneOf {
    choices: Vec<Expected>,
    state: MatchState,
}

impl IsOneOf {
    pub fn new(choices: impl IntoIterator<Item = Expected>) -> Self {
        IsOneOf {
            choices: choices.into_iter().collect(),
            state: MatchState::new(),
        }
    }
}

impl Matcher for IsOneOf {
    fn name(&self) -> &str {
        "IsOneOf"
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        Ok(match self.choices.iter().find(|choice| choice.check(candidate)) {
            Some(choice) => choice.matches(candidate),
            None => false,
        })
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        self.choices
            .iter()
            .fold(Args::new(), |args, choice| args.arg(choice.clone()))
    }
}

/// Matches values for which a named predicate returns `true`.
///
/// ```
/// use eqmatch::{FunctionCheck, Value};
///
/// let even = FunctionCheck::new("is_even", |v| matches!(v, Value::Int(n) if n % 2 == 0));
/// assert_eq!(Value::from(4), even);
/// assert_eq!(format!("{:?}", FunctionCheck::new("is_even", |_| false)), "FunctionCheck(is_even)");
/// ```
#[derive(Clone)]
pub struct FunctionCheck {
    name: String,
    func: Rc<dyn Fn(&Value) -> bool>,
    state: MatchState,
}

impl FunctionCheck {
    pub fn new(name: impl Into<String>, func: impl Fn(&Value) -> bool + 'static) -> Self {
        FunctionCheck {
            name: name.into(),
            func: Rc::new(func),
            state: MatchState::new(),
        }
    }
}

impl Matcher for FunctionCheck {
    fn name(&self) -> &str {
        "FunctionCheck"
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        Ok((self.func)(candidate))
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        Args::new().arg(plain_repr(self.name.as_str()))
    }
}

// =============================================================================
// IsJson
// =============================================================================

/// Matches `str` or `bytes` holding JSON, optionally comparing the decoded
/// value.
///
/// ```
/// use eqmatch::{dict, IsDict, IsJson, Value};
///
/// assert_eq!(Value::from("[1, 2]"), IsJson::any());
/// assert_eq!(Value::from("[1, 2]"), IsJson::new(vec![1, 2]));
/// assert_eq!(Value::from(r#"{"a": 1}"#), IsJson::new(IsDict::new(dict! { "a" => 1 })));
/// assert_ne!(Value::from("{"), IsJson::any());
/// ```
#[derive(Clone)]
pub struct IsJson {
    expected: Option<Expected>,
    state: MatchState,
}

impl IsJson {
    /// Any valid JSON document.
    pub fn any() -> Self {
        IsJson {
            expected: None,
            state: MatchState::new(),
        }
    }

    /// JSON decoding to a value equal to `expected`.
    pub fn new(expected: impl Into<Expected>) -> Self {
        IsJson {
            expected: Some(expected.into()),
            state: MatchState::new(),
        }
    }

    fn decode(candidate: &Value) -> std::result::Result<Value, Mismatch> {
        let decoded: serde_json::Value = match candidate {
            Value::Str(text) => serde_json::from_str(text),
            Value::Bytes(data) => serde_json::from_slice(data),
            other => return Err(Mismatch::kind("str or bytes", other)),
        }
        .map_err(|e| Mismatch::value(format!("invalid JSON: {}", e)))?;
        Ok(Value::from(decoded))
    }
}

impl Default for IsJson {
    fn default() -> Self {
        IsJson {
            expected: None,
            state: MatchState::bare(),
        }
    }
}

impl Matcher for IsJson {
    fn name(&self) -> &str {
        "IsJson"
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        let decoded = IsJson::decode(candidate)?;
        Ok(self.expected.as_ref().map_or(true, |expected| expected.matches(&decoded)))
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        match &self.expected {
            Some(expected) => Args::new().arg(expected.clone()),
            None if self.state.is_bare() => Args::new(),
            None => Args::new().arg(plain_repr("*")),
        }
    }
}

// =============================================================================
// IsUuid
// =============================================================================

/// Matches UUID values and strings that parse as UUIDs.
///
/// ```
/// use eqmatch::{IsUuid, Value};
///
/// assert_eq!(Value::from("edf9f29e-45c7-431c-99db-28ea44df9785"), IsUuid::new());
/// assert_eq!(Value::from("edf9f29e-45c7-431c-99db-28ea44df9785"), IsUuid::version(4).unwrap());
/// assert_ne!(Value::from("edf9f29e-45c7-431c-99db-28ea44df9785"), IsUuid::version(1).unwrap());
/// assert_ne!(Value::from("not-a-uuid"), IsUuid::new());
/// ```
#[derive(Clone)]
pub struct IsUuid {
    version: Option<usize>,
    state: MatchState,
}

impl IsUuid {
    /// Any version.
    pub fn new() -> Self {
        IsUuid {
            version: None,
            state: MatchState::new(),
        }
    }

    /// Only UUIDs of `version`.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`] for versions outside 1 to 8.
    pub fn version(version: usize) -> Result<Self> {
        if !(1..=8).contains(&version) {
            return Err(MatchError::config(
                "IsUuid",
                format!("version must be between 1 and 8, got {}", version),
            ));
        }
        Ok(IsUuid {
            version: Some(version),
            state: MatchState::new(),
        })
    }
}

impl Default for IsUuid {
    fn default() -> Self {
        IsUuid {
            version: None,
            state: MatchState::bare(),
        }
    }
}

impl Matcher for IsUuid {
    fn name(&self) -> &str {
        "IsUuid"
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        let uuid = match candidate {
            Value::Uuid(uuid) => *uuid,
            Value::Str(text) => {
                Uuid::parse_str(text).map_err(|e| Mismatch::value(format!("invalid UUID: {}", e)))?
            }
            other => return Err(Mismatch::kind("uuid or str", other)),
        };
        Ok(self.version.map_or(true, |v| uuid.get_version_num() == v))
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        match self.version {
            Some(version) => Args::new().arg(version),
            None if self.state.is_bare() => Args::new(),
            None => Args::new().arg(plain_repr("*")),
        }
    }
}

// =============================================================================
// IsHash
// =============================================================================

/// Digest formats recognised by [`IsHash`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashType {
    Md5,
    Sha1,
    Sha256,
}

impl HashType {
    pub fn as_str(self) -> &'static str {
        match self {
            HashType::Md5 => "md5",
            HashType::Sha1 => "sha-1",
            HashType::Sha256 => "sha-256",
        }
    }

    /// Number of hex digits in the digest.
    pub fn hex_len(self) -> usize {
        match self {
            HashType::Md5 => 32,
            HashType::Sha1 => 40,
            HashType::Sha256 => 64,
        }
    }
}

/// Matches hex digests of a given hash type, as `str` or `bytes`.
///
/// ```
/// use eqmatch::{IsHash, Value};
///
/// let md5 = IsHash::named("md5").unwrap();
/// assert_eq!(Value::from("f1e069787ece74531d112559945c6871"), md5);
/// assert_ne!(Value::from("f1e069787ece74531d112559945c687"), md5);
/// assert!(IsHash::named("crc32").is_err());
/// ```
#[derive(Clone)]
pub struct IsHash {
    hash_type: HashType,
    state: MatchState,
}

impl IsHash {
    pub fn new(hash_type: HashType) -> Self {
        IsHash {
            hash_type,
            state: MatchState::new(),
        }
    }

    /// Looks the hash type up by name: `md5`, `sha-1` or `sha-256`.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`] for any other name.
    pub fn named(name: &str) -> Result<Self> {
        let hash_type = [HashType::Md5, HashType::Sha1, HashType::Sha256]
            .into_iter()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| {
                MatchError::config(
                    "IsHash",
                    format!("hash type must be one of md5, sha-1, sha-256, got {:?}", name),
                )
            })?;
        Ok(IsHash::new(hash_type))
    }
}

impl Matcher for IsHash {
    fn name(&self) -> &str {
        "IsHash"
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        let text = match candidate {
            Value::Str(text) => text.as_str(),
            Value::Bytes(data) => std::str::from_utf8(data)
                .map_err(|_| Mismatch::value("bytes are not valid UTF-8"))?,
            other => return Err(Mismatch::kind("str or bytes", other)),
        };
        Ok(text.len() == self.hash_type.hex_len() && text.bytes().all(|b| b.is_ascii_hexdigit()))
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        Args::new().arg(self.hash_type.as_str())
    }
}

// =============================================================================
// IsIp
// =============================================================================

/// IP protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpVersion {
    V4,
    V6,
}

impl IpVersion {
    fn number(self) -> usize {
        match self {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }

    fn bits(self) -> u32 {
        match self {
            IpVersion::V4 => 32,
            IpVersion::V6 => 128,
        }
    }

    fn prefix_mask(self, prefix: u32) -> u128 {
        let bits = self.bits();
        if prefix == 0 {
            0
        } else {
            let full = u128::MAX >> (128 - bits);
            (full << (bits - prefix)) & full
        }
    }
}

fn address_bits(addr: IpAddr) -> (IpVersion, u128) {
    match addr {
        IpAddr::V4(v4) => (IpVersion::V4, u128::from(u32::from(v4))),
        IpAddr::V6(v6) => (IpVersion::V6, u128::from(v6)),
    }
}

/// Version and netmask of an address or network.
///
/// Accepts `addr`, `addr/prefix` and `addr/netmask` strings, packed 4- or
/// 16-byte addresses and non-negative integers. A bare address is a
/// single-host network.
fn parse_network(candidate: &Value) -> std::result::Result<(IpVersion, u128), Mismatch> {
    let invalid = || Mismatch::value("not a valid IP address or network");
    match candidate {
        Value::Str(text) => {
            let (addr, suffix) = match text.split_once('/') {
                Some((addr, suffix)) => (addr, Some(suffix)),
                None => (text.as_str(), None),
            };
            let addr: IpAddr = addr.parse().map_err(|_| invalid())?;
            let (version, _) = address_bits(addr);
            let netmask = match suffix {
                None => version.prefix_mask(version.bits()),
                Some(suffix) => match suffix.parse::<u32>() {
                    Ok(prefix) if prefix <= version.bits() => version.prefix_mask(prefix),
                    Ok(_) => return Err(invalid()),
                    Err(_) => {
                        let mask: IpAddr = suffix.parse().map_err(|_| invalid())?;
                        match address_bits(mask) {
                            (mask_version, bits) if mask_version == version => bits,
                            _ => return Err(invalid()),
                        }
                    }
                },
            };
            Ok((version, netmask))
        }
        Value::Bytes(data) => match data.len() {
            4 => Ok((IpVersion::V4, IpVersion::V4.prefix_mask(32))),
            16 => Ok((IpVersion::V6, IpVersion::V6.prefix_mask(128))),
            _ => Err(invalid()),
        },
        Value::Int(n) if *n >= 0 => {
            let version = if u32::try_from(*n).is_ok() {
                IpVersion::V4
            } else {
                IpVersion::V6
            };
            Ok((version, version.prefix_mask(version.bits())))
        }
        other => Err(Mismatch::kind("str, bytes or int", other)),
    }
}

/// Matches IP addresses and networks, optionally by version and netmask.
///
/// ```
/// use eqmatch::{IpVersion, IsIp, Value};
///
/// assert_eq!(Value::from("179.27.154.96"), IsIp::new());
/// assert_eq!(Value::from("2001:db8::/32"), IsIp::v6());
/// assert_ne!(Value::from("179.27.154.96"), IsIp::v6());
///
/// let slash24 = IsIp::configured(Some(IpVersion::V4), Some("255.255.255.0")).unwrap();
/// assert_eq!(Value::from("54.43.53.219/24"), slash24);
/// assert!(IsIp::configured(None, Some("255.255.255.0")).is_err());
/// ```
#[derive(Clone)]
pub struct IsIp {
    version: Option<IpVersion>,
    netmask: Option<(String, u128)>,
    state: MatchState,
}

impl IsIp {
    /// Any version.
    pub fn new() -> Self {
        IsIp {
            version: None,
            netmask: None,
            state: MatchState::new(),
        }
    }

    /// IPv4 only.
    pub fn v4() -> Self {
        IsIp {
            version: Some(IpVersion::V4),
            ..IsIp::new()
        }
    }

    /// IPv6 only.
    pub fn v6() -> Self {
        IsIp {
            version: Some(IpVersion::V6),
            ..IsIp::new()
        }
    }

    /// Version and netmask together.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`] if a netmask is given without a version,
    /// or does not parse as an address of that version.
    pub fn configured(version: Option<IpVersion>, netmask: Option<&str>) -> Result<Self> {
        let netmask = match (version, netmask) {
            (_, None) => None,
            (None, Some(_)) => {
                return Err(MatchError::config(
                    "IsIp",
                    "to check the netmask you must specify the IP version",
                ));
            }
            (Some(version), Some(mask)) => {
                let bits = match version {
                    IpVersion::V4 => mask.parse::<Ipv4Addr>().map(|a| u128::from(u32::from(a))),
                    IpVersion::V6 => mask.parse::<Ipv6Addr>().map(u128::from),
                }
                .map_err(|_| {
                    MatchError::config("IsIp", format!("invalid IPv{} netmask {:?}", version.number(), mask))
                })?;
                Some((mask.to_string(), bits))
            }
        };
        Ok(IsIp {
            version,
            netmask,
            state: MatchState::new(),
        })
    }
}

impl Default for IsIp {
    fn default() -> Self {
        IsIp {
            state: MatchState::bare(),
            ..IsIp::new()
        }
    }
}

impl Matcher for IsIp {
    fn name(&self) -> &str {
        "IsIp"
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        let (version, netmask) = parse_network(candidate)?;
        if self.version.is_some_and(|expected| expected != version) {
            return Ok(false);
        }
        Ok(self.netmask.as_ref().map_or(true, |(_, bits)| *bits == netmask))
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        Args::new()
            .kwarg("version", self.version.map_or(Arg::Omit, |v| Arg::from(v.number())))
            .kwarg(
                "netmask",
                self.netmask.as_ref().map_or(Arg::Omit, |(text, _)| Arg::from(text.as_str())),
            )
    }
}

matcher_impls!(AnyThing, IsOneOf, FunctionCheck, IsJson, IsUuid, IsHash, IsIp);
matcher_ops!(AnyThing, IsOneOf, FunctionCheck, IsJson, IsUuid, IsHash, IsIp);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expected;
    use crate::numeric::IsPositiveInt;

    #[test]
    fn anything() {
        assert!(AnyThing::new().matches(&Value::None));
        assert!(AnyThing::default().matches(&Value::list([1])));
        assert_eq!(format!("{:?}", AnyThing::default()), "AnyThing");
    }

    #[test]
    fn one_of_records_the_matching_choice() {
        let positive = Rc::new(IsPositiveInt::new());
        let m = IsOneOf::new(vec![Expected::from("x"), Expected::from(positive.clone())]);
        assert!(m.matches(&Value::from(3)));
        assert_eq!(positive.value().unwrap(), Value::from(3));
        assert!(!m.matches(&Value::from(-3)));
        assert_eq!(format!("{:?}", IsOneOf::new(expected![1, 2])), "IsOneOf(1, 2)");
    }

    #[test]
    fn json() {
        assert!(IsJson::any().matches(&Value::from("null")));
        assert!(IsJson::any().matches(&Value::bytes(*b"{\"a\": [1]}")));
        assert!(!IsJson::any().matches(&Value::from("{")));
        assert!(!IsJson::any().matches(&Value::from(1)));
        let m = IsJson::new(Value::dict([("a", Value::list([1, 2]))]));
        assert!(m.matches(&Value::from(r#"{"a": [1, 2]}"#)));
        assert!(!m.matches(&Value::from(r#"{"a": [2, 1]}"#)));
    }

    #[test]
    fn json_rendering() {
        assert_eq!(format!("{:?}", IsJson::default()), "IsJson");
        assert_eq!(format!("{:?}", IsJson::any()), "IsJson(*)");
        assert_eq!(format!("{:?}", IsJson::new(vec![1, 2])), "IsJson([1, 2])");
    }

    #[test]
    fn uuid() {
        let v4 = uuid::Uuid::new_v4();
        assert!(IsUuid::new().matches(&Value::from(v4)));
        assert!(IsUuid::version(4).unwrap().matches(&Value::from(v4.to_string())));
        assert!(!IsUuid::version(1).unwrap().matches(&Value::from(v4)));
        assert!(!IsUuid::new().matches(&Value::from(42)));
        assert!(IsUuid::version(9).is_err());
        assert_eq!(format!("{:?}", IsUuid::new()), "IsUuid(*)");
        assert_eq!(format!("{:?}", IsUuid::version(4).unwrap()), "IsUuid(4)");
    }

    #[test]
    fn hash() {
        let sha1 = IsHash::new(HashType::Sha1);
        assert!(sha1.matches(&Value::from("a94a8fe5ccb19ba61c4c0873d391e987982fbbd3")));
        assert!(sha1.matches(&Value::bytes(*b"A94A8FE5CCB19BA61C4C0873D391E987982FBBD3")));
        assert!(!sha1.matches(&Value::from("g94a8fe5ccb19ba61c4c0873d391e987982fbbd3")));
        assert!(IsHash::named("sha-256").is_ok());
        assert_eq!(format!("{:?}", sha1), "IsHash(\"sha-1\")");
    }

    #[test]
    fn ip_versions() {
        assert!(IsIp::new().matches(&Value::from("::1")));
        assert!(IsIp::v4().matches(&Value::from("10.0.0.0/8")));
        assert!(IsIp::v4().matches(&Value::from(3232235521i64)));
        assert!(IsIp::v6().matches(&Value::from(1i64 << 40)));
        assert!(IsIp::v4().matches(&Value::bytes([192u8, 168, 0, 1])));
        assert!(!IsIp::v4().matches(&Value::from("10.0.0.0/33")));
        assert!(!IsIp::new().matches(&Value::from("not an ip")));
        assert!(!IsIp::new().matches(&Value::from(-1)));
    }

    #[test]
    fn ip_netmask() {
        let m = IsIp::configured(Some(IpVersion::V4), Some("255.255.255.0")).unwrap();
        assert!(m.matches(&Value::from("192.168.0.0/24")));
        assert!(m.matches(&Value::from("192.168.0.0/255.255.255.0")));
        assert!(!m.matches(&Value::from("192.168.0.0/16")));
        let v6 = IsIp::configured(Some(IpVersion::V6), Some("ffff:ffff:ffff:ffff::")).unwrap();
        assert!(v6.matches(&Value::from("2001:db8::/64")));
        assert!(IsIp::configured(Some(IpVersion::V4), Some("nope")).is_err());
        assert_eq!(
            format!("{:?}", m),
            "IsIp(version=4, netmask=\"255.255.255.0\")"
        );
        assert_eq!(format!("{:?}", IsIp::default()), "IsIp");
    }
}
