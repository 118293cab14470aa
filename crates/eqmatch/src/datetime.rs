//! Date and datetime matchers.
//!
//! These build on the bounds engine of the numeric family and add candidate
//! parsing and a timezone policy.
//!
//! # Candidate parsing
//!
//! A candidate is interpreted in order, first applicable branch wins:
//!
//! 1. A native date or datetime value is used as-is.
//! 2. A number is a unix timestamp, if [`IsDatetime::unix_number`] is set.
//!    Otherwise it is rejected: an int passed as a datetime is usually a bug.
//! 3. A string is parsed as ISO 8601 if [`IsDatetime::iso_string`] is set,
//!    else with the configured format string, else rejected.
//! 4. Anything else is rejected.
//!
//! # Timezones
//!
//! With `enforce_tz` (the default) an approximate comparison also requires
//! the candidate's offset to equal the target's, and naive never matches
//! aware. Without it, an aware candidate compared against a naive target has
//! its offset dropped first, so the wall-clock times are compared.
//!
//! ```
//! use chrono::NaiveDate;
//! use eqmatch::{Bounds, IsDatetime, Value};
//!
//! let y2k = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let m = IsDatetime::bounded(Bounds::new().approx(y2k)).unwrap().iso_string();
//! assert_eq!(Value::from("2000-01-01T00:00"), m);
//! assert_ne!(Value::from("2000-01-01T00:00"), IsDatetime::bounded(Bounds::new().approx(y2k)).unwrap());
//! ```

use chrono::{
    DateTime, Duration, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Utc,
};
use chrono_tz::Tz;

use crate::bounds::Bounds;
use crate::error::{MatchError, Mismatch, Result};
use crate::matcher::{delegate_matcher, matcher_impls, matcher_ops, MatchState, Matcher};
use crate::repr::{plain_repr, Arg, Args};
use crate::scalar::{Delta, Family, Scalar};
use crate::value::Value;

const ISO_AWARE: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

const ISO_NAIVE: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

const ISO_DATE: &str = "%Y-%m-%d";

// =============================================================================
// Zones
// =============================================================================

/// Timezone a "now" target is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    /// IANA zone, e.g. `Europe/London`.
    Named(Tz),
    /// Fixed UTC offset.
    Fixed(FixedOffset),
}

impl Zone {
    /// Looks up an IANA zone by name.
    ///
    /// # Errors
    ///
    /// [`MatchError::UnknownTimezone`] if the name is not in the database.
    pub fn named(name: &str) -> Result<Zone> {
        name.parse::<Tz>().map(Zone::Named).map_err(|_| {
            let err = MatchError::UnknownTimezone(name.to_string());
            tracing::debug!(error = %err, "rejected matcher configuration");
            err
        })
    }

    /// Expresses `instant` in this zone.
    pub fn localize(&self, instant: DateTime<Utc>) -> DateTime<FixedOffset> {
        match self {
            Zone::Named(tz) => instant.with_timezone(tz).fixed_offset(),
            Zone::Fixed(offset) => instant.with_timezone(offset),
        }
    }

    fn to_arg(self) -> Arg {
        match self {
            Zone::Named(tz) => Arg::Value(Value::from(tz.name())),
            Zone::Fixed(offset) => plain_repr(offset.to_string()).into(),
        }
    }
}

impl From<FixedOffset> for Zone {
    fn from(offset: FixedOffset) -> Self {
        Zone::Fixed(offset)
    }
}

impl From<Tz> for Zone {
    fn from(tz: Tz) -> Self {
        Zone::Named(tz)
    }
}

// =============================================================================
// Parsing
// =============================================================================

fn parse_iso_datetime(text: &str) -> std::result::Result<Scalar, Mismatch> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(Scalar::Aware(dt));
    }
    if let Some(dt) = ISO_AWARE
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
    {
        return Ok(Scalar::Aware(dt));
    }
    if let Some(dt) = ISO_NAIVE
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Ok(Scalar::Naive(dt));
    }
    NaiveDate::parse_from_str(text, ISO_DATE)
        .map(|d| Scalar::Naive(d.and_time(NaiveTime::MIN)))
        .map_err(|_| Mismatch::value(format!("invalid isoformat string: {:?}", text)))
}

fn parse_formatted_datetime(text: &str, format: &str) -> std::result::Result<Scalar, Mismatch> {
    if let Ok(dt) = DateTime::parse_from_str(text, format) {
        return Ok(Scalar::Aware(dt));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
        return Ok(Scalar::Naive(dt));
    }
    NaiveDate::parse_from_str(text, format)
        .map(|d| Scalar::Naive(d.and_time(NaiveTime::MIN)))
        .map_err(|e| Mismatch::value(format!("{:?} does not match format {:?}: {}", text, format, e)))
}

fn parse_formatted_date(text: &str, format: &str) -> std::result::Result<NaiveDate, Mismatch> {
    NaiveDate::parse_from_str(text, format)
        .or_else(|_| NaiveDateTime::parse_from_str(text, format).map(|dt| dt.date()))
        .map_err(|e| Mismatch::value(format!("{:?} does not match format {:?}: {}", text, format, e)))
}

fn timestamp(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round().min(999_999_999.0) as u32;
    DateTime::from_timestamp(whole as i64, nanos)
}

// =============================================================================
// IsDatetime
// =============================================================================

/// Matches datetimes, optionally within bounds or close to a target.
///
/// Numeric deltas are read as seconds. The default tolerance in approx mode
/// is one second.
#[derive(Clone)]
pub struct IsDatetime {
    name: &'static str,
    bounds: Bounds,
    shown: Bounds,
    unix_number: bool,
    iso_string: bool,
    format_string: Option<String>,
    enforce_tz: bool,
    tz: Option<Zone>,
    state: MatchState,
}

impl IsDatetime {
    /// Matches any native datetime.
    pub fn new() -> Self {
        IsDatetime::with_state("IsDatetime", Bounds::new(), MatchState::new())
    }

    /// Matches datetimes within `bounds`.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`] if `approx` is combined with a limit or
    /// a bound is not a datetime.
    pub fn bounded(bounds: Bounds) -> Result<Self> {
        let bounds = bounds.delta_in_seconds();
        bounds.validate("IsDatetime", &[Family::DateTime])?;
        Ok(IsDatetime::with_state("IsDatetime", bounds, MatchState::new()))
    }

    fn with_state(name: &'static str, bounds: Bounds, state: MatchState) -> Self {
        IsDatetime {
            name,
            shown: bounds.clone(),
            bounds,
            unix_number: false,
            iso_string: false,
            format_string: None,
            enforce_tz: true,
            tz: None,
            state,
        }
    }

    /// Accepts ints and floats as unix timestamps.
    pub fn unix_number(mut self) -> Self {
        self.unix_number = true;
        self
    }

    /// Accepts ISO 8601 strings.
    pub fn iso_string(mut self) -> Self {
        self.iso_string = true;
        self
    }

    /// Accepts strings in `format` (`strftime` syntax).
    pub fn format_string(mut self, format: impl Into<String>) -> Self {
        self.format_string = Some(format.into());
        self
    }

    /// Sets the timezone policy, `true` by default.
    pub fn enforce_tz(mut self, enforce: bool) -> Self {
        self.enforce_tz = enforce;
        self
    }

    fn reference(&self) -> Option<&Scalar> {
        self.bounds
            .approx_value()
            .or_else(|| self.bounds.limits().next().map(|(_, limit)| limit))
    }

    /// Converts a timestamp to the reference's offset, or to local time when
    /// the reference is naive or absent.
    fn convert_timestamp(&self, seconds: f64) -> std::result::Result<Scalar, Mismatch> {
        let instant = timestamp(seconds)
            .ok_or_else(|| Mismatch::value(format!("timestamp {} out of range", seconds)))?;
        Ok(match self.reference() {
            Some(Scalar::Aware(reference)) => Scalar::Aware(instant.with_timezone(reference.offset())),
            _ => Scalar::Naive(instant.with_timezone(&Local).naive_local()),
        })
    }

    fn prepare(&self, candidate: &Value) -> std::result::Result<Scalar, Mismatch> {
        let parsed = match candidate {
            Value::NaiveDateTime(dt) => Scalar::Naive(*dt),
            Value::DateTime(dt) => Scalar::Aware(*dt),
            Value::Int(_) | Value::Float(_) => {
                if !self.unix_number {
                    return Err(Mismatch::kind("datetime", candidate));
                }
                let seconds = candidate
                    .as_number()
                    .map(|n| n.to_f64())
                    .unwrap_or(f64::NAN);
                self.convert_timestamp(seconds)?
            }
            Value::Str(text) => {
                if self.iso_string {
                    parse_iso_datetime(text)?
                } else if let Some(format) = &self.format_string {
                    parse_formatted_datetime(text, format)?
                } else {
                    return Err(Mismatch::value("not a valid datetime string"));
                }
            }
            other => {
                return Err(Mismatch::value(format!("{} not valid as datetime", other.kind())));
            }
        };
        Ok(match (self.bounds.approx_value(), parsed) {
            (Some(Scalar::Naive(_)), Scalar::Aware(dt)) if !self.enforce_tz => {
                Scalar::Naive(dt.naive_local())
            }
            (_, parsed) => parsed,
        })
    }

    fn flag_args(&self, args: Args) -> Args {
        args.kwarg("unix_number", Arg::flag(self.unix_number))
            .kwarg("iso_string", Arg::flag(self.iso_string))
            .kwarg("format_string", Arg::or_omit(self.format_string.clone()))
            .kwarg(
                "enforce_tz",
                if self.enforce_tz { Arg::Omit } else { Arg::from(false) },
            )
            .kwarg("tz", self.tz.map_or(Arg::Omit, Zone::to_arg))
    }
}

impl Default for IsDatetime {
    fn default() -> Self {
        IsDatetime::with_state("IsDatetime", Bounds::new(), MatchState::bare())
    }
}

impl Matcher for IsDatetime {
    fn name(&self) -> &str {
        self.name
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        let parsed = self.prepare(candidate)?;
        if self.bounds.is_empty() {
            return Ok(true);
        }
        if !self.bounds.check(&parsed)? {
            return Ok(false);
        }
        if !self.enforce_tz {
            return Ok(true);
        }
        Ok(match (self.bounds.approx_value(), parsed) {
            (Some(Scalar::Aware(target)), Scalar::Aware(dt)) => target.offset() == dt.offset(),
            _ => true,
        })
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        self.flag_args(self.shown.render_into(Args::new()))
    }
}

// =============================================================================
// IsNow
// =============================================================================

/// Matches datetimes close to the moment the matcher was built.
///
/// The instant is captured once, at construction. The default tolerance is
/// two seconds. Without [`tz`](IsNow::tz) the target is local wall-clock
/// time; with it, the target is the same instant expressed in that zone.
///
/// ```
/// use chrono::{Local, Utc};
/// use eqmatch::{IsNow, Value, Zone};
///
/// assert_eq!(Value::from(Local::now().naive_local()), IsNow::new());
/// assert_eq!(Value::from(Utc::now()), IsNow::new().tz(Zone::named("UTC").unwrap()));
/// ```
#[derive(Clone)]
pub struct IsNow {
    now: DateTime<Utc>,
    delta: Option<Delta>,
    inner: IsDatetime,
}

impl IsNow {
    /// Close to now, in local time.
    pub fn new() -> Self {
        IsNow::with_state(MatchState::new())
    }

    fn with_state(state: MatchState) -> Self {
        let mut now = IsNow {
            now: Utc::now(),
            delta: None,
            inner: IsDatetime::with_state("IsNow", Bounds::new(), state),
        };
        now.retarget();
        now
    }

    fn retarget(&mut self) {
        let target = match self.inner.tz {
            Some(zone) => Scalar::Aware(zone.localize(self.now)),
            None => Scalar::Naive(self.now.with_timezone(&Local).naive_local()),
        };
        let delta = self.delta.unwrap_or(Delta::Duration(Duration::seconds(2)));
        self.inner.bounds = Bounds::new().approx(target).delta(delta);
        self.inner.shown = match self.delta {
            Some(delta) => Bounds::new().delta(delta),
            None => Bounds::new(),
        };
    }

    /// Sets the tolerance; numbers are read as seconds.
    pub fn delta(mut self, delta: impl Into<Delta>) -> Self {
        self.delta = Some(delta.into().into_duration());
        self.retarget();
        self
    }

    /// Expresses the target in `zone`.
    pub fn tz(mut self, zone: impl Into<Zone>) -> Self {
        self.inner.tz = Some(zone.into());
        self.retarget();
        self
    }

    /// Accepts ints and floats as unix timestamps.
    pub fn unix_number(mut self) -> Self {
        self.inner = self.inner.unix_number();
        self
    }

    /// Accepts ISO 8601 strings.
    pub fn iso_string(mut self) -> Self {
        self.inner = self.inner.iso_string();
        self
    }

    /// Accepts strings in `format`.
    pub fn format_string(mut self, format: impl Into<String>) -> Self {
        self.inner = self.inner.format_string(format);
        self
    }

    /// Sets the timezone policy, `true` by default.
    pub fn enforce_tz(mut self, enforce: bool) -> Self {
        self.inner = self.inner.enforce_tz(enforce);
        self
    }

    /// The instant captured at construction.
    pub fn instant(&self) -> DateTime<Utc> {
        self.now
    }
}

impl Default for IsNow {
    fn default() -> Self {
        IsNow::with_state(MatchState::bare())
    }
}

impl Matcher for IsNow {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        self.inner.equals(candidate)
    }

    fn state(&self) -> &MatchState {
        self.inner.state()
    }

    fn repr_args(&self) -> Args {
        self.inner.repr_args()
    }
}

// =============================================================================
// IsDate
// =============================================================================

/// Matches dates, optionally within bounds or close to a target.
///
/// Datetimes are not dates here. The default tolerance in approx mode is
/// zero; numeric deltas are read as seconds.
///
/// ```
/// use chrono::NaiveDate;
/// use eqmatch::{Bounds, IsDate, Value};
///
/// let y2k = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
/// assert_eq!(Value::from("2000-01-01"), IsDate::bounded(Bounds::new().approx(y2k)).unwrap().iso_string());
/// assert_ne!(Value::from(y2k.succ_opt().unwrap()), IsDate::bounded(Bounds::new().approx(y2k)).unwrap());
/// ```
#[derive(Clone)]
pub struct IsDate {
    name: &'static str,
    bounds: Bounds,
    shown: Bounds,
    iso_string: bool,
    format_string: Option<String>,
    state: MatchState,
}

impl IsDate {
    /// Matches any date.
    pub fn new() -> Self {
        IsDate::with_state("IsDate", Bounds::new(), MatchState::new())
    }

    /// Matches dates within `bounds`.
    ///
    /// # Errors
    ///
    /// [`MatchError::InvalidConfig`] if `approx` is combined with a limit or
    /// a bound is not a date.
    pub fn bounded(bounds: Bounds) -> Result<Self> {
        let bounds = bounds.delta_in_seconds();
        bounds.validate("IsDate", &[Family::Date])?;
        Ok(IsDate::with_state("IsDate", bounds, MatchState::new()))
    }

    fn with_state(name: &'static str, bounds: Bounds, state: MatchState) -> Self {
        IsDate {
            name,
            shown: bounds.clone(),
            bounds: bounds.or_delta(Delta::Duration(Duration::zero())),
            iso_string: false,
            format_string: None,
            state,
        }
    }

    /// Accepts `YYYY-MM-DD` strings.
    pub fn iso_string(mut self) -> Self {
        self.iso_string = true;
        self
    }

    /// Accepts strings in `format`.
    pub fn format_string(mut self, format: impl Into<String>) -> Self {
        self.format_string = Some(format.into());
        self
    }

    fn prepare(&self, candidate: &Value) -> std::result::Result<NaiveDate, Mismatch> {
        match candidate {
            Value::Date(d) => Ok(*d),
            Value::Str(text) => {
                if self.iso_string {
                    NaiveDate::parse_from_str(text, ISO_DATE)
                        .map_err(|_| Mismatch::value(format!("invalid isoformat string: {:?}", text)))
                } else if let Some(format) = &self.format_string {
                    parse_formatted_date(text, format)
                } else {
                    Err(Mismatch::value("not a valid date string"))
                }
            }
            other => Err(Mismatch::value(format!("{} not valid as date", other.kind()))),
        }
    }
}

impl Default for IsDate {
    fn default() -> Self {
        IsDate::with_state("IsDate", Bounds::new(), MatchState::bare())
    }
}

impl Matcher for IsDate {
    fn name(&self) -> &str {
        self.name
    }

    fn equals(&self, candidate: &Value) -> std::result::Result<bool, Mismatch> {
        let date = self.prepare(candidate)?;
        self.bounds.check(&Scalar::Date(date))
    }

    fn state(&self) -> &MatchState {
        &self.state
    }

    fn repr_args(&self) -> Args {
        self.shown
            .render_into(Args::new())
            .kwarg("iso_string", Arg::flag(self.iso_string))
            .kwarg("format_string", Arg::or_omit(self.format_string.clone()))
    }
}

// =============================================================================
// IsToday
// =============================================================================

/// Matches today's date, captured when the matcher is built.
#[derive(Clone)]
pub struct IsToday(IsDate);

impl IsToday {
    /// Today's local date.
    pub fn new() -> Self {
        IsToday::with_state(MatchState::new())
    }

    fn with_state(state: MatchState) -> Self {
        let today = Local::now().date_naive();
        let mut inner = IsDate::with_state("IsToday", Bounds::new().approx(today), state);
        inner.shown = Bounds::new();
        IsToday(inner)
    }

    /// Accepts `YYYY-MM-DD` strings.
    pub fn iso_string(self) -> Self {
        IsToday(self.0.iso_string())
    }

    /// Accepts strings in `format`.
    pub fn format_string(self, format: impl Into<String>) -> Self {
        IsToday(self.0.format_string(format))
    }
}

impl Default for IsToday {
    fn default() -> Self {
        IsToday::with_state(MatchState::bare())
    }
}

delegate_matcher!(IsToday);

matcher_impls!(IsDatetime, IsNow, IsDate);
matcher_ops!(IsDatetime, IsNow, IsDate);
