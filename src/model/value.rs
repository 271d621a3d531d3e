//! Dynamically typed cell values

use std::borrow::Cow;
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Largest integer a double represents exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A cell value with type information
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(Cow<'static, str>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    List(Vec<CellValue>),
    Map(IndexMap<String, CellValue>),
}

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::Int(a), CellValue::Int(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (CellValue::Date(a), CellValue::Date(b)) => a == b,
            (CellValue::DateTime(a), CellValue::DateTime(b)) => a == b,
            (CellValue::List(a), CellValue::List(b)) => a == b,
            (CellValue::Map(a), CellValue::Map(b)) => a == b,
            // Cross-type numeric comparison
            (CellValue::Int(a), CellValue::Float(b)) | (CellValue::Float(b), CellValue::Int(a)) => {
                int_equals_float(*a, *b)
            }
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            CellValue::Null => 0u8.hash(state),
            CellValue::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            // Int and Float share a hash domain so that Int(2) and Float(2.0),
            // which compare equal, also hash equal.
            CellValue::Int(i) => {
                2u8.hash(state);
                normalized_bits(*i as f64).hash(state);
            }
            CellValue::Float(f) => {
                2u8.hash(state);
                normalized_bits(*f).hash(state);
            }
            CellValue::String(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            CellValue::Date(d) => {
                4u8.hash(state);
                d.hash(state);
            }
            CellValue::DateTime(dt) => {
                5u8.hash(state);
                dt.hash(state);
            }
            CellValue::List(items) => {
                6u8.hash(state);
                items.hash(state);
            }
            // Map equality ignores entry order, so only the size is hashed
            CellValue::Map(entries) => {
                7u8.hash(state);
                entries.len().hash(state);
            }
        }
    }
}

/// Exact `Int`/`Float` equality: the float must be integral and in `i64` range.
fn int_equals_float(i: i64, f: f64) -> bool {
    // 2^63; `i64::MAX as f64` rounds up to it, so the bound is exclusive
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    f.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&f) && f as i64 == i
}

fn normalized_bits(f: f64) -> u64 {
    if f.is_nan() {
        f64::NAN.to_bits()
    } else if f == 0.0 {
        0.0f64.to_bits()
    } else {
        f.to_bits()
    }
}

impl CellValue {
    /// Build a numeric value, preferring `Int` when the number is integral
    pub fn number(n: f64) -> Self {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER {
            CellValue::Int(n as i64)
        } else {
            CellValue::Float(n)
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the value is an `Int` or a `Float`
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }

    /// Truthiness: null, false, zero, NaN and the empty string are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Bool(b) => *b,
            CellValue::Int(i) => *i != 0,
            CellValue::Float(f) => *f != 0.0 && !f.is_nan(),
            CellValue::String(s) => !s.is_empty(),
            CellValue::Date(_)
            | CellValue::DateTime(_)
            | CellValue::List(_)
            | CellValue::Map(_) => true,
        }
    }

    /// Get the string contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Numeric view of the value.
    ///
    /// Null counts as 0, booleans as 0/1, dates as epoch milliseconds and
    /// strings as their parsed number. Anything without a numeric reading
    /// yields NaN rather than an error.
    pub fn as_f64(&self) -> f64 {
        match self {
            CellValue::Null => 0.0,
            CellValue::Bool(b) => f64::from(u8::from(*b)),
            CellValue::Int(i) => *i as f64,
            CellValue::Float(f) => *f,
            CellValue::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse().unwrap_or(f64::NAN)
                }
            }
            CellValue::Date(_) | CellValue::DateTime(_) => {
                self.epoch_millis().map_or(f64::NAN, |ms| ms as f64)
            }
            CellValue::List(_) | CellValue::Map(_) => f64::NAN,
        }
    }

    /// Milliseconds since the Unix epoch for date and datetime values (UTC)
    pub fn epoch_millis(&self) -> Option<i64> {
        match self {
            CellValue::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .map(|dt| dt.and_utc().timestamp_millis()),
            CellValue::DateTime(dt) => Some(dt.and_utc().timestamp_millis()),
            _ => None,
        }
    }

    /// Replace a date or datetime with its epoch milliseconds; other values pass through
    pub fn into_epoch_millis(self) -> CellValue {
        match self.epoch_millis() {
            Some(ms) => CellValue::Int(ms),
            None => self,
        }
    }

    /// Parse `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD HH:MM:SS`
    pub fn parse_temporal(s: &str) -> Option<CellValue> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Some(CellValue::Date(date));
        }
        ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
            .into_iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .map(CellValue::DateTime)
    }

    /// Convert to a display string.
    ///
    /// This is also the stringification used for group keys and mode counting.
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            CellValue::Null => Cow::Borrowed("null"),
            CellValue::Bool(b) => Cow::Owned(b.to_string()),
            CellValue::Int(i) => Cow::Owned(i.to_string()),
            CellValue::Float(f) => Cow::Owned(format_float(*f)),
            CellValue::String(s) => Cow::Borrowed(s.as_ref()),
            CellValue::Date(d) => Cow::Owned(d.to_string()),
            CellValue::DateTime(dt) => Cow::Owned(dt.format("%Y-%m-%dT%H:%M:%S").to_string()),
            CellValue::List(items) => Cow::Owned(
                items
                    .iter()
                    .map(|c| c.display().into_owned())
                    .collect::<Vec<_>>()
                    .join(","),
            ),
            CellValue::Map(_) => Cow::Owned(serde_json::to_string(self).unwrap_or_default()),
        }
    }

    /// Native relational comparison.
    ///
    /// Numbers compare numerically across `Int`/`Float`, strings
    /// lexicographically, booleans and dates by their natural order. A `Date`
    /// compares against a `DateTime` at midnight, and either compares against
    /// a number through its epoch milliseconds. Any other pairing is
    /// incomparable and returns `None`.
    pub fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => Some(Ordering::Equal),
            (CellValue::Bool(a), CellValue::Bool(b)) => Some(a.cmp(b)),
            (CellValue::Int(a), CellValue::Int(b)) => Some(a.cmp(b)),
            (CellValue::Float(a), CellValue::Float(b)) => a.partial_cmp(b),
            (CellValue::Int(a), CellValue::Float(b)) => (*a as f64).partial_cmp(b),
            (CellValue::Float(a), CellValue::Int(b)) => a.partial_cmp(&(*b as f64)),
            (CellValue::String(a), CellValue::String(b)) => Some(a.cmp(b)),
            (CellValue::Date(a), CellValue::Date(b)) => Some(a.cmp(b)),
            (CellValue::DateTime(a), CellValue::DateTime(b)) => Some(a.cmp(b)),
            (CellValue::Date(_), CellValue::DateTime(_))
            | (CellValue::DateTime(_), CellValue::Date(_)) => {
                Some(self.epoch_millis()?.cmp(&other.epoch_millis()?))
            }
            // a date against a number
            (a, b) if a.type_rank() == 2 && b.type_rank() == 2 => a.as_f64().partial_cmp(&b.as_f64()),
            _ => None,
        }
    }

    /// Total order used for sorting.
    ///
    /// Agrees with [`CellValue::compare`] wherever that is defined. Numbers
    /// and dates share one ordering by numeric value, NaN sorts after every
    /// other number, and incomparable values are ordered by type.
    pub fn sort_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CellValue::Int(a), CellValue::Int(b)) => a.cmp(b),
            (a, b) if a.type_rank() == 2 && b.type_rank() == 2 => {
                let (x, y) = (a.as_f64(), b.as_f64());
                match (x.is_nan(), y.is_nan()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
                }
            }
            (CellValue::List(a), CellValue::List(b)) => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| x.sort_cmp(y))
                .find(|o| o.is_ne())
                .unwrap_or_else(|| a.len().cmp(&b.len())),
            _ => self
                .compare(other)
                .unwrap_or_else(|| self.type_rank().cmp(&other.type_rank())),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            CellValue::Null => 0,
            CellValue::Bool(_) => 1,
            CellValue::Int(_)
            | CellValue::Float(_)
            | CellValue::Date(_)
            | CellValue::DateTime(_) => 2,
            CellValue::String(_) => 3,
            CellValue::List(_) => 4,
            CellValue::Map(_) => 5,
        }
    }

    /// Membership test: element of a list, or substring of a string
    pub fn contains(&self, needle: &CellValue) -> bool {
        match (self, needle) {
            (CellValue::List(items), _) => items.contains(needle),
            (CellValue::String(haystack), CellValue::String(n)) => haystack.contains(n.as_ref()),
            _ => false,
        }
    }
}

/// Render a float the way a dynamic language prints numbers: integral values
/// without a fractional part.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f == f64::INFINITY {
        "Infinity".to_string()
    } else if f == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else if f.fract() == 0.0 && f.abs() < MAX_SAFE_INTEGER {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(Cow::Owned(s.to_string()))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(Cow::Owned(s))
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<u32> for CellValue {
    fn from(i: u32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<usize> for CellValue {
    fn from(i: usize) -> Self {
        i64::try_from(i).map_or(CellValue::Float(i as f64), CellValue::Int)
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<f32> for CellValue {
    fn from(f: f32) -> Self {
        CellValue::Float(f64::from(f))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl<T> From<Vec<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(items: Vec<T>) -> Self {
        CellValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T> From<Option<T>> for CellValue
where
    T: Into<CellValue>,
{
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

impl From<serde_json::Value> for CellValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    CellValue::Float(f)
                } else {
                    CellValue::String(Cow::Owned(n.to_string()))
                }
            }
            Value::String(s) => CellValue::String(Cow::Owned(s)),
            Value::Array(arr) => CellValue::List(arr.into_iter().map(CellValue::from).collect()),
            Value::Object(obj) => CellValue::Map(
                obj.into_iter()
                    .map(|(k, v)| (k, CellValue::from(v)))
                    .collect(),
            ),
        }
    }
}
