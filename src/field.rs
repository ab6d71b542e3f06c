//! Typed key/value fields that make up a log record.

use std::borrow::Cow;
use std::fmt;
use std::time::Duration;

/// A single field value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Duration(Duration),
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Duration(d) => write!(f, "{}", Took(*d)),
            Self::Str(s) => f.write_str(s),
        }
    }
}

/// Durations become their short human form; everything else keeps its type.
impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Int(n) => Self::from(*n),
            Value::Duration(d) => Self::String(Took(*d).to_string()),
            Value::Str(s) => Self::String(s.clone()),
        }
    }
}

/// A named, typed field.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    key: Cow<'static, str>,
    value: Value,
}

impl Field {
    pub fn int(key: impl Into<Cow<'static, str>>, value: i64) -> Self {
        Self { key: key.into(), value: Value::Int(value) }
    }

    pub fn duration(key: impl Into<Cow<'static, str>>, value: Duration) -> Self {
        Self { key: key.into(), value: Value::Duration(value) }
    }

    pub fn string(key: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: Value::Str(value.into()) }
    }

    pub fn key(&self) -> &str { &self.key }
    pub fn value(&self) -> &Value { &self.value }
}

/// Renders a [`Duration`] in short form: `0s`, `850ns`, `1.5µs`, `5ms`,
/// `2.25s`, `1m30s`, `1h0m0s`. Trailing fractional zeros are dropped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Took(pub Duration);

impl fmt::Display for Took {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const MICRO: u128 = 1_000;
        const MILLI: u128 = 1_000_000;
        const SECOND: u128 = 1_000_000_000;

        let nanos = self.0.as_nanos();
        match nanos {
            0 => f.write_str("0s"),
            n if n < MICRO => write!(f, "{n}ns"),
            n if n < MILLI => write_scaled(f, n, MICRO, "µs"),
            n if n < SECOND => write_scaled(f, n, MILLI, "ms"),
            n => {
                let secs = n / SECOND;
                let (hours, mins) = (secs / 3600, secs / 60 % 60);
                if hours > 0 {
                    write!(f, "{hours}h")?;
                }
                if hours > 0 || mins > 0 {
                    write!(f, "{mins}m")?;
                }
                write_scaled(f, (secs % 60) * SECOND + n % SECOND, SECOND, "s")
            }
        }
    }
}

fn write_scaled(f: &mut fmt::Formatter<'_>, value: u128, unit: u128, suffix: &str) -> fmt::Result {
    write!(f, "{}", value / unit)?;
    let rem = value % unit;
    if rem > 0 {
        let width = unit.ilog10() as usize;
        let frac = format!("{rem:0width$}");
        write!(f, ".{}", frac.trim_end_matches('0'))?;
    }
    f.write_str(suffix)
}

/// logfmt rendering of a field slice: `status=201 took=5ms method=GET`.
///
/// Keys and values containing whitespace, `=` or `"`, and empty ones, are
/// quoted.
pub struct Logfmt<'a>(pub &'a [Field]);

impl fmt::Display for Logfmt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write_token(f, &field.key)?;
            f.write_str("=")?;
            write_token(f, &field.value.to_string())?;
        }
        Ok(())
    }
}

fn write_token(f: &mut fmt::Formatter<'_>, token: &str) -> fmt::Result {
    let needs_quotes = token.is_empty()
        || token.chars().any(|c| c.is_whitespace() || c == '=' || c == '"');
    if needs_quotes {
        write!(f, "{token:?}")
    } else {
        f.write_str(token)
    }
}
