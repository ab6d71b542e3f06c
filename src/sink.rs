//! Logging sinks.
//!
//! The access log talks to exactly one interface, [`LogSink`]. Loggers come
//! in three call shapes, and each shape gets an adapter that satisfies
//! `LogSink`:
//!
//! | Shape | Trait | Call |
//! |---|---|---|
//! | strict typed fields | [`FieldLogger`] | `info(msg, &[Field])` |
//! | loose key/value pairs | [`PairLogger`] | `infow(msg, &[(&str, &dyn Display)])` |
//! | field map | [`MapLogger`] | `info(Map<String, Value>, msg)` |
//!
//! All three receive the same keys in the same order with the same values;
//! only the representation differs. [`SinkBinding`] picks one of them (or
//! none) when the middleware is built.

use std::fmt;
use std::sync::Arc;

use serde_json::Map;

use crate::field::{Field, Logfmt, Value};

/// The one capability the access log needs: emit an info-level record.
///
/// Implementations must tolerate concurrent calls from many requests.
pub trait LogSink: Send + Sync + 'static {
    fn info(&self, message: &str, fields: &[Field]);
}

/// A logger that takes strongly typed fields.
pub trait FieldLogger: Send + Sync + 'static {
    fn info(&self, message: &str, fields: &[Field]);
}

/// A logger that takes loosely typed key/value pairs.
pub trait PairLogger: Send + Sync + 'static {
    fn infow(&self, message: &str, key_values: &[(&str, &dyn fmt::Display)]);
}

/// A logger that takes a key → value map.
pub trait MapLogger: Send + Sync + 'static {
    fn info(&self, fields: Map<String, serde_json::Value>, message: &str);
}

impl<L: FieldLogger + ?Sized> FieldLogger for Arc<L> {
    fn info(&self, message: &str, fields: &[Field]) {
        (**self).info(message, fields)
    }
}

impl<L: PairLogger + ?Sized> PairLogger for Arc<L> {
    fn infow(&self, message: &str, key_values: &[(&str, &dyn fmt::Display)]) {
        (**self).infow(message, key_values)
    }
}

impl<L: MapLogger + ?Sized> MapLogger for Arc<L> {
    fn info(&self, fields: Map<String, serde_json::Value>, message: &str) {
        (**self).info(fields, message)
    }
}

// ── Binding ───────────────────────────────────────────────────────────────────

/// Which logger, if any, the access log writes to.
///
/// `None` is a legitimate configuration: requests are served, nothing is
/// logged, nothing fails.
#[derive(Clone, Default)]
pub enum SinkBinding {
    #[default]
    None,
    Typed(Arc<dyn FieldLogger>),
    Sugared(Arc<dyn PairLogger>),
    Mapped(Arc<dyn MapLogger>),
}

impl SinkBinding {
    pub fn typed(logger: impl FieldLogger) -> Self {
        Self::Typed(Arc::new(logger))
    }

    pub fn sugared(logger: impl PairLogger) -> Self {
        Self::Sugared(Arc::new(logger))
    }

    pub fn mapped(logger: impl MapLogger) -> Self {
        Self::Mapped(Arc::new(logger))
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub(crate) fn into_sink(self) -> Option<Arc<dyn LogSink>> {
        match self {
            Self::None => None,
            Self::Typed(l) => Some(Arc::new(Typed(l))),
            Self::Sugared(l) => Some(Arc::new(Sugared(l))),
            Self::Mapped(l) => Some(Arc::new(Mapped(l))),
        }
    }
}

impl fmt::Debug for SinkBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "SinkBinding::None",
            Self::Typed(_) => "SinkBinding::Typed",
            Self::Sugared(_) => "SinkBinding::Sugared",
            Self::Mapped(_) => "SinkBinding::Mapped",
        })
    }
}

// ── Adapters ──────────────────────────────────────────────────────────────────

struct Typed(Arc<dyn FieldLogger>);

impl LogSink for Typed {
    fn info(&self, message: &str, fields: &[Field]) {
        self.0.info(message, fields);
    }
}

struct Sugared(Arc<dyn PairLogger>);

impl LogSink for Sugared {
    fn info(&self, message: &str, fields: &[Field]) {
        let pairs: Vec<(&str, &dyn fmt::Display)> = fields
            .iter()
            .map(|f| (f.key(), f.value() as &dyn fmt::Display))
            .collect();
        self.0.infow(message, &pairs);
    }
}

struct Mapped(Arc<dyn MapLogger>);

impl LogSink for Mapped {
    fn info(&self, message: &str, fields: &[Field]) {
        let map = fields
            .iter()
            .map(|f| (f.key().to_owned(), serde_json::Value::from(f.value())))
            .collect();
        self.0.info(map, message);
    }
}

// ── tracing backend ───────────────────────────────────────────────────────────

/// Forwards records to `tracing` as info events on target
/// `tsu_reqlog::access`.
///
/// The access-log keys with fixed names become real event fields
/// (`request-id` is recorded as `request_id`). Keys only known at runtime,
/// such as `measure#<name>.latency`, cannot be tracing field names, so they
/// travel logfmt-rendered in one `extra` field:
///
/// ```text
/// INFO tsu_reqlog::access: request completed status=200 took=1.2ms remote=127.0.0.1:5100 request=/ method=GET extra=measure#api.latency=1200000
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingLogger;

/// Keys recorded as named tracing fields.
const TRACED_KEYS: [&str; 6] = ["status", "took", "remote", "request", "method", "request-id"];

impl FieldLogger for TracingLogger {
    fn info(&self, message: &str, fields: &[Field]) {
        let find = |key: &str| fields.iter().find(|f| f.key() == key).map(Field::value);
        let text = |key: &str| match find(key) {
            Some(Value::Str(s)) => Some(s.as_str()),
            _ => None,
        };

        let status = match find("status") {
            Some(Value::Int(n)) => Some(*n),
            _ => None,
        };
        let took = find("took").map(tracing::field::display);
        let extra: Vec<Field> = fields
            .iter()
            .filter(|f| !TRACED_KEYS.contains(&f.key()))
            .cloned()
            .collect();

        tracing::info!(
            target: "tsu_reqlog::access",
            status,
            took,
            remote = text("remote"),
            request = text("request"),
            method = text("method"),
            request_id = text("request-id"),
            extra = %Logfmt(&extra),
            "{message}"
        );
    }
}
